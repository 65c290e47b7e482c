use async_trait::async_trait;

use crate::protocol::command::{text_args, Command};
use crate::protocol::resp::Value;
use crate::store::WordStore;

/// DEFINE command: DEFINE word
///
/// Replies with the definition as a bulk string, or an error when the word
/// is not in the dictionary.
pub struct DefineCmd;

#[async_trait]
impl Command for DefineCmd {
    fn name(&self) -> &'static str {
        "DEFINE"
    }

    async fn execute(&self, items: &[Value], store: &WordStore) -> Value {
        let word = match text_args(items, 1) {
            Ok(mut args) => args.remove(0),
            Err(reply) => return reply,
        };

        match store.get(&word) {
            Ok(entry) => Value::bulk(entry.definition),
            Err(e) => Value::error(format!("ERR {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_define_cmd_execute() {
        let store = WordStore::new();
        store.add("test", "sample definition").unwrap();

        let items = vec![Value::bulk("DEFINE"), Value::bulk("test")];
        let result = DefineCmd.execute(&items, &store).await;

        assert_eq!(result, Value::bulk("sample definition"));
    }

    #[tokio::test]
    async fn test_define_cmd_not_found() {
        let store = WordStore::new();
        let items = vec![Value::bulk("DEFINE"), Value::bulk("nonexistent")];
        let result = DefineCmd.execute(&items, &store).await;

        assert_eq!(result, Value::error("ERR word 'nonexistent' not found"));
    }

    #[tokio::test]
    async fn test_define_cmd_wrong_args() {
        let store = WordStore::new();
        let items = vec![Value::bulk("DEFINE")];
        let result = DefineCmd.execute(&items, &store).await;

        assert_eq!(
            result,
            Value::error("ERR wrong number of arguments for 'define' command")
        );
    }
}
