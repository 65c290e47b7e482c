use async_trait::async_trait;

use crate::protocol::command::{text_args, Command};
use crate::protocol::resp::Value;
use crate::store::WordStore;

/// REMOVE command: REMOVE word. Removing an unknown word still replies OK.
pub struct RemoveCmd;

#[async_trait]
impl Command for RemoveCmd {
    fn name(&self) -> &'static str {
        "REMOVE"
    }

    async fn execute(&self, items: &[Value], store: &WordStore) -> Value {
        let word = match text_args(items, 1) {
            Ok(mut args) => args.remove(0),
            Err(reply) => return reply,
        };

        match store.remove(&word) {
            Ok(_) => Value::ok(),
            Err(e) => Value::error(format!("ERR {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_cmd_execute() {
        let store = WordStore::new();
        store.add("test", "sample definition").unwrap();

        let items = vec![Value::bulk("REMOVE"), Value::bulk("test")];
        assert_eq!(RemoveCmd.execute(&items, &store).await, Value::ok());
        assert!(store.get("test").is_err());
    }

    #[tokio::test]
    async fn test_remove_cmd_absent_word() {
        let store = WordStore::new();
        let items = vec![Value::bulk("REMOVE"), Value::bulk("ghost")];
        assert_eq!(RemoveCmd.execute(&items, &store).await, Value::ok());
    }

    #[tokio::test]
    async fn test_remove_cmd_wrong_args() {
        let store = WordStore::new();
        let items = vec![Value::bulk("REMOVE"), Value::bulk("a"), Value::bulk("b")];
        assert_eq!(
            RemoveCmd.execute(&items, &store).await,
            Value::error("ERR wrong number of arguments for 'remove' command")
        );
    }
}
