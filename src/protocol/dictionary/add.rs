use async_trait::async_trait;

use crate::protocol::command::{text_args, Command};
use crate::protocol::resp::Value;
use crate::store::WordStore;

/// Parameters for ADD command
#[derive(Debug, Clone, PartialEq)]
pub struct AddParams {
    pub word: String,
    pub definition: String,
}

impl AddParams {
    /// Parse ADD command parameters from RESP array items
    fn parse(items: &[Value]) -> Result<Self, Value> {
        let [word, definition]: [String; 2] = text_args(items, 2)?
            .try_into()
            .map_err(|_| Value::error("ERR failed to parse command"))?;
        Ok(AddParams { word, definition })
    }
}

/// ADD command executor: ADD word definition
pub struct AddCmd;

#[async_trait]
impl Command for AddCmd {
    fn name(&self) -> &'static str {
        "ADD"
    }

    async fn execute(&self, items: &[Value], store: &WordStore) -> Value {
        let params = match AddParams::parse(items) {
            Ok(params) => params,
            Err(reply) => return reply,
        };

        match store.add(params.word, params.definition) {
            Ok(_) => Value::ok(),
            Err(e) => Value::error(format!("ERR {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_params_parse_success() {
        let items = vec![
            Value::bulk("ADD"),
            Value::bulk("go"),
            Value::bulk("to move"),
        ];
        let params = AddParams::parse(&items).unwrap();
        assert_eq!(params.word, "go");
        assert_eq!(params.definition, "to move");
    }

    #[test]
    fn test_add_params_parse_wrong_args() {
        let items = vec![Value::bulk("ADD"), Value::bulk("go")];
        assert!(AddParams::parse(&items).is_err());
    }

    #[tokio::test]
    async fn test_add_cmd_execute_success() {
        let store = WordStore::new();
        let items = vec![
            Value::bulk("ADD"),
            Value::bulk("test"),
            Value::bulk("sample definition"),
        ];
        let result = AddCmd.execute(&items, &store).await;

        assert_eq!(result, Value::ok());
        assert_eq!(store.get("test").unwrap().definition, "sample definition");
    }

    #[tokio::test]
    async fn test_add_cmd_overwrites() {
        let store = WordStore::new();
        store.add("test", "old").unwrap();

        let items = vec![Value::bulk("ADD"), Value::bulk("test"), Value::bulk("new")];
        assert_eq!(AddCmd.execute(&items, &store).await, Value::ok());
        assert_eq!(store.get("test").unwrap().definition, "new");
    }

    #[tokio::test]
    async fn test_add_cmd_empty_word() {
        let store = WordStore::new();
        let items = vec![Value::bulk("ADD"), Value::bulk(" "), Value::bulk("nothing")];
        let result = AddCmd.execute(&items, &store).await;

        assert_eq!(result, Value::error("ERR word must not be empty"));
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_add_cmd_execute_wrong_args() {
        let store = WordStore::new();
        let items = vec![Value::bulk("ADD"), Value::bulk("test")];
        let result = AddCmd.execute(&items, &store).await;

        assert_eq!(
            result,
            Value::error("ERR wrong number of arguments for 'add' command")
        );
    }
}
