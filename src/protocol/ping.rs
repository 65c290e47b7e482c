use async_trait::async_trait;

use crate::protocol::command::{wrong_arity, Command};
use crate::protocol::resp::Value;
use crate::store::WordStore;

/// PING command: PING [message]
pub struct PingCmd;

#[async_trait]
impl Command for PingCmd {
    fn name(&self) -> &'static str {
        "PING"
    }

    async fn execute(&self, items: &[Value], _store: &WordStore) -> Value {
        match items {
            [_] => Value::SimpleString("PONG".to_string()),
            [_, message] => message.clone(),
            _ => wrong_arity(self.name()),
        }
    }
}
