use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::protocol::dictionary::{AddCmd, DefineCmd, ListCmd, RemoveCmd, SaveCmd};
use crate::protocol::ping::PingCmd;
use crate::protocol::resp::Value;
use crate::store::WordStore;

/// A command that can be run against the word store
#[async_trait]
pub trait Command: Send + Sync {
    /// Upper-case command name, as matched against the first array item
    fn name(&self) -> &'static str;

    /// Execute with the full argument list (`items[0]` is the command name)
    async fn execute(&self, items: &[Value], store: &WordStore) -> Value;
}

/// Error reply for a call with the wrong number of arguments
pub fn wrong_arity(name: &str) -> Value {
    Value::error(format!(
        "ERR wrong number of arguments for '{}' command",
        name.to_lowercase()
    ))
}

/// Extract exactly `count` text arguments following the command name.
///
/// On failure returns the error reply: wrong arity, or an argument that is
/// not a UTF-8 string.
pub fn text_args(items: &[Value], count: usize) -> Result<Vec<String>, Value> {
    let Some(name) = items.first().and_then(Value::as_text) else {
        return Err(Value::error("ERR failed to parse command"));
    };
    if items.len() != count + 1 {
        return Err(wrong_arity(&name));
    }
    items[1..]
        .iter()
        .map(|item| {
            item.as_text()
                .ok_or_else(|| Value::error("ERR argument must be a valid UTF-8 string"))
        })
        .collect()
}

/// Registry of every supported command, keyed by name
pub struct CommandFactory {
    commands: HashMap<&'static str, Box<dyn Command>>,
}

impl CommandFactory {
    /// Register the dictionary commands. `snapshot` is the file used by SAVE.
    pub fn init(snapshot: Option<PathBuf>) -> Self {
        let mut factory = Self {
            commands: HashMap::new(),
        };
        factory.register(Box::new(AddCmd));
        factory.register(Box::new(DefineCmd));
        factory.register(Box::new(RemoveCmd));
        factory.register(Box::new(ListCmd));
        factory.register(Box::new(SaveCmd::new(snapshot)));
        factory.register(Box::new(PingCmd));
        factory
    }

    fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name(), cmd);
    }

    /// Upper-cased name of the command in a request frame
    pub fn command_name(value: &Value) -> Option<String> {
        match value {
            Value::Array(Some(items)) => items.first()?.as_text().map(|s| s.to_uppercase()),
            _ => None,
        }
    }

    /// Dispatch a request frame and return the reply
    pub async fn execute(&self, value: Value, store: &WordStore) -> Value {
        let Some(name) = Self::command_name(&value) else {
            return Value::error("ERR failed to parse command");
        };
        let Value::Array(Some(items)) = value else {
            return Value::error("ERR failed to parse command");
        };

        match self.commands.get(name.as_str()) {
            Some(cmd) => cmd.execute(&items, store).await,
            None => Value::error(format!("ERR unknown command '{}'", name)),
        }
    }
}
