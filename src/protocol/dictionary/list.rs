use async_trait::async_trait;

use crate::protocol::command::{wrong_arity, Command};
use crate::protocol::resp::Value;
use crate::store::WordStore;

/// LIST command: LIST
///
/// Replies with an array of `[word, definition]` pairs. The store itself has
/// no order; pairs are sorted by word so replies are stable.
pub struct ListCmd;

#[async_trait]
impl Command for ListCmd {
    fn name(&self) -> &'static str {
        "LIST"
    }

    async fn execute(&self, items: &[Value], store: &WordStore) -> Value {
        if items.len() != 1 {
            return wrong_arity(self.name());
        }

        let mut entries: Vec<_> = match store.list() {
            Ok(entries) => entries.into_values().collect(),
            Err(e) => return Value::error(format!("ERR {}", e)),
        };
        entries.sort_by(|a, b| a.word.cmp(&b.word));

        let pairs = entries
            .into_iter()
            .map(|entry| {
                Value::Array(Some(vec![
                    Value::bulk(entry.word),
                    Value::bulk(entry.definition),
                ]))
            })
            .collect();
        Value::Array(Some(pairs))
    }
}
