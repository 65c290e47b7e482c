use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{error, info};

use crate::encoding::Snapshot;
use crate::protocol::command::{wrong_arity, Command};
use crate::protocol::resp::Value;
use crate::store::{StoreError, WordStore};

/// SAVE command: write the store to the snapshot file
pub struct SaveCmd {
    path: Option<PathBuf>,
}

impl SaveCmd {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Command for SaveCmd {
    fn name(&self) -> &'static str {
        "SAVE"
    }

    async fn execute(&self, items: &[Value], store: &WordStore) -> Value {
        if items.len() != 1 {
            return wrong_arity(self.name());
        }
        let Some(path) = self.path.clone() else {
            return Value::error("ERR snapshot path not configured");
        };

        let snapshot = match Snapshot::capture(store) {
            Ok(snapshot) => snapshot,
            Err(e) => return Value::error(format!("ERR {}", e)),
        };
        let count = snapshot.entries.len();

        // File I/O stays off the runtime threads
        let written = tokio::task::spawn_blocking(move || snapshot.write(&path).map(|_| path)).await;
        match written {
            Ok(Ok(path)) => {
                info!("Saved {} entries to {}", count, path.display());
                Value::ok()
            }
            Ok(Err(e)) => {
                error!("Failed to save snapshot: {}", e);
                Value::error(format!("ERR {}", e))
            }
            Err(e) => Value::error(format!("ERR {}", StoreError::from(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::snapshot;

    #[tokio::test]
    async fn test_save_cmd_execute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary.json");
        let store = WordStore::new();
        store.add("test1", "d1").unwrap();
        store.add("test2", "d2").unwrap();

        let cmd = SaveCmd::new(Some(path.clone()));
        assert_eq!(cmd.execute(&[Value::bulk("SAVE")], &store).await, Value::ok());

        let loaded = snapshot::load(&path).unwrap();
        assert_eq!(loaded.list().unwrap(), store.list().unwrap());
    }

    #[tokio::test]
    async fn test_save_cmd_without_path() {
        let store = WordStore::new();
        let cmd = SaveCmd::new(None);
        assert_eq!(
            cmd.execute(&[Value::bulk("SAVE")], &store).await,
            Value::error("ERR snapshot path not configured")
        );
    }

    #[tokio::test]
    async fn test_save_cmd_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("dictionary.json");
        let store = WordStore::new();

        let cmd = SaveCmd::new(Some(path));
        let result = cmd.execute(&[Value::bulk("SAVE")], &store).await;
        assert!(matches!(result, Value::Error(msg) if msg.starts_with("ERR snapshot I/O error")));
    }
}
