use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

/// A word together with its definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub word: String,
    pub definition: String,
}

impl Entry {
    pub fn new(word: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            definition: definition.into(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.definition)
    }
}

/// Errors returned by the word store and its snapshot file
#[derive(Error, Debug)]
pub enum StoreError {
    /// Lookup of a word that is not in the store
    #[error("word '{0}' not found")]
    NotFound(String),

    /// Words must contain at least one non-whitespace character
    #[error("word must not be empty")]
    EmptyWord,

    /// Snapshot file is not valid JSON or has the wrong shape
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] serde_json::Error),

    /// Snapshot file could not be read or written
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Temporary snapshot could not be moved over the target file
    #[error("failed to persist snapshot: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Blocking snapshot task panicked or was cancelled
    #[error("snapshot task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A writer panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(_: PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

/// In-memory word store.
///
/// Every operation takes the lock for the duration of the map access, so a
/// write is visible to any reader as soon as the call returns. Last write wins.
pub struct WordStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl WordStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or overwrite the entry for `word`. Blank words are rejected.
    pub fn add(&self, word: impl Into<String>, definition: impl Into<String>) -> Result<(), StoreError> {
        let entry = Entry::new(word, definition);
        if entry.word.trim().is_empty() {
            return Err(StoreError::EmptyWord);
        }
        let mut entries = self.entries.write()?;
        entries.insert(entry.word.clone(), entry);
        Ok(())
    }

    /// Look up the entry for `word`
    pub fn get(&self, word: &str) -> Result<Entry, StoreError> {
        let entries = self.entries.read()?;
        entries
            .get(word)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(word.to_string()))
    }

    /// Delete the entry for `word`. Absent words are ignored.
    pub fn remove(&self, word: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write()?;
        entries.remove(word);
        Ok(())
    }

    /// Copy of every entry, keyed by word. Iteration order is unspecified.
    pub fn list(&self) -> Result<HashMap<String, Entry>, StoreError> {
        let entries = self.entries.read()?;
        Ok(entries.clone())
    }

    /// Number of entries
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.read()?.len())
    }

    /// True when the store holds no entries
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl Default for WordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_missing_word() {
        let store = WordStore::new();
        match store.get("missing") {
            Err(StoreError::NotFound(word)) => assert_eq!(word, "missing"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_add_then_get() {
        let store = WordStore::new();
        store.add("test", "sample definition").unwrap();

        let entry = store.get("test").unwrap();
        assert_eq!(entry, Entry::new("test", "sample definition"));
        assert_eq!(entry.to_string(), "sample definition");
    }

    #[test]
    fn test_add_overwrites() {
        let store = WordStore::new();
        store.add("word", "first").unwrap();
        store.add("word", "second").unwrap();

        assert_eq!(store.get("word").unwrap().definition, "second");
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_add_empty_definition() {
        let store = WordStore::new();
        store.add("blank", "").unwrap();
        assert_eq!(store.get("blank").unwrap().definition, "");
    }

    #[test]
    fn test_remove() {
        let store = WordStore::new();
        store.add("test", "sample definition").unwrap();
        store.remove("test").unwrap();

        assert!(matches!(store.get("test"), Err(StoreError::NotFound(_))));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_remove_absent_word() {
        let store = WordStore::new();
        store.remove("nothing").unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_list() {
        let store = WordStore::new();
        store.add("test1", "sample definition 1").unwrap();
        store.add("test2", "sample definition 2").unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["test1"].definition, "sample definition 1");
        assert_eq!(entries["test2"].definition, "sample definition 2");
    }

    #[test]
    fn test_list_is_detached_copy() {
        let store = WordStore::new();
        store.add("a", "x").unwrap();

        let listed = store.list().unwrap();
        store.add("b", "y").unwrap();
        store.remove("a").unwrap();

        assert_eq!(listed.len(), 1);
        assert!(listed.contains_key("a"));
    }

    #[test]
    fn test_add_rejects_blank_word() {
        let store = WordStore::new();
        assert!(matches!(store.add("", "nothing"), Err(StoreError::EmptyWord)));
        assert!(matches!(store.add("  \t", "nothing"), Err(StoreError::EmptyWord)));
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_task_error() {
        let join_error = tokio::task::spawn_blocking(|| -> usize { panic!("snapshot writer crashed") })
            .await
            .unwrap_err();
        let err = StoreError::from(join_error);

        assert!(matches!(err, StoreError::Task(_)));
        assert!(err.to_string().starts_with("snapshot task failed"));
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(WordStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        store.add(format!("w{}-{}", t, i), format!("d{}", i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len().unwrap(), 800);
        assert_eq!(store.get("w3-42").unwrap().definition, "d42");
    }
}
