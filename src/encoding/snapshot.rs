//! JSON snapshot of the word store
//!
//! The file holds a single object:
//!
//! ```json
//! {
//!   "entries": {
//!     "word": { "definition": "..." }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::store::{StoreError, WordStore};

/// Persisted form of a single entry. The word is the map key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub definition: String,
}

/// Persisted form of the whole store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub entries: BTreeMap<String, SnapshotEntry>,
}

impl Snapshot {
    /// Capture the current contents of `store`
    pub fn capture(store: &WordStore) -> Result<Self, StoreError> {
        let entries = store
            .list()?
            .into_values()
            .map(|entry| {
                (
                    entry.word,
                    SnapshotEntry {
                        definition: entry.definition,
                    },
                )
            })
            .collect();
        Ok(Self { entries })
    }

    /// Build a store holding the snapshot's entries. Blank words are rejected.
    pub fn into_store(self) -> Result<WordStore, StoreError> {
        let store = WordStore::new();
        for (word, entry) in self.entries {
            store.add(word, entry.definition)?;
        }
        Ok(store)
    }

    /// Encode as pretty-printed JSON (2-space indentation)
    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Decode from JSON bytes. Empty input decodes to an empty snapshot.
    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Read a snapshot file. A missing file reads as an empty snapshot.
    pub fn read(path: &Path) -> Result<Self, StoreError> {
        match fs::read(path) {
            Ok(bytes) => Self::decode(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the snapshot to `path`.
    ///
    /// The bytes go to a temporary file next to `path` which then replaces it,
    /// so readers never observe a half-written snapshot.
    pub fn write(&self, path: &Path) -> Result<(), StoreError> {
        let data = self.encode()?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }
}

/// Load a store from the snapshot at `path`
pub fn load(path: &Path) -> Result<WordStore, StoreError> {
    Snapshot::read(path)?.into_store()
}

/// Save the current contents of `store` to `path`, returning the entry count
pub fn save(store: &WordStore, path: &Path) -> Result<usize, StoreError> {
    let snapshot = Snapshot::capture(store)?;
    snapshot.write(path)?;
    Ok(snapshot.entries.len())
}
