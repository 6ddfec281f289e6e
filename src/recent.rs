//! Recent-search history persisted in a small key-value store.
//!
//! History is a convenience. Every read, write and parse failure is turned
//! into "no history" (on load) or a silent no-op (on save) at this module's
//! boundary; callers never see a storage error from [`load_recent`] or
//! [`save_recent`].

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Storage key holding the JSON-encoded history array.
pub const RECENT_KEY: &str = "nebula-recent-searches";

/// Maximum number of remembered queries.
pub const RECENT_LIMIT: usize = 5;

/// String key to string value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One file per key (`<dir>/<key>.json`).
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::StorageRead { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| Error::StorageWrite {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|source| Error::StorageWrite { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::StorageWrite { path, source }),
        }
    }
}

/// In-process store. Nothing survives the process.
///
/// Reads and writes can be switched off to simulate a disabled or full
/// backing store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store whose reads and/or writes always fail.
    pub fn failing(reads: bool, writes: bool) -> Self {
        Self {
            fail_reads: reads,
            fail_writes: writes,
            ..Self::default()
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads {
            return Err(Error::StorageUnavailable("reads disabled".to_string()));
        }
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(Error::StorageUnavailable("quota exceeded".to_string()));
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.fail_writes {
            return Err(Error::StorageUnavailable("writes disabled".to_string()));
        }
        self.values.remove(key);
        Ok(())
    }
}

fn read_recent(store: &dyn KeyValueStore) -> Result<Vec<String>> {
    let Some(raw) = store.get(RECENT_KEY)? else {
        return Ok(Vec::new());
    };
    let mut list: Vec<String> =
        serde_json::from_str(&raw).map_err(|source| Error::StorageCorrupt {
            key: RECENT_KEY.to_string(),
            source,
        })?;
    list.truncate(RECENT_LIMIT);
    Ok(list)
}

fn write_recent(store: &mut dyn KeyValueStore, list: &[String]) -> Result<()> {
    let data = serde_json::to_string(list).map_err(|source| Error::StorageEncode {
        key: RECENT_KEY.to_string(),
        source,
    })?;
    store.set(RECENT_KEY, &data)
}

/// Stored history, most recent first. Empty on any failure.
pub fn load_recent(store: &dyn KeyValueStore) -> Vec<String> {
    match read_recent(store) {
        Ok(list) => list,
        Err(e) => {
            tracing::debug!(error = %e, "Recent searches unavailable, starting empty");
            Vec::new()
        }
    }
}

/// Remember `query` at the front of the history.
///
/// Blank queries are ignored. An existing identical entry (exact,
/// case-sensitive) is moved rather than duplicated and the list is capped
/// at [`RECENT_LIMIT`]. Returns the resulting list; write failures are
/// logged and otherwise ignored.
pub fn save_recent(store: &mut dyn KeyValueStore, query: &str) -> Vec<String> {
    if query.trim().is_empty() {
        return load_recent(store);
    }

    let mut list = load_recent(store);
    list.retain(|q| q != query);
    list.insert(0, query.to_string());
    list.truncate(RECENT_LIMIT);

    if let Err(e) = write_recent(store, &list) {
        tracing::warn!(error = %e, "Failed to save recent searches");
    }
    list
}

/// Forget all history.
pub fn clear_recent(store: &mut dyn KeyValueStore) -> Result<()> {
    store.remove(RECENT_KEY)
}

/// The state directory: `~/.local/state/nebula/`.
pub fn default_state_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("nebula")
    } else {
        PathBuf::from("/tmp").join("nebula").join("state")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_loads_empty() {
        let store = MemoryStore::new();
        assert!(load_recent(&store).is_empty());
    }

    #[test]
    fn test_save_prepends() {
        let mut store = MemoryStore::new();
        save_recent(&mut store, "a");
        save_recent(&mut store, "b");
        assert_eq!(load_recent(&store), vec!["b", "a"]);
    }

    #[test]
    fn test_blank_query_ignored() {
        let mut store = MemoryStore::new();
        save_recent(&mut store, "a");
        save_recent(&mut store, "");
        save_recent(&mut store, "   ");
        assert_eq!(load_recent(&store), vec!["a"]);
    }

    #[test]
    fn test_dedup_and_promote() {
        let mut store = MemoryStore::new();
        save_recent(&mut store, "x");
        save_recent(&mut store, "y");
        let list = save_recent(&mut store, "x");
        assert_eq!(list, vec!["x", "y"]);
        assert_eq!(load_recent(&store), vec!["x", "y"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let mut store = MemoryStore::new();
        save_recent(&mut store, "Rust");
        save_recent(&mut store, "rust");
        assert_eq!(load_recent(&store), vec!["rust", "Rust"]);
    }

    #[test]
    fn test_bounded_to_limit() {
        let mut store = MemoryStore::new();
        for i in 0..9 {
            save_recent(&mut store, &format!("q{i}"));
        }
        let list = load_recent(&store);
        assert_eq!(list, vec!["q8", "q7", "q6", "q5", "q4"]);
    }

    #[test]
    fn test_repeated_save_evicts_oldest() {
        let mut store = MemoryStore::new();
        for q in ["one", "two", "three", "four", "five"] {
            save_recent(&mut store, q);
        }
        for _ in 0..6 {
            save_recent(&mut store, "kubernetes");
        }
        let list = load_recent(&store);
        assert_eq!(list, vec!["kubernetes", "five", "four", "three", "two"]);
    }

    #[test]
    fn test_read_failure_is_empty() {
        let mut store = MemoryStore::new();
        save_recent(&mut store, "kept");
        store.fail_reads = true;
        assert!(load_recent(&store).is_empty());
    }

    #[test]
    fn test_write_failure_does_not_raise() {
        let mut store = MemoryStore::failing(false, true);
        let list = save_recent(&mut store, "lost");
        assert_eq!(list, vec!["lost"]);
        assert!(load_recent(&store).is_empty());
    }

    #[test]
    fn test_corrupt_value_is_empty() {
        let mut store = MemoryStore::new();
        store.set(RECENT_KEY, "not json").unwrap();
        assert!(load_recent(&store).is_empty());

        store.set(RECENT_KEY, r#"{"wrong": "shape"}"#).unwrap();
        assert!(load_recent(&store).is_empty());

        // A fresh save replaces the corrupt value.
        save_recent(&mut store, "fresh");
        assert_eq!(load_recent(&store), vec!["fresh"]);
    }

    #[test]
    fn test_oversized_stored_list_is_truncated() {
        let mut store = MemoryStore::new();
        store
            .set(RECENT_KEY, r#"["a","b","c","d","e","f","g"]"#)
            .unwrap();
        assert_eq!(load_recent(&store).len(), RECENT_LIMIT);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(tmp.path().join("state"));
        save_recent(&mut store, "system design");

        let reopened = FileStore::new(tmp.path().join("state"));
        assert_eq!(load_recent(&reopened), vec!["system design"]);

        let raw =
            std::fs::read_to_string(tmp.path().join("state").join("nebula-recent-searches.json"))
                .unwrap();
        assert_eq!(raw, r#"["system design"]"#);
    }

    #[test]
    fn test_file_store_missing_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("nothing-here"));
        assert!(load_recent(&store).is_empty());
    }

    #[test]
    fn test_file_store_unwritable_is_silent() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the directory should be makes create_dir_all fail.
        let blocker = tmp.path().join("blocked");
        std::fs::write(&blocker, "file").unwrap();
        let mut store = FileStore::new(&blocker);
        let list = save_recent(&mut store, "query");
        assert_eq!(list, vec!["query"]);
        assert!(load_recent(&store).is_empty());
    }

    #[test]
    fn test_clear_recent() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(tmp.path());
        save_recent(&mut store, "a");
        clear_recent(&mut store).unwrap();
        assert!(load_recent(&store).is_empty());
        // Clearing twice is fine.
        clear_recent(&mut store).unwrap();
    }
}
