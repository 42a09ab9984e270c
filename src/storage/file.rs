//! File-backed key-value store
//!
//! One file per key under a store directory. Writes go through a
//! temporary file and a rename so a crash mid-write never leaves a torn
//! value behind; the worst case is the previous value.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::kv::KeyValueStore;

/// Durable [`KeyValueStore`] persisting each key as a file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created eagerly;
    /// if that fails the store still works as a lossy no-op, matching the
    /// storage contract.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("failed to create store directory {}: {e}", dir.display());
        }
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(sanitize_key(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("failed to read {}: {e}", path.display());
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");

        if let Err(e) = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path)) {
            warn!("failed to write {}: {e}", path.display());
            return;
        }

        debug!("persisted {} ({} bytes)", key, value.len());
    }
}

/// Keys become file names; anything outside a conservative character set
/// is replaced so a hostile key cannot escape the store directory.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("prev_metrics", r#"{"a":1}"#);
        assert_eq!(store.get("prev_metrics").as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_missing_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.get("nope"), None);
    }

    #[test]
    fn test_set_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("k", "first");
        store.set("k", "second");
        assert_eq!(store.get("k").as_deref(), Some("second"));
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::new(dir.path()).set("k", "persisted");

        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.get("k").as_deref(), Some("persisted"));
    }

    #[test]
    fn test_hostile_key_stays_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("../escape", "x");
        assert_eq!(store.get("../escape").as_deref(), Some("x"));
        assert!(!dir.path().parent().unwrap().join("escape").exists());
    }

    #[test]
    fn test_unwritable_directory_is_a_lossy_noop() {
        let store = FileStore::new("/proc/definitely/not/writable");

        store.set("k", "v");
        assert_eq!(store.get("k"), None);
    }
}
