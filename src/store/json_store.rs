use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::store::{PersistenceError, RecordStore};

/// One `<key>.json` file per record under a base directory.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> io::Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("poem-scramble");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", sanitize_key(key)))
    }
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn io_error(key: &str) -> impl FnOnce(io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        key: key.to_string(),
        source,
    }
}

impl RecordStore for JsonStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.file_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key)(e)),
        }
    }

    /// Write to a temp file first so a crash never leaves half a record.
    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.file_path(key);
        let tmp_path = path.with_extension("tmp");

        let mut file = fs::File::create(&tmp_path).map_err(io_error(key))?;
        file.write_all(value.as_bytes()).map_err(io_error(key))?;
        file.sync_all().map_err(io_error(key))?;

        fs::rename(&tmp_path, &path).map_err(io_error(key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.file_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key)(e)),
        }
    }
}

/// Process-local store for tests and `--ephemeral` runs.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_record_reads_none() {
        let (_dir, store) = make_test_store();
        assert!(store.read("poem_game_state").unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let (_dir, store) = make_test_store();
        store.write("used_poems", r#"["床前明月光"]"#).unwrap();
        assert_eq!(
            store.read("used_poems").unwrap().as_deref(),
            Some(r#"["床前明月光"]"#)
        );
        assert!(store.base_dir().join("used_poems.json").exists());
    }

    #[test]
    fn test_write_leaves_no_tmp_files() {
        let (dir, store) = make_test_store();
        store.write("poem_history", "[]").unwrap();
        store.write("poem_history", "[1]").unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, store) = make_test_store();
        store.write("poem_game_auth", "{}").unwrap();
        store.remove("poem_game_auth").unwrap();
        store.remove("poem_game_auth").unwrap();
        assert!(store.read("poem_game_auth").unwrap().is_none());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let (dir, _store) = make_test_store();
        let bad_store = JsonStore {
            base_dir: dir.path().join("nonexistent_subdir"),
        };
        let err = bad_store.write("poem_game_state", "{}").unwrap_err();
        assert!(err.to_string().contains("poem_game_state"));
    }

    #[test]
    fn test_keys_cannot_escape_base_dir() {
        let (_dir, store) = make_test_store();
        store.write("../outside", "x").unwrap();
        assert!(store.base_dir().join("___outside.json").exists());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.read("k").unwrap().is_none());
        store.write("k", "v").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.read("k").unwrap().is_none());
    }
}
