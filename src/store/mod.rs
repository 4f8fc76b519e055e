pub mod history;
pub mod json_store;
pub mod schema;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("cannot access record {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode record {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Named string records; the only persistence the game needs.
pub trait RecordStore {
    /// `Ok(None)` when the record was never written.
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}
