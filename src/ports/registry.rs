use crate::domain::stream::StreamRecord;
use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry I/O on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry {path:?} is not a valid stream list: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable, ordered list of published streams.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamRegistry: Send + Sync {
    /// Create an empty store if none exists. Existing contents are left alone.
    async fn init(&self) -> Result<(), RegistryError>;

    /// Add a record after every existing one.
    async fn append(&self, record: StreamRecord) -> Result<(), RegistryError>;

    /// All records in insertion order.
    async fn list_all(&self) -> Result<Vec<StreamRecord>, RegistryError>;

    /// Drop every record.
    async fn clear(&self) -> Result<(), RegistryError>;
}
