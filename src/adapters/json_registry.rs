//! Flat JSON file implementation of `StreamRegistry`.
//!
//! The whole list is read and rewritten on every change. A single lock
//! serializes those cycles so concurrent appends cannot drop each other.

use crate::domain::stream::StreamRecord;
use crate::ports::registry::{RegistryError, StreamRegistry};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct JsonFileRegistry {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> RegistryError {
        RegistryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn read(&self) -> Result<Vec<StreamRecord>, RegistryError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_slice(&data).map_err(|source| RegistryError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write(&self, records: &[StreamRecord]) -> Result<(), RegistryError> {
        let json = serde_json::to_vec_pretty(records).map_err(|source| RegistryError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        // Readers either see the old document or the new one.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }
}

#[async_trait]
impl StreamRegistry for JsonFileRegistry {
    async fn init(&self) -> Result<(), RegistryError> {
        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_error(e))?
        {
            tracing::debug!(path = %self.path.display(), "using existing stream registry");
            return Ok(());
        }
        tracing::info!(path = %self.path.display(), "creating empty stream registry");
        self.write(&[]).await
    }

    async fn append(&self, record: StreamRecord) -> Result<(), RegistryError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read().await?;
        records.push(record);
        self.write(&records).await
    }

    async fn list_all(&self) -> Result<Vec<StreamRecord>, RegistryError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn clear(&self) -> Result<(), RegistryError> {
        let _guard = self.lock.lock().await;
        self.write(&[]).await
    }
}
