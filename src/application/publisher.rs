use crate::adapters::fs::MediaStore;
use crate::domain::stream::{StreamName, StreamRecord};
use crate::error::AppError;
use crate::ports::registry::StreamRegistry;
use crate::ports::transcoder::Transcoder;
use std::path::Path;
use std::sync::Arc;

/// Turns a saved upload into a registered HLS stream.
pub struct PublishService {
    store: MediaStore,
    registry: Arc<dyn StreamRegistry>,
    transcoder: Arc<dyn Transcoder>,
    public_base_url: String,
}

impl PublishService {
    pub fn new(
        store: MediaStore,
        registry: Arc<dyn StreamRegistry>,
        transcoder: Arc<dyn Transcoder>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            registry,
            transcoder,
            public_base_url: public_base_url.into(),
        }
    }

    pub fn store(&self) -> &MediaStore {
        &self.store
    }

    pub fn registry(&self) -> &Arc<dyn StreamRegistry> {
        &self.registry
    }

    /// Transcode `source` into the stream `name` and record it.
    ///
    /// Nothing is recorded unless the transcoder reports success.
    pub async fn publish(&self, source: &Path, name: StreamName) -> Result<StreamRecord, AppError> {
        let layout = self
            .store
            .ensure_stream_dir(&name)
            .await
            .map_err(AppError::Internal)?;

        tracing::info!(stream = %name, source = %source.display(), "generating HLS stream");
        self.transcoder.transcode(source, &layout).await?;

        let record = StreamRecord::new(&self.public_base_url, name);
        self.registry.append(record.clone()).await?;
        Ok(record)
    }

    /// Wipe every generated stream and reset the registry.
    pub async fn clean(&self) -> Result<(), AppError> {
        let report = self
            .store
            .clear_streams()
            .await
            .map_err(AppError::ReadStreams)?;
        tracing::info!(removed = report.removed, failed = report.failed, "streams area cleaned");
        self.registry.clear().await?;
        Ok(())
    }
}
