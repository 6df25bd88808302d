//! Message ingestion boundary.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::error::SourceError;
use crate::pipeline::types::Message;

/// Where messages to audit come from. Pure I/O, no validation logic.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Source name for logs (e.g. "json-file").
    fn name(&self) -> &str;

    /// Fetch every message the source currently holds.
    async fn fetch(&self) -> Result<Vec<Message>, SourceError>;
}

/// A JSON file holding an array of messages.
///
/// Legacy field names (`numero_mensaje`, `contenido`, ...) are accepted.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MessageSource for JsonFileSource {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn fetch(&self) -> Result<Vec<Message>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::ReadFailed {
                name: self.name().to_string(),
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let messages: Vec<Message> =
            serde_json::from_str(&raw).map_err(|e| SourceError::Decode {
                name: self.name().to_string(),
                reason: e.to_string(),
            })?;

        info!(
            source = self.name(),
            path = %self.path.display(),
            count = messages.len(),
            "Fetched messages"
        );
        Ok(messages)
    }
}
