//! Error types for the notice auditor.
//!
//! The validation core never fails: every uncertainty about a message ends up
//! as a finding or an absent field. These errors only cover the boundaries
//! (configuration, catalog loading, message ingestion, batch plumbing).

use std::path::PathBuf;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Errors raised while loading reference tables (matrix, vocabulary, dictionary).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("Malformed JSON in {path}: {message}")]
    Json { path: PathBuf, message: String },

    #[error("Column {column} not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Dictionary {path} contains no words")]
    EmptyDictionary { path: PathBuf },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Message ingestion errors.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source {name} failed to read {path}: {reason}")]
    ReadFailed {
        name: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Source {name} returned malformed messages: {reason}")]
    Decode { name: String, reason: String },
}

/// Per-message validation errors, surfaced only at the batch boundary.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Message {id} is malformed: {reason}")]
    MalformedMessage { id: String, reason: String },

    #[error("Validation task for message {index} failed: {reason}")]
    TaskFailed { index: usize, reason: String },
}
