//! Error types for corpus preprocessing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the preprocessing pipelines and the subword model wrapper.
#[derive(Error, Debug)]
pub enum CorpusError {
    /// I/O error, including gzip stream errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure inside the subword trainer, encoder or decoder.
    #[error("Subword model error: {0}")]
    Subword(String),

    /// Subword model file missing.
    #[error("Subword model not found: {0}")]
    ModelNotFound(PathBuf),

    /// MessagePack encoding failed.
    #[error("MessagePack encoding error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A language tag could not be parsed.
    #[error("Invalid language tag: {0}")]
    InvalidLanguageTag(String),

    /// A line was routed to a language that has no open output.
    #[error("No output sink for language: {0}")]
    MissingOutputSink(String),
}

/// Result type alias for corpus operations.
pub type Result<T> = std::result::Result<T, CorpusError>;

impl From<tokenizers::Error> for CorpusError {
    fn from(err: tokenizers::Error) -> Self {
        CorpusError::Subword(err.to_string())
    }
}
