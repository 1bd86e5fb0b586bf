//! Error types for Notat.

use std::path::PathBuf;

use thiserror::Error;

/// Library-level error type for Notat operations.
#[derive(Error, Debug)]
pub enum NotatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media not found: {0}")]
    MediaNotFound(String),

    #[error("Audio extraction failed: {0}")]
    Extract(String),

    #[error("Duration probe failed: {0}")]
    Probe(String),

    #[error("Audio split failed: {0}")]
    Split(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    /// Payload exceeds the transcription upload ceiling. Retrying can
    /// never help, so the retry wrapper refuses this variant outright.
    #[error("Audio file {path} is {size_bytes} bytes, over the {limit_bytes} byte upload limit")]
    ChunkTooLarge {
        path: PathBuf,
        size_bytes: u64,
        limit_bytes: u64,
    },

    #[error("Notes generation failed: {0}")]
    Generation(String),

    #[error("Provider API error: {0}")]
    Api(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl NotatError {
    /// True for failures that describe an input which can never succeed,
    /// as opposed to transient conditions worth another attempt.
    pub fn is_precondition(&self) -> bool {
        matches!(self, NotatError::ChunkTooLarge { .. })
    }
}

/// Result type alias for Notat operations.
pub type Result<T> = std::result::Result<T, NotatError>;
