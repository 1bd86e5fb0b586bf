//! Speech-to-text adapters.
//!
//! The pipeline talks to transcription backends through the [`Transcriber`]
//! trait; [`WhisperTranscriber`] is the production implementation over the
//! configured OpenAI-compatible or Azure backend.

mod whisper;

pub use whisper::WhisperTranscriber;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Upload ceiling for a single transcription request (25 MiB).
///
/// Matches the Whisper API file-size limit. Payloads over this can never
/// succeed, so they are rejected as a precondition failure rather than
/// sent and retried.
pub const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file and return its plain text.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}
