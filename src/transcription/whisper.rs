//! Whisper transcription implementation.

use std::path::Path;

use async_openai::types::{AudioInput, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use tracing::debug;

use super::{Transcriber, MAX_UPLOAD_BYTES};
use crate::error::{NotatError, Result};
use crate::openai::ApiClient;
use crate::tools;

/// Whisper-family transcriber with an upload-size guard.
pub struct WhisperTranscriber {
    client: ApiClient,
    model: String,
    upload_limit: u64,
}

impl WhisperTranscriber {
    /// Create a transcriber for the given backend and model (or Azure
    /// deployment) name.
    pub fn new(client: ApiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            upload_limit: MAX_UPLOAD_BYTES,
        }
    }

    /// Overrides the upload ceiling, for backends with a different cap.
    pub fn with_upload_limit(mut self, limit_bytes: u64) -> Self {
        self.upload_limit = limit_bytes;
        self
    }
}

/// Enforces the upload ceiling, returning the file size when it fits.
fn check_upload_size(path: &Path, limit_bytes: u64) -> Result<u64> {
    let size = tools::file_size(path)?;
    if size > limit_bytes {
        return Err(NotatError::ChunkTooLarge {
            path: path.to_path_buf(),
            size_bytes: size,
            limit_bytes,
        });
    }
    Ok(size)
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    /// Transcribes one audio file to plain text.
    ///
    /// The size check runs before anything is read or sent: an oversized
    /// payload fails with the typed precondition error and no API call.
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let size = check_upload_size(audio_path, self.upload_limit)?;

        debug!("Transcribing {} ({} bytes)", audio_path.display(), size);

        let file_bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(file_name, file_bytes))
            .model(&self.model)
            .build()
            .map_err(|e| NotatError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self.client.transcribe(request).await?;

        Ok(response.text.trim().to_string())
    }
}
