//! Markdown notes generation.
//!
//! Turns a merged lecture transcript into a structured Markdown document
//! through the [`NotesGenerator`] trait, with pure helpers for cleaning
//! model output and framing the final document.

mod format;
mod generator;

pub use format::{render_document, strip_think_tags};
pub use generator::ChatNotesGenerator;

use async_trait::async_trait;

use crate::error::Result;

/// Trait for turning a transcript into Markdown notes.
#[async_trait]
pub trait NotesGenerator: Send + Sync {
    /// Generate Markdown notes from a full transcript.
    async fn generate(&self, transcript: &str) -> Result<String>;
}
