//! Notat - Lecture Recordings to Markdown Notes
//!
//! A local-first CLI tool for turning lecture recordings into structured
//! Markdown notes.
//!
//! The name "Notat" comes from the Norwegian word for "note."
//!
//! # Overview
//!
//! Notat allows you to:
//! - Turn local audio/video recordings into Markdown lecture notes
//! - Process a whole folder of recordings in one batch
//! - Split long recordings so they fit the transcription API's upload limit
//! - Use OpenAI, Azure OpenAI, or any OpenAI-compatible endpoint
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `tools` - External tool subprocess helpers (ffmpeg, ffprobe)
//! - `media` - Media detection, audio extraction, and chunking
//! - `transcription` - Speech-to-text transcription
//! - `notes` - Notes generation and Markdown formatting
//! - `retry` - Retry policy for transient API failures
//! - `pipeline` - Per-recording pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use notat::config::Settings;
//! use notat::pipeline::Pipeline;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(&settings)?;
//!
//!     // Turn a recording into a Markdown document
//!     let summary = pipeline.process_file(Path::new("lecture_01.mp4")).await?;
//!     println!("Notes written to {}", summary.output_path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod notes;
pub mod openai;
pub mod pipeline;
pub mod retry;
pub mod tools;
pub mod transcription;

pub use error::{NotatError, Result};
