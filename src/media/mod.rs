//! Media file handling.
//!
//! Extension-based detection for batch scanning, plus the ffmpeg/ffprobe
//! stages (extraction, probing, cutting) and the size-based split policy.

pub mod extract;
pub mod split;

pub use extract::{cut_segment, extract_audio, probe_duration};
pub use split::{plan_chunks, split_audio, ChunkPlan};

use std::path::Path;

/// Supported audio file extensions.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "flac", "ogg", "opus", "aac", "wma"];

/// Supported video file extensions (audio will be extracted).
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm", "flv"];

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check if path is a supported audio file.
pub fn is_audio_file(path: &Path) -> bool {
    has_extension_in(path, AUDIO_EXTENSIONS)
}

/// Check if path is a supported video file.
pub fn is_video_file(path: &Path) -> bool {
    has_extension_in(path, VIDEO_EXTENSIONS)
}

/// Check if path is a supported media file (audio or video).
pub fn is_media_file(path: &Path) -> bool {
    is_audio_file(path) || is_video_file(path)
}
