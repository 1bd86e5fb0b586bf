//! ffmpeg and ffprobe invocations.
//!
//! Audio extraction, duration probing, and segment cutting. All three run
//! through [`crate::tools::run_tool`], so a missing binary surfaces as a
//! normal failed invocation with the launch error on stderr.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{NotatError, Result};
use crate::tools::run_tool;

/// Extracts the audio track as a normalized stereo MP3.
///
/// Re-encodes with libmp3lame at 44.1 kHz / 192 kbps so every input
/// container lands in a format the transcription API accepts.
pub async fn extract_audio(src: &Path, dst: &Path) -> Result<()> {
    let src_s = src.to_string_lossy();
    let dst_s = dst.to_string_lossy();

    let output = run_tool(
        "ffmpeg",
        &[
            "-y",
            "-i",
            src_s.as_ref(),
            "-vn",
            "-acodec",
            "libmp3lame",
            "-ar",
            "44100",
            "-ac",
            "2",
            "-b:a",
            "192k",
            dst_s.as_ref(),
        ],
    )
    .await;

    if !output.success() {
        return Err(NotatError::Extract(format!(
            "ffmpeg exited with code {}: {}",
            output.code,
            stderr_tail(&output.stderr)
        )));
    }

    debug!("Extracted {} -> {}", src.display(), dst.display());
    Ok(())
}

/// Queries the duration of an audio file using ffprobe with JSON output.
///
/// A failed ffprobe process is an error. A process that succeeds but whose
/// output yields no parseable duration degrades to 0.0 with a warning; the
/// chunk planner treats that as one second of audio.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let path_s = path.to_string_lossy();

    let output = run_tool(
        "ffprobe",
        &[
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            path_s.as_ref(),
        ],
    )
    .await;

    if !output.success() {
        return Err(NotatError::Probe(format!(
            "ffprobe exited with code {}: {}",
            output.code,
            stderr_tail(&output.stderr)
        )));
    }

    let duration = serde_json::from_str::<serde_json::Value>(&output.stdout)
        .ok()
        .and_then(|parsed| {
            parsed["format"]["duration"]
                .as_str()
                .and_then(|s| s.parse::<f64>().ok())
        });

    match duration {
        Some(d) => Ok(d),
        None => {
            warn!(
                "Could not determine duration of {}, treating as 0.0",
                path.display()
            );
            Ok(0.0)
        }
    }
}

/// Cuts a time window out of an audio file with a stream copy (no
/// re-encode), for chunking already-normalized MP3 audio.
pub async fn cut_segment(src: &Path, start: f64, length: f64, dst: &Path) -> Result<()> {
    let src_s = src.to_string_lossy();
    let dst_s = dst.to_string_lossy();
    let start_s = format!("{:.3}", start);
    let length_s = format!("{:.3}", length);

    let output = run_tool(
        "ffmpeg",
        &[
            "-y",
            "-i",
            src_s.as_ref(),
            "-ss",
            &start_s,
            "-t",
            &length_s,
            "-acodec",
            "copy",
            dst_s.as_ref(),
        ],
    )
    .await;

    if !output.success() {
        return Err(NotatError::Split(format!(
            "ffmpeg exited with code {} cutting {:.3}s..{:.3}s: {}",
            output.code,
            start,
            start + length,
            stderr_tail(&output.stderr)
        )));
    }

    debug!(
        "Cut segment {:.3}s +{:.3}s -> {}",
        start,
        length,
        dst.display()
    );
    Ok(())
}

/// Last portion of a stderr capture, enough to diagnose without flooding
/// the error message.
fn stderr_tail(stderr: &str) -> &str {
    const MAX_CHARS: usize = 800;

    let trimmed = stderr.trim_end();
    match trimmed.char_indices().rev().nth(MAX_CHARS - 1) {
        Some((idx, _)) => &trimmed[idx..],
        None => trimmed,
    }
}
