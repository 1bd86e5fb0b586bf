//! Size-based audio splitting.
//!
//! When an extracted audio file exceeds the transcription upload ceiling,
//! it is cut into equal time windows under the assumption that bytes are
//! spread roughly linearly over the timeline. Variable-bitrate skew can
//! leave an individual chunk over the limit; that produces a warning here
//! and a typed precondition failure at the transcription stage, never a
//! re-split.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::media::extract::cut_segment;
use crate::tools;

/// How a too-large audio file will be cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkPlan {
    pub num_chunks: u64,
    pub chunk_duration: f64,
}

/// Plans a linear split for a file of `total_bytes`.
///
/// Files at or under the limit return `None`; no chunk count is computed
/// for them. Otherwise the chunk count is the byte ratio rounded up, and
/// the timeline is divided evenly across it. A zero duration (a failed
/// probe) counts as one second so every window stays positive.
pub fn plan_chunks(total_bytes: u64, limit_bytes: u64, duration_seconds: f64) -> Option<ChunkPlan> {
    if total_bytes <= limit_bytes {
        return None;
    }

    let num_chunks = total_bytes.div_ceil(limit_bytes.max(1));
    let duration = duration_seconds.max(1.0);

    Some(ChunkPlan {
        num_chunks,
        chunk_duration: duration / num_chunks as f64,
    })
}

/// Splits an audio file into upload-sized chunks.
///
/// A file under the limit is returned untouched as the single element of
/// the chunk list. Otherwise chunk `i` covers the window starting at
/// `i * chunk_duration` and is written as `<stem>_part<i>.mp3` next to
/// the source. Cut failures abort the run.
pub async fn split_audio(
    audio: &Path,
    limit_bytes: u64,
    duration_seconds: f64,
) -> Result<Vec<PathBuf>> {
    let size = tools::file_size(audio)?;

    let Some(plan) = plan_chunks(size, limit_bytes, duration_seconds) else {
        return Ok(vec![audio.to_path_buf()]);
    };

    info!(
        "Splitting {} ({} bytes) into {} chunks of {:.2}s",
        audio.display(),
        size,
        plan.num_chunks,
        plan.chunk_duration
    );

    let stem = audio
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let parent = audio.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut chunks = Vec::with_capacity(plan.num_chunks as usize);

    for i in 0..plan.num_chunks {
        let chunk_path = parent.join(format!("{}_part{}.mp3", stem, i));
        let start = i as f64 * plan.chunk_duration;

        cut_segment(audio, start, plan.chunk_duration, &chunk_path).await?;

        let chunk_size = tools::file_size(&chunk_path)?;
        if chunk_size > limit_bytes {
            warn!(
                "Chunk {} is {} bytes, still over the {} byte limit; transcription will reject it",
                chunk_path.display(),
                chunk_size,
                limit_bytes
            );
        }

        chunks.push(chunk_path);
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_file_under_limit_needs_no_plan() {
        assert_eq!(plan_chunks(10 * MIB, 25 * MIB, 600.0), None);
    }

    #[test]
    fn test_file_exactly_at_limit_needs_no_plan() {
        assert_eq!(plan_chunks(25 * MIB, 25 * MIB, 600.0), None);
    }

    #[test]
    fn test_one_byte_over_limit_makes_two_chunks() {
        let plan = plan_chunks(25 * MIB + 1, 25 * MIB, 100.0).unwrap();
        assert_eq!(plan.num_chunks, 2);
        assert_eq!(plan.chunk_duration, 50.0);
    }

    #[test]
    fn test_exact_multiple_rounds_to_ratio() {
        let plan = plan_chunks(50 * MIB, 25 * MIB, 100.0).unwrap();
        assert_eq!(plan.num_chunks, 2);
    }

    #[test]
    fn test_80_mib_over_3000_seconds_makes_four_750s_chunks() {
        let plan = plan_chunks(80 * MIB, 25 * MIB, 3000.0).unwrap();
        assert_eq!(plan.num_chunks, 4);
        assert_eq!(plan.chunk_duration, 750.0);

        // Windows tile the timeline contiguously from zero.
        for i in 0..plan.num_chunks {
            let start = i as f64 * plan.chunk_duration;
            assert_eq!(start, (i * 750) as f64);
        }
        assert_eq!(plan.num_chunks as f64 * plan.chunk_duration, 3000.0);
    }

    #[test]
    fn test_zero_duration_counts_as_one_second() {
        let plan = plan_chunks(80 * MIB, 25 * MIB, 0.0).unwrap();
        assert_eq!(plan.num_chunks, 4);
        assert_eq!(plan.chunk_duration, 0.25);
    }

    #[tokio::test]
    async fn test_split_under_limit_returns_original_path() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("lecture.mp3");
        std::fs::write(&audio, vec![0u8; 100]).unwrap();

        let chunks = split_audio(&audio, 1000, 30.0).await.unwrap();

        assert_eq!(chunks, vec![audio]);
    }
}
