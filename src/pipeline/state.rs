//! Per-run pipeline state.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Everything one lecture accumulates on its way through the stages.
///
/// Created once per input file and populated monotonically: each stage
/// fills in its own fields and leaves the rest alone, so the cleanup
/// stage can always see exactly which artifacts exist.
#[derive(Debug, Clone)]
pub struct RunState {
    /// The input media file.
    pub media_path: PathBuf,
    /// Input file stem; names the temp audio and the output document.
    pub base_name: String,
    /// Per-run token that keeps temp file names unique across runs.
    pub run_id: String,
    /// Extracted temp audio, once the convert stage has produced it.
    pub audio_path: Option<PathBuf>,
    /// Probed duration; 0.0 when no duration could be read.
    pub duration_seconds: f64,
    /// Chunk paths in timeline order. A file under the upload limit has
    /// exactly one chunk: the extracted audio itself.
    pub chunks: Vec<PathBuf>,
    /// One transcript per chunk, index-aligned with `chunks`.
    pub transcripts: Vec<String>,
    /// All chunk transcripts joined.
    pub full_transcript: String,
    /// The rendered Markdown document.
    pub notes_markdown: String,
    /// Where the document was written.
    pub output_path: Option<PathBuf>,
}

impl RunState {
    /// Fresh state for one input file.
    pub fn new(media_path: &Path) -> Self {
        let base_name = media_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("lecture")
            .to_string();

        let mut run_id = Uuid::new_v4().simple().to_string();
        run_id.truncate(8);

        Self {
            media_path: media_path.to_path_buf(),
            base_name,
            run_id,
            audio_path: None,
            duration_seconds: 0.0,
            chunks: Vec::new(),
            transcripts: Vec::new(),
            full_transcript: String::new(),
            notes_markdown: String::new(),
            output_path: None,
        }
    }
}
