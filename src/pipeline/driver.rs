//! Stage sequencing and batch driving.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, instrument, warn};

use crate::config::Settings;
use crate::error::{NotatError, Result};
use crate::media;
use crate::notes::{render_document, strip_think_tags, ChatNotesGenerator, NotesGenerator};
use crate::openai::ApiClient;
use crate::pipeline::RunState;
use crate::retry::{with_retry, RetryPolicy};
use crate::tools;
use crate::transcription::{Transcriber, WhisperTranscriber, MAX_UPLOAD_BYTES};

/// Sequences the stages for one lecture and drives whole batches.
///
/// Everything is strictly sequential: one file at a time, one stage at a
/// time, one chunk at a time.
pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    notes: Arc<dyn NotesGenerator>,
    work_dir: PathBuf,
    output_dir: PathBuf,
    retry: RetryPolicy,
    upload_limit: u64,
}

impl Pipeline {
    /// Wire a pipeline from settings, with real API adapters.
    pub fn new(settings: &Settings) -> Result<Self> {
        let speech_client = ApiClient::for_speech(&settings.provider)?;
        let chat_client = ApiClient::for_chat(&settings.provider)?;

        let transcriber = Arc::new(WhisperTranscriber::new(
            speech_client,
            settings.provider.speech_model_name(),
        ));
        let notes = Arc::new(ChatNotesGenerator::new(
            chat_client,
            settings.provider.chat_model_name(),
            settings.formatting.temperature,
        ));

        let work_dir = settings.work_dir();
        std::fs::create_dir_all(&work_dir)?;

        Ok(Self {
            transcriber,
            notes,
            work_dir,
            output_dir: settings.output_dir(),
            retry: settings.retry_policy(),
            upload_limit: MAX_UPLOAD_BYTES,
        })
    }

    /// Build a pipeline from custom components.
    pub fn with_components(
        transcriber: Arc<dyn Transcriber>,
        notes: Arc<dyn NotesGenerator>,
        work_dir: PathBuf,
        output_dir: PathBuf,
        retry: RetryPolicy,
        upload_limit: u64,
    ) -> Self {
        Self {
            transcriber,
            notes,
            work_dir,
            output_dir,
            retry,
            upload_limit,
        }
    }

    /// Process one media file end to end.
    ///
    /// Cleanup always runs, whether the stages finished or aborted.
    #[instrument(skip(self), fields(media = %media_path.display()))]
    pub async fn process_file(&self, media_path: &Path) -> Result<RunSummary> {
        if !media_path.exists() {
            return Err(NotatError::MediaNotFound(media_path.display().to_string()));
        }

        let mut state = RunState::new(media_path);
        let result = self.run_stages(&mut state).await;
        self.cleanup(&state);
        result?;

        let output_path = state.output_path.clone().ok_or_else(|| {
            NotatError::Pipeline("run finished without an output document".to_string())
        })?;

        Ok(RunSummary {
            base_name: state.base_name,
            chunk_count: state.chunks.len(),
            transcript_chars: state.full_transcript.chars().count(),
            output_path,
        })
    }

    /// Process a list of files strictly in order, isolating failures.
    ///
    /// A failed file logs its name and error, then the batch moves on to
    /// the next one.
    pub async fn process_batch(&self, inputs: &[PathBuf]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let total = inputs.len();

        for (idx, path) in inputs.iter().enumerate() {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown");
            eprintln!("\n[{}/{}] {}", idx + 1, total, name);

            match self.process_file(path).await {
                Ok(run) => {
                    info!(
                        "Finished {} ({} chunks, {} chars)",
                        run.base_name, run.chunk_count, run.transcript_chars
                    );
                    summary.succeeded += 1;
                }
                Err(e) => {
                    error!("{}: {}", name, e);
                    eprintln!("  Failed: {}", e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    async fn run_stages(&self, state: &mut RunState) -> Result<()> {
        self.convert(state).await?;
        self.probe(state).await?;
        self.split(state).await?;
        self.transcribe_chunks(state).await?;
        self.merge(state)?;
        self.format(state).await?;
        self.write(state)
    }

    /// Extract a normalized MP3 into the work directory.
    async fn convert(&self, state: &mut RunState) -> Result<()> {
        eprintln!("  Extracting audio...");

        let audio_path = self
            .work_dir
            .join(format!("temp_{}_{}.mp3", state.base_name, state.run_id));

        media::extract_audio(&state.media_path, &audio_path).await?;

        info!("Extracted audio to {}", audio_path.display());
        state.audio_path = Some(audio_path);
        Ok(())
    }

    /// Measure duration and size of the extracted audio.
    async fn probe(&self, state: &mut RunState) -> Result<()> {
        let audio = require_audio(state)?;

        let duration = media::probe_duration(&audio).await?;
        let size = tools::file_size(&audio)?;

        eprintln!(
            "  Audio: {:.1}s, {:.2} MiB",
            duration,
            size as f64 / (1024.0 * 1024.0)
        );
        state.duration_seconds = duration;
        Ok(())
    }

    /// Split into upload-sized chunks when the audio is over the limit.
    async fn split(&self, state: &mut RunState) -> Result<()> {
        let audio = require_audio(state)?;

        let chunks = media::split_audio(&audio, self.upload_limit, state.duration_seconds).await?;

        if chunks.len() > 1 {
            eprintln!("  Split into {} chunks", chunks.len());
        }
        state.chunks = chunks;
        Ok(())
    }

    /// Transcribe every chunk in timeline order.
    async fn transcribe_chunks(&self, state: &mut RunState) -> Result<()> {
        let chunks = state.chunks.clone();
        let total = chunks.len();

        eprintln!("  Transcribing...");

        let pb = (total > 1).then(|| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  {spinner:.green} Whisper   [{bar:30.cyan/blue}] {pos}/{len}")
                    .unwrap()
                    .progress_chars("█▓░"),
            );
            pb
        });

        for (idx, chunk) in chunks.iter().enumerate() {
            info!("Transcribing chunk {}/{}", idx + 1, total);

            // An oversized payload can never succeed; it is rejected here
            // and the adapter is not invoked at all.
            let size = tools::file_size(chunk)?;
            if size > self.upload_limit {
                if let Some(pb) = &pb {
                    pb.finish_and_clear();
                }
                return Err(NotatError::ChunkTooLarge {
                    path: chunk.clone(),
                    size_bytes: size,
                    limit_bytes: self.upload_limit,
                });
            }

            match with_retry(self.retry, || self.transcriber.transcribe(chunk)).await {
                Ok(text) => {
                    state.transcripts.push(text);
                    if let Some(pb) = &pb {
                        pb.inc(1);
                    }
                }
                Err(e) => {
                    if let Some(pb) = &pb {
                        pb.finish_and_clear();
                    }
                    eprintln!("  Error: chunk {} failed: {}", idx, e);
                    return Err(e);
                }
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        Ok(())
    }

    /// Join chunk transcripts into one text.
    fn merge(&self, state: &mut RunState) -> Result<()> {
        if state.transcripts.len() != state.chunks.len() {
            return Err(NotatError::Pipeline(format!(
                "have {} transcripts for {} chunks",
                state.transcripts.len(),
                state.chunks.len()
            )));
        }

        state.full_transcript = state.transcripts.join(" ").trim().to_string();
        info!(
            "Merged transcript: {} characters",
            state.full_transcript.chars().count()
        );
        Ok(())
    }

    /// Turn the transcript into the final Markdown document.
    async fn format(&self, state: &mut RunState) -> Result<()> {
        eprintln!("  Generating notes...");

        let raw = self.notes.generate(&state.full_transcript).await?;
        let body = strip_think_tags(&raw);
        state.notes_markdown = render_document(&state.base_name, &body);
        Ok(())
    }

    /// Write the document into the output directory.
    fn write(&self, state: &mut RunState) -> Result<()> {
        let output_path = self.output_dir.join(format!("{}.md", state.base_name));

        tools::write_text(&output_path, &state.notes_markdown)?;

        eprintln!("  Saved {}", output_path.display());
        state.output_path = Some(output_path);
        Ok(())
    }

    /// Remove every temp artifact of one run.
    ///
    /// Runs whether the stages finished or failed partway: chunks that
    /// are not the extracted audio itself go first, then the temp audio.
    /// Removal is idempotent, so artifacts a failed stage never created
    /// cost nothing, and removal failures are warnings, never run
    /// failures.
    fn cleanup(&self, state: &RunState) {
        let audio = state.audio_path.as_deref();

        for chunk in &state.chunks {
            if audio != Some(chunk.as_path()) {
                if let Err(e) = tools::remove_file(chunk) {
                    warn!("Failed to remove chunk {}: {}", chunk.display(), e);
                }
            }
        }

        if let Some(audio) = audio {
            if let Err(e) = tools::remove_file(audio) {
                warn!("Failed to remove temp audio {}: {}", audio.display(), e);
            }
        }
    }
}

/// Result of one processed lecture.
#[derive(Debug)]
pub struct RunSummary {
    /// Input file stem.
    pub base_name: String,
    /// Number of chunks transcribed.
    pub chunk_count: usize,
    /// Length of the merged transcript in characters.
    pub transcript_chars: usize,
    /// Where the document was written.
    pub output_path: PathBuf,
}

/// Totals for one batch invocation.
#[derive(Debug, Default, PartialEq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

fn require_audio(state: &RunState) -> Result<PathBuf> {
    state.audio_path.clone().ok_or_else(|| {
        NotatError::Pipeline("no extracted audio; convert must run first".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Returns `text-<stem>` for each chunk and counts invocations.
    struct EchoTranscriber {
        calls: AtomicUsize,
    }

    impl EchoTranscriber {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Transcriber for EchoTranscriber {
        async fn transcribe(&self, audio_path: &Path) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let stem = audio_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("?");
            Ok(format!("text-{}", stem))
        }
    }

    /// Fails twice, then succeeds.
    struct FlakyTranscriber {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transcriber for FlakyTranscriber {
        async fn transcribe(&self, _audio_path: &Path) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(NotatError::Transcription(format!("attempt {} timed out", n)))
            } else {
                Ok("recovered".to_string())
            }
        }
    }

    struct StaticNotes;

    #[async_trait]
    impl NotesGenerator for StaticNotes {
        async fn generate(&self, transcript: &str) -> Result<String> {
            Ok(format!("<think>outline first</think>## Summary\n\n{}", transcript))
        }
    }

    fn test_pipeline(dir: &Path, transcriber: Arc<dyn Transcriber>, limit: u64) -> Pipeline {
        Pipeline::with_components(
            transcriber,
            Arc::new(StaticNotes),
            dir.to_path_buf(),
            dir.join("notes"),
            RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
            },
            limit,
        )
    }

    fn write_chunk(dir: &Path, name: &str, bytes: usize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    #[test]
    fn test_merge_joins_in_chunk_order() {
        let pipeline = test_pipeline(Path::new("/tmp"), EchoTranscriber::new(), 100);
        let mut state = RunState::new(Path::new("lec.mp4"));
        state.chunks = vec!["c0.mp3".into(), "c1.mp3".into(), "c2.mp3".into()];
        state.transcripts = vec!["a".into(), "b".into(), "c".into()];

        pipeline.merge(&mut state).unwrap();

        assert_eq!(state.full_transcript, "a b c");
    }

    #[test]
    fn test_merge_trims_outer_whitespace_only() {
        let pipeline = test_pipeline(Path::new("/tmp"), EchoTranscriber::new(), 100);
        let mut state = RunState::new(Path::new("lec.mp4"));
        state.chunks = vec!["c0.mp3".into(), "c1.mp3".into()];
        state.transcripts = vec![" hello ".into(), "world ".into()];

        pipeline.merge(&mut state).unwrap();

        assert_eq!(state.full_transcript, "hello  world");
    }

    #[test]
    fn test_merge_rejects_count_mismatch() {
        let pipeline = test_pipeline(Path::new("/tmp"), EchoTranscriber::new(), 100);
        let mut state = RunState::new(Path::new("lec.mp4"));
        state.chunks = vec!["c0.mp3".into(), "c1.mp3".into()];
        state.transcripts = vec!["only one".into()];

        let err = pipeline.merge(&mut state).unwrap_err();

        assert!(matches!(err, NotatError::Pipeline(_)));
    }

    #[tokio::test]
    async fn test_chunks_transcribed_in_timeline_order() {
        let dir = tempfile::tempdir().unwrap();
        let echo = EchoTranscriber::new();
        let pipeline = test_pipeline(dir.path(), echo.clone(), 1000);

        let mut state = RunState::new(Path::new("lec.mp4"));
        state.chunks = vec![
            write_chunk(dir.path(), "c0.mp3", 10),
            write_chunk(dir.path(), "c1.mp3", 10),
            write_chunk(dir.path(), "c2.mp3", 10),
        ];

        pipeline.transcribe_chunks(&mut state).await.unwrap();

        assert_eq!(state.transcripts, vec!["text-c0", "text-c1", "text-c2"]);
        assert_eq!(echo.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_oversized_chunk_never_reaches_the_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let echo = EchoTranscriber::new();
        let pipeline = test_pipeline(dir.path(), echo.clone(), 32);

        let mut state = RunState::new(Path::new("lec.mp4"));
        state.chunks = vec![write_chunk(dir.path(), "big.mp3", 64)];

        let err = pipeline.transcribe_chunks(&mut state).await.unwrap_err();

        assert!(err.is_precondition());
        assert_eq!(echo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transient_failures_retry_within_the_stage() {
        let dir = tempfile::tempdir().unwrap();
        let flaky = Arc::new(FlakyTranscriber {
            calls: AtomicUsize::new(0),
        });
        let pipeline = test_pipeline(dir.path(), flaky.clone(), 1000);

        let mut state = RunState::new(Path::new("lec.mp4"));
        state.chunks = vec![write_chunk(dir.path(), "c0.mp3", 10)];

        pipeline.transcribe_chunks(&mut state).await.unwrap();

        assert_eq!(state.transcripts, vec!["recovered"]);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_format_strips_think_tags_and_frames_document() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path(), EchoTranscriber::new(), 100);

        let mut state = RunState::new(Path::new("lec.mp4"));
        state.full_transcript = "a b c".to_string();

        pipeline.format(&mut state).await.unwrap();

        assert!(state.notes_markdown.starts_with("\n\n## Notes for lec\n\n"));
        assert!(state.notes_markdown.contains("## Summary\n\na b c"));
        assert!(state.notes_markdown.ends_with("\n\n---\n"));
        assert!(!state.notes_markdown.contains("<think>"));
    }

    #[test]
    fn test_write_creates_output_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path(), EchoTranscriber::new(), 100);

        let mut state = RunState::new(Path::new("lec.mp4"));
        state.notes_markdown = "first version".to_string();
        pipeline.write(&mut state).unwrap();

        let output = dir.path().join("notes/lec.md");
        assert_eq!(state.output_path.as_deref(), Some(output.as_path()));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "first version");

        state.notes_markdown = "second version".to_string();
        pipeline.write(&mut state).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "second version");
    }

    #[test]
    fn test_cleanup_removes_chunks_and_temp_audio() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path(), EchoTranscriber::new(), 100);

        let audio = write_chunk(dir.path(), "temp_lec_ab12cd34.mp3", 10);
        let parts = vec![
            write_chunk(dir.path(), "temp_lec_ab12cd34_part0.mp3", 10),
            write_chunk(dir.path(), "temp_lec_ab12cd34_part1.mp3", 10),
            write_chunk(dir.path(), "temp_lec_ab12cd34_part2.mp3", 10),
        ];

        let mut state = RunState::new(Path::new("lec.mp4"));
        state.audio_path = Some(audio.clone());
        state.chunks = parts.clone();

        pipeline.cleanup(&state);

        assert!(!audio.exists());
        for part in parts {
            assert!(!part.exists());
        }
    }

    #[test]
    fn test_cleanup_single_chunk_case_removes_audio_once() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path(), EchoTranscriber::new(), 100);

        let audio = write_chunk(dir.path(), "temp_lec_ab12cd34.mp3", 10);
        let mut state = RunState::new(Path::new("lec.mp4"));
        state.audio_path = Some(audio.clone());
        state.chunks = vec![audio.clone()];

        pipeline.cleanup(&state);
        assert!(!audio.exists());

        // Running cleanup again hits only already-absent paths.
        pipeline.cleanup(&state);
    }

    #[test]
    fn test_cleanup_before_convert_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path(), EchoTranscriber::new(), 100);

        let state = RunState::new(Path::new("lec.mp4"));
        pipeline.cleanup(&state);
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_any_stage() {
        let dir = tempfile::tempdir().unwrap();
        let echo = EchoTranscriber::new();
        let pipeline = test_pipeline(dir.path(), echo.clone(), 100);

        let err = pipeline
            .process_file(Path::new("/nonexistent/lec.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(err, NotatError::MediaNotFound(_)));
        assert_eq!(echo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_probe_requires_extracted_audio() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path(), EchoTranscriber::new(), 100);

        let mut state = RunState::new(Path::new("lec.mp4"));
        let err = pipeline.probe(&mut state).await.unwrap_err();

        assert!(matches!(err, NotatError::Pipeline(_)));
    }

    #[tokio::test]
    async fn test_batch_isolates_per_file_failures() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path(), EchoTranscriber::new(), 100);

        let inputs = vec![
            PathBuf::from("/nonexistent/a.mp4"),
            PathBuf::from("/nonexistent/b.mp4"),
        ];

        let summary = pipeline.process_batch(&inputs).await;

        assert_eq!(
            summary,
            BatchSummary {
                succeeded: 0,
                failed: 2
            }
        );
    }
}
