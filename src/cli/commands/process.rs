//! Process command implementation.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::error::NotatError;
use crate::media;
use crate::pipeline::Pipeline;
use crate::tools;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Run the process command.
pub async fn run_process(
    input: &str,
    output_dir: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(dir) = output_dir {
        settings.general.output_dir = dir;
    }

    // Pre-flight checks
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'notat doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    tools::check_media_tools(settings.general.require_tools).await?;

    let inputs = collect_inputs(Path::new(input))?;

    if inputs.is_empty() {
        Output::warning(&format!("No media files found in {}", input));
        return Ok(());
    }

    Output::info(&format!("Found {} media file(s) to process", inputs.len()));

    let pipeline = Pipeline::new(&settings)?;
    let summary = pipeline.process_batch(&inputs).await;

    println!();
    Output::info(&format!(
        "Batch complete: {} notes written, {} failed",
        summary.succeeded, summary.failed
    ));

    Ok(())
}

/// Resolve the input argument to a list of media files.
///
/// A file is accepted as-is when its extension is a known media format. A
/// directory is scanned one level deep and its media files are processed in
/// name order.
fn collect_inputs(input: &Path) -> crate::error::Result<Vec<PathBuf>> {
    if input.is_file() {
        if media::is_media_file(input) {
            Ok(vec![input.to_path_buf()])
        } else {
            Err(NotatError::InvalidInput(format!(
                "{} is not a supported audio or video format",
                input.display()
            )))
        }
    } else if input.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(input)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && media::is_media_file(path))
            .collect();
        files.sort();
        Ok(files)
    } else {
        Err(NotatError::MediaNotFound(input.display().to_string()))
    }
}
