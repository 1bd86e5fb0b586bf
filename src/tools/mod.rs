//! Subprocess and filesystem access.
//!
//! Every external side effect of the pipeline flows through this module:
//! running ffmpeg/ffprobe, writing documents, and removing temp files.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{NotatError, Result};

/// External binaries the media stages depend on.
pub const MEDIA_TOOLS: &[&str] = &["ffmpeg", "ffprobe"];

/// Captured result of a finished (or failed-to-launch) subprocess.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs an external tool and captures its output.
///
/// This never returns an error: a process that cannot be launched at all
/// yields a synthetic failure with exit code 1 and the cause on stderr,
/// so callers handle launch failure and tool failure through one path.
pub async fn run_tool(program: &str, args: &[&str]) -> ToolOutput {
    debug!("Running {} {}", program, args.join(" "));

    let result = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(output) => ToolOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
        Err(e) => ToolOutput {
            code: 1,
            stdout: String::new(),
            stderr: format!("failed to launch {}: {}", program, e),
        },
    }
}

/// Probes for ffmpeg and ffprobe once at startup.
///
/// Returns Ok(true) when both respond to `-version`. When one is missing:
/// with `fail_if_missing` the run aborts with a `ToolNotFound` error,
/// otherwise a warning is logged and Ok(false) lets the run proceed until
/// the media stages fail on their own.
pub async fn check_media_tools(fail_if_missing: bool) -> Result<bool> {
    let mut missing = Vec::new();

    for tool in MEDIA_TOOLS {
        let output = run_tool(tool, &["-version"]).await;
        if !output.success() {
            missing.push(*tool);
        }
    }

    if missing.is_empty() {
        return Ok(true);
    }

    let names = missing.join(", ");
    if fail_if_missing {
        return Err(NotatError::ToolNotFound(names));
    }

    warn!(
        "Missing media tools: {}. Conversion and splitting will fail until they are installed.",
        names
    );
    Ok(false)
}

/// Writes a text file, creating any missing parent directories first.
/// An existing file at the path is overwritten.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Size of a file in bytes.
pub fn file_size(path: &Path) -> Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

/// Removes a file if it exists. Removing an already-absent path succeeds,
/// which keeps cleanup idempotent.
pub fn remove_file(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
