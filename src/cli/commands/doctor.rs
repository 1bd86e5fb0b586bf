//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{ProviderKind, Settings};
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Notat Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Check external tools
    println!("{}", style("External Tools").bold());
    checks.push(check_tool("ffmpeg", install_hint_ffmpeg()));
    checks.push(check_tool("ffprobe", install_hint_ffmpeg()));
    for check in &checks {
        check.print();
    }

    println!();

    // Check API credentials for the configured provider
    println!("{}", style("API Configuration").bold());
    let api_checks = check_provider_credentials(settings);
    for check in &api_checks {
        check.print();
    }
    checks.extend(api_checks);

    println!();

    // Show resolved provider settings
    println!("{}", style("Provider").bold());
    Output::kv("provider", &settings.provider.client.to_string());
    Output::kv("speech model", settings.provider.speech_model_name());
    Output::kv("chat model", settings.provider.chat_model_name());
    if let Some(url) = settings.provider.resolved_base_url() {
        Output::kv("base url", &url);
    }

    println!();

    // Check directories
    println!("{}", style("Directories").bold());
    let dir_checks = check_directories(settings);
    for check in &dir_checks {
        check.print();
    }
    checks.extend(dir_checks);

    println!();

    // Check configuration
    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Notat.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!(
            "All checks passed with {} warning(s).",
            warnings
        ));
    } else {
        Output::success("All checks passed! Notat is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg("-version").output() {
        Ok(output) if output.status.success() => {
            // Try to extract version from first line
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            // Truncate long version strings
            let version_display = if version.len() > 50 {
                format!("{}...", &version[..50])
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check credentials for whichever provider is configured.
fn check_provider_credentials(settings: &Settings) -> Vec<CheckResult> {
    match settings.provider.client {
        ProviderKind::OpenAi => vec![check_openai_api_key()],
        ProviderKind::Azure => check_azure_credentials(),
    }
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", mask_key(&key)))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check if Azure OpenAI credentials are configured.
fn check_azure_credentials() -> Vec<CheckResult> {
    let mut results = Vec::new();

    match std::env::var("AZURE_OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => {
            results.push(CheckResult::ok(
                "AZURE_OPENAI_API_KEY",
                &format!("configured ({})", mask_key(&key)),
            ));
        }
        _ => results.push(CheckResult::error(
            "AZURE_OPENAI_API_KEY",
            "not set",
            "Set with: export AZURE_OPENAI_API_KEY='...'",
        )),
    }

    match std::env::var("AZURE_OPENAI_ENDPOINT") {
        Ok(endpoint) if !endpoint.is_empty() => {
            results.push(CheckResult::ok("AZURE_OPENAI_ENDPOINT", &endpoint));
        }
        _ => results.push(CheckResult::error(
            "AZURE_OPENAI_ENDPOINT",
            "not set",
            "Set with: export AZURE_OPENAI_ENDPOINT='https://<resource>.openai.azure.com'",
        )),
    }

    results
}

/// Check output and work directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let named_dirs = [
        ("Output directory", settings.output_dir()),
        ("Work directory", settings.work_dir()),
    ];

    for (name, dir) in named_dirs {
        if dir.exists() {
            match probe_writable(&dir) {
                Ok(()) => {
                    results.push(CheckResult::ok(name, &format!("{} (writable)", dir.display())))
                }
                Err(e) => results.push(CheckResult::error(
                    name,
                    &format!("{} is not writable: {}", dir.display(), e),
                    "Fix the permissions or point the setting at another directory",
                )),
            }
        } else {
            results.push(CheckResult::warning(
                name,
                &format!("{} (will be created)", dir.display()),
                "Directory will be created on first use",
            ));
        }
    }

    results
}

/// Create and remove a probe file to confirm the directory is writable.
fn probe_writable(dir: &std::path::Path) -> std::io::Result<()> {
    let probe = dir.join(".notat-doctor-probe");
    std::fs::write(&probe, b"probe")?;
    std::fs::remove_file(&probe)?;
    Ok(())
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: notat init (or notat config edit)",
        )
    }
}

/// Show enough of an API key to recognize it without printing the secret.
fn mask_key(key: &str) -> String {
    if key.len() > 12 {
        format!("{}...{}", &key[..7], &key[key.len() - 4..])
    } else {
        "*".repeat(key.len())
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask_key_keeps_only_the_ends() {
        let masked = mask_key("sk-proj-abcdefghijklmnop1234");
        assert_eq!(masked, "sk-proj...1234");
        assert!(!masked.contains("abcdefgh"));
    }

    #[test]
    fn test_mask_key_hides_short_keys_entirely() {
        assert_eq!(mask_key("secret"), "******");
    }

    #[test]
    fn test_probe_writable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(probe_writable(dir.path()).is_ok());
        // The probe file never survives the check.
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());

        assert!(probe_writable(std::path::Path::new("/nonexistent/dir")).is_err());
    }
}
