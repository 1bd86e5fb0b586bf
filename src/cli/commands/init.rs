//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::{ProviderKind, Settings};
use console::style;
use std::io::{self, Write};

/// Simple check result for init command.
struct CheckIssue {
    name: String,
    hint: String,
}

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Notat Setup");
    println!();
    println!("Welcome to Notat! Let's make sure everything is configured correctly.\n");

    // Step 1: Check prerequisites
    println!("{}", style("Step 1: Checking prerequisites").bold().cyan());
    println!();

    let tool_issues = check_prerequisites();

    if !tool_issues.is_empty() {
        Output::warning("Some tools are missing. Please install them:");
        println!();
        for issue in &tool_issues {
            println!("  {} {} - not found", style("✗").red(), style(&issue.name).bold());
            println!("    {} {}", style("→").dim(), style(&issue.hint).dim());
        }
        println!();

        if !prompt_continue("Continue anyway?")? {
            println!();
            Output::info("Setup cancelled. Install the missing tools and run 'notat init' again.");
            return Ok(());
        }
    } else {
        Output::success("All required tools are installed!");
    }

    println!();

    // Step 2: Check API credentials
    println!("{}", style("Step 2: Checking API configuration").bold().cyan());
    println!();

    if !credentials_present(settings) {
        match settings.provider.client {
            ProviderKind::OpenAi => {
                Output::warning("OPENAI_API_KEY environment variable is not set.");
                println!();
                println!("  Notat requires an OpenAI API key for transcription and notes generation.");
                println!("  Get your API key from: {}", style("https://platform.openai.com/api-keys").underlined());
                println!();
                println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
                println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
            }
            ProviderKind::Azure => {
                Output::warning("Azure OpenAI credentials are not set.");
                println!();
                println!("  Notat needs both the API key and the resource endpoint:");
                println!("  {}", style("export AZURE_OPENAI_API_KEY='...'").green());
                println!("  {}", style("export AZURE_OPENAI_ENDPOINT='https://<resource>.openai.azure.com'").green());
            }
        }
        println!();

        if !prompt_continue("Continue without credentials?")? {
            println!();
            Output::info("Setup cancelled. Set your credentials and run 'notat init' again.");
            return Ok(());
        }
    } else {
        Output::success("API credentials are configured!");
    }

    println!();

    // Step 3: Create directories
    println!("{}", style("Step 3: Setting up directories").bold().cyan());
    println!();

    let output_dir = settings.output_dir();
    let work_dir = settings.work_dir();

    if !output_dir.exists() {
        std::fs::create_dir_all(&output_dir)?;
        Output::success(&format!("Created output directory: {}", output_dir.display()));
    } else {
        Output::info(&format!("Output directory exists: {}", output_dir.display()));
    }

    if !work_dir.exists() {
        std::fs::create_dir_all(&work_dir)?;
        Output::success(&format!("Created work directory: {}", work_dir.display()));
    } else {
        Output::info(&format!("Work directory exists: {}", work_dir.display()));
    }

    println!();

    // Step 4: Create config file
    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("notat config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("notat doctor").cyan());
    println!("  {} Turn a recording into notes", style("notat process <file>").cyan());
    println!("  {} Process a whole folder of recordings", style("notat process <dir>").cyan());
    println!();
    println!("For more help: {}", style("notat --help").cyan());

    Ok(())
}

/// Check prerequisites and return any issues.
fn check_prerequisites() -> Vec<CheckIssue> {
    use std::process::Command;

    let mut issues = Vec::new();

    for tool in ["ffmpeg", "ffprobe"] {
        if Command::new(tool).arg("-version").output().is_err() {
            issues.push(CheckIssue {
                name: tool.to_string(),
                hint: install_hint(tool).to_string(),
            });
        }
    }

    issues
}

/// Whether the configured provider already has credentials in the environment.
fn credentials_present(settings: &Settings) -> bool {
    match settings.provider.client {
        ProviderKind::OpenAi => std::env::var("OPENAI_API_KEY").is_ok(),
        ProviderKind::Azure => {
            std::env::var("AZURE_OPENAI_API_KEY").is_ok()
                && std::env::var("AZURE_OPENAI_ENDPOINT").is_ok()
        }
    }
}

/// Get platform-specific install hint.
fn install_hint(tool: &str) -> &'static str {
    match tool {
        "ffmpeg" | "ffprobe" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install ffmpeg"
            } else if cfg!(target_os = "linux") {
                "Install with: sudo apt install ffmpeg"
            } else {
                "Install from: https://ffmpeg.org/download.html"
            }
        }
        _ => "Check the documentation for installation instructions",
    }
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
