//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let mut settings = settings;
            apply_setting(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
            Output::info(&format!(
                "Saved to {}",
                Settings::default_config_path().display()
            ));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            // Try to open in editor
            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply a dotted key like "provider.chat_model" to the settings tree.
fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.output_dir" => settings.general.output_dir = value.to_string(),
        "general.work_dir" => settings.general.work_dir = value.to_string(),
        "general.require_tools" => settings.general.require_tools = parse_value(key, value)?,
        "provider.client" => settings.provider.client = parse_value(key, value)?,
        "provider.base_url" => settings.provider.base_url = Some(value.to_string()),
        "provider.chat_model" => settings.provider.chat_model = value.to_string(),
        "provider.speech_model" => settings.provider.speech_model = value.to_string(),
        "provider.azure.api_version" => settings.provider.azure.api_version = value.to_string(),
        "provider.azure.whisper_deployment" => {
            settings.provider.azure.whisper_deployment = value.to_string()
        }
        "provider.azure.gpt_deployment" => {
            settings.provider.azure.gpt_deployment = value.to_string()
        }
        "transcription.retry_attempts" => {
            settings.transcription.retry_attempts = parse_value(key, value)?
        }
        "transcription.retry_base_delay_ms" => {
            settings.transcription.retry_base_delay_ms = parse_value(key, value)?
        }
        "formatting.temperature" => settings.formatting.temperature = parse_value(key, value)?,
        _ => {
            return Err(anyhow::anyhow!(
                "Unknown configuration key: {} (see 'notat config show' for available keys)",
                key
            ))
        }
    }
    Ok(())
}

/// Parse a typed value, mapping parse failures to a key-specific error.
fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}
