//! Configuration settings for Notat.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub provider: ProviderSettings,
    pub transcription: TranscriptionSettings,
    pub formatting: FormattingSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where finished Markdown notes land.
    pub output_dir: String,
    /// Directory for temporary audio artifacts.
    pub work_dir: String,
    /// Treat missing ffmpeg/ffprobe as a fatal error instead of a warning.
    pub require_tools: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: "./notes".to_string(),
            work_dir: "/tmp/notat".to_string(),
            require_tools: false,
        }
    }
}

/// Which API family serves transcription and chat calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI or any OpenAI-compatible endpoint (default).
    #[default]
    OpenAi,
    /// Azure OpenAI deployments.
    Azure,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "azure" => Ok(ProviderKind::Azure),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Azure => write!(f, "azure"),
        }
    }
}

/// API provider settings.
///
/// Credentials never live here: `OPENAI_API_KEY`, or for Azure
/// `AZURE_OPENAI_API_KEY` and `AZURE_OPENAI_ENDPOINT`, come from the
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// API family to call (openai, azure).
    pub client: ProviderKind,
    /// Base URL for OpenAI-compatible endpoints. Unset falls back to the
    /// `OPENAI_BASE_URL` environment variable, then the official API.
    pub base_url: Option<String>,
    /// Chat model for notes generation.
    pub chat_model: String,
    /// Transcription model.
    pub speech_model: String,
    /// Azure deployment settings, used when `client = "azure"`.
    pub azure: AzureSettings,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            client: ProviderKind::OpenAi,
            base_url: None,
            chat_model: "gpt-4o-mini".to_string(),
            speech_model: "whisper-1".to_string(),
            azure: AzureSettings::default(),
        }
    }
}

impl ProviderSettings {
    /// Model identifier sent with transcription requests. Azure substitutes
    /// the whisper deployment name.
    pub fn speech_model_name(&self) -> &str {
        match self.client {
            ProviderKind::OpenAi => &self.speech_model,
            ProviderKind::Azure => &self.azure.whisper_deployment,
        }
    }

    /// Model identifier sent with chat requests. Azure substitutes the GPT
    /// deployment name.
    pub fn chat_model_name(&self) -> &str {
        match self.client {
            ProviderKind::OpenAi => &self.chat_model,
            ProviderKind::Azure => &self.azure.gpt_deployment,
        }
    }

    /// Base URL override: the explicit setting wins, then `OPENAI_BASE_URL`.
    pub fn resolved_base_url(&self) -> Option<String> {
        self.base_url
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| {
                std::env::var("OPENAI_BASE_URL")
                    .ok()
                    .filter(|url| !url.is_empty())
            })
    }
}

/// Azure OpenAI deployment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureSettings {
    /// API version query parameter.
    pub api_version: String,
    /// Deployment serving transcription requests.
    pub whisper_deployment: String,
    /// Deployment serving chat requests.
    pub gpt_deployment: String,
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self {
            api_version: "2024-12-01-preview".to_string(),
            whisper_deployment: "whisper".to_string(),
            gpt_deployment: "gpt-4.1".to_string(),
        }
    }
}

/// Transcription retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Attempts per chunk before giving up.
    pub retry_attempts: u32,
    /// Base backoff delay; attempt k waits k times this.
    pub retry_base_delay_ms: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_base_delay_ms: 1500,
        }
    }
}

/// Notes formatting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingSettings {
    /// Sampling temperature for the notes model.
    pub temperature: f32,
}

impl Default for FormattingSettings {
    fn default() -> Self {
        Self { temperature: 0.7 }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or the default location if None.
    /// A missing file yields the defaults.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::NotatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Get the expanded work directory path.
    pub fn work_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.work_dir)
    }

    /// Retry policy for transcription calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.transcription.retry_attempts.max(1),
            base_delay: Duration::from_millis(self.transcription.retry_base_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.provider.client, ProviderKind::OpenAi);
        assert_eq!(settings.provider.chat_model, "gpt-4o-mini");
        assert_eq!(settings.provider.speech_model, "whisper-1");
        assert_eq!(settings.transcription.retry_attempts, 3);
        assert_eq!(settings.transcription.retry_base_delay_ms, 1500);
        assert_eq!(settings.formatting.temperature, 0.7);
        assert!(!settings.general.require_tools);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [provider]
            client = "azure"
            "#,
        )
        .unwrap();

        assert_eq!(settings.provider.client, ProviderKind::Azure);
        assert_eq!(settings.provider.azure.whisper_deployment, "whisper");
        assert_eq!(settings.general.output_dir, "./notes");
    }

    #[test]
    fn test_model_names_follow_the_provider() {
        let mut settings = Settings::default();
        assert_eq!(settings.provider.speech_model_name(), "whisper-1");
        assert_eq!(settings.provider.chat_model_name(), "gpt-4o-mini");

        settings.provider.client = ProviderKind::Azure;
        assert_eq!(settings.provider.speech_model_name(), "whisper");
        assert_eq!(settings.provider.chat_model_name(), "gpt-4.1");
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("openai".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!("Azure".parse::<ProviderKind>(), Ok(ProviderKind::Azure));
        assert!("anthropic".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_explicit_base_url_wins() {
        let mut settings = Settings::default();
        settings.provider.base_url = Some("https://example.test/v1".to_string());

        assert_eq!(
            settings.provider.resolved_base_url().as_deref(),
            Some("https://example.test/v1")
        );
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.general.output_dir = "~/lectures/notes".to_string();
        settings.transcription.retry_attempts = 5;
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(reloaded.general.output_dir, "~/lectures/notes");
        assert_eq!(reloaded.transcription.retry_attempts, 5);
        assert_eq!(reloaded.provider.client, ProviderKind::OpenAi);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let path = PathBuf::from("/nonexistent/notat/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();

        assert_eq!(settings.general.work_dir, "/tmp/notat");
    }

    #[test]
    fn test_expand_path_leaves_absolute_paths() {
        assert_eq!(
            Settings::expand_path("/var/tmp/notat"),
            PathBuf::from("/var/tmp/notat")
        );
    }

    #[test]
    fn test_retry_policy_never_drops_below_one_attempt() {
        let mut settings = Settings::default();
        settings.transcription.retry_attempts = 0;

        assert_eq!(settings.retry_policy().max_attempts, 1);
    }
}
