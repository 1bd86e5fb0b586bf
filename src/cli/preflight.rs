//! Pre-flight checks before expensive operations.
//!
//! Validates that provider credentials are configured before starting a run
//! that would otherwise fail midway through transcription.

use crate::config::{ProviderKind, Settings};
use crate::error::{NotatError, Result};

/// Verify that the configured provider has its credentials in the environment.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(settings: &Settings) -> Result<()> {
    match settings.provider.client {
        ProviderKind::OpenAi => {
            check_env("OPENAI_API_KEY", "export OPENAI_API_KEY='sk-...'")?;
        }
        ProviderKind::Azure => {
            check_env("AZURE_OPENAI_API_KEY", "export AZURE_OPENAI_API_KEY='...'")?;
            check_env(
                "AZURE_OPENAI_ENDPOINT",
                "export AZURE_OPENAI_ENDPOINT='https://<resource>.openai.azure.com'",
            )?;
        }
    }
    Ok(())
}

/// Check that an environment variable is set and non-empty.
fn check_env(name: &str, example: &str) -> Result<()> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(()),
        Ok(_) => Err(NotatError::Config(format!(
            "{} is empty. Set it with: {}",
            name, example
        ))),
        Err(_) => Err(NotatError::Config(format!(
            "{} not set. Set it with: {}",
            name, example
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_env_reports_missing_variable() {
        let err = check_env("NOTAT_TEST_UNSET_VARIABLE", "export ...").unwrap_err();
        assert!(err.to_string().contains("NOTAT_TEST_UNSET_VARIABLE"));
    }

    #[test]
    fn test_check_env_accepts_set_variable() {
        std::env::set_var("NOTAT_TEST_SET_VARIABLE", "value");
        assert!(check_env("NOTAT_TEST_SET_VARIABLE", "export ...").is_ok());
    }
}
