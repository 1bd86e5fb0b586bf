//! Configuration module for Notat.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    AzureSettings, FormattingSettings, GeneralSettings, ProviderKind, ProviderSettings, Settings,
    TranscriptionSettings,
};
