//! API client construction for OpenAI-compatible and Azure OpenAI backends.

use std::time::Duration;

use async_openai::config::{AzureConfig, OpenAIConfig};
use async_openai::types::{
    CreateChatCompletionRequest, CreateChatCompletionResponse, CreateTranscriptionRequest,
    CreateTranscriptionResponseJson,
};
use async_openai::Client;

use crate::config::{ProviderKind, ProviderSettings};
use crate::error::{NotatError, Result};

/// Default timeout for API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Uses a 5-minute timeout to prevent hung API calls.
fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
}

/// A client for either API family.
///
/// Azure OpenAI pins one deployment per client, so transcription and chat
/// get separate instances built through [`ApiClient::for_speech`] and
/// [`ApiClient::for_chat`].
pub enum ApiClient {
    OpenAi(Client<OpenAIConfig>),
    Azure(Client<AzureConfig>),
}

impl ApiClient {
    /// Client backing transcription calls. Azure routes to the whisper
    /// deployment; other providers read `OPENAI_API_KEY` from env.
    pub fn for_speech(provider: &ProviderSettings) -> Result<Self> {
        Self::build(provider, &provider.azure.whisper_deployment)
    }

    /// Client backing chat-completion calls. Azure routes to the GPT
    /// deployment.
    pub fn for_chat(provider: &ProviderSettings) -> Result<Self> {
        Self::build(provider, &provider.azure.gpt_deployment)
    }

    fn build(provider: &ProviderSettings, azure_deployment: &str) -> Result<Self> {
        match provider.client {
            ProviderKind::OpenAi => {
                let mut config = OpenAIConfig::new();
                if let Some(base_url) = provider.resolved_base_url() {
                    config = config.with_api_base(base_url);
                }
                Ok(ApiClient::OpenAi(
                    Client::with_config(config).with_http_client(http_client()),
                ))
            }
            ProviderKind::Azure => {
                let api_key = require_env("AZURE_OPENAI_API_KEY")?;
                let endpoint = require_env("AZURE_OPENAI_ENDPOINT")?;
                let config = AzureConfig::new()
                    .with_api_base(endpoint)
                    .with_api_key(api_key)
                    .with_api_version(&provider.azure.api_version)
                    .with_deployment_id(azure_deployment);
                Ok(ApiClient::Azure(
                    Client::with_config(config).with_http_client(http_client()),
                ))
            }
        }
    }

    /// Sends a transcription request to the configured backend.
    pub async fn transcribe(
        &self,
        request: CreateTranscriptionRequest,
    ) -> Result<CreateTranscriptionResponseJson> {
        let response = match self {
            ApiClient::OpenAi(client) => client.audio().transcribe(request).await,
            ApiClient::Azure(client) => client.audio().transcribe(request).await,
        };
        response.map_err(|e| NotatError::Api(format!("transcription request failed: {}", e)))
    }

    /// Sends a chat-completion request to the configured backend.
    pub async fn chat(
        &self,
        request: CreateChatCompletionRequest,
    ) -> Result<CreateChatCompletionResponse> {
        let response = match self {
            ApiClient::OpenAi(client) => client.chat().create(request).await,
            ApiClient::Azure(client) => client.chat().create(request).await,
        };
        response.map_err(|e| NotatError::Api(format!("chat request failed: {}", e)))
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| NotatError::Config(format!("{} is not set", name)))
}
