//! Notes generation via chat completion.

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::debug;

use super::NotesGenerator;
use crate::error::{NotatError, Result};
use crate::openai::ApiClient;

/// System prompt for turning a lecture transcript into structured notes.
const NOTES_SYSTEM_PROMPT: &str = "You are a professional technical writer. \
Convert the following lecture transcript into well-structured notes in Markdown. \
Use headings (##), sections, and mermaid diagrams or code snippets where helpful. \
End with a 'Tips and Tricks' section.";

/// Notes generator backed by a chat-completion model.
pub struct ChatNotesGenerator {
    client: ApiClient,
    model: String,
    temperature: f32,
}

impl ChatNotesGenerator {
    pub fn new(client: ApiClient, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl NotesGenerator for ChatNotesGenerator {
    /// One chat completion over the whole transcript. Generation is a
    /// single expensive call and is not retried.
    async fn generate(&self, transcript: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(NOTES_SYSTEM_PROMPT)
                .build()
                .map_err(|e| NotatError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(transcript)
                .build()
                .map_err(|e| NotatError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| NotatError::Generation(e.to_string()))?;

        let response = self.client.chat(request).await?;

        let markdown = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| NotatError::Generation("Empty response from model".to_string()))?
            .clone();

        debug!("Generated {} characters of notes", markdown.len());
        Ok(markdown)
    }
}
