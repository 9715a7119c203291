//! services/api/src/adapters/story_llm.rs
//!
//! This module contains the adapter for the story-generation model. It
//! implements the `TextCompletionService` port from the `core` crate using
//! an OpenAI-compatible chat-completion API.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use storygen_core::ports::{classify_upstream, PortError, PortResult, TextCompletionService};
use tracing::debug;

/// An adapter that implements `TextCompletionService` using an
/// OpenAI-compatible LLM. One call per request, no retries.
#[derive(Clone)]
pub struct OpenAiStoryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiStoryAdapter {
    /// Creates a new `OpenAiStoryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl TextCompletionService for OpenAiStoryAdapter {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| PortError::Upstream(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()
                    .map_err(|e| PortError::Upstream(e.to_string()))?,
            ),
        ];

        // A long story at ~1000 words fits comfortably under this cap.
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(2048u32)
            .temperature(0.8)
            .build()
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| classify_upstream(&e.to_string()))?;

        let raw = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Upstream("Empty response from model".to_string()))?;

        debug!(chars = raw.len(), "received model response");
        Ok(raw)
    }
}
