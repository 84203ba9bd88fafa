//! services/api/src/adapters/openai.rs
//!
//! This module contains the adapter for OpenAI-compatible chat-completion
//! APIs. It implements the `GenerativeModelService` port from the `core`
//! crate via the `async-openai` client.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use workbench_core::{
    domain::{ChatMessage, NoteTask},
    ports::{GenerativeModelService, PortError, PortResult},
    prompt,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerativeModelService` using an
/// OpenAI-compatible LLM endpoint.
#[derive(Clone)]
pub struct OpenAiModelAdapter {
    client: Client<OpenAIConfig>,
}

impl OpenAiModelAdapter {
    /// Creates a new `OpenAiModelAdapter` for the given credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new().with_api_key(api_key))
    }

    /// Creates an adapter pointed at a non-default API base URL.
    pub fn with_api_base(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self::with_config(
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(api_base),
        )
    }

    fn with_config(config: OpenAIConfig) -> Self {
        Self {
            client: Client::with_config(config),
        }
    }

    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
        temperature: Option<f32>,
    ) -> PortResult<String> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(model).messages(messages).n(1);
        if let Some(temperature) = temperature {
            builder.temperature(temperature);
        }
        let request = builder
            .build()
            .map_err(|e| PortError::Remote(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Remote(e.to_string()))?;

        // A response with no choices or no text counts as an empty completion;
        // the gateway substitutes its fallback.
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        Ok(text)
    }
}

fn user_message(text: String) -> PortResult<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(text)
        .build()
        .map_err(|e| PortError::Remote(e.to_string()))?
        .into())
}

fn system_message(text: &str) -> PortResult<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestSystemMessageArgs::default()
        .content(text)
        .build()
        .map_err(|e| PortError::Remote(e.to_string()))?
        .into())
}

//=========================================================================================
// `GenerativeModelService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerativeModelService for OpenAiModelAdapter {
    async fn complete_chat(
        &self,
        model: &str,
        history: &[ChatMessage],
        system_instruction: Option<&str>,
        temperature: Option<f32>,
    ) -> PortResult<String> {
        // The rendered transcript travels as a single user message so the
        // prompt is identical across providers.
        let messages = vec![user_message(prompt::render_transcript(
            history,
            system_instruction,
        ))?];
        let temperature = temperature.unwrap_or(prompt::DEFAULT_TEMPERATURE);
        self.complete(model, messages, Some(temperature)).await
    }

    async fn analyze_document(
        &self,
        model: &str,
        document: &str,
        question: &str,
        system_instruction: Option<&str>,
    ) -> PortResult<String> {
        let mut messages = Vec::new();
        if let Some(instruction) = system_instruction.filter(|s| !s.trim().is_empty()) {
            messages.push(system_message(instruction)?);
        }
        messages.push(user_message(prompt::document_prompt(document, question))?);
        self.complete(model, messages, None).await
    }

    async fn transform_notes(&self, model: &str, text: &str, task: NoteTask) -> PortResult<String> {
        let messages = vec![user_message(prompt::notes_prompt(text, task))?];
        self.complete(model, messages, None).await
    }
}
