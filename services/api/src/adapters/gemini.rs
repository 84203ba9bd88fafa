//! services/api/src/adapters/gemini.rs
//!
//! This module contains the adapter for the Gemini `generateContent` REST API.
//! It implements the `GenerativeModelService` port from the `core` crate.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use workbench_core::{
    domain::{ChatMessage, NoteTask},
    ports::{GenerativeModelService, PortError, PortResult},
    prompt,
};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerativeModelService` against the Gemini
/// HTTP API. The credential is injected at construction and travels as the
/// `key` query parameter on every request.
#[derive(Clone)]
pub struct GeminiModelAdapter {
    client: Client,
    api_key: String,
    api_base: String,
}

impl GeminiModelAdapter {
    /// Creates a new `GeminiModelAdapter` for the given credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_api_base(api_key, DEFAULT_API_BASE)
    }

    /// Creates an adapter pointed at a non-default API base URL.
    pub fn with_api_base(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: api_base.into(),
        }
    }

    async fn send_request(&self, model: &str, body: &GenerateContentRequest) -> PortResult<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.api_base,
            model = model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| PortError::Remote(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| PortError::Remote(format!("Failed to parse Gemini response: {err}")))?;

        Ok(extract_text_response(parsed))
    }
}

//=========================================================================================
// `GenerativeModelService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerativeModelService for GeminiModelAdapter {
    async fn complete_chat(
        &self,
        model: &str,
        history: &[ChatMessage],
        system_instruction: Option<&str>,
        temperature: Option<f32>,
    ) -> PortResult<String> {
        // The console flow sends the whole transcript as one user part; the
        // system instruction is already rendered into the prompt's first line.
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt::render_transcript(
                history,
                system_instruction,
            ))],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                temperature: temperature.unwrap_or(prompt::DEFAULT_TEMPERATURE),
            }),
        };
        self.send_request(model, &request).await
    }

    async fn analyze_document(
        &self,
        model: &str,
        document: &str,
        question: &str,
        system_instruction: Option<&str>,
    ) -> PortResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt::document_prompt(document, question))],
            system_instruction: system_instruction
                .filter(|s| !s.trim().is_empty())
                .map(Content::system),
            generation_config: None,
        };
        self.send_request(model, &request).await
    }

    async fn transform_notes(&self, model: &str, text: &str, task: NoteTask) -> PortResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt::notes_prompt(text, task))],
            system_instruction: None,
            generation_config: None,
        };
        self.send_request(model, &request).await
    }
}

//=========================================================================================
// Wire Format
//=========================================================================================

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl Content {
    fn user(text: String) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text }],
        }
    }

    fn system(text: &str) -> Self {
        Self {
            role: "system".to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Option<Vec<PartResponse>>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Pulls the text out of the first response candidate. An absent or empty
/// completion becomes an empty string; the gateway substitutes its fallback.
fn extract_text_response(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .flatten()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .into_iter()
        .flatten()
        .find_map(|part| part.text)
        .unwrap_or_default()
}

fn map_http_error(status: StatusCode, body: String) -> PortError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    PortError::Remote(format!("Gemini API error ({}): {}", status.as_u16(), message))
}
