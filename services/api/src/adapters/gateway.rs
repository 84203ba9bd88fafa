//! services/api/src/adapters/gateway.rs
//!
//! The gateway in front of the provider adapters. It owns the credential
//! slot, builds the configured provider's adapter when a credential arrives,
//! and applies the soft-fail policy every flow relies on.

use crate::adapters::{GeminiModelAdapter, OpenAiModelAdapter};
use crate::config::ModelProvider;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::error;
use workbench_core::{
    domain::{ChatMessage, NoteTask},
    ports::{GenerativeModelService, PortError, PortResult},
};

const EMPTY_CHAT_FALLBACK: &str = "No response generated.";
const EMPTY_ANALYSIS_FALLBACK: &str = "No analysis generated.";
const EMPTY_NOTES_FALLBACK: &str = "No changes generated.";

/// The single point of integration with the remote model API; the flows
/// never talk to a provider adapter directly.
///
/// Two deliberate policies live here:
///
/// * Remote failures are downgraded to an `Error: …` display string instead
///   of being surfaced as errors, so callers render them like any other
///   completion. Callers that need to distinguish failure from success must
///   inspect the text; this mirrors how the flows present failures inline.
/// * The only raised condition is [`PortError::CredentialMissing`], for a
///   call attempted before any credential was provided.
pub struct ModelGateway {
    provider: ModelProvider,
    api_base: Option<String>,
    service: RwLock<Option<Arc<dyn GenerativeModelService>>>,
}

impl ModelGateway {
    /// Creates a gateway with an empty credential slot. Calls raise
    /// [`PortError::CredentialMissing`] until [`Self::set_credential`] runs.
    pub fn new(provider: ModelProvider, api_base: Option<String>) -> Self {
        Self {
            provider,
            api_base,
            service: RwLock::new(None),
        }
    }

    /// Replaces the active credential by constructing the configured
    /// provider's adapter around it. The secret is not validated here; a bad
    /// credential surfaces on first use.
    pub async fn set_credential(&self, secret: &str) {
        let service: Arc<dyn GenerativeModelService> = match (self.provider, &self.api_base) {
            (ModelProvider::Gemini, Some(base)) => {
                Arc::new(GeminiModelAdapter::with_api_base(secret, base))
            }
            (ModelProvider::Gemini, None) => Arc::new(GeminiModelAdapter::new(secret)),
            (ModelProvider::OpenAi, Some(base)) => {
                Arc::new(OpenAiModelAdapter::with_api_base(secret, base))
            }
            (ModelProvider::OpenAi, None) => Arc::new(OpenAiModelAdapter::new(secret)),
        };
        *self.service.write().await = Some(service);
    }

    /// Whether a credential has been provided yet.
    pub async fn has_credential(&self) -> bool {
        self.service.read().await.is_some()
    }

    /// Requests a continuation of the console transcript.
    pub async fn complete_chat(
        &self,
        model: &str,
        history: &[ChatMessage],
        system_instruction: Option<&str>,
        temperature: Option<f32>,
    ) -> PortResult<String> {
        let service = self.active().await?;
        let result = service
            .complete_chat(model, history, system_instruction, temperature)
            .await;
        Ok(soften(result, EMPTY_CHAT_FALLBACK))
    }

    /// Answers a question grounded in the given document.
    pub async fn analyze_document(
        &self,
        model: &str,
        document: &str,
        question: &str,
        system_instruction: Option<&str>,
    ) -> PortResult<String> {
        let service = self.active().await?;
        let result = service
            .analyze_document(model, document, question, system_instruction)
            .await;
        Ok(soften(result, EMPTY_ANALYSIS_FALLBACK))
    }

    /// Rewrites notes text using one of the fixed instruction templates.
    pub async fn transform_notes(
        &self,
        model: &str,
        text: &str,
        task: NoteTask,
    ) -> PortResult<String> {
        let service = self.active().await?;
        let result = service.transform_notes(model, text, task).await;
        Ok(soften(result, EMPTY_NOTES_FALLBACK))
    }

    async fn active(&self) -> PortResult<Arc<dyn GenerativeModelService>> {
        self.service
            .read()
            .await
            .clone()
            .ok_or(PortError::CredentialMissing)
    }
}

/// Applies the soft-fail policy: a remote failure becomes `Error: …` display
/// text and an empty completion becomes the operation's fixed fallback line.
fn soften(result: PortResult<String>, empty_fallback: &str) -> String {
    match result {
        Ok(text) if text.is_empty() => empty_fallback.to_string(),
        Ok(text) => text,
        Err(err) => {
            error!("Model API call failed: {err}");
            format!("Error: {err}")
        }
    }
}
