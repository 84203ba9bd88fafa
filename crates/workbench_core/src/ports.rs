//! crates/workbench_core/src/ports.rs
//!
//! Defines the service contract (trait) for the workbench's model access.
//! The trait forms the boundary of the hexagonal architecture, keeping every
//! provider integration behind one seam so the flows never see a wire format.

use crate::domain::{ChatMessage, NoteTask};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// A request was attempted before any API credential was provided.
    #[error("model API credential is not set")]
    CredentialMissing,
    /// The remote call failed: transport, authentication, or a provider-side
    /// error. The payload is the human-readable message.
    #[error("{0}")]
    Remote(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Port (Trait)
//=========================================================================================

#[async_trait]
pub trait GenerativeModelService: Send + Sync {
    /// Requests a continuation of the given conversation.
    ///
    /// The ordered history and optional system instruction are rendered into
    /// a single role-tagged prompt ending in an open `model:` cue. When
    /// `temperature` is `None` the default sampling temperature applies.
    /// The returned completion text may be empty.
    async fn complete_chat(
        &self,
        model: &str,
        history: &[ChatMessage],
        system_instruction: Option<&str>,
        temperature: Option<f32>,
    ) -> PortResult<String>;

    /// Answers a question grounded in the given document.
    ///
    /// The document is truncated to [`crate::prompt::MAX_DOCUMENT_CHARS`]
    /// characters before transmission. The system instruction travels on the
    /// provider's dedicated system channel, not in the prompt body.
    async fn analyze_document(
        &self,
        model: &str,
        document: &str,
        question: &str,
        system_instruction: Option<&str>,
    ) -> PortResult<String>;

    /// Rewrites notes text using one of the fixed instruction templates.
    async fn transform_notes(&self, model: &str, text: &str, task: NoteTask) -> PortResult<String>;
}
