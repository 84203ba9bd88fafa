//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::adapters::gateway::ModelGateway;
use crate::config::Config;
use std::sync::Arc;
use workbench_core::domain::{Attachment, ChatMessage, NoteDraft, QAExchange};

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<ModelGateway>,
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// Keyword list a fresh session highlights until the user edits it.
const DEFAULT_KEYWORDS: &str = "Important, Todo, Deadline, Idea";

/// The state for a single, active WebSocket connection: the three independent
/// controller states plus the configuration inputs they consume. The
/// controllers never read each other's state.
pub struct SessionState {
    /// Active model identifier; replaced by `SetModel`.
    pub model: String,
    /// Active system instruction; replaced by `SelectProfile` and
    /// `SetSystemInstruction`.
    pub system_instruction: String,
    pub chat: ChatConsoleState,
    pub qa: DocumentQaState,
    pub notes: NotesState,
}

impl SessionState {
    /// Creates a fresh session with empty controller states.
    pub fn new(model: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: system_instruction.into(),
            chat: ChatConsoleState::default(),
            qa: DocumentQaState::default(),
            notes: NotesState::default(),
        }
    }
}

/// Conversational console state: an append-only transcript plus the
/// one-request-at-a-time guard.
#[derive(Default)]
pub struct ChatConsoleState {
    pub transcript: Vec<ChatMessage>,
    pub in_flight: bool,
}

/// Document Q&A state. The generation counter records which attachment an
/// in-flight answer belongs to; a settle carrying a stale generation is
/// discarded so a cleared attachment never leaves dangling history.
#[derive(Default)]
pub struct DocumentQaState {
    /// File name announced by `StageAttachment`, consumed by the next
    /// Binary frame.
    pub staged_name: Option<String>,
    pub document: Option<Attachment>,
    pub exchanges: Vec<QAExchange>,
    pub generation: u64,
    pub in_flight: bool,
}

/// Notes transform state: the working draft, the highlight keyword list, and
/// the in-flight guard shared by the transform and improve actions.
pub struct NotesState {
    pub draft: NoteDraft,
    pub keywords: String,
    pub in_flight: bool,
}

impl Default for NotesState {
    fn default() -> Self {
        Self {
            draft: NoteDraft::default(),
            keywords: DEFAULT_KEYWORDS.to_string(),
            in_flight: false,
        }
    }
}
