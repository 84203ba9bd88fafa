//! services/api/src/web/chat_task.rs
//!
//! State transitions for the conversational console: an append-only
//! transcript with at most one completion request in flight. The begin
//! transition runs under the session lock before the model call is issued;
//! the settle transition runs under the lock once it resolves.

use crate::web::state::SessionState;
use workbench_core::{domain::ChatMessage, ports::PortResult};

/// Fixed transcript entry appended when a chat call raises instead of
/// returning text. The underlying error detail is never forwarded.
const CHAT_FAILURE_TEXT: &str = "Error generating response";

/// Everything the spawned worker needs to issue the model call after
/// [`begin_submit`] has mutated the session.
pub struct ChatJob {
    pub model: String,
    /// Snapshot of the transcript including the just-appended user turn.
    pub history: Vec<ChatMessage>,
    pub system_instruction: String,
}

/// The accepted submission: the echoed user turn plus the job to run.
pub struct ChatAccepted {
    pub message: ChatMessage,
    pub job: ChatJob,
}

/// Validates a console submission and, when accepted, appends the user turn
/// and arms the in-flight guard.
///
/// Empty or whitespace-only input, or a submit while a request is already in
/// flight, is rejected with `None` and leaves the session untouched.
pub fn begin_submit(session: &mut SessionState, text: &str) -> Option<ChatAccepted> {
    if text.trim().is_empty() || session.chat.in_flight {
        return None;
    }

    let message = ChatMessage::user(text);
    session.chat.transcript.push(message.clone());
    session.chat.in_flight = true;

    let job = ChatJob {
        model: session.model.clone(),
        history: session.chat.transcript.clone(),
        system_instruction: session.system_instruction.clone(),
    };
    Some(ChatAccepted { message, job })
}

/// Applies a settled completion: a model-role entry on success, the fixed
/// system-role failure notice on a raise. The in-flight guard is cleared on
/// every settle.
pub fn settle_submit(session: &mut SessionState, result: PortResult<String>) -> ChatMessage {
    session.chat.in_flight = false;

    let message = match result {
        Ok(text) => ChatMessage::model(text),
        Err(_) => ChatMessage::system(CHAT_FAILURE_TEXT),
    };
    session.chat.transcript.push(message.clone());
    message
}
