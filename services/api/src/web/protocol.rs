//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the
//! API server for the model workbench.

use serde::{Deserialize, Serialize};
use workbench_core::domain::{ChatMessage, QAExchange};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================
// NOTE: The attachment's raw bytes are sent as a single Binary frame following
// a `StageAttachment` message, not as part of this enum.
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Supplies the model API credential interactively. Blank secrets are
    /// ignored; accepted ones are persisted for later sessions.
    ProvideCredential { secret: String },

    /// Submits one console turn. Empty input, or a submit while a chat
    /// request is in flight, is silently dropped.
    ChatSubmit { text: String },

    /// Announces an attachment upload; the next Binary frame carries the
    /// file's raw bytes.
    StageAttachment { name: String },

    /// Discards the current attachment together with its Q&A history.
    ClearAttachment,

    /// Asks a question about the current attachment.
    AskDocument { question: String },

    /// Mirrors the raw notes text as the user edits it.
    UpdateNotes { text: String },

    /// Converts the raw notes into Markdown, replacing the output wholesale.
    TransformNotes,

    /// Reworks the current output (not the raw notes); repeated calls
    /// compound on the latest output.
    ImproveNotes,

    /// Replaces the comma-separated highlight keyword list.
    SetKeywords { keywords: String },

    /// Selects a prompt profile from the fixed catalog, overwriting the
    /// active system instruction.
    SelectProfile { id: String },

    /// Overwrites the active system instruction with free-form text.
    SetSystemInstruction { text: String },

    /// Changes the model identifier used by subsequent requests.
    SetModel { model: String },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================
// NOTE: Locally rejected submissions (empty input, no attachment, a request
// already in flight) produce no server message at all.
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First message on every connection. When `credential_required` is true
    /// the client must collect a credential before any flow can work.
    Hello {
        credential_required: bool,
        model: String,
    },

    /// Confirms an interactively provided credential was installed.
    CredentialAccepted,

    /// Signals that the last model-issuing action needed a credential and
    /// none is set; the client should prompt for one.
    CredentialRequired,

    /// One new console transcript entry: the echoed user turn, the model's
    /// reply, or the fixed failure notice.
    ChatAppended { message: ChatMessage },

    /// Confirms the staged attachment was ingested.
    AttachmentAccepted { name: String, chars: usize },

    /// Confirms the attachment and its Q&A history were discarded.
    AttachmentCleared,

    /// One new question/answer pair over the current attachment.
    ExchangeAppended { exchange: QAExchange },

    /// The latest notes output, both as stored and with the highlight
    /// markers applied for display.
    NotesRendered { output: String, highlighted: String },

    /// Confirms a profile selection and carries its instruction text.
    ProfileSelected { id: String, instruction: String },

    /// Reports a malformed or undeliverable client message.
    Error { message: String },
}
