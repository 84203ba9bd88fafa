//! crates/workbench_core/src/domain.rs
//!
//! Defines the pure, core data structures for the workbench.
//! These structs are independent of any transport or provider wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The author of a single console turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    System,
}

impl Role {
    /// The lowercase tag used when a transcript is rendered into a prompt.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
            Role::System => "system",
        }
    }
}

/// A single entry in the console transcript. The transcript is append-only;
/// entries are never edited or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new(Role::Model, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// A text document supplied by the user for the Q&A flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub content: String,
    /// Character count of the decoded content, recorded at ingestion.
    pub chars: usize,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let chars = content.chars().count();
        Self {
            name: name.into(),
            content,
            chars,
        }
    }
}

/// A single question-and-answer exchange over the current attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QAExchange {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
}

impl QAExchange {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Working notes in the transform flow: the raw input text and the latest
/// transformed output.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub raw: String,
    pub output: String,
}

/// Which of the two fixed instruction templates a notes request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteTask {
    ToMarkdown,
    Improve,
}

/// A named, preconfigured system instruction selectable by the user.
#[derive(Debug, Clone)]
pub struct PromptProfile {
    pub id: &'static str,
    pub label: &'static str,
    pub instruction: &'static str,
}
