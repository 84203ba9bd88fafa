//! services/api/src/web/notes_task.rs
//!
//! State transitions for the notes transform flow. The draft holds two
//! texts: the raw input the user edits freely, and the latest transformed
//! output. Conversion reads the raw text; improvement reads the previous
//! output, so repeated passes compound. Keyword highlighting is a pure
//! styling step applied whenever the output is (re)rendered.

use crate::web::highlight::highlight;
use crate::web::state::SessionState;
use workbench_core::{domain::NoteTask, ports::PortResult};

/// A rendered notes panel: the transformed Markdown plus the same text with
/// keyword `<mark>` wrapping applied.
pub struct NotesRender {
    pub output: String,
    pub highlighted: String,
}

/// Everything the spawned worker needs to run a notes transformation.
pub struct NotesJob {
    pub model: String,
    pub text: String,
    pub task: NoteTask,
}

/// How a settled notes transformation lands in the session.
pub enum NotesOutcome {
    Rendered(NotesRender),
    CredentialRequired,
}

/// Overwrites the raw notes text. Edits are free-form and never validated.
pub fn update_raw(session: &mut SessionState, text: &str) {
    session.notes.draft.raw = text.to_string();
}

/// Overwrites the keyword list used for output highlighting.
pub fn set_keywords(session: &mut SessionState, keywords: &str) {
    session.notes.keywords = keywords.to_string();
}

/// Validates a Markdown conversion request over the raw text.
///
/// Rejected with `None` when the raw text is blank or a transformation is
/// already pending.
pub fn begin_transform(session: &mut SessionState) -> Option<NotesJob> {
    if session.notes.draft.raw.trim().is_empty() || session.notes.in_flight {
        return None;
    }
    session.notes.in_flight = true;
    Some(NotesJob {
        model: session.model.clone(),
        text: session.notes.draft.raw.clone(),
        task: NoteTask::ToMarkdown,
    })
}

/// Validates an improvement pass over the previous output.
///
/// Rejected with `None` when nothing has been transformed yet or a
/// transformation is already pending.
pub fn begin_improve(session: &mut SessionState) -> Option<NotesJob> {
    if session.notes.draft.output.is_empty() || session.notes.in_flight {
        return None;
    }
    session.notes.in_flight = true;
    Some(NotesJob {
        model: session.model.clone(),
        text: session.notes.draft.output.clone(),
        task: NoteTask::Improve,
    })
}

/// Applies a settled transformation: the result replaces the output and is
/// highlighted against the current keywords. The in-flight guard is cleared
/// on every settle.
///
/// The gateway degrades remote failures into display text, so a raise here
/// means the credential gate.
pub fn settle(session: &mut SessionState, result: PortResult<String>) -> NotesOutcome {
    session.notes.in_flight = false;
    match result {
        Ok(output) => {
            session.notes.draft.output = output;
            NotesOutcome::Rendered(render(&session.notes.draft.output, &session.notes.keywords))
        }
        Err(_) => NotesOutcome::CredentialRequired,
    }
}

/// Re-applies highlighting to the existing output, if any. Keyword edits
/// restyle the panel without another model call.
pub fn rerender(session: &SessionState) -> Option<NotesRender> {
    if session.notes.draft.output.is_empty() {
        return None;
    }
    Some(render(&session.notes.draft.output, &session.notes.keywords))
}

fn render(output: &str, keywords: &str) -> NotesRender {
    NotesRender {
        output: output.to_string(),
        highlighted: highlight(output, keywords),
    }
}
