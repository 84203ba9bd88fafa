//! crates/workbench_core/src/prompt.rs
//!
//! Prompt assembly shared by every model adapter: transcript rendering for
//! the console, document embedding for Q&A, and the fixed note-transform
//! instruction templates.

use crate::domain::{ChatMessage, NoteTask};

/// Maximum number of characters of a document transmitted to the model.
/// Longer documents are silently truncated, never rejected or chunked.
pub const MAX_DOCUMENT_CHARS: usize = 30_000;

/// Sampling temperature applied to chat completions when none is given.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const TO_MARKDOWN_INSTRUCTION: &str = "Convert the following raw notes into clean, structured \
    Markdown. Use headers, bullet points, and code blocks where appropriate:";

const IMPROVE_INSTRUCTION: &str = "Improve the formatting, clarity, and structure of the \
    following Markdown content. Keep the original meaning but make it look professional:";

/// Renders the ordered history into a single role-tagged prompt, terminated
/// by an open `model:` cue for the continuation.
///
/// A non-empty system instruction becomes a leading `System:` line; the
/// conversational turns follow in append order, one per line.
pub fn render_transcript(history: &[ChatMessage], system_instruction: Option<&str>) -> String {
    let turns = history
        .iter()
        .map(|message| format!("{}: {}", message.role.as_str(), message.content))
        .collect::<Vec<_>>()
        .join("\n");

    match system_instruction.filter(|s| !s.trim().is_empty()) {
        Some(instruction) => format!("System: {}\n{}\nmodel:", instruction, turns),
        None => format!("{}\nmodel:", turns),
    }
}

/// Builds the Q&A prompt body around a (possibly truncated) document.
pub fn document_prompt(document: &str, question: &str) -> String {
    format!(
        "Context Document:\n{}\n\nQuestion: {}",
        truncate_chars(document, MAX_DOCUMENT_CHARS),
        question
    )
}

/// Selects and applies the fixed instruction template for a notes request.
pub fn notes_prompt(text: &str, task: NoteTask) -> String {
    let instruction = match task {
        NoteTask::ToMarkdown => TO_MARKDOWN_INSTRUCTION,
        NoteTask::Improve => IMPROVE_INSTRUCTION,
    };
    format!("{}\n\n{}", instruction, text)
}

/// Truncates to at most `max` characters, respecting char boundaries.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_tags_turns_in_order() {
        let history = vec![
            ChatMessage::user("What is Rust?"),
            ChatMessage::model("A systems language."),
            ChatMessage::user("Thanks"),
        ];
        let prompt = render_transcript(&history, None);
        assert_eq!(
            prompt,
            "user: What is Rust?\nmodel: A systems language.\nuser: Thanks\nmodel:"
        );
    }

    #[test]
    fn transcript_prefixes_system_instruction() {
        let history = vec![ChatMessage::user("Hi")];
        let prompt = render_transcript(&history, Some("Be brief."));
        assert_eq!(prompt, "System: Be brief.\nuser: Hi\nmodel:");
    }

    #[test]
    fn transcript_skips_blank_system_instruction() {
        let history = vec![ChatMessage::user("Hi")];
        assert_eq!(render_transcript(&history, Some("   ")), "user: Hi\nmodel:");
        assert_eq!(render_transcript(&history, Some("")), "user: Hi\nmodel:");
    }

    #[test]
    fn transcript_ends_with_open_model_cue() {
        let history = vec![ChatMessage::user("Hi")];
        let prompt = render_transcript(&history, Some("Be brief."));
        assert!(prompt.ends_with("\nmodel:"));
    }

    #[test]
    fn document_prompt_embeds_document_and_question() {
        let prompt = document_prompt("some facts", "What facts?");
        assert_eq!(prompt, "Context Document:\nsome facts\n\nQuestion: What facts?");
    }

    #[test]
    fn document_at_limit_is_untouched() {
        // 'z' does not occur in the surrounding template text.
        let document = "z".repeat(MAX_DOCUMENT_CHARS);
        let prompt = document_prompt(&document, "q?");
        assert_eq!(prompt.matches('z').count(), MAX_DOCUMENT_CHARS);
    }

    #[test]
    fn document_over_limit_is_cut_to_limit() {
        let document = "z".repeat(MAX_DOCUMENT_CHARS + 500);
        let prompt = document_prompt(&document, "q?");
        assert_eq!(prompt.matches('z').count(), MAX_DOCUMENT_CHARS);
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let document = "é".repeat(MAX_DOCUMENT_CHARS + 1);
        let prompt = document_prompt(&document, "q?");
        assert_eq!(prompt.matches('é').count(), MAX_DOCUMENT_CHARS);
    }

    #[test]
    fn notes_prompt_selects_template() {
        let markdown = notes_prompt("raw scribbles", NoteTask::ToMarkdown);
        assert!(markdown.starts_with("Convert the following raw notes"));
        assert!(markdown.ends_with("raw scribbles"));

        let improve = notes_prompt("## Draft", NoteTask::Improve);
        assert!(improve.starts_with("Improve the formatting"));
        assert!(improve.ends_with("## Draft"));
    }
}
