//! services/api/src/web/attachment_task.rs
//!
//! State transitions for the document Q&A flow: staging and ingesting an
//! uploaded attachment, and answering questions against it. An upload
//! arrives as a text announcement carrying the file name followed by one
//! binary frame with the raw bytes; the staged name bridges the two.
//!
//! Each attachment carries a generation number. Replacing or clearing the
//! attachment bumps it, and a question settled against an older generation
//! is discarded rather than shown against the wrong document.

use crate::web::state::SessionState;
use workbench_core::{
    domain::{Attachment, QAExchange},
    ports::PortResult,
};

/// Confirmation of an ingested upload, echoed back to the client.
pub struct IngestReceipt {
    pub name: String,
    pub chars: usize,
}

/// Everything the spawned worker needs to answer a document question.
pub struct AskJob {
    pub model: String,
    pub document: Attachment,
    pub question: String,
    pub system_instruction: String,
    /// Generation of the attachment the question was asked against.
    pub generation: u64,
}

/// How a settled document question lands in the session.
pub enum AskOutcome {
    Answered(QAExchange),
    /// The attachment was cleared or replaced while the call was in flight.
    Stale,
    CredentialRequired,
}

/// Records the file name announced ahead of a binary upload frame.
pub fn stage(session: &mut SessionState, name: &str) {
    session.qa.staged_name = Some(name.to_string());
}

/// Decodes an uploaded frame into the staged attachment. The bytes are
/// decoded as UTF-8 with invalid sequences replaced, so any upload yields a
/// usable document. Replacing the attachment drops the exchange history.
///
/// A binary frame with no preceding announcement is dropped.
pub fn ingest(session: &mut SessionState, bytes: &[u8]) -> Option<IngestReceipt> {
    let name = session.qa.staged_name.take()?;
    let content = String::from_utf8_lossy(bytes).into_owned();
    let attachment = Attachment::new(name, content);

    let receipt = IngestReceipt {
        name: attachment.name.clone(),
        chars: attachment.chars,
    };
    session.qa.document = Some(attachment);
    session.qa.exchanges.clear();
    session.qa.generation += 1;
    Some(receipt)
}

/// Drops the current attachment and its exchange history.
///
/// The in-flight guard is left alone: an answer still pending against the
/// dropped document settles as stale, and only that settle reopens the flow.
pub fn clear(session: &mut SessionState) {
    session.qa.staged_name = None;
    session.qa.document = None;
    session.qa.exchanges.clear();
    session.qa.generation += 1;
}

/// Validates a document question and, when accepted, arms the in-flight
/// guard and snapshots the attachment for the worker.
///
/// Rejected with `None` when no attachment is loaded, the question is blank
/// or a previous question is still pending.
pub fn begin_ask(session: &mut SessionState, question: &str) -> Option<AskJob> {
    if question.trim().is_empty() || session.qa.in_flight {
        return None;
    }
    let document = session.qa.document.clone()?;

    session.qa.in_flight = true;
    Some(AskJob {
        model: session.model.clone(),
        document,
        question: question.to_string(),
        system_instruction: session.system_instruction.clone(),
        generation: session.qa.generation,
    })
}

/// Applies a settled answer. The in-flight guard is cleared on every settle,
/// including stale ones.
///
/// The gateway degrades remote failures into display text, so a raise here
/// means the credential gate.
pub fn settle_ask(
    session: &mut SessionState,
    job: &AskJob,
    result: PortResult<String>,
) -> AskOutcome {
    session.qa.in_flight = false;

    if job.generation != session.qa.generation {
        return AskOutcome::Stale;
    }
    match result {
        Ok(answer) => {
            let exchange = QAExchange::new(job.question.clone(), answer);
            session.qa.exchanges.push(exchange.clone());
            AskOutcome::Answered(exchange)
        }
        Err(_) => AskOutcome::CredentialRequired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workbench_core::ports::PortError;

    fn session() -> SessionState {
        SessionState::new("gemini-2.5-flash", "Be helpful.")
    }

    fn session_with_document() -> SessionState {
        let mut session = session();
        stage(&mut session, "notes.txt");
        ingest(&mut session, b"The capital of France is Paris.").expect("ingested");
        session
    }

    #[test]
    fn stage_then_ingest_builds_the_attachment() {
        let mut session = session();
        stage(&mut session, "notes.txt");

        let receipt = ingest(&mut session, "h\u{e9}llo".as_bytes()).expect("ingested");
        assert_eq!(receipt.name, "notes.txt");
        assert_eq!(receipt.chars, 5);

        let document = session.qa.document.as_ref().expect("document");
        assert_eq!(document.content, "h\u{e9}llo");
        assert!(session.qa.staged_name.is_none());
    }

    #[test]
    fn binary_frame_without_announcement_is_dropped() {
        let mut session = session();

        assert!(ingest(&mut session, b"orphan bytes").is_none());
        assert!(session.qa.document.is_none());
    }

    #[test]
    fn invalid_utf8_is_decoded_with_replacements() {
        let mut session = session();
        stage(&mut session, "blob.bin");

        let receipt = ingest(&mut session, &[0xff, 0xfe, b'a']).expect("ingested");
        assert_eq!(receipt.chars, 3);
        assert!(session
            .qa
            .document
            .as_ref()
            .expect("document")
            .content
            .contains('\u{fffd}'));
    }

    #[test]
    fn replacing_the_attachment_drops_exchange_history() {
        let mut session = session_with_document();
        session
            .qa
            .exchanges
            .push(QAExchange::new("old question", "old answer"));
        let before = session.qa.generation;

        stage(&mut session, "other.txt");
        ingest(&mut session, b"different text").expect("ingested");

        assert!(session.qa.exchanges.is_empty());
        assert_eq!(session.qa.generation, before + 1);
    }

    #[test]
    fn clear_resets_document_and_history() {
        let mut session = session_with_document();
        session.qa.exchanges.push(QAExchange::new("q", "a"));
        let before = session.qa.generation;

        clear(&mut session);
        assert!(session.qa.document.is_none());
        assert!(session.qa.exchanges.is_empty());
        assert_eq!(session.qa.generation, before + 1);
    }

    #[test]
    fn ask_requires_a_loaded_document() {
        let mut session = session();
        assert!(begin_ask(&mut session, "anything?").is_none());
        assert!(!session.qa.in_flight);
    }

    #[test]
    fn blank_question_is_a_no_op() {
        let mut session = session_with_document();
        assert!(begin_ask(&mut session, "  \n").is_none());
        assert!(!session.qa.in_flight);
    }

    #[test]
    fn ask_while_pending_is_a_no_op() {
        let mut session = session_with_document();
        begin_ask(&mut session, "first?").expect("accepted");

        assert!(begin_ask(&mut session, "second?").is_none());
    }

    #[test]
    fn job_snapshots_document_and_generation() {
        let mut session = session_with_document();

        let job = begin_ask(&mut session, "Where is Paris?").expect("accepted");
        assert_eq!(job.document.content, "The capital of France is Paris.");
        assert_eq!(job.generation, session.qa.generation);
        assert_eq!(job.model, "gemini-2.5-flash");
        assert!(session.qa.in_flight);
    }

    #[test]
    fn answered_settle_appends_the_exchange() {
        let mut session = session_with_document();
        let job = begin_ask(&mut session, "Where is Paris?").expect("accepted");

        let outcome = settle_ask(&mut session, &job, Ok("In France.".to_string()));
        match outcome {
            AskOutcome::Answered(exchange) => {
                assert_eq!(exchange.question, "Where is Paris?");
                assert_eq!(exchange.answer, "In France.");
            }
            _ => panic!("expected an answer"),
        }
        assert_eq!(session.qa.exchanges.len(), 1);
        assert!(!session.qa.in_flight);
    }

    #[test]
    fn degraded_error_text_is_recorded_as_the_answer() {
        let mut session = session_with_document();
        let job = begin_ask(&mut session, "Where?").expect("accepted");

        let outcome = settle_ask(&mut session, &job, Ok("Error: quota exceeded".to_string()));
        match outcome {
            AskOutcome::Answered(exchange) => {
                assert_eq!(exchange.answer, "Error: quota exceeded")
            }
            _ => panic!("expected an answer"),
        }
    }

    #[test]
    fn settle_after_clear_is_stale() {
        let mut session = session_with_document();
        let job = begin_ask(&mut session, "Where?").expect("accepted");
        clear(&mut session);

        let outcome = settle_ask(&mut session, &job, Ok("too late".to_string()));
        assert!(matches!(outcome, AskOutcome::Stale));
        assert!(session.qa.exchanges.is_empty());
        assert!(!session.qa.in_flight);
    }

    #[test]
    fn settle_after_replacement_is_stale() {
        let mut session = session_with_document();
        let job = begin_ask(&mut session, "Where?").expect("accepted");

        stage(&mut session, "new.txt");
        ingest(&mut session, b"fresh document").expect("ingested");

        let outcome = settle_ask(&mut session, &job, Ok("about the old one".to_string()));
        assert!(matches!(outcome, AskOutcome::Stale));
        assert!(session.qa.exchanges.is_empty());
    }

    #[test]
    fn clear_leaves_the_guard_to_the_settle() {
        let mut session = session_with_document();
        let job = begin_ask(&mut session, "Where?").expect("accepted");
        clear(&mut session);

        assert!(session.qa.in_flight);
        settle_ask(&mut session, &job, Ok("late".to_string()));
        assert!(!session.qa.in_flight);
    }

    #[test]
    fn raise_requests_the_credential() {
        let mut session = session_with_document();
        let job = begin_ask(&mut session, "Where?").expect("accepted");

        let outcome = settle_ask(&mut session, &job, Err(PortError::CredentialMissing));
        assert!(matches!(outcome, AskOutcome::CredentialRequired));
        assert!(session.qa.exchanges.is_empty());
        assert!(!session.qa.in_flight);
    }
}
