pub mod domain;
pub mod ports;
pub mod profiles;
pub mod prompt;

pub use domain::{Attachment, ChatMessage, NoteDraft, NoteTask, PromptProfile, QAExchange, Role};
pub use ports::{GenerativeModelService, PortError, PortResult};
