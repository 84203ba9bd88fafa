//! crates/workbench_core/src/profiles.rs
//!
//! The fixed catalog of prompt profiles. Selecting a profile overwrites the
//! session's active system instruction with the entry's text; the catalog
//! itself is compiled in and never changes at runtime.

use crate::domain::PromptProfile;

const PROFILES: &[PromptProfile] = &[
    PromptProfile {
        id: "general",
        label: "General Assistant",
        instruction: "You are a helpful, knowledgeable assistant. Answer clearly and concisely, \
            and ask for clarification when a request is ambiguous.",
    },
    PromptProfile {
        id: "coder",
        label: "Code Companion",
        instruction: "You are an experienced software engineer. Prefer working code examples, \
            call out pitfalls, and keep explanations short.",
    },
    PromptProfile {
        id: "writer",
        label: "Writing Editor",
        instruction: "You are a careful writing editor. Improve clarity, tone, and structure \
            while preserving the author's voice.",
    },
    PromptProfile {
        id: "researcher",
        label: "Research Analyst",
        instruction: "You are a methodical research analyst. Summarize evidence, cite the \
            material you were given, and separate facts from speculation.",
    },
];

/// The full catalog, in display order.
pub fn catalog() -> &'static [PromptProfile] {
    PROFILES
}

/// Looks up a profile by its identifier.
pub fn find(id: &str) -> Option<&'static PromptProfile> {
    PROFILES.iter().find(|profile| profile.id == id)
}

/// The instruction a new session starts with: the first catalog entry.
pub fn default_instruction() -> &'static str {
    PROFILES[0].instruction
}
