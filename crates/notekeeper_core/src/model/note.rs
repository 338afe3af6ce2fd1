//! Note domain model.
//!
//! # Responsibility
//! - Define the immutable note record and its identity type.
//! - Provide blank-input validation used before creation.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `timestamp` is Unix epoch milliseconds captured at creation.
//! - Fields are private; a note cannot change after construction.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a note.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

/// Validation errors for note creation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Both title and content are empty after trimming whitespace.
    BlankNote,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankNote => write!(f, "note title and content cannot both be blank"),
        }
    }
}

impl Error for NoteValidationError {}

/// Immutable note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    title: String,
    content: String,
    /// Unix epoch milliseconds.
    timestamp: i64,
}

impl Note {
    /// Creates a note with a generated id and the current time.
    ///
    /// Title and content are stored verbatim; callers validate with
    /// [`Note::validate_input`] first when blank input must be rejected.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title, content, now_epoch_ms())
    }

    /// Creates a note with caller-provided identity and timestamp.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            timestamp,
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Creation time in epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Checks that at least one of `title`/`content` carries text.
    ///
    /// # Errors
    /// - Returns `NoteValidationError::BlankNote` when both are blank.
    pub fn validate_input(title: &str, content: &str) -> Result<(), NoteValidationError> {
        if is_blank(title) && is_blank(content) {
            return Err(NoteValidationError::BlankNote);
        }
        Ok(())
    }
}

/// Returns whether `text` is empty after trimming whitespace.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Returns whether the given input would produce a note.
///
/// Hosts use this to enable or disable their save action.
pub fn can_save(title: &str, content: &str) -> bool {
    Note::validate_input(title, content).is_ok()
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
