//! Domain model for the note list.
//!
//! # Responsibility
//! - Define the canonical `Note` record shared by store, facade and bridge.
//! - Own input validation rules for note creation.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId` generated at creation.
//! - Notes are immutable once created; there is no update path.

pub mod note;
