//! Core domain logic for NoteKeeper.
//! This crate is the single source of truth for note-list invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod observe;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::note::{can_save, is_blank, Note, NoteId, NoteValidationError};
pub use observe::{NotesObserver, NotesSnapshot};
pub use repo::note_repo::{InMemoryNoteRepository, NoteRepository, RepoError, RepoResult};
pub use service::note_service::NoteService;
pub use service::note_view::{format_timestamp, note_list_items, NoteListItem};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
