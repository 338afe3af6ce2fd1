//! Note repository contract and in-memory implementation.
//!
//! # Responsibility
//! - Provide list/get/insert/delete over the session note collection.
//! - Publish the full ordered sequence to observers after every mutation.
//!
//! # Invariants
//! - Sequence order is `timestamp DESC`; among equal timestamps the most
//!   recently inserted note comes first.
//! - Each mutation replaces the whole snapshot in one atomic publish.
//! - A mutation that changes nothing publishes nothing.

use crate::model::note::{Note, NoteId};
use crate::observe::{empty_snapshot, NotesObserver, NotesSnapshot, Publisher};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// A note with the same id is already stored.
    DuplicateId(NoteId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "note already exists: {id}"),
        }
    }
}

impl Error for RepoError {}

/// Repository interface for the note collection.
pub trait NoteRepository {
    /// Live view of the full ordered sequence.
    fn get_all(&self) -> NotesObserver;
    /// Current full ordered sequence.
    fn snapshot(&self) -> NotesSnapshot;
    /// Gets one note by id; `None` when absent.
    fn get_by_id(&self, id: NoteId) -> Option<Note>;
    /// Adds one note and re-sorts the collection.
    fn insert(&self, note: Note) -> RepoResult<()>;
    /// Removes every note with `id`; returns whether anything was removed.
    fn delete(&self, id: NoteId) -> bool;

    fn len(&self) -> usize {
        self.snapshot().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Session-scoped note store held entirely in memory.
#[derive(Debug)]
pub struct InMemoryNoteRepository {
    notes: Publisher,
}

impl InMemoryNoteRepository {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            notes: Publisher::new(empty_snapshot()),
        }
    }
}

impl Default for InMemoryNoteRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteRepository for InMemoryNoteRepository {
    fn get_all(&self) -> NotesObserver {
        self.notes.subscribe()
    }

    fn snapshot(&self) -> NotesSnapshot {
        self.notes.current()
    }

    fn get_by_id(&self, id: NoteId) -> Option<Note> {
        self.notes
            .current()
            .iter()
            .find(|note| note.id() == id)
            .cloned()
    }

    fn insert(&self, note: Note) -> RepoResult<()> {
        let id = note.id();
        let mut duplicate = false;

        self.notes.update(|current| {
            if current.iter().any(|existing| existing.id() == id) {
                duplicate = true;
                return None;
            }
            Some(sorted_with(note, current))
        });

        if duplicate {
            return Err(RepoError::DuplicateId(id));
        }
        debug!("event=note_insert module=repo status=ok note_id={id}");
        Ok(())
    }

    fn delete(&self, id: NoteId) -> bool {
        let removed = self.notes.update(|current| {
            if !current.iter().any(|note| note.id() == id) {
                return None;
            }
            let remaining = current
                .iter()
                .filter(|note| note.id() != id)
                .cloned()
                .collect::<Vec<_>>();
            Some(remaining.into())
        });

        debug!("event=note_delete module=repo status=ok note_id={id} removed={removed}");
        removed
    }
}

/// Builds the next sequence with `note` added, ordered by `timestamp DESC`.
///
/// `note` is placed first before the stable sort so it precedes older
/// entries that share its timestamp.
fn sorted_with(note: Note, current: &[Note]) -> NotesSnapshot {
    let mut next = Vec::with_capacity(current.len() + 1);
    next.push(note);
    next.extend(current.iter().cloned());
    next.sort_by(|left, right| right.timestamp().cmp(&left.timestamp()));
    next.into()
}
