//! Host bridge for the NoteKeeper core.

pub mod api;
