//! Repository layer abstractions and the in-memory note store.
//!
//! # Responsibility
//! - Define the storage contract the facade depends on.
//! - Own the authoritative note collection for the session.
//!
//! # Invariants
//! - The published sequence is always sorted by `timestamp` descending.
//! - Ids are unique within a store; duplicate inserts are rejected.
//! - Missing ids are reported as `None`, never as errors.

pub mod note_repo;
