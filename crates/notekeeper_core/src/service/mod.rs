//! Core use-case services.
//!
//! # Responsibility
//! - Turn host intents into store operations.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod note_service;
pub mod note_view;
