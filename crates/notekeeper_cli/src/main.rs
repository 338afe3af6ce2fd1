//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notekeeper_core` linkage without the Flutter/FFI runtime.
//! - Drive one add/list/delete round through the note facade.

use chrono::Local;
use notekeeper_core::{
    core_version, note_list_items, ping, CoreConfig, InMemoryNoteRepository, NoteService,
    NotesObserver, NotesSnapshot,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(1);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("notekeeper_core ping={}", ping());
    println!("notekeeper_core version={}", core_version());

    let service = NoteService::new(
        Arc::new(InMemoryNoteRepository::new()),
        &CoreConfig::default(),
        Handle::current(),
    );
    let mut notes = service.notes();

    service.add_note("Shopping", "milk, eggs");
    service.add_note("", "call back tomorrow");
    service.add_note("   ", "");
    let listed = settle(&mut notes, 2).await;
    print_list("after add", &listed);

    if let Some(oldest) = listed.last() {
        service.delete_note(oldest.id());
    }
    let listed = settle(&mut notes, 1).await;
    print_list("after delete", &listed);
}

async fn settle(notes: &mut NotesObserver, expected: usize) -> NotesSnapshot {
    let wait = async {
        let mut current = notes.current();
        while current.len() != expected {
            match notes.changed().await {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    };
    let settled = tokio::time::timeout(SETTLE_TIMEOUT, wait).await;
    settled.unwrap_or_else(|_| notes.current())
}

fn print_list(label: &str, notes: &NotesSnapshot) {
    println!("{label}: {} note(s)", notes.len());
    for item in note_list_items(notes, &Local) {
        println!(
            "  [{}] {} | {} | {}",
            item.timestamp_label,
            item.title.as_deref().unwrap_or("-"),
            item.content.as_deref().unwrap_or("-"),
            item.id
        );
    }
}
