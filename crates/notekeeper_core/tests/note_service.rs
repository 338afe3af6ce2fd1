use notekeeper_core::{
    CoreConfig, InMemoryNoteRepository, Note, NoteRepository, NoteService, NotesObserver,
    NotesSnapshot,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{sleep, timeout};
use uuid::Uuid;

fn service_with(
    stop_timeout_ms: u64,
) -> (Arc<InMemoryNoteRepository>, NoteService<InMemoryNoteRepository>) {
    let repo = Arc::new(InMemoryNoteRepository::new());
    let config = CoreConfig {
        subscription_stop_timeout_ms: stop_timeout_ms,
    };
    let service = NoteService::new(Arc::clone(&repo), &config, Handle::current());
    (repo, service)
}

fn service() -> (Arc<InMemoryNoteRepository>, NoteService<InMemoryNoteRepository>) {
    service_with(CoreConfig::default().subscription_stop_timeout_ms)
}

async fn wait_for(
    observer: &mut NotesObserver,
    predicate: impl Fn(&[Note]) -> bool,
) -> NotesSnapshot {
    timeout(Duration::from_secs(2), async {
        let mut current = observer.current();
        while !predicate(&current) {
            current = observer.changed().await.expect("facade should stay alive");
        }
        current
    })
    .await
    .expect("condition should be reached in time")
}

#[tokio::test]
async fn add_note_lists_most_recent_first() {
    let (_repo, service) = service();
    let mut notes = service.notes();

    assert!(service.add_note("Title", ""));
    assert!(service.add_note("", "Body"));

    let listed = wait_for(&mut notes, |list| list.len() == 2).await;
    assert_eq!(listed[0].content(), "Body");
    assert_eq!(listed[1].title(), "Title");
    assert!(listed[0].timestamp() >= listed[1].timestamp());
}

#[tokio::test]
async fn blank_add_is_ignored() {
    let (repo, service) = service();
    let mut notes = service.notes();

    assert!(!service.add_note("", ""));
    assert!(!service.add_note("   ", "\n"));
    assert!(service.add_note("kept", ""));

    let listed = wait_for(&mut notes, |list| !list.is_empty()).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title(), "kept");
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn mutations_apply_in_call_order() {
    let (repo, service) = service();
    let mut notes = service.notes();
    let seeded = Note::with_id(Uuid::new_v4(), "seeded", "", 1);
    repo.insert(seeded.clone()).unwrap();

    service.delete_note(Uuid::new_v4());
    service.delete_note(seeded.id());
    service.add_note("after delete", "");

    let listed = wait_for(&mut notes, |list| {
        list.iter().any(|note| note.title() == "after delete")
    })
    .await;
    assert_eq!(listed.len(), 1);
    assert_eq!(service.get_note(seeded.id()), None);
}

#[tokio::test]
async fn delete_note_removes_from_observed_list() {
    let (_repo, service) = service();
    let mut notes = service.notes();
    service.add_note("first", "");
    service.add_note("second", "");
    let listed = wait_for(&mut notes, |list| list.len() == 2).await;

    let target = listed[1].id();
    service.delete_note(target);

    let listed = wait_for(&mut notes, |list| list.len() == 1).await;
    assert_eq!(listed[0].title(), "second");
    assert_eq!(service.get_note(target), None);
    assert_eq!(service.get_note(listed[0].id()).as_ref(), Some(&listed[0]));
}

#[tokio::test]
async fn late_observer_receives_last_value_immediately() {
    let (_repo, service) = service();
    let mut first = service.notes();
    service.add_note("hello", "world");
    wait_for(&mut first, |list| list.len() == 1).await;

    let late = service.notes();
    assert_eq!(late.current().len(), 1);
    assert_eq!(service.current_notes().len(), 1);
}

#[tokio::test]
async fn facade_is_empty_and_idle_before_first_observer() {
    let (repo, service) = service();
    repo.insert(Note::with_id(Uuid::new_v4(), "pre", "", 5)).unwrap();

    assert!(!service.is_relaying());
    assert!(service.current_notes().is_empty());

    let mut notes = service.notes();
    assert!(service.is_relaying());
    let listed = wait_for(&mut notes, |list| list.len() == 1).await;
    assert_eq!(listed[0].title(), "pre");
}

#[tokio::test(start_paused = true)]
async fn relay_stops_after_idle_timeout_and_resumes_on_observe() {
    let (repo, service) = service_with(5_000);
    let mut notes = service.notes();
    repo.insert(Note::with_id(Uuid::new_v4(), "one", "", 100)).unwrap();
    wait_for(&mut notes, |list| list.len() == 1).await;

    drop(notes);
    sleep(Duration::from_millis(4_000)).await;
    assert!(service.is_relaying());
    sleep(Duration::from_millis(2_000)).await;
    assert!(!service.is_relaying());

    repo.insert(Note::with_id(Uuid::new_v4(), "two", "", 200)).unwrap();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(service.current_notes().len(), 1);

    let mut notes = service.notes();
    assert_eq!(notes.current().len(), 1);
    let listed = wait_for(&mut notes, |list| list.len() == 2).await;
    assert_eq!(listed[0].title(), "two");
}

#[tokio::test(start_paused = true)]
async fn reattaching_within_timeout_keeps_relay_running() {
    let (repo, service) = service_with(5_000);
    let notes = service.notes();
    drop(notes);

    sleep(Duration::from_millis(3_000)).await;
    let mut notes = service.notes();
    sleep(Duration::from_millis(3_000)).await;
    assert!(service.is_relaying());

    repo.insert(Note::with_id(Uuid::new_v4(), "live", "", 1)).unwrap();
    let listed = wait_for(&mut notes, |list| list.len() == 1).await;
    assert_eq!(listed[0].title(), "live");
}

#[tokio::test(start_paused = true)]
async fn brief_reattach_restarts_idle_window() {
    let (_repo, service) = service_with(5_000);
    drop(service.notes());

    sleep(Duration::from_millis(3_000)).await;
    drop(service.notes());

    sleep(Duration::from_millis(3_000)).await;
    assert!(service.is_relaying());
    sleep(Duration::from_millis(5_000)).await;
    assert!(!service.is_relaying());
}
