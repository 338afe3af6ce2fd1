//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note list intents and observation to Dart via FRB.
//! - Own the process-wide runtime and note facade.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Mutating calls return immediately; results arrive through polling.
//! - Observer handles are never reused within a process.

use chrono::Local;
use log::warn;
use notekeeper_core::{
    can_save as can_save_inner, core_version as core_version_inner,
    init_logging as init_logging_inner, note_list_items, ping as ping_inner,
    CoreConfig, InMemoryNoteRepository, NoteId, NoteListItem, NoteService, NotesObserver,
};
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::{Builder, Runtime};

const RUNTIME_WORKER_THREADS: usize = 2;

static CONFIG: OnceCell<CoreConfig> = OnceCell::new();
static RUNTIME: OnceCell<Runtime> = OnceCell::new();
static SERVICE: OnceCell<NoteService<InMemoryNoteRepository>> = OnceCell::new();
static OBSERVERS: Lazy<Mutex<HashMap<u64, NotesObserver>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static NEXT_OBSERVER: AtomicU64 = AtomicU64::new(1);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Applies core configuration JSON before the note service starts.
///
/// # FFI contract
/// - Must be called before any note API to take effect.
/// - Returns empty string on success and error message on failure,
///   including when configuration was already fixed.
#[flutter_rust_bridge::frb(sync)]
pub fn configure(config_json: String) -> String {
    let config = match CoreConfig::from_json(config_json.as_str()) {
        Ok(config) => config,
        Err(err) => return format!("configure failed: {err}"),
    };
    if SERVICE.get().is_some() {
        return "configure failed: note service already started".to_string();
    }
    match CONFIG.set(config) {
        Ok(()) => String::new(),
        Err(_) => "configure failed: configuration already set".to_string(),
    }
}

/// Display row returned to the host list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    /// Stable note ID in string form.
    pub id: String,
    /// Title, or `None` when blank.
    pub title: Option<String>,
    /// Content, or `None` when blank.
    pub content: Option<String>,
    /// Creation time in epoch milliseconds.
    pub timestamp_ms: i64,
    /// Creation time formatted in host local time.
    pub timestamp_label: String,
}

/// Full list envelope for one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    /// Rows ordered most recent first.
    pub items: Vec<NoteItem>,
    /// Convenience flag for empty-state rendering.
    pub is_empty: bool,
}

/// Queues creation of a note.
///
/// # FFI contract
/// - Returns `false` when both fields are blank; nothing is created.
/// - Returns `true` when the note was queued.
#[flutter_rust_bridge::frb(sync)]
pub fn note_add(title: String, content: String) -> bool {
    match service() {
        Ok(service) => service.add_note(title, content),
        Err(err) => {
            warn!("event=note_add module=ffi status=error error={err}");
            false
        }
    }
}

/// Queues deletion of a note by id.
///
/// # FFI contract
/// - Unknown ids are accepted and ignored.
/// - Returns empty string on success and error message for malformed ids.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> String {
    let note_id = match parse_note_id(&id) {
        Ok(note_id) => note_id,
        Err(err) => return err,
    };
    match service() {
        Ok(service) => {
            service.delete_note(note_id);
            String::new()
        }
        Err(err) => format!("note_delete failed: {err}"),
    }
}

/// Reads one note by id; `None` when absent or malformed.
#[flutter_rust_bridge::frb(sync)]
pub fn note_get(id: String) -> Option<NoteItem> {
    let note_id = parse_note_id(&id).ok()?;
    let note = service().ok()?.get_note(note_id)?;
    let item = NoteListItem::from_note(&note, &Local);
    Some(to_note_item(item))
}

/// Whether the given input would create a note.
#[flutter_rust_bridge::frb(sync)]
pub fn can_save(title: String, content: String) -> bool {
    can_save_inner(&title, &content)
}

/// Attaches an observer to the note list and returns its handle.
///
/// Returns `0` when the note service cannot start.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_subscribe() -> u64 {
    let service = match service() {
        Ok(service) => service,
        Err(err) => {
            warn!("event=notes_subscribe module=ffi status=error error={err}");
            return 0;
        }
    };
    let handle = NEXT_OBSERVER.fetch_add(1, Ordering::SeqCst);
    observers().insert(handle, service.notes());
    handle
}

/// Returns the list if it changed since the last poll on `handle`.
///
/// Returns `None` when unchanged or when `handle` is unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_poll(handle: u64) -> Option<NotesListResponse> {
    let snapshot = observers().get_mut(&handle)?.try_changed()?;
    Some(to_list_response(&snapshot))
}

/// Returns the latest list seen by `handle` without consuming changes.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_snapshot(handle: u64) -> Option<NotesListResponse> {
    let snapshot = observers().get(&handle)?.current();
    Some(to_list_response(&snapshot))
}

/// Detaches an observer. Returns whether `handle` was attached.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_unsubscribe(handle: u64) -> bool {
    observers().remove(&handle).is_some()
}

fn service() -> Result<&'static NoteService<InMemoryNoteRepository>, String> {
    let runtime = RUNTIME.get_or_try_init(|| {
        Builder::new_multi_thread()
            .worker_threads(RUNTIME_WORKER_THREADS)
            .thread_name("notekeeper-core")
            .enable_time()
            .build()
            .map_err(|err| format!("runtime start failed: {err}"))
    })?;

    Ok(SERVICE.get_or_init(|| {
        let config = CONFIG.get_or_init(CoreConfig::default);
        NoteService::new(
            Arc::new(InMemoryNoteRepository::new()),
            config,
            runtime.handle().clone(),
        )
    }))
}

fn observers() -> MutexGuard<'static, HashMap<u64, NotesObserver>> {
    OBSERVERS.lock().unwrap_or_else(PoisonError::into_inner)
}

fn parse_note_id(raw: &str) -> Result<NoteId, String> {
    NoteId::parse_str(raw.trim()).map_err(|err| format!("invalid note id `{raw}`: {err}"))
}

fn to_list_response(notes: &[notekeeper_core::Note]) -> NotesListResponse {
    let items = note_list_items(notes, &Local)
        .into_iter()
        .map(to_note_item)
        .collect::<Vec<_>>();
    NotesListResponse {
        is_empty: items.is_empty(),
        items,
    }
}

fn to_note_item(item: NoteListItem) -> NoteItem {
    NoteItem {
        id: item.id.to_string(),
        title: item.title,
        content: item.content,
        timestamp_ms: item.timestamp,
        timestamp_label: item.timestamp_label,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        can_save, configure, core_version, init_logging, note_add, note_delete, note_get,
        notes_poll, notes_snapshot, notes_subscribe, notes_unsubscribe, ping, NotesListResponse,
    };
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    fn poll_until(
        handle: u64,
        predicate: impl Fn(&NotesListResponse) -> bool,
    ) -> NotesListResponse {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(response) = notes_poll(handle) {
                if predicate(&response) {
                    return response;
                }
            }
            let latest = notes_snapshot(handle).expect("handle should stay attached");
            if predicate(&latest) {
                return latest;
            }
            assert!(Instant::now() < deadline, "list did not reach expected state");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    #[test]
    fn smoke_calls_forward_core_values() {
        assert_eq!(ping(), notekeeper_core::ping());
        assert_eq!(core_version(), notekeeper_core::core_version());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_rejects_invalid_json() {
        let error = configure("{not json".to_string());
        assert!(error.contains("configure failed"));
    }

    #[test]
    fn note_add_and_delete_flow_through_observer() {
        let handle = notes_subscribe();
        assert_ne!(handle, 0);

        let title = unique_token("ffi-add");
        assert!(note_add(title.clone(), String::new()));
        let listed = poll_until(handle, |response| {
            response
                .items
                .iter()
                .any(|item| item.title.as_deref() == Some(title.as_str()))
        });
        let created = listed
            .items
            .iter()
            .find(|item| item.title.as_deref() == Some(title.as_str()))
            .cloned()
            .expect("created note should be listed");
        assert_eq!(created.content, None);
        assert!(!created.timestamp_label.is_empty());
        assert_eq!(note_get(created.id.clone()), Some(created.clone()));

        assert_eq!(note_delete(created.id.clone()), "");
        poll_until(handle, |response| {
            response.items.iter().all(|item| item.id != created.id)
        });
        assert_eq!(note_get(created.id), None);

        assert!(notes_unsubscribe(handle));
        assert!(!notes_unsubscribe(handle));
    }

    #[test]
    fn blank_add_is_rejected() {
        assert!(!note_add("  ".to_string(), "\n".to_string()));
        assert!(!can_save(String::new(), " ".to_string()));
        assert!(can_save("a".to_string(), String::new()));
    }

    #[test]
    fn note_delete_rejects_malformed_id() {
        let error = note_delete("not-a-uuid".to_string());
        assert!(error.contains("invalid note id"));
        assert_eq!(note_get("not-a-uuid".to_string()), None);
    }

    #[test]
    fn unknown_handle_yields_nothing() {
        assert_eq!(notes_poll(u64::MAX), None);
        assert_eq!(notes_snapshot(u64::MAX), None);
    }
}
