//! Note facade between host intents and the note store.
//!
//! # Responsibility
//! - Validate add intents and forward add/delete to the store.
//! - Re-expose the store's sequence as an observable with an idle policy.
//!
//! # Invariants
//! - Mutations never block the caller and are applied in call order.
//! - Blank add intents are dropped without touching the store.
//! - While observed, the facade value tracks the store. After the last
//!   observer leaves, relaying stops once the stop timeout elapses with no
//!   new observer; a new observer restarts it immediately.

use crate::config::CoreConfig;
use crate::model::note::{Note, NoteId};
use crate::observe::{empty_snapshot, NotesObserver, NotesSnapshot, Publisher};
use crate::repo::note_repo::NoteRepository;
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

#[derive(Debug)]
enum NoteCommand {
    Insert(Note),
    Delete(NoteId),
}

/// Relay bookkeeping shared between the service and its relay task.
#[derive(Debug, Default)]
struct RelayGate {
    running: Mutex<bool>,
    /// Bumped on every `notes()` call; lets the relay notice observers that
    /// came and went during its idle window.
    attaches: AtomicU64,
}

impl RelayGate {
    fn running(&self) -> MutexGuard<'_, bool> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Note facade over a repository implementation.
///
/// Dropping the service stops its relay and lets the worker exit once the
/// queued mutations are applied.
pub struct NoteService<R: NoteRepository> {
    repo: Arc<R>,
    runtime: Handle,
    commands: mpsc::UnboundedSender<NoteCommand>,
    state: Arc<Publisher>,
    gate: Arc<RelayGate>,
    stop_timeout: Duration,
    shutdown: watch::Sender<()>,
}

impl<R> NoteService<R>
where
    R: NoteRepository + Send + Sync + 'static,
{
    /// Creates a facade and starts its mutation worker on `runtime`.
    pub fn new(repo: Arc<R>, config: &CoreConfig, runtime: Handle) -> Self {
        let (commands, queue) = mpsc::unbounded_channel();
        runtime.spawn(run_worker(Arc::clone(&repo), queue));
        let (shutdown, _) = watch::channel(());

        Self {
            repo,
            runtime,
            commands,
            state: Arc::new(Publisher::new(empty_snapshot())),
            gate: Arc::new(RelayGate::default()),
            stop_timeout: config.subscription_stop_timeout(),
            shutdown,
        }
    }

    /// Observable note list.
    ///
    /// The returned observer starts at the last known value and receives
    /// every later update while attached.
    pub fn notes(&self) -> NotesObserver {
        let observer = self.state.subscribe();
        self.gate.attaches.fetch_add(1, Ordering::SeqCst);
        self.ensure_relay();
        observer
    }

    /// Last known list value, without attaching an observer.
    pub fn current_notes(&self) -> NotesSnapshot {
        self.state.current()
    }

    /// Whether store updates are currently being relayed.
    pub fn is_relaying(&self) -> bool {
        *self.gate.running()
    }

    /// Queues creation of a note from user input.
    ///
    /// Returns `false` and does nothing when both fields are blank.
    /// Title and content are stored as given.
    pub fn add_note(&self, title: impl Into<String>, content: impl Into<String>) -> bool {
        let title = title.into();
        let content = content.into();
        if Note::validate_input(&title, &content).is_err() {
            debug!("event=note_add module=service status=skipped reason=blank");
            return false;
        }

        self.enqueue(NoteCommand::Insert(Note::new(title, content)));
        true
    }

    /// Queues deletion of the note with `id`.
    pub fn delete_note(&self, id: NoteId) {
        self.enqueue(NoteCommand::Delete(id));
    }

    /// Reads one note straight from the store.
    pub fn get_note(&self, id: NoteId) -> Option<Note> {
        self.repo.get_by_id(id)
    }

    fn enqueue(&self, command: NoteCommand) {
        if self.commands.send(command).is_err() {
            warn!("event=note_enqueue module=service status=error reason=worker_stopped");
        }
    }

    fn ensure_relay(&self) {
        let mut running = self.gate.running();
        if *running {
            return;
        }
        *running = true;

        let upstream = self.repo.get_all();
        self.runtime.spawn(run_relay(
            upstream,
            Arc::clone(&self.state),
            Arc::clone(&self.gate),
            self.stop_timeout,
            self.shutdown.subscribe(),
        ));
        debug!("event=relay_start module=service status=ok");
    }
}

async fn run_worker<R: NoteRepository>(
    repo: Arc<R>,
    mut queue: mpsc::UnboundedReceiver<NoteCommand>,
) {
    while let Some(command) = queue.recv().await {
        match command {
            NoteCommand::Insert(note) => {
                if let Err(err) = repo.insert(note) {
                    warn!("event=note_insert module=service status=error error={err}");
                }
            }
            NoteCommand::Delete(id) => {
                repo.delete(id);
            }
        }
    }
    debug!("event=worker_stop module=service status=ok");
}

async fn run_relay(
    mut upstream: NotesObserver,
    state: Arc<Publisher>,
    gate: Arc<RelayGate>,
    stop_timeout: Duration,
    mut shutdown: watch::Receiver<()>,
) {
    state.replace(upstream.current());

    let idle = idle_window(&state, &gate, stop_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            next = upstream.changed() => match next {
                Some(snapshot) => state.replace(snapshot),
                None => break,
            },
            _ = &mut idle => {
                if stop_if_unobserved(&state, &gate) {
                    debug!("event=relay_stop module=service status=ok reason=idle");
                    return;
                }
                idle.set(idle_window(&state, &gate, stop_timeout));
            }
            _ = shutdown.changed() => break,
        }
    }

    *gate.running() = false;
    debug!("event=relay_stop module=service status=ok reason=closed");
}

/// Marks the relay stopped if nobody observes; the check and the flag
/// update happen under the gate lock that `ensure_relay` also takes.
fn stop_if_unobserved(state: &Publisher, gate: &RelayGate) -> bool {
    let mut running = gate.running();
    if state.observer_count() > 0 {
        return false;
    }
    *running = false;
    true
}

/// Resolves after a full `stop_timeout` passed with no observer attached
/// and none attaching in between.
async fn idle_window(state: &Publisher, gate: &RelayGate, stop_timeout: Duration) {
    loop {
        state.unobserved().await;
        let attaches = gate.attaches.load(Ordering::SeqCst);
        tokio::time::sleep(stop_timeout).await;
        if state.observer_count() == 0 && gate.attaches.load(Ordering::SeqCst) == attaches {
            return;
        }
    }
}
