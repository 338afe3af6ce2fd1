//! Snapshot publish/subscribe for note sequences.
//!
//! # Responsibility
//! - Publish immutable full-sequence snapshots to any number of observers.
//! - Replay the latest snapshot to late subscribers.
//!
//! # Invariants
//! - A snapshot is replaced as one unit; observers never see partial lists.
//! - Observers may skip intermediate snapshots but always reach the latest.

use crate::model::note::Note;
use std::sync::Arc;
use tokio::sync::watch;

/// Immutable full ordered sequence of notes.
pub type NotesSnapshot = Arc<[Note]>;

/// Returns an empty snapshot.
pub fn empty_snapshot() -> NotesSnapshot {
    Arc::from(Vec::new())
}

/// Owner side of a note sequence channel.
#[derive(Debug)]
pub struct Publisher {
    tx: watch::Sender<NotesSnapshot>,
}

impl Publisher {
    /// Creates a publisher holding `initial` as its current value.
    pub fn new(initial: NotesSnapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Attaches a new observer that starts at the current value.
    pub fn subscribe(&self) -> NotesObserver {
        NotesObserver {
            rx: self.tx.subscribe(),
        }
    }

    /// Returns the current snapshot without subscribing.
    pub fn current(&self) -> NotesSnapshot {
        self.tx.borrow().clone()
    }

    /// Publishes `snapshot` unconditionally.
    pub fn replace(&self, snapshot: NotesSnapshot) {
        self.tx.send_replace(snapshot);
    }

    /// Computes the next snapshot from the current one and publishes it.
    ///
    /// `f` runs under the channel's write lock, so read-compute-publish is
    /// atomic with respect to other updates. Returning `None` leaves the
    /// value untouched and notifies nobody.
    ///
    /// Returns whether a new snapshot was published.
    pub fn update(&self, f: impl FnOnce(&NotesSnapshot) -> Option<NotesSnapshot>) -> bool {
        self.tx.send_if_modified(|current| match f(current) {
            Some(next) => {
                *current = next;
                true
            }
            None => false,
        })
    }

    /// Number of currently attached observers.
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Resolves once no observer is attached.
    pub async fn unobserved(&self) {
        self.tx.closed().await
    }
}

/// Subscription to a note sequence.
///
/// Dropping the observer detaches it.
#[derive(Debug, Clone)]
pub struct NotesObserver {
    rx: watch::Receiver<NotesSnapshot>,
}

impl NotesObserver {
    /// Latest published snapshot.
    pub fn current(&self) -> NotesSnapshot {
        self.rx.borrow().clone()
    }

    /// Waits for the next publication and returns it.
    ///
    /// Returns `None` once the publisher is gone.
    pub async fn changed(&mut self) -> Option<NotesSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Non-blocking poll for a publication not yet seen by this observer.
    pub fn try_changed(&mut self) -> Option<NotesSnapshot> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }
}
