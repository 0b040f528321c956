//! Change notifications for the catalog and the lending ledger.
//!
//! Mutations made through a console are published on an [`EventBus`] after
//! they commit. Anything holding a cached view (a book listing, a checked-out
//! copy list) subscribes and patches its cache instead of reloading it.

use tokio::sync::broadcast::{self, Receiver, Sender, error::TryRecvError};
use tracing::{debug, warn};

/// Events kept for slow subscribers before the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 64;

/// Editable record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Author,
    Genre,
    Format,
    Publisher,
    Book,
    Copy,
    Member,
}

/// A committed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryEvent {
    /// A record was created
    Added { kind: EntityKind, id: i64 },
    /// A record was edited in place
    Updated { kind: EntityKind, id: i64 },
    /// A record was soft deleted
    Archived { kind: EntityKind, id: i64 },
    /// Copies left the library in one transaction
    CheckedOut {
        transaction_id: i64,
        member_id: i64,
        copy_ids: Vec<i64>,
    },
    /// Copies came back
    Returned { copy_ids: Vec<i64> },
}

impl LibraryEvent {
    /// The record kind and id for catalog events, `None` for lending events.
    #[must_use]
    pub const fn record(&self) -> Option<(EntityKind, i64)> {
        match *self {
            Self::Added { kind, id } | Self::Updated { kind, id } | Self::Archived { kind, id } => {
                Some((kind, id))
            }
            Self::CheckedOut { .. } | Self::Returned { .. } => None,
        }
    }
}

/// Publish/subscribe channel for [`LibraryEvent`]s.
///
/// Cloning the bus yields another handle to the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Sender<LibraryEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Sends an event to every current subscriber and returns how many there
    /// were. Publishing with no subscribers is not an error.
    pub fn publish(&self, event: LibraryEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                debug!(?event, "No subscribers for event");
                0
            }
        }
    }

    /// Registers a new subscriber that sees events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<LibraryEvent> {
        self.sender.subscribe()
    }
}

/// Takes every event currently queued for `receiver` without waiting.
///
/// Events lost to a lagging receiver are skipped with a warning.
pub fn drain(receiver: &mut Receiver<LibraryEvent>) -> Vec<LibraryEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "Event subscriber lagged behind");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    events
}
