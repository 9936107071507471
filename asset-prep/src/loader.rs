//! Stale-load tracking for asynchronous asset decodes
//!
//! Decode is the one pipeline operation that may suspend (network fetch,
//! parse). When a user loads asset B while asset A is still decoding, A's
//! eventual completion must not clobber B. The tracker hands out a ticket per
//! load attempt; only the most recently issued ticket may install its result.
//! A stale completion is expected housekeeping, not an error — it is dropped
//! with a debug event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::debug;

/// Proof of one load attempt; compared against the tracker's current generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    /// The generation this ticket was issued at
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Guards a single live slot against out-of-order decode completions
pub struct LoadTracker<T> {
    generation: AtomicU64,
    slot: Mutex<Option<T>>,
}

impl<T> LoadTracker<T> {
    /// Create a tracker with an empty slot
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            slot: Mutex::new(None),
        }
    }

    /// Begin a new load attempt, invalidating every earlier ticket
    pub fn begin(&self) -> LoadTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket { generation }
    }

    /// Whether a ticket still belongs to the active load attempt
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Install a completed decode if its ticket is still current.
    ///
    /// Returns `true` when the value was installed. A stale completion is
    /// discarded silently; the previously installed value (if any) stays
    /// mounted untouched.
    pub fn complete(&self, ticket: &LoadTicket, value: T) -> bool {
        if !self.is_current(ticket) {
            debug!(
                ticket = ticket.generation,
                current = self.generation.load(Ordering::SeqCst),
                "discarding stale load completion"
            );
            return false;
        }
        *self.slot.lock().expect("load tracker lock poisoned") = Some(value);
        true
    }

    /// Borrow the currently installed value, if any
    pub fn with_current<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let slot = self.slot.lock().expect("load tracker lock poisoned");
        f(slot.as_ref())
    }

    /// Take the currently installed value out of the tracker
    pub fn take(&self) -> Option<T> {
        self.slot.lock().expect("load tracker lock poisoned").take()
    }
}

impl<T> Default for LoadTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}
