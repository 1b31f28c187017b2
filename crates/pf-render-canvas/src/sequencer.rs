//! Latest-wins render ordering.
//!
//! Every scheduled render takes a ticket. Renders run one at a time in lock
//! order; a render that finds a newer ticket issued by the time it gets the
//! state is dropped without drawing.

use std::cell::Cell;

use futures::lock::{Mutex, MutexGuard};

/// Position of one render request in scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderTicket(u64);

impl RenderTicket {
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Shared state behind an async mutex plus the id of the newest ticket.
#[derive(Debug, Default)]
pub struct RenderSequencer<T> {
    latest: Cell<u64>,
    state: Mutex<T>,
}

impl<T> RenderSequencer<T> {
    #[must_use]
    pub fn new(state: T) -> Self {
        Self {
            latest: Cell::new(0),
            state: Mutex::new(state),
        }
    }

    /// Take the next ticket; every earlier ticket becomes stale.
    pub fn ticket(&self) -> RenderTicket {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        RenderTicket(next)
    }

    #[must_use]
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.latest.get() == ticket.0
    }

    /// Wait for earlier holders, then hand out the state unless `ticket` has
    /// gone stale in the meantime.
    pub async fn acquire(&self, ticket: RenderTicket) -> Option<MutexGuard<'_, T>> {
        let guard = self.state.lock().await;
        if self.is_current(ticket) {
            Some(guard)
        } else {
            tracing::debug!(ticket = ticket.0, latest = self.latest.get(), "dropping stale render");
            None
        }
    }

    /// Access the state without taking part in render ordering.
    pub async fn lock(&self) -> MutexGuard<'_, T> {
        self.state.lock().await
    }
}
