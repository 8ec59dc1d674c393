//! Request sequencing
//!
//! Every cart request draws a [`Ticket`]. Only the response to the most recently issued ticket
//! may be committed; anything older has been superseded and is dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Position of a request in the issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic ticket dispenser for one resource.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    /// Issue the next ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is the latest one issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
