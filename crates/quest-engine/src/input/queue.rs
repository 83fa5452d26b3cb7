use crate::api::types::{RequestId, WakeKind};
use crate::net::envelope::Reply;

/// Everything that can happen to a page between two updates.
/// `A` is the page's own action type, decoded from the host's JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent<A> {
    /// A bound element was activated.
    Action(A),
    /// The host finished a fetch we asked for.
    Reply { id: RequestId, reply: Reply },
    /// The fetch threw (offline, aborted, CORS).
    RequestFailed { id: RequestId, reason: String },
    /// A timeline entry came due.
    Wake(WakeKind),
}

/// A queue of page events.
/// The bridge pushes events as the host reports them; the runner drains them
/// after each update.
pub struct InputQueue<A> {
    events: Vec<PageEvent<A>>,
}

impl<A> InputQueue<A> {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: PageEvent<A>) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<PageEvent<A>> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &PageEvent<A>> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<A> Default for InputQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}
