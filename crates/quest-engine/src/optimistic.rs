use std::collections::HashMap;
use crate::api::page::PageContext;
use crate::api::types::RequestId;
use crate::bridge::protocol::Command;
use crate::net::envelope::{Outcome, Reply};
use crate::net::request::{Endpoints, Request};

/// A value shown before the server agreed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimistic<T> {
    committed: T,
    pending: Option<T>,
}

impl<T: Clone> Optimistic<T> {
    pub fn new(value: T) -> Self {
        Self {
            committed: value,
            pending: None,
        }
    }

    /// Record `new` as pending and return what to render.
    pub fn apply(&mut self, new: T) -> T {
        self.pending = Some(new.clone());
        new
    }

    /// The server agreed.
    pub fn confirm(&mut self) {
        if let Some(value) = self.pending.take() {
            self.committed = value;
        }
    }

    /// The server refused: drop the pending value and return what to restore.
    pub fn rollback(&mut self) -> T {
        self.pending = None;
        self.committed.clone()
    }

    /// What is on screen.
    pub fn current(&self) -> &T {
        self.pending.as_ref().unwrap_or(&self.committed)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Heart buttons on list cards.
///
/// A click flips the heart at once and posts the like; the heart flips back
/// if the server says anything but 200 or the request fails.
#[derive(Debug, Default)]
pub struct LikeButtons {
    hearts: HashMap<String, Optimistic<bool>>,
    in_flight: HashMap<RequestId, String>,
}

fn heart(list_id: &str) -> String {
    format!(".heart-container[data-id='{}']", list_id)
}

fn render(ctx: &mut PageContext, list_id: &str, liked: bool) {
    let target = heart(list_id);
    if liked {
        ctx.emit(Command::add_class(target, "active"));
    } else {
        ctx.emit(Command::remove_class(target, "active"));
    }
}

impl LikeButtons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heart click. `active` is the heart's state as rendered by the server,
    /// used the first time this list is seen. Clicks while a like for the
    /// same list is in flight are ignored.
    pub fn toggle(&mut self, ctx: &mut PageContext, list_id: &str, active: bool) -> Option<RequestId> {
        let state = self
            .hearts
            .entry(list_id.to_string())
            .or_insert_with(|| Optimistic::new(active));
        if state.is_pending() {
            log::debug!("like for {} already in flight", list_id);
            return None;
        }
        let liked = state.apply(!*state.current());
        render(ctx, list_id, liked);

        let request = Request::json_post(Endpoints::like(list_id), ctx.csrf_token(), None);
        let id = ctx.fetch(request);
        self.in_flight.insert(id, list_id.to_string());
        Some(id)
    }

    pub fn on_reply(&mut self, ctx: &mut PageContext, id: RequestId, reply: &Reply) -> bool {
        let Some(list_id) = self.in_flight.remove(&id) else {
            return false;
        };
        match reply.outcome() {
            Ok(Outcome::Success(_)) => {
                if let Some(state) = self.hearts.get_mut(&list_id) {
                    state.confirm();
                }
            }
            Ok(other) => {
                log::warn!("like {} refused: {:?}", list_id, other);
                self.rollback(ctx, &list_id);
            }
            Err(e) => {
                log::warn!("like {} failed: {}", list_id, e);
                self.rollback(ctx, &list_id);
            }
        }
        true
    }

    pub fn on_failure(&mut self, ctx: &mut PageContext, id: RequestId, reason: &str) -> bool {
        let Some(list_id) = self.in_flight.remove(&id) else {
            return false;
        };
        log::warn!("like {} failed: {}", list_id, reason);
        self.rollback(ctx, &list_id);
        true
    }

    fn rollback(&mut self, ctx: &mut PageContext, list_id: &str) {
        if let Some(state) = self.hearts.get_mut(list_id) {
            let restored = state.rollback();
            render(ctx, list_id, restored);
        }
    }

    pub fn is_liked(&self, list_id: &str) -> Option<bool> {
        self.hearts.get(list_id).map(|s| *s.current())
    }
}
