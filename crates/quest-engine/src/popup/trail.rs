use std::collections::HashSet;
use crate::api::page::PageContext;
use crate::api::types::{RequestId, WakeKind};
use crate::bridge::protocol::{Binding, ClickTarget, Command};
use crate::net::envelope::Reply;
use crate::net::request::{Endpoints, Request};
use super::alert::{GENERIC_ERROR_TEXT, GENERIC_ERROR_TITLE};

pub const TRAIL: &str = ".games-trail";
pub const LIST_BOX: &str = ".list-box";
pub const BODY_CLASS: &str = "phone-trail-opened";
pub const DELETE_ZONE: &str = "delete-zone";

/// Drops the body class once the trail has slid out.
pub const WAKE_TRAIL_CLOSED: WakeKind = WakeKind(0x110);

/// Action names the trail fragment's nodes are bound to.
pub const ACTION_CLOSE_LEVEL: &str = "close_level_popup";
pub const ACTION_CLOSE_TRAIL: &str = "close_trail";
pub const ACTION_OPEN_LEVEL: &str = "open_level_info";

fn trail_bindings() -> Vec<Binding> {
    vec![
        Binding::new(".game-trail", ACTION_CLOSE_LEVEL),
        Binding::new(".close-game-rail-button", ACTION_CLOSE_TRAIL),
        Binding::new(".level-box", ACTION_OPEN_LEVEL),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Loading {
    id: RequestId,
    list_id: String,
    position: u32,
}

/// The side panel listing a word list's levels.
#[derive(Debug, Default)]
pub struct TrailPopup {
    loading: Option<Loading>,
    /// List whose trail is on screen.
    shown: Option<String>,
    /// Requests from earlier opens; their replies are dropped.
    superseded: HashSet<RequestId>,
}

impl TrailPopup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the trail of `list_id`, the list box at `target.index`.
    /// Returns the fetch id, or `None` when the click is ignored.
    pub fn open(&mut self, ctx: &mut PageContext, list_id: &str, target: &ClickTarget) -> Option<RequestId> {
        if target.has_class(DELETE_ZONE) {
            return None;
        }
        if let Some(previous) = self.loading.take() {
            log::debug!("trail {} replaced before it loaded", previous.list_id);
            self.superseded.insert(previous.id);
        }

        ctx.cancel(WAKE_TRAIL_CLOSED);
        ctx.emit(Command::add_class("body", BODY_CLASS));
        ctx.emit(Command::add_class(TRAIL, "active"));
        ctx.splice(TRAIL, crate::bridge::protocol::LOADER_HTML, Vec::new());
        ctx.emit(Command::select(LIST_BOX, target.index, "selected"));

        let id = ctx.fetch(Request::get_html(Endpoints::trail(list_id)));
        self.loading = Some(Loading {
            id,
            list_id: list_id.to_string(),
            position: target.index,
        });
        Some(id)
    }

    /// Whether `id` is a trail request, current or superseded.
    pub fn owns(&self, id: RequestId) -> bool {
        self.loading.as_ref().is_some_and(|l| l.id == id) || self.superseded.contains(&id)
    }

    /// Returns false if `id` is not a trail request.
    pub fn on_reply(&mut self, ctx: &mut PageContext, id: RequestId, reply: &Reply) -> bool {
        if self.superseded.remove(&id) {
            log::debug!("dropping stale trail reply {:?}", id);
            return true;
        }
        let loading = match self.loading.take_if(|l| l.id == id) {
            Some(loading) => loading,
            None => return false,
        };
        match reply.html() {
            Ok(html) => {
                ctx.splice(TRAIL, html, trail_bindings());
                ctx.emit(Command::set_data(TRAIL, "color", loading.position % 3));
                self.shown = Some(loading.list_id);
            }
            Err(e) => {
                log::warn!("trail {} failed: {}", loading.list_id, e);
                ctx.alert(GENERIC_ERROR_TITLE, GENERIC_ERROR_TEXT);
            }
        }
        true
    }

    pub fn on_failure(&mut self, ctx: &mut PageContext, id: RequestId, reason: &str) -> bool {
        if self.superseded.remove(&id) {
            return true;
        }
        match self.loading.take_if(|l| l.id == id) {
            Some(loading) => {
                log::warn!("trail {} failed: {}", loading.list_id, reason);
                ctx.alert(GENERIC_ERROR_TITLE, GENERIC_ERROR_TEXT);
                true
            }
            None => false,
        }
    }

    /// Slide the trail out. The body class goes after the close delay.
    pub fn close(&mut self, ctx: &mut PageContext) {
        if let Some(loading) = self.loading.take() {
            self.superseded.insert(loading.id);
        }
        self.shown = None;
        ctx.emit(Command::remove_class(TRAIL, "active"));
        ctx.cancel(WAKE_TRAIL_CLOSED);
        let delay = ctx.config.trail_close_delay;
        ctx.schedule(delay, WAKE_TRAIL_CLOSED);
    }

    pub fn on_wake(&mut self, ctx: &mut PageContext, kind: WakeKind) -> bool {
        if kind != WAKE_TRAIL_CLOSED {
            return false;
        }
        ctx.emit(Command::remove_class("body", BODY_CLASS));
        true
    }

    pub fn shown(&self) -> Option<&str> {
        self.shown.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::manifest::PageManifest;
    use crate::api::page::PageConfig;

    fn ctx() -> PageContext {
        PageContext::new(PageManifest::default(), PageConfig::default(), 1)
    }

    fn at(index: u32) -> ClickTarget {
        ClickTarget {
            index,
            ..ClickTarget::default()
        }
    }

    #[test]
    fn delete_zone_clicks_are_ignored() {
        let mut ctx = ctx();
        let mut trail = TrailPopup::new();
        let target = ClickTarget {
            class: "delete-zone".into(),
            ..ClickTarget::default()
        };
        assert_eq!(trail.open(&mut ctx, "4", &target), None);
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn open_loads_and_splices_with_color() {
        let mut ctx = ctx();
        let mut trail = TrailPopup::new();
        let id = trail.open(&mut ctx, "12", &at(4)).unwrap();
        assert!(ctx.commands().contains(&Command::add_class("body", BODY_CLASS)));
        assert!(ctx.commands().contains(&Command::select(LIST_BOX, 4, "selected")));

        ctx.drain_commands();
        assert!(trail.on_reply(&mut ctx, id, &Reply::new(200, "<div class='level-box'></div>")));
        let cmds = ctx.drain_commands();
        assert!(matches!(&cmds[0], Command::Splice { bindings, .. } if bindings.len() == 3));
        assert_eq!(cmds[1], Command::set_data(TRAIL, "color", 1));
        assert_eq!(trail.shown(), Some("12"));
    }

    #[test]
    fn only_latest_open_is_applied() {
        let mut ctx = ctx();
        let mut trail = TrailPopup::new();
        let first = trail.open(&mut ctx, "1", &at(0)).unwrap();
        let second = trail.open(&mut ctx, "2", &at(1)).unwrap();
        ctx.drain_commands();

        assert!(trail.on_reply(&mut ctx, first, &Reply::new(200, "<p>one</p>")));
        assert!(ctx.commands().is_empty());
        assert!(trail.on_reply(&mut ctx, second, &Reply::new(200, "<p>two</p>")));
        assert_eq!(trail.shown(), Some("2"));
    }

    #[test]
    fn reopening_does_not_duplicate_bindings() {
        let mut ctx = ctx();
        let mut trail = TrailPopup::new();
        for _ in 0..3 {
            let id = trail.open(&mut ctx, "9", &at(0)).unwrap();
            trail.on_reply(&mut ctx, id, &Reply::new(200, "<p/>"));
        }
        assert_eq!(ctx.bindings.bindings(TRAIL).len(), 3);
        assert_eq!(ctx.bindings.len(), 3);
    }

    #[test]
    fn server_error_shows_alert() {
        let mut ctx = ctx();
        let mut trail = TrailPopup::new();
        let id = trail.open(&mut ctx, "9", &at(0)).unwrap();
        ctx.drain_commands();
        trail.on_reply(&mut ctx, id, &Reply::new(500, "boom"));
        assert_eq!(ctx.commands()[0], Command::alert("Erreur", GENERIC_ERROR_TEXT));
    }

    #[test]
    fn transport_failure_shows_alert() {
        let mut ctx = ctx();
        let mut trail = TrailPopup::new();
        let id = trail.open(&mut ctx, "9", &at(0)).unwrap();
        ctx.drain_commands();
        assert!(trail.on_failure(&mut ctx, id, "offline"));
        assert_eq!(ctx.commands()[0], Command::alert("Erreur", GENERIC_ERROR_TEXT));
        assert!(!trail.is_loading());
    }

    #[test]
    fn close_drops_body_class_after_delay() {
        let mut ctx = ctx();
        let mut trail = TrailPopup::new();
        trail.close(&mut ctx);
        assert_eq!(ctx.drain_commands(), vec![Command::remove_class(TRAIL, "active")]);

        assert!(ctx.timeline.advance(0.5).is_empty());
        for kind in ctx.timeline.advance(0.5) {
            assert!(trail.on_wake(&mut ctx, kind));
        }
        assert_eq!(ctx.drain_commands(), vec![Command::remove_class("body", BODY_CLASS)]);
    }

    #[test]
    fn reopening_cancels_pending_body_reset() {
        let mut ctx = ctx();
        let mut trail = TrailPopup::new();
        trail.close(&mut ctx);
        trail.open(&mut ctx, "3", &at(0));
        assert!(!ctx.timeline.is_scheduled(WAKE_TRAIL_CLOSED));
    }
}
