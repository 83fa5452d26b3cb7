//! List preview popup.
//!
//! The popup grows out of the clicked list card: it first collapses onto the
//! card's center, then scales up while the list fragment loads, and finally
//! settles into its CSS-positioned place with the fragment inside.
//!
//! ```text
//! Closed ──display──▶ Collapsing ──50 ms──▶ Loading ──reply──▶ Settling ──250 ms──▶ Shown
//!                                              │                                     │
//!                                           failure ──▶ Closed ◀──────close───────────┘
//! ```

use glam::Vec2;
use crate::api::page::PageContext;
use crate::api::types::{RequestId, WakeKind};
use crate::bridge::protocol::{Binding, ClickTarget, Command};
use crate::net::envelope::{Outcome, Reply};
use crate::net::request::{Endpoints, Request};

pub const POPUP: &str = "#list-pop-up";
pub const CONTENT: &str = "#list-content-pop-up";
pub const TITLE: &str = "#list-title-pop-up";
pub const COPY_BUTTON: &str = "#copy-button";
pub const SEE_MORE_BUTTON: &str = "#see-more-button";
pub const LIST_CONTAINER: &str = ".list-container-popup";
pub const NOT_CLICKABLE: &str = "not-clickable-zone";

pub const PREVIEW_LOADER: &str = "<div class='loader-container'><div class='load'></div></div>";
pub const COPY_LOADER: &str = "<div class='loader' style='width: 14px; height: 14px;'></div>";
pub const COPIED_LABEL: &str = "Liste copiée";

pub const ACTION_COPY: &str = "copy_list";
pub const ACTION_SEE_MORE: &str = "see_more";
pub const ACTION_CLOSE: &str = "close_preview";

pub const WAKE_PREVIEW_GROW: WakeKind = WakeKind(0x130);
pub const WAKE_PREVIEW_REVEAL: WakeKind = WakeKind(0x131);
pub const WAKE_PREVIEW_CLEAR: WakeKind = WakeKind(0x132);

/// Bounding box of the clicked card, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub center: Vec2,
    pub size: Vec2,
}

impl Anchor {
    pub fn from_rect(left: f32, top: f32, width: f32, height: f32) -> Self {
        let size = Vec2::new(width, height);
        Self {
            center: Vec2::new(left, top) + size * 0.5,
            size,
        }
    }
}

/// A click on a list card.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRequest {
    /// Fragment URL, the card's `href`.
    pub url: String,
    pub title: String,
    pub anchor: Anchor,
    pub target: ClickTarget,
}

impl PreviewRequest {
    /// Selector of the card that was clicked.
    fn source(&self) -> String {
        format!("a[href='{}']", self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Collapsing,
    Loading,
    Settling,
    Shown,
}

fn px(v: f32) -> String {
    format!("{}px", v)
}

/// The preview popup and its copy / see-more buttons.
#[derive(Debug)]
pub struct PreviewPopup {
    phase: Phase,
    current: Option<PreviewRequest>,
    pending: Option<RequestId>,
    fragment: Option<String>,
    copy_pending: Option<RequestId>,
    copied: bool,
}

impl Default for PreviewPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewPopup {
    pub fn new() -> Self {
        Self {
            phase: Phase::Closed,
            current: None,
            pending: None,
            fragment: None,
            copy_pending: None,
            copied: false,
        }
    }

    /// Start showing the list behind `request`. Clicks on not-clickable
    /// zones are ignored. Returns whether the popup started opening.
    pub fn display(&mut self, ctx: &mut PageContext, request: PreviewRequest) -> bool {
        if request.target.has_class(NOT_CLICKABLE) {
            return false;
        }
        for kind in [WAKE_PREVIEW_GROW, WAKE_PREVIEW_REVEAL, WAKE_PREVIEW_CLEAR] {
            ctx.cancel(kind);
        }
        self.pending = None;
        self.fragment = None;
        self.copy_pending = None;
        self.copied = false;

        ctx.splice(CONTENT, PREVIEW_LOADER, Vec::new());
        let anchor = request.anchor;
        let (left, top) = (px(anchor.center.x), px(anchor.center.y));
        let (width, height) = (px(anchor.size.x), px(anchor.size.y));
        ctx.emit(Command::set_style(
            POPUP,
            &[
                ("transition", "0s"),
                ("opacity", "0"),
                ("left", left.as_str()),
                ("top", top.as_str()),
                ("width", width.as_str()),
                ("height", height.as_str()),
                ("transform", "translate(-50%, -50%)"),
                ("z-index", "-1"),
            ],
        ));
        ctx.emit(Command::set_style(request.source(), &[("transform", "scale(0.5)")]));
        let delay = ctx.config.popup_collapse_delay;
        ctx.schedule(delay, WAKE_PREVIEW_GROW);

        self.current = Some(request);
        self.phase = Phase::Collapsing;
        true
    }

    pub fn on_wake(&mut self, ctx: &mut PageContext, kind: WakeKind) -> bool {
        match kind {
            WAKE_PREVIEW_GROW => self.grow(ctx),
            WAKE_PREVIEW_REVEAL => self.reveal(ctx),
            WAKE_PREVIEW_CLEAR => ctx.clear_container(CONTENT),
            _ => return false,
        }
        true
    }

    fn grow(&mut self, ctx: &mut PageContext) {
        let Some(request) = self.current.as_ref() else {
            return;
        };
        let transition = format!("{}s", ctx.config.popup_transition);
        ctx.emit(Command::set_style(
            POPUP,
            &[
                ("transition", transition.as_str()),
                ("opacity", "1"),
                ("transform", "translate(-50%, -50%) scale(1)"),
                ("z-index", "1"),
            ],
        ));
        ctx.emit(Command::set_style(request.source(), &[("transform", "scale(1)")]));
        self.pending = Some(ctx.fetch(Request::get_html(request.url.clone())));
        self.phase = Phase::Loading;
    }

    fn reveal(&mut self, ctx: &mut PageContext) {
        let (Some(request), Some(fragment)) = (self.current.as_ref(), self.fragment.take()) else {
            return;
        };
        ctx.emit(Command::clear_style(POPUP));
        ctx.emit(Command::add_class(POPUP, "active"));
        ctx.emit(Command::set_text(TITLE, &request.title));
        ctx.splice(
            CONTENT,
            &fragment,
            vec![
                Binding::new(COPY_BUTTON, ACTION_COPY),
                Binding::new(SEE_MORE_BUTTON, ACTION_SEE_MORE),
                Binding::new("#close-list-pop-up-button", ACTION_CLOSE),
            ],
        );
        self.phase = Phase::Shown;
    }

    fn fail(&mut self, ctx: &mut PageContext, reason: &dyn std::fmt::Display) {
        log::warn!("preview failed: {}", reason);
        ctx.emit(Command::remove_class(POPUP, "active"));
        ctx.emit(Command::clear_style(POPUP));
        self.current = None;
        self.phase = Phase::Closed;
    }

    pub fn on_reply(&mut self, ctx: &mut PageContext, id: RequestId, reply: &Reply) -> bool {
        if self.copy_pending == Some(id) {
            self.copy_reply(ctx, reply);
            return true;
        }
        if self.pending != Some(id) {
            return false;
        }
        self.pending = None;
        match reply.html() {
            Ok(html) => {
                self.fragment = Some(html.to_string());
                let delay = ctx.config.popup_settle_delay;
                ctx.schedule(delay, WAKE_PREVIEW_REVEAL);
                self.phase = Phase::Settling;
            }
            Err(e) => self.fail(ctx, &e),
        }
        true
    }

    pub fn on_failure(&mut self, ctx: &mut PageContext, id: RequestId, reason: &str) -> bool {
        if self.copy_pending == Some(id) {
            self.copy_pending = None;
            ctx.pulse(COPY_BUTTON);
            return true;
        }
        if self.pending != Some(id) {
            return false;
        }
        self.pending = None;
        self.fail(ctx, &reason);
        true
    }

    /// Close button. The content is dropped once the fade is over.
    pub fn close(&mut self, ctx: &mut PageContext) {
        for kind in [WAKE_PREVIEW_GROW, WAKE_PREVIEW_REVEAL] {
            ctx.cancel(kind);
        }
        ctx.emit(Command::remove_class(POPUP, "active"));
        let delay = ctx.config.popup_transition;
        ctx.schedule(delay, WAKE_PREVIEW_CLEAR);
        self.current = None;
        self.pending = None;
        self.fragment = None;
        self.phase = Phase::Closed;
    }

    pub fn see_more(&self, ctx: &mut PageContext) {
        ctx.emit(Command::toggle_class(SEE_MORE_BUTTON, "active"));
        ctx.emit(Command::toggle_class(LIST_CONTAINER, "active"));
    }

    /// Copy the previewed list into the player's lists.
    pub fn copy(&mut self, ctx: &mut PageContext, list_id: &str) -> Option<RequestId> {
        if self.copied || self.copy_pending.is_some() {
            return None;
        }
        ctx.emit(Command::set_html(COPY_BUTTON, COPY_LOADER));
        let id = ctx.fetch(Request::get(Endpoints::copy(list_id)));
        self.copy_pending = Some(id);
        Some(id)
    }

    fn copy_reply(&mut self, ctx: &mut PageContext, reply: &Reply) {
        self.copy_pending = None;
        match reply.outcome() {
            Ok(Outcome::Success(_)) => {
                self.copied = true;
                ctx.emit(Command::set_html(COPY_BUTTON, COPIED_LABEL));
                ctx.emit(Command::set_style(
                    COPY_BUTTON,
                    &[("cursor", "default"), ("background-color", "#555")],
                ));
            }
            _ => ctx.pulse(COPY_BUTTON),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
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

    fn request() -> PreviewRequest {
        PreviewRequest {
            url: "/dashboard/profile/list/8".into(),
            title: "Animaux".into(),
            anchor: Anchor::from_rect(100.0, 50.0, 200.0, 80.0),
            target: ClickTarget::default(),
        }
    }

    fn advance(popup: &mut PreviewPopup, ctx: &mut PageContext, dt: f32) {
        for kind in ctx.timeline.advance(dt) {
            if !ctx.fire_deferred(kind) {
                popup.on_wake(ctx, kind);
            }
        }
    }

    fn fetch_id(ctx: &PageContext) -> RequestId {
        ctx.commands()
            .iter()
            .find_map(|c| match c {
                Command::Fetch { id, .. } => Some(*id),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn anchor_center_is_rect_middle() {
        let a = Anchor::from_rect(100.0, 50.0, 200.0, 80.0);
        assert_eq!(a.center, Vec2::new(200.0, 90.0));
    }

    #[test]
    fn not_clickable_zone_is_ignored() {
        let mut ctx = ctx();
        let mut popup = PreviewPopup::new();
        let mut req = request();
        req.target.class = "not-clickable-zone".into();
        assert!(!popup.display(&mut ctx, req));
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn collapse_then_grow_then_fetch() {
        let mut ctx = ctx();
        let mut popup = PreviewPopup::new();
        popup.display(&mut ctx, request());
        assert_eq!(popup.phase(), Phase::Collapsing);
        let collapsed = ctx
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::SetStyle { target, style } if target == POPUP => Some(style.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(collapsed["left"], "200px");
        assert_eq!(collapsed["top"], "90px");
        assert_eq!(collapsed["z-index"], "-1");
        assert_eq!(ctx.outstanding_requests(), 0);

        advance(&mut popup, &mut ctx, 0.05);
        assert_eq!(popup.phase(), Phase::Loading);
        assert_eq!(ctx.outstanding_requests(), 1);
    }

    #[test]
    fn reply_settles_then_reveals_with_bindings() {
        let mut ctx = ctx();
        let mut popup = PreviewPopup::new();
        popup.display(&mut ctx, request());
        advance(&mut popup, &mut ctx, 0.05);
        let id = fetch_id(&ctx);
        ctx.drain_commands();

        assert!(popup.on_reply(&mut ctx, id, &Reply::new(200, "<ul></ul>")));
        assert_eq!(popup.phase(), Phase::Settling);
        assert!(ctx.commands().is_empty());

        advance(&mut popup, &mut ctx, 0.25);
        assert_eq!(popup.phase(), Phase::Shown);
        assert!(ctx.commands().contains(&Command::add_class(POPUP, "active")));
        assert!(ctx.commands().contains(&Command::set_text(TITLE, "Animaux")));
        assert_eq!(ctx.bindings.bindings(CONTENT).len(), 3);
    }

    #[test]
    fn reopening_keeps_one_set_of_bindings() {
        let mut ctx = ctx();
        let mut popup = PreviewPopup::new();
        for _ in 0..2 {
            popup.display(&mut ctx, request());
            advance(&mut popup, &mut ctx, 0.05);
            let id = ctx
                .commands()
                .iter()
                .rev()
                .find_map(|c| match c {
                    Command::Fetch { id, .. } => Some(*id),
                    _ => None,
                })
                .unwrap();
            popup.on_reply(&mut ctx, id, &Reply::new(200, "<ul></ul>"));
            advance(&mut popup, &mut ctx, 0.25);
        }
        assert_eq!(ctx.bindings.len(), 3);
    }

    #[test]
    fn failed_fetch_deactivates() {
        let mut ctx = ctx();
        let mut popup = PreviewPopup::new();
        popup.display(&mut ctx, request());
        advance(&mut popup, &mut ctx, 0.05);
        let id = fetch_id(&ctx);
        ctx.drain_commands();
        assert!(popup.on_failure(&mut ctx, id, "offline"));
        assert_eq!(ctx.commands()[0], Command::remove_class(POPUP, "active"));
        assert_eq!(popup.phase(), Phase::Closed);
    }

    #[test]
    fn close_clears_content_after_fade() {
        let mut ctx = ctx();
        let mut popup = PreviewPopup::new();
        popup.close(&mut ctx);
        assert_eq!(ctx.drain_commands(), vec![Command::remove_class(POPUP, "active")]);
        advance(&mut popup, &mut ctx, 0.5);
        assert_eq!(ctx.drain_commands(), vec![Command::set_html(CONTENT, "")]);
    }

    #[test]
    fn reopen_cancels_pending_clear() {
        let mut ctx = ctx();
        let mut popup = PreviewPopup::new();
        popup.close(&mut ctx);
        popup.display(&mut ctx, request());
        assert!(!ctx.timeline.is_scheduled(WAKE_PREVIEW_CLEAR));
    }

    #[test]
    fn copy_succeeds_once() {
        let mut ctx = ctx();
        let mut popup = PreviewPopup::new();
        let id = popup.copy(&mut ctx, "8").unwrap();
        assert!(popup.copy(&mut ctx, "8").is_none());
        assert!(popup.on_reply(&mut ctx, id, &Reply::new(200, r#"{"code":200}"#)));
        assert!(ctx.commands().contains(&Command::set_html(COPY_BUTTON, COPIED_LABEL)));
        assert!(popup.copy(&mut ctx, "8").is_none());
    }

    #[test]
    fn refused_copy_pulses() {
        let mut ctx = ctx();
        let mut popup = PreviewPopup::new();
        let id = popup.copy(&mut ctx, "8").unwrap();
        popup.on_reply(&mut ctx, id, &Reply::new(200, r#"{"code":403}"#));
        assert!(ctx.commands().contains(&Command::add_class(COPY_BUTTON, "pulse")));
        assert!(popup.copy(&mut ctx, "8").is_some());
    }
}
