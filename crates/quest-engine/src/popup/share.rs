use std::collections::HashSet;
use crate::api::page::PageContext;
use crate::api::types::{RequestId, WakeKind};
use crate::bridge::protocol::Command;
use crate::net::envelope::{Reply, CODE_OK};
use crate::net::request::{Endpoints, Request};

pub const POPUP: &str = ".copy-list";
pub const LINK: &str = "#link";
pub const COPY_LINK_BUTTON: &str = "#copy-link-button";

pub const COPY_LABEL: &str = "Copier";
pub const COPIED_LABEL: &str = "Copié !";
pub const ERROR_LABEL: &str = "Erreur";

/// Puts the copy label back and closes after a copy.
pub const WAKE_SHARE_DONE: WakeKind = WakeKind(0x160);

/// Share popup: fetches a list's public link and copies it.
#[derive(Debug, Default)]
pub struct SharePopup {
    loading: Option<RequestId>,
    superseded: HashSet<RequestId>,
    link: Option<String>,
    copying: bool,
}

impl SharePopup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, ctx: &mut PageContext, list_id: &str) -> RequestId {
        if let Some(previous) = self.loading.take() {
            self.superseded.insert(previous);
        }
        self.link = None;
        ctx.emit(Command::add_class(POPUP, "active"));
        ctx.emit(Command::loader(LINK));
        let id = ctx.fetch(Request::get(Endpoints::share_link(list_id)));
        self.loading = Some(id);
        id
    }

    pub fn owns(&self, id: RequestId) -> bool {
        self.loading == Some(id) || self.superseded.contains(&id)
    }

    pub fn on_reply(&mut self, ctx: &mut PageContext, id: RequestId, reply: &Reply) -> bool {
        if self.superseded.remove(&id) {
            return true;
        }
        if self.loading.take_if(|l| *l == id).is_none() {
            return false;
        }
        let path = reply
            .envelope()
            .ok()
            .filter(|env| env.code == CODE_OK)
            .and_then(|env| env.extra_str("link").map(str::to_string));
        match path {
            Some(path) => {
                let link = format!("{}{}", ctx.manifest.origin, path);
                ctx.emit(Command::set_data(LINK, "link", &link));
                ctx.emit(Command::set_text(LINK, &link));
                self.link = Some(link);
            }
            None => {
                log::warn!("no share link in reply {:?}", id);
                ctx.emit(Command::set_text(LINK, ERROR_LABEL));
            }
        }
        true
    }

    pub fn on_failure(&mut self, ctx: &mut PageContext, id: RequestId, reason: &str) -> bool {
        if self.superseded.remove(&id) {
            return true;
        }
        if self.loading.take_if(|l| *l == id).is_none() {
            return false;
        }
        log::warn!("share link failed: {}", reason);
        ctx.emit(Command::set_text(LINK, ERROR_LABEL));
        true
    }

    /// Copy the link. Does nothing until a link is shown.
    pub fn copy_link(&mut self, ctx: &mut PageContext) -> bool {
        let Some(link) = self.link.as_deref().filter(|l| !l.is_empty()) else {
            return false;
        };
        if self.copying {
            return false;
        }
        ctx.emit(Command::Clipboard { text: link.to_string() });
        ctx.emit(Command::set_html(COPY_LINK_BUTTON, COPIED_LABEL));
        let delay = ctx.config.notice_duration;
        ctx.schedule(delay, WAKE_SHARE_DONE);
        self.copying = true;
        true
    }

    /// The host could not write to the clipboard.
    pub fn clipboard_failed(&mut self, ctx: &mut PageContext) {
        if self.copying {
            ctx.emit(Command::set_html(COPY_LINK_BUTTON, ERROR_LABEL));
        }
    }

    pub fn on_wake(&mut self, ctx: &mut PageContext, kind: WakeKind) -> bool {
        if kind != WAKE_SHARE_DONE {
            return false;
        }
        self.close(ctx);
        true
    }

    pub fn close(&mut self, ctx: &mut PageContext) {
        if let Some(id) = self.loading.take() {
            self.superseded.insert(id);
        }
        if self.copying {
            self.copying = false;
            ctx.cancel(WAKE_SHARE_DONE);
            ctx.emit(Command::set_html(COPY_LINK_BUTTON, COPY_LABEL));
        }
        self.link = None;
        ctx.emit(Command::remove_class(POPUP, "active"));
        ctx.emit(Command::set_data(LINK, "link", ""));
        ctx.emit(Command::set_text(LINK, ""));
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::manifest::PageManifest;
    use crate::api::page::PageConfig;

    fn ctx() -> PageContext {
        let manifest = PageManifest {
            origin: "https://wordquest.fr".into(),
            ..PageManifest::default()
        };
        PageContext::new(manifest, PageConfig::default(), 1)
    }

    fn shown(popup: &mut SharePopup, ctx: &mut PageContext) {
        let id = popup.open(ctx, "8");
        popup.on_reply(ctx, id, &Reply::new(200, r#"{"code":200,"link":"/list/share/k3y"}"#));
        ctx.drain_commands();
    }

    #[test]
    fn link_is_shown_with_the_origin() {
        let mut ctx = ctx();
        let mut popup = SharePopup::new();
        let id = popup.open(&mut ctx, "8");
        assert!(ctx.commands().contains(&Command::loader(LINK)));
        ctx.drain_commands();

        assert!(popup.on_reply(&mut ctx, id, &Reply::new(200, r#"{"code":200,"link":"/list/share/k3y"}"#)));
        assert_eq!(
            ctx.drain_commands(),
            vec![
                Command::set_data(LINK, "link", "https://wordquest.fr/list/share/k3y"),
                Command::set_text(LINK, "https://wordquest.fr/list/share/k3y"),
            ]
        );
        assert_eq!(popup.link(), Some("https://wordquest.fr/list/share/k3y"));
    }

    #[test]
    fn refusal_and_failure_show_the_error_label() {
        let mut ctx = ctx();
        let mut popup = SharePopup::new();
        let id = popup.open(&mut ctx, "8");
        ctx.drain_commands();
        popup.on_reply(&mut ctx, id, &Reply::new(200, r#"{"code":403}"#));
        assert_eq!(ctx.drain_commands(), vec![Command::set_text(LINK, ERROR_LABEL)]);

        let id = popup.open(&mut ctx, "8");
        ctx.drain_commands();
        assert!(popup.on_failure(&mut ctx, id, "offline"));
        assert_eq!(ctx.drain_commands(), vec![Command::set_text(LINK, ERROR_LABEL)]);
        assert_eq!(popup.link(), None);
    }

    #[test]
    fn copy_needs_a_link() {
        let mut ctx = ctx();
        let mut popup = SharePopup::new();
        popup.open(&mut ctx, "8");
        ctx.drain_commands();
        assert!(!popup.copy_link(&mut ctx));
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn copy_then_close_after_the_notice() {
        let mut ctx = ctx();
        let mut popup = SharePopup::new();
        shown(&mut popup, &mut ctx);

        assert!(popup.copy_link(&mut ctx));
        assert!(!popup.copy_link(&mut ctx));
        assert_eq!(
            ctx.drain_commands(),
            vec![
                Command::Clipboard { text: "https://wordquest.fr/list/share/k3y".into() },
                Command::set_html(COPY_LINK_BUTTON, COPIED_LABEL),
            ]
        );

        for kind in ctx.timeline.advance(2.05) {
            assert!(popup.on_wake(&mut ctx, kind));
        }
        let cmds = ctx.drain_commands();
        assert_eq!(cmds[0], Command::set_html(COPY_LINK_BUTTON, COPY_LABEL));
        assert!(cmds.contains(&Command::remove_class(POPUP, "active")));
        assert!(cmds.contains(&Command::set_data(LINK, "link", "")));
        assert_eq!(popup.link(), None);
    }

    #[test]
    fn clipboard_failure_shows_the_error_label() {
        let mut ctx = ctx();
        let mut popup = SharePopup::new();
        shown(&mut popup, &mut ctx);
        popup.copy_link(&mut ctx);
        ctx.drain_commands();
        popup.clipboard_failed(&mut ctx);
        assert_eq!(ctx.drain_commands(), vec![Command::set_html(COPY_LINK_BUTTON, ERROR_LABEL)]);
    }

    #[test]
    fn closing_before_the_reply_drops_it() {
        let mut ctx = ctx();
        let mut popup = SharePopup::new();
        let id = popup.open(&mut ctx, "8");
        popup.close(&mut ctx);
        ctx.drain_commands();
        assert!(popup.on_reply(&mut ctx, id, &Reply::new(200, r#"{"code":200,"link":"/x"}"#)));
        assert!(ctx.commands().is_empty());
        assert_eq!(popup.link(), None);
    }
}
