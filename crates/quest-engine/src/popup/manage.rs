use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use crate::api::page::PageContext;
use crate::api::types::{RequestId, WakeKind};
use crate::bridge::protocol::{Binding, Command, LOADER_HTML};
use crate::error::Result;
use crate::net::envelope::{Outcome, Reply};
use crate::net::lenient;
use crate::net::request::{Endpoints, Request};
use super::alert::{GENERIC_ERROR_TEXT, GENERIC_ERROR_TITLE};

pub const POPUP: &str = ".manage-list";
pub const CONTENT: &str = "#manage-list-content";
pub const FORM: &str = ".manage-list-form";
pub const SUBMIT_BUTTON: &str = ".manage-list-form [name='button']";
pub const MESSAGE: &str = "#alert-message-container";

pub const ACTION_UPDATE: &str = "update_list";

pub const IDLE_LABEL: &str = "Modifier";
pub const SAVED_LABEL: &str = "Modifié";
pub const SAVED_MESSAGE: &str = "<div class=\"success-mess\">Modifications sauvegardées avec succès</div>";

/// Shows the loaded settings form, or gives up, after the settle delay.
pub const WAKE_MANAGE_SETTLED: WakeKind = WakeKind(0x150);
/// Restores the submit label and closes after a save.
pub const WAKE_MANAGE_SAVED: WakeKind = WakeKind(0x151);

/// The settings form's fields, as the host reads them on submit.
///
/// Text inputs arrive under their input names (`listname`, `listdesc`) and go
/// back out under the names the update endpoint expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManageListForm {
    #[serde(alias = "listname", default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(alias = "listdesc", default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub xp: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub game: String,
    #[serde(default)]
    pub reminder: bool,
    #[serde(default)]
    pub stats: bool,
    #[serde(default)]
    pub public: bool,
}

#[derive(Debug)]
struct Settling {
    list_id: String,
    /// The fragment, or `None` when the server refused.
    html: Option<String>,
}

#[derive(Debug)]
struct Saving {
    id: RequestId,
    list_id: String,
    name: String,
}

/// Settings popup of one of the player's own lists.
#[derive(Debug, Default)]
pub struct ManageListPopup {
    loading: Option<(RequestId, String)>,
    settling: Option<Settling>,
    shown: Option<String>,
    saving: Option<Saving>,
    superseded: HashSet<RequestId>,
}

impl ManageListPopup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, ctx: &mut PageContext, list_id: &str) -> RequestId {
        if let Some((previous, _)) = self.loading.take() {
            self.superseded.insert(previous);
        }
        self.settling = None;
        self.shown = None;
        ctx.cancel(WAKE_MANAGE_SETTLED);

        ctx.emit(Command::add_class(POPUP, "active"));
        ctx.splice(CONTENT, LOADER_HTML, Vec::new());
        let id = ctx.fetch(Request::get_html(Endpoints::manage(list_id)));
        self.loading = Some((id, list_id.to_string()));
        id
    }

    pub fn owns(&self, id: RequestId) -> bool {
        self.loading.as_ref().is_some_and(|(l, _)| *l == id)
            || self.saving.as_ref().is_some_and(|s| s.id == id)
            || self.superseded.contains(&id)
    }

    pub fn on_reply(&mut self, ctx: &mut PageContext, id: RequestId, reply: &Reply) -> bool {
        if self.superseded.remove(&id) {
            log::debug!("dropping stale list settings reply {:?}", id);
            return true;
        }
        if let Some(saving) = self.saving.take_if(|s| s.id == id) {
            self.saved(ctx, saving, reply);
            return true;
        }
        let Some((_, list_id)) = self.loading.take_if(|(l, _)| *l == id) else {
            return false;
        };
        let html = match reply.html() {
            Ok(html) => Some(html.to_string()),
            Err(e) => {
                log::warn!("settings of list {} failed: {}", list_id, e);
                None
            }
        };
        self.settling = Some(Settling { list_id, html });
        let delay = ctx.config.manage_settle_delay;
        ctx.schedule(delay, WAKE_MANAGE_SETTLED);
        true
    }

    pub fn on_failure(&mut self, ctx: &mut PageContext, id: RequestId, reason: &str) -> bool {
        if self.superseded.remove(&id) {
            return true;
        }
        if self.saving.take_if(|s| s.id == id).is_some() {
            log::warn!("list update failed: {}", reason);
            self.refused(ctx, GENERIC_ERROR_TEXT);
            return true;
        }
        match self.loading.take_if(|(l, _)| *l == id) {
            Some((_, list_id)) => {
                log::warn!("settings of list {} failed: {}", list_id, reason);
                self.close(ctx);
                ctx.alert(GENERIC_ERROR_TITLE, GENERIC_ERROR_TEXT);
                true
            }
            None => false,
        }
    }

    pub fn on_wake(&mut self, ctx: &mut PageContext, kind: WakeKind) -> bool {
        match kind {
            WAKE_MANAGE_SETTLED => {
                match self.settling.take() {
                    Some(Settling { list_id, html: Some(html) }) => {
                        ctx.splice(CONTENT, &html, vec![Binding::submit(FORM, ACTION_UPDATE)]);
                        self.shown = Some(list_id);
                    }
                    Some(Settling { html: None, .. }) => {
                        self.close(ctx);
                        ctx.alert(GENERIC_ERROR_TITLE, GENERIC_ERROR_TEXT);
                    }
                    None => {}
                }
                true
            }
            WAKE_MANAGE_SAVED => {
                ctx.emit(Command::set_html(SUBMIT_BUTTON, IDLE_LABEL));
                self.close(ctx);
                true
            }
            _ => false,
        }
    }

    /// Submit the settings form. `None` while a save is already in flight.
    pub fn update(&mut self, ctx: &mut PageContext, list_id: &str, form: &ManageListForm) -> Result<Option<RequestId>> {
        if self.saving.is_some() {
            log::debug!("list {} already saving", list_id);
            return Ok(None);
        }
        let body = serde_json::to_value(form)?;
        let request = Request::json_post(Endpoints::manage_update(list_id), ctx.csrf_token(), Some(&body));
        ctx.emit(Command::loader(SUBMIT_BUTTON));
        let id = ctx.fetch(request);
        self.saving = Some(Saving {
            id,
            list_id: list_id.to_string(),
            name: form.name.clone(),
        });
        Ok(Some(id))
    }

    fn saved(&mut self, ctx: &mut PageContext, saving: Saving, reply: &Reply) {
        match reply.outcome() {
            Ok(Outcome::Success(_)) => {
                ctx.emit(Command::set_html(SUBMIT_BUTTON, SAVED_LABEL));
                ctx.emit(Command::set_html(MESSAGE, SAVED_MESSAGE));
                ctx.emit(Command::set_text(
                    format!(".list-box[data-list_id='{}'] .title", saving.list_id),
                    &saving.name,
                ));
                if self.shown.as_deref() == Some(saving.list_id.as_str()) {
                    let delay = ctx.config.manage_close_delay;
                    ctx.schedule(delay, WAKE_MANAGE_SAVED);
                }
            }
            Ok(Outcome::Rejected { message, .. }) => {
                self.refused(ctx, message.as_deref().unwrap_or(GENERIC_ERROR_TEXT));
            }
            Ok(Outcome::SessionEnded(_)) | Err(_) => self.refused(ctx, GENERIC_ERROR_TEXT),
        }
    }

    fn refused(&mut self, ctx: &mut PageContext, message: &str) {
        ctx.emit(Command::set_html(SUBMIT_BUTTON, IDLE_LABEL));
        ctx.pulse(SUBMIT_BUTTON);
        ctx.emit(Command::set_html(
            MESSAGE,
            format!("<div class=\"alert-mess\">{message}</div>"),
        ));
    }

    pub fn close(&mut self, ctx: &mut PageContext) {
        if let Some((id, _)) = self.loading.take() {
            self.superseded.insert(id);
        }
        self.settling = None;
        self.shown = None;
        ctx.cancel(WAKE_MANAGE_SETTLED);
        ctx.cancel(WAKE_MANAGE_SAVED);
        ctx.clear_container(CONTENT);
        ctx.emit(Command::remove_class(POPUP, "active"));
    }

    /// List whose settings form is on screen.
    pub fn shown(&self) -> Option<&str> {
        self.shown.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::manifest::PageManifest;
    use crate::api::page::PageConfig;
    use crate::bridge::protocol::BindEvent;
    use crate::net::request::{Method, CSRF_HEADER};

    fn ctx() -> PageContext {
        let manifest = PageManifest {
            csrf_token: "tok".into(),
            ..PageManifest::default()
        };
        PageContext::new(manifest, PageConfig::default(), 1)
    }

    fn advance(popup: &mut ManageListPopup, ctx: &mut PageContext, dt: f32) {
        for kind in ctx.timeline.advance(dt) {
            if !ctx.fire_deferred(kind) {
                popup.on_wake(ctx, kind);
            }
        }
    }

    fn form() -> ManageListForm {
        serde_json::from_str(
            r#"{"listname":"Fruits","listdesc":"d'été","time":"60","xp":20,"game":"quiz",
                "reminder":true,"stats":false,"public":true}"#,
        )
        .unwrap()
    }

    fn opened(popup: &mut ManageListPopup, ctx: &mut PageContext) {
        let id = popup.open(ctx, "5");
        popup.on_reply(ctx, id, &Reply::new(200, "<form class='manage-list-form'></form>"));
        advance(popup, ctx, 0.35);
        ctx.drain_commands();
    }

    #[test]
    fn form_waits_for_the_settle_delay() {
        let mut ctx = ctx();
        let mut popup = ManageListPopup::new();
        let id = popup.open(&mut ctx, "5");
        assert!(ctx.commands().contains(&Command::add_class(POPUP, "active")));
        ctx.drain_commands();

        assert!(popup.on_reply(&mut ctx, id, &Reply::new(200, "<form class='manage-list-form'></form>")));
        assert!(ctx.commands().is_empty());
        advance(&mut popup, &mut ctx, 0.25);
        assert_eq!(popup.shown(), None);
        advance(&mut popup, &mut ctx, 0.1);

        let cmds = ctx.drain_commands();
        assert!(matches!(&cmds[0], Command::Splice { container, bindings, .. }
            if container == CONTENT && bindings[0].event == BindEvent::Submit));
        assert_eq!(popup.shown(), Some("5"));
    }

    #[test]
    fn refused_fragment_closes_and_alerts() {
        let mut ctx = ctx();
        let mut popup = ManageListPopup::new();
        let id = popup.open(&mut ctx, "5");
        ctx.drain_commands();
        popup.on_reply(&mut ctx, id, &Reply::new(403, "no"));
        advance(&mut popup, &mut ctx, 0.35);
        let cmds = ctx.drain_commands();
        assert!(cmds.contains(&Command::remove_class(POPUP, "active")));
        assert!(cmds.contains(&Command::alert("Erreur", GENERIC_ERROR_TEXT)));
        assert_eq!(popup.shown(), None);
    }

    #[test]
    fn transport_failure_closes_at_once() {
        let mut ctx = ctx();
        let mut popup = ManageListPopup::new();
        let id = popup.open(&mut ctx, "5");
        ctx.drain_commands();
        assert!(popup.on_failure(&mut ctx, id, "offline"));
        assert!(ctx.commands().contains(&Command::alert("Erreur", GENERIC_ERROR_TEXT)));
    }

    #[test]
    fn reply_for_a_replaced_open_is_dropped() {
        let mut ctx = ctx();
        let mut popup = ManageListPopup::new();
        let first = popup.open(&mut ctx, "1");
        let second = popup.open(&mut ctx, "2");
        assert!(popup.on_reply(&mut ctx, first, &Reply::new(200, "<p>one</p>")));
        assert!(popup.on_reply(&mut ctx, second, &Reply::new(200, "<p>two</p>")));
        advance(&mut popup, &mut ctx, 0.35);
        assert_eq!(popup.shown(), Some("2"));
    }

    #[test]
    fn update_posts_the_renamed_fields() {
        let mut ctx = ctx();
        let mut popup = ManageListPopup::new();
        opened(&mut popup, &mut ctx);
        popup.update(&mut ctx, "5", &form()).unwrap().unwrap();

        let request = ctx
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::Fetch { request, .. } => Some(request),
                _ => None,
            })
            .unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "/dashboard/manage/update/5");
        assert_eq!(request.header(CSRF_HEADER), Some("tok"));
        let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Fruits");
        assert_eq!(body["description"], "d'été");
        assert_eq!(body["xp"], "20");
        assert_eq!(body["public"], true);
        assert!(body.get("listname").is_none());
    }

    #[test]
    fn second_submit_while_saving_is_ignored() {
        let mut ctx = ctx();
        let mut popup = ManageListPopup::new();
        opened(&mut popup, &mut ctx);
        assert!(popup.update(&mut ctx, "5", &form()).unwrap().is_some());
        assert_eq!(popup.update(&mut ctx, "5", &form()).unwrap(), None);
        assert_eq!(ctx.outstanding_requests(), 1);
    }

    #[test]
    fn saved_renames_the_box_then_closes() {
        let mut ctx = ctx();
        let mut popup = ManageListPopup::new();
        opened(&mut popup, &mut ctx);
        let id = popup.update(&mut ctx, "5", &form()).unwrap().unwrap();
        ctx.drain_commands();

        assert!(popup.on_reply(&mut ctx, id, &Reply::new(200, r#"{"code":200}"#)));
        let cmds = ctx.drain_commands();
        assert_eq!(cmds[0], Command::set_html(SUBMIT_BUTTON, SAVED_LABEL));
        assert_eq!(cmds[1], Command::set_html(MESSAGE, SAVED_MESSAGE));
        assert_eq!(cmds[2], Command::set_text(".list-box[data-list_id='5'] .title", "Fruits"));

        advance(&mut popup, &mut ctx, 1.05);
        let cmds = ctx.drain_commands();
        assert_eq!(cmds[0], Command::set_html(SUBMIT_BUTTON, IDLE_LABEL));
        assert!(cmds.contains(&Command::remove_class(POPUP, "active")));
        assert_eq!(popup.shown(), None);
        assert!(ctx.bindings.bindings(CONTENT).is_empty());
    }

    #[test]
    fn refusal_shows_the_server_message_and_pulses() {
        let mut ctx = ctx();
        let mut popup = ManageListPopup::new();
        opened(&mut popup, &mut ctx);
        let id = popup.update(&mut ctx, "5", &form()).unwrap().unwrap();
        ctx.drain_commands();

        popup.on_reply(&mut ctx, id, &Reply::new(200, r#"{"code":400,"message":"Nom déjà pris"}"#));
        let cmds = ctx.drain_commands();
        assert!(cmds.contains(&Command::add_class(SUBMIT_BUTTON, "pulse")));
        assert!(cmds.contains(&Command::set_html(MESSAGE, "<div class=\"alert-mess\">Nom déjà pris</div>")));
        assert_eq!(popup.shown(), Some("5"));
        assert!(!popup.is_saving());
    }

    #[test]
    fn failed_update_shows_the_generic_message() {
        let mut ctx = ctx();
        let mut popup = ManageListPopup::new();
        opened(&mut popup, &mut ctx);
        let id = popup.update(&mut ctx, "5", &form()).unwrap().unwrap();
        ctx.drain_commands();

        assert!(popup.on_failure(&mut ctx, id, "offline"));
        assert!(ctx.commands().contains(&Command::set_html(
            MESSAGE,
            format!("<div class=\"alert-mess\">{GENERIC_ERROR_TEXT}</div>")
        )));
    }

    #[test]
    fn save_landing_after_close_only_renames() {
        let mut ctx = ctx();
        let mut popup = ManageListPopup::new();
        opened(&mut popup, &mut ctx);
        let id = popup.update(&mut ctx, "5", &form()).unwrap().unwrap();
        popup.close(&mut ctx);
        ctx.drain_commands();

        assert!(popup.on_reply(&mut ctx, id, &Reply::new(200, r#"{"code":200}"#)));
        assert!(ctx.commands().contains(&Command::set_text(".list-box[data-list_id='5'] .title", "Fruits")));
        assert!(!ctx.timeline.is_scheduled(WAKE_MANAGE_SAVED));
    }

    #[test]
    fn closing_while_loading_drops_the_reply() {
        let mut ctx = ctx();
        let mut popup = ManageListPopup::new();
        let id = popup.open(&mut ctx, "5");
        popup.close(&mut ctx);
        ctx.drain_commands();
        assert!(popup.on_reply(&mut ctx, id, &Reply::new(200, "<p/>")));
        advance(&mut popup, &mut ctx, 1.0);
        assert!(ctx.commands().is_empty());
        assert_eq!(popup.shown(), None);
    }
}
