use quest_engine::*;
use quest_engine::net::lenient;
use quest_engine::popup::close_alert;
use serde::Deserialize;

/// Dashboard clicks. Field names follow the clicked element's dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DashboardAction {
    OpenTrail {
        #[serde(deserialize_with = "lenient::string")]
        list_id: String,
        #[serde(default)]
        target: ClickTarget,
    },
    CloseTrail,
    CloseLevelPopup {
        #[serde(default)]
        target: ClickTarget,
    },
    OpenLevelInfo {
        game_infos: String,
        #[serde(default)]
        target: ClickTarget,
    },
    LaunchGame {
        url: String,
    },
    /// List card click; the host adds the card's bounding box.
    DisplayPreview {
        href: String,
        #[serde(default)]
        title: String,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        #[serde(default)]
        target: ClickTarget,
    },
    ClosePreview,
    SeeMore,
    CopyList {
        #[serde(deserialize_with = "lenient::string")]
        id: String,
    },
    Like {
        #[serde(deserialize_with = "lenient::string")]
        id: String,
        #[serde(default)]
        active: bool,
    },
    PurchaseLife,
    CloseAlert,
    ManageList {
        #[serde(deserialize_with = "lenient::string")]
        list_id: String,
    },
    CloseManageList,
    /// Settings form submit; `id` is the form's `data-id`.
    UpdateList {
        #[serde(deserialize_with = "lenient::string")]
        id: String,
        fields: ManageListForm,
    },
    ShareList {
        #[serde(deserialize_with = "lenient::string")]
        list_id: String,
    },
    CopyLink,
    ClipboardFailed,
    CloseShareList,
}

/// Lists, trails, level cards, previews, list settings, sharing, hearts and
/// the lives counter.
#[derive(Default)]
pub struct DashboardPage {
    trail: TrailPopup,
    level: LevelPopup,
    preview: PreviewPopup,
    manage: ManageListPopup,
    share: SharePopup,
    likes: LikeButtons,
    lives: Option<LivesClock>,
}

impl DashboardPage {
    fn handle_action(&mut self, ctx: &mut PageContext, action: &DashboardAction) {
        match action {
            DashboardAction::OpenTrail { list_id, target } => {
                self.trail.open(ctx, list_id, target);
            }
            DashboardAction::CloseTrail => self.trail.close(ctx),
            DashboardAction::CloseLevelPopup { target } => {
                self.level.close(ctx, target);
            }
            DashboardAction::OpenLevelInfo { game_infos, target } => {
                if let Ok(state) = self.level.open(ctx, game_infos, target) {
                    log::debug!("level card: {:?}", state);
                }
            }
            DashboardAction::LaunchGame { url } => {
                // Without a counter on the page the server has the last word.
                let lives = self.lives.as_ref().map_or(1, LivesClock::lives);
                self.level.launch(ctx, url, lives);
            }
            DashboardAction::DisplayPreview { href, title, left, top, width, height, target } => {
                self.preview.display(
                    ctx,
                    PreviewRequest {
                        url: href.clone(),
                        title: title.clone(),
                        anchor: Anchor::from_rect(*left, *top, *width, *height),
                        target: target.clone(),
                    },
                );
            }
            DashboardAction::ClosePreview => self.preview.close(ctx),
            DashboardAction::SeeMore => self.preview.see_more(ctx),
            DashboardAction::CopyList { id } => {
                self.preview.copy(ctx, id);
            }
            DashboardAction::Like { id, active } => {
                self.likes.toggle(ctx, id, *active);
            }
            DashboardAction::PurchaseLife => match self.lives.as_mut() {
                Some(lives) => {
                    lives.purchase(ctx);
                }
                None => log::warn!("life purchase without a lives counter"),
            },
            DashboardAction::CloseAlert => close_alert(ctx),
            DashboardAction::ManageList { list_id } => {
                self.manage.open(ctx, list_id);
            }
            DashboardAction::CloseManageList => self.manage.close(ctx),
            DashboardAction::UpdateList { id, fields } => {
                if let Err(e) = self.manage.update(ctx, id, fields) {
                    log::warn!("list {} not saved: {}", id, e);
                }
            }
            DashboardAction::ShareList { list_id } => {
                self.share.open(ctx, list_id);
            }
            DashboardAction::CopyLink => {
                self.share.copy_link(ctx);
            }
            DashboardAction::ClipboardFailed => self.share.clipboard_failed(ctx),
            DashboardAction::CloseShareList => self.share.close(ctx),
        }
    }

    fn on_reply(&mut self, ctx: &mut PageContext, id: RequestId, reply: &Reply) -> bool {
        self.trail.on_reply(ctx, id, reply)
            || self.preview.on_reply(ctx, id, reply)
            || self.manage.on_reply(ctx, id, reply)
            || self.share.on_reply(ctx, id, reply)
            || self.likes.on_reply(ctx, id, reply)
            || self.lives.as_mut().is_some_and(|l| l.on_reply(ctx, id, reply))
    }

    fn on_failure(&mut self, ctx: &mut PageContext, id: RequestId, reason: &str) -> bool {
        self.trail.on_failure(ctx, id, reason)
            || self.preview.on_failure(ctx, id, reason)
            || self.manage.on_failure(ctx, id, reason)
            || self.share.on_failure(ctx, id, reason)
            || self.likes.on_failure(ctx, id, reason)
            || self.lives.as_mut().is_some_and(|l| l.on_failure(ctx, id, reason))
    }

    fn on_wake(&mut self, ctx: &mut PageContext, kind: WakeKind) -> bool {
        self.trail.on_wake(ctx, kind)
            || self.preview.on_wake(ctx, kind)
            || self.manage.on_wake(ctx, kind)
            || self.share.on_wake(ctx, kind)
            || self.lives.as_mut().is_some_and(|l| l.on_wake(ctx, kind))
    }

    pub fn trail(&self) -> &TrailPopup {
        &self.trail
    }

    pub fn level(&self) -> &LevelPopup {
        &self.level
    }

    pub fn preview(&self) -> &PreviewPopup {
        &self.preview
    }

    pub fn manage(&self) -> &ManageListPopup {
        &self.manage
    }

    pub fn share(&self) -> &SharePopup {
        &self.share
    }

    pub fn likes(&self) -> &LikeButtons {
        &self.likes
    }

    pub fn lives(&self) -> Option<&LivesClock> {
        self.lives.as_ref()
    }
}

impl Page for DashboardPage {
    type Action = DashboardAction;

    fn init(&mut self, ctx: &mut PageContext) {
        if let Some(manifest) = ctx.manifest.lives.clone() {
            self.lives = Some(LivesClock::start(ctx, &manifest));
        }
    }

    fn update(&mut self, ctx: &mut PageContext, input: &InputQueue<DashboardAction>) {
        for event in input.iter() {
            match event {
                PageEvent::Action(action) => self.handle_action(ctx, action),
                PageEvent::Reply { id, reply } => {
                    if !self.on_reply(ctx, *id, reply) {
                        log::warn!("nobody was waiting on {:?}", id);
                    }
                }
                PageEvent::RequestFailed { id, reason } => {
                    if !self.on_failure(ctx, *id, reason) {
                        log::warn!("nobody was waiting on {:?}: {}", id, reason);
                    }
                }
                PageEvent::Wake(kind) => {
                    if !self.on_wake(ctx, *kind) {
                        log::debug!("unhandled wake {:?}", kind);
                    }
                }
            }
        }
    }
}
