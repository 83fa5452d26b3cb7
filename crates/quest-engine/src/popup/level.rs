use serde::Deserialize;
use serde_json::Value;
use crate::api::page::PageContext;
use crate::bridge::protocol::{Binding, ClickTarget, Command};
use crate::error::{Error, Result};
use crate::net::lenient;
use super::alert::{GENERIC_ERROR_TEXT, GENERIC_ERROR_TITLE};

pub const CONTAINER: &str = ".level-infos-pop-up-container";
pub const TITLE: &str = ".level-infos-pop-up-container .title";
pub const TEXT: &str = ".level-infos-pop-up-container .text";
pub const SUBMIT: &str = ".level-infos-pop-up-container .submit-button";
pub const SUBMIT_LINK: &str = ".level-infos-pop-up-container .submit-button a";
pub const LEVEL: &str = ".level";
pub const OVERLAY: &str = ".overlay-load-game";
pub const ENTRY_CLASS: &str = "level-info-entry";

pub const ACTION_LAUNCH: &str = "launch_game";

pub const LOCKED_TITLE: &str = "Niveau bloqué";
pub const LOCKED_TEXT: &str = "Terminez le niveau précédent pour débloquer ce niveau";
pub const NO_LIVES_LABEL: &str = "Vous n'avez plus de vies";

/// One level of a trail, from the level box's `data-game_infos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameInfo {
    #[serde(default, deserialize_with = "lenient::u32")]
    pub ord: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_desc: String,
    /// Game entry URL, without the list id.
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub list_id: String,
    #[serde(default, deserialize_with = "lenient::u32")]
    pub completed: u32,
    #[serde(default)]
    pub status: String,
}

impl GameInfo {
    /// Parse the attribute. The server renders it with single quotes; it may
    /// hold one object or a list whose first entry is the level.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.replace('\'', "\"");
        let value: Value = serde_json::from_str(&normalized)
            .map_err(|e| Error::MalformedGameInfo(e.to_string()))?;
        let level = match value {
            Value::Array(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| Error::MalformedGameInfo("empty level list".to_string()))?,
            object @ Value::Object(_) => object,
            other => return Err(Error::MalformedGameInfo(format!("expected a level, got {other}"))),
        };
        serde_json::from_value(level).map_err(|e| Error::MalformedGameInfo(e.to_string()))
    }

    pub fn state(&self) -> LevelState {
        if self.completed == 1 {
            LevelState::Completed
        } else if self.status == "blocked" {
            LevelState::Locked
        } else {
            LevelState::Available
        }
    }

    /// Where the play button leads.
    pub fn play_url(&self) -> String {
        format!("{}/{}", self.url, self.list_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    Completed,
    Locked,
    Available,
}

impl LevelState {
    pub fn button_label(self) -> &'static str {
        match self {
            LevelState::Completed => "Rejouer",
            LevelState::Locked => "Bloqué",
            LevelState::Available => "Jouer",
        }
    }
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('\'', "&#39;").replace('"', "&quot;")
}

/// The level detail card next to the trail, and the jump into a game.
#[derive(Debug, Default)]
pub struct LevelPopup {
    shown: Option<GameInfo>,
    launching: bool,
}

impl LevelPopup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the level whose box is at `target.index`. A malformed attribute
    /// is reported with the generic alert.
    pub fn open(&mut self, ctx: &mut PageContext, game_infos: &str, target: &ClickTarget) -> Result<LevelState> {
        let info = match GameInfo::parse(game_infos) {
            Ok(info) => info,
            Err(e) => {
                log::warn!("{}", e);
                ctx.alert(GENERIC_ERROR_TITLE, GENERIC_ERROR_TEXT);
                return Err(e);
            }
        };
        let state = info.state();

        ctx.emit(Command::select(LEVEL, target.index, "selected"));
        ctx.emit(Command::set_data(CONTAINER, "position", info.ord));
        ctx.emit(Command::add_class(CONTAINER, ENTRY_CLASS));
        let entry = ctx.config.level_entry_delay;
        ctx.defer(entry, Command::remove_class(CONTAINER, ENTRY_CLASS));

        match state {
            LevelState::Locked => {
                ctx.emit(Command::set_html(TITLE, LOCKED_TITLE));
                ctx.emit(Command::set_html(TEXT, LOCKED_TEXT));
                ctx.emit(Command::remove_class(SUBMIT, "start"));
                let html = format!("<p style='color:white;'>{}</p>", state.button_label());
                ctx.splice(SUBMIT, &html, Vec::new());
            }
            LevelState::Completed | LevelState::Available => {
                ctx.emit(Command::add_class(SUBMIT, "start"));
                ctx.emit(Command::set_html(TITLE, &info.name));
                ctx.emit(Command::set_html(TEXT, &info.short_desc));
                let url = escape_attr(&info.play_url());
                let html = format!("<a href='{url}' data-url='{url}'>{}</a>", state.button_label());
                ctx.splice(SUBMIT, &html, vec![Binding::new("a", ACTION_LAUNCH)]);
            }
        }

        self.shown = Some(info);
        Ok(state)
    }

    /// Click on the trail background. Only direct hits close the card.
    pub fn close(&mut self, ctx: &mut PageContext, target: &ClickTarget) -> bool {
        if !target.direct {
            return false;
        }
        ctx.emit(Command::set_data(CONTAINER, "position", 0));
        ctx.emit(Command::add_class(CONTAINER, ENTRY_CLASS));
        ctx.emit(Command::remove_class(LEVEL, "selected"));
        self.shown = None;
        true
    }

    /// Play button. With no lives left the button says so for a moment;
    /// otherwise the loading overlay covers the page until navigation.
    pub fn launch(&mut self, ctx: &mut PageContext, url: &str, lives: u32) -> bool {
        if self.launching {
            return false;
        }
        if lives == 0 {
            let label = self
                .shown
                .as_ref()
                .map(|info| info.state().button_label())
                .unwrap_or(LevelState::Available.button_label());
            ctx.emit(Command::set_html(SUBMIT_LINK, NO_LIVES_LABEL));
            ctx.pulse(SUBMIT_LINK);
            let notice = ctx.config.notice_duration;
            ctx.defer(notice, Command::set_html(SUBMIT_LINK, label));
            return false;
        }

        self.launching = true;
        ctx.emit(Command::set_style(OVERLAY, &[("top", "0px"), ("left", "0px")]));
        ctx.emit(Command::add_class(OVERLAY, "active"));
        let delay = ctx.config.launch_delay;
        ctx.defer(delay, Command::navigate(url));
        log::info!("launching {}", url);
        true
    }

    pub fn shown(&self) -> Option<&GameInfo> {
        self.shown.as_ref()
    }
}
