//! Game session controller: the countdown, the intro popup, game actions and
//! the end-of-game summary, composed once per game page.

pub mod actions;
pub mod intro;
pub mod summary;
pub mod timer;

pub use actions::{ActionOutcome, ActionRelay, GameAction};
pub use intro::IntroCountdown;
pub use summary::{EndButton, EndGameSummary, Verdict};
pub use timer::{SessionTimer, StatusOutcome};

use serde_json::Value;
use crate::api::page::PageContext;
use crate::api::types::{RequestId, WakeKind};
use crate::error::Result;
use crate::net::envelope::{GameResult, Reply};

/// Form elements the action relay drives.
#[derive(Debug, Clone)]
pub struct FormNodes {
    pub submit: String,
    pub label: String,
    pub message: String,
}

impl Default for FormNodes {
    fn default() -> Self {
        Self {
            submit: "#submit".to_string(),
            label: "Vérifier".to_string(),
            message: "#form-message".to_string(),
        }
    }
}

/// Everything a game page runs besides its own board.
#[derive(Debug)]
pub struct SessionController {
    timer: Option<SessionTimer>,
    intro: Option<IntroCountdown>,
    relay: ActionRelay,
    summary: Option<EndGameSummary>,
}

impl SessionController {
    /// Start the countdowns the manifest asks for.
    pub fn start(ctx: &mut PageContext, form: FormNodes) -> Self {
        let intro = ctx
            .manifest
            .intro_seconds
            .map(|seconds| IntroCountdown::start(ctx, seconds));
        let timer = match ctx.manifest.time {
            Some(seconds) => Some(SessionTimer::start(ctx, seconds)),
            None => {
                log::warn!("game page without a session time, no countdown");
                None
            }
        };
        Self {
            timer,
            intro,
            relay: ActionRelay::new(form.submit, form.label, form.message),
            summary: None,
        }
    }

    pub fn on_wake(&mut self, ctx: &mut PageContext, kind: WakeKind) -> bool {
        if let Some(intro) = self.intro.as_mut() {
            if intro.on_wake(ctx, kind) {
                return true;
            }
        }
        match self.timer.as_mut() {
            Some(timer) => timer.on_wake(ctx, kind),
            None => false,
        }
    }

    /// Route a reply to the timer or the relay. Returns false if neither
    /// was waiting on `id`.
    pub fn on_reply(&mut self, ctx: &mut PageContext, id: RequestId, reply: &Reply) -> bool {
        if let Some(timer) = self.timer.as_mut() {
            if let Some(outcome) = timer.on_reply(ctx, id, reply) {
                if let StatusOutcome::Ended(result) = outcome {
                    self.end_game(ctx, result);
                }
                return true;
            }
        }
        match self.relay.on_reply(ctx, id, reply) {
            Some(ActionOutcome::Ended(result)) => {
                self.end_game(ctx, result);
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn on_failure(&mut self, ctx: &mut PageContext, id: RequestId, reason: &str) -> bool {
        if let Some(timer) = self.timer.as_mut() {
            if timer.on_failure(ctx, id, reason) {
                return true;
            }
        }
        self.relay.on_failure(ctx, id, reason)
    }

    /// Send a game action. Ignored once the game is over.
    pub fn submit(&mut self, ctx: &mut PageContext, action: &GameAction) -> Result<Option<RequestId>> {
        if self.is_over() {
            log::debug!("game over, dropping action {}", action.path);
            return Ok(None);
        }
        self.relay.submit(ctx, action).map(Some)
    }

    /// New body for the end-of-time status check.
    pub fn set_status_payload(&mut self, payload: Value) {
        match self.timer.as_mut() {
            Some(timer) => timer.set_payload(payload),
            None => log::debug!("no countdown, status payload dropped"),
        }
    }

    pub fn skip_intro(&mut self, ctx: &mut PageContext) {
        if let Some(intro) = self.intro.as_mut() {
            intro.skip(ctx);
        }
    }

    /// Show the summary. Returns false if it is already showing.
    pub fn end_game(&mut self, ctx: &mut PageContext, result: GameResult) -> bool {
        if self.summary.is_some() {
            log::warn!("end_game called twice, ignoring {:?}", result);
            return false;
        }
        if let Some(timer) = self.timer.as_mut() {
            timer.stop(ctx);
        }
        self.summary = Some(EndGameSummary::show(ctx, result));
        true
    }

    /// End popup button click.
    pub fn follow(&self, ctx: &mut PageContext, button: EndButton) {
        match &self.summary {
            Some(summary) => summary.follow(ctx, button),
            None => log::warn!("{} clicked before the game ended", button.selector()),
        }
    }

    pub fn is_over(&self) -> bool {
        self.summary.is_some()
    }

    pub fn summary(&self) -> Option<&EndGameSummary> {
        self.summary.as_ref()
    }

    pub fn timer(&self) -> Option<&SessionTimer> {
        self.timer.as_ref()
    }

    pub fn intro(&self) -> Option<&IntroCountdown> {
        self.intro.as_ref()
    }
}
