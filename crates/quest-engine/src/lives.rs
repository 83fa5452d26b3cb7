use crate::api::manifest::LivesManifest;
use crate::api::page::PageContext;
use crate::api::types::{RequestId, WakeKind};
use crate::bridge::protocol::Command;
use crate::net::envelope::{Outcome, Reply};
use crate::net::request::{Endpoints, Request};
use crate::popup::alert::{GENERIC_ERROR_TEXT, GENERIC_ERROR_TITLE};

pub const WAKE_LIVES_SECOND: WakeKind = WakeKind(0x140);

/// Seconds the server takes to grant one life back.
pub const LIFE_REFILL_SECONDS: u64 = 900;
/// Gems one purchased life costs.
pub const LIFE_PRICE: u32 = 200;

pub const COUNTER: &str = "#lives-counter";
pub const LIVES_INFO: &str = "#lives-info";
pub const GEMS_INFO: &str = "#gems-info";
pub const PURCHASE_BUTTON: &str = "#life-purchase-button";

pub const FULL_LIVES_MESSAGE: &str = "Vous avez toutes vos vies";
pub const PURCHASE_LABEL: &str = "Acheter (200 gemmes)";

/// `m:ss`
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Dashboard lives counter: time to the next free life, and buying one.
///
/// The clock mirrors the server. `now` starts at the server's render time and
/// advances one second per beat; crossing `end_time` grants a life locally,
/// the same way the server will on the next page load.
#[derive(Debug)]
pub struct LivesClock {
    lives: u32,
    max: u32,
    now: u64,
    end_time: u64,
    gems: u32,
    purchase: Option<RequestId>,
}

impl LivesClock {
    pub fn start(ctx: &mut PageContext, manifest: &LivesManifest) -> Self {
        let mut clock = Self {
            lives: manifest.lives,
            max: manifest.max,
            now: manifest.time,
            end_time: manifest.end_time,
            gems: manifest.gems,
            purchase: None,
        };
        clock.render(ctx);
        clock
    }

    /// Full lives stop the clock; otherwise make sure it is ticking.
    fn render(&mut self, ctx: &mut PageContext) {
        if self.is_full() {
            ctx.cancel(WAKE_LIVES_SECOND);
            ctx.emit(Command::set_text(COUNTER, FULL_LIVES_MESSAGE));
            ctx.emit(Command::set_style(PURCHASE_BUTTON, &[("display", "none")]));
        } else if !ctx.timeline.is_scheduled(WAKE_LIVES_SECOND) {
            ctx.every(1.0, WAKE_LIVES_SECOND);
        }
    }

    pub fn on_wake(&mut self, ctx: &mut PageContext, kind: WakeKind) -> bool {
        if kind != WAKE_LIVES_SECOND {
            return false;
        }
        if self.is_full() {
            ctx.cancel(WAKE_LIVES_SECOND);
            return true;
        }
        if self.now > self.end_time {
            self.grant_life(ctx);
            self.end_time += LIFE_REFILL_SECONDS;
            ctx.emit(Command::set_data(COUNTER, "end_time", self.end_time));
            self.render(ctx);
            return true;
        }
        ctx.emit(Command::set_text(COUNTER, format_clock(self.end_time - self.now)));
        self.now += 1;
        ctx.emit(Command::set_data(COUNTER, "time", self.now));
        if self.gems < LIFE_PRICE {
            ctx.emit(Command::add_class(PURCHASE_BUTTON, "disabled"));
        }
        true
    }

    fn grant_life(&mut self, ctx: &mut PageContext) {
        self.lives = (self.lives + 1).min(self.max);
        ctx.emit(Command::set_data(COUNTER, "lives", self.lives));
        ctx.emit(Command::set_text(LIVES_INFO, self.lives));
    }

    /// Buy one life with gems.
    pub fn purchase(&mut self, ctx: &mut PageContext) -> Option<RequestId> {
        if self.purchase.is_some() || self.is_full() {
            return None;
        }
        ctx.emit(Command::loader(PURCHASE_BUTTON));
        let request = Request::json_post(Endpoints::LIVES_PURCHASE, ctx.csrf_token(), None);
        let id = ctx.fetch(request);
        self.purchase = Some(id);
        Some(id)
    }

    pub fn on_reply(&mut self, ctx: &mut PageContext, id: RequestId, reply: &Reply) -> bool {
        if self.purchase != Some(id) {
            return false;
        }
        self.purchase = None;
        ctx.emit(Command::set_html(PURCHASE_BUTTON, PURCHASE_LABEL));

        let envelope = match reply.envelope() {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!("life purchase failed: {}", e);
                ctx.alert(GENERIC_ERROR_TITLE, GENERIC_ERROR_TEXT);
                return true;
            }
        };
        let gems = envelope.extra_u32("gems");
        match envelope.outcome() {
            Ok(Outcome::Success(_)) => {
                self.grant_life(ctx);
                self.end_time = self.now + LIFE_REFILL_SECONDS;
                ctx.emit(Command::set_data(COUNTER, "end_time", self.end_time));
                if let Some(gems) = gems {
                    self.gems = gems;
                    ctx.emit(Command::set_text(GEMS_INFO, gems));
                    ctx.emit(Command::set_data(GEMS_INFO, "value", gems));
                }
                ctx.pulse(LIVES_INFO);
                ctx.pulse(GEMS_INFO);
                self.render(ctx);
            }
            Ok(other) => {
                log::warn!("life purchase refused: {:?}", other);
                ctx.pulse(PURCHASE_BUTTON);
            }
            Err(e) => {
                log::warn!("life purchase failed: {}", e);
                ctx.alert(GENERIC_ERROR_TITLE, GENERIC_ERROR_TEXT);
            }
        }
        true
    }

    pub fn on_failure(&mut self, ctx: &mut PageContext, id: RequestId, reason: &str) -> bool {
        if self.purchase != Some(id) {
            return false;
        }
        self.purchase = None;
        log::warn!("life purchase failed: {}", reason);
        ctx.emit(Command::set_html(PURCHASE_BUTTON, PURCHASE_LABEL));
        ctx.alert(GENERIC_ERROR_TITLE, GENERIC_ERROR_TEXT);
        true
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn gems(&self) -> u32 {
        self.gems
    }

    pub fn is_full(&self) -> bool {
        self.lives >= self.max
    }

    /// Seconds until the next free life.
    pub fn remaining(&self) -> u64 {
        self.end_time.saturating_sub(self.now)
    }
}
