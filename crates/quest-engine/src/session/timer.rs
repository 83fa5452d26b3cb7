use serde_json::Value;
use crate::api::manifest::StatusCheck;
use crate::api::page::PageContext;
use crate::api::types::{RequestId, WakeKind};
use crate::bridge::protocol::Command;
use crate::core::time::{Countdown, CountdownStep};
use crate::error::Error;
use crate::net::envelope::{GameResult, Outcome, Reply};
use crate::net::lenient;
use crate::net::request::{Endpoints, Request};

/// One-second beat of the session countdown.
pub const WAKE_SESSION_SECOND: WakeKind = WakeKind(0x101);

/// Node showing the remaining seconds.
pub const TIME_NODE: &str = "#time";

/// What the server said when the countdown ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The session is over; show the summary.
    Ended(GameResult),
    /// Still running; the countdown restarted from the server's value.
    Resynced(u32),
    /// Nothing left to do on this page.
    Stopped,
    /// The check failed and the page is leaving for the error page.
    Failed,
}

/// Session countdown and its end-of-time status check.
///
/// Every game page shows a 1 Hz countdown from the server-provided value.
/// When it reaches zero the timer sends the manifest's status check exactly
/// once; the reply decides whether the game is over. Once stopped, a late
/// reply to that check is consumed without touching the countdown.
#[derive(Debug)]
pub struct SessionTimer {
    countdown: Countdown,
    check: StatusCheck,
    status_request: Option<RequestId>,
    checks_issued: u32,
    stopped: bool,
}

impl SessionTimer {
    /// Show `seconds` and start the 1 Hz beat.
    pub fn start(ctx: &mut PageContext, seconds: u32) -> Self {
        ctx.emit(Command::set_text(TIME_NODE, seconds));
        ctx.every(1.0, WAKE_SESSION_SECOND);
        Self {
            countdown: Countdown::new(seconds),
            check: ctx.manifest.status_check.clone(),
            status_request: None,
            checks_issued: 0,
            stopped: false,
        }
    }

    /// Replace the body of the status check (falling words sends its answers).
    pub fn set_payload(&mut self, payload: Value) {
        self.check.payload = Some(payload);
    }

    /// Handle a timeline wake. Returns false if the wake is not ours.
    pub fn on_wake(&mut self, ctx: &mut PageContext, kind: WakeKind) -> bool {
        if kind != WAKE_SESSION_SECOND {
            return false;
        }
        match self.countdown.tick_second() {
            Some(CountdownStep::Shown(seconds)) => {
                ctx.emit(Command::set_text(TIME_NODE, seconds));
            }
            Some(CountdownStep::Expired) => {
                ctx.emit(Command::set_text(TIME_NODE, 0));
                ctx.cancel(WAKE_SESSION_SECOND);
                self.check_status(ctx);
            }
            None => ctx.cancel(WAKE_SESSION_SECOND),
        }
        true
    }

    fn check_status(&mut self, ctx: &mut PageContext) {
        let url = Endpoints::game_action(ctx.manifest.game(), ctx.manifest.session_id(), &self.check.path);
        let request = match &self.check.payload {
            Some(payload) => Request::json_post(url, ctx.csrf_token(), Some(payload)),
            None => Request::get(url),
        };
        self.status_request = Some(ctx.fetch(request));
        self.checks_issued += 1;
    }

    /// Whether `id` is the status check this timer is waiting on.
    pub fn owns(&self, id: RequestId) -> bool {
        self.status_request == Some(id)
    }

    /// Handle the status reply. Returns `None` if `id` is not ours.
    pub fn on_reply(&mut self, ctx: &mut PageContext, id: RequestId, reply: &Reply) -> Option<StatusOutcome> {
        if !self.owns(id) {
            return None;
        }
        self.status_request = None;
        if self.stopped {
            log::debug!("status reply after the end, dropped");
            return Some(StatusOutcome::Stopped);
        }

        let outcome = match reply.outcome() {
            Ok(Outcome::SessionEnded(result)) => StatusOutcome::Ended(result),
            Ok(Outcome::Success(result)) => {
                let remaining = result
                    .as_ref()
                    .and_then(|r| r.get("time"))
                    .and_then(lenient::to_u32)
                    .unwrap_or(0);
                if remaining > 0 {
                    self.countdown.resync(remaining);
                    ctx.emit(Command::set_text(TIME_NODE, remaining));
                    ctx.every(1.0, WAKE_SESSION_SECOND);
                    StatusOutcome::Resynced(remaining)
                } else {
                    StatusOutcome::Stopped
                }
            }
            Ok(Outcome::Rejected { code, message }) => {
                log::warn!("status check refused ({}): {}", code, message.unwrap_or_default());
                StatusOutcome::Stopped
            }
            Err(e) => {
                ctx.redirect_to_error_page(&e);
                StatusOutcome::Failed
            }
        };
        Some(outcome)
    }

    /// Handle a failed status request. Returns false if `id` is not ours.
    pub fn on_failure(&mut self, ctx: &mut PageContext, id: RequestId, reason: &str) -> bool {
        if !self.owns(id) {
            return false;
        }
        self.status_request = None;
        if self.stopped {
            log::debug!("status check failed after the end: {}", reason);
            return true;
        }
        ctx.redirect_to_error_page(&Error::Transport(reason.to_string()));
        true
    }

    /// Halt the countdown (the summary is showing).
    pub fn stop(&mut self, ctx: &mut PageContext) {
        self.stopped = true;
        self.countdown.stop();
        ctx.cancel(WAKE_SESSION_SECOND);
    }

    pub fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_running()
    }

    /// Status checks sent so far.
    pub fn checks_issued(&self) -> u32 {
        self.checks_issued
    }
}
