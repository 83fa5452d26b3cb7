use crate::api::page::PageContext;
use crate::api::types::WakeKind;
use crate::bridge::protocol::Command;
use crate::core::time::{Countdown, CountdownStep};

pub const WAKE_INTRO_SECOND: WakeKind = WakeKind(0x102);

pub const INTRO_POPUP: &str = ".start-pop-up";
pub const INTRO_COUNTER: &str = "#counter";

/// The "get ready" popup shown over a game before play starts.
#[derive(Debug)]
pub struct IntroCountdown {
    countdown: Countdown,
    open: bool,
}

impl IntroCountdown {
    pub fn start(ctx: &mut PageContext, seconds: u32) -> Self {
        let mut intro = Self {
            countdown: Countdown::new(seconds),
            open: true,
        };
        if seconds == 0 {
            intro.close(ctx);
        } else {
            ctx.emit(Command::set_text(INTRO_COUNTER, seconds));
            ctx.every(1.0, WAKE_INTRO_SECOND);
        }
        intro
    }

    pub fn on_wake(&mut self, ctx: &mut PageContext, kind: WakeKind) -> bool {
        if kind != WAKE_INTRO_SECOND {
            return false;
        }
        match self.countdown.tick_second() {
            Some(CountdownStep::Shown(seconds)) => {
                ctx.emit(Command::set_text(INTRO_COUNTER, seconds));
            }
            Some(CountdownStep::Expired) => {
                ctx.emit(Command::set_text(INTRO_COUNTER, 0));
                self.close(ctx);
            }
            None => ctx.cancel(WAKE_INTRO_SECOND),
        }
        true
    }

    /// The skip button: close right away.
    pub fn skip(&mut self, ctx: &mut PageContext) {
        if self.open {
            self.countdown.stop();
            self.close(ctx);
        }
    }

    fn close(&mut self, ctx: &mut PageContext) {
        self.open = false;
        ctx.cancel(WAKE_INTRO_SECOND);
        ctx.emit(Command::remove_class(INTRO_POPUP, "active"));
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
