use crate::api::page::PageContext;
use crate::bridge::protocol::Command;
use crate::net::envelope::GameResult;

pub const VICTORY_MESSAGES: [&str; 5] = [
    "Félicitations ! Vous avez gagné !",
    "Bravo ! Vous avez réussi !",
    "Vous avez gagné !",
    "Vous êtes un champion !",
    "Vous avez gagné ! Vous êtes le meilleur !",
];

pub const DEFEAT_MESSAGES: [&str; 5] = [
    "Vous pouvez faire mieux !",
    "Retentez votre chance pour améliorer votre score !",
    "Vous avez perdu une bataille, mais pas la guerre !",
    "Relevez vous et retentez votre chance !",
    "Vous avez perdu, mais vous pouvez faire mieux !",
];

pub const END_POPUP: &str = ".end-pop-up";
pub const MESSAGE_NODE: &str = "#end-message";
pub const XP_NODE: &str = "#data-xp";
pub const TIME_NODE: &str = "#data-time";
pub const LIFE_NODE: &str = "#data-life";

/// Victory when no life was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Victory,
    Defeat,
}

impl Verdict {
    pub fn from_lives_lost(lost: u32) -> Self {
        if lost == 0 {
            Verdict::Victory
        } else {
            Verdict::Defeat
        }
    }

    pub fn messages(self) -> &'static [&'static str] {
        match self {
            Verdict::Victory => &VICTORY_MESSAGES,
            Verdict::Defeat => &DEFEAT_MESSAGES,
        }
    }

    /// Value of the `result` query parameter.
    pub fn flag(self) -> &'static str {
        match self {
            Verdict::Victory => "True",
            Verdict::Defeat => "False",
        }
    }
}

/// The two ways out of the end popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndButton {
    /// `#leave-button`, back to the dashboard.
    Leave,
    /// `#final-path-button`, on to the next level.
    Continue,
}

impl EndButton {
    pub fn selector(self) -> &'static str {
        match self {
            EndButton::Leave => "#leave-button",
            EndButton::Continue => "#final-path-button",
        }
    }
}

/// Query suffix appended to the button's base URL.
pub fn url_suffix(result: &GameResult) -> String {
    format!(
        "{}&xp={}&lives={}",
        Verdict::from_lives_lost(result.lost_lives).flag(),
        result.xp,
        result.lost_lives
    )
}

/// The end-of-game popup once it is showing.
#[derive(Debug, Clone)]
pub struct EndGameSummary {
    pub result: GameResult,
    pub verdict: Verdict,
    pub message: &'static str,
    /// The button whose URL received the result suffix, with that URL.
    completed: Option<(EndButton, String)>,
}

impl EndGameSummary {
    /// Show the popup for `result`: pick a message, lock the rest of the page,
    /// start the three counters and finish the button URL.
    pub fn show(ctx: &mut PageContext, result: GameResult) -> Self {
        let verdict = Verdict::from_lives_lost(result.lost_lives);
        let pool = verdict.messages();
        let message = ctx.rng.pick(pool).copied().unwrap_or(pool[0]);

        ctx.emit(Command::add_class(END_POPUP, "active"));
        ctx.emit(Command::DisablePointer { except: END_POPUP.to_string() });
        ctx.emit(Command::set_html(MESSAGE_NODE, message));

        ctx.start_counter(XP_NODE, result.xp);
        ctx.start_counter(TIME_NODE, result.time);
        ctx.start_counter(LIFE_NODE, result.lost_lives);

        let base = ctx
            .manifest
            .leave_url
            .clone()
            .map(|url| (EndButton::Leave, url))
            .or_else(|| {
                ctx.manifest
                    .continue_url
                    .clone()
                    .map(|url| (EndButton::Continue, url))
            });
        let completed = match base {
            Some((button, base)) => {
                let url = format!("{}{}", base, url_suffix(&result));
                ctx.emit(Command::set_data(button.selector(), "url", &url));
                Some((button, url))
            }
            None => {
                log::warn!("end popup has no leave or continue button");
                None
            }
        };

        log::info!(
            "game over: {:?}, xp {}, time {}s, lives lost {}",
            verdict,
            result.xp,
            result.time,
            result.lost_lives
        );

        Self {
            result,
            verdict,
            message,
            completed,
        }
    }

    /// URL `button` leads to now.
    pub fn url_for(&self, ctx: &PageContext, button: EndButton) -> Option<String> {
        match &self.completed {
            Some((b, url)) if *b == button => Some(url.clone()),
            _ => match button {
                EndButton::Leave => ctx.manifest.leave_url.clone(),
                EndButton::Continue => ctx.manifest.continue_url.clone(),
            },
        }
    }

    /// Button click: show its loader and leave.
    pub fn follow(&self, ctx: &mut PageContext, button: EndButton) {
        match self.url_for(ctx, button) {
            Some(url) => {
                ctx.emit(Command::loader(button.selector()));
                ctx.emit(Command::navigate(url));
            }
            None => log::warn!("{} has no url", button.selector()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::manifest::PageManifest;
    use crate::api::page::PageConfig;

    fn ctx(leave: Option<&str>, cont: Option<&str>) -> PageContext {
        let manifest = PageManifest {
            leave_url: leave.map(str::to_string),
            continue_url: cont.map(str::to_string),
            ..PageManifest::default()
        };
        PageContext::new(manifest, PageConfig::default(), 7)
    }

    fn result(xp: u32, time: u32, lost_lives: u32) -> GameResult {
        GameResult { xp, time, lost_lives }
    }

    #[test]
    fn victory_draws_from_victory_pool_only() {
        for seed in 0..50 {
            let mut ctx = ctx(Some("/d?result="), None);
            ctx.rng = crate::core::rng::Rng::new(seed);
            let s = EndGameSummary::show(&mut ctx, result(10, 5, 0));
            assert_eq!(s.verdict, Verdict::Victory);
            assert!(VICTORY_MESSAGES.contains(&s.message));
        }
    }

    #[test]
    fn defeat_draws_from_defeat_pool_only() {
        for seed in 0..50 {
            let mut ctx = ctx(Some("/d?result="), None);
            ctx.rng = crate::core::rng::Rng::new(seed);
            let s = EndGameSummary::show(&mut ctx, result(10, 5, 2));
            assert_eq!(s.verdict, Verdict::Defeat);
            assert!(DEFEAT_MESSAGES.contains(&s.message));
        }
    }

    #[test]
    fn leave_button_gets_the_suffix() {
        let mut ctx = ctx(Some("/dashboard/end?result="), Some("/next?result="));
        let s = EndGameSummary::show(&mut ctx, result(120, 45, 0));
        assert!(ctx.commands().contains(&Command::set_data(
            "#leave-button",
            "url",
            "/dashboard/end?result=True&xp=120&lives=0"
        )));
        assert_eq!(
            s.url_for(&ctx, EndButton::Continue).as_deref(),
            Some("/next?result=")
        );
    }

    #[test]
    fn continue_button_is_the_fallback() {
        let mut ctx = ctx(None, Some("/next?result="));
        let s = EndGameSummary::show(&mut ctx, result(30, 60, 1));
        assert_eq!(
            s.url_for(&ctx, EndButton::Continue).as_deref(),
            Some("/next?result=False&xp=30&lives=1")
        );
    }

    #[test]
    fn popup_locks_the_page_and_zeroes_counters() {
        let mut ctx = ctx(Some("/d?r="), None);
        EndGameSummary::show(&mut ctx, result(3, 4, 0));
        let cmds = ctx.commands();
        assert_eq!(cmds[0], Command::add_class(".end-pop-up", "active"));
        assert_eq!(cmds[1], Command::DisablePointer { except: ".end-pop-up".into() });
        for node in [XP_NODE, TIME_NODE, LIFE_NODE] {
            assert!(cmds.contains(&Command::set_text(node, 0)));
        }
    }

    #[test]
    fn follow_shows_loader_then_navigates() {
        let mut ctx = ctx(Some("/d?r="), None);
        let s = EndGameSummary::show(&mut ctx, result(1, 1, 0));
        ctx.drain_commands();
        s.follow(&mut ctx, EndButton::Leave);
        assert_eq!(
            ctx.drain_commands(),
            vec![
                Command::loader("#leave-button"),
                Command::navigate("/d?r=True&xp=1&lives=0"),
            ]
        );
    }

    #[test]
    fn missing_buttons_do_not_navigate() {
        let mut ctx = ctx(None, None);
        let s = EndGameSummary::show(&mut ctx, result(1, 1, 0));
        ctx.drain_commands();
        s.follow(&mut ctx, EndButton::Leave);
        assert!(ctx.commands().is_empty());
    }
}
