use quest_engine::*;
use quest_engine::session::FormNodes;
use serde::Deserialize;
use serde_json::Value;

/// Clicks and calls the game host script reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionAction {
    SkipIntro,
    /// A game-specific call, e.g. `{"path": "check_word", "answer": "maison"}`.
    Submit {
        path: String,
        #[serde(default)]
        answer: Option<String>,
        #[serde(default)]
        payload: Option<Value>,
    },
    /// Boards that decide the end themselves (snake, falling words) report it here.
    EndGame(GameResult),
    /// Body for the end-of-time status check, e.g. `{"answers": [...]}`.
    StatusPayload { payload: Value },
    Leave,
    Continue,
}

/// Game page: countdown, intro popup, answers and the summary.
/// The board itself stays in the host script.
#[derive(Default)]
pub struct GameSessionPage {
    session: Option<SessionController>,
}

impl GameSessionPage {
    fn handle_action(session: &mut SessionController, ctx: &mut PageContext, action: &SessionAction) {
        match action {
            SessionAction::SkipIntro => session.skip_intro(ctx),
            SessionAction::Submit { path, answer, payload } => {
                let mut call = GameAction::new(path.as_str());
                if let Some(answer) = answer {
                    call = call.with_answer(answer.as_str());
                }
                if let Some(payload) = payload {
                    call = call.with_payload(payload.clone());
                }
                if let Err(e) = session.submit(ctx, &call) {
                    log::debug!("{} not sent: {}", call.path, e);
                }
            }
            SessionAction::EndGame(result) => {
                session.end_game(ctx, *result);
            }
            SessionAction::StatusPayload { payload } => session.set_status_payload(payload.clone()),
            SessionAction::Leave => session.follow(ctx, EndButton::Leave),
            SessionAction::Continue => session.follow(ctx, EndButton::Continue),
        }
    }

    pub fn session(&self) -> Option<&SessionController> {
        self.session.as_ref()
    }
}

impl Page for GameSessionPage {
    type Action = SessionAction;

    fn init(&mut self, ctx: &mut PageContext) {
        self.session = Some(SessionController::start(ctx, FormNodes::default()));
        log::info!("{} session {}", ctx.manifest.game(), ctx.manifest.session_id());
    }

    fn update(&mut self, ctx: &mut PageContext, input: &InputQueue<SessionAction>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        for event in input.iter() {
            match event {
                PageEvent::Action(action) => Self::handle_action(session, ctx, action),
                PageEvent::Reply { id, reply } => {
                    if !session.on_reply(ctx, *id, reply) {
                        log::warn!("nobody was waiting on {:?}", id);
                    }
                }
                PageEvent::RequestFailed { id, reason } => {
                    if !session.on_failure(ctx, *id, reason) {
                        log::warn!("nobody was waiting on {:?}: {}", id, reason);
                    }
                }
                PageEvent::Wake(kind) => {
                    if !session.on_wake(ctx, *kind) {
                        log::debug!("unhandled wake {:?}", kind);
                    }
                }
            }
        }
    }
}
