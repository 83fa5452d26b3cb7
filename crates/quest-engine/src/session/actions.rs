use std::collections::HashSet;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;
use crate::api::page::PageContext;
use crate::api::types::RequestId;
use crate::bridge::protocol::Command;
use crate::error::{Error, Result};
use crate::net::envelope::{GameResult, Outcome, Reply, CODE_SESSION_ENDED};
use crate::net::request::{Endpoints, Request};

/// Message shown under the form when the answer is blank.
pub const EMPTY_ANSWER_MESSAGE: &str = "Veuillez saisir une réponse";

/// Characters escaped when an answer becomes a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A per-game check sent under the session (`check_word/<word>`, `check/<n>`,
/// `checkAnswers` with a JSON body, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct GameAction {
    pub path: String,
    /// Typed answer appended to the path. Must not be blank when present.
    pub answer: Option<String>,
    /// JSON body; turns the call into a CSRF-carrying POST.
    pub payload: Option<Value>,
}

impl GameAction {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            answer: None,
            payload: None,
        }
    }

    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// How a relayed action came back.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Accepted,
    /// The action finished the session.
    Ended(GameResult),
    /// The server refused the answer; the submit button pulsed.
    Refused,
    /// The page is leaving for the error page.
    Failed,
}

/// Relays game actions to the server and reports the result to the host.
#[derive(Debug)]
pub struct ActionRelay {
    submit: String,
    label: String,
    message: String,
    in_flight: HashSet<RequestId>,
}

impl ActionRelay {
    /// `submit` is the form button, `label` its idle text, `message` the
    /// node for inline validation feedback.
    pub fn new(submit: impl Into<String>, label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            submit: submit.into(),
            label: label.into(),
            message: message.into(),
            in_flight: HashSet::new(),
        }
    }

    pub fn submit(&mut self, ctx: &mut PageContext, action: &GameAction) -> Result<RequestId> {
        let mut path = action.path.clone();
        if let Some(answer) = &action.answer {
            let answer = answer.trim();
            if answer.is_empty() {
                ctx.emit(Command::set_text(&self.message, EMPTY_ANSWER_MESSAGE));
                return Err(Error::EmptyField("answer"));
            }
            path = format!(
                "{}/{}",
                path.trim_end_matches('/'),
                utf8_percent_encode(answer, SEGMENT)
            );
        }

        let url = Endpoints::game_action(ctx.manifest.game(), ctx.manifest.session_id(), &path);
        let request = match &action.payload {
            Some(payload) => Request::json_post(url, ctx.csrf_token(), Some(payload)),
            None => Request::get(url),
        };
        ctx.emit(Command::set_text(&self.message, ""));
        ctx.emit(Command::loader(&self.submit));
        let id = ctx.fetch(request);
        self.in_flight.insert(id);
        Ok(id)
    }

    pub fn owns(&self, id: RequestId) -> bool {
        self.in_flight.contains(&id)
    }

    /// Handle a reply. Returns `None` if `id` is not one of ours.
    pub fn on_reply(&mut self, ctx: &mut PageContext, id: RequestId, reply: &Reply) -> Option<ActionOutcome> {
        if !self.in_flight.remove(&id) {
            return None;
        }
        ctx.emit(Command::set_html(&self.submit, &self.label));

        let envelope = match reply.envelope() {
            Ok(envelope) => envelope,
            Err(e) => {
                ctx.redirect_to_error_page(&e);
                return Some(ActionOutcome::Failed);
            }
        };
        let forwarded = match envelope.code {
            CODE_SESSION_ENDED => envelope.result.clone(),
            _ => None,
        };
        let outcome = match envelope.outcome() {
            Ok(Outcome::Success(result)) => {
                ctx.emit(Command::ActionResult {
                    id,
                    result: result.unwrap_or(Value::Null),
                });
                ActionOutcome::Accepted
            }
            Ok(Outcome::SessionEnded(result)) => {
                ctx.emit(Command::ActionResult {
                    id,
                    result: forwarded.unwrap_or(Value::Null),
                });
                ActionOutcome::Ended(result)
            }
            Ok(Outcome::Rejected { code, message }) => {
                log::warn!("action refused ({}): {}", code, message.unwrap_or_default());
                ctx.pulse(&self.submit);
                ActionOutcome::Refused
            }
            Err(e) => {
                ctx.redirect_to_error_page(&e);
                ActionOutcome::Failed
            }
        };
        Some(outcome)
    }

    pub fn on_failure(&mut self, ctx: &mut PageContext, id: RequestId, reason: &str) -> bool {
        if !self.in_flight.remove(&id) {
            return false;
        }
        ctx.redirect_to_error_page(&Error::Transport(reason.to_string()));
        true
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
