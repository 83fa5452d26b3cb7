//! The server's reply conventions.
//!
//! JSON replies are `{code, message?, result?}`. `code` 200 is success, 201 means
//! the game session has ended, anything else is a domain-level refusal.

use serde::Deserialize;
use serde_json::{Map, Value};
use crate::error::{Error, Result};
use super::lenient;

pub const CODE_OK: i64 = 200;
pub const CODE_SESSION_ENDED: i64 = 201;

/// Decoded JSON reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    /// Top-level fields some endpoints add next to `result` (e.g. `gems`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Final numbers of a finished session, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GameResult {
    #[serde(deserialize_with = "lenient::u32")]
    pub xp: u32,
    /// Seconds played.
    #[serde(deserialize_with = "lenient::u32")]
    pub time: u32,
    #[serde(deserialize_with = "lenient::u32")]
    pub lost_lives: u32,
}

/// What a JSON reply means for the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Option<Value>),
    SessionEnded(GameResult),
    Rejected { code: i64, message: Option<String> },
}

impl Envelope {
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Classify the reply. A 201 without a readable result is a decode error.
    pub fn outcome(self) -> Result<Outcome> {
        match self.code {
            CODE_OK => Ok(Outcome::Success(self.result)),
            CODE_SESSION_ENDED => {
                let result = self.result.unwrap_or(Value::Null);
                Ok(Outcome::SessionEnded(serde_json::from_value(result)?))
            }
            code => Ok(Outcome::Rejected {
                code,
                message: self.message,
            }),
        }
    }

    /// Integer field from `extra`, if present.
    pub fn extra_u32(&self, key: &str) -> Option<u32> {
        self.extra.get(key).and_then(lenient::to_u32)
    }

    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// Raw reply as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    fn check_status(&self) -> Result<()> {
        if (200..300).contains(&self.status) {
            Ok(())
        } else {
            Err(Error::Http { status: self.status })
        }
    }

    /// Decode the JSON envelope. Non-2xx statuses fail before decoding.
    pub fn envelope(&self) -> Result<Envelope> {
        self.check_status()?;
        Envelope::from_json(&self.body)
    }

    /// Shortcut for `envelope()?.outcome()`.
    pub fn outcome(&self) -> Result<Outcome> {
        self.envelope()?.outcome()
    }

    /// The body of a fragment request.
    pub fn html(&self) -> Result<&str> {
        self.check_status()?;
        Ok(&self.body)
    }
}
