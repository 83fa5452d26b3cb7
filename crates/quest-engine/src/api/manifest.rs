use serde::Deserialize;
use serde_json::Value;
use crate::error::{Error, Result};
use crate::net::lenient;
use crate::net::request::Endpoints;

/// Page facts the host collects from the root element's `data-*` attributes
/// and hidden form fields, handed over once at init as JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageManifest {
    /// Opaque session handle (`body[data-session_id]`). Never validated.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Game slug used in session URLs (`typefast`, `quiz`, `hangman`, ...).
    #[serde(default)]
    pub game: Option<String>,
    /// Server-provided starting value of the session countdown, in seconds.
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub time: Option<u32>,
    /// Starting value of the "get ready" countdown, if the page has one.
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub intro_seconds: Option<u32>,
    /// Value of the hidden `csrf_token` field.
    #[serde(default)]
    pub csrf_token: String,
    /// `data-url` of the end popup's leave button, if the page has one.
    #[serde(default)]
    pub leave_url: Option<String>,
    /// `data-url` of the end popup's continue button (`final-path-button`).
    #[serde(default)]
    pub continue_url: Option<String>,
    /// Lives clock state (dashboard only).
    #[serde(default)]
    pub lives: Option<LivesManifest>,
    /// How the page asks the server about the session once time runs out.
    #[serde(default)]
    pub status_check: StatusCheck,
    /// `protocol//hostname` of the site, prefixed to share links.
    #[serde(default)]
    pub origin: String,
}

/// End-of-time status request, relative to the session URL.
///
/// Most games GET `check_status`. Falling words POSTs its answers to
/// `checktime` instead; the board keeps `payload` current while it runs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusCheck {
    #[serde(default = "default_status_path")]
    pub path: String,
    /// JSON body; turns the check into a CSRF-carrying POST.
    #[serde(default)]
    pub payload: Option<Value>,
}

impl Default for StatusCheck {
    fn default() -> Self {
        Self {
            path: default_status_path(),
            payload: None,
        }
    }
}

fn default_status_path() -> String {
    Endpoints::STATUS_CHECK.to_string()
}

/// `#lives-counter` dataset plus the gems balance.
#[derive(Debug, Clone, Deserialize)]
pub struct LivesManifest {
    #[serde(deserialize_with = "lenient::u32")]
    pub lives: u32,
    /// Server clock at render time, epoch seconds (`data-time`).
    #[serde(deserialize_with = "lenient::u64")]
    pub time: u64,
    /// When the next life is granted, epoch seconds (`data-end_time`).
    #[serde(deserialize_with = "lenient::u64")]
    pub end_time: u64,
    #[serde(default, deserialize_with = "lenient::u32")]
    pub gems: u32,
    #[serde(default = "default_max_lives", deserialize_with = "lenient::u32")]
    pub max: u32,
}

fn default_max_lives() -> u32 {
    5
}

impl PageManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Manifest)
    }

    pub fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or_default()
    }

    pub fn game(&self) -> &str {
        self.game.as_deref().unwrap_or_default()
    }
}
