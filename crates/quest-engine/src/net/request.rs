use std::collections::BTreeMap;
use serde::Serialize;

/// Header the server checks on every state-changing POST.
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// How the host should read the reply body before handing it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Expect {
    /// `{code, message?, result?}` envelope.
    #[default]
    Json,
    /// Server-rendered fragment to be spliced.
    Html,
}

/// An HTTP request for the host's `fetch`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub method: Method,
    pub url: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub expect: Expect,
}

impl Request {
    /// GET expecting a JSON envelope.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            expect: Expect::Json,
        }
    }

    /// GET expecting an HTML fragment.
    pub fn get_html(url: impl Into<String>) -> Self {
        Self {
            expect: Expect::Html,
            ..Self::get(url)
        }
    }

    /// JSON POST carrying the CSRF token.
    pub fn json_post(url: impl Into<String>, csrf_token: &str, body: Option<&serde_json::Value>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert(CSRF_HEADER.to_string(), csrf_token.to_string());
        Self {
            method: Method::Post,
            url: url.into(),
            headers,
            body: body.map(|b| b.to_string()),
            expect: Expect::Json,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// URL layout of the Word Quest server.
pub struct Endpoints;

impl Endpoints {
    pub const ERROR_PAGE: &'static str = "/dashboard/errors/500";
    pub const LIVES_PURCHASE: &'static str = "/dashboard/lives/purchase";
    /// Default status poll under a running session.
    pub const STATUS_CHECK: &'static str = "check_status";

    /// A game-specific call under the session, e.g. `check_word/maison`.
    pub fn game_action(game: &str, session_id: &str, path: &str) -> String {
        format!(
            "/dashboard/games/{game}/{session_id}/{}",
            path.trim_start_matches('/')
        )
    }

    /// Server-rendered trail of levels for a list.
    pub fn trail(list_id: &str) -> String {
        format!("/dashboard/games/{list_id}")
    }

    pub fn like(list_id: &str) -> String {
        format!("/dashboard/list/like/{list_id}")
    }

    /// Copy someone else's list into the player's own lists.
    pub fn copy(list_id: &str) -> String {
        format!("/dashboard/list/copy/{list_id}")
    }

    /// Server-rendered settings form of one of the player's lists.
    pub fn manage(list_id: &str) -> String {
        format!("/dashboard/manage/{list_id}")
    }

    pub fn manage_update(list_id: &str) -> String {
        format!("/dashboard/manage/update/{list_id}")
    }

    /// Share link of a list, relative to the site origin.
    pub fn share_link(list_id: &str) -> String {
        format!("/dashboard/list/get_link/{list_id}")
    }
}
