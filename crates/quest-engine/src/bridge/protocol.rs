/// Host command protocol.
/// The host reaches it through the `page_*` exports generated by
/// `quest_web::export_page!`.
///
/// Every tick the runner accumulates a batch of commands. The host drains the
/// batch as one JSON document:
/// ```text
/// { "version": 1, "commands": [ { "op": "set_text", "target": "#time", "text": "41" }, ... ] }
/// ```
///
/// Commands are applied by the host strictly in order; later writes to the
/// same node win. Targets are CSS selectors and apply to every match.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::api::types::RequestId;
use crate::net::request::Request;

/// Protocol version written into every batch.
pub const PROTOCOL_VERSION: u32 = 1;

/// Markup the host shows while a fetch is in flight.
pub const LOADER_HTML: &str = "<div class='loader'></div>";

/// DOM event a binding listens for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindEvent {
    /// Calls `page_action` with
    /// `{"action": <action>, ...dataset, "href"?: ..., "target": ClickTarget}`.
    #[default]
    Click,
    /// The host cancels the default submit and calls `page_action` with
    /// `{"action": <action>, ...dataset, "fields": {name: value}}`.
    /// Checkboxes report booleans.
    Submit,
}

/// A listener the host attaches to freshly spliced nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Selector, relative to the splice container.
    pub selector: String,
    /// Action name the page's `Action` type deserializes from.
    pub action: String,
    pub event: BindEvent,
}

impl Binding {
    pub fn new(selector: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            action: action.into(),
            event: BindEvent::Click,
        }
    }

    /// Bind a form's submit instead of a click.
    pub fn submit(selector: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            event: BindEvent::Submit,
            ..Self::new(selector, action)
        }
    }
}

/// Where a click landed, as measured by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClickTarget {
    /// The click hit the bound element itself, not one of its children.
    pub direct: bool,
    /// `className` of the node that was clicked.
    pub class: String,
    /// Position of the bound element among the nodes its selector matches.
    pub index: u32,
}

impl ClickTarget {
    pub fn has_class(&self, class: &str) -> bool {
        self.class.split_whitespace().any(|c| c == class)
    }
}

/// One DOM or navigation side effect for the host to perform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Perform an HTTP request and report back through `page_response`
    /// or `page_request_failed` with the same id.
    Fetch { id: RequestId, request: Request },
    SetText { target: String, text: String },
    SetHtml { target: String, html: String },
    AddClass { target: String, class: String },
    RemoveClass { target: String, class: String },
    ToggleClass { target: String, class: String },
    /// Remove `class` from every match of `group`, then add it to the match
    /// at `index`.
    Select { group: String, index: u32, class: String },
    /// Set inline style properties (CSS property name → value). Properties
    /// not listed are left alone.
    SetStyle { target: String, style: BTreeMap<String, String> },
    /// Drop the node's `style` attribute entirely.
    ClearStyle { target: String },
    /// Set `data-<key>` on the node.
    SetData { target: String, key: String, value: String },
    /// Disable pointer events on every direct child of `<body>` except `except`.
    DisablePointer { except: String },
    /// Replace the container's content and attach `bindings` to the new nodes.
    /// The container's previous listeners go away with the replaced nodes.
    Splice { container: String, html: String, bindings: Vec<Binding> },
    Navigate { url: String },
    Alert { title: String, text: String },
    CloseAlert,
    /// Write `text` to the clipboard. If the host cannot, it reports
    /// `{"action": "clipboard_failed"}`.
    Clipboard { text: String },
    /// Forward a game-specific result for the host's own rendering.
    ActionResult { id: RequestId, result: serde_json::Value },
}

impl Command {
    pub fn set_text(target: impl Into<String>, text: impl ToString) -> Self {
        Command::SetText {
            target: target.into(),
            text: text.to_string(),
        }
    }

    pub fn set_html(target: impl Into<String>, html: impl Into<String>) -> Self {
        Command::SetHtml {
            target: target.into(),
            html: html.into(),
        }
    }

    /// Show the loader inside `target`.
    pub fn loader(target: impl Into<String>) -> Self {
        Self::set_html(target, LOADER_HTML)
    }

    pub fn add_class(target: impl Into<String>, class: impl Into<String>) -> Self {
        Command::AddClass {
            target: target.into(),
            class: class.into(),
        }
    }

    pub fn remove_class(target: impl Into<String>, class: impl Into<String>) -> Self {
        Command::RemoveClass {
            target: target.into(),
            class: class.into(),
        }
    }

    pub fn toggle_class(target: impl Into<String>, class: impl Into<String>) -> Self {
        Command::ToggleClass {
            target: target.into(),
            class: class.into(),
        }
    }

    pub fn select(group: impl Into<String>, index: u32, class: impl Into<String>) -> Self {
        Command::Select {
            group: group.into(),
            index,
            class: class.into(),
        }
    }

    pub fn set_style(target: impl Into<String>, props: &[(&str, &str)]) -> Self {
        Command::SetStyle {
            target: target.into(),
            style: props
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn clear_style(target: impl Into<String>) -> Self {
        Command::ClearStyle { target: target.into() }
    }

    pub fn set_data(target: impl Into<String>, key: impl Into<String>, value: impl ToString) -> Self {
        Command::SetData {
            target: target.into(),
            key: key.into(),
            value: value.to_string(),
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Command::Navigate { url: url.into() }
    }

    pub fn alert(title: impl Into<String>, text: impl Into<String>) -> Self {
        Command::Alert {
            title: title.into(),
            text: text.into(),
        }
    }
}

#[derive(Serialize)]
struct Batch<'a> {
    version: u32,
    commands: &'a [Command],
}

/// Serialize one drained batch for the host.
pub fn encode_commands(commands: &[Command]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Batch {
        version: PROTOCOL_VERSION,
        commands,
    })
}
