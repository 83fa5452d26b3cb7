use std::collections::HashMap;
use serde::de::DeserializeOwned;
use crate::api::manifest::PageManifest;
use crate::api::types::{RequestId, WakeKind};
use crate::bridge::bindings::BindingTable;
use crate::bridge::protocol::{Binding, Command};
use crate::core::rng::Rng;
use crate::core::timeline::Timeline;
use crate::error::Result;
use crate::extensions::easing::Easing;
use crate::extensions::tween::{CounterTweens, TweenId};
use crate::input::queue::InputQueue;
use crate::net::pending::RequestTable;
use crate::net::request::{Endpoints, Request};

/// Timings for a page, provided by the page.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Fixed step in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Most fixed steps one host frame may run (default: 120, two seconds).
    pub max_steps_per_frame: u32,
    /// How long end-of-game counters take to reach their value (default: 1.0).
    pub counter_duration: f32,
    pub counter_easing: Easing,
    /// Pause after collapsing the preview popup onto its anchor (default: 0.05).
    pub popup_collapse_delay: f32,
    /// Pause between the preview reply and showing it (default: 0.25).
    pub popup_settle_delay: f32,
    /// CSS transition used for the preview grow and the close fade (default: 0.5).
    pub popup_transition: f32,
    /// Level info entry animation length (default: 0.3).
    pub level_entry_delay: f32,
    /// Delay before the body drops `phone-trail-opened` after closing a trail (default: 1.0).
    pub trail_close_delay: f32,
    /// Loading overlay time before navigating into a game (default: 2.0).
    pub launch_delay: f32,
    /// Length of the `pulse` error feedback (default: 0.25).
    pub pulse_duration: f32,
    /// How long a temporary button label stays (default: 2.0).
    pub notice_duration: f32,
    /// Pause between the list settings reply and showing it (default: 0.3).
    pub manage_settle_delay: f32,
    /// How long "saved" stays before the list settings close (default: 1.0).
    pub manage_close_delay: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 120,
            counter_duration: 1.0,
            counter_easing: Easing::Linear,
            popup_collapse_delay: 0.05,
            popup_settle_delay: 0.25,
            popup_transition: 0.5,
            level_entry_delay: 0.3,
            trail_close_delay: 1.0,
            launch_delay: 2.0,
            pulse_duration: 0.25,
            notice_duration: 2.0,
            manage_settle_delay: 0.3,
            manage_close_delay: 1.0,
        }
    }
}

/// The contract every page controller fulfills.
pub trait Page {
    /// Actions the host reports for bound elements, decoded from
    /// `{"action": "<name>", ...dataset}`.
    type Action: DeserializeOwned;

    /// Return page timings. Called once before init.
    fn config(&self) -> PageConfig {
        PageConfig::default()
    }

    /// Set up timers and initial DOM state.
    fn init(&mut self, ctx: &mut PageContext);

    /// React to the events gathered since the last update.
    fn update(&mut self, ctx: &mut PageContext, input: &InputQueue<Self::Action>);
}

/// Everything a page controller holds, built once per view and passed to
/// `Page::init` and `Page::update`.
pub struct PageContext {
    pub manifest: PageManifest,
    pub config: PageConfig,
    pub timeline: Timeline,
    pub counters: CounterTweens,
    pub bindings: BindingTable,
    pub rng: Rng,
    requests: RequestTable,
    commands: Vec<Command>,
    /// Commands waiting on a timeline entry (`setTimeout` style one-shots).
    deferred: HashMap<WakeKind, Command>,
    next_deferred: u32,
}

/// Wake kinds at or above this value belong to deferred commands.
const DEFERRED_BASE: u32 = 0x8000_0000;

impl PageContext {
    pub fn new(manifest: PageManifest, config: PageConfig, seed: u64) -> Self {
        Self {
            manifest,
            config,
            timeline: Timeline::new(),
            counters: CounterTweens::new(),
            bindings: BindingTable::new(),
            rng: Rng::new(seed),
            requests: RequestTable::new(),
            commands: Vec::with_capacity(32),
            deferred: HashMap::new(),
            next_deferred: 0,
        }
    }

    /// Queue a command for the host.
    pub fn emit(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Commands queued since the last drain.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Hand a request to the host. The reply comes back as a page event
    /// carrying the returned id.
    pub fn fetch(&mut self, request: Request) -> RequestId {
        let id = self.requests.issue(&request);
        log::debug!("request {:?}: {:?} {}", id, request.method, request.url);
        self.commands.push(Command::Fetch { id, request });
        id
    }

    /// Mark a request answered. Fails for ids that are not outstanding.
    pub fn resolve(&mut self, id: RequestId) -> Result<String> {
        self.requests.resolve(id)
    }

    pub fn outstanding_requests(&self) -> usize {
        self.requests.len()
    }

    /// Wake the page once after `delay` seconds.
    pub fn schedule(&mut self, delay: f32, kind: WakeKind) {
        self.timeline.after(delay, kind);
    }

    /// Wake the page every `period` seconds until cancelled.
    pub fn every(&mut self, period: f32, kind: WakeKind) {
        self.timeline.every(period, kind);
    }

    pub fn cancel(&mut self, kind: WakeKind) {
        self.timeline.cancel(kind);
    }

    /// Emit `command` after `delay` seconds without involving the page.
    pub fn defer(&mut self, delay: f32, command: Command) -> WakeKind {
        let kind = WakeKind(DEFERRED_BASE + self.next_deferred);
        self.next_deferred = self.next_deferred.wrapping_add(1) % DEFERRED_BASE;
        self.deferred.insert(kind, command);
        self.timeline.after(delay, kind);
        kind
    }

    /// Emit the deferred command registered under `kind`, if any.
    /// Returns false for wakes that belong to the page.
    pub fn fire_deferred(&mut self, kind: WakeKind) -> bool {
        match self.deferred.remove(&kind) {
            Some(command) => {
                self.commands.push(command);
                true
            }
            None => false,
        }
    }

    /// One fixed step of engine time: fire due deferred commands, move the
    /// counters, and return the wakes that belong to the page.
    pub fn advance(&mut self, dt: f32) -> Vec<WakeKind> {
        let mut wakes = Vec::new();
        for kind in self.timeline.advance(dt) {
            if !self.fire_deferred(kind) {
                wakes.push(kind);
            }
        }
        self.counters.tick(dt, &mut self.commands);
        wakes
    }

    /// Error feedback: flash the `pulse` class on `target`.
    pub fn pulse(&mut self, target: &str) {
        self.commands.push(Command::add_class(target, "pulse"));
        let duration = self.config.pulse_duration;
        self.defer(duration, Command::remove_class(target, "pulse"));
    }

    /// Replace a container's content and rebind its click handlers.
    pub fn splice(&mut self, container: &str, html: &str, bindings: Vec<Binding>) {
        let cmd = self.bindings.splice(container, html, bindings);
        self.commands.push(cmd);
    }

    /// Clear a container whose bindings are no longer wanted.
    pub fn clear_container(&mut self, container: &str) {
        self.bindings.release(container);
        self.commands.push(Command::set_html(container, ""));
    }

    /// Count `node` up from 0 to `to` with the configured duration.
    pub fn start_counter(&mut self, node: &str, to: u32) -> TweenId {
        let (duration, easing) = (self.config.counter_duration, self.config.counter_easing);
        self.counters.start(node, to, duration, easing, &mut self.commands)
    }

    /// Show the alert box over a frozen page.
    pub fn alert(&mut self, title: &str, text: &str) {
        crate::popup::alert::open_alert(self, title, text);
    }

    /// Terminal failure: leave for the static error page.
    pub fn redirect_to_error_page(&mut self, reason: &dyn std::fmt::Display) {
        log::error!("redirecting to error page: {}", reason);
        self.commands.push(Command::navigate(Endpoints::ERROR_PAGE));
    }

    pub fn csrf_token(&self) -> &str {
        &self.manifest.csrf_token
    }
}
