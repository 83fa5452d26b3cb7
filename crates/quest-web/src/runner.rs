use quest_engine::{
    Page, PageContext, PageManifest, PageEvent, InputQueue,
    FixedTimestep, Reply, RequestId, encode_commands, PROTOCOL_VERSION,
};

/// Generic page runner that wires up the engine loop.
///
/// Each concrete page (e.g., `game-session`) creates a `thread_local!`
/// PageRunner and exports free functions via `#[wasm_bindgen]`, because
/// wasm-bindgen cannot export generic structs directly.
pub struct PageRunner<P: Page> {
    page: P,
    ctx: PageContext,
    input: InputQueue<P::Action>,
    timestep: FixedTimestep,
    initialized: bool,
}

impl<P: Page> PageRunner<P> {
    pub fn new(page: P, manifest: PageManifest, seed: u64) -> Self {
        let config = page.config();
        let timestep = FixedTimestep::new(config.fixed_dt, config.max_steps_per_frame);
        Self {
            page,
            ctx: PageContext::new(manifest, config, seed),
            input: InputQueue::new(),
            timestep,
            initialized: false,
        }
    }

    /// Initialize the page. Call once after construction.
    pub fn init(&mut self) {
        self.page.init(&mut self.ctx);
        self.initialized = true;
    }

    /// Decode a bound-element action and queue it.
    /// Returns false (and logs) for payloads the page does not understand.
    pub fn push_action(&mut self, json: &str) -> bool {
        match serde_json::from_str::<P::Action>(json) {
            Ok(action) => {
                self.input.push(PageEvent::Action(action));
                true
            }
            Err(e) => {
                log::warn!("ignoring action {}: {}", json, e);
                false
            }
        }
    }

    /// Queue the reply to a fetch. Replies to ids that are not outstanding
    /// are dropped.
    pub fn push_reply(&mut self, id: u32, status: u16, body: String) -> bool {
        let id = RequestId(id);
        match self.ctx.resolve(id) {
            Ok(url) => {
                log::debug!("reply {:?} ({}) for {}", id, status, url);
                self.input.push(PageEvent::Reply {
                    id,
                    reply: Reply::new(status, body),
                });
                true
            }
            Err(e) => {
                log::warn!("dropping reply: {}", e);
                false
            }
        }
    }

    /// Queue a fetch that never produced a reply.
    pub fn push_failure(&mut self, id: u32, reason: String) -> bool {
        let id = RequestId(id);
        match self.ctx.resolve(id) {
            Ok(url) => {
                log::warn!("request {:?} for {} failed: {}", id, url, reason);
                self.input.push(PageEvent::RequestFailed { id, reason });
                true
            }
            Err(e) => {
                log::warn!("dropping failure: {}", e);
                false
            }
        }
    }

    /// Run one frame tick: advance engine time, update the page.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        // Fixed timestep accumulation
        let steps = self.timestep.accumulate(dt);
        let step = self.timestep.dt();
        for _ in 0..steps {
            for kind in self.ctx.advance(step) {
                self.input.push(PageEvent::Wake(kind));
            }
            if !self.input.is_empty() {
                self.page.update(&mut self.ctx, &self.input);
                // Drain input after update
                self.input.drain();
            }
        }
    }

    /// Take the commands queued since the last drain, as one JSON batch.
    pub fn drain_commands_json(&mut self) -> String {
        let commands = self.ctx.drain_commands();
        match encode_commands(&commands) {
            Ok(json) => json,
            Err(e) => {
                log::error!("dropping {} commands: {}", commands.len(), e);
                format!("{{\"version\":{},\"commands\":[]}}", PROTOCOL_VERSION)
            }
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut PageContext {
        &mut self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_engine::{Command, WakeKind};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(tag = "action", rename_all = "snake_case")]
    enum Action {
        Ping,
    }

    #[derive(Default)]
    struct Probe {
        pings: u32,
        wakes: u32,
        replies: u32,
    }

    impl Page for Probe {
        type Action = Action;

        fn init(&mut self, ctx: &mut PageContext) {
            ctx.every(1.0, WakeKind(0x200));
        }

        fn update(&mut self, ctx: &mut PageContext, input: &InputQueue<Action>) {
            for event in input.iter() {
                match event {
                    PageEvent::Action(Action::Ping) => {
                        self.pings += 1;
                        ctx.emit(Command::set_text("#pings", self.pings));
                    }
                    PageEvent::Wake(_) => self.wakes += 1,
                    PageEvent::Reply { .. } | PageEvent::RequestFailed { .. } => self.replies += 1,
                }
            }
        }
    }

    fn runner() -> PageRunner<Probe> {
        let mut r = PageRunner::new(Probe::default(), PageManifest::default(), 1);
        r.init();
        r
    }

    #[test]
    fn actions_are_handled_once() {
        let mut r = runner();
        assert!(r.push_action(r#"{"action":"ping"}"#));
        r.tick(0.1);
        assert_eq!(r.page().pings, 1);
        assert!(!r.push_action(r#"{"action":"pong"}"#));
    }

    #[test]
    fn wakes_follow_engine_time() {
        let mut r = runner();
        for _ in 0..180 {
            r.tick(1.0 / 60.0);
        }
        assert_eq!(r.page().wakes, 3);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut r = runner();
        r.tick(10.0);
        let wakes = r.page().wakes;
        assert!((1..=2).contains(&wakes), "ran {} wakes", wakes);
    }

    #[test]
    fn unknown_replies_are_dropped() {
        let mut r = runner();
        assert!(!r.push_reply(42, 200, "{}".into()));
        assert!(!r.push_failure(42, "offline".into()));
        r.tick(0.1);
        assert_eq!(r.page().replies, 0);
    }

    #[test]
    fn drained_batch_is_versioned() {
        let mut r = runner();
        r.push_action(r#"{"action":"ping"}"#);
        r.tick(0.1);
        let v: serde_json::Value = serde_json::from_str(&r.drain_commands_json()).unwrap();
        assert_eq!(v["version"], 1);
        assert_eq!(v["commands"][0]["text"], "1");
        let v: serde_json::Value = serde_json::from_str(&r.drain_commands_json()).unwrap();
        assert_eq!(v["commands"].as_array().unwrap().len(), 0);
    }
}
