/// Fixed timestep accumulator.
/// Turns the host's variable frame deltas into whole engine steps.
pub struct FixedTimestep {
    /// The fixed delta time per step.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Most steps a single frame may run.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32, max_steps: u32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: max_steps.max(1),
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    /// Time beyond `max_steps` is dropped (a backgrounded tab resumes, it does not replay).
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// What a countdown did when one more second elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Still running; display this many seconds.
    Shown(u32),
    /// Just reached zero. Reported exactly once per arming.
    Expired,
}

/// Whole-second countdown shown to the player.
///
/// The displayed value is advisory: the server re-syncs it through
/// [`Countdown::resync`], which re-arms an expired countdown.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    running: bool,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining: seconds,
            running: true,
        }
    }

    /// Advance by one second.
    pub fn tick_second(&mut self) -> Option<CountdownStep> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Some(CountdownStep::Expired)
        } else {
            Some(CountdownStep::Shown(self.remaining))
        }
    }

    /// Replace the remaining time with the server's value.
    /// A positive value re-arms the countdown; zero leaves it stopped.
    pub fn resync(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.running = seconds > 0;
    }

    /// Halt without expiring.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
