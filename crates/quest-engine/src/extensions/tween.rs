// extensions/tween.rs
//
// Counter tweens: integer text nodes that count up from 0 to a target over a
// fixed duration (end-of-game XP / time / lives, reward chests).
//
// Usage:
//   let mut counters = CounterTweens::new();
//   counters.start("#data-xp", 120, 1.0, Easing::Linear, &mut commands);
//   counters.tick(dt, &mut commands);  // emits SetText only when the shown value changes

use std::collections::HashMap;
use crate::bridge::protocol::Command;
use super::easing::Easing;

/// Handle to a counter tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenId(pub u32);

/// One animated counter.
#[derive(Debug, Clone)]
pub struct CounterTween {
    /// Node whose text is the counter.
    pub node: String,
    /// Final value.
    pub to: u32,
    /// Duration in seconds.
    pub duration: f32,
    /// Elapsed time.
    pub elapsed: f32,
    pub easing: Easing,
    /// Last value written to the node.
    shown: u32,
}

impl CounterTween {
    /// Normalized progress [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn is_complete(&self) -> bool {
        // 60 steps of 1/60 s sum to slightly under 1.0 in f32
        self.elapsed >= self.duration - 1e-4
    }

    /// Value for the current progress, never above `to`.
    fn value(&self) -> u32 {
        if self.is_complete() {
            return self.to;
        }
        self.easing.count(self.to, self.progress())
    }

    pub fn shown(&self) -> u32 {
        self.shown
    }
}

/// Manages all running counters.
#[derive(Debug, Default)]
pub struct CounterTweens {
    tweens: HashMap<TweenId, CounterTween>,
    next_id: u32,
}

impl CounterTweens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting `node` from 0 to `to`. Writes the initial 0 right away.
    /// A counter already running on the same node is replaced.
    pub fn start(
        &mut self,
        node: impl Into<String>,
        to: u32,
        duration: f32,
        easing: Easing,
        out: &mut Vec<Command>,
    ) -> TweenId {
        let node = node.into();
        self.tweens.retain(|_, t| t.node != node);

        let id = TweenId(self.next_id);
        self.next_id += 1;
        out.push(Command::set_text(node.clone(), 0));
        self.tweens.insert(
            id,
            CounterTween {
                node,
                to,
                duration,
                elapsed: 0.0,
                easing,
                shown: 0,
            },
        );
        id
    }

    /// Advance all counters. Returns the number that finished this tick.
    pub fn tick(&mut self, dt: f32, out: &mut Vec<Command>) -> usize {
        let mut completed = Vec::new();

        for (&id, tween) in self.tweens.iter_mut() {
            tween.elapsed += dt;
            let value = tween.value();
            if value != tween.shown {
                tween.shown = value;
                out.push(Command::set_text(tween.node.clone(), value));
            }
            if tween.is_complete() {
                completed.push(id);
            }
        }

        let count = completed.len();
        for id in completed {
            self.tweens.remove(&id);
        }
        count
    }

    pub fn get(&self, id: TweenId) -> Option<&CounterTween> {
        self.tweens.get(&id)
    }

    /// Number of running counters.
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tweens.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(cmds: &[Command], node: &str) -> Vec<String> {
        cmds.iter()
            .filter_map(|c| match c {
                Command::SetText { target, text } if target == node => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn counts_up_to_target() {
        let mut counters = CounterTweens::new();
        let mut out = Vec::new();
        counters.start("#data-xp", 120, 1.0, Easing::Linear, &mut out);

        counters.tick(0.5, &mut out);
        assert_eq!(texts(&out, "#data-xp").last().unwrap(), "60");

        counters.tick(0.5, &mut out);
        assert_eq!(texts(&out, "#data-xp").last().unwrap(), "120");
        assert!(counters.is_empty());
    }

    #[test]
    fn only_changes_are_written() {
        let mut counters = CounterTweens::new();
        let mut out = Vec::new();
        counters.start("#data-life", 2, 1.0, Easing::Linear, &mut out);
        for _ in 0..60 {
            counters.tick(1.0 / 60.0, &mut out);
        }
        assert_eq!(texts(&out, "#data-life"), vec!["0", "1", "2"]);
    }

    #[test]
    fn zero_target_finishes_silently() {
        let mut counters = CounterTweens::new();
        let mut out = Vec::new();
        counters.start("#data-life", 0, 1.0, Easing::Linear, &mut out);
        for _ in 0..70 {
            counters.tick(1.0 / 60.0, &mut out);
        }
        assert_eq!(texts(&out, "#data-life"), vec!["0"]);
        assert!(counters.is_empty());
    }

    #[test]
    fn overshooting_easing_is_clamped() {
        let mut counters = CounterTweens::new();
        let mut out = Vec::new();
        counters.start("#data-xp", 50, 1.0, Easing::BackOut, &mut out);
        for _ in 0..60 {
            counters.tick(1.0 / 60.0, &mut out);
        }
        for text in texts(&out, "#data-xp") {
            assert!(text.parse::<u32>().unwrap() <= 50);
        }
        assert_eq!(texts(&out, "#data-xp").last().unwrap(), "50");
    }

    #[test]
    fn restarting_a_node_replaces_its_counter() {
        let mut counters = CounterTweens::new();
        let mut out = Vec::new();
        counters.start("#data-xp", 10, 1.0, Easing::Linear, &mut out);
        counters.start("#data-xp", 20, 1.0, Easing::Linear, &mut out);
        assert_eq!(counters.len(), 1);
    }
}
