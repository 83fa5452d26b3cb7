use crate::api::types::WakeKind;

/// Slack for float accumulation: 60 steps of 1/60 s should land on 1.0 s.
const EPSILON: f32 = 1e-4;

#[derive(Debug, Clone)]
struct Entry {
    kind: WakeKind,
    /// Seconds until the next wake.
    remaining: f32,
    /// Re-arm interval for repeating entries.
    period: Option<f32>,
    /// Insertion order, breaks ties between entries due at the same instant.
    seq: u64,
}

/// Delays and intervals driven by engine time.
///
/// Pages schedule wake-ups by kind; the runner advances the timeline every
/// fixed step and feeds the due kinds back to the page, earliest first.
#[derive(Debug, Default)]
pub struct Timeline {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake once after `delay` seconds.
    pub fn after(&mut self, delay: f32, kind: WakeKind) {
        self.push(kind, delay, None);
    }

    /// Wake every `period` seconds until cancelled.
    pub fn every(&mut self, period: f32, kind: WakeKind) {
        let period = period.max(EPSILON * 10.0);
        self.push(kind, period, Some(period));
    }

    fn push(&mut self, kind: WakeKind, remaining: f32, period: Option<f32>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            kind,
            remaining: remaining.max(0.0),
            period,
            seq,
        });
    }

    /// Drop every pending wake of `kind`. Returns how many were dropped.
    pub fn cancel(&mut self, kind: WakeKind) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.kind != kind);
        before - self.entries.len()
    }

    pub fn is_scheduled(&self, kind: WakeKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    /// Advance by `dt` seconds and return the kinds that came due, in due order.
    pub fn advance(&mut self, dt: f32) -> Vec<WakeKind> {
        // (how far past due, seq, kind): larger overshoot fired earlier
        let mut due: Vec<(f32, u64, WakeKind)> = Vec::new();

        for entry in self.entries.iter_mut() {
            entry.remaining -= dt;
            while entry.remaining <= EPSILON {
                due.push((-entry.remaining, entry.seq, entry.kind));
                match entry.period {
                    Some(period) => entry.remaining += period,
                    None => break,
                }
            }
        }
        self.entries
            .retain(|e| e.period.is_some() || e.remaining > EPSILON);

        due.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, kind)| kind).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: WakeKind = WakeKind(1);
    const B: WakeKind = WakeKind(2);

    #[test]
    fn delay_fires_once() {
        let mut t = Timeline::new();
        t.after(0.25, A);
        assert!(t.advance(0.2).is_empty());
        assert_eq!(t.advance(0.05), vec![A]);
        assert!(t.advance(1.0).is_empty());
        assert!(t.is_empty());
    }

    #[test]
    fn interval_lands_on_whole_seconds_with_frame_steps() {
        let mut t = Timeline::new();
        t.every(1.0, A);
        let mut fired = 0;
        for _ in 0..(60 * 5) {
            fired += t.advance(1.0 / 60.0).len();
        }
        assert_eq!(fired, 5);
        assert!(t.is_scheduled(A));
    }

    #[test]
    fn due_order_is_earliest_first() {
        let mut t = Timeline::new();
        t.after(0.5, A);
        t.after(0.05, B);
        assert_eq!(t.advance(1.0), vec![B, A]);
    }

    #[test]
    fn same_instant_keeps_insertion_order() {
        let mut t = Timeline::new();
        t.after(0.1, B);
        t.after(0.1, A);
        assert_eq!(t.advance(0.1), vec![B, A]);
    }

    #[test]
    fn cancel_drops_interval() {
        let mut t = Timeline::new();
        t.every(1.0, A);
        t.after(2.0, B);
        assert_eq!(t.cancel(A), 1);
        assert_eq!(t.advance(2.0), vec![B]);
    }

    #[test]
    fn long_frame_fires_interval_repeatedly() {
        let mut t = Timeline::new();
        t.every(1.0, A);
        assert_eq!(t.advance(3.0), vec![A, A, A]);
    }
}
