// extensions/easing.rs
//
// Curves for the end-of-game counters. A counter maps elapsed time to the
// integer it should display; the curve decides how fast it climbs.

use std::f32::consts::PI;

/// Counter speed curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Same pace from start to end.
    #[default]
    Linear,
    QuadOut,
    CubicOut,
    SineInOut,
    /// Runs past the target, then settles. Counters clamp the overshoot.
    BackOut,
}

impl Easing {
    /// Position on the curve for progress `t`, clamped to [0, 1] first.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let inv = 1.0 - t;
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - inv * inv,
            Easing::CubicOut => 1.0 - inv * inv * inv,
            Easing::SineInOut => (1.0 - (PI * t).cos()) * 0.5,
            Easing::BackOut => {
                const OVERSHOOT: f32 = 1.70158;
                let u = t - 1.0;
                1.0 + (OVERSHOOT + 1.0) * u * u * u + OVERSHOOT * u * u
            }
        }
    }

    /// Integer a counter heading for `to` shows at progress `t`.
    /// Rounds down and never leaves `0..=to`.
    pub fn count(self, to: u32, t: f32) -> u32 {
        let v = (to as f32 * self.apply(t)).floor();
        (v.max(0.0) as u32).min(to)
    }
}
