// extensions/mod.rs
//
// Animation helpers shared by the controllers.
// Decoupled from page state: controllers own the tweens they start.

pub mod easing;
pub mod tween;

pub use easing::Easing;
pub use tween::{CounterTweens, CounterTween, TweenId};
