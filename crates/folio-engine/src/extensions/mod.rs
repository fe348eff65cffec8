// extensions/mod.rs
//
// Tweening, decoupled from Entity/Scene internals: stages opt in through the
// `TweenState` held by the engine context.

pub mod easing;
pub mod tween;

pub use easing::{ease, Easing};
pub use tween::{Axis, Tween, TweenLoop, TweenState};
