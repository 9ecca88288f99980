//! Developer tooling: the debug tweak panel and frame timing.
//!
//! # Invariants
//! - The panel edits `WaterSettings` in place and never leaves a value
//!   outside its slider range.

mod panel;
mod timer;

pub use panel::{PanelStats, TweakPanel};
pub use timer::FrameTimer;
