//! Input mapping: pointer and keyboard state turned into camera and UI actions.
//!
//! # Invariants
//! - No windowing types cross this boundary; the app translates its events
//!   into [`Button`] / [`Key`] first.

pub mod action;
mod pointer;

pub use action::Action;
pub use pointer::{Button, Key, PointerTracker};
