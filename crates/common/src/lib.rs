//! Shared types for the tideview scene.
//!
//! # Invariants
//! - Colors are stored in sRGB and converted to linear only at GPU upload.

mod types;

pub use types::{Color, ColorError, linear_to_srgb, srgb_to_linear};
