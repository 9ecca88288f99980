//! Scene model for the water scene: shader uniform values, the CPU reference
//! of the wave math, the water plane mesh, the scene clock and the config file.
//!
//! # Invariants
//! - Every default setting lies inside the range the debug panel exposes.
//! - `WaveField` and the WGSL water shader compute the same surface.
//! - Nothing here touches the GPU.

mod clock;
mod config;
mod mesh;
pub mod perlin;
mod settings;
mod wave;

pub use clock::{SceneClock, frame_delta};
pub use config::{
    AssetConfig, CameraConfig, ConfigError, ConfigFormat, PanelConfig, SceneConfig, WindowConfig,
};
pub use mesh::PlaneMesh;
pub use settings::{SettingsError, WaterParam, WaterSettings};
pub use wave::WaveField;

pub fn crate_info() -> &'static str {
    concat!("tideview-scene v", env!("CARGO_PKG_VERSION"))
}
