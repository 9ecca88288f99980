//! wgpu render backend for the water scene.
//!
//! Draws a skybox behind a 512 x 512 segment water plane whose vertices are
//! displaced in the vertex shader. The camera is an orbit camera with damping.
//!
//! # Invariants
//! - The renderer never mutates settings; it only reads them each frame.
//! - The skybox is optional; without it the pass clears to the background color.
//! - Camera motion is applied once per frame in `OrbitCamera::update`.
//! - The scene is never drawn at more pixels than the surface has.

mod camera;
mod gpu;
mod shaders;
mod skybox;
mod upscale;

pub use camera::OrbitCamera;
pub use gpu::{WaterRenderer, WaterUniforms, clear_color, water_fragment_entry};
pub use shaders::{SKYBOX_SHADER, UPSCALE_SHADER, WATER_SHADER};
pub use skybox::{SkyUniforms, SkyboxPass, sky_texture_format};
pub use upscale::{UpscalePass, scene_size};
