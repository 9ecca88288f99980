use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::PI;
use tideview_input::Action;
use tideview_scene::CameraConfig;

const EPS: f32 = 1e-6;
/// Keeps the camera off the poles, where the look-at basis degenerates.
const POLAR_EPS: f32 = 1e-4;

/// Orbit camera circling a target point, with optional damping.
///
/// Input only accumulates deltas; [`OrbitCamera::update`] applies them once
/// per frame. With damping on, each update applies `damping_factor` of the
/// remaining delta and decays the rest, so motion eases out over frames.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
    home_position: Vec3,
    home_target: Vec3,
}

/// Offset from the target in spherical coordinates, Y up.
/// `theta` is the azimuth around Y measured from +Z, `phi` the angle from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius < EPS {
            return Self {
                radius: 0.0,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: config.position,
            target: config.target,
            fov: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            home_position: config.position,
            home_target: config.target,
        }
    }

    /// Distance from the camera to its target.
    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward()).normalize_or_zero()
    }

    /// Queue an orbit by a pointer delta, in pixels of a viewport `height` tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        self.delta_theta -= 2.0 * PI * dx / height * self.rotate_speed;
        self.delta_phi -= 2.0 * PI * dy / height * self.rotate_speed;
    }

    /// Queue a pan. One viewport height of drag moves the target by the
    /// visible height of the scene at the target distance.
    pub fn pan(&mut self, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        let target_distance = self.distance() * (self.fov * 0.5).tan();
        let left = -2.0 * dx * target_distance / height * self.pan_speed;
        let up = 2.0 * dy * target_distance / height * self.pan_speed;
        self.pan_offset += self.right() * left + self.up() * up;
    }

    /// Queue a dolly; positive steps move toward the target.
    pub fn dolly(&mut self, steps: f32) {
        self.scale *= 0.95_f32.powf(self.zoom_speed * steps);
    }

    /// Route a camera [`Action`]. Returns false for non-camera actions.
    pub fn apply(&mut self, action: Action, viewport_height: f32) -> bool {
        match action {
            Action::Orbit(d) => self.rotate(d.x, d.y, viewport_height),
            Action::Pan(d) => self.pan(d.x, d.y, viewport_height),
            Action::Dolly(steps) => self.dolly(steps),
            Action::ResetCamera => self.reset(),
            Action::TogglePanel | Action::Noop => return false,
        }
        true
    }

    /// Apply queued motion. Call once per frame. Returns whether the camera moved.
    pub fn update(&mut self) -> bool {
        let before = (self.position, self.target);
        let mut spherical = Spherical::from_offset(self.position - self.target);

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.delta_theta * factor;
        spherical.phi =
            (spherical.phi + self.delta_phi * factor).clamp(POLAR_EPS, PI - POLAR_EPS);
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * factor;
        self.position = self.target + spherical.to_offset();

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        self.position.distance_squared(before.0) > EPS
            || self.target.distance_squared(before.1) > EPS
    }

    /// Snap back to the starting position and drop queued motion.
    pub fn reset(&mut self) {
        self.position = self.home_position;
        self.target = self.home_target;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
        tracing::debug!("camera reset");
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// View-projection with the translation removed, for the skybox.
    pub fn sky_view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(Vec3::ZERO, self.forward(), Vec3::Y);
        self.projection_matrix() * view
    }

    /// Spherical angles `(theta, phi)` of the current offset, for display.
    pub fn angles(&self) -> Vec2 {
        let s = Spherical::from_offset(self.position - self.target);
        Vec2::new(s.theta, s.phi)
    }
}
