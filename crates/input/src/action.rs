use glam::Vec2;

/// A high-level action produced from raw pointer and keyboard input.
///
/// The camera and the app consume actions, never window events, so the
/// mapping can be tested without a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Orbit around the target by a pointer delta in physical pixels.
    Orbit(Vec2),
    /// Slide the target by a pointer delta in physical pixels.
    Pan(Vec2),
    /// Move toward (positive) or away from (negative) the target, in wheel steps.
    Dolly(f32),
    /// Show or hide the debug panel.
    TogglePanel,
    /// Put the camera back where it started.
    ResetCamera,
    /// Input that maps to nothing.
    Noop,
}

impl Action {
    /// Actions the orbit camera consumes.
    pub fn is_camera(&self) -> bool {
        matches!(
            self,
            Action::Orbit(_) | Action::Pan(_) | Action::Dolly(_) | Action::ResetCamera
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_actions() {
        assert!(Action::Orbit(Vec2::X).is_camera());
        assert!(Action::Pan(Vec2::Y).is_camera());
        assert!(Action::Dolly(1.0).is_camera());
        assert!(Action::ResetCamera.is_camera());
    }

    #[test]
    fn non_camera_actions() {
        assert!(!Action::TogglePanel.is_camera());
        assert!(!Action::Noop.is_camera());
    }
}
