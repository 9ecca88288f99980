use crate::action::Action;
use glam::Vec2;

/// Pointer buttons the camera reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Secondary,
    Middle,
}

/// Keys the scene reacts to, independent of the windowing library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Shift,
    H,
    R,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    None,
    Orbit,
    Pan,
    Dolly,
}

/// Turns raw pointer/key state into [`Action`]s.
///
/// Left drag orbits, right drag or shift + left drag pans, middle drag and
/// the wheel dolly. Arrow keys pan by a fixed pixel step.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    drag: Drag,
    last_cursor: Option<Vec2>,
    shift: bool,
    /// Pixels moved per arrow key press.
    pub key_pan_step: f32,
    /// Pixels of middle-button drag per dolly step.
    pub dolly_drag_pixels: f32,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self {
            drag: Drag::None,
            last_cursor: None,
            shift: false,
            key_pan_step: 7.0,
            dolly_drag_pixels: 20.0,
        }
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag != Drag::None
    }

    pub fn button(&mut self, button: Button, pressed: bool) {
        if !pressed {
            self.drag = Drag::None;
            return;
        }
        self.drag = match (button, self.shift) {
            (Button::Primary, false) => Drag::Orbit,
            (Button::Primary, true) | (Button::Secondary, _) => Drag::Pan,
            (Button::Middle, _) => Drag::Dolly,
        };
    }

    /// Feed an absolute cursor position. Emits an action while dragging.
    pub fn cursor_moved(&mut self, position: Vec2) -> Action {
        let delta = self.last_cursor.map(|last| position - last);
        self.last_cursor = Some(position);
        let Some(delta) = delta else {
            return Action::Noop;
        };
        if delta == Vec2::ZERO {
            return Action::Noop;
        }
        match self.drag {
            Drag::None => Action::Noop,
            Drag::Orbit => Action::Orbit(delta),
            Drag::Pan => Action::Pan(delta),
            Drag::Dolly => Action::Dolly(-delta.y / self.dolly_drag_pixels),
        }
    }

    pub fn cursor_left(&mut self) {
        self.last_cursor = None;
        self.drag = Drag::None;
    }

    /// Wheel movement in lines; positive scrolls up, which dollies in.
    pub fn wheel(&mut self, lines: f32) -> Action {
        if lines == 0.0 {
            Action::Noop
        } else {
            Action::Dolly(lines)
        }
    }

    pub fn key(&mut self, key: Key, pressed: bool) -> Action {
        if key == Key::Shift {
            self.shift = pressed;
            return Action::Noop;
        }
        if !pressed {
            return Action::Noop;
        }
        let step = self.key_pan_step;
        match key {
            Key::ArrowUp => Action::Pan(Vec2::new(0.0, step)),
            Key::ArrowDown => Action::Pan(Vec2::new(0.0, -step)),
            Key::ArrowLeft => Action::Pan(Vec2::new(step, 0.0)),
            Key::ArrowRight => Action::Pan(Vec2::new(-step, 0.0)),
            Key::H => Action::TogglePanel,
            Key::R => Action::ResetCamera,
            Key::Shift | Key::Other => Action::Noop,
        }
    }
}
