use crate::action::Action;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Turns pointer press/move/scroll events into orbit-control actions.
///
/// Primary drag orbits, secondary drag pans. Middle is unbound.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    position: Option<Vec2>,
    orbiting: bool,
    panning: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.orbiting || self.panning
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        match button {
            PointerButton::Primary => self.orbiting = pressed,
            PointerButton::Secondary => self.panning = pressed,
            PointerButton::Middle => {}
        }
    }

    /// Button event that the UI may have claimed. A claimed press starts no
    /// drag, but a release always ends one, wherever the pointer is.
    pub fn button_with_ui(&mut self, button: PointerButton, pressed: bool, ui_claimed: bool) {
        if pressed && ui_claimed {
            return;
        }
        self.button(button, pressed);
    }

    /// Pointer moved to `position` (pixels). Emits a drag action while a
    /// bound button is held.
    pub fn moved(&mut self, position: Vec2) -> Action {
        let previous = self.position.replace(position);
        let Some(previous) = previous else {
            return Action::Noop;
        };
        let delta = position - previous;
        if delta == Vec2::ZERO {
            Action::Noop
        } else if self.orbiting {
            Action::Orbit(delta)
        } else if self.panning {
            Action::Pan(delta)
        } else {
            Action::Noop
        }
    }

    /// Wheel scrolled by `lines`; positive is away from the user (zoom in).
    pub fn scrolled(&mut self, lines: f32) -> Action {
        if lines == 0.0 {
            Action::Noop
        } else {
            Action::Zoom(lines)
        }
    }

    /// Pointer left the surface; drop any drag in progress.
    pub fn left(&mut self) {
        self.position = None;
        self.orbiting = false;
        self.panning = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_without_button_is_noop() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.moved(Vec2::new(10.0, 10.0)), Action::Noop);
        assert_eq!(tracker.moved(Vec2::new(20.0, 10.0)), Action::Noop);
    }

    #[test]
    fn primary_drag_orbits() {
        let mut tracker = PointerTracker::new();
        tracker.moved(Vec2::new(10.0, 10.0));
        tracker.button(PointerButton::Primary, true);
        assert_eq!(
            tracker.moved(Vec2::new(15.0, 8.0)),
            Action::Orbit(Vec2::new(5.0, -2.0))
        );
        tracker.button(PointerButton::Primary, false);
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn release_over_ui_still_ends_drag() {
        let mut tracker = PointerTracker::new();
        tracker.moved(Vec2::ZERO);
        tracker.button_with_ui(PointerButton::Primary, true, false);
        assert!(tracker.is_dragging());
        tracker.moved(Vec2::new(40.0, 0.0));
        tracker.button_with_ui(PointerButton::Primary, false, true);
        assert!(!tracker.is_dragging());
        assert_eq!(tracker.moved(Vec2::new(60.0, 5.0)), Action::Noop);
    }

    #[test]
    fn press_on_ui_does_not_start_drag() {
        let mut tracker = PointerTracker::new();
        tracker.moved(Vec2::ZERO);
        tracker.button_with_ui(PointerButton::Secondary, true, true);
        assert!(!tracker.is_dragging());
        assert_eq!(tracker.moved(Vec2::new(2.0, 2.0)), Action::Noop);
    }

    #[test]
    fn secondary_drag_pans() {
        let mut tracker = PointerTracker::new();
        tracker.moved(Vec2::ZERO);
        tracker.button(PointerButton::Secondary, true);
        assert_eq!(
            tracker.moved(Vec2::new(0.0, 4.0)),
            Action::Pan(Vec2::new(0.0, 4.0))
        );
    }

    #[test]
    fn leaving_cancels_drag() {
        let mut tracker = PointerTracker::new();
        tracker.moved(Vec2::ZERO);
        tracker.button(PointerButton::Primary, true);
        tracker.left();
        assert!(!tracker.is_dragging());
        assert_eq!(tracker.moved(Vec2::new(3.0, 3.0)), Action::Noop);
    }

    #[test]
    fn scroll_zooms() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.scrolled(1.0), Action::Zoom(1.0));
        assert_eq!(tracker.scrolled(0.0), Action::Noop);
    }
}
