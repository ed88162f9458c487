use glam::Vec2;
use lightbox_render::{OrbitControls, PerspectiveCamera};

/// A high-level action produced from host input.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Orbit around the target by a pointer drag, in pixels.
    Orbit(Vec2),
    /// Pan the target by a pointer drag, in pixels.
    Pan(Vec2),
    /// Dolly by scroll steps; positive moves closer.
    Zoom(f32),
    /// Show or hide the stats overlay.
    ToggleStats,
    /// Show or hide the parameter panel.
    TogglePanel,
    /// Re-render the shadow map on the next frame.
    RefreshShadows,
    /// No-op (input that isn't bound).
    Noop,
}

impl Action {
    /// Map a key name to its bound action.
    pub fn from_key(key: &str) -> Self {
        match key {
            "F1" => Action::TogglePanel,
            "F2" => Action::ToggleStats,
            "R" | "r" => Action::RefreshShadows,
            _ => Action::Noop,
        }
    }

    pub fn is_camera(&self) -> bool {
        matches!(self, Action::Orbit(_) | Action::Pan(_) | Action::Zoom(_))
    }
}

/// Apply a camera action through the orbit controls. Returns `false` for
/// actions that aren't camera moves.
pub fn apply_camera_action(
    action: &Action,
    controls: &mut OrbitControls,
    camera: &mut PerspectiveCamera,
    viewport_height: f32,
) -> bool {
    match action {
        Action::Orbit(d) => controls.rotate(d.x, d.y, viewport_height),
        Action::Pan(d) => controls.pan(d.x, d.y, viewport_height, camera),
        Action::Zoom(steps) => controls.zoom(*steps),
        _ => return false,
    }
    controls.apply(camera);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bindings() {
        assert_eq!(Action::from_key("F1"), Action::TogglePanel);
        assert_eq!(Action::from_key("F2"), Action::ToggleStats);
        assert_eq!(Action::from_key("r"), Action::RefreshShadows);
        assert_eq!(Action::from_key("Q"), Action::Noop);
    }

    #[test]
    fn zoom_moves_camera_closer() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::from_camera(&camera);
        let before = camera.position.length();
        assert!(apply_camera_action(
            &Action::Zoom(2.0),
            &mut controls,
            &mut camera,
            600.0
        ));
        assert!(camera.position.length() < before);
    }

    #[test]
    fn orbit_keeps_projection() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::from_camera(&camera);
        let projection = camera.projection_matrix();
        apply_camera_action(
            &Action::Orbit(Vec2::new(50.0, 0.0)),
            &mut controls,
            &mut camera,
            600.0,
        );
        assert_eq!(camera.projection_matrix(), projection);
        assert!(camera.position.x.abs() > 0.1);
    }

    #[test]
    fn non_camera_actions_are_ignored() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::from_camera(&camera);
        let before = camera.clone();
        assert!(!apply_camera_action(
            &Action::ToggleStats,
            &mut controls,
            &mut camera,
            600.0
        ));
        assert_eq!(camera, before);
        assert!(!Action::Noop.is_camera());
        assert!(Action::Zoom(1.0).is_camera());
    }
}
