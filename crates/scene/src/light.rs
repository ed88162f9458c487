use glam::{Mat4, Vec3};
use lightbox_common::Color;
use serde::{Deserialize, Serialize};

/// Shadow-casting parameters for a directional light.
///
/// The shadow camera is orthographic; bounds are in light view space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowParams {
    /// Square shadow map edge, in texels.
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    /// Depth offset applied before the shadow comparison.
    pub bias: f32,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            map_size: 1024,
            near: 0.1,
            far: 50.0,
            left: -30.0,
            right: 30.0,
            top: 30.0,
            bottom: -30.0,
            bias: 0.0,
        }
    }
}

impl ShadowParams {
    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }

    /// World to light clip space for a light at `position` aimed at `target`.
    pub fn view_projection(&self, position: Vec3, target: Vec3) -> Mat4 {
        let dir = (target - position).normalize_or_zero();
        // look_at degenerates when the light points straight along the up axis
        let up = if dir.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        self.projection() * Mat4::look_at_rh(position, target, up)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional {
        position: Vec3,
        target: Vec3,
        shadow: Option<ShadowParams>,
    },
}

/// One light in the scene's fixed rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRigEntry {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
}

impl LightRigEntry {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
        }
    }

    /// A directional light shining from `position` toward the origin.
    pub fn directional(color: Color, intensity: f32, position: Vec3) -> Self {
        Self {
            kind: LightKind::Directional {
                position,
                target: Vec3::ZERO,
                shadow: None,
            },
            color,
            intensity,
        }
    }

    pub fn with_shadow(mut self, params: ShadowParams) -> Self {
        if let LightKind::Directional { shadow, .. } = &mut self.kind {
            *shadow = Some(params);
        }
        self
    }

    pub fn shadow(&self) -> Option<&ShadowParams> {
        match &self.kind {
            LightKind::Directional { shadow, .. } => shadow.as_ref(),
            LightKind::Ambient => None,
        }
    }

    /// Unit vector pointing from the surface toward the light.
    pub fn direction_to_light(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional {
                position, target, ..
            } => Some((position - target).normalize_or_zero()),
            LightKind::Ambient => None,
        }
    }

    pub fn shadow_view_projection(&self) -> Option<Mat4> {
        match &self.kind {
            LightKind::Directional {
                position,
                target,
                shadow: Some(params),
            } => Some(params.view_projection(*position, *target)),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            LightKind::Ambient => "ambient",
            LightKind::Directional { .. } => "directional",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_has_no_shadow_or_direction() {
        let light = LightRigEntry::ambient(Color::WHITE, 0.3).with_shadow(ShadowParams::default());
        assert!(light.shadow().is_none());
        assert!(light.direction_to_light().is_none());
        assert_eq!(light.label(), "ambient");
    }

    #[test]
    fn directional_points_toward_light() {
        let light = LightRigEntry::directional(Color::WHITE, 0.8, Vec3::new(0.0, 10.0, 0.0));
        let dir = light.direction_to_light().unwrap();
        assert!((dir - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn origin_lands_inside_shadow_frustum() {
        let light = LightRigEntry::directional(Color::WHITE, 0.8, Vec3::new(8.0, 30.0, 10.0))
            .with_shadow(ShadowParams::default());
        let vp = light.shadow_view_projection().unwrap();
        let clip = vp * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn straight_down_light_is_finite() {
        let params = ShadowParams::default();
        let vp = params.view_projection(Vec3::new(0.0, 20.0, 0.0), Vec3::ZERO);
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
