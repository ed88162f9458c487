use crate::graph::{EntityRole, Geometry, Helper, Material, Mesh, Scene, SceneError};
use crate::light::{LightRigEntry, ShadowParams};
use glam::{Quat, Vec3};
use lightbox_common::{Color, Transform};
use serde::{Deserialize, Serialize};

/// Shadow toggles applied while building the starting scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    pub enabled: bool,
    pub map_size: u32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            map_size: 1024,
        }
    }
}

/// Tunables for the starting scene. Every field has a default so partial
/// config files work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub background: Color,
    pub shadows: ShadowSettings,
    /// Add a line helper outlining the shadow camera frustum.
    pub shadow_helper: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            background: Color::from_hex(0xb0b0b0),
            shadows: ShadowSettings::default(),
            shadow_helper: true,
        }
    }
}

/// Populates a scene with the fixed starting content: a ground plane, one
/// cube, an ambient light and a shadow-casting directional light.
///
/// The builder is consumed by population, and a scene refuses a second
/// population, so the starting content is added exactly once.
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    settings: SceneSettings,
}

impl SceneBuilder {
    pub fn new(settings: SceneSettings) -> Self {
        Self { settings }
    }

    /// Build a fresh, populated scene.
    pub fn build(self) -> Scene {
        let mut scene = Scene::new(self.settings.background);
        self.fill(&mut scene);
        scene
    }

    /// Populate an existing, still-empty scene.
    pub fn populate(self, scene: &mut Scene) -> Result<(), SceneError> {
        if scene.is_populated() {
            return Err(SceneError::AlreadyPopulated);
        }
        self.fill(scene);
        Ok(())
    }

    fn fill(&self, scene: &mut Scene) {
        let shadows = self.settings.shadows.enabled;

        scene.add_mesh(Mesh {
            name: "Floor".into(),
            role: EntityRole::Ground,
            geometry: Geometry::Plane {
                width: 30.0,
                height: 30.0,
            },
            material: Material::Phong {
                color: Color::from_hex(0x108020),
                shininess: 0.0,
            },
            transform: Transform::default()
                .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
            cast_shadow: false,
            receive_shadow: shadows,
        });

        scene.add_mesh(Mesh {
            name: "Cube".into(),
            role: EntityRole::Dynamic,
            geometry: Geometry::Box {
                width: 2.0,
                height: 2.0,
                depth: 2.0,
            },
            material: Material::Lambert {
                color: Color::from_hex(0x202020),
            },
            transform: Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
            cast_shadow: shadows,
            receive_shadow: shadows,
        });

        scene.add_light(LightRigEntry::ambient(Color::WHITE, 0.3));

        let mut sun = LightRigEntry::directional(Color::WHITE, 0.8, Vec3::new(8.0, 30.0, 10.0));
        if shadows {
            sun = sun.with_shadow(ShadowParams {
                map_size: self.settings.shadows.map_size.max(1),
                ..ShadowParams::default()
            });
        }
        let sun_index = scene.add_light(sun);

        if self.settings.shadow_helper && shadows {
            scene.add_helper(Helper::ShadowCamera {
                light_index: sun_index,
            });
        }

        scene.mark_populated();
        tracing::debug!(
            meshes = scene.mesh_count(),
            lights = scene.lights().len(),
            shadows,
            "scene populated"
        );
    }
}
