use lightbox_scene::{EntityRole, LightKind, Scene};
use serde::Serialize;

/// Scene inspector for developer tooling.
///
/// Provides read-only queries against the scene for the parameter panel and
/// the CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene.
    pub fn summary(scene: &Scene) -> SceneSummary {
        SceneSummary {
            background: scene.background().to_string(),
            meshes: scene.mesh_count(),
            ground: scene.count_role(EntityRole::Ground),
            dynamic: scene.count_role(EntityRole::Dynamic),
            triangles: scene.triangle_count(),
            shadow_map: scene
                .shadow_caster()
                .and_then(|(_, l)| l.shadow())
                .map(|s| s.map_size),
            helpers: scene.helpers().len(),
            lights: Self::lights(scene),
        }
    }

    /// Describe each light in the rig, in rig order.
    pub fn lights(scene: &Scene) -> Vec<LightInfo> {
        scene
            .lights()
            .iter()
            .map(|light| {
                let position = match light.kind {
                    LightKind::Directional { position, .. } => {
                        Some([position.x, position.y, position.z])
                    }
                    LightKind::Ambient => None,
                };
                LightInfo {
                    kind: light.label(),
                    color: light.color.to_string(),
                    intensity: light.intensity,
                    position,
                    casts_shadow: light.shadow().is_some(),
                }
            })
            .collect()
    }
}

/// Summary of scene contents for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub background: String,
    pub meshes: usize,
    pub ground: usize,
    pub dynamic: usize,
    pub triangles: u32,
    pub shadow_map: Option<u32>,
    pub helpers: usize,
    pub lights: Vec<LightInfo>,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: meshes={} (ground={}, dynamic={}) lights={} triangles={} shadow_map={}",
            self.meshes,
            self.ground,
            self.dynamic,
            self.lights.len(),
            self.triangles,
            self.shadow_map
                .map_or_else(|| "off".to_string(), |s| s.to_string()),
        )
    }
}

/// One light of the rig.
#[derive(Debug, Clone, Serialize)]
pub struct LightInfo {
    pub kind: &'static str,
    pub color: String,
    pub intensity: f32,
    pub position: Option<[f32; 3]>,
    pub casts_shadow: bool,
}

impl std::fmt::Display for LightInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} x{:.2}", self.kind, self.color, self.intensity)?;
        if let Some([x, y, z]) = self.position {
            write!(f, " at ({x:.1}, {y:.1}, {z:.1})")?;
        }
        if self.casts_shadow {
            write!(f, " [shadow]")?;
        }
        Ok(())
    }
}
