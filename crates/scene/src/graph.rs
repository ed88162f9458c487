use crate::light::LightRigEntry;
use glam::Vec3;
use lightbox_common::{Color, EntityId, Transform};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("scene was already populated")]
    AlreadyPopulated,
}

/// What part an entity plays in the starting scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRole {
    /// Static surface that receives shadows.
    Ground,
    /// Free-standing object placed on the ground.
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Flat rectangle in the local XY plane, facing +Z.
    Plane { width: f32, height: f32 },
    /// Axis-aligned box centered on the local origin.
    Box { width: f32, height: f32, depth: f32 },
}

impl Geometry {
    /// Scale that maps the unit mesh for this geometry onto its real extents.
    pub fn extents(&self) -> Vec3 {
        match *self {
            Geometry::Plane { width, height } => Vec3::new(width, height, 1.0),
            Geometry::Box {
                width,
                height,
                depth,
            } => Vec3::new(width, height, depth),
        }
    }

    pub fn triangle_count(&self) -> u32 {
        match self {
            Geometry::Plane { .. } => 2,
            Geometry::Box { .. } => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Diffuse + specular highlight.
    Phong { color: Color, shininess: f32 },
    /// Diffuse only.
    Lambert { color: Color },
}

impl Material {
    pub fn color(&self) -> Color {
        match *self {
            Material::Phong { color, .. } | Material::Lambert { color } => color,
        }
    }

    /// Specular exponent; zero disables the highlight.
    pub fn shininess(&self) -> f32 {
        match *self {
            Material::Phong { shininess, .. } => shininess,
            Material::Lambert { .. } => 0.0,
        }
    }
}

/// A renderable entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub role: EntityRole,
    pub geometry: Geometry,
    pub material: Material,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    /// Model matrix including the geometry extents.
    pub fn model_matrix(&self) -> glam::Mat4 {
        self.transform.matrix() * glam::Mat4::from_scale(self.geometry.extents())
    }
}

/// Debug-only scene content, drawn as lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Helper {
    /// Frustum of the shadow camera of the light at this rig index.
    ShadowCamera { light_index: usize },
}

/// The scene graph root: background, meshes, light rig, helpers.
#[derive(Debug, Clone)]
pub struct Scene {
    background: Color,
    meshes: BTreeMap<EntityId, Mesh>,
    lights: Vec<LightRigEntry>,
    helpers: Vec<Helper>,
    next_index: u64,
    populated: bool,
}

impl Scene {
    /// An empty, unpopulated scene.
    pub fn new(background: Color) -> Self {
        Self {
            background,
            meshes: BTreeMap::new(),
            lights: Vec::new(),
            helpers: Vec::new(),
            next_index: 0,
            populated: false,
        }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn meshes(&self) -> &BTreeMap<EntityId, Mesh> {
        &self.meshes
    }

    pub fn mesh(&self, id: EntityId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn lights(&self) -> &[LightRigEntry] {
        &self.lights
    }

    pub fn helpers(&self) -> &[Helper] {
        &self.helpers
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn count_role(&self, role: EntityRole) -> usize {
        self.meshes.values().filter(|m| m.role == role).count()
    }

    /// Total triangles across all meshes.
    pub fn triangle_count(&self) -> u32 {
        self.meshes
            .values()
            .map(|m| m.geometry.triangle_count())
            .sum()
    }

    /// The first light that casts shadows, with its rig index.
    pub fn shadow_caster(&self) -> Option<(usize, &LightRigEntry)> {
        self.lights
            .iter()
            .enumerate()
            .find(|(_, l)| l.shadow().is_some())
    }

    /// Sum of all ambient contributions as a linear color.
    pub fn ambient(&self) -> [f32; 3] {
        self.lights
            .iter()
            .filter(|l| l.direction_to_light().is_none())
            .fold([0.0; 3], |acc, l| {
                let c = l.color.to_linear_scaled(l.intensity);
                [acc[0] + c[0], acc[1] + c[1], acc[2] + c[2]]
            })
    }

    pub(crate) fn add_mesh(&mut self, mesh: Mesh) -> EntityId {
        let id = EntityId::from_index(self.next_index);
        self.next_index += 1;
        self.meshes.insert(id, mesh);
        id
    }

    pub(crate) fn add_light(&mut self, light: LightRigEntry) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub(crate) fn add_helper(&mut self, helper: Helper) {
        self.helpers.push(helper);
    }

    pub(crate) fn mark_populated(&mut self) {
        self.populated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::ShadowParams;

    fn cube() -> Mesh {
        Mesh {
            name: "cube".into(),
            role: EntityRole::Dynamic,
            geometry: Geometry::Box {
                width: 2.0,
                height: 2.0,
                depth: 2.0,
            },
            material: Material::Lambert {
                color: Color::BLACK,
            },
            transform: Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
            cast_shadow: true,
            receive_shadow: true,
        }
    }

    #[test]
    fn new_scene_is_empty() {
        let scene = Scene::new(Color::WHITE);
        assert!(scene.is_empty());
        assert!(!scene.is_populated());
        assert!(scene.shadow_caster().is_none());
    }

    #[test]
    fn add_mesh_counts_roles() {
        let mut scene = Scene::new(Color::WHITE);
        let id = scene.add_mesh(cube());
        assert_eq!(scene.count_role(EntityRole::Dynamic), 1);
        assert_eq!(scene.count_role(EntityRole::Ground), 0);
        assert_eq!(scene.mesh(id).unwrap().name, "cube");
        assert_eq!(scene.triangle_count(), 12);
    }

    #[test]
    fn meshes_iterate_in_insertion_order() {
        let mut scene = Scene::new(Color::WHITE);
        for name in ["c", "a", "b"] {
            scene.add_mesh(Mesh {
                name: name.into(),
                ..cube()
            });
        }
        let names: Vec<_> = scene.meshes().values().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn model_matrix_applies_extents() {
        let m = cube().model_matrix();
        // unit cube corner (0.5, 0.5, 0.5) -> (1, 2, 1)
        let p = m.transform_point3(Vec3::splat(0.5));
        assert!((p - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn ambient_sums_only_ambient_lights() {
        let mut scene = Scene::new(Color::WHITE);
        scene.add_light(LightRigEntry::ambient(Color::WHITE, 0.3));
        scene.add_light(LightRigEntry::directional(Color::WHITE, 0.8, Vec3::Y));
        let [r, g, b] = scene.ambient();
        assert!((r - 0.3).abs() < 1e-5 && (g - 0.3).abs() < 1e-5 && (b - 0.3).abs() < 1e-5);
    }

    #[test]
    fn shadow_caster_reports_index() {
        let mut scene = Scene::new(Color::WHITE);
        scene.add_light(LightRigEntry::ambient(Color::WHITE, 0.3));
        scene.add_light(
            LightRigEntry::directional(Color::WHITE, 0.8, Vec3::Y).with_shadow(ShadowParams::default()),
        );
        let (idx, light) = scene.shadow_caster().unwrap();
        assert_eq!(idx, 1);
        assert_eq!(light.label(), "directional");
    }
}
