use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use lightbox_scene::{Geometry, Mesh};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Per-draw data: model matrix columns, linear albedo, material flags.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    pub color: [f32; 4],
    /// x: shininess, y: receives shadow (0/1).
    pub material: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Which unit mesh a geometry draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnitMesh {
    Cube,
    Plane,
}

impl UnitMesh {
    pub fn for_geometry(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Box { .. } => UnitMesh::Cube,
            Geometry::Plane { .. } => UnitMesh::Plane,
        }
    }
}

impl InstanceData {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let cols = mesh.model_matrix().to_cols_array_2d();
        let [r, g, b] = mesh.material.color().to_linear();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: [r, g, b, 1.0],
            material: [
                mesh.material.shininess(),
                if mesh.receive_shadow { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }
}

/// Unit cube centered on the origin.
pub(crate) fn unit_cube() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// Unit square in the XY plane facing +Z.
pub(crate) fn unit_plane() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    let n = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex { position: [-p, -p, 0.0], normal: n },
        Vertex { position: [p, -p, 0.0], normal: n },
        Vertex { position: [p, p, 0.0], normal: n },
        Vertex { position: [-p, p, 0.0], normal: n },
    ];
    (vertices, vec![0, 1, 2, 2, 3, 0])
}

pub(crate) const FRUSTUM_LINE_VERTICES: usize = 24;

/// Line list outlining the volume a view-projection matrix maps to clip space.
pub(crate) fn frustum_lines(view_proj: Mat4, color: [f32; 4]) -> Vec<LineVertex> {
    let inv = view_proj.inverse();
    let corner = |x: f32, y: f32, z: f32| -> Vec3 {
        let p = inv * Vec4::new(x, y, z, 1.0);
        p.truncate() / p.w
    };
    // near face then far face, counter-clockwise
    let c = [
        corner(-1.0, -1.0, 0.0),
        corner(1.0, -1.0, 0.0),
        corner(1.0, 1.0, 0.0),
        corner(-1.0, 1.0, 0.0),
        corner(-1.0, -1.0, 1.0),
        corner(1.0, -1.0, 1.0),
        corner(1.0, 1.0, 1.0),
        corner(-1.0, 1.0, 1.0),
    ];
    const EDGES: [(usize, usize); 12] = [
        (0, 1), (1, 2), (2, 3), (3, 0),
        (4, 5), (5, 6), (6, 7), (7, 4),
        (0, 4), (1, 5), (2, 6), (3, 7),
    ];
    EDGES
        .iter()
        .flat_map(|&(a, b)| [c[a], c[b]])
        .map(|p| LineVertex {
            position: p.to_array(),
            color,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox_scene::{EntityRole, SceneBuilder, ShadowParams};

    #[test]
    fn cube_and_plane_sizes() {
        let (v, i) = unit_cube();
        assert_eq!((v.len(), i.len()), (24, 36));
        let (v, i) = unit_plane();
        assert_eq!((v.len(), i.len()), (4, 6));
        assert!(i.iter().all(|&idx| (idx as usize) < v.len()));
    }

    #[test]
    fn instance_flags_follow_mesh() {
        let scene = SceneBuilder::default().build();
        for mesh in scene.meshes().values() {
            let inst = InstanceData::from_mesh(mesh);
            assert_eq!(inst.material[1] == 1.0, mesh.receive_shadow);
            assert_eq!(inst.color[3], 1.0);
            match mesh.role {
                EntityRole::Ground => assert_eq!(UnitMesh::for_geometry(&mesh.geometry), UnitMesh::Plane),
                EntityRole::Dynamic => assert_eq!(UnitMesh::for_geometry(&mesh.geometry), UnitMesh::Cube),
            }
        }
    }

    #[test]
    fn frustum_lines_cover_ortho_bounds() {
        let params = ShadowParams::default();
        let lines = frustum_lines(params.projection(), [1.0; 4]);
        assert_eq!(lines.len(), FRUSTUM_LINE_VERTICES);
        // projection only: light space, x spans left..right
        let max_x = lines
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MIN, f32::max);
        assert!((max_x - params.right).abs() < 1e-3);
        let min_z = lines
            .iter()
            .map(|v| v.position[2])
            .fold(f32::MAX, f32::min);
        assert!((min_z + params.far).abs() < 1e-2);
    }
}
