use crate::camera::PerspectiveCamera;
use lightbox_common::SurfaceSize;
use lightbox_scene::{LightKind, Scene};
use std::fmt::Write as _;

/// Counters reported by a renderer for one submitted frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderInfo {
    pub draw_calls: u32,
    pub triangles: u32,
}

/// Errors surfaced by a render submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("surface lost or outdated; it was reconfigured and the frame dropped")]
    SurfaceLost,
    #[error("timed out waiting for the next surface texture")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("render backend error: {0}")]
    Backend(String),
}

impl RenderError {
    /// Errors after which the host should stop rendering.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::OutOfMemory)
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and camera, then produces output. It never
/// mutates either; scene content is builder-owned and the camera belongs to
/// the device context.
pub trait Renderer {
    /// Current output buffer size.
    fn size(&self) -> SurfaceSize;

    /// Resize the output buffer. Callers never pass a degenerate size.
    fn set_size(&mut self, size: SurfaceSize);

    /// Render and submit one frame of `scene` seen from `camera`.
    fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<RenderInfo, RenderError>;
}

/// Text renderer for headless runs, logging and tests.
///
/// Produces a human-readable description of the scene for each frame.
#[derive(Debug)]
pub struct DebugTextRenderer {
    size: SurfaceSize,
    frames: u64,
    last_frame: String,
}

impl DebugTextRenderer {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            frames: 0,
            last_frame: String::new(),
        }
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> &str {
        &self.last_frame
    }

    /// Describe a scene and camera without counting a frame.
    pub fn describe(&self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene (output={}, background={}) ===",
            self.size,
            scene.background()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.fov_degrees,
            camera.aspect()
        );
        let _ = writeln!(out, "Meshes: {}", scene.mesh_count());
        for (id, mesh) in scene.meshes() {
            let p = mesh.transform.position;
            let _ = writeln!(
                out,
                "  [{}] {} {:?} pos=({:.2}, {:.2}, {:.2}) color={} cast={} receive={}",
                id.short(),
                mesh.name,
                mesh.role,
                p.x,
                p.y,
                p.z,
                mesh.material.color(),
                mesh.cast_shadow,
                mesh.receive_shadow
            );
        }
        let _ = writeln!(out, "Lights: {}", scene.lights().len());
        for light in scene.lights() {
            match light.kind {
                LightKind::Ambient => {
                    let _ = writeln!(
                        out,
                        "  ambient color={} intensity={:.2}",
                        light.color, light.intensity
                    );
                }
                LightKind::Directional {
                    position, shadow, ..
                } => {
                    let _ = writeln!(
                        out,
                        "  directional color={} intensity={:.2} pos=({:.1}, {:.1}, {:.1}) shadow={}",
                        light.color,
                        light.intensity,
                        position.x,
                        position.y,
                        position.z,
                        shadow.map_or_else(|| "off".to_string(), |s| format!("{0}x{0}", s.map_size))
                    );
                }
            }
        }
        out
    }
}

impl Renderer for DebugTextRenderer {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn set_size(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<RenderInfo, RenderError> {
        self.last_frame = self.describe(scene, camera);
        self.frames += 1;
        Ok(RenderInfo {
            draw_calls: scene.mesh_count() as u32,
            triangles: scene.triangle_count(),
        })
    }
}
