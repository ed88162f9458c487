use crate::clock::Timer;
use crate::config::LightboxConfig;
use crate::error::StartupError;
use crate::surface::{SurfaceBinding, SurfaceHost};
use lightbox_common::SurfaceSize;
use lightbox_render::{PerspectiveCamera, Renderer};
use lightbox_scene::{Scene, SceneBuilder};

/// The renderer, scene graph root, active camera and frame timer, owned as
/// one long-lived unit.
///
/// Created once by [`DeviceContext::startup`] and passed by reference to the
/// frame loop and resize coordinator. There is no global instance.
pub struct DeviceContext<R, T> {
    pub(crate) renderer: R,
    pub(crate) scene: Scene,
    pub(crate) camera: PerspectiveCamera,
    pub(crate) clock: T,
}

impl<R: Renderer, T: Timer> DeviceContext<R, T> {
    /// Bring the demo up on `surface`.
    ///
    /// `make_renderer` runs first and is where the graphics capability is
    /// probed; if it fails nothing else is created. The scene is then
    /// populated once and the camera aspect taken from the surface.
    pub fn startup<H, F>(
        surface: &SurfaceBinding<H>,
        config: &LightboxConfig,
        clock: T,
        make_renderer: F,
    ) -> Result<Self, StartupError>
    where
        H: SurfaceHost,
        F: FnOnce(SurfaceSize) -> Result<R, StartupError>,
    {
        let reported = surface.dimensions();
        // startup needs some output size; a zero edge is lifted to one pixel
        let size = SurfaceSize::new(reported.width.max(1), reported.height.max(1));
        tracing::info!(surface = surface.label(), %size, "starting device context");

        let mut renderer = make_renderer(size)?;
        renderer.set_size(size);

        let aspect = size.aspect().unwrap_or(1.0);
        let camera = config.camera.camera(aspect);
        let scene = SceneBuilder::new(config.scene.clone()).build();

        debug_assert!(!scene.is_empty() && camera.is_valid());
        tracing::debug!(
            meshes = scene.mesh_count(),
            lights = scene.lights().len(),
            aspect,
            "device context ready"
        );

        Ok(Self {
            renderer,
            scene,
            camera,
            clock,
        })
    }

    /// Assemble a context from parts already built by the caller.
    pub fn from_parts(renderer: R, scene: Scene, camera: PerspectiveCamera, clock: T) -> Self {
        Self {
            renderer,
            scene,
            camera,
            clock,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// Camera pose and lens edits from controls or debug UI.
    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut T {
        &mut self.clock
    }

    /// Output size and camera aspect agree.
    pub fn is_consistent(&self) -> bool {
        self.renderer
            .size()
            .aspect()
            .is_some_and(|a| (a - self.camera.aspect()).abs() <= f32::EPSILON * a.max(1.0))
    }
}
