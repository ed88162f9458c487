use crate::gpu::WgpuRenderer;
use lightbox_common::SurfaceSize;
use lightbox_render::{PerspectiveCamera, RenderError, RenderInfo, Renderer};
use lightbox_scene::Scene;

#[derive(Debug, thiserror::Error)]
pub enum GpuInitError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    UnsupportedSurface,
}

#[derive(Debug, Clone)]
pub struct GpuOptions {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    pub present_mode: wgpu::PresentMode,
    pub prefer_srgb: bool,
}

impl Default for GpuOptions {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::AutoVsync,
            prefer_srgb: true,
        }
    }
}

/// Device, queue and configured presentation surface.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// Probe for an adapter that can present to `target` and configure it.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: SurfaceSize,
        options: &GpuOptions,
    ) -> Result<Self, GpuInitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: options.backends,
            ..Default::default()
        });

        let surface = instance.create_surface(target)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: options.power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(GpuInitError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("lightbox_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let caps = surface.get_capabilities(&adapter);
        let format =
            choose_surface_format(&caps.formats, options.prefer_srgb).ok_or(GpuInitError::UnsupportedSurface)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: options.present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let adapter_info = adapter.get_info();
        tracing::info!(
            "GPU initialized with {} backend on {}",
            adapter_info.backend.to_str(),
            adapter_info.name
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            adapter_info,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.config.width, self.config.height)
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Reconfigure for `size`. Degenerate and unchanged sizes are ignored.
    pub fn resize(&mut self, size: SurfaceSize) {
        if size.is_degenerate() || size == self.size() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Next swapchain texture. Lost or outdated surfaces are reconfigured and
    /// the frame is dropped.
    pub fn acquire(&self) -> Result<wgpu::SurfaceTexture, RenderError> {
        self.surface.get_current_texture().map_err(|err| match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                self.surface.configure(&self.device, &self.config);
                RenderError::SurfaceLost
            }
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Backend(other.to_string()),
        })
    }
}

pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = formats.first().copied()?;
    if prefer_srgb {
        if let Some(srgb) = formats.iter().find(|f| f.is_srgb()) {
            return Some(*srgb);
        }
    }
    Some(first)
}

/// A pass painted on top of the scene inside the same command encoder, so a
/// frame is still one submission.
pub trait OverlayPass {
    /// Record the overlay. Returns the number of draw calls it issued.
    fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size: SurfaceSize,
    ) -> u32;
}

/// Overlay that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOverlay;

impl OverlayPass for NoOverlay {
    fn paint(
        &mut self,
        _device: &wgpu::Device,
        _queue: &wgpu::Queue,
        _encoder: &mut wgpu::CommandEncoder,
        _view: &wgpu::TextureView,
        _size: SurfaceSize,
    ) -> u32 {
        0
    }
}

/// [`Renderer`] presenting to a window surface: scene passes, then the
/// overlay, submitted once and presented.
pub struct SurfaceRenderer<O = NoOverlay> {
    gpu: GpuContext,
    scene: WgpuRenderer,
    overlay: O,
}

impl<O: OverlayPass> SurfaceRenderer<O> {
    pub fn new(gpu: GpuContext, overlay: O) -> Self {
        let scene = WgpuRenderer::new(&gpu.device, gpu.format(), gpu.size());
        Self { gpu, scene, overlay }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn scene_renderer(&self) -> &WgpuRenderer {
        &self.scene
    }

    pub fn scene_renderer_mut(&mut self) -> &mut WgpuRenderer {
        &mut self.scene
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }
}

impl<O: OverlayPass> Renderer for SurfaceRenderer<O> {
    fn size(&self) -> SurfaceSize {
        self.gpu.size()
    }

    fn set_size(&mut self, size: SurfaceSize) {
        self.gpu.resize(size);
        self.scene.resize(&self.gpu.device, size);
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<RenderInfo, RenderError> {
        let output = self.gpu.acquire()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        let mut info = self.scene.encode(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &view,
            scene,
            camera,
        );
        info.draw_calls += self.overlay.paint(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &view,
            self.gpu.size(),
        );

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn prefers_srgb_format() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(
            choose_surface_format(&formats, true),
            Some(TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&formats, false),
            Some(TextureFormat::Bgra8Unorm)
        );
    }

    #[test]
    fn falls_back_to_first_format() {
        let formats = [TextureFormat::Rgba16Float];
        assert_eq!(
            choose_surface_format(&formats, true),
            Some(TextureFormat::Rgba16Float)
        );
        assert_eq!(choose_surface_format(&[], true), None);
    }
}
