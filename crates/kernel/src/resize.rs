use crate::context::DeviceContext;
use crate::surface::{SurfaceBinding, SurfaceHost};
use lightbox_common::SurfaceSize;
use lightbox_render::Renderer;

/// What a resize notification did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeOutcome {
    /// Output and camera now match `size`.
    Applied { size: SurfaceSize, aspect: f32 },
    /// `size` had a zero edge; output and camera were left as they were.
    Deferred { size: SurfaceSize },
}

/// Subscriber for host surface-size changes.
pub trait ResizeObserver<R, T> {
    fn surface_resized(&mut self, ctx: &mut DeviceContext<R, T>) -> ResizeOutcome;
}

/// Keeps the renderer output and camera projection in step with the host
/// surface.
#[derive(Debug)]
pub struct ResizeCoordinator<H> {
    surface: SurfaceBinding<H>,
    applied: u64,
    deferred: u64,
}

impl<H: SurfaceHost> ResizeCoordinator<H> {
    pub fn new(surface: SurfaceBinding<H>) -> Self {
        Self {
            surface,
            applied: 0,
            deferred: 0,
        }
    }

    pub fn surface(&self) -> &SurfaceBinding<H> {
        &self.surface
    }

    /// Whether the host surface currently has a drawable size. Frames should
    /// not be scheduled while this is false.
    pub fn can_present(&self) -> bool {
        !self.surface.dimensions().is_degenerate()
    }

    /// Count of applied and deferred notifications.
    pub fn counts(&self) -> (u64, u64) {
        (self.applied, self.deferred)
    }
}

/// Resize output to `size`, then set aspect and rebuild the projection.
///
/// A degenerate size changes nothing, so the camera keeps the aspect of the
/// output it is actually drawn into.
pub fn apply_size<R: Renderer, T>(ctx: &mut DeviceContext<R, T>, size: SurfaceSize) -> ResizeOutcome {
    let Some(aspect) = size.aspect() else {
        tracing::debug!(%size, "deferring resize of degenerate surface");
        return ResizeOutcome::Deferred { size };
    };

    ctx.renderer.set_size(size);
    ctx.camera.set_aspect(aspect);
    ctx.camera.update_projection_matrix();
    tracing::trace!(%size, aspect, "surface resized");
    ResizeOutcome::Applied { size, aspect }
}

impl<H, R, T> ResizeObserver<R, T> for ResizeCoordinator<H>
where
    H: SurfaceHost,
    R: Renderer,
{
    fn surface_resized(&mut self, ctx: &mut DeviceContext<R, T>) -> ResizeOutcome {
        let outcome = apply_size(ctx, self.surface.dimensions());
        match outcome {
            ResizeOutcome::Applied { .. } => self.applied += 1,
            ResizeOutcome::Deferred { .. } => self.deferred += 1,
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::LightboxConfig;
    use crate::frame_loop::FrameLoop;
    use crate::surface::SharedSurface;
    use lightbox_render::DebugTextRenderer;

    type Ctx = DeviceContext<DebugTextRenderer, ManualClock>;

    fn setup(w: u32, h: u32) -> (Ctx, ResizeCoordinator<SharedSurface>, SharedSurface) {
        let host = SharedSurface::new(SurfaceSize::new(w, h));
        let binding = SurfaceBinding::new("test", host.clone());
        let ctx = DeviceContext::startup(
            &binding,
            &LightboxConfig::default(),
            ManualClock::new(),
            |size| Ok(DebugTextRenderer::new(size)),
        )
        .unwrap();
        (ctx, ResizeCoordinator::new(binding), host)
    }

    #[test]
    fn aspect_tracks_every_positive_resize() {
        let (mut ctx, mut coordinator, host) = setup(800, 600);
        for (w, h) in [(1024, 768), (1, 1), (1920, 1080), (333, 777), (4096, 3)] {
            host.set(SurfaceSize::new(w, h));
            let outcome = coordinator.surface_resized(&mut ctx);
            let expected = w as f32 / h as f32;
            assert_eq!(
                outcome,
                ResizeOutcome::Applied {
                    size: SurfaceSize::new(w, h),
                    aspect: expected
                }
            );
            assert!((ctx.camera().aspect() - expected).abs() <= expected * 1e-6);
            assert_eq!(ctx.renderer().size(), SurfaceSize::new(w, h));
            assert!(ctx.is_consistent());
        }
        assert_eq!(coordinator.counts(), (5, 0));
    }

    #[test]
    fn resize_is_idempotent() {
        let (mut ctx, mut coordinator, host) = setup(800, 600);
        host.set(SurfaceSize::new(1280, 720));
        coordinator.surface_resized(&mut ctx);
        let first = ctx.camera().projection_matrix();
        coordinator.surface_resized(&mut ctx);
        assert_eq!(ctx.camera().projection_matrix(), first);
        assert_eq!(ctx.renderer().size(), SurfaceSize::new(1280, 720));
    }

    #[test]
    fn zero_height_is_deferred() {
        let (mut ctx, mut coordinator, host) = setup(800, 600);
        let before = ctx.camera().projection_matrix();
        host.set(SurfaceSize::new(800, 0));

        let outcome = coordinator.surface_resized(&mut ctx);

        assert_eq!(
            outcome,
            ResizeOutcome::Deferred {
                size: SurfaceSize::new(800, 0)
            }
        );
        assert!(ctx.camera().aspect().is_finite());
        assert!(ctx.camera().projection_matrix().is_finite());
        assert_eq!(ctx.camera().projection_matrix(), before);
        assert_eq!(ctx.renderer().size(), SurfaceSize::new(800, 600));
        assert!(ctx.is_consistent());
    }

    #[test]
    fn recovers_after_degenerate_size() {
        let (mut ctx, mut coordinator, host) = setup(800, 600);
        host.set(SurfaceSize::new(0, 0));
        coordinator.surface_resized(&mut ctx);
        host.set(SurfaceSize::new(640, 480));
        coordinator.surface_resized(&mut ctx);
        assert!((ctx.camera().aspect() - 640.0 / 480.0).abs() < 1e-6);
        assert_eq!(coordinator.counts(), (1, 1));
    }

    #[test]
    fn minimized_surface_cannot_present() {
        let (mut ctx, mut coordinator, host) = setup(800, 600);
        assert!(coordinator.can_present());
        host.set(SurfaceSize::new(0, 0));
        coordinator.surface_resized(&mut ctx);
        assert!(!coordinator.can_present());
        host.set(SurfaceSize::new(800, 600));
        assert!(coordinator.can_present());
    }

    #[test]
    fn resize_lands_before_next_frame() {
        let (mut ctx, mut coordinator, host) = setup(800, 600);
        let mut frame_loop = FrameLoop::new();
        frame_loop.tick(&mut ctx).unwrap();
        host.set(SurfaceSize::new(1000, 500));
        coordinator.surface_resized(&mut ctx);
        frame_loop.tick(&mut ctx).unwrap();
        let text = ctx.renderer().last_frame();
        assert!(text.contains("output=1000x500"));
        assert!(text.contains("aspect=2.000"));
    }
}
