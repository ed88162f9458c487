use crate::clock::Timer;
use crate::context::DeviceContext;
use lightbox_render::{RenderError, RenderInfo, Renderer};
use lightbox_tools::{FrameStats, RenderInfoLog};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Per-frame timing and counters. Has no identity beyond its frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub index: u64,
    /// Time since the previous frame; never negative.
    pub delta: Duration,
    pub info: RenderInfo,
}

/// Shared stop flag for a running [`FrameLoop`]. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The host's display-refresh signal.
pub trait RefreshSource {
    /// Block until the next refresh. Returns `false` once the source is closed
    /// or `cancel` fired while waiting.
    fn wait_for_refresh(&mut self, cancel: &CancelToken) -> bool;
}

/// Refresh source that paces frames on a fixed period, for headless hosts.
#[derive(Debug, Clone)]
pub struct IntervalRefresh {
    period: Duration,
    next: Option<Instant>,
    remaining: Option<u64>,
}

impl IntervalRefresh {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next: None,
            remaining: None,
        }
    }

    pub fn from_hz(hz: f64) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / hz.max(1.0)))
    }

    /// Close the source after `frames` refreshes.
    pub fn limit(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }
}

impl RefreshSource for IntervalRefresh {
    fn wait_for_refresh(&mut self, cancel: &CancelToken) -> bool {
        if let Some(remaining) = &mut self.remaining {
            if *remaining == 0 {
                return false;
            }
            *remaining -= 1;
        }
        let now = Instant::now();
        let deadline = self.next.unwrap_or(now);
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        // schedule from the deadline to avoid drift, but never in the past
        self.next = Some((deadline + self.period).max(Instant::now()));
        !cancel.is_cancelled()
    }
}

/// Drives continuous rendering: one timer read and one render submission per
/// tick.
///
/// Hosts with their own event loop call [`tick`](Self::tick) from their
/// redraw callback and reschedule; headless hosts call [`run`](Self::run).
#[derive(Debug, Default)]
pub struct FrameLoop {
    frame_index: u64,
    cancel: CancelToken,
    stats: FrameStats,
    info_log: RenderInfoLog,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info_interval(mut self, interval: Duration) -> Self {
        self.info_log = RenderInfoLog::new(interval);
        self
    }

    /// Token that stops [`run`](Self::run) before its next frame.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frame_index
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn last_info(&self) -> RenderInfo {
        self.info_log.latest()
    }

    /// Run one frame. A render failure is returned as-is and not retried.
    pub fn tick<R, T>(&mut self, ctx: &mut DeviceContext<R, T>) -> Result<FrameState, RenderError>
    where
        R: Renderer,
        T: Timer,
    {
        let delta = ctx.clock.delta();
        let info = ctx.renderer.render(&ctx.scene, &ctx.camera)?;

        let frame = FrameState {
            index: self.frame_index,
            delta,
            info,
        };
        self.frame_index += 1;
        self.stats.record(delta);
        self.info_log.observe(ctx.clock.elapsed(), info);
        Ok(frame)
    }

    /// Tick on every refresh until cancelled or the source closes.
    /// Returns the number of frames rendered by this call.
    pub fn run<R, T, S>(
        &mut self,
        ctx: &mut DeviceContext<R, T>,
        refresh: &mut S,
    ) -> Result<u64, RenderError>
    where
        R: Renderer,
        T: Timer,
        S: RefreshSource + ?Sized,
    {
        let mut rendered = 0;
        while !self.cancel.is_cancelled() && refresh.wait_for_refresh(&self.cancel) {
            if let Err(e) = self.tick(ctx) {
                tracing::error!("frame {} failed: {e}", self.frame_index);
                return Err(e);
            }
            rendered += 1;
        }
        tracing::debug!(rendered, "frame loop stopped");
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use lightbox_common::SurfaceSize;
    use lightbox_render::PerspectiveCamera;
    use lightbox_scene::{Scene, SceneBuilder};

    /// Counts submissions and can be told to fail.
    #[derive(Default)]
    struct CountingRenderer {
        submissions: u64,
        fail_at: Option<u64>,
    }

    impl Renderer for CountingRenderer {
        fn size(&self) -> SurfaceSize {
            SurfaceSize::new(800, 600)
        }

        fn set_size(&mut self, _size: SurfaceSize) {}

        fn render(
            &mut self,
            scene: &Scene,
            _camera: &PerspectiveCamera,
        ) -> Result<RenderInfo, RenderError> {
            if self.fail_at == Some(self.submissions) {
                return Err(RenderError::SurfaceLost);
            }
            self.submissions += 1;
            Ok(RenderInfo {
                draw_calls: scene.mesh_count() as u32,
                triangles: scene.triangle_count(),
            })
        }
    }

    fn context(renderer: CountingRenderer) -> DeviceContext<CountingRenderer, ManualClock> {
        DeviceContext::from_parts(
            renderer,
            SceneBuilder::default().build(),
            PerspectiveCamera::default(),
            ManualClock::new(),
        )
    }

    /// Refresh source that advances a manual clock by a script of steps.
    struct Scripted {
        steps: Vec<Duration>,
        clock_target: std::rc::Rc<std::cell::RefCell<Vec<Duration>>>,
    }

    impl RefreshSource for Scripted {
        fn wait_for_refresh(&mut self, _cancel: &CancelToken) -> bool {
            match self.steps.pop() {
                Some(step) => {
                    self.clock_target.borrow_mut().push(step);
                    true
                }
                None => false,
            }
        }
    }

    #[test]
    fn n_ticks_n_submissions_non_negative_deltas() {
        let mut ctx = context(CountingRenderer::default());
        let mut frame_loop = FrameLoop::new();
        let readings = [3u64, 16, 17, 40, 41, 100];
        let mut previous = Duration::ZERO;
        for ms in readings {
            ctx.clock_mut().set(Duration::from_millis(ms));
            let frame = frame_loop.tick(&mut ctx).unwrap();
            assert_eq!(frame.delta, Duration::from_millis(ms) - previous);
            previous = Duration::from_millis(ms);
        }
        assert_eq!(ctx.renderer().submissions, readings.len() as u64);
        assert_eq!(frame_loop.frames(), readings.len() as u64);
        assert_eq!(frame_loop.stats().frames(), readings.len() as u64);
    }

    #[test]
    fn tick_reports_render_info_and_index() {
        let mut ctx = context(CountingRenderer::default());
        let mut frame_loop = FrameLoop::new();
        let first = frame_loop.tick(&mut ctx).unwrap();
        let second = frame_loop.tick(&mut ctx).unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(second.index, 1);
        assert_eq!(second.info.draw_calls, 2);
        assert_eq!(frame_loop.last_info(), second.info);
    }

    #[test]
    fn tick_does_not_touch_scene_or_camera() {
        let mut ctx = context(CountingRenderer::default());
        let camera_before = ctx.camera().clone();
        let meshes_before = ctx.scene().meshes().clone();
        FrameLoop::new().tick(&mut ctx).unwrap();
        assert_eq!(ctx.camera(), &camera_before);
        assert_eq!(ctx.scene().meshes(), &meshes_before);
    }

    #[test]
    fn render_error_propagates_without_retry() {
        let mut ctx = context(CountingRenderer {
            fail_at: Some(2),
            ..Default::default()
        });
        let mut frame_loop = FrameLoop::new();
        let mut refresh = IntervalRefresh::new(Duration::ZERO).limit(10);
        let err = frame_loop.run(&mut ctx, &mut refresh).unwrap_err();
        assert_eq!(err, RenderError::SurfaceLost);
        assert_eq!(ctx.renderer().submissions, 2);
        assert_eq!(frame_loop.frames(), 2);
    }

    #[test]
    fn run_stops_when_source_closes() {
        let mut ctx = context(CountingRenderer::default());
        let mut frame_loop = FrameLoop::new();
        let mut refresh = IntervalRefresh::new(Duration::ZERO).limit(5);
        assert_eq!(frame_loop.run(&mut ctx, &mut refresh).unwrap(), 5);
        assert_eq!(ctx.renderer().submissions, 5);
    }

    #[test]
    fn cancelled_token_stops_before_next_render() {
        let mut ctx = context(CountingRenderer::default());
        let mut frame_loop = FrameLoop::new();
        frame_loop.cancel_token().cancel();
        let mut refresh = IntervalRefresh::new(Duration::ZERO).limit(5);
        assert_eq!(frame_loop.run(&mut ctx, &mut refresh).unwrap(), 0);
        assert_eq!(ctx.renderer().submissions, 0);
    }

    #[test]
    fn cancel_from_refresh_source_stops_loop() {
        struct CancelAfter(u32);
        impl RefreshSource for CancelAfter {
            fn wait_for_refresh(&mut self, cancel: &CancelToken) -> bool {
                if self.0 == 0 {
                    cancel.cancel();
                } else {
                    self.0 -= 1;
                }
                !cancel.is_cancelled()
            }
        }

        let mut ctx = context(CountingRenderer::default());
        let mut frame_loop = FrameLoop::new();
        assert_eq!(frame_loop.run(&mut ctx, &mut CancelAfter(3)).unwrap(), 3);
        assert!(frame_loop.cancel_token().is_cancelled());
    }

    #[test]
    fn scripted_refresh_drives_clock() {
        let pending = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut refresh = Scripted {
            steps: vec![Duration::from_millis(20), Duration::from_millis(10)],
            clock_target: pending.clone(),
        };
        let mut ctx = context(CountingRenderer::default());
        let mut frame_loop = FrameLoop::new();
        while refresh.wait_for_refresh(&frame_loop.cancel_token()) {
            for step in pending.borrow_mut().drain(..) {
                ctx.clock_mut().advance(step);
            }
            let frame = frame_loop.tick(&mut ctx).unwrap();
            assert!(frame.delta > Duration::ZERO);
        }
        assert_eq!(ctx.clock().elapsed(), Duration::from_millis(30));
        assert_eq!(ctx.renderer().submissions, 2);
    }
}
