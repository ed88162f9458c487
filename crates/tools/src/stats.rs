use std::collections::VecDeque;
use std::time::Duration;

const HISTORY_LEN: usize = 90;
const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Frame statistics backing the stats overlay.
///
/// FPS is measured over whole one-second windows, so it stays readable
/// instead of flickering every frame. Frame time is the latest delta.
#[derive(Debug, Clone)]
pub struct FrameStats {
    frames: u64,
    elapsed: Duration,
    window_frames: u32,
    window_time: Duration,
    fps: f32,
    min_fps: f32,
    max_fps: f32,
    last_delta: Duration,
    history: VecDeque<f32>,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            frames: 0,
            elapsed: Duration::ZERO,
            window_frames: 0,
            window_time: Duration::ZERO,
            fps: 0.0,
            min_fps: f32::INFINITY,
            max_fps: 0.0,
            last_delta: Duration::ZERO,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one rendered frame that took `delta` since the previous one.
    pub fn record(&mut self, delta: Duration) {
        self.frames += 1;
        self.elapsed += delta;
        self.last_delta = delta;

        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(delta.as_secs_f32() * 1000.0);

        self.window_frames += 1;
        self.window_time += delta;
        if self.window_time >= FPS_WINDOW {
            self.fps = self.window_frames as f32 / self.window_time.as_secs_f32();
            self.min_fps = self.min_fps.min(self.fps);
            self.max_fps = self.max_fps.max(self.fps);
            self.window_frames = 0;
            self.window_time = Duration::ZERO;
        }
    }

    /// Total frames recorded.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames per second over the last completed window; 0 before the first.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Frames over all recorded time. Meaningful before the first window
    /// completes, so short runs report this instead of [`fps`](Self::fps).
    pub fn average_fps(&self) -> f32 {
        if self.elapsed.is_zero() {
            return 0.0;
        }
        self.frames as f32 / self.elapsed.as_secs_f32()
    }

    /// Lowest and highest windowed FPS seen, once a window has completed.
    pub fn fps_range(&self) -> Option<(f32, f32)> {
        (self.max_fps > 0.0).then_some((self.min_fps, self.max_fps))
    }

    pub fn frame_ms(&self) -> f32 {
        self.last_delta.as_secs_f32() * 1000.0
    }

    /// Recent frame times in milliseconds, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }
}
