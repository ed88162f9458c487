use lightbox_render::RenderInfo;
use std::time::Duration;

/// Logs renderer counters at a fixed interval instead of every frame.
#[derive(Debug, Clone)]
pub struct RenderInfoLog {
    interval: Duration,
    last_logged: Option<Duration>,
    latest: RenderInfo,
}

impl Default for RenderInfoLog {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl RenderInfoLog {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_logged: None,
            latest: RenderInfo::default(),
        }
    }

    pub fn latest(&self) -> RenderInfo {
        self.latest
    }

    /// Record the counters of a frame finished at clock time `now`.
    /// Returns `true` when a log line was emitted.
    pub fn observe(&mut self, now: Duration, info: RenderInfo) -> bool {
        self.latest = info;
        let due = match self.last_logged {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        };
        if due {
            self.last_logged = Some(now);
            tracing::debug!(
                draw_calls = info.draw_calls,
                triangles = info.triangles,
                "render info"
            );
        }
        due
    }
}
