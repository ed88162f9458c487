//! Frame lifecycle kernel: device context, frame loop, resize coordination.
//!
//! # Invariants
//! - One [`DeviceContext`] per host, owned by the host and passed by reference.
//! - The frame loop only reads scene and camera; it submits exactly one
//!   render per tick and never retries a failed one.
//! - After every applied resize, camera aspect == renderer width / height.
//!   Degenerate sizes are deferred and change nothing.

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod frame_loop;
pub mod resize;
pub mod surface;

pub use clock::{ManualClock, SystemClock, Timer};
pub use config::{CameraConfig, LightboxConfig, WindowConfig};
pub use context::DeviceContext;
pub use error::{ConfigError, StartupError};
pub use frame_loop::{CancelToken, FrameLoop, FrameState, IntervalRefresh, RefreshSource};
pub use resize::{apply_size, ResizeCoordinator, ResizeObserver, ResizeOutcome};
pub use surface::{SharedSurface, SurfaceBinding, SurfaceHost};
