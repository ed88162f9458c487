//! Developer tooling: frame statistics for the stats overlay, a read-only
//! scene inspector, and throttled render-info logging.
//!
//! # Invariants
//! - Tools only read scene state.

mod info_log;
mod inspector;
mod stats;

pub use info_log::RenderInfoLog;
pub use inspector::{LightInfo, SceneInspector, SceneSummary};
pub use stats::FrameStats;
