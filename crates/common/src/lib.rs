//! Shared value types used across the lightbox workspace.

mod color;
mod types;

pub use color::{Color, ParseColorError};
pub use types::{EntityId, SurfaceSize, Transform};
