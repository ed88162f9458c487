//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene and camera; they never mutate either.
//! - A camera's projection matrix only changes through
//!   [`PerspectiveCamera::update_projection_matrix`].
//!
//! The wgpu backend lives in `lightbox-render-wgpu`; [`DebugTextRenderer`]
//! implements the same trait for headless runs and tests.

mod camera;
mod controls;
mod renderer;

pub use camera::PerspectiveCamera;
pub use controls::OrbitControls;
pub use renderer::{DebugTextRenderer, RenderError, RenderInfo, Renderer};
