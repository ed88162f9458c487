//! wgpu render backend for the lightbox demo.
//!
//! Draws the scene's meshes with ambient + directional lighting and a PCF
//! directional shadow map, plus line helpers, then hands the frame to an
//! optional overlay (the debug UI) before presenting.
//!
//! # Invariants
//! - The renderer never mutates the scene or camera.
//! - One queue submission per frame; overlays record into the same encoder.
//! - The shadow map is only re-rendered on request (and after creation).

mod gpu;
mod mesh;
mod shaders;
mod shadow;
mod surface;

pub use gpu::WgpuRenderer;
pub use surface::{GpuContext, GpuInitError, GpuOptions, NoOverlay, OverlayPass, SurfaceRenderer};
