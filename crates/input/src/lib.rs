//! Input: raw pointer and key input mapped to host-agnostic actions.
//!
//! # Invariants
//! - Hosts translate their native events into [`PointerButton`] / key names;
//!   everything downstream consumes [`Action`]s only.
//! - Actions move the camera pose; they never touch the projection or scene.

pub mod action;
pub mod pointer;

pub use action::{Action, apply_camera_action};
pub use pointer::{PointerButton, PointerTracker};
