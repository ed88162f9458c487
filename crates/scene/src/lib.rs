//! Scene graph for the lightbox demo.
//!
//! # Invariants
//! - A scene is populated exactly once, by [`SceneBuilder`].
//! - The light rig is immutable after population; there is no mutation API.
//! - Mesh iteration order is deterministic (BTreeMap keyed by [`EntityId`]).
//!
//! [`EntityId`]: lightbox_common::EntityId

mod builder;
mod graph;
mod light;

pub use builder::{SceneBuilder, SceneSettings, ShadowSettings};
pub use graph::{EntityRole, Geometry, Helper, Material, Mesh, Scene, SceneError};
pub use light::{LightKind, LightRigEntry, ShadowParams};
