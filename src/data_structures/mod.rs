//! Engine data structures: geometry, particles, transforms and the scene graph.
//!
//! - `geometry` holds CPU-side meshes shared between nodes
//! - `particles` generates the firefly field
//! - `instance` holds per-node transforms and their GPU layout
//! - `scene_graph` is the arena that owns every node
//! - `texture` wraps render-target textures

pub mod geometry;
pub mod instance;
pub mod particles;
pub mod scene_graph;
pub mod texture;
