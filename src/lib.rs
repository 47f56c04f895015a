//! campfire-ngin
//!
//! A small cross-platform effects renderer for native and WASM targets. A
//! loaded glTF scene gets a procedural fire material on named meshes, a
//! field of instanced firefly sprites, and toon shading with inflated-hull
//! outlines. Everything above the GPU (scene graph, material bank, frame
//! loop, resize handling) is plain data behind small traits, so the effects
//! run and test without a device.
//!
//! High-level modules
//! - `animation`: keyframe clips and the mixers that advance them
//! - `camera`: perspective camera, orbit controls and the camera uniform
//! - `context`: GPU and window context that owns device, queue and pipelines
//! - `data_structures`: scene graph, geometry, instances and particle data
//! - `effects`: fire, fireflies, outlines, resize handling and the frame tick
//! - `error`: the error type shared by the effects pipeline
//! - `flow`: the winit application loop driving everything
//! - `materials`: shader programs, uniform schemas and the material bank
//! - `pipelines`: render pipelines and GPU mirrors of materials and lights
//! - `render`: the graphics seam and draw-list collection
//! - `resources`: asynchronous glTF loading
//! - `settings`: every tunable knob with the forest scene as default
//! - `time`: clocks and per-frame timing

pub mod animation;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod effects;
pub mod error;
pub mod flow;
pub mod materials;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod settings;
pub mod time;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use error::{EffectError, Result};
pub use settings::Settings;
pub use winit::event::WindowEvent;
