//! Render pipelines and the GPU side of materials and lights.
//!
//! - `basic` builds a pipeline for any program and render policy
//! - `light` holds the shared light uniform
//! - `material` mirrors material uniform blocks on the GPU
//!
//! The WGSL sources next to these files are compiled into the binary through
//! the program table in `materials::program`.

pub mod basic;
pub mod light;
pub mod material;
