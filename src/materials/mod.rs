//! Effect materials: shader programs, typed uniforms and the bank that owns
//! every material instance.
//!
//! - `program` declares the WGSL programs, their uniform schemas and render policies
//! - `uniform` holds the typed uniform values and the ordered uniform map
//! - `bank` creates materials and validates uniform writes

pub mod bank;
pub mod program;
pub mod uniform;

pub use bank::{Material, MaterialBank, MaterialHandle};
pub use program::{Blending, ProgramKind, RenderPolicy, ShaderProgram, Side, Topology, names};
pub use uniform::{TextureHandle, UniformKind, UniformMap, UniformValue};
