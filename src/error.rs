//! Error taxonomy of the effects pipeline.
//!
//! None of these errors is fatal to the process. Uniform errors are local and
//! get logged by the caller, a missing named child aborts only the effect it
//! belongs to, and render failures skip a single frame.

use crate::materials::{MaterialHandle, UniformKind};

#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("material '{material}' has no uniform named '{name}'")]
    UnknownUniform { material: String, name: String },

    #[error("uniform '{name}' expects a {expected:?} but got a {found:?}")]
    UniformTypeMismatch {
        name: String,
        expected: UniformKind,
        found: UniformKind,
    },

    #[error("no material registered for {0:?}")]
    UnknownMaterial(MaterialHandle),

    #[error("no child named '{0}' in the loaded scene")]
    MissingNamedChild(String),

    #[error("render submission failed: {0}")]
    RenderSubmission(String),

    #[error("asset could not be decoded: {0}")]
    AssetDecode(String),
}

impl From<wgpu::SurfaceError> for EffectError {
    fn from(e: wgpu::SurfaceError) -> Self {
        EffectError::RenderSubmission(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EffectError>;
