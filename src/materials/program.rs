//! Shader programs and their declared uniform interfaces.
//!
//! A program is static data: WGSL source, a uniform schema and the render
//! policy materials built from it start with. The schema order is also the
//! packing order of the uniform block, one 16 byte slot per uniform, so the
//! WGSL structs mirror these tables field by field.

use crate::materials::uniform::{UniformKind, UniformValue};

pub mod names {
    pub const TIME: &str = "time";
    pub const SCALE: &str = "scale";
    pub const PIXEL_RATIO: &str = "pixelRatio";
    pub const POINT_SIZE: &str = "pointSize";
    pub const LIGHT_DIRECTION: &str = "lightDirection";
    pub const BASE_COLOR: &str = "baseColor";
    pub const OUTLINE_COLOR: &str = "outlineColor";
    pub const THICKNESS: &str = "thickness";
}

/// Highest device pixel ratio the particle math is allowed to see.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformDecl {
    pub name: &'static str,
    pub default: UniformValue,
    /// Upper bound for float uniforms; larger writes are clamped to it.
    pub max: Option<f32>,
}

impl UniformDecl {
    pub fn kind(&self) -> UniformKind {
        self.default.kind()
    }

    /// `value` brought into the declared range.
    pub fn bounded(&self, value: UniformValue) -> UniformValue {
        match (value, self.max) {
            (UniformValue::Float(v), Some(max)) if v > max => UniformValue::Float(max),
            _ => value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Plain lit colour for loaded geometry without an effect.
    Basic,
    Fire,
    ParticleField,
    ToonFill,
    Outline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Blending {
    Opaque,
    Additive,
}

/// Which faces get rasterised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// Fixed render state of a material, chosen at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderPolicy {
    pub blending: Blending,
    pub depth_write: bool,
    pub side: Side,
    pub transparent: bool,
}

impl RenderPolicy {
    pub const OPAQUE: Self = Self {
        blending: Blending::Opaque,
        depth_write: true,
        side: Side::Front,
        transparent: false,
    };

    /// Soft glow: adds onto what is behind it and never occludes.
    pub const GLOW: Self = Self {
        blending: Blending::Additive,
        depth_write: false,
        side: Side::Double,
        transparent: true,
    };

    pub const BACK_FACES: Self = Self {
        side: Side::Back,
        ..Self::OPAQUE
    };
}

/// How the program consumes geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    /// Indexed triangle meshes with per-node instance data.
    Mesh,
    /// One camera-facing quad per particle.
    Particles,
}

#[derive(Debug, PartialEq)]
pub struct ShaderProgram {
    pub kind: ProgramKind,
    pub label: &'static str,
    pub source: &'static str,
    pub schema: &'static [UniformDecl],
    pub policy: RenderPolicy,
    pub topology: Topology,
}

impl ShaderProgram {
    pub fn declares(&self, name: &str) -> Option<&UniformDecl> {
        self.schema.iter().find(|decl| decl.name == name)
    }

    pub fn is_time_dependent(&self) -> bool {
        self.declares(names::TIME).is_some()
    }
}

pub static BASIC: ShaderProgram = ShaderProgram {
    kind: ProgramKind::Basic,
    label: "basic",
    source: include_str!("../pipelines/basic.wgsl"),
    schema: &[UniformDecl {
        name: names::BASE_COLOR,
        default: UniformValue::Color([0.8, 0.8, 0.8]),
        max: None,
    }],
    policy: RenderPolicy::OPAQUE,
    topology: Topology::Mesh,
};

pub static FIRE: ShaderProgram = ShaderProgram {
    kind: ProgramKind::Fire,
    label: "fire",
    source: include_str!("../pipelines/fire.wgsl"),
    schema: &[
        UniformDecl {
            name: names::TIME,
            default: UniformValue::Float(0.0),
            max: None,
        },
        UniformDecl {
            name: names::SCALE,
            default: UniformValue::Float(0.6),
            max: None,
        },
    ],
    policy: RenderPolicy::GLOW,
    topology: Topology::Mesh,
};

pub static PARTICLE_FIELD: ShaderProgram = ShaderProgram {
    kind: ProgramKind::ParticleField,
    label: "particle field",
    source: include_str!("../pipelines/particles.wgsl"),
    schema: &[
        UniformDecl {
            name: names::TIME,
            default: UniformValue::Float(0.0),
            max: None,
        },
        UniformDecl {
            name: names::PIXEL_RATIO,
            default: UniformValue::Float(1.0),
            max: Some(MAX_PIXEL_RATIO),
        },
        UniformDecl {
            name: names::POINT_SIZE,
            default: UniformValue::Float(100.0),
            max: None,
        },
    ],
    policy: RenderPolicy::GLOW,
    topology: Topology::Particles,
};

pub static TOON_FILL: ShaderProgram = ShaderProgram {
    kind: ProgramKind::ToonFill,
    label: "toon fill",
    source: include_str!("../pipelines/toon.wgsl"),
    schema: &[
        UniformDecl {
            name: names::LIGHT_DIRECTION,
            default: UniformValue::Vec3([5.0, 5.0, 5.0]),
            max: None,
        },
        UniformDecl {
            name: names::BASE_COLOR,
            default: UniformValue::Color([1.0, 1.0, 1.0]),
            max: None,
        },
    ],
    policy: RenderPolicy::OPAQUE,
    topology: Topology::Mesh,
};

pub static OUTLINE: ShaderProgram = ShaderProgram {
    kind: ProgramKind::Outline,
    label: "outline",
    source: include_str!("../pipelines/outline.wgsl"),
    schema: &[
        UniformDecl {
            name: names::LIGHT_DIRECTION,
            default: UniformValue::Vec3([5.0, 5.0, 5.0]),
            max: None,
        },
        UniformDecl {
            name: names::OUTLINE_COLOR,
            default: UniformValue::Color([0.0, 0.0, 0.0]),
            max: None,
        },
        UniformDecl {
            name: names::THICKNESS,
            default: UniformValue::Float(0.015),
            max: None,
        },
    ],
    policy: RenderPolicy::BACK_FACES,
    topology: Topology::Mesh,
};

pub fn program(kind: ProgramKind) -> &'static ShaderProgram {
    match kind {
        ProgramKind::Basic => &BASIC,
        ProgramKind::Fire => &FIRE,
        ProgramKind::ParticleField => &PARTICLE_FIELD,
        ProgramKind::ToonFill => &TOON_FILL,
        ProgramKind::Outline => &OUTLINE,
    }
}
