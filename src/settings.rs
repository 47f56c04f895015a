//! Scene configuration.
//!
//! All knobs live in [`Settings`]. The defaults reproduce the campfire forest
//! scene; applications tweak them in code before handing them to
//! [`crate::flow::run`]. Nothing is read from or written to disk.

use std::f32::consts::{FRAC_PI_2, PI};

use crate::{data_structures::particles::ParticleBounds, materials::program::MAX_PIXEL_RATIO};

/// A directional light contributing to the basic material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Shadow-map flags forwarded to the graphics context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadowSettings {
    pub enabled: bool,
    pub kind: ShadowKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowKind {
    Basic,
    Pcf,
    PcfSoft,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: ShadowKind::PcfSoft,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CameraSettings {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub damping: Option<f32>,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_y_deg: 50.0,
            near: 0.1,
            far: 100.0,
            position: [0.0, 15.0, 20.0],
            target: [0.0, 1.0, 0.0],
            damping: Some(0.05),
            min_polar_angle: 0.0,
            max_polar_angle: FRAC_PI_2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FireSettings {
    pub scale: f32,
    /// Names of the loaded meshes that receive the fire material.
    pub targets: Vec<String>,
}

impl Default for FireSettings {
    fn default() -> Self {
        Self {
            scale: 0.6,
            targets: vec!["FireA".to_string(), "FireB".to_string()],
        }
    }
}

#[derive(Clone, Debug)]
pub struct ParticleSettings {
    pub count: usize,
    pub bounds: ParticleBounds,
    pub point_size: f32,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            count: 40,
            bounds: ParticleBounds::default(),
            point_size: 100.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ToonSettings {
    pub light_direction: [f32; 3],
    pub base_color: [f32; 3],
    pub outline_color: [f32; 3],
    pub thickness: f32,
    pub scale_multiplier: f32,
}

impl Default for ToonSettings {
    fn default() -> Self {
        Self {
            light_direction: [5.0, 5.0, 5.0],
            base_color: [0.85, 0.55, 0.35],
            outline_color: [0.0, 0.0, 0.0],
            thickness: 0.015,
            scale_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub clear_colour: wgpu::Color,
    pub max_pixel_ratio: f32,
    pub camera: CameraSettings,
    pub ambient: f32,
    pub lights: [DirectionalLight; 2],
    pub shadows: ShadowSettings,
    pub fire: FireSettings,
    pub particles: ParticleSettings,
    pub toon: ToonSettings,
    /// Asset carrying the fire targets.
    pub scene_asset: Option<String>,
    /// Asset that is rendered toon-shaded with outlines.
    pub outline_asset: Option<String>,
    /// Rotation around Y applied to every loaded asset root.
    pub asset_rotation_y: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // #16221f
            clear_colour: wgpu::Color {
                r: 0x16 as f64 / 255.0,
                g: 0x22 as f64 / 255.0,
                b: 0x1f as f64 / 255.0,
                a: 1.0,
            },
            max_pixel_ratio: MAX_PIXEL_RATIO,
            camera: CameraSettings::default(),
            ambient: 1.0,
            lights: [
                DirectionalLight {
                    position: [5.0, 5.0, 5.0],
                    color: [1.0, 1.0, 1.0],
                    intensity: 2.0,
                },
                DirectionalLight {
                    position: [5.0, 5.0, -5.0],
                    color: [1.0, 1.0, 1.0],
                    intensity: 2.0,
                },
            ],
            shadows: ShadowSettings::default(),
            fire: FireSettings::default(),
            particles: ParticleSettings::default(),
            toon: ToonSettings::default(),
            scene_asset: Some("forest.glb".to_string()),
            outline_asset: None,
            asset_rotation_y: PI,
        }
    }
}
