//! Procedural particle field (the fireflies).
//!
//! The field is generated once and never touched again. Animation happens in
//! the vertex shader, driven by the `time` uniform of the particle material.

use rand::Rng;

/// Volume the particles are scattered in.
///
/// X and Z are centred on `center` and spread `spread` wide, Y starts at the
/// ground and goes up `height_span`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleBounds {
    pub center_x: f32,
    pub center_z: f32,
    pub spread_x: f32,
    pub spread_z: f32,
    pub height_span: f32,
}

impl Default for ParticleBounds {
    fn default() -> Self {
        Self {
            center_x: 0.4,
            center_z: 0.7,
            spread_x: 0.2,
            spread_z: 0.2,
            height_span: 2.0,
        }
    }
}

impl ParticleBounds {
    /// Whether `p` lies inside the volume the generator draws from, allowing
    /// for f32 rounding at the edges.
    pub fn contains(&self, p: [f32; 3]) -> bool {
        const TOLERANCE: f32 = 1e-5;
        let half_x = self.spread_x.abs() * 0.5 + TOLERANCE;
        let half_z = self.spread_z.abs() * 0.5 + TOLERANCE;
        (p[0] - self.center_x).abs() <= half_x
            && (-TOLERANCE..=self.height_span.max(0.0) + TOLERANCE).contains(&p[1])
            && (p[2] - self.center_z).abs() <= half_z
    }
}

/// Two parallel arrays: `positions[i]` and `scales[i]` describe particle `i`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleBuffer {
    positions: Vec<[f32; 3]>,
    scales: Vec<f32>,
}

impl ParticleBuffer {
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Interleaved `[x, y, z, scale]` records, the layout of the GPU buffer.
    pub fn to_raw(&self) -> Vec<ParticleRaw> {
        self.positions
            .iter()
            .zip(&self.scales)
            .map(|(&position, &scale)| ParticleRaw { position, scale })
            .collect()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleRaw {
    pub position: [f32; 3],
    pub scale: f32,
}

impl crate::data_structures::geometry::Vertex for ParticleRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ParticleRaw>() as wgpu::BufferAddress,
            // one quad per particle
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

/// Scatters `count` particles with the thread-local rng.
pub fn generate(count: usize, bounds: &ParticleBounds) -> ParticleBuffer {
    generate_with(&mut rand::thread_rng(), count, bounds)
}

/// Scatters `count` particles drawing from `rng`.
pub fn generate_with<R: Rng>(
    rng: &mut R,
    count: usize,
    bounds: &ParticleBounds,
) -> ParticleBuffer {
    let mut positions = Vec::with_capacity(count);
    let mut scales = Vec::with_capacity(count);
    for _ in 0..count {
        let x = bounds.center_x + (rng.gen_range(0.0f32..1.0) - 0.5) * bounds.spread_x;
        let y = rng.gen_range(0.0f32..1.0) * bounds.height_span;
        let z = bounds.center_z + (rng.gen_range(0.0f32..1.0) - 0.5) * bounds.spread_z;
        positions.push([x, y, z]);
        scales.push(rng.gen_range(0.0f32..1.0));
    }
    ParticleBuffer { positions, scales }
}
