//! CPU-side mesh geometry shared between scene nodes.
//!
//! Geometry is immutable once built and always handed around as
//! [`GeometryRef`]. Two nodes draw the same buffers exactly when their refs
//! point at the same allocation, which is what the outline pass relies on.

use std::sync::Arc;

/// Anything that can describe its own vertex buffer layout.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    /// Base colour factor of the source material, if the asset had one.
    pub base_color: Option<[f32; 4]>,
}

pub type GeometryRef = Arc<Geometry>;

impl Geometry {
    pub fn new(name: impl Into<String>, vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
            base_color: None,
        }
    }

    /// Unit quad in the XY plane facing +Z, handy for sprites and tests.
    pub fn quad(name: impl Into<String>) -> Self {
        let corner = |x: f32, y: f32| ModelVertex {
            position: [x - 0.5, y - 0.5, 0.0],
            tex_coords: [x, 1.0 - y],
            normal: [0.0, 0.0, 1.0],
        };
        Self::new(
            name,
            vec![
                corner(0.0, 0.0),
                corner(1.0, 0.0),
                corner(1.0, 1.0),
                corner(0.0, 1.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    pub fn into_ref(self) -> GeometryRef {
        Arc::new(self)
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Identity key of a shared geometry, stable for as long as the geometry lives.
pub fn geometry_key(geometry: &GeometryRef) -> usize {
    Arc::as_ptr(geometry) as usize
}
