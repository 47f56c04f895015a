//! The wgpu implementation of [`GraphicsContext`].
//!
//! [`Context`] owns the surface, device and every GPU resource. It mirrors
//! CPU state lazily: geometry is uploaded the first time a mesh is drawn,
//! material blocks are re-uploaded only when their revision moves, and
//! pipelines are built once per program and render policy.

use std::{collections::HashMap, iter, sync::Arc};

use anyhow::Context as _;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::{CameraUniform, PerspectiveCamera},
    effects::resize,
    data_structures::{
        geometry::{GeometryRef, geometry_key},
        instance::InstanceRaw,
        particles::ParticleRaw,
        scene_graph::{NodeId, SceneGraph},
        texture::Texture,
    },
    error::Result,
    materials::{MaterialBank, ProgramKind, RenderPolicy},
    pipelines::{
        self,
        light::{LightResources, LightUniform},
        material::GpuMaterial,
    },
    render::{DrawList, DrawSource, GraphicsContext},
    settings::{Settings, ShadowSettings},
};

#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    fn new(device: &wgpu::Device) -> Self {
        let uniform = CameraUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

#[derive(Debug)]
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_elements: u32,
    // keeps the allocation alive so its key cannot be reused
    _geometry: GeometryRef,
}

/// A vertex buffer that only ever grows.
#[derive(Debug)]
struct GrowingBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: u64,
}

impl GrowingBuffer {
    fn new(device: &wgpu::Device, label: &'static str, capacity: u64) -> Self {
        Self {
            label,
            buffer: Self::allocate(device, label, capacity),
            capacity,
        }
    }

    fn allocate(device: &wgpu::Device, label: &'static str, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size.max(16),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            log::debug!("growing {} to {} bytes", self.label, capacity);
            self.buffer = Self::allocate(device, self.label, capacity);
            self.capacity = capacity;
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
    }
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub clear_colour: wgpu::Color,
    pub camera: CameraResources,
    pub light: LightResources,
    material_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<(ProgramKind, RenderPolicy), wgpu::RenderPipeline>,
    materials: Vec<GpuMaterial>,
    meshes: HashMap<usize, GpuMesh>,
    instances: GrowingBuffer,
    particles: HashMap<NodeId, GrowingBuffer>,
    logical_size: (u32, u32),
    pixel_ratio: f32,
    shadows: ShadowSettings,
    is_surface_configured: bool,
}

impl Context {
    pub async fn new(window: Arc<Window>, settings: &Settings) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable adapter")?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await
            .context("requesting device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders output linear colour and rely on an Srgb surface for the conversion.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface supports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = CameraResources::new(&device);
        let light = LightResources::new(LightUniform::from_settings(settings), &device);
        let material_layout = pipelines::material::mk_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Effect Pipeline Layout"),
            bind_group_layouts: &[
                &camera.bind_group_layout,
                &light.bind_group_layout,
                &material_layout,
            ],
            push_constant_ranges: &[],
        });

        let depth_texture = Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );
        let instances = GrowingBuffer::new(
            &device,
            "Instance Buffer",
            64 * std::mem::size_of::<InstanceRaw>() as u64,
        );
        let scale = window.scale_factor() as f32;
        let logical = size.to_logical::<u32>(scale as f64);

        let mut ctx = Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            clear_colour: settings.clear_colour,
            camera,
            light,
            material_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            materials: Vec::new(),
            meshes: HashMap::new(),
            instances,
            particles: HashMap::new(),
            logical_size: (logical.width, logical.height),
            pixel_ratio: scale.min(settings.max_pixel_ratio),
            shadows: settings.shadows,
            is_surface_configured: false,
        };
        ctx.configure_surface();
        Ok(ctx)
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Applies the current window size to the surface and the depth buffer.
    ///
    /// The surface always matches the window's physical size. The clamped
    /// pixel ratio only shapes the drawing-buffer resolution handed to the
    /// shaders, so sprite sizes do not depend on the device ratio.
    pub fn configure_surface(&mut self) {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            self.is_surface_configured = false;
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = Texture::create_depth_texture(
            &self.device,
            [self.config.width, self.config.height],
            "depth_texture",
        );
        self.is_surface_configured = true;
    }

    fn sync_materials(&mut self, materials: &MaterialBank) {
        for (handle, material) in materials.iter() {
            match self.materials.get_mut(handle.index()) {
                Some(gpu) => gpu.sync(&self.queue, material),
                None => self.materials.push(GpuMaterial::new(
                    &self.device,
                    &self.material_layout,
                    material,
                )),
            }
            let key = (material.program().kind, material.policy());
            if !self.pipelines.contains_key(&key) {
                log::debug!("building {} pipeline for {:?}", material.program().label, key.1);
                let pipeline = pipelines::basic::mk_effect_pipeline(
                    &self.device,
                    &self.pipeline_layout,
                    self.config.format,
                    material.program(),
                    material.policy(),
                );
                self.pipelines.insert(key, pipeline);
            }
        }
    }

    fn upload_mesh(&mut self, geometry: &GeometryRef) {
        let key = geometry_key(geometry);
        if self.meshes.contains_key(&key) || geometry.is_empty() {
            return;
        }
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Vertex Buffer", geometry.name)),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Index Buffer", geometry.name)),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.meshes.insert(
            key,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                num_elements: geometry.indices.len() as u32,
                _geometry: geometry.clone(),
            },
        );
    }

    /// Uploads per-frame data for `list`: mesh buffers, the instance buffer
    /// (one record per mesh draw, in draw order) and world-space particles.
    fn prepare(&mut self, list: &DrawList) {
        let mut instance_data = Vec::new();
        for draw in list.iter() {
            match &draw.source {
                DrawSource::Mesh(geometry) => {
                    self.upload_mesh(geometry);
                    instance_data.push(draw.world.to_raw());
                }
                DrawSource::Points(particles) => {
                    let model = draw.world.to_matrix();
                    let raw: Vec<ParticleRaw> = particles
                        .to_raw()
                        .into_iter()
                        .map(|mut record| {
                            let p = model * cgmath::Vector4::new(
                                record.position[0],
                                record.position[1],
                                record.position[2],
                                1.0,
                            );
                            record.position = [p.x, p.y, p.z];
                            record
                        })
                        .collect();
                    let device = &self.device;
                    let buffer = self.particles.entry(draw.node).or_insert_with(|| {
                        GrowingBuffer::new(
                            device,
                            "Particle Buffer",
                            (raw.len() * std::mem::size_of::<ParticleRaw>()) as u64,
                        )
                    });
                    buffer.write(&self.device, &self.queue, bytemuck::cast_slice(&raw));
                }
            }
        }
        self.instances
            .write(&self.device, &self.queue, bytemuck::cast_slice(&instance_data));
    }
}

impl GraphicsContext for Context {
    fn render(
        &mut self,
        scene: &SceneGraph,
        materials: &MaterialBank,
        camera: &PerspectiveCamera,
    ) -> Result<()> {
        if !self.is_surface_configured {
            return Ok(());
        }

        let (logical_width, logical_height) = self.logical_size;
        let (width, height) =
            resize::drawing_buffer_size(logical_width, logical_height, self.pixel_ratio);
        self.camera.uniform.update(camera, width, height);
        self.queue.write_buffer(
            &self.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.camera.uniform]),
        );
        self.sync_materials(materials);
        let list = DrawList::collect(scene, materials);
        self.prepare(&list);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.configure_surface();
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                ..Default::default()
            });

            render_pass.set_bind_group(0, &self.camera.bind_group, &[]);
            render_pass.set_bind_group(1, &self.light.bind_group, &[]);
            render_pass.set_vertex_buffer(1, self.instances.buffer.slice(..));

            let mut instance_index = 0u32;
            let mut bound: Option<(ProgramKind, RenderPolicy)> = None;
            for draw in list.iter() {
                // instance records were written one per mesh draw, in this order
                let instance = match draw.source {
                    DrawSource::Mesh(_) => {
                        instance_index += 1;
                        instance_index - 1
                    }
                    DrawSource::Points(_) => instance_index,
                };
                let Some(material) = materials.get(draw.material) else {
                    continue;
                };
                let key = (material.program().kind, material.policy());
                let (Some(pipeline), Some(gpu_material)) =
                    (self.pipelines.get(&key), self.materials.get(draw.material.index()))
                else {
                    continue;
                };
                if bound != Some(key) {
                    render_pass.set_pipeline(pipeline);
                    bound = Some(key);
                }
                render_pass.set_bind_group(2, &gpu_material.bind_group, &[]);

                match &draw.source {
                    DrawSource::Mesh(geometry) => {
                        let Some(mesh) = self.meshes.get(&geometry_key(geometry)) else {
                            continue;
                        };
                        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                        render_pass.set_index_buffer(
                            mesh.index_buffer.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        render_pass.draw_indexed(0..mesh.num_elements, 0, instance..instance + 1);
                    }
                    DrawSource::Points(particles) => {
                        let Some(buffer) = self.particles.get(&draw.node) else {
                            continue;
                        };
                        if particles.is_empty() {
                            continue;
                        }
                        render_pass.set_vertex_buffer(0, buffer.buffer.slice(..));
                        render_pass.draw(0..6, 0..particles.len() as u32);
                    }
                }
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.logical_size = (width, height);
        self.configure_surface();
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    fn set_shadows(&mut self, shadows: ShadowSettings) {
        if shadows != self.shadows {
            log::info!("shadow maps {:?}", shadows);
        }
        self.shadows = shadows;
    }
}
