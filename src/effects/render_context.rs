//! Everything a frame needs, in one place.
//!
//! [`RenderContext`] owns the scene, the material bank, the camera and the
//! frame and viewport state. The frame updater, the resize handlers and the
//! asset attach step all borrow it explicitly; there are no globals.

use std::sync::Arc;

use cgmath::{Quaternion, Rad, Rotation3};

use crate::{
    animation::{AnimationMixer, KeyframeMixer},
    camera::PerspectiveCamera,
    data_structures::{
        instance::Instance,
        particles,
        scene_graph::{Node, NodeId, SceneGraph},
    },
    effects::{
        fire,
        outline::{self, OutlineOptions, OutlinePair},
        resize::ViewportState,
    },
    error::Result,
    materials::{MaterialBank, MaterialHandle},
    resources::LoadedAsset,
    settings::Settings,
    time::FrameState,
};

/// Handles of the materials the effects own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectHandles {
    pub fire: Option<MaterialHandle>,
    pub particles: Option<MaterialHandle>,
    pub toon_fill: Option<MaterialHandle>,
    pub outline: Option<MaterialHandle>,
}

pub struct RenderContext {
    pub scene: SceneGraph,
    pub materials: MaterialBank,
    pub camera: PerspectiveCamera,
    pub frame: FrameState,
    pub viewport: ViewportState,
    pub effects: EffectHandles,
    /// One mixer per animated asset; empty until an asset with clips arrives.
    pub mixers: Vec<Box<dyn AnimationMixer>>,
    root: NodeId,
    fireflies: Option<NodeId>,
    basic_materials: Vec<([u32; 3], MaterialHandle)>,
}

impl RenderContext {
    /// An empty scene with no effects and no materials.
    pub fn empty(settings: &Settings, viewport: ViewportState) -> Self {
        let mut scene = SceneGraph::new();
        let root = scene.add_root(Node::group("scene"));
        Self {
            scene,
            materials: MaterialBank::new(),
            camera: PerspectiveCamera::new(&settings.camera, viewport.aspect()),
            frame: FrameState::new(),
            viewport,
            effects: EffectHandles::default(),
            mixers: Vec::new(),
            root,
            fireflies: None,
            basic_materials: Vec::new(),
        }
    }

    /// The campfire scene: effect materials created, fireflies in place,
    /// loaded assets still to come.
    pub fn new(settings: &Settings, viewport: ViewportState) -> Result<Self> {
        let mut ctx = Self::empty(settings, viewport);
        let pixel_ratio = ctx.viewport.pixel_ratio();

        ctx.effects = EffectHandles {
            fire: Some(ctx.materials.fire(settings.fire.scale)?),
            particles: Some(
                ctx.materials
                    .particle_field(pixel_ratio, settings.particles.point_size)?,
            ),
            toon_fill: Some(
                ctx.materials
                    .toon_fill(settings.toon.light_direction, settings.toon.base_color)?,
            ),
            outline: Some(ctx.materials.outline(
                settings.toon.light_direction,
                settings.toon.outline_color,
                settings.toon.thickness,
            )?),
        };

        if let Some(field) = ctx.effects.particles {
            let buffer = particles::generate(settings.particles.count, &settings.particles.bounds);
            log::info!("scattered {} fireflies", buffer.len());
            let root = ctx.root;
            ctx.fireflies = Some(
                ctx.scene
                    .add_child(root, Node::points("fireflies", Arc::new(buffer), field)),
            );
        }
        Ok(ctx)
    }

    /// Parent of everything in the scene.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn fireflies(&self) -> Option<NodeId> {
        self.fireflies
    }

    /// Grafts `asset` under the scene root inside a group rotated by
    /// `rotation_y` radians, and starts playing its clips. Returns the group.
    pub fn attach_asset(&mut self, asset: LoadedAsset, rotation_y: f32) -> NodeId {
        let LoadedAsset {
            name,
            scene,
            mut clips,
        } = asset;
        let holder = Node::group(name).with_transform(Instance {
            rotation: Quaternion::from_angle_y(Rad(rotation_y)),
            ..Instance::new()
        });
        let holder = self.scene.add_child(self.root, holder);
        let offset = self.scene.len();
        self.scene.graft(Some(holder), scene);

        if !clips.is_empty() {
            for clip in &mut clips {
                clip.rebase(offset);
            }
            self.mixers.push(Box::new(KeyframeMixer::new(clips)));
        }
        holder
    }

    /// Attaches the scene asset and puts the fire material on its fire
    /// targets. Remaining meshes get a plain material in their own colour.
    ///
    /// A missing fire target is returned as an error after the asset has
    /// been attached; the scene is shown without the fire.
    pub fn attach_scene_asset(&mut self, asset: LoadedAsset, settings: &Settings) -> Result<NodeId> {
        let holder = self.attach_asset(asset, settings.asset_rotation_y);
        let fire = match self.effects.fire {
            Some(material) => fire::assign_by_name(
                &mut self.scene,
                holder,
                &settings.fire.targets,
                material,
            )
            .map(|_| ()),
            None => Ok(()),
        };
        self.assign_basic_materials(holder)?;
        fire.map(|()| holder)
    }

    /// Attaches an asset drawn toon-shaded with outlines.
    pub fn attach_outlined_asset(
        &mut self,
        asset: LoadedAsset,
        settings: &Settings,
    ) -> Result<Vec<OutlinePair>> {
        let holder = self.attach_asset(asset, settings.asset_rotation_y);
        let (Some(fill), Some(edge)) = (self.effects.toon_fill, self.effects.outline) else {
            self.assign_basic_materials(holder)?;
            return Ok(Vec::new());
        };
        let options = OutlineOptions {
            scale_multiplier: settings.toon.scale_multiplier,
        };
        Ok(outline::apply_outline(
            &mut self.scene,
            holder,
            fill,
            edge,
            &options,
        ))
    }

    /// Gives every mesh under `root` that has no material yet a basic
    /// material, shared between meshes of the same colour.
    fn assign_basic_materials(&mut self, root: NodeId) -> Result<()> {
        for mesh in self.scene.mesh_nodes(root) {
            let Some(node) = self.scene.node(mesh) else {
                continue;
            };
            if node.material().is_some() {
                continue;
            }
            let color = node
                .geometry()
                .and_then(|geometry| geometry.base_color)
                .map(|[r, g, b, _]| [r, g, b])
                .unwrap_or([0.8, 0.8, 0.8]);
            let handle = self.basic_material(color)?;
            self.scene.set_material(mesh, handle);
        }
        Ok(())
    }

    fn basic_material(&mut self, color: [f32; 3]) -> Result<MaterialHandle> {
        let key = color.map(f32::to_bits);
        if let Some((_, handle)) = self.basic_materials.iter().find(|(k, _)| *k == key) {
            return Ok(*handle);
        }
        let handle = self.materials.basic(color)?;
        self.basic_materials.push((key, handle));
        Ok(handle)
    }
}
