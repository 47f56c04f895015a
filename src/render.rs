//! Render composition and pipeline batching.
//!
//! [`GraphicsContext`] is the seam between scene logic and the GPU: the frame
//! updater and resize handling only ever talk to this trait. [`DrawList`]
//! walks the scene once per frame and sorts every drawable node into the
//! opaque or the transparent batch, resolving world transforms on the way.
//!
//! # Key types
//!
//! - [`Draw`] is one drawable node with its world transform and material
//! - [`DrawList`] is the batched frame, opaque draws first
//!

use std::sync::Arc;

use crate::{
    camera::PerspectiveCamera,
    data_structures::{
        geometry::GeometryRef,
        instance::Instance,
        particles::ParticleBuffer,
        scene_graph::{NodeId, NodeKind, SceneGraph},
    },
    error::Result,
    materials::{MaterialBank, MaterialHandle},
    settings::ShadowSettings,
};

/// The rendering backend as seen by the rest of the engine.
pub trait GraphicsContext {
    /// Draws one frame of `scene` as seen by `camera`.
    fn render(
        &mut self,
        scene: &SceneGraph,
        materials: &MaterialBank,
        camera: &PerspectiveCamera,
    ) -> Result<()>;

    /// Resizes the render target, in logical pixels.
    fn set_size(&mut self, width: u32, height: u32);

    fn set_pixel_ratio(&mut self, ratio: f32);

    fn set_shadows(&mut self, shadows: ShadowSettings);
}

/// What a draw feeds to the pipeline.
#[derive(Clone, Debug)]
pub enum DrawSource {
    Mesh(GeometryRef),
    Points(Arc<ParticleBuffer>),
}

#[derive(Clone, Debug)]
pub struct Draw {
    pub node: NodeId,
    pub material: MaterialHandle,
    pub source: DrawSource,
    pub world: Instance,
}

/// One frame worth of draws, split by blending.
#[derive(Debug, Default)]
pub struct DrawList {
    pub opaque: Vec<Draw>,
    pub transparent: Vec<Draw>,
}

impl DrawList {
    /// Collects every node that has both something to draw and a material
    /// the bank knows about. Meshes without a material are skipped.
    pub fn collect(scene: &SceneGraph, materials: &MaterialBank) -> Self {
        let world = scene.world_transforms();
        let mut list = DrawList::default();
        for root in scene.roots() {
            for id in scene.descendants(*root) {
                let Some(node) = scene.node(id) else {
                    continue;
                };
                let (source, handle) = match &node.kind {
                    NodeKind::Mesh {
                        geometry,
                        material: Some(handle),
                    } => (DrawSource::Mesh(geometry.clone()), *handle),
                    NodeKind::Points {
                        particles,
                        material,
                    } => (DrawSource::Points(particles.clone()), *material),
                    _ => continue,
                };
                let Some(material) = materials.get(handle) else {
                    log::warn!("node {:?} uses unknown material {:?}", id, handle);
                    continue;
                };
                let draw = Draw {
                    node: id,
                    material: handle,
                    source,
                    world: world[id.index()],
                };
                if material.policy().transparent {
                    list.transparent.push(draw);
                } else {
                    list.opaque.push(draw);
                }
            }
        }
        // group opaque draws by material to cut pipeline and bind group switches
        list.opaque.sort_by_key(|draw| draw.material);
        list
    }

    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opaque draws followed by transparent ones, the submission order.
    pub fn iter(&self) -> impl Iterator<Item = &Draw> {
        self.opaque.iter().chain(self.transparent.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{geometry::Geometry, particles, scene_graph::Node};

    #[test]
    fn transparent_draws_come_last() {
        let mut materials = MaterialBank::new();
        let fire = materials.fire(0.6).unwrap();
        let basic = materials.basic([0.5, 0.5, 0.5]).unwrap();
        let mut scene = SceneGraph::new();
        let root = scene.add_root(Node::group("root"));
        scene.add_child(root, Node::mesh("flame", Geometry::quad("q").into_ref(), Some(fire)));
        scene.add_child(root, Node::mesh("log", Geometry::quad("q").into_ref(), Some(basic)));
        scene.add_child(root, Node::mesh("bare", Geometry::quad("q").into_ref(), None));

        let list = DrawList::collect(&scene, &materials);
        let order: Vec<_> = list.iter().map(|draw| draw.material).collect();
        assert_eq!(order, [basic, fire]);
    }

    #[test]
    fn points_are_drawn_with_their_material() {
        let mut materials = MaterialBank::new();
        let field = materials.particle_field(1.0, 100.0).unwrap();
        let mut scene = SceneGraph::new();
        let buffer = Arc::new(particles::generate(4, &Default::default()));
        scene.add_root(Node::points("fireflies", buffer, field));
        let list = DrawList::collect(&scene, &materials);
        assert_eq!(list.transparent.len(), 1);
        assert!(matches!(list.transparent[0].source, DrawSource::Points(_)));
    }
}
