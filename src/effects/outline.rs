//! Cel-shaded silhouettes by mesh duplication.
//!
//! Every mesh under a root gets the toon fill material and a sibling that
//! draws the same geometry with the outline material. The outline program
//! pushes vertices out along their normals and only rasterises back faces,
//! so the sibling shows up as a dark rim around the fill.

use crate::{
    data_structures::scene_graph::{Node, NodeId, SceneGraph},
    materials::MaterialHandle,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutlineOptions {
    /// Uniform scale applied to the outline copy on top of the source scale.
    /// Outline width normally comes from the `thickness` uniform alone.
    pub scale_multiplier: f32,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            scale_multiplier: 1.0,
        }
    }
}

/// A mesh and the outline node derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutlinePair {
    pub source: NodeId,
    pub outline: NodeId,
}

/// Assigns `fill` to every mesh under `root` and adds one outline sibling per
/// mesh.
///
/// The outline copies the source transform as it is now; later changes to
/// the source are not mirrored. A subtree without meshes is left untouched.
pub fn apply_outline(
    scene: &mut SceneGraph,
    root: NodeId,
    fill: MaterialHandle,
    outline: MaterialHandle,
    options: &OutlineOptions,
) -> Vec<OutlinePair> {
    // collect first so the new siblings are not visited
    let sources = scene.mesh_nodes(root);
    let mut pairs = Vec::with_capacity(sources.len());
    for source in sources {
        let Some(node) = scene.node(source) else {
            continue;
        };
        let Some(geometry) = node.geometry().cloned() else {
            continue;
        };
        let copy = Node::mesh(format!("{}.outline", node.name), geometry, Some(outline))
            .with_transform(node.local.scaled_by(options.scale_multiplier));
        let parent = node.parent();

        scene.set_material(source, fill);
        let outline = scene.attach(parent, copy);
        pairs.push(OutlinePair { source, outline });
    }
    log::debug!("outlined {} meshes", pairs.len());
    pairs
}
