//! Asset loading.
//!
//! glTF files are decoded into a detached [`SceneGraph`] plus the animation
//! clips that drive it. Nothing here touches the GPU: geometry stays on the
//! CPU until the renderer first draws it. The live scene only changes once
//! the caller grafts a finished [`LoadedAsset`] into it.

use std::{collections::HashMap, future::Future, pin::Pin};

use anyhow::Context;

use crate::{
    animation::{AnimationClip, Keyframes, Track},
    data_structures::{
        geometry::{Geometry, GeometryRef, ModelVertex},
        instance::Instance,
        scene_graph::{Node, NodeId, SceneGraph},
    },
    error::{EffectError, Result},
};

pub mod files;

/// A decoded asset that is not part of any live scene yet.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub name: String,
    pub scene: SceneGraph,
    pub clips: Vec<AnimationClip>,
}

#[cfg(not(target_arch = "wasm32"))]
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<LoadedAsset>> + Send>>;
#[cfg(target_arch = "wasm32")]
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<LoadedAsset>>>>;

/// Starts decoding the asset at `path`. The returned future is the
/// completion: the caller decides where it runs and how its result gets
/// back to the render thread.
pub trait AssetLoader {
    fn load(&self, path: &str) -> LoadFuture;
}

/// Loads `.gltf` and `.glb` files from the asset directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfLoader;

impl AssetLoader for GltfLoader {
    fn load(&self, path: &str) -> LoadFuture {
        let path = path.to_string();
        Box::pin(async move {
            load_model_gltf(&path)
                .await
                .map_err(|e| EffectError::AssetDecode(format!("{}: {:#}", path, e)))
        })
    }
}

pub async fn load_model_gltf(file_name: &str) -> anyhow::Result<LoadedAsset> {
    let bytes = files::load_binary(file_name).await?;
    let gltf = gltf::Gltf::from_slice(&bytes).context("parsing glTF")?;

    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf.blob.as_deref().context("missing binary chunk")?;
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = files::load_binary(uri)
                    .await
                    .with_context(|| format!("loading buffer {}", uri))?;
                buffer_data.push(bin);
            }
        }
    }

    to_loaded_asset(file_name, &gltf.document, &buffer_data)
}

/// Decodes a self-contained binary glTF without touching the file system.
pub fn decode_glb(name: &str, bytes: &[u8]) -> anyhow::Result<LoadedAsset> {
    let gltf = gltf::Gltf::from_slice(bytes).context("parsing glTF")?;
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf.blob.as_deref().context("missing binary chunk")?;
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                anyhow::bail!("external buffer {} in a self-contained asset", uri)
            }
        }
    }
    to_loaded_asset(name, &gltf.document, &buffer_data)
}

fn to_loaded_asset(
    name: &str,
    document: &gltf::Document,
    buffers: &[Vec<u8>],
) -> anyhow::Result<LoadedAsset> {
    let mut scene = SceneGraph::new();
    let mut node_ids = HashMap::new();
    let mut meshes = HashMap::new();

    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(gltf_scene) => {
            for node in gltf_scene.nodes() {
                to_scene_node(&mut scene, None, node, buffers, &mut node_ids, &mut meshes)?;
            }
        }
        None => log::warn!("{} has no scenes", name),
    }

    let clips = load_animations(document, buffers, &node_ids);
    log::info!(
        "loaded {}: {} nodes, {} meshes, {} clips",
        name,
        scene.len(),
        scene.count_meshes(),
        clips.len()
    );
    Ok(LoadedAsset {
        name: name.to_string(),
        scene,
        clips,
    })
}

/// Adds `node` and its children under `parent`. A glTF mesh with several
/// primitives becomes a group named after the node with one mesh child per
/// primitive, so name lookups still land on the node the artist named.
fn to_scene_node(
    scene: &mut SceneGraph,
    parent: Option<NodeId>,
    node: gltf::Node,
    buffers: &[Vec<u8>],
    node_ids: &mut HashMap<usize, NodeId>,
    meshes: &mut HashMap<usize, Vec<GeometryRef>>,
) -> anyhow::Result<()> {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node{}", node.index()));
    let (position, rotation, scale) = node.transform().decomposed();
    let local = Instance {
        position: position.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    };

    let geometries = match node.mesh() {
        Some(mesh) => match meshes.get(&mesh.index()) {
            Some(cached) => cached.clone(),
            None => {
                let loaded = load_primitives(&mesh, &name, buffers)?;
                meshes.insert(mesh.index(), loaded.clone());
                loaded
            }
        },
        None => Vec::new(),
    };

    let id = match geometries.as_slice() {
        [single] => scene.attach(
            parent,
            Node::mesh(name, single.clone(), None).with_transform(local),
        ),
        parts => {
            let group = scene.attach(parent, Node::group(name.clone()).with_transform(local));
            for (i, geometry) in parts.iter().enumerate() {
                scene.add_child(
                    group,
                    Node::mesh(format!("{}.{}", name, i), geometry.clone(), None),
                );
            }
            group
        }
    };
    node_ids.insert(node.index(), id);

    for child in node.children() {
        to_scene_node(scene, Some(id), child, buffers, node_ids, meshes)?;
    }
    Ok(())
}

fn load_primitives(
    mesh: &gltf::Mesh,
    node_name: &str,
    buffers: &[Vec<u8>],
) -> anyhow::Result<Vec<GeometryRef>> {
    let mesh_name = mesh.name().unwrap_or(node_name);
    let mut out = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "skipping {:?} primitive of mesh {}",
                primitive.mode(),
                mesh_name
            );
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

        let mut vertices: Vec<ModelVertex> = reader
            .read_positions()
            .with_context(|| format!("mesh {} has no positions", mesh_name))?
            .map(|position| ModelVertex {
                position,
                ..Default::default()
            })
            .collect();
        if let Some(normals) = reader.read_normals() {
            for (vertex, normal) in vertices.iter_mut().zip(normals) {
                vertex.normal = normal;
            }
        }
        if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
            for (vertex, tex_coord) in vertices.iter_mut().zip(tex_coords) {
                vertex.tex_coords = tex_coord;
            }
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..vertices.len() as u32).collect(),
        };

        let mut geometry = Geometry::new(mesh_name, vertices, indices);
        geometry.base_color = Some(
            primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor(),
        );
        out.push(geometry.into_ref());
    }
    Ok(out)
}

/// One clip per glTF animation, with one track per channel whose target node
/// made it into the scene.
fn load_animations(
    document: &gltf::Document,
    buffers: &[Vec<u8>],
    node_ids: &HashMap<usize, NodeId>,
) -> Vec<AnimationClip> {
    let mut clips = Vec::new();
    for animation in document.animations() {
        let mut tracks = Vec::new();
        for channel in animation.channels() {
            let Some(&target) = node_ids.get(&channel.target().node().index()) else {
                continue;
            };
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let timestamps: Vec<f32> = match reader.read_inputs() {
                Some(gltf::accessor::Iter::Standard(times)) => times.collect(),
                Some(gltf::accessor::Iter::Sparse(_)) | None => {
                    log::warn!("no usable timestamps in channel {}", channel.index());
                    continue;
                }
            };
            let keyframes = match reader.read_outputs() {
                Some(gltf::animation::util::ReadOutputs::Translations(translations)) => {
                    Keyframes::Translation(translations.map(Into::into).collect())
                }
                Some(gltf::animation::util::ReadOutputs::Rotations(rotations)) => {
                    Keyframes::Rotation(rotations.into_f32().map(Into::into).collect())
                }
                Some(gltf::animation::util::ReadOutputs::Scales(scales)) => {
                    Keyframes::Scale(scales.map(Into::into).collect())
                }
                Some(gltf::animation::util::ReadOutputs::MorphTargetWeights(_)) | None => {
                    Keyframes::Other
                }
            };
            tracks.push(Track {
                target,
                timestamps,
                keyframes,
            });
        }
        if !tracks.is_empty() {
            clips.push(AnimationClip {
                name: animation.name().unwrap_or("Default").to_string(),
                tracks,
            });
        }
    }
    clips
}
