//! Hands the fire material to named parts of a loaded asset.

use crate::{
    data_structures::scene_graph::{NodeId, SceneGraph},
    error::Result,
    materials::MaterialHandle,
};

/// Gives `material` to every mesh under each node named in `targets`.
///
/// All names are resolved before anything is assigned, so a missing target
/// leaves the subtree unchanged and reports `MissingNamedChild`. Returns the
/// meshes that received the material.
pub fn assign_by_name(
    scene: &mut SceneGraph,
    root: NodeId,
    targets: &[String],
    material: MaterialHandle,
) -> Result<Vec<NodeId>> {
    let found = targets
        .iter()
        .map(|name| scene.find_child(root, name))
        .collect::<Result<Vec<_>>>()?;

    let mut assigned = Vec::new();
    for target in found {
        for mesh in scene.mesh_nodes(target) {
            if !assigned.contains(&mesh) && scene.set_material(mesh, material) {
                assigned.push(mesh);
            }
        }
    }
    log::info!("fire material on {} meshes", assigned.len());
    Ok(assigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data_structures::{geometry::Geometry, scene_graph::Node},
        error::EffectError,
        materials::MaterialBank,
    };

    #[test]
    fn missing_target_assigns_nothing() {
        let mut materials = MaterialBank::new();
        let fire = materials.fire(0.6).unwrap();
        let mut scene = SceneGraph::new();
        let root = scene.add_root(Node::group("forest"));
        let a = scene.add_child(root, Node::mesh("FireA", Geometry::quad("a").into_ref(), None));

        let targets = vec!["FireA".to_string(), "FireB".to_string()];
        let result = assign_by_name(&mut scene, root, &targets, fire);
        assert!(matches!(result, Err(EffectError::MissingNamedChild(name)) if name == "FireB"));
        assert_eq!(scene.node(a).unwrap().material(), None);
    }

    #[test]
    fn group_target_covers_its_meshes() {
        let mut materials = MaterialBank::new();
        let fire = materials.fire(0.6).unwrap();
        let mut scene = SceneGraph::new();
        let root = scene.add_root(Node::group("forest"));
        let group = scene.add_child(root, Node::group("FireA"));
        let left = scene.add_child(group, Node::mesh("FireA.0", Geometry::quad("l").into_ref(), None));
        let right = scene.add_child(group, Node::mesh("FireA.1", Geometry::quad("r").into_ref(), None));

        let assigned = assign_by_name(&mut scene, root, &["FireA".to_string()], fire).unwrap();
        assert_eq!(assigned, [left, right]);
    }
}
