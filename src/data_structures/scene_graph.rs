//! Scene graph and hierarchical scene organization.
//!
//! The graph is an arena: it owns every node and hands out [`NodeId`]
//! handles. Effects, loaders and the renderer never hold node memory, only
//! handles. Loaded assets arrive as detached graphs and are grafted under a
//! parent once loading completes.

use std::sync::Arc;

use crate::{
    data_structures::{geometry::GeometryRef, instance::Instance, particles::ParticleBuffer},
    error::{EffectError, Result},
    materials::MaterialHandle,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }

    /// The handle this node gets when its graph is grafted behind `offset`
    /// existing nodes.
    pub fn shifted(self, offset: usize) -> NodeId {
        NodeId(self.0 + offset)
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Group,
    /// Triangle mesh. `material` stays `None` until someone assigns one;
    /// the renderer skips meshes without a material.
    Mesh {
        geometry: GeometryRef,
        material: Option<MaterialHandle>,
    },
    Points {
        particles: Arc<ParticleBuffer>,
        material: MaterialHandle,
    },
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub local: Instance,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn group(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Group)
    }

    pub fn mesh(
        name: impl Into<String>,
        geometry: GeometryRef,
        material: Option<MaterialHandle>,
    ) -> Self {
        Self::with_kind(name, NodeKind::Mesh { geometry, material })
    }

    pub fn points(
        name: impl Into<String>,
        particles: Arc<ParticleBuffer>,
        material: MaterialHandle,
    ) -> Self {
        Self::with_kind(
            name,
            NodeKind::Points {
                particles,
                material,
            },
        )
    }

    fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            local: Instance::default(),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, local: Instance) -> Self {
        self.local = local;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh { .. })
    }

    pub fn geometry(&self) -> Option<&GeometryRef> {
        match &self.kind {
            NodeKind::Mesh { geometry, .. } => Some(geometry),
            _ => None,
        }
    }

    pub fn material(&self) -> Option<MaterialHandle> {
        match &self.kind {
            NodeKind::Mesh { material, .. } => *material,
            NodeKind::Points { material, .. } => Some(*material),
            NodeKind::Group => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn add_root(&mut self, node: Node) -> NodeId {
        let id = self.push(node, None);
        self.roots.push(id);
        id
    }

    /// Attaches `node` as the last child of `parent`, or as a new root when
    /// `parent` is `None`. A dangling parent handle falls back to a root.
    pub fn attach(&mut self, parent: Option<NodeId>, node: Node) -> NodeId {
        match parent {
            Some(parent) if parent.0 < self.nodes.len() => {
                let id = self.push(node, Some(parent));
                self.nodes[parent.0].children.push(id);
                id
            }
            Some(parent) => {
                log::warn!("attach to unknown node {:?}, adding as root", parent);
                self.add_root(node)
            }
            None => self.add_root(node),
        }
    }

    pub fn add_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        self.attach(Some(parent), node)
    }

    fn push(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = parent;
        node.children.clear();
        self.nodes.push(node);
        id
    }

    /// `root` followed by all of its descendants, depth first.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.node(id).is_none() {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Every mesh node in the subtree of `root`, root included.
    pub fn mesh_nodes(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.nodes[id.0].is_mesh())
            .collect()
    }

    pub fn count_meshes(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_mesh()).count()
    }

    /// First node named `name` in the subtree of `root`.
    pub fn find_child(&self, root: NodeId, name: &str) -> Result<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.nodes[id.0].name == name)
            .ok_or_else(|| EffectError::MissingNamedChild(name.to_string()))
    }

    pub fn set_material(&mut self, id: NodeId, handle: MaterialHandle) -> bool {
        match self.node_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Mesh { material, .. }) => {
                *material = Some(handle);
                true
            }
            Some(NodeKind::Points { material, .. }) => {
                *material = handle;
                true
            }
            _ => false,
        }
    }

    /// Moves every node of `other` into `self`, hanging its roots under
    /// `parent`. Returns the new handles of `other`'s roots.
    pub fn graft(&mut self, parent: Option<NodeId>, other: SceneGraph) -> Vec<NodeId> {
        let offset = self.nodes.len();
        let remap = |id: NodeId| NodeId(id.0 + offset);
        let SceneGraph { nodes, roots } = other;
        for mut node in nodes {
            node.parent = node.parent.map(remap);
            node.children = node.children.into_iter().map(remap).collect();
            self.nodes.push(node);
        }
        let grafted: Vec<NodeId> = roots.into_iter().map(remap).collect();
        for &root in &grafted {
            match parent.filter(|p| p.0 < offset) {
                Some(p) => {
                    self.nodes[root.0].parent = Some(p);
                    self.nodes[p.0].children.push(root);
                }
                None => self.roots.push(root),
            }
        }
        grafted
    }

    /// World transform of every node, indexed by `NodeId::index`.
    pub fn world_transforms(&self) -> Vec<Instance> {
        let mut world = vec![Instance::default(); self.nodes.len()];
        let mut stack: Vec<(NodeId, Instance)> = self
            .roots
            .iter()
            .map(|&root| (root, Instance::default()))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            let node_world = &parent_world * &node.local;
            for &child in &node.children {
                stack.push((child, node_world));
            }
            world[id.0] = node_world;
        }
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::geometry::Geometry;

    fn quad() -> GeometryRef {
        Geometry::quad("quad").into_ref()
    }

    #[test]
    fn find_child_searches_whole_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root(Node::group("root"));
        let branch = graph.add_child(root, Node::group("branch"));
        let leaf = graph.add_child(branch, Node::mesh("leaf", quad(), None));
        assert_eq!(graph.find_child(root, "leaf").unwrap(), leaf);
        assert!(matches!(
            graph.find_child(branch, "root"),
            Err(EffectError::MissingNamedChild(name)) if name == "root"
        ));
    }

    #[test]
    fn graft_remaps_handles() {
        let mut scene = SceneGraph::new();
        let anchor = scene.add_root(Node::group("anchor"));

        let mut asset = SceneGraph::new();
        let asset_root = asset.add_root(Node::group("asset"));
        asset.add_child(asset_root, Node::mesh("a", quad(), None));

        let grafted = scene.graft(Some(anchor), asset);
        assert_eq!(grafted.len(), 1);
        let new_root = grafted[0];
        assert_eq!(scene.parent(new_root), Some(anchor));
        let child = scene.children(new_root)[0];
        assert_eq!(scene.node(child).unwrap().name, "a");
        assert_eq!(scene.parent(child), Some(new_root));
        assert_eq!(scene.roots(), &[anchor]);
    }

    #[test]
    fn world_transforms_compose_down_the_tree() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root(
            Node::group("root").with_transform(cgmath::Vector3::new(1.0f32, 0.0, 0.0).into()),
        );
        let child = graph.add_child(
            root,
            Node::group("child").with_transform(cgmath::Vector3::new(0.0f32, 2.0, 0.0).into()),
        );
        let world = graph.world_transforms();
        assert_eq!(
            world[child.index()].position,
            cgmath::Vector3::new(1.0, 2.0, 0.0)
        );
    }
}
