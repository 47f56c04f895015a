use std::{cell::Cell, rc::Rc};

use campfire_ngin::{
    animation::AnimationMixer,
    camera::PerspectiveCamera,
    data_structures::{
        geometry::Geometry,
        instance::Instance,
        scene_graph::{Node, NodeId, SceneGraph},
    },
    effects::{FrameScheduler, RenderContext, ViewportState},
    error::{EffectError, Result},
    materials::MaterialBank,
    render::{DrawList, GraphicsContext},
    resources::LoadedAsset,
    settings::{Settings, ShadowSettings},
    time::Clock,
};

/// Clock that only moves when the test says so.
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.0.set(seconds);
    }
}

impl Clock for ManualClock {
    fn elapsed_seconds(&self) -> f64 {
        self.0.get()
    }
}

/// Graphics backend that records what it was asked to do.
#[derive(Default)]
pub struct RecordingGraphics {
    pub renders: u32,
    pub last_draws: usize,
    pub sizes: Vec<(u32, u32)>,
    pub pixel_ratios: Vec<f32>,
    pub shadows: Option<ShadowSettings>,
    /// Fail every render with a submission error.
    pub fail: bool,
}

impl RecordingGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl GraphicsContext for RecordingGraphics {
    fn render(
        &mut self,
        scene: &SceneGraph,
        materials: &MaterialBank,
        _camera: &PerspectiveCamera,
    ) -> Result<()> {
        self.renders += 1;
        if self.fail {
            return Err(EffectError::RenderSubmission("device lost".to_string()));
        }
        self.last_draws = DrawList::collect(scene, materials).len();
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.sizes.push((width, height));
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratios.push(ratio);
    }

    fn set_shadows(&mut self, shadows: ShadowSettings) {
        self.shadows = Some(shadows);
    }
}

#[derive(Default)]
pub struct CountingScheduler {
    pub requests: u32,
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) {
        self.requests += 1;
    }
}

/// Mixer that remembers every delta it was advanced by.
#[derive(Clone, Default)]
pub struct RecordingMixer(pub Rc<std::cell::RefCell<Vec<f32>>>);

impl AnimationMixer for RecordingMixer {
    fn update(&mut self, delta: f32, _scene: &mut SceneGraph) {
        self.0.borrow_mut().push(delta);
    }
}

pub fn viewport(width: u32, height: u32, ratio: f32) -> ViewportState {
    ViewportState::new(width, height, ratio, 2.0)
}

/// The campfire context at 1024x768, before any asset arrived.
pub fn campfire_context() -> RenderContext {
    RenderContext::new(&Settings::default(), viewport(1024, 768, 1.0))
        .expect("default materials are valid")
}

pub fn mesh(name: &str) -> Node {
    Node::mesh(name, Geometry::quad(name).into_ref(), None)
}

/// A detached asset: a group holding one mesh per name, each nudged along X.
pub fn asset_with_meshes(name: &str, meshes: &[&str]) -> LoadedAsset {
    let mut scene = SceneGraph::new();
    let group = scene.add_root(Node::group(name));
    for (i, mesh_name) in meshes.iter().enumerate() {
        let local = Instance {
            position: campfire_ngin::cgmath::Vector3::new(i as f32, 0.0, 0.0),
            ..Instance::new()
        };
        scene.add_child(group, mesh(mesh_name).with_transform(local));
    }
    LoadedAsset {
        name: name.to_string(),
        scene,
        clips: Vec::new(),
    }
}

/// Every node under `root` whose name is `name`.
pub fn named(scene: &SceneGraph, root: NodeId, name: &str) -> Vec<NodeId> {
    scene
        .descendants(root)
        .into_iter()
        .filter(|id| scene.node(*id).is_some_and(|node| node.name == name))
        .collect()
}
