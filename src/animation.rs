//! Keyframe animation of loaded assets.
//!
//! Clips come out of glTF files as per-node tracks. A mixer advances its
//! clock by the frame delta and writes the sampled transforms into the
//! local transforms of the scene nodes the tracks point at.

use cgmath::{InnerSpace, Quaternion, Vector3, VectorSpace};

use crate::data_structures::scene_graph::{NodeId, SceneGraph};

/// Anything that animates the scene once per frame.
pub trait AnimationMixer {
    fn update(&mut self, delta: f32, scene: &mut SceneGraph);
}

#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<Vector3<f32>>),
    Rotation(Vec<Quaternion<f32>>),
    Scale(Vec<Vector3<f32>>),
    Other,
}

/// One animated property of one node.
#[derive(Clone, Debug)]
pub struct Track {
    pub target: NodeId,
    pub timestamps: Vec<f32>,
    pub keyframes: Keyframes,
}

impl Track {
    /// Index of the keyframe at or before `time` and the blend factor
    /// towards the next one.
    fn locate(&self, time: f32) -> Option<(usize, usize, f32)> {
        let last = self.timestamps.len().checked_sub(1)?;
        if time <= self.timestamps[0] {
            return Some((0, 0, 0.0));
        }
        if time >= self.timestamps[last] {
            return Some((last, last, 0.0));
        }
        let next = self.timestamps.partition_point(|&t| t <= time);
        let prev = next - 1;
        let span = self.timestamps[next] - self.timestamps[prev];
        let t = if span > 0.0 {
            (time - self.timestamps[prev]) / span
        } else {
            0.0
        };
        Some((prev, next, t))
    }

    fn apply(&self, time: f32, scene: &mut SceneGraph) {
        let Some((prev, next, t)) = self.locate(time) else {
            return;
        };
        let Some(node) = scene.node_mut(self.target) else {
            return;
        };
        match &self.keyframes {
            Keyframes::Translation(values) => {
                if let (Some(a), Some(b)) = (values.get(prev), values.get(next)) {
                    node.local.position = a.lerp(*b, t);
                }
            }
            Keyframes::Rotation(values) => {
                if let (Some(a), Some(b)) = (values.get(prev), values.get(next)) {
                    node.local.rotation = a.slerp(*b, t).normalize();
                }
            }
            Keyframes::Scale(values) => {
                if let (Some(a), Some(b)) = (values.get(prev), values.get(next)) {
                    node.local.scale = a.lerp(*b, t);
                }
            }
            Keyframes::Other => {}
        }
    }
}

/// A named animation: every track that shares the glTF animation name.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    pub fn duration(&self) -> f32 {
        self.tracks
            .iter()
            .filter_map(|track| track.timestamps.last().copied())
            .fold(0.0, f32::max)
    }

    /// Shifts every track target by `offset`, used once the asset graph has
    /// been grafted into the live scene.
    pub fn rebase(&mut self, offset: usize) {
        for track in &mut self.tracks {
            track.target = track.target.shifted(offset);
        }
    }
}

/// Plays clips back to back in a loop.
#[derive(Debug, Default)]
pub struct KeyframeMixer {
    clips: Vec<AnimationClip>,
    time: f64,
}

impl KeyframeMixer {
    pub fn new(clips: Vec<AnimationClip>) -> Self {
        Self { clips, time: 0.0 }
    }
}

impl AnimationMixer for KeyframeMixer {
    fn update(&mut self, delta: f32, scene: &mut SceneGraph) {
        if self.clips.is_empty() {
            return;
        }
        self.time += f64::from(delta.max(0.0));
        for clip in &self.clips {
            let duration = clip.duration();
            let local = if duration > 0.0 {
                (self.time % f64::from(duration)) as f32
            } else {
                0.0
            };
            for track in &clip.tracks {
                track.apply(local, scene);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::scene_graph::Node;

    fn bobbing(target: NodeId) -> AnimationClip {
        AnimationClip {
            name: "bob".to_string(),
            tracks: vec![Track {
                target,
                timestamps: vec![0.0, 1.0, 2.0],
                keyframes: Keyframes::Translation(vec![
                    Vector3::new(0.0, 0.0, 0.0),
                    Vector3::new(0.0, 2.0, 0.0),
                    Vector3::new(0.0, 0.0, 0.0),
                ]),
            }],
        }
    }

    #[test]
    fn samples_between_keyframes() {
        let mut scene = SceneGraph::new();
        let node = scene.add_root(Node::group("flame"));
        let mut mixer = KeyframeMixer::new(vec![bobbing(node)]);
        mixer.update(0.5, &mut scene);
        let y = scene.node(node).unwrap().local.position.y;
        assert!((y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn loops_past_the_end() {
        let mut scene = SceneGraph::new();
        let node = scene.add_root(Node::group("flame"));
        let mut mixer = KeyframeMixer::new(vec![bobbing(node)]);
        mixer.update(3.0, &mut scene);
        let y = scene.node(node).unwrap().local.position.y;
        assert!((y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn rebase_moves_targets() {
        let mut clip = bobbing(SceneGraph::new().add_root(Node::group("a")));
        clip.rebase(4);
        assert_eq!(clip.tracks[0].target.index(), 4);
    }
}
