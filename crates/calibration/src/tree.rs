//! Static transform tree

use std::collections::{HashMap, HashSet};

use contracts::{FrameId, RigidTransform, StaticTransformConfig, Timestamp, TransformResolver};
use tracing::debug;

/// Fixed parent/child transforms answering lookups at any stamp.
///
/// Each child has at most one parent; a lookup between two frames composes
/// both chains through their common root.
#[derive(Debug, Clone, Default)]
pub struct StaticTransformTree {
    /// child -> (parent, pose of child in parent)
    edges: HashMap<FrameId, (FrameId, RigidTransform)>,
    frames: HashSet<FrameId>,
}

impl StaticTransformTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: &[StaticTransformConfig]) -> Self {
        let mut tree = Self::new();
        for config in configs {
            tree.insert(
                config.parent.as_str(),
                config.child.as_str(),
                config.to_rigid_transform(),
            );
        }
        debug!(edges = tree.len(), frames = tree.frames.len(), "transform tree built");
        tree
    }

    /// Set the pose of `child` in `parent`, replacing any previous parent
    pub fn insert(
        &mut self,
        parent: impl Into<FrameId>,
        child: impl Into<FrameId>,
        transform: RigidTransform,
    ) {
        let parent = parent.into();
        let child = child.into();
        self.frames.insert(parent.clone());
        self.frames.insert(child.clone());
        self.edges.insert(child, (parent, transform));
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains(&self, frame: &str) -> bool {
        self.frames.contains(frame)
    }

    /// Root of `frame` and the pose of `frame` in it; `None` on a cycle
    fn to_root<'a>(&'a self, frame: &'a str) -> Option<(&'a str, RigidTransform)> {
        let mut current = frame;
        let mut pose = RigidTransform::identity();
        for _ in 0..=self.edges.len() {
            match self.edges.get(current) {
                Some((parent, transform)) => {
                    pose = transform.compose(&pose);
                    current = parent.as_str();
                }
                None => return Some((current, pose)),
            }
        }
        None
    }
}

impl TransformResolver for StaticTransformTree {
    fn lookup(&self, target: &str, source: &str, _stamp: Timestamp) -> Option<RigidTransform> {
        if !self.contains(target) || !self.contains(source) {
            return None;
        }
        if target == source {
            return Some(RigidTransform::identity());
        }

        let (target_root, root_from_target) = self.to_root(target)?;
        let (source_root, root_from_source) = self.to_root(source)?;
        if target_root != source_root {
            return None;
        }
        Some(root_from_target.inverse().compose(&root_from_source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Location, Rotation};
    use std::f64::consts::FRAC_PI_2;

    const STAMP: Timestamp = Timestamp::ZERO;

    fn rig() -> StaticTransformTree {
        let mut tree = StaticTransformTree::new();
        tree.insert("base_link", "camera_link", RigidTransform::from_translation(0.5, 0.0, 1.0));
        tree.insert("camera_link", "left", RigidTransform::from_translation(0.0, 0.06, 0.0));
        tree.insert("camera_link", "right", RigidTransform::from_translation(0.0, -0.06, 0.0));
        tree
    }

    fn assert_xyz(t: RigidTransform, x: f64, y: f64, z: f64) {
        assert!((t.x() - x).abs() < 1e-9, "x = {}", t.x());
        assert!((t.y() - y).abs() < 1e-9, "y = {}", t.y());
        assert!((t.z() - z).abs() < 1e-9, "z = {}", t.z());
    }

    #[test]
    fn test_parent_to_child_lookup() {
        let tree = rig();
        let t = tree.lookup("base_link", "left", STAMP).unwrap();
        assert_xyz(t, 0.5, 0.06, 1.0);
    }

    #[test]
    fn test_sibling_lookup_goes_through_root() {
        let tree = rig();
        let left_in_right = tree.lookup("right", "left", STAMP).unwrap();
        assert_xyz(left_in_right, 0.0, 0.12, 0.0);
        let right_in_left = tree.lookup("left", "right", STAMP).unwrap();
        assert_xyz(right_in_left, 0.0, -0.12, 0.0);
    }

    #[test]
    fn test_rotation_applied_along_chain() {
        let mut tree = StaticTransformTree::new();
        tree.insert(
            "base_link",
            "camera",
            RigidTransform::from_xyz_rpy(1.0, 0.0, 0.0, 0.0, 0.0, FRAC_PI_2),
        );
        tree.insert("camera", "lens", RigidTransform::from_translation(1.0, 0.0, 0.0));
        // lens sits along the rotated x axis (base y)
        let t = tree.lookup("base_link", "lens", STAMP).unwrap();
        assert_xyz(t, 1.0, 1.0, 0.0);
    }

    #[test]
    fn test_unknown_and_disconnected_frames() {
        let mut tree = rig();
        tree.insert("map", "odom", RigidTransform::identity());
        assert!(tree.lookup("base_link", "missing", STAMP).is_none());
        assert!(tree.lookup("base_link", "odom", STAMP).is_none());
        assert!(tree.lookup("missing", "missing", STAMP).is_none());
        assert!(tree.lookup("left", "left", STAMP).unwrap().is_identity());
    }

    #[test]
    fn test_cycle_yields_none() {
        let mut tree = StaticTransformTree::new();
        tree.insert("a", "b", RigidTransform::identity());
        tree.insert("b", "a", RigidTransform::identity());
        tree.insert("c", "d", RigidTransform::identity());
        assert!(tree.lookup("a", "d", STAMP).is_none());
    }

    #[test]
    fn test_from_configs_uses_degrees() {
        let configs = vec![StaticTransformConfig {
            parent: "base_link".to_string(),
            child: "left".to_string(),
            location: Location {
                x: 0.0,
                y: 0.0,
                z: 1.0,
            },
            rotation: Rotation {
                roll: 0.0,
                pitch: 0.0,
                yaw: 90.0,
            },
        }];
        let tree = StaticTransformTree::from_configs(&configs);
        assert_eq!(tree.len(), 1);

        let t = tree.lookup("base_link", "left", STAMP).unwrap();
        let (_, _, yaw) = t.as_isometry().rotation.euler_angles();
        assert!((yaw - FRAC_PI_2).abs() < 1e-9);
    }
}
