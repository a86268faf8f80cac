//! Rigid transforms and the transform lookup collaborator

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::Timestamp;

/// Rigid pose between two frames.
///
/// A lookup `(target, source)` yields the pose of `source` expressed in
/// `target`, so `p_target = T * p_source`. An unavailable transform is
/// `None` at the lookup site, never a special value of this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RigidTransform(Isometry3<f64>);

impl RigidTransform {
    pub fn identity() -> Self {
        Self(Isometry3::identity())
    }

    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self(Isometry3::translation(x, y, z))
    }

    /// Translation in metres, rotation as roll/pitch/yaw in radians
    pub fn from_xyz_rpy(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self(Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        ))
    }

    pub fn from_isometry(iso: Isometry3<f64>) -> Self {
        Self(iso)
    }

    pub fn as_isometry(&self) -> &Isometry3<f64> {
        &self.0
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.0.translation.vector
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.0.translation.vector.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.0.translation.vector.y
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.0.translation.vector.z
    }

    /// Exactly the identity (both frames coincide)
    pub fn is_identity(&self) -> bool {
        self.0 == Isometry3::identity()
    }

    pub fn inverse(&self) -> Self {
        Self(self.0.inverse())
    }

    /// `self * other`: chain `target <- middle` with `middle <- source`
    pub fn compose(&self, other: &RigidTransform) -> Self {
        Self(self.0 * other.0)
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for RigidTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (roll, pitch, yaw) = self.0.rotation.euler_angles();
        write!(
            f,
            "xyz=[{:.3}, {:.3}, {:.3}] rpy=[{:.3}, {:.3}, {:.3}]",
            self.x(),
            self.y(),
            self.z(),
            roll,
            pitch,
            yaw
        )
    }
}

/// Transform lookup collaborator.
///
/// Lookups are synchronous: they either answer immediately or report the
/// transform as unavailable.
pub trait TransformResolver {
    /// Pose of `source` expressed in `target` at `stamp`
    fn lookup(&self, target: &str, source: &str, stamp: Timestamp) -> Option<RigidTransform>;
}

impl<T: TransformResolver + ?Sized> TransformResolver for &T {
    fn lookup(&self, target: &str, source: &str, stamp: Timestamp) -> Option<RigidTransform> {
        (**self).lookup(target, source, stamp)
    }
}

impl<T: TransformResolver + ?Sized> TransformResolver for Arc<T> {
    fn lookup(&self, target: &str, source: &str, stamp: Timestamp) -> Option<RigidTransform> {
        (**self).lookup(target, source, stamp)
    }
}

impl<T: TransformResolver + ?Sized> TransformResolver for Box<T> {
    fn lookup(&self, target: &str, source: &str, stamp: Timestamp) -> Option<RigidTransform> {
        (**self).lookup(target, source, stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_detection() {
        assert!(RigidTransform::identity().is_identity());
        assert!(RigidTransform::from_xyz_rpy(0.0, 0.0, 0.0, 0.0, 0.0, 0.0).is_identity());
        assert!(!RigidTransform::from_translation(0.12, 0.0, 0.0).is_identity());
    }

    #[test]
    fn test_inverse_flips_translation() {
        let t = RigidTransform::from_translation(0.12, 0.0, 0.0);
        assert!((t.inverse().x() + 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_compose_chains_offsets() {
        let a = RigidTransform::from_translation(1.0, 0.0, 0.0);
        let b = RigidTransform::from_translation(0.0, 2.0, 0.0);
        let c = a.compose(&b);
        assert!((c.x() - 1.0).abs() < 1e-12);
        assert!((c.y() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_display_is_compact() {
        let t = RigidTransform::from_translation(0.1, 0.0, 0.0);
        assert!(t.to_string().starts_with("xyz=[0.100, 0.000, 0.000]"));
    }
}
