//! Rigid poses reported by the tracking session.

use bevy::math::{Mat4, Quat, Vec3};
use bevy::prelude::Transform;

/// Position and orientation in world space.
///
/// For the camera this is the camera-to-world transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub const fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Returns the 4x4 matrix mapping local coordinates into world space.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Returns the inverse pose (world-to-local).
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            translation: rotation * -self.translation,
            rotation,
        }
    }

    /// Maps a point from this pose's local frame into world space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    /// Maps a world-space point into this pose's local frame.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.translation)
    }

    /// Local +Y axis expressed in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Local -Z axis expressed in world space (camera look direction).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Pose> for Transform {
    fn from(pose: Pose) -> Self {
        Transform::from_translation(pose.translation).with_rotation(pose.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_round_trips_points() {
        let pose = Pose::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let p = Vec3::new(0.5, -0.25, 4.0);

        let local = pose.inverse_transform_point(p);
        assert!(pose.transform_point(local).abs_diff_eq(p, 1e-5));
        assert!(pose.inverse().transform_point(p).abs_diff_eq(local, 1e-5));
    }

    #[test]
    fn test_matrix_inverse_matches_pose_inverse() {
        let pose = Pose::new(
            Vec3::new(-0.3, 1.4, 0.2),
            Quat::from_euler(bevy::math::EulerRot::YXZ, 0.4, -0.2, 0.1),
        );
        let a = pose.matrix().inverse();
        let b = pose.inverse().matrix();
        assert!(a.abs_diff_eq(b, 1e-5));
    }

    #[test]
    fn test_forward_is_negative_z() {
        assert!(Pose::IDENTITY.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(Pose::IDENTITY.up().abs_diff_eq(Vec3::Y, 1e-6));
    }
}
