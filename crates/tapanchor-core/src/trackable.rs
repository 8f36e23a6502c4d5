//! Trackable geometry and the hit acceptance rule.
//!
//! Only two kinds of hit are good enough to place an object on:
//! - a plane hit that lands inside the plane's tracked boundary polygon
//! - a point whose surface normal has been estimated

use bevy::math::Vec2;

use crate::pose::Pose;
use crate::tracking::HitResult;

/// Orientation quality of a tracked feature point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointOrientationMode {
    /// Orientation is the identity; no surface information.
    #[default]
    Initialized,
    /// Orientation follows an estimated surface normal.
    EstimatedSurfaceNormal,
}

/// A detected planar surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneTrackable {
    /// Plane center; local +Y is the plane normal.
    pub center_pose: Pose,
    /// Boundary polygon in plane-local XZ coordinates.
    pub polygon: Vec<Vec2>,
}

impl PlaneTrackable {
    pub fn new(center_pose: Pose, polygon: Vec<Vec2>) -> Self {
        Self {
            center_pose,
            polygon,
        }
    }

    /// Axis-aligned rectangle of the given half extents around the center.
    pub fn rectangle(center_pose: Pose, half_x: f32, half_z: f32) -> Self {
        Self::new(
            center_pose,
            vec![
                Vec2::new(-half_x, -half_z),
                Vec2::new(half_x, -half_z),
                Vec2::new(half_x, half_z),
                Vec2::new(-half_x, half_z),
            ],
        )
    }

    /// Returns true if the pose's position, projected onto the plane, lies
    /// inside the boundary polygon.
    pub fn is_pose_in_polygon(&self, pose: &Pose) -> bool {
        let local = self.center_pose.inverse_transform_point(pose.translation);
        polygon_contains(&self.polygon, Vec2::new(local.x, local.z))
    }
}

/// A detected feature point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointTrackable {
    pub pose: Pose,
    pub orientation_mode: PointOrientationMode,
}

/// What a hit-test ray intersected. Borrows the frame's trackables.
#[derive(Debug, Clone, Copy)]
pub enum Trackable<'f> {
    Plane(&'f PlaneTrackable),
    Point(&'f PointTrackable),
    /// Any geometry the placement rule does not know about.
    Other,
}

/// Acceptance rule for placing an object at a hit.
pub fn hit_is_acceptable(hit: &HitResult<'_>) -> bool {
    match hit.trackable {
        Trackable::Plane(plane) => plane.is_pose_in_polygon(&hit.pose),
        Trackable::Point(point) => {
            point.orientation_mode == PointOrientationMode::EstimatedSurfaceNormal
        }
        Trackable::Other => false,
    }
}

/// First acceptable hit in nearest-first order.
pub fn first_acceptable_hit<'a, 'f>(hits: &'a [HitResult<'f>]) -> Option<&'a HitResult<'f>> {
    hits.iter().find(|hit| hit_is_acceptable(hit))
}

/// Even-odd crossing test. Points on the boundary may land either side.
fn polygon_contains(polygon: &[Vec2], p: Vec2) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
