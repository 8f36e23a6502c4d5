//! Interfaces to the external AR tracking runtime.
//!
//! The runtime owns camera capture, pose estimation and environment
//! understanding. This crate only talks to it through [`TrackingSession`]
//! and the per-tick [`Frame`] snapshots it produces.

use bevy::math::Mat4;
use uuid::Uuid;

use crate::error::TrackingError;
use crate::pose::Pose;
use crate::trackable::Trackable;

/// Tracking quality reported for a frame's camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackingState {
    /// Pose and hit-test results are valid.
    Tracking,
    /// Tracking is temporarily lost; results would be stale.
    #[default]
    Paused,
    /// Tracking has stopped and will not resume on its own.
    Stopped,
}

/// GPU texture name the session streams camera images into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub u32);

/// Display rotation relative to the device's natural orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayRotation {
    #[default]
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl DisplayRotation {
    /// Rotation in degrees, clockwise.
    pub fn degrees(self) -> u32 {
        match self {
            Self::Rotation0 => 0,
            Self::Rotation90 => 90,
            Self::Rotation180 => 180,
            Self::Rotation270 => 270,
        }
    }
}

/// Identifier of an anchor owned by the tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorId(pub Uuid);

impl AnchorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnchorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A persistent spatial reference created from a hit.
///
/// Outlives the frame it was created from.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub id: AnchorId,
    pub pose: Pose,
}

impl Anchor {
    pub fn new(pose: Pose) -> Self {
        Self {
            id: AnchorId::new(),
            pose,
        }
    }
}

/// One intersection of a hit-test ray with tracked geometry.
///
/// Borrows the [`Frame`] that produced it, so it cannot be kept past the
/// tick in which the frame is current.
#[derive(Debug, Clone, Copy)]
pub struct HitResult<'f> {
    /// Intersection point and surface orientation.
    pub pose: Pose,
    /// Distance from the camera along the ray, in meters.
    pub distance: f32,
    pub trackable: Trackable<'f>,
}

/// One tick's snapshot of the tracked world.
pub trait Frame: Send + Sync {
    /// Camera-to-world pose of the physical camera.
    fn camera_pose(&self) -> Pose;

    fn tracking_state(&self) -> TrackingState;

    /// Projection matrix for the given clip planes, matching the camera image.
    fn projection_matrix(&self, near: f32, far: f32) -> Mat4;

    /// Casts a ray through screen coordinates (pixels) and returns hits
    /// ordered nearest first.
    fn hit_test(&self, x: f32, y: f32) -> Vec<HitResult<'_>>;
}

/// The external AR session.
pub trait TrackingSession: Send + Sync + 'static {
    /// Starts or restarts camera capture and tracking.
    fn resume(&mut self) -> Result<(), TrackingError>;

    fn pause(&mut self);

    /// Tells the session which texture to stream the camera image into.
    fn set_camera_texture(&mut self, texture: TextureId);

    /// Tells the session the viewport geometry so the projection and the
    /// background image match the screen.
    fn set_display_geometry(&mut self, rotation: DisplayRotation, width: u32, height: u32);

    /// Produces the frame for this tick. Fails when the session is not resumed.
    fn update(&mut self) -> Result<Box<dyn Frame>, TrackingError>;

    /// Creates an anchor at a hit from the current frame.
    fn create_anchor(&mut self, hit: &HitResult<'_>) -> Result<Anchor, TrackingError>;
}
