//! Scene camera update from the tracked pose.

use bevy::prelude::*;

use crate::bevy::{ArSettings, CurrentFrame, TrackedCamera};
use crate::tracking::TrackingState;

/// System to push the frame's projection and view into the scene camera.
///
/// Skipped while tracking is paused so the camera keeps its last good pose.
/// The camera pose is camera-to-world; the view matrix is its inverse.
pub fn push_camera_matrices(
    current: Res<CurrentFrame>,
    settings: Res<ArSettings>,
    mut cameras: Query<(&mut TrackedCamera, &mut Transform)>,
) {
    let Some(frame) = current.frame() else {
        return;
    };

    if frame.tracking_state() == TrackingState::Paused {
        return;
    }

    let projection = frame.projection_matrix(settings.0.near_clip, settings.0.far_clip);
    let camera_pose = frame.camera_pose();
    let view = camera_pose.matrix().inverse();

    for (mut camera, mut transform) in &mut cameras {
        camera.projection = projection;
        camera.view = view;
        *transform = Transform::from(camera_pose);
    }
}
