//! Frame acquisition at the start of each tick.

use bevy::prelude::*;

use crate::bevy::{ArSession, CameraBackground, CurrentFrame, DisplayGeometry};

/// System to pull this tick's frame from the session.
///
/// Pending display changes are forwarded first so the frame's projection
/// matches the viewport, then the background texture is bound. If the
/// session refuses to produce a frame the tick has no frame and every later
/// step skips itself.
pub fn begin_frame(
    mut session: ResMut<ArSession>,
    mut geometry: ResMut<DisplayGeometry>,
    mut current: ResMut<CurrentFrame>,
    backgrounds: Query<&CameraBackground>,
    time: Res<Time<Real>>,
) {
    let session = session.session_mut();

    if geometry.update_session_if_needed(session) {
        tracing::debug!(
            "[frame] display geometry pushed: {}x{} @ {}deg",
            geometry.width,
            geometry.height,
            geometry.rotation.degrees()
        );
    }

    if let Ok(background) = backgrounds.single() {
        session.set_camera_texture(background.texture);
    }

    match session.update() {
        Ok(frame) => current.replace(frame, time.elapsed(), time.delta_secs_f64()),
        Err(err) => {
            tracing::warn!("[frame] no frame this tick: {}", err);
            current.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bevy::ArCommand;
    use crate::bevy::test_utils::{SessionCall, TestApp};
    use crate::tracking::DisplayRotation;

    #[test]
    fn test_geometry_pushed_before_frame_update() {
        let mut app = TestApp::new();
        app.commands.push(ArCommand::SurfaceChanged {
            width: 720,
            height: 1280,
        });
        app.resume();

        let calls = app.session.calls();
        let geometry = calls
            .iter()
            .position(|c| {
                *c == SessionCall::SetDisplayGeometry(DisplayRotation::Rotation0, 720, 1280)
            })
            .unwrap();
        let update = calls.iter().position(|c| *c == SessionCall::Update).unwrap();
        assert!(geometry < update);

        // Pushed once, not on every tick.
        app.update();
        let pushes = app
            .session
            .calls()
            .iter()
            .filter(|c| matches!(c, SessionCall::SetDisplayGeometry(..)))
            .count();
        assert_eq!(pushes, 1);
    }
}
