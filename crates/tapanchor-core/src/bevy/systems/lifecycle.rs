//! Lifecycle command processing.
//!
//! Platform signals arrive through the [`ArCommandQueue`]. Resume and pause
//! change the [`ArLifecycle`] state; only one state change is applied per
//! frame and later commands wait for the next frame.

use bevy::prelude::*;

use crate::bevy::{ArCommand, ArCommandQueue, ArLifecycle, ArSession, CurrentFrame, DisplayGeometry};

/// System to process lifecycle commands from the platform.
///
/// A failed resume (camera claimed by another app) is logged and leaves the
/// state unchanged; the next Resume retries.
pub fn process_commands(
    queue: Res<ArCommandQueue>,
    state: Res<State<ArLifecycle>>,
    mut next_state: ResMut<NextState<ArLifecycle>>,
    mut session: ResMut<ArSession>,
    mut geometry: ResMut<DisplayGeometry>,
) {
    while let Some(command) = queue.pop() {
        match command {
            ArCommand::SurfaceChanged { width, height } => {
                tracing::info!("[lifecycle] SurfaceChanged {}x{}", width, height);
                geometry.on_surface_changed(width, height);
            }
            ArCommand::DisplayRotated { rotation } => {
                tracing::info!("[lifecycle] DisplayRotated {}deg", rotation.degrees());
                geometry.on_rotation_changed(rotation);
            }
            ArCommand::Resume => {
                if *state.get() == ArLifecycle::Resumed {
                    tracing::debug!("[lifecycle] Resume ignored, already resumed");
                    continue;
                }
                match session.session_mut().resume() {
                    Ok(()) => {
                        tracing::info!("[lifecycle] Resume: {:?} -> Resumed", state.get());
                        geometry.on_resume();
                        next_state.set(ArLifecycle::Resumed);
                        break;
                    }
                    Err(err) => {
                        tracing::error!(
                            "[lifecycle] Resume failed, staying {:?}: {}",
                            state.get(),
                            err
                        );
                    }
                }
            }
            ArCommand::Pause => {
                if *state.get() != ArLifecycle::Resumed {
                    tracing::debug!("[lifecycle] Pause ignored in {:?}", state.get());
                    continue;
                }
                tracing::info!("[lifecycle] Pause: Resumed -> Paused");
                next_state.set(ArLifecycle::Paused);
                break;
            }
        }
    }
}

/// Runs on entering `Paused`, after ticking has stopped.
///
/// The session is paused last so no tick ever sees a torn-down session.
pub fn suspend_session(
    mut session: ResMut<ArSession>,
    mut geometry: ResMut<DisplayGeometry>,
    mut current: ResMut<CurrentFrame>,
) {
    geometry.on_pause();
    current.clear();
    session.session_mut().pause();
    tracing::info!("[lifecycle] session paused");
}

#[cfg(test)]
mod tests {
    use bevy::math::Vec3;

    use crate::bevy::test_utils::{ScriptedHit, SessionCall, TestApp};
    use crate::bevy::{ArCommand, ArLifecycle, CurrentFrame};
    use crate::pose::Pose;
    use crate::trackable::PlaneTrackable;
    use crate::tracking::{DisplayRotation, TextureId};

    #[test]
    fn test_starts_created_without_ticking() {
        let mut app = TestApp::new();
        app.update();

        assert_eq!(app.lifecycle(), ArLifecycle::Created);
        assert!(app.session.calls().is_empty());
    }

    #[test]
    fn test_resume_starts_ticking() {
        let mut app = TestApp::new();
        app.resume();

        assert_eq!(app.lifecycle(), ArLifecycle::Resumed);
        assert!(app.session.is_resumed());
        assert!(app.world().resource::<CurrentFrame>().frame().is_some());

        let calls = app.session.calls();
        assert_eq!(calls[0], SessionCall::Resume);
        assert!(calls.contains(&SessionCall::Update));
    }

    #[test]
    fn test_tick_binds_texture_before_update() {
        let mut app = TestApp::new();
        app.resume();

        let calls = app.session.calls();
        let texture = calls
            .iter()
            .position(|c| *c == SessionCall::SetCameraTexture(TextureId(0)))
            .unwrap();
        let update = calls.iter().position(|c| *c == SessionCall::Update).unwrap();
        assert!(texture < update);
    }

    #[test]
    fn test_failed_resume_is_retried_later() {
        let mut app = TestApp::new();
        app.session.fail_next_resumes(1);

        app.resume();
        assert_eq!(app.lifecycle(), ArLifecycle::Created);
        assert!(!app.session.calls().contains(&SessionCall::Update));

        app.resume();
        assert_eq!(app.lifecycle(), ArLifecycle::Resumed);
        assert!(app.session.is_resumed());
    }

    #[test]
    fn test_pause_stops_ticking_then_pauses_session() {
        let mut app = TestApp::new();
        app.resume();
        app.pause();

        assert_eq!(app.lifecycle(), ArLifecycle::Paused);
        assert!(!app.session.is_resumed());
        assert!(app.world().resource::<CurrentFrame>().frame().is_none());

        let calls = app.session.calls();
        assert_eq!(calls.last(), Some(&SessionCall::Pause));

        let updates = calls.iter().filter(|c| **c == SessionCall::Update).count();
        app.update();
        app.update();
        let after = app
            .session
            .calls()
            .iter()
            .filter(|c| **c == SessionCall::Update)
            .count();
        assert_eq!(updates, after);
    }

    #[test]
    fn test_pause_before_resume_is_ignored() {
        let mut app = TestApp::new();
        app.pause();

        assert_eq!(app.lifecycle(), ArLifecycle::Created);
        assert!(!app.session.calls().contains(&SessionCall::Pause));
    }

    #[test]
    fn test_pause_resume_keeps_scene_unchanged() {
        let mut app = TestApp::new();
        app.resume();
        let before = app.scene_object_count();

        app.pause();
        app.resume();

        assert_eq!(app.lifecycle(), ArLifecycle::Resumed);
        assert_eq!(app.scene_object_count(), before);
    }

    #[test]
    fn test_tap_while_paused_is_placed_after_resume() {
        let mut app = TestApp::new();
        app.resume();
        app.pause();

        let target = Vec3::new(0.0, -0.5, -1.0);
        app.session.set_hits(vec![ScriptedHit::plane(
            Pose::from_translation(target),
            PlaneTrackable::rectangle(Pose::from_translation(target), 1.0, 1.0),
        )]);
        app.tap(5.0, 5.0);
        app.update();
        assert!(app.placed_positions().is_empty());

        app.resume();
        assert_eq!(app.placed_positions(), vec![target]);
    }

    #[test]
    fn test_one_state_change_per_frame() {
        let mut app = TestApp::new();
        app.resume();

        app.commands.push(ArCommand::Pause);
        app.commands.push(ArCommand::Resume);
        app.update();
        assert_eq!(app.lifecycle(), ArLifecycle::Paused);
        assert!(!app.commands.is_empty());

        app.update();
        assert_eq!(app.lifecycle(), ArLifecycle::Resumed);
        assert!(app.commands.is_empty());
    }

    #[test]
    fn test_display_changes_reach_session_on_next_tick() {
        let mut app = TestApp::new();
        app.commands.push(ArCommand::SurfaceChanged {
            width: 1080,
            height: 1920,
        });
        app.update();
        assert!(app.session.calls().is_empty());

        app.resume();
        app.send(ArCommand::DisplayRotated {
            rotation: DisplayRotation::Rotation90,
        });

        let geometry: Vec<_> = app
            .session
            .calls()
            .into_iter()
            .filter(|c| matches!(c, SessionCall::SetDisplayGeometry(..)))
            .collect();
        assert_eq!(
            geometry,
            vec![
                SessionCall::SetDisplayGeometry(DisplayRotation::Rotation0, 1080, 1920),
                SessionCall::SetDisplayGeometry(DisplayRotation::Rotation90, 1080, 1920),
            ]
        );
    }
}
