//! Test utilities for headless Bevy integration tests.
//!
//! Provides `ScriptedSession`, a tracking session whose frames are set by the
//! test, and `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `ArPlugin` without a rendering or windowing backend.

use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::bevy::plugin::{ArLifecycle, ArPlugin};
use crate::bevy::resources::{ArCommand, ArCommandQueue};
use crate::bevy::{ObjectMaterial, PlacedObject, SceneObject, TemplateObject};
use crate::config::ArConfig;
use crate::error::TrackingError;
use crate::pose::Pose;
use crate::tap::TapSlot;
use crate::trackable::{PlaneTrackable, PointTrackable, Trackable};
use crate::tracking::{
    Anchor, DisplayRotation, Frame, HitResult, TextureId, TrackingSession, TrackingState,
};

/// Calls made on a `ScriptedSession`, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SessionCall {
    Resume,
    Pause,
    SetCameraTexture(TextureId),
    SetDisplayGeometry(DisplayRotation, u32, u32),
    Update,
    CreateAnchor,
}

/// What a scripted hit intersects.
#[derive(Debug, Clone)]
pub(crate) enum ScriptedTarget {
    Plane(PlaneTrackable),
    Point(PointTrackable),
    Other,
}

/// A hit returned by every hit-test of a scripted frame.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedHit {
    pub pose: Pose,
    pub target: ScriptedTarget,
}

impl ScriptedHit {
    pub fn plane(pose: Pose, plane: PlaneTrackable) -> Self {
        Self {
            pose,
            target: ScriptedTarget::Plane(plane),
        }
    }

    pub fn point(pose: Pose, point: PointTrackable) -> Self {
        Self {
            pose,
            target: ScriptedTarget::Point(point),
        }
    }

    #[allow(dead_code)]
    pub fn other(pose: Pose) -> Self {
        Self {
            pose,
            target: ScriptedTarget::Other,
        }
    }
}

#[derive(Debug)]
struct ScriptState {
    resumed: bool,
    tracking_state: TrackingState,
    camera_pose: Pose,
    hits: Vec<ScriptedHit>,
    resume_failures: u32,
    anchor_failures: u32,
    anchors_created: usize,
    calls: Vec<SessionCall>,
    hit_test_points: Arc<Mutex<Vec<(f32, f32)>>>,
}

impl Default for ScriptState {
    fn default() -> Self {
        Self {
            resumed: false,
            tracking_state: TrackingState::Tracking,
            camera_pose: Pose::IDENTITY,
            hits: Vec::new(),
            resume_failures: 0,
            anchor_failures: 0,
            anchors_created: 0,
            calls: Vec::new(),
            hit_test_points: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Tracking session driven by the test.
///
/// Clones share state, so the test keeps one handle while the app owns
/// another.
#[derive(Clone, Default)]
pub(crate) struct ScriptedSession {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedSession {
    pub fn set_tracking_state(&self, tracking_state: TrackingState) {
        self.state.lock().tracking_state = tracking_state;
    }

    pub fn set_camera_pose(&self, pose: Pose) {
        self.state.lock().camera_pose = pose;
    }

    pub fn set_hits(&self, hits: Vec<ScriptedHit>) {
        self.state.lock().hits = hits;
    }

    pub fn fail_next_resumes(&self, n: u32) {
        self.state.lock().resume_failures = n;
    }

    pub fn fail_next_anchors(&self, n: u32) {
        self.state.lock().anchor_failures = n;
    }

    pub fn is_resumed(&self) -> bool {
        self.state.lock().resumed
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.state.lock().calls.clone()
    }

    /// Screen points of every hit-test run so far.
    pub fn hit_test_points(&self) -> Vec<(f32, f32)> {
        self.state.lock().hit_test_points.lock().clone()
    }

    pub fn anchors_created(&self) -> usize {
        self.state.lock().anchors_created
    }

    pub fn expected_projection(&self, near: f32, far: f32) -> Mat4 {
        scripted_projection(near, far)
    }
}

fn scripted_projection(near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(1.0, 9.0 / 16.0, near, far)
}

impl TrackingSession for ScriptedSession {
    fn resume(&mut self) -> Result<(), TrackingError> {
        let mut state = self.state.lock();
        state.calls.push(SessionCall::Resume);
        if state.resume_failures > 0 {
            state.resume_failures -= 1;
            return Err(TrackingError::CameraNotAvailable);
        }
        state.resumed = true;
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state.lock();
        state.calls.push(SessionCall::Pause);
        state.resumed = false;
    }

    fn set_camera_texture(&mut self, texture: TextureId) {
        self.state
            .lock()
            .calls
            .push(SessionCall::SetCameraTexture(texture));
    }

    fn set_display_geometry(&mut self, rotation: DisplayRotation, width: u32, height: u32) {
        self.state
            .lock()
            .calls
            .push(SessionCall::SetDisplayGeometry(rotation, width, height));
    }

    fn update(&mut self) -> Result<Box<dyn Frame>, TrackingError> {
        let mut state = self.state.lock();
        state.calls.push(SessionCall::Update);
        if !state.resumed {
            return Err(TrackingError::SessionPaused);
        }
        Ok(Box::new(ScriptedFrame {
            camera_pose: state.camera_pose,
            tracking_state: state.tracking_state,
            hits: state.hits.clone(),
            hit_test_points: state.hit_test_points.clone(),
        }))
    }

    fn create_anchor(&mut self, hit: &HitResult<'_>) -> Result<Anchor, TrackingError> {
        let mut state = self.state.lock();
        state.calls.push(SessionCall::CreateAnchor);
        if state.anchor_failures > 0 {
            state.anchor_failures -= 1;
            return Err(TrackingError::NotTracking);
        }
        state.anchors_created += 1;
        Ok(Anchor::new(hit.pose))
    }
}

struct ScriptedFrame {
    camera_pose: Pose,
    tracking_state: TrackingState,
    hits: Vec<ScriptedHit>,
    hit_test_points: Arc<Mutex<Vec<(f32, f32)>>>,
}

impl Frame for ScriptedFrame {
    fn camera_pose(&self) -> Pose {
        self.camera_pose
    }

    fn tracking_state(&self) -> TrackingState {
        self.tracking_state
    }

    fn projection_matrix(&self, near: f32, far: f32) -> Mat4 {
        scripted_projection(near, far)
    }

    fn hit_test(&self, x: f32, y: f32) -> Vec<HitResult<'_>> {
        self.hit_test_points.lock().push((x, y));
        self.hits
            .iter()
            .enumerate()
            .map(|(i, hit)| HitResult {
                pose: hit.pose,
                distance: i as f32,
                trackable: match &hit.target {
                    ScriptedTarget::Plane(plane) => Trackable::Plane(plane),
                    ScriptedTarget::Point(point) => Trackable::Point(point),
                    ScriptedTarget::Other => Trackable::Other,
                },
            })
            .collect()
    }
}

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
    pub session: ScriptedSession,
    pub taps: TapSlot,
    pub commands: ArCommandQueue,
}

impl TestApp {
    /// Create a new test app with the default config, in `Created`.
    pub fn new() -> Self {
        Self::with_config(ArConfig::default())
    }

    pub fn with_config(config: ArConfig) -> Self {
        let session = ScriptedSession::default();
        let taps = TapSlot::new();
        let commands = ArCommandQueue::new();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.add_plugins(bevy::input::InputPlugin);
        app.add_plugins(
            ArPlugin::new(session.clone())
                .with_config(config)
                .with_command_queue(commands.clone())
                .with_tap_slot(taps.clone()),
        );
        // Pause virtual time; ticks are driven by explicit updates only.
        app.world_mut().resource_mut::<Time<Virtual>>().pause();
        // Run one update to run Startup and initialize state.
        app.update();

        Self {
            app,
            session,
            taps,
            commands,
        }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Push a command and run updates until the state change is applied.
    pub fn send(&mut self, command: ArCommand) {
        self.commands.push(command);
        self.update();
        // Extra update to process OnEnter systems
        self.update();
    }

    pub fn resume(&mut self) {
        self.send(ArCommand::Resume);
    }

    pub fn pause(&mut self) {
        self.send(ArCommand::Pause);
    }

    pub fn tap(&self, x: f32, y: f32) {
        self.taps.record(x, y);
    }

    pub fn lifecycle(&self) -> ArLifecycle {
        *self.app.world().resource::<State<ArLifecycle>>().get()
    }

    /// Template plus placed objects.
    pub fn scene_object_count(&mut self) -> usize {
        let world = self.app.world_mut();
        world.query::<&SceneObject>().iter(world).count()
    }

    pub fn placed_positions(&mut self) -> Vec<Vec3> {
        let world = self.app.world_mut();
        world
            .query_filtered::<&Transform, With<PlacedObject>>()
            .iter(world)
            .map(|t| t.translation)
            .collect()
    }

    pub fn placed_materials(&mut self) -> Vec<ObjectMaterial> {
        let world = self.app.world_mut();
        world
            .query_filtered::<&SceneObject, With<PlacedObject>>()
            .iter(world)
            .map(|o| o.material.clone())
            .collect()
    }

    pub fn template_material(&mut self) -> ObjectMaterial {
        let world = self.app.world_mut();
        let mut query = world.query_filtered::<&SceneObject, With<TemplateObject>>();
        query.single(world).unwrap().material.clone()
    }

    /// Get a reference to the World.
    pub fn world(&self) -> &World {
        self.app.world()
    }

    /// Get a mutable reference to the World.
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
