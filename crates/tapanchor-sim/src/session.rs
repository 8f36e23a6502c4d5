//! Simulated tracking session.
//!
//! Stands in for the platform AR runtime: a fixed (optionally jittered)
//! camera looking at a static world of planes and feature points, with
//! tracking quality scripted per tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bevy::math::{Mat4, Vec3};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tapanchor_core::{
    Anchor, DisplayRotation, Frame, HitResult, PlaneTrackable, PointTrackable, Pose, TextureId,
    Trackable, TrackingError, TrackingSession, TrackingState,
};

use crate::scenario::Scenario;

/// Feature points closer than this to the ray count as hit, in meters.
pub const POINT_HIT_RADIUS: f32 = 0.05;

/// Host tick counter shared between the host loop and the session.
#[derive(Debug, Clone, Default)]
pub struct SimClock(Arc<AtomicU64>);

impl SimClock {
    pub fn set(&self, tick: u64) {
        self.0.store(tick, Ordering::Relaxed);
    }

    pub fn tick(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Static geometry shared by every frame.
#[derive(Debug)]
struct SimWorld {
    planes: Vec<PlaneTrackable>,
    points: Vec<PointTrackable>,
    fov_y: f32,
}

pub struct SimulatedSession {
    scenario: Arc<Scenario>,
    world: Arc<SimWorld>,
    clock: SimClock,
    rng: ChaCha8Rng,
    resumed: bool,
    resume_failures_left: u32,
    texture: Option<TextureId>,
    rotation: DisplayRotation,
    viewport: (u32, u32),
    last_tracking_state: TrackingState,
}

impl SimulatedSession {
    /// Creates the session, failing the way the runtime would when AR is
    /// not available on the device.
    pub fn create(scenario: Arc<Scenario>, clock: SimClock) -> Result<Self, TrackingError> {
        if let Some(reason) = scenario.unavailable {
            return Err(TrackingError::Unavailable(reason));
        }

        let world = SimWorld {
            planes: scenario.planes.iter().map(|p| p.trackable()).collect(),
            points: scenario.points.iter().map(|p| p.trackable()).collect(),
            fov_y: scenario.fov_y_degrees.to_radians(),
        };
        let [width, height] = scenario.viewport;

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(scenario.seed),
            resume_failures_left: scenario.resume_failures,
            world: Arc::new(world),
            clock,
            resumed: false,
            texture: None,
            rotation: DisplayRotation::default(),
            viewport: (width, height),
            last_tracking_state: TrackingState::Paused,
            scenario,
        })
    }

    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    pub fn camera_texture(&self) -> Option<TextureId> {
        self.texture
    }

    pub fn display_rotation(&self) -> DisplayRotation {
        self.rotation
    }

    fn jittered_camera_pose(&mut self) -> Pose {
        let mut pose = self.scenario.camera.pose();
        let jitter = self.scenario.camera.jitter;
        if jitter > 0.0 {
            pose.translation += Vec3::new(
                self.rng.random_range(-jitter..=jitter),
                self.rng.random_range(-jitter..=jitter),
                self.rng.random_range(-jitter..=jitter),
            );
        }
        pose
    }
}

impl TrackingSession for SimulatedSession {
    fn resume(&mut self) -> Result<(), TrackingError> {
        if self.resume_failures_left > 0 {
            self.resume_failures_left -= 1;
            return Err(TrackingError::CameraNotAvailable);
        }
        self.resumed = true;
        tracing::debug!("[sim] session resumed at tick {}", self.clock.tick());
        Ok(())
    }

    fn pause(&mut self) {
        self.resumed = false;
        tracing::debug!("[sim] session paused at tick {}", self.clock.tick());
    }

    fn set_camera_texture(&mut self, texture: TextureId) {
        self.texture = Some(texture);
    }

    fn set_display_geometry(&mut self, rotation: DisplayRotation, width: u32, height: u32) {
        tracing::debug!(
            "[sim] display geometry {}x{} at {} degrees",
            width,
            height,
            rotation.degrees()
        );
        self.rotation = rotation;
        self.viewport = (width.max(1), height.max(1));
    }

    fn update(&mut self) -> Result<Box<dyn Frame>, TrackingError> {
        if !self.resumed {
            return Err(TrackingError::SessionPaused);
        }

        let tracking_state = self.scenario.tracking_state_at(self.clock.tick());
        self.last_tracking_state = tracking_state;

        Ok(Box::new(SimFrame {
            world: self.world.clone(),
            camera_pose: self.jittered_camera_pose(),
            tracking_state,
            viewport: self.viewport,
        }))
    }

    fn create_anchor(&mut self, hit: &HitResult<'_>) -> Result<Anchor, TrackingError> {
        if self.last_tracking_state != TrackingState::Tracking {
            return Err(TrackingError::NotTracking);
        }
        Ok(Anchor::new(hit.pose))
    }
}

struct SimFrame {
    world: Arc<SimWorld>,
    camera_pose: Pose,
    tracking_state: TrackingState,
    viewport: (u32, u32),
}

impl SimFrame {
    #[allow(clippy::cast_precision_loss)]
    fn aspect(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    /// World-space ray through a screen point, as (origin, unit direction).
    #[allow(clippy::cast_precision_loss)]
    fn screen_ray(&self, x: f32, y: f32) -> (Vec3, Vec3) {
        let (width, height) = (self.viewport.0 as f32, self.viewport.1 as f32);
        let ndc_x = 2.0 * x / width - 1.0;
        let ndc_y = 1.0 - 2.0 * y / height;
        let half_height = (self.world.fov_y * 0.5).tan();

        let local = Vec3::new(ndc_x * half_height * self.aspect(), ndc_y * half_height, -1.0);
        let direction = (self.camera_pose.rotation * local).normalize();
        (self.camera_pose.translation, direction)
    }
}

impl Frame for SimFrame {
    fn camera_pose(&self) -> Pose {
        self.camera_pose
    }

    fn tracking_state(&self) -> TrackingState {
        self.tracking_state
    }

    fn projection_matrix(&self, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.world.fov_y, self.aspect(), near, far)
    }

    fn hit_test(&self, x: f32, y: f32) -> Vec<HitResult<'_>> {
        let (origin, direction) = self.screen_ray(x, y);
        let mut hits = Vec::new();

        // Infinite planes; the polygon check is left to the caller.
        for plane in &self.world.planes {
            let normal = plane.center_pose.up();
            let denom = normal.dot(direction);
            if denom.abs() < 1e-6 {
                continue;
            }
            let distance = normal.dot(plane.center_pose.translation - origin) / denom;
            if distance <= 0.0 {
                continue;
            }
            hits.push(HitResult {
                pose: Pose::new(origin + direction * distance, plane.center_pose.rotation),
                distance,
                trackable: Trackable::Plane(plane),
            });
        }

        for point in &self.world.points {
            let to_point = point.pose.translation - origin;
            let distance = to_point.dot(direction);
            if distance <= 0.0 {
                continue;
            }
            let closest = origin + direction * distance;
            if closest.distance(point.pose.translation) > POINT_HIT_RADIUS {
                continue;
            }
            hits.push(HitResult {
                pose: point.pose,
                distance,
                trackable: Trackable::Point(point),
            });
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
