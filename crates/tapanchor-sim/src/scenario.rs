//! Scenario files for the simulated tracking session.
//!
//! A scenario describes a small static world (planes and feature points), a
//! camera looking at it, and a script of taps, tracking changes and
//! lifecycle events keyed by host tick.

use std::path::Path;

use bevy::math::{EulerRot, Quat, Vec2, Vec3};
use serde::Deserialize;
use tapanchor_core::{
    DisplayRotation, PlaneTrackable, PointOrientationMode, PointTrackable, Pose, TrackingState,
    UnavailableReason,
};

const BUILTIN_TABLETOP: &str = include_str!("../scenarios/tabletop.json");

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid scenario: {0}")]
    Invalid(String),
}

/// Fixed camera with optional per-frame positional jitter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScenarioCamera {
    pub position: [f32; 3],
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    /// Maximum jitter per axis, in meters.
    pub jitter: f32,
}

impl Default for ScenarioCamera {
    fn default() -> Self {
        Self {
            position: [0.0, 1.5, 0.0],
            yaw_degrees: 0.0,
            pitch_degrees: -45.0,
            jitter: 0.0,
        }
    }
}

impl ScenarioCamera {
    pub fn pose(&self) -> Pose {
        Pose::new(
            Vec3::from_array(self.position),
            yaw_pitch(self.yaw_degrees, self.pitch_degrees),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPlane {
    pub center: [f32; 3],
    #[serde(default)]
    pub yaw_degrees: f32,
    /// Boundary in plane-local `[x, z]`.
    pub polygon: Vec<[f32; 2]>,
}

impl ScenarioPlane {
    pub fn trackable(&self) -> PlaneTrackable {
        PlaneTrackable::new(
            Pose::new(
                Vec3::from_array(self.center),
                yaw_pitch(self.yaw_degrees, 0.0),
            ),
            self.polygon.iter().copied().map(Vec2::from_array).collect(),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPoint {
    pub position: [f32; 3],
    /// Whether the point carries an estimated surface normal.
    #[serde(default)]
    pub surface_normal: bool,
}

impl ScenarioPoint {
    pub fn trackable(&self) -> PointTrackable {
        PointTrackable {
            pose: Pose::from_translation(Vec3::from_array(self.position)),
            orientation_mode: if self.surface_normal {
                PointOrientationMode::EstimatedSurfaceNormal
            } else {
                PointOrientationMode::Initialized
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedTracking {
    Tracking,
    Paused,
    Stopped,
}

impl From<ScriptedTracking> for TrackingState {
    fn from(value: ScriptedTracking) -> Self {
        match value {
            ScriptedTracking::Tracking => TrackingState::Tracking,
            ScriptedTracking::Paused => TrackingState::Paused,
            ScriptedTracking::Stopped => TrackingState::Stopped,
        }
    }
}

/// Tracking state override for ticks `from_tick..to_tick`.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingSpan {
    pub from_tick: u64,
    pub to_tick: u64,
    pub state: ScriptedTracking,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScriptedTap {
    pub tick: u64,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    Pause,
    Resume,
    Rotate { degrees: u32 },
    Resize { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScriptedEvent {
    pub tick: u64,
    #[serde(flatten)]
    pub event: LifecycleEvent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub ticks: u64,
    /// Viewport `[width, height]` in pixels.
    pub viewport: [u32; 2],
    /// Vertical field of view of the simulated camera.
    pub fov_y_degrees: f32,
    pub camera: ScenarioCamera,
    pub planes: Vec<ScenarioPlane>,
    pub points: Vec<ScenarioPoint>,
    pub tracking: Vec<TrackingSpan>,
    pub taps: Vec<ScriptedTap>,
    pub events: Vec<ScriptedEvent>,
    /// Number of resume attempts that fail before the camera opens.
    pub resume_failures: u32,
    /// Session creation fails with this reason when set.
    pub unavailable: Option<UnavailableReason>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            seed: 0,
            ticks: 60,
            viewport: [1080, 1920],
            fov_y_degrees: 60.0,
            camera: ScenarioCamera::default(),
            planes: Vec::new(),
            points: Vec::new(),
            tracking: Vec::new(),
            taps: Vec::new(),
            events: Vec::new(),
            resume_failures: 0,
            unavailable: None,
        }
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The tabletop scenario shipped with the binary.
    pub fn builtin() -> Result<Self, ScenarioError> {
        Self::from_json(BUILTIN_TABLETOP)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        let [width, height] = self.viewport;
        if width == 0 || height == 0 {
            return Err(ScenarioError::Invalid(format!(
                "viewport must be non-empty, got {width}x{height}"
            )));
        }
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(ScenarioError::Invalid(format!(
                "fov_y_degrees out of range: {}",
                self.fov_y_degrees
            )));
        }
        if self.camera.jitter < 0.0 {
            return Err(ScenarioError::Invalid("camera jitter is negative".to_string()));
        }
        for (i, plane) in self.planes.iter().enumerate() {
            if plane.polygon.len() < 3 {
                return Err(ScenarioError::Invalid(format!(
                    "plane {i} polygon has {} vertices",
                    plane.polygon.len()
                )));
            }
        }
        for span in &self.tracking {
            if span.from_tick > span.to_tick {
                return Err(ScenarioError::Invalid(format!(
                    "tracking span {}..{} is reversed",
                    span.from_tick, span.to_tick
                )));
            }
        }
        for scripted in &self.events {
            if let LifecycleEvent::Rotate { degrees } = scripted.event {
                rotation_from_degrees(degrees)?;
            }
        }
        Ok(())
    }

    /// Scripted tracking state at a tick. Later spans win.
    pub fn tracking_state_at(&self, tick: u64) -> TrackingState {
        self.tracking
            .iter()
            .rev()
            .find(|span| (span.from_tick..span.to_tick).contains(&tick))
            .map_or(TrackingState::Tracking, |span| span.state.into())
    }

    pub fn taps_at(&self, tick: u64) -> impl Iterator<Item = &ScriptedTap> {
        self.taps.iter().filter(move |tap| tap.tick == tick)
    }

    pub fn events_at(&self, tick: u64) -> impl Iterator<Item = LifecycleEvent> + '_ {
        self.events
            .iter()
            .filter(move |scripted| scripted.tick == tick)
            .map(|scripted| scripted.event)
    }
}

pub fn rotation_from_degrees(degrees: u32) -> Result<DisplayRotation, ScenarioError> {
    match degrees {
        0 => Ok(DisplayRotation::Rotation0),
        90 => Ok(DisplayRotation::Rotation90),
        180 => Ok(DisplayRotation::Rotation180),
        270 => Ok(DisplayRotation::Rotation270),
        other => Err(ScenarioError::Invalid(format!(
            "display rotation must be a multiple of 90, got {other}"
        ))),
    }
}

fn yaw_pitch(yaw_degrees: f32, pitch_degrees: f32) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        yaw_degrees.to_radians(),
        pitch_degrees.to_radians(),
        0.0,
    )
}
