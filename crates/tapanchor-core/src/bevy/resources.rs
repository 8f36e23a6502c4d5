//! ECS Resources for the AR scene.
//!
//! These resources hold the tracking session, the current frame and the
//! platform-facing queues.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::config::ArConfig;
use crate::tracking::{Anchor, DisplayRotation, Frame, TrackingSession, TrackingState};

/// The external tracking session.
#[derive(Resource)]
pub struct ArSession {
    inner: Box<dyn TrackingSession>,
}

impl ArSession {
    pub fn new(session: impl TrackingSession) -> Self {
        Self::from_boxed(Box::new(session))
    }

    pub fn from_boxed(inner: Box<dyn TrackingSession>) -> Self {
        Self { inner }
    }

    pub fn session_mut(&mut self) -> &mut dyn TrackingSession {
        self.inner.as_mut()
    }
}

/// Configuration resource.
#[derive(Resource, Debug, Clone, Default)]
pub struct ArSettings(pub ArConfig);

impl ArSettings {
    pub fn new(config: ArConfig) -> Self {
        Self(config)
    }
}

/// The frame for the current tick.
///
/// Replaced at the start of every tick and dropped on pause, so nothing
/// derived from it survives into the next tick.
#[derive(Resource, Default)]
pub struct CurrentFrame {
    frame: Option<Box<dyn Frame>>,
    /// Real time since app start when the frame was pulled.
    pub elapsed_realtime: Duration,
    /// Seconds since the previous tick.
    pub delta_seconds: f64,
    /// Number of frames pulled so far.
    pub tick: u64,
}

impl CurrentFrame {
    pub fn frame(&self) -> Option<&dyn Frame> {
        self.frame.as_deref()
    }

    pub fn tracking_state(&self) -> Option<TrackingState> {
        self.frame().map(Frame::tracking_state)
    }

    pub fn replace(
        &mut self,
        frame: Box<dyn Frame>,
        elapsed_realtime: Duration,
        delta_seconds: f64,
    ) {
        self.frame = Some(frame);
        self.elapsed_realtime = elapsed_realtime;
        self.delta_seconds = delta_seconds;
        self.tick += 1;
    }

    pub fn clear(&mut self) {
        self.frame = None;
    }
}

/// Anchors created by placements.
///
/// Anchor poses are read once at creation; placed objects do not follow
/// later refinements.
#[derive(Resource, Default)]
pub struct AnchorRegistry {
    anchors: Vec<Anchor>,
}

impl AnchorRegistry {
    pub fn insert(&mut self, anchor: Anchor) {
        self.anchors.push(anchor);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

/// Tracks viewport size and rotation and forwards changes to the session.
///
/// Changes are recorded as they arrive and pushed to the session once, on
/// the next tick. Nothing is pushed while suspended.
#[derive(Resource, Debug, Default)]
pub struct DisplayGeometry {
    pub rotation: DisplayRotation,
    pub width: u32,
    pub height: u32,
    changed: bool,
    active: bool,
}

impl DisplayGeometry {
    pub fn on_resume(&mut self) {
        self.active = true;
    }

    pub fn on_pause(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.changed = true;
    }

    pub fn on_rotation_changed(&mut self, rotation: DisplayRotation) {
        if self.rotation != rotation {
            self.rotation = rotation;
            self.changed = true;
        }
    }

    pub fn has_pending_change(&self) -> bool {
        self.changed
    }

    /// Pushes a pending change to the session. Returns true if it did.
    pub fn update_session_if_needed(&mut self, session: &mut dyn TrackingSession) -> bool {
        if !(self.active && self.changed) {
            return false;
        }
        session.set_display_geometry(self.rotation, self.width, self.height);
        self.changed = false;
        true
    }
}

/// Platform signals delivered to the app.
#[derive(Debug, Clone, PartialEq)]
pub enum ArCommand {
    /// The host became visible; resume the session and start ticking.
    Resume,
    /// The host is going away; stop ticking and pause the session.
    Pause,
    /// The render surface was resized.
    SurfaceChanged { width: u32, height: u32 },
    /// The display was rotated.
    DisplayRotated { rotation: DisplayRotation },
}

/// Thread-safe command queue for the platform lifecycle thread.
///
/// Commands are processed by Bevy systems on the next frame.
#[derive(Resource, Clone)]
pub struct ArCommandQueue {
    inner: Arc<Mutex<VecDeque<ArCommand>>>,
}

impl ArCommandQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Push a command to be processed.
    pub fn push(&self, command: ArCommand) {
        self.inner.lock().push_back(command);
    }

    /// Take the oldest pending command.
    pub fn pop(&self) -> Option<ArCommand> {
        self.inner.lock().pop_front()
    }

    /// Check if there are pending commands.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for ArCommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
