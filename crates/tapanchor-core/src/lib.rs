//! Tapanchor Core Library
//!
//! Coordinates an external AR tracking session with a Bevy scene graph:
//! every tick the tracked camera pose is pushed into the scene camera, and
//! taps are ray-cast into the tracked world to place copies of a template
//! object on detected surfaces.
//!
//! This library is split in two layers:
//! - Session layer: tracking traits, poses, trackables and the tap slot
//!   (plain types, no systems or schedules)
//! - Bevy layer: lifecycle state machine, per-tick systems and the plugin

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod pose;
pub mod tap;
pub mod trackable;
pub mod tracking;

// Bevy integration
pub mod bevy;

pub use config::{ArConfig, Rgba, TemplateConfig};
pub use error::{ConfigError, TrackingError, UnavailableReason};
pub use pose::Pose;
pub use tap::{PendingTap, TapSlot};
pub use trackable::{
    PlaneTrackable, PointOrientationMode, PointTrackable, Trackable, first_acceptable_hit,
    hit_is_acceptable,
};
pub use tracking::{
    Anchor, AnchorId, DisplayRotation, Frame, HitResult, TextureId, TrackingSession,
    TrackingState,
};
