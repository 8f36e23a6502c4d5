//! ECS Messages for the AR scene.

use bevy::prelude::*;

use crate::tracking::AnchorId;

/// Message fired when a tap placed a new object.
#[derive(Message, Debug, Clone)]
pub struct ObjectPlaced {
    /// The spawned clone.
    pub entity: Entity,
    /// Anchor the object was placed at.
    pub anchor: AnchorId,
    /// World position of the object.
    pub translation: Vec3,
}

/// Why a tap did not produce an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapDiscardReason {
    /// No hit was a plane inside its polygon or an oriented point.
    NoAcceptableHit,
    /// Tracking had stopped when the tap was taken.
    NotTracking,
    /// The session refused to create an anchor.
    AnchorFailed,
}

/// Message fired when a consumed tap was dropped without placing anything.
#[derive(Message, Debug, Clone)]
pub struct TapDiscarded {
    pub x: f32,
    pub y: f32,
    pub reason: TapDiscardReason,
}
