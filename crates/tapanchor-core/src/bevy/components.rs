//! ECS Components for the AR scene.

use bevy::prelude::*;

use crate::config::Rgba;
use crate::tracking::{AnchorId, TextureId};

/// Scene camera driven by the tracking session.
///
/// The entity's `Transform` holds the camera-to-world pose; `view` holds
/// its inverse. Both are refreshed every tick while tracking.
#[derive(Component, Debug, Clone)]
pub struct TrackedCamera {
    /// Clip-from-camera projection.
    pub projection: Mat4,
    /// Camera-from-world (view) matrix.
    pub view: Mat4,
}

impl Default for TrackedCamera {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}

/// Full-screen quad showing the camera image.
#[derive(Component, Debug, Clone)]
pub struct CameraBackground {
    /// Texture the session streams camera frames into.
    pub texture: TextureId,
}

/// Surface appearance of a scene object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMaterial {
    pub color: Rgba,
    /// Texture asset name.
    pub texture: Option<String>,
}

/// A renderable node in the scene graph.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub material: ObjectMaterial,
}

/// Marker for the object that every placement clones.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TemplateObject;

/// Object placed by a tap, registered to an anchor.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlacedObject {
    pub anchor: AnchorId,
}
