//! Scene initialization.

use bevy::prelude::*;

use crate::bevy::{
    ArSettings, CameraBackground, ObjectMaterial, SceneObject, TemplateObject, TrackedCamera,
};

/// Spawns the tracked camera, the camera background and the template object.
///
/// The template is a regular scene object: it is visible at its configured
/// position and every placement clones it.
pub fn setup_scene(mut commands: Commands, settings: Res<ArSettings>) {
    let config = &settings.0;

    commands.spawn((TrackedCamera::default(), Transform::default()));

    commands.spawn(CameraBackground {
        texture: config.camera_texture(),
    });

    let position = config.template.position();
    commands.spawn((
        TemplateObject,
        SceneObject {
            material: ObjectMaterial {
                color: config.template.color,
                texture: config.template.texture.clone(),
            },
        },
        Transform::from_translation(position),
    ));

    tracing::info!(
        "[scene] template spawned at ({:.2}, {:.2}, {:.2})",
        position.x,
        position.y,
        position.z
    );
}
