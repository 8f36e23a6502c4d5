//! Application configuration.

use std::path::Path;

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tracking::TextureId;

/// RGBA color representation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
}

/// The object that gets cloned at every placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TemplateConfig {
    /// Initial position of the template itself, in meters.
    pub position: [f32; 3],
    pub color: Rgba,
    /// Texture asset name applied to the material.
    pub texture: Option<String>,
}

impl TemplateConfig {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            // One meter in front of the initial camera.
            position: [0.0, 0.0, -1.0],
            color: Rgba::BLACK,
            texture: Some("droid".to_string()),
        }
    }
}

/// Top-level configuration for the AR scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArConfig {
    /// Near clip plane for the projection matrix, in meters.
    pub near_clip: f32,
    /// Far clip plane for the projection matrix, in meters.
    pub far_clip: f32,
    /// Texture name the session streams the camera image into.
    pub camera_texture: u32,
    pub template: TemplateConfig,
}

impl Default for ArConfig {
    fn default() -> Self {
        Self {
            near_clip: 0.1,
            far_clip: 100.0,
            camera_texture: 0,
            template: TemplateConfig::default(),
        }
    }
}

impl ArConfig {
    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (near, far) = (self.near_clip, self.far_clip);
        if !(near > 0.0 && far > near && far.is_finite()) {
            return Err(ConfigError::InvalidClipPlanes { near, far });
        }
        Ok(())
    }

    pub fn camera_texture(&self) -> TextureId {
        TextureId(self.camera_texture)
    }
}
