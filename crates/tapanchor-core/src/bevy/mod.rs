//! Bevy integration for tapanchor.
//!
//! The ECS world is the scene graph. This module provides the lifecycle
//! state machine, the per-tick system chain that pulls frames from the
//! tracking session and drives the scene camera, and tap-to-place.

pub mod components;
pub mod events;
pub mod plugin;
pub mod resources;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use components::*;
pub use events::*;
pub use plugin::{ArLifecycle, ArPlugin, ArTickSet};
pub use resources::*;
