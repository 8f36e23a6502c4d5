//! ECS Systems for the AR scene.

pub mod camera;
pub mod frame;
pub mod input;
pub mod lifecycle;
pub mod placement;
pub mod setup;

pub use camera::*;
pub use frame::*;
pub use input::*;
pub use lifecycle::*;
pub use placement::*;
pub use setup::*;
