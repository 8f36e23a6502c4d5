//! Bevy plugin for the AR scene.
//!
//! `ArPlugin` contains all logic and no rendering or window dependencies.
//! Hosts add it next to `MinimalPlugins` (or a full renderer), together with
//! `StatesPlugin` and `InputPlugin`.

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::bevy::events::*;
use crate::bevy::resources::*;
use crate::bevy::systems;
use crate::config::ArConfig;
use crate::tap::TapSlot;
use crate::tracking::TrackingSession;

/// Lifecycle of the scene renderer.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArLifecycle {
    #[default]
    Created,
    Resumed,
    Paused,
}

/// Per-tick phases, chained in `Update` and active only while `Resumed`.
///
/// Systems that need this tick's frame go in `OnFrame`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArTickSet {
    /// Display reconciliation, texture binding, frame acquisition.
    BeginFrame,
    /// Per-frame application logic.
    OnFrame,
    /// Projection and view push into the scene camera.
    PushCamera,
}

/// Plugin wiring a tracking session into the app.
pub struct ArPlugin {
    session: Mutex<Option<Box<dyn TrackingSession>>>,
    pub config: ArConfig,
    pub command_queue: Option<ArCommandQueue>,
    pub tap_slot: Option<TapSlot>,
}

impl ArPlugin {
    pub fn new(session: impl TrackingSession) -> Self {
        Self {
            session: Mutex::new(Some(Box::new(session))),
            config: ArConfig::default(),
            command_queue: None,
            tap_slot: None,
        }
    }

    pub fn with_config(mut self, config: ArConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares a command queue with the platform side.
    pub fn with_command_queue(mut self, queue: ArCommandQueue) -> Self {
        self.command_queue = Some(queue);
        self
    }

    /// Shares a tap slot with the platform input side.
    pub fn with_tap_slot(mut self, taps: TapSlot) -> Self {
        self.tap_slot = Some(taps);
        self
    }
}

impl Plugin for ArPlugin {
    fn build(&self, app: &mut App) {
        // ====================================================================
        // States
        // ====================================================================
        app.init_state::<ArLifecycle>();

        // ====================================================================
        // Resources
        // ====================================================================
        if let Some(session) = self.session.lock().take() {
            app.insert_resource(ArSession::from_boxed(session));
        } else {
            tracing::warn!("[ar] ArPlugin built twice; keeping the first session");
        }

        app.insert_resource(ArSettings::new(self.config.clone()))
            .insert_resource(self.command_queue.clone().unwrap_or_default())
            .insert_resource(self.tap_slot.clone().unwrap_or_default())
            .init_resource::<CurrentFrame>()
            .init_resource::<AnchorRegistry>()
            .init_resource::<DisplayGeometry>();

        // ====================================================================
        // Messages
        // ====================================================================
        app.add_message::<ObjectPlaced>().add_message::<TapDiscarded>();

        // ====================================================================
        // Scene init and lifecycle
        // ====================================================================
        app.add_systems(Startup, systems::setup_scene);
        app.add_systems(PreUpdate, systems::process_commands);
        app.add_systems(OnEnter(ArLifecycle::Paused), systems::suspend_session);

        // ====================================================================
        // Per-tick chain (Resumed only)
        // ====================================================================
        app.configure_sets(
            Update,
            (ArTickSet::BeginFrame, ArTickSet::OnFrame, ArTickSet::PushCamera).chain(),
        );
        for set in [ArTickSet::BeginFrame, ArTickSet::OnFrame, ArTickSet::PushCamera] {
            app.configure_sets(Update, set.run_if(in_state(ArLifecycle::Resumed)));
        }

        // Taps are captured in every state and consumed by the next tick.
        app.add_systems(
            Update,
            systems::capture_touch_releases.before(ArTickSet::BeginFrame),
        );

        app.add_systems(Update, systems::begin_frame.in_set(ArTickSet::BeginFrame));
        app.add_systems(Update, systems::place_on_tap.in_set(ArTickSet::OnFrame));
        app.add_systems(
            Update,
            systems::push_camera_matrices.in_set(ArTickSet::PushCamera),
        );
    }
}
