//! Headless host loop.
//!
//! Plays the part of the platform activity: owns the Bevy app, forwards
//! surface and lifecycle signals to the command queue, delivers taps to the
//! tap slot and steps the app once per tick.

use std::sync::Arc;

use bevy::prelude::*;
use tapanchor_core::bevy::{
    ArCommand, ArCommandQueue, ArLifecycle, ArPlugin, ArTickSet, CurrentFrame, ObjectPlaced,
    TapDiscardReason, TapDiscarded, TrackedCamera,
};
use tapanchor_core::{ArConfig, TapSlot, TrackingError};

use crate::scenario::{LifecycleEvent, Scenario, rotation_from_degrees};
use crate::session::{SimClock, SimulatedSession};

/// Ticks between resume attempts while the camera is unavailable.
pub const RESUME_RETRY_TICKS: u64 = 10;

/// Outcomes of taps, in order, keyed by the frame number they resolved on.
#[derive(Resource, Debug, Default)]
pub struct PlacementLog {
    pub placed: Vec<(u64, Vec3)>,
    pub discarded: Vec<(u64, TapDiscardReason)>,
}

fn record_placements(
    current: Res<CurrentFrame>,
    mut placed: MessageReader<ObjectPlaced>,
    mut discarded: MessageReader<TapDiscarded>,
    mut log: ResMut<PlacementLog>,
) {
    for event in placed.read() {
        log.placed.push((current.tick, event.translation));
    }
    for event in discarded.read() {
        log.discarded.push((current.tick, event.reason));
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub scenario: String,
    pub ticks: u64,
    pub frames: u64,
    pub placed: Vec<(u64, Vec3)>,
    pub discarded: Vec<(u64, TapDiscardReason)>,
    pub lifecycle: ArLifecycle,
    pub camera_translation: Vec3,
}

pub struct SimHost {
    app: App,
    scenario: Arc<Scenario>,
    clock: SimClock,
    commands: ArCommandQueue,
    taps: TapSlot,
    /// False between a scripted pause and the next scripted resume.
    wants_resumed: bool,
    next_resume_attempt: u64,
}

impl SimHost {
    pub fn new(scenario: Arc<Scenario>, config: ArConfig) -> Result<Self, TrackingError> {
        let clock = SimClock::default();
        let session = SimulatedSession::create(scenario.clone(), clock.clone())?;
        let commands = ArCommandQueue::new();
        let taps = TapSlot::new();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.add_plugins(bevy::input::InputPlugin);
        app.add_plugins(
            ArPlugin::new(session)
                .with_config(config)
                .with_command_queue(commands.clone())
                .with_tap_slot(taps.clone()),
        );
        app.init_resource::<PlacementLog>();
        app.add_systems(Update, record_placements.after(ArTickSet::OnFrame));

        let [width, height] = scenario.viewport;
        commands.push(ArCommand::SurfaceChanged { width, height });

        Ok(Self {
            app,
            scenario,
            clock,
            commands,
            taps,
            wants_resumed: true,
            next_resume_attempt: 0,
        })
    }

    pub fn lifecycle(&self) -> ArLifecycle {
        *self.app.world().resource::<State<ArLifecycle>>().get()
    }

    /// Runs one tick: scripted input first, then one app update.
    pub fn step(&mut self, tick: u64) {
        self.clock.set(tick);

        let events: Vec<_> = self.scenario.events_at(tick).collect();
        for event in events {
            self.apply_event(tick, event);
        }

        if self.wants_resumed
            && self.lifecycle() != ArLifecycle::Resumed
            && tick >= self.next_resume_attempt
        {
            tracing::debug!("[host] tick {}: requesting resume", tick);
            self.commands.push(ArCommand::Resume);
            self.next_resume_attempt = tick + RESUME_RETRY_TICKS;
        }

        for tap in self.scenario.taps_at(tick) {
            tracing::debug!("[host] tick {}: tap at ({}, {})", tick, tap.x, tap.y);
            self.taps.record(tap.x, tap.y);
        }

        self.app.update();
    }

    fn apply_event(&mut self, tick: u64, event: LifecycleEvent) {
        tracing::info!("[host] tick {}: {:?}", tick, event);
        match event {
            LifecycleEvent::Pause => {
                self.wants_resumed = false;
                self.commands.push(ArCommand::Pause);
            }
            LifecycleEvent::Resume => {
                self.wants_resumed = true;
                self.next_resume_attempt = tick + RESUME_RETRY_TICKS;
                self.commands.push(ArCommand::Resume);
            }
            LifecycleEvent::Rotate { degrees } => match rotation_from_degrees(degrees) {
                Ok(rotation) => self.commands.push(ArCommand::DisplayRotated { rotation }),
                Err(err) => tracing::warn!("[host] {}", err),
            },
            LifecycleEvent::Resize { width, height } => {
                self.commands.push(ArCommand::SurfaceChanged { width, height });
            }
        }
    }

    /// Runs `ticks` ticks and returns what happened.
    pub fn run(&mut self, ticks: u64) -> RunSummary {
        for tick in 0..ticks {
            self.step(tick);
        }
        self.summary(ticks)
    }

    pub fn summary(&mut self, ticks: u64) -> RunSummary {
        let lifecycle = self.lifecycle();
        let world = self.app.world_mut();
        let frames = world.resource::<CurrentFrame>().tick;
        let log = world.resource::<PlacementLog>();
        let (placed, discarded) = (log.placed.clone(), log.discarded.clone());
        let camera_translation = world
            .query_filtered::<&Transform, With<TrackedCamera>>()
            .single(world)
            .map_or(Vec3::ZERO, |t| t.translation);

        RunSummary {
            scenario: self.scenario.name.clone(),
            ticks,
            frames,
            placed,
            discarded,
            lifecycle,
            camera_translation,
        }
    }
}
