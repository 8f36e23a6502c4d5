//! Tapanchor simulator
//!
//! Runs the AR scene headless against a simulated tracking session and a
//! scripted scenario, then prints where objects were placed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use argh::FromArgs;
use tapanchor_core::ArConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::host::SimHost;
use crate::scenario::Scenario;

mod host;
mod scenario;
mod session;

/// Runs tapanchor against a simulated tracking session.
#[derive(Debug, FromArgs)]
struct Args {
    /// scenario JSON file; the built-in tabletop scenario when omitted
    #[argh(option, short = 's')]
    scenario: Option<PathBuf>,

    /// AR config JSON file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// number of ticks to run, overriding the scenario
    #[argh(option, short = 't')]
    ticks: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Args = argh::from_env();

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => Scenario::builtin().context("loading built-in scenario")?,
    };
    let config = match &args.config {
        Some(path) => {
            ArConfig::load(path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => ArConfig::default(),
    };
    let ticks = args.ticks.unwrap_or(scenario.ticks);

    tracing::info!(
        "[sim] scenario '{}': {} planes, {} points, {} taps, {} ticks",
        scenario.name,
        scenario.planes.len(),
        scenario.points.len(),
        scenario.taps.len(),
        ticks
    );

    let mut host = match SimHost::new(Arc::new(scenario), config) {
        Ok(host) => host,
        Err(err) => {
            tracing::error!("[sim] {}", err.user_message());
            return Err(err).context("creating AR session");
        }
    };

    let summary = host.run(ticks);

    for (frame, translation) in &summary.placed {
        tracing::info!(
            "[sim] frame {}: placed at ({:.3}, {:.3}, {:.3})",
            frame,
            translation.x,
            translation.y,
            translation.z
        );
    }
    for (frame, reason) in &summary.discarded {
        tracing::info!("[sim] frame {}: tap discarded ({:?})", frame, reason);
    }
    tracing::info!(
        "[sim] '{}' done: {} ticks, {} frames, {} placed, {} discarded, ended {:?}, camera at {:?}",
        summary.scenario,
        summary.ticks,
        summary.frames,
        summary.placed.len(),
        summary.discarded.len(),
        summary.lifecycle,
        summary.camera_translation
    );

    Ok(())
}
