//! Single-slot handoff of taps from the input thread to the render tick.

use std::sync::Arc;

use bevy::prelude::Resource;
use parking_lot::Mutex;

/// A screen-space tap, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTap {
    pub x: f32,
    pub y: f32,
}

/// Capacity-1 tap buffer with overwrite-on-full semantics.
///
/// The input path calls [`record`](Self::record) and the render tick calls
/// [`poll`](Self::poll). If two taps arrive between polls the earlier one
/// is lost; only the most recent tap is ever placed.
#[derive(Resource, Clone, Default)]
pub struct TapSlot {
    inner: Arc<Mutex<Option<PendingTap>>>,
}

impl TapSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a tap, replacing any tap that has not been consumed yet.
    pub fn record(&self, x: f32, y: f32) {
        let previous = self.inner.lock().replace(PendingTap { x, y });
        if let Some(dropped) = previous {
            tracing::debug!(
                "[tap] overwrote unconsumed tap at ({:.1}, {:.1})",
                dropped.x,
                dropped.y
            );
        }
    }

    /// Takes the pending tap, leaving the slot empty.
    pub fn poll(&self) -> Option<PendingTap> {
        self.inner.lock().take()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_none()
    }
}
