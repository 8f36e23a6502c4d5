//! Input capture.

use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;

use crate::tap::TapSlot;

/// System to forward touch-up events into the tap slot.
///
/// Runs every frame regardless of lifecycle state. Releases are applied in
/// arrival order, so when several touches end in the same frame only the
/// last one survives.
pub fn capture_touch_releases(mut touches: MessageReader<TouchInput>, taps: Res<TapSlot>) {
    for touch in touches.read() {
        if touch.phase == TouchPhase::Ended {
            taps.record(touch.position.x, touch.position.y);
        }
    }
}
