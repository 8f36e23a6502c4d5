//! Tap-to-place.
//!
//! Registered in `ArTickSet::OnFrame`: it sees this tick's frame before the
//! camera is updated from it.

use bevy::prelude::*;

use crate::bevy::{
    AnchorRegistry, ArSession, CurrentFrame, ObjectPlaced, PlacedObject, SceneObject,
    TapDiscardReason, TapDiscarded, TemplateObject,
};
use crate::tap::TapSlot;
use crate::trackable::first_acceptable_hit;
use crate::tracking::TrackingState;

/// System to place a clone of the template object where the pending tap hits.
///
/// No hit-test runs unless tracking. While tracking is paused the tap is left
/// pending; once tracking has stopped it is dropped. Otherwise the tap is
/// consumed: the first hit that is a plane inside its polygon or
/// an oriented point gets an anchor and a clone. Taps that hit nothing
/// usable, or whose anchor cannot be created, are dropped.
#[allow(clippy::too_many_arguments)]
pub fn place_on_tap(
    mut commands: Commands,
    current: Res<CurrentFrame>,
    taps: Res<TapSlot>,
    mut session: ResMut<ArSession>,
    mut anchors: ResMut<AnchorRegistry>,
    templates: Query<(&SceneObject, &Transform), With<TemplateObject>>,
    mut placed_events: MessageWriter<ObjectPlaced>,
    mut discarded_events: MessageWriter<TapDiscarded>,
) {
    let Some(frame) = current.frame() else {
        return;
    };

    match frame.tracking_state() {
        TrackingState::Tracking => {}
        // Tracking may come back; the tap waits for it.
        TrackingState::Paused => return,
        TrackingState::Stopped => {
            if let Some(tap) = taps.poll() {
                tracing::debug!(
                    "[placement] tracking stopped, dropping tap ({:.1}, {:.1})",
                    tap.x,
                    tap.y
                );
                discarded_events.write(TapDiscarded {
                    x: tap.x,
                    y: tap.y,
                    reason: TapDiscardReason::NotTracking,
                });
            }
            return;
        }
    }

    let Some(tap) = taps.poll() else {
        return;
    };

    let Ok((template, template_transform)) = templates.single() else {
        tracing::warn!("[placement] no template object, dropping tap");
        return;
    };

    let hits = frame.hit_test(tap.x, tap.y);
    let Some(hit) = first_acceptable_hit(&hits) else {
        tracing::debug!(
            "[placement] tap ({:.1}, {:.1}) hit nothing placeable ({} hits)",
            tap.x,
            tap.y,
            hits.len()
        );
        discarded_events.write(TapDiscarded {
            x: tap.x,
            y: tap.y,
            reason: TapDiscardReason::NoAcceptableHit,
        });
        return;
    };

    let anchor = match session.session_mut().create_anchor(hit) {
        Ok(anchor) => anchor,
        Err(err) => {
            tracing::warn!("[placement] anchor creation failed: {}", err);
            discarded_events.write(TapDiscarded {
                x: tap.x,
                y: tap.y,
                reason: TapDiscardReason::AnchorFailed,
            });
            return;
        }
    };

    // Read once; the object does not follow later anchor refinements.
    let translation = anchor.pose.translation;
    let entity = commands
        .spawn((
            template.clone(),
            Transform {
                translation,
                ..*template_transform
            },
            PlacedObject { anchor: anchor.id },
        ))
        .id();

    tracing::info!(
        "[placement] tick {}: object {:?} at ({:.3}, {:.3}, {:.3}), anchor {}",
        current.tick,
        entity,
        translation.x,
        translation.y,
        translation.z,
        anchor.id
    );

    placed_events.write(ObjectPlaced {
        entity,
        anchor: anchor.id,
        translation,
    });
    anchors.insert(anchor);
}
