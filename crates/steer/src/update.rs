//! World update passes that run before the behaviors each frame.

use steer_core::Scene;

use crate::components::{Crosshair, Transform};
use crate::math::Vec2;

/// Moves every crosshair to `target`. Returns how many were moved.
pub fn crosshair(target: Vec2, scene: &mut Scene) -> usize {
    let mut moved = 0;
    let mut cursor = scene.view::<(Crosshair, Transform)>().cursor();
    while let Some(id) = cursor.advance(scene) {
        if let Ok(transform) = scene.get_component_mut::<Transform>(id) {
            transform.position = target;
            moved += 1;
        }
    }
    moved
}

/// Wraps positions that left the `width × height` world to the opposite
/// edge. Returns how many entities were wrapped.
pub fn wraparound(width: f32, height: f32, scene: &mut Scene) -> usize {
    let mut wrapped = 0;
    let mut cursor = scene.view::<(Transform,)>().cursor();
    while let Some(id) = cursor.advance(scene) {
        let Ok(transform) = scene.get_component_mut::<Transform>(id) else {
            continue;
        };

        let before = transform.position;
        transform.position.x = wrap_axis(before.x, width);
        transform.position.y = wrap_axis(before.y, height);
        if transform.position != before {
            wrapped += 1;
        }
    }
    if wrapped > 0 {
        tracing::trace!(wrapped, "wrapped entities around world edges");
    }
    wrapped
}

fn wrap_axis(value: f32, max: f32) -> f32 {
    if max < value {
        0.0
    } else if value < 0.0 {
        max
    } else {
        value
    }
}
