//! # Steering Behaviors
//!
//! Each behavior is a pass over the entities carrying its marker component
//! plus [`Transform`] and [`Move`]. A pass computes a steering force toward
//! (or away from) a target point, then integrates it:
//!
//! ```text
//! steering     = clamp(desired_velocity - velocity, max_force)
//! velocity    += steering / mass * dt        (clamped to max_speed)
//! position    += velocity * dt
//! rotation     = normalize(velocity)         (only while moving)
//! ```
//!
//! Passes return the number of entities they integrated.

use steer_core::{ComponentSet, EntityId, Scene};

use crate::components::{Arrive, Flee, Move, Seek, Transform};
use crate::math::{Vec2, EPSILON};

/// Seek: head for `target` at full speed.
pub fn seek(target: Vec2, scene: &mut Scene, dt: f32) -> usize {
    let steered = steer_each::<(Seek, Transform, Move), _>(scene, dt, |_, _, transform, movement| {
        let (direction, _) = heading_to(target, transform)?;
        Some(steering_force(direction * movement.max_speed, movement))
    });
    tracing::trace!(steered, "seek pass");
    steered
}

/// Flee: run from `target` while it is within the entity's [`Flee::radius`].
///
/// Outside the radius no force is applied and the entity coasts.
pub fn flee(target: Vec2, scene: &mut Scene, dt: f32) -> usize {
    let steered = steer_each::<(Flee, Transform, Move), _>(scene, dt, |scene, id, transform, movement| {
        let flee = scene.get_component::<Flee>(id).ok()?;
        let (toward, distance) = heading_to(target, transform)?;
        if flee.radius < distance {
            return Some(Vec2::ZERO);
        }
        Some(steering_force(-toward * movement.max_speed, movement))
    });
    tracing::trace!(steered, "flee pass");
    steered
}

/// Arrive: head for `target`, slowing down as it gets close.
///
/// The desired speed is `distance / (deceleration × 0.3)`, capped at the
/// entity's max speed.
pub fn arrive(target: Vec2, scene: &mut Scene, dt: f32) -> usize {
    let steered = steer_each::<(Arrive, Transform, Move), _>(scene, dt, |scene, id, transform, movement| {
        let arrive = scene.get_component::<Arrive>(id).ok()?;
        let (direction, distance) = heading_to(target, transform)?;
        let speed = (distance / (arrive.deceleration * Arrive::TWEAK)).min(movement.max_speed);
        Some(steering_force(direction * speed, movement))
    });
    tracing::trace!(steered, "arrive pass");
    steered
}

/// Unit direction and distance from the entity to `target`.
///
/// `None` when the entity already sits on the target.
fn heading_to(target: Vec2, transform: &Transform) -> Option<(Vec2, f32)> {
    let offset = target - transform.position;
    let distance = offset.length();
    (distance >= EPSILON).then(|| (offset / distance, distance))
}

/// Force turning the current velocity into `desired`, limited to max force.
fn steering_force(desired: Vec2, movement: &Move) -> Vec2 {
    (desired - movement.velocity).clamp_length(movement.max_force)
}

/// Applies `force` for `dt` seconds.
fn integrate(transform: &mut Transform, movement: &mut Move, force: Vec2, dt: f32) {
    let acceleration = force / movement.mass;
    movement.velocity = (movement.velocity + acceleration * dt).clamp_length(movement.max_speed);
    transform.position += movement.velocity * dt;

    if let Some(heading) = movement.velocity.try_normalize() {
        transform.rotation = heading;
    }
}

/// Runs `force_for` on every entity matched by `Q` and integrates the
/// returned force. Entities for which it returns `None` are left untouched.
fn steer_each<Q, F>(scene: &mut Scene, dt: f32, mut force_for: F) -> usize
where
    Q: ComponentSet,
    F: FnMut(&Scene, EntityId, &Transform, &Move) -> Option<Vec2>,
{
    let mut steered = 0;
    let mut cursor = scene.view::<Q>().cursor();

    while let Some(id) = cursor.advance(scene) {
        let (Ok(&transform), Ok(&movement)) = (
            scene.get_component::<Transform>(id),
            scene.get_component::<Move>(id),
        ) else {
            tracing::warn!(entity = %id, "skipping entity without transform or movement");
            continue;
        };

        let Some(force) = force_for(scene, id, &transform, &movement) else {
            continue;
        };

        let (mut transform, mut movement) = (transform, movement);
        integrate(&mut transform, &mut movement, force, dt);

        if let Ok(slot) = scene.get_component_mut::<Transform>(id) {
            *slot = transform;
        }
        if let Ok(slot) = scene.get_component_mut::<Move>(id) {
            *slot = movement;
        }
        steered += 1;
    }

    steered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(scene: &mut Scene, position: Vec2, movement: Move) -> EntityId {
        let id = scene.new_entity().unwrap();
        scene.add_component(id, Transform::at(position)).unwrap();
        scene.add_component(id, movement).unwrap();
        id
    }

    fn state(scene: &Scene, id: EntityId) -> (Transform, Move) {
        (
            *scene.get_component::<Transform>(id).unwrap(),
            *scene.get_component::<Move>(id).unwrap(),
        )
    }

    #[test]
    fn test_seek_accelerates_toward_target() {
        let mut scene = Scene::new(4);
        let id = agent(&mut scene, Vec2::ZERO, Move::new(Vec2::ZERO, 1.0, 10.0, 5.0));
        scene.add_component(id, Seek).unwrap();

        assert_eq!(seek(Vec2::new(100.0, 0.0), &mut scene, 1.0), 1);

        let (transform, movement) = state(&scene, id);
        assert!((movement.velocity.x - 5.0).abs() < 1e-5);
        assert!(movement.velocity.y.abs() < 1e-5);
        assert!((transform.position.x - 5.0).abs() < 1e-5);
        assert!((transform.rotation.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_seek_ignores_entities_without_marker() {
        let mut scene = Scene::new(4);
        let id = agent(&mut scene, Vec2::ZERO, Move::new(Vec2::ZERO, 1.0, 10.0, 5.0));

        assert_eq!(seek(Vec2::new(100.0, 0.0), &mut scene, 1.0), 0);
        assert_eq!(state(&scene, id).1.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_on_target_is_skipped() {
        let mut scene = Scene::new(4);
        let id = agent(&mut scene, Vec2::new(3.0, 3.0), Move::new(Vec2::ZERO, 1.0, 10.0, 5.0));
        scene.add_component(id, Seek).unwrap();

        assert_eq!(seek(Vec2::new(3.0, 3.0), &mut scene, 1.0), 0);
        assert_eq!(state(&scene, id).0.rotation, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_flee_only_inside_radius() {
        let mut scene = Scene::new(4);
        let near = agent(&mut scene, Vec2::new(10.0, 0.0), Move::new(Vec2::ZERO, 1.0, 10.0, 5.0));
        scene.add_component(near, Flee::new(50.0)).unwrap();
        let far = agent(&mut scene, Vec2::new(200.0, 0.0), Move::new(Vec2::ZERO, 1.0, 10.0, 5.0));
        scene.add_component(far, Flee::new(50.0)).unwrap();

        assert_eq!(flee(Vec2::ZERO, &mut scene, 1.0), 2);

        assert!(state(&scene, near).1.velocity.x > 0.0);
        assert_eq!(state(&scene, far).1.velocity, Vec2::ZERO);
        assert_eq!(state(&scene, far).0.position, Vec2::new(200.0, 0.0));
    }

    #[test]
    fn test_arrive_slows_near_target() {
        let mut scene = Scene::new(4);
        let movement = Move::new(Vec2::ZERO, 1.0, 150.0, 1_000.0);
        let close = agent(&mut scene, Vec2::new(0.0, 0.0), movement);
        scene.add_component(close, Arrive::new(2.0)).unwrap();
        let distant = agent(&mut scene, Vec2::new(0.0, 0.0), movement);
        scene.add_component(distant, Arrive::new(2.0)).unwrap();

        // Same start, different targets: move `distant` out of the way first.
        scene.get_component_mut::<Transform>(distant).unwrap().position = Vec2::new(-1_000.0, 0.0);

        arrive(Vec2::new(6.0, 0.0), &mut scene, 0.1);

        // 6 / (2 × 0.3) = 10 units/s desired for the close agent.
        let close_speed = state(&scene, close).1.velocity.length();
        let distant_speed = state(&scene, distant).1.velocity.length();
        assert!(close_speed <= 10.0 + 1e-4);
        assert!(distant_speed > close_speed);
        assert!(distant_speed <= 150.0 + 1e-4);
    }

    #[test]
    fn test_speed_never_exceeds_max() {
        let mut scene = Scene::new(4);
        let id = agent(&mut scene, Vec2::ZERO, Move::new(Vec2::new(0.0, 50.0), 0.5, 20.0, 500.0));
        scene.add_component(id, Seek).unwrap();

        for _ in 0..10 {
            seek(Vec2::new(100.0, 100.0), &mut scene, 0.05);
            assert!(state(&scene, id).1.velocity.length() <= 20.0 + 1e-4);
        }
    }
}
