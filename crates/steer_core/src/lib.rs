//! # STEER Core Runtime
//!
//! A small Entity Component System (ECS) for simulations built out of many
//! identical agents:
//! - Generational entity handles that detect reuse
//! - One fixed-capacity pool per component type
//! - Mask-filtered views in slot order
//!
//! ## Architecture Rules
//!
//! 1. **Pools never move** - Storage is sized for the full scene capacity up front
//! 2. **Masks are the truth** - A component is live exactly when its bit is set
//! 3. **Stale handles fail loudly** - Every operation checks the generation
//!
//! ## Example
//!
//! ```rust
//! use steer_core::Scene;
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut scene = Scene::new(1_000);
//! let id = scene.new_entity().unwrap();
//! scene.add_component(id, Position { x: 1.0, y: 2.0 }).unwrap();
//!
//! for entity in scene.view::<(Position,)>() {
//!     assert_eq!(entity, id);
//! }
//!
//! scene.remove_entity(id).unwrap();
//! assert!(!scene.is_alive(id));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;

pub use ecs::{
    Component, ComponentMask, ComponentPool, ComponentRegistry, ComponentSet, ComponentTypeId,
    EntityId, EntitySlot, Scene, SceneView, ViewCursor, ViewFilter, ViewIter,
    DEFAULT_MAX_ENTITIES, MAX_COMPONENT_TYPES,
};
pub use error::{EcsError, EcsResult};
