//! # Entity Component System
//!
//! A minimal, pool-backed ECS.
//!
//! ## Design Philosophy
//!
//! - Each component type gets one fixed-capacity pool, allocated on first use
//! - Membership is a 64-bit mask per entity slot
//! - Entity IDs are slot indices with generation counters
//! - Views are linear scans of the slot table filtered by mask

mod component;
mod entity;
mod pool;
mod registry;
mod scene;
mod view;

pub use component::{Component, ComponentMask, ComponentTypeId, MAX_COMPONENT_TYPES};
pub use entity::{EntityId, EntitySlot};
pub use pool::ComponentPool;
pub use registry::ComponentRegistry;
pub use scene::{Scene, DEFAULT_MAX_ENTITIES};
pub use view::{ComponentSet, SceneView, ViewCursor, ViewFilter, ViewIter};
