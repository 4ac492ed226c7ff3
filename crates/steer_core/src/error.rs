//! # Runtime Error Types
//!
//! Recoverable failures of scene operations. Contract violations such as
//! reading a pool slot out of range are not represented here; they panic.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur in scene operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The scene already holds its maximum number of entities.
    #[error("entity capacity exhausted: {capacity} entities alive")]
    CapacityExhausted {
        /// Configured maximum population.
        capacity: usize,
    },

    /// The handle refers to a removed or recycled slot.
    #[error("stale entity handle: {0:?}")]
    StaleEntity(EntityId),

    /// The entity does not own a component of the requested type.
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        /// The entity that was queried.
        entity: EntityId,
        /// Type name of the requested component.
        component: &'static str,
    },

    /// The registry has no identifiers left for a new component type.
    #[error("component type limit reached: at most {limit} types per registry")]
    ComponentLimit {
        /// Maximum number of component types.
        limit: usize,
    },

    /// A component pool for this type and capacity cannot be laid out.
    #[error("component pool for {component} with {capacity} slots is too large")]
    PoolTooLarge {
        /// Type name of the component.
        component: &'static str,
        /// Requested number of slots.
        capacity: usize,
    },
}

/// Result type for scene operations.
pub type EcsResult<T> = Result<T, EcsError>;
