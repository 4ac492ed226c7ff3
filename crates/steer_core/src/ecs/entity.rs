//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into the scene's slot table (and every component pool)
//! - A generation counter for safe reuse

use std::fmt;

use super::component::ComponentMask;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into the slot table
/// - Upper 32 bits: Generation counter for detecting stale references
///
/// An index of `u32::MAX` is reserved to mark a removed slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Index value marking a removed slot.
    pub const REMOVED_INDEX: u32 = u32::MAX;

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-2)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Creates the identity stored in a slot after its occupant was removed.
    #[inline]
    #[must_use]
    pub const fn removed(generation: u32) -> Self {
        Self::new(Self::REMOVED_INDEX, generation)
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns `false` exactly when the index is the removed sentinel.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.index() != Self::REMOVED_INDEX
    }

    /// Returns the packed 64-bit representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds an ID from its packed representation.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "EntityId({}v{})", self.index(), self.generation())
        } else {
            write!(f, "EntityId(removed v{})", self.generation())
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// One row of the scene's slot table.
///
/// Holds the identity of the current occupant (or the removed sentinel) and
/// the mask of components the occupant owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySlot {
    /// Identity of the current occupant.
    pub id: EntityId,
    /// Component types attached to the current occupant.
    pub mask: ComponentMask,
}

impl EntitySlot {
    /// Creates a slot for a freshly created occupant.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            mask: ComponentMask::EMPTY,
        }
    }

    /// Returns `true` if the slot currently holds a live entity.
    #[inline]
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.id.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_roundtrip() {
        let id = EntityId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
        assert!(id.is_valid());
    }

    #[test]
    fn test_removed_sentinel() {
        let id = EntityId::removed(3);
        assert!(!id.is_valid());
        assert_eq!(id.generation(), 3);
        assert!(!EntityId::NULL.is_valid());
    }

    #[test]
    fn test_equality_needs_both_fields() {
        assert_eq!(EntityId::new(4, 1), EntityId::new(4, 1));
        assert_ne!(EntityId::new(4, 1), EntityId::new(4, 2));
        assert_ne!(EntityId::new(4, 1), EntityId::new(5, 1));
    }

    #[test]
    fn test_bits() {
        let id = EntityId::new(7, 9);
        assert_eq!(EntityId::from_bits(id.to_bits()), id);
        assert_eq!(format!("{id}"), "7v9");
    }
}
