//! # Component System
//!
//! Components are plain data attached to at most one entity at a time.
//! Any `'static` type can be a component; the scene's registry hands each
//! distinct type a small integer identifier that doubles as its bit in the
//! per-entity [`ComponentMask`].

use std::fmt;

/// Maximum number of distinct component types per registry.
///
/// Bounded by the width of [`ComponentMask`].
pub const MAX_COMPONENT_TYPES: usize = 64;

/// Marker trait for ECS components.
///
/// Implemented for every `'static` type. Components are free to own heap
/// data; the scene runs their destructors on overwrite and removal.
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Identifier of a component type within one registry (0-63).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ComponentTypeId(u8);

impl ComponentTypeId {
    /// Creates an identifier from its raw value.
    ///
    /// # Panics
    ///
    /// Panics if `raw` does not fit in a [`ComponentMask`].
    #[inline]
    #[must_use]
    pub fn new(raw: usize) -> Self {
        assert!(
            raw < MAX_COMPONENT_TYPES,
            "component type id {raw} exceeds mask width"
        );
        #[allow(clippy::cast_possible_truncation)]
        Self(raw as u8)
    }

    /// Returns the identifier as an index into pool storage.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Set of component types, one bit per [`ComponentTypeId`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ComponentMask(u64);

impl ComponentMask {
    /// Mask with no bits set.
    pub const EMPTY: Self = Self(0);

    /// Returns a mask containing only `id`.
    #[inline]
    #[must_use]
    pub const fn of(id: ComponentTypeId) -> Self {
        Self(1 << id.0)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Checks if the bit for `id` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, id: ComponentTypeId) -> bool {
        (self.0 & (1 << id.0)) != 0
    }

    /// Checks if every bit of `required` is also set here.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, required: Self) -> bool {
        required.0 == (required.0 & self.0)
    }

    /// Sets the bit for `id`.
    #[inline]
    pub fn insert(&mut self, id: ComponentTypeId) {
        self.0 |= 1 << id.0;
    }

    /// Clears the bit for `id`.
    #[inline]
    pub fn remove(&mut self, id: ComponentTypeId) {
        self.0 &= !(1 << id.0);
    }

    /// Clears every bit.
    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Returns `true` if no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of component types in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the identifiers in the set, lowest first.
    pub fn iter(self) -> impl Iterator<Item = ComponentTypeId> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let bit = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(ComponentTypeId::new(bit))
        })
    }
}

impl fmt::Debug for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(ComponentTypeId::index)).finish()
    }
}

impl FromIterator<ComponentTypeId> for ComponentMask {
    fn from_iter<I: IntoIterator<Item = ComponentTypeId>>(iter: I) -> Self {
        let mut mask = Self::EMPTY;
        for id in iter {
            mask.insert(id);
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_insert_remove() {
        let mut mask = ComponentMask::EMPTY;
        let id = ComponentTypeId::new(5);
        assert!(!mask.contains(id));

        mask.insert(id);
        assert!(mask.contains(id));
        assert_eq!(mask.len(), 1);

        mask.remove(id);
        assert!(!mask.contains(id));
        assert!(mask.is_empty());
    }

    #[test]
    fn test_mask_superset() {
        let a = ComponentTypeId::new(0);
        let b = ComponentTypeId::new(1);
        let c = ComponentTypeId::new(63);

        let required: ComponentMask = [a, b].into_iter().collect();
        let only_a = ComponentMask::of(a);
        let all: ComponentMask = [a, b, c].into_iter().collect();

        assert!(!only_a.contains_all(required));
        assert!(all.contains_all(required));
        assert!(only_a.contains_all(ComponentMask::EMPTY));
    }

    #[test]
    fn test_mask_iter_order() {
        let mask: ComponentMask = [9, 2, 40]
            .into_iter()
            .map(ComponentTypeId::new)
            .collect();
        let ids: Vec<usize> = mask.iter().map(ComponentTypeId::index).collect();
        assert_eq!(ids, vec![2, 9, 40]);
    }
}
