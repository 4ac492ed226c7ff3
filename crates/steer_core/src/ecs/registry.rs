//! # Component Type Registry
//!
//! Assigns each distinct component type a stable [`ComponentTypeId`] the
//! first time the type is referenced. Identifiers are handed out in
//! first-use order starting from 0 and are never reused.
//!
//! A registry is an ordinary object owned (through an `Arc`) by one or more
//! scenes. Tests that need isolation simply build separate scenes.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use parking_lot::RwLock;

use super::component::{Component, ComponentTypeId, MAX_COMPONENT_TYPES};
use crate::error::{EcsError, EcsResult};

/// Registration record for one component type.
#[derive(Clone, Copy, Debug)]
struct Registration {
    type_id: TypeId,
    name: &'static str,
}

#[derive(Default)]
struct RegistryInner {
    by_type: HashMap<TypeId, ComponentTypeId>,
    registrations: Vec<Registration>,
}

/// Maps Rust types to component type identifiers.
///
/// # Thread Safety
///
/// Registration takes a write lock, so two threads racing to register the
/// same type still agree on a single identifier.
#[derive(Default)]
pub struct ComponentRegistry {
    inner: RwLock<RegistryInner>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier for `T`, assigning the next free one on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentLimit`] if `T` is new and all
    /// [`MAX_COMPONENT_TYPES`] identifiers are taken.
    pub fn id_of<T: Component>(&self) -> EcsResult<ComponentTypeId> {
        if let Some(id) = self.get::<T>() {
            return Ok(id);
        }

        let mut inner = self.inner.write();
        // Another thread may have won the race between the two locks.
        if let Some(&id) = inner.by_type.get(&TypeId::of::<T>()) {
            return Ok(id);
        }

        let next = inner.registrations.len();
        if next >= MAX_COMPONENT_TYPES {
            return Err(EcsError::ComponentLimit {
                limit: MAX_COMPONENT_TYPES,
            });
        }

        let id = ComponentTypeId::new(next);
        inner.registrations.push(Registration {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        });
        inner.by_type.insert(TypeId::of::<T>(), id);
        tracing::debug!(component = type_name::<T>(), id = id.index(), "registered component type");
        Ok(id)
    }

    /// Returns the identifier for `T` without registering it.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<ComponentTypeId> {
        self.inner.read().by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the type name registered under `id`.
    #[must_use]
    pub fn name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.inner
            .read()
            .registrations
            .get(id.index())
            .map(|registration| registration.name)
    }

    /// Returns the `TypeId` registered under `id`.
    #[must_use]
    pub fn type_id(&self, id: ComponentTypeId) -> Option<TypeId> {
        self.inner
            .read()
            .registrations
            .get(id.index())
            .map(|registration| registration.type_id)
    }

    /// Number of registered component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().registrations.len()
    }

    /// Returns `true` if no type has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_list()
            .entries(inner.registrations.iter().map(|registration| registration.name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    struct A;
    struct B;
    struct C;

    #[test]
    fn test_first_use_order() {
        let registry = ComponentRegistry::new();
        assert!(registry.is_empty());

        assert_eq!(registry.id_of::<B>().unwrap().index(), 0);
        assert_eq!(registry.id_of::<A>().unwrap().index(), 1);
        assert_eq!(registry.id_of::<B>().unwrap().index(), 0);
        assert_eq!(registry.id_of::<C>().unwrap().index(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_lookup_does_not_register() {
        let registry = ComponentRegistry::new();
        assert!(registry.get::<A>().is_none());
        assert!(registry.is_empty());

        let id = registry.id_of::<A>().unwrap();
        assert_eq!(registry.get::<A>(), Some(id));
        assert_eq!(registry.type_id(id), Some(TypeId::of::<A>()));
        assert!(registry.name(id).unwrap().ends_with("A"));
    }

    #[test]
    fn test_registries_are_isolated() {
        let first = ComponentRegistry::new();
        let second = ComponentRegistry::new();

        first.id_of::<A>().unwrap();
        assert_eq!(first.id_of::<B>().unwrap().index(), 1);
        assert_eq!(second.id_of::<B>().unwrap().index(), 0);
    }

    #[test]
    fn test_limit() {
        struct Tag<const N: usize>;

        macro_rules! register {
            ($registry:expr, $($n:literal)*) => {
                $( $registry.id_of::<Tag<$n>>().unwrap(); )*
            };
        }

        let registry = ComponentRegistry::new();
        register!(registry,
            0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
            16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31
            32 33 34 35 36 37 38 39 40 41 42 43 44 45 46 47
            48 49 50 51 52 53 54 55 56 57 58 59 60 61 62 63);
        assert_eq!(registry.len(), MAX_COMPONENT_TYPES);

        assert_eq!(
            registry.id_of::<Tag<64>>(),
            Err(EcsError::ComponentLimit { limit: MAX_COMPONENT_TYPES })
        );
        // Existing types still resolve.
        assert_eq!(registry.id_of::<Tag<0>>().unwrap().index(), 0);
    }

    #[test]
    fn test_concurrent_registration_agrees() {
        let registry = Arc::new(ComponentRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || (registry.id_of::<A>().unwrap(), registry.id_of::<B>().unwrap()))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(registry.len(), 2);
    }
}
