//! # Scene
//!
//! The central container for all entities and components.
//!
//! A scene owns:
//! - The slot table (identity + component mask per slot)
//! - The free list of slots waiting for reuse
//! - One [`ComponentPool`] per component type, created on first use
//!
//! Pools are sized for the scene's full capacity when created, so component
//! references never move while the scene is alive.

// SAFETY: Typed access to the type-erased pools happens here. Every unsafe
// block relies on the mask invariant: bit `k` of slot `i` is set iff pool `k`
// holds an initialized value at slot `i`.
#![allow(unsafe_code)]

use std::sync::Arc;

use super::component::{Component, ComponentMask, ComponentTypeId};
use super::entity::{EntityId, EntitySlot};
use super::pool::ComponentPool;
use super::registry::ComponentRegistry;
use super::view::{ComponentSet, SceneView};
use crate::error::{EcsError, EcsResult};

/// Default maximum population of a scene.
pub const DEFAULT_MAX_ENTITIES: usize = 1_000_000;

/// A population of entities and their components.
///
/// # Capacity
///
/// The scene has a fixed capacity set at creation. [`Scene::new_entity`]
/// reports [`EcsError::CapacityExhausted`] once that many entities are
/// alive.
///
/// # Example
///
/// ```rust
/// use steer_core::Scene;
///
/// #[derive(Debug, PartialEq)]
/// struct Health(u32);
///
/// let mut scene = Scene::new(16);
/// let id = scene.new_entity().unwrap();
/// scene.add_component(id, Health(10)).unwrap();
///
/// for entity in scene.view::<(Health,)>() {
///     assert_eq!(scene.get_component::<Health>(entity), Ok(&Health(10)));
/// }
/// ```
pub struct Scene {
    /// Slot table, grown on demand up to `capacity`.
    entities: Vec<EntitySlot>,
    /// Free list of slot indices for reuse.
    free_indices: Vec<u32>,
    /// Component pools indexed by component type id.
    pools: Vec<Option<ComponentPool>>,
    /// Component type identifiers, possibly shared with other scenes.
    registry: Arc<ComponentRegistry>,
    /// Maximum number of live entities.
    capacity: usize,
    /// Number of currently alive entities.
    alive_count: usize,
}

impl Scene {
    /// Creates a scene with its own private component registry.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_registry(capacity, Arc::new(ComponentRegistry::new()))
    }

    /// Creates a scene that resolves component types through `registry`.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn with_registry(capacity: usize, registry: Arc<ComponentRegistry>) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= u32::MAX as usize,
            "Capacity cannot exceed u32::MAX"
        );

        Self {
            entities: Vec::new(),
            free_indices: Vec::new(),
            pools: Vec::new(),
            registry,
            capacity,
            alive_count: 0,
        }
    }

    /// Returns the maximum capacity of this scene.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Returns the component registry used by this scene.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Returns the slot table in slot-index order.
    ///
    /// Removed slots are included; their identity fails
    /// [`EntityId::is_valid`].
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntitySlot] {
        &self.entities
    }

    /// Creates a new entity, reusing a freed slot when one is available.
    ///
    /// A reused slot keeps the generation it was given on removal, so the
    /// new handle differs from every handle previously issued for that slot.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExhausted`] if `capacity` entities are
    /// already alive.
    pub fn new_entity(&mut self) -> EcsResult<EntityId> {
        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.entities[index as usize];
            let id = EntityId::new(index, slot.id.generation());
            *slot = EntitySlot::new(id);
            self.alive_count += 1;
            tracing::trace!(entity = %id, "recycled entity slot");
            return Ok(id);
        }

        let exhausted = EcsError::CapacityExhausted {
            capacity: self.capacity,
        };
        if self.entities.len() >= self.capacity {
            tracing::warn!(capacity = self.capacity, "entity capacity exhausted");
            return Err(exhausted);
        }
        let index = u32::try_from(self.entities.len()).map_err(|_| exhausted)?;

        let id = EntityId::new(index, 0);
        self.entities.push(EntitySlot::new(id));
        self.alive_count += 1;
        tracing::trace!(entity = %id, "created entity");
        Ok(id)
    }

    /// Removes an entity, dropping all of its components.
    ///
    /// The slot's generation is bumped, which invalidates `id` and every copy
    /// of it, and the slot is returned to the free list.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if `id` is not alive.
    pub fn remove_entity(&mut self, id: EntityId) -> EcsResult<()> {
        let index = self.live_slot(id)?;
        let mask = self.entities[index].mask;

        // Invalidate first so the slot is consistent even if a destructor
        // panics below.
        self.entities[index] = EntitySlot {
            id: EntityId::removed(id.generation().wrapping_add(1)),
            mask: ComponentMask::EMPTY,
        };
        self.free_indices.push(id.index());
        self.alive_count -= 1;

        self.drop_components(index, mask);
        tracing::trace!(entity = %id, "removed entity");
        Ok(())
    }

    /// Removes every alive entity.
    ///
    /// Generations are preserved, so handles issued before the call stay
    /// stale afterwards.
    pub fn clear(&mut self) {
        let alive: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|slot| slot.is_occupied())
            .map(|slot| slot.id)
            .collect();
        for id in alive {
            // Every id was collected from an occupied slot.
            let _ = self.remove_entity(id);
        }
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.live_slot(id).is_ok()
    }

    /// Returns the component mask of a live entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if `id` is not alive.
    pub fn mask(&self, id: EntityId) -> EcsResult<ComponentMask> {
        self.live_slot(id).map(|index| self.entities[index].mask)
    }

    /// Checks if an entity owns a component of type `T`.
    ///
    /// Never fails: stale handles and unknown types simply report `false`.
    #[must_use]
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.live_slot(id)
            .and_then(|index| self.present::<T>(id, index))
            .is_ok()
    }

    /// Attaches `component` to an entity and returns a reference to it.
    ///
    /// The first component of a type allocates that type's pool. If the
    /// entity already owns a `T`, the old value is replaced and dropped.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if `id` is not alive
    /// - [`EcsError::ComponentLimit`] if `T` is a new type and the registry is full
    /// - [`EcsError::PoolTooLarge`] if the pool for `T` cannot be allocated
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> EcsResult<&mut T> {
        let index = self.live_slot(id)?;
        let type_id = self.registry.id_of::<T>()?;
        let pool = Self::pool_for::<T>(&mut self.pools, type_id, self.capacity)?;
        let mask = &mut self.entities[index].mask;

        // SAFETY: the pool was created for `T` under `type_id`, and the mask
        // bit tells whether slot `index` holds a live value.
        let previous = mask
            .contains(type_id)
            .then(|| unsafe { pool.read::<T>(index) });
        let stored = unsafe { pool.write(index, component) };
        mask.insert(type_id);

        drop(previous);
        Ok(stored)
    }

    /// Detaches the `T` component from an entity and returns it.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if `id` is not alive
    /// - [`EcsError::MissingComponent`] if the entity has no `T`
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> EcsResult<T> {
        let index = self.live_slot(id)?;
        let type_id = self.present::<T>(id, index)?;
        let pool = self.pools[type_id.index()]
            .as_mut()
            .ok_or_else(|| Self::missing::<T>(id))?;

        self.entities[index].mask.remove(type_id);
        // SAFETY: the mask bit was set, so the slot holds a live `T`; the
        // bit is now clear so the slot will not be read again.
        Ok(unsafe { pool.read::<T>(index) })
    }

    /// Returns a reference to an entity's `T` component.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if `id` is not alive
    /// - [`EcsError::MissingComponent`] if the entity has no `T`
    pub fn get_component<T: Component>(&self, id: EntityId) -> EcsResult<&T> {
        let index = self.live_slot(id)?;
        let type_id = self.present::<T>(id, index)?;
        let pool = self.pools[type_id.index()]
            .as_ref()
            .ok_or_else(|| Self::missing::<T>(id))?;

        // SAFETY: the mask bit is set, so the slot holds a live `T`.
        Ok(unsafe { pool.get::<T>(index) })
    }

    /// Returns a mutable reference to an entity's `T` component.
    ///
    /// # Errors
    ///
    /// Same as [`Scene::get_component`].
    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> EcsResult<&mut T> {
        let index = self.live_slot(id)?;
        let type_id = self.present::<T>(id, index)?;
        let pool = self.pools[type_id.index()]
            .as_mut()
            .ok_or_else(|| Self::missing::<T>(id))?;

        // SAFETY: the mask bit is set, so the slot holds a live `T`.
        Ok(unsafe { pool.get_mut::<T>(index) })
    }

    /// Builds a view over the entities owning every component in `Q`.
    ///
    /// `Q` is a tuple of component types, or `()` to visit every live entity.
    #[must_use]
    pub fn view<Q: ComponentSet>(&self) -> SceneView<'_> {
        SceneView::new(self, Q::filter(&self.registry))
    }

    /// Returns the pool for `T`, allocating it on first use.
    fn pool_for<T: Component>(
        pools: &mut Vec<Option<ComponentPool>>,
        type_id: ComponentTypeId,
        capacity: usize,
    ) -> EcsResult<&mut ComponentPool> {
        if pools.len() <= type_id.index() {
            pools.resize_with(type_id.index() + 1, || None);
        }

        let entry = &mut pools[type_id.index()];
        let pool = match entry.take() {
            Some(pool) => pool,
            None => ComponentPool::new::<T>(capacity)?,
        };
        Ok(entry.insert(pool))
    }

    /// Resolves `id` to its slot index if it names a live entity.
    #[inline]
    fn live_slot(&self, id: EntityId) -> EcsResult<usize> {
        let index = id.index() as usize;
        match self.entities.get(index) {
            Some(slot) if id.is_valid() && slot.id == id => Ok(index),
            _ => Err(EcsError::StaleEntity(id)),
        }
    }

    /// Returns `T`'s type id if the entity in slot `index` owns a `T`.
    #[inline]
    fn present<T: Component>(&self, id: EntityId, index: usize) -> EcsResult<ComponentTypeId> {
        match self.registry.get::<T>() {
            Some(type_id) if self.entities[index].mask.contains(type_id) => Ok(type_id),
            _ => Err(Self::missing::<T>(id)),
        }
    }

    fn missing<T: Component>(entity: EntityId) -> EcsError {
        EcsError::MissingComponent {
            entity,
            component: std::any::type_name::<T>(),
        }
    }

    /// Runs the destructor of every component in `mask` at slot `index`.
    fn drop_components(&mut self, index: usize, mask: ComponentMask) {
        for type_id in mask.iter() {
            if let Some(pool) = self.pools.get_mut(type_id.index()).and_then(Option::as_mut) {
                // SAFETY: `mask` was the slot's mask, so each of these pools
                // holds a live value at `index`.
                unsafe { pool.drop_slot(index) };
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTITIES)
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        for index in 0..self.entities.len() {
            let slot = self.entities[index];
            if slot.is_occupied() {
                self.entities[index].mask = ComponentMask::EMPTY;
                self.drop_components(index, slot.mask);
            }
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("alive", &self.alive_count)
            .field("slots", &self.entities.len())
            .field("free", &self.free_indices.len())
            .field("capacity", &self.capacity)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Velocity {
        x: f32,
        y: f32,
    }

    struct Tracked(Rc<Cell<u32>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_scene_creation() {
        let scene = Scene::new(1000);
        assert_eq!(scene.capacity(), 1000);
        assert_eq!(scene.alive_count(), 0);
        assert!(scene.entities().is_empty());
    }

    #[test]
    fn test_new_remove_entity() {
        let mut scene = Scene::new(100);

        let id1 = scene.new_entity().unwrap();
        assert!(id1.is_valid());
        assert!(scene.is_alive(id1));
        assert_eq!(scene.alive_count(), 1);

        let id2 = scene.new_entity().unwrap();
        assert_eq!(scene.alive_count(), 2);
        assert_ne!(id1, id2);

        scene.remove_entity(id1).unwrap();
        assert!(!scene.is_alive(id1));
        assert_eq!(scene.alive_count(), 1);
        assert!(!scene.entities()[id1.index() as usize].id.is_valid());

        // Create again - should reuse the slot
        let id3 = scene.new_entity().unwrap();
        assert_eq!(id3.index(), id1.index());
        assert_eq!(id3.generation(), id1.generation() + 1);
        assert!(!scene.is_alive(id1));
    }

    #[test]
    fn test_double_remove_is_stale() {
        let mut scene = Scene::new(4);
        let id = scene.new_entity().unwrap();
        scene.remove_entity(id).unwrap();

        assert_eq!(scene.remove_entity(id), Err(EcsError::StaleEntity(id)));
        // The free list was not corrupted: exactly one slot is reused.
        let a = scene.new_entity().unwrap();
        let b = scene.new_entity().unwrap();
        assert_ne!(a.index(), b.index());
    }

    #[test]
    fn test_capacity_exhausted() {
        let mut scene = Scene::new(2);
        let first = scene.new_entity().unwrap();
        scene.new_entity().unwrap();

        assert_eq!(
            scene.new_entity(),
            Err(EcsError::CapacityExhausted { capacity: 2 })
        );

        scene.remove_entity(first).unwrap();
        assert!(scene.new_entity().is_ok());
    }

    #[test]
    fn test_add_get_component() {
        let mut scene = Scene::new(10);
        let id = scene.new_entity().unwrap();

        scene.add_component(id, Position { x: 1.0, y: 2.0 }).unwrap();
        assert!(scene.has_component::<Position>(id));
        assert!(!scene.has_component::<Velocity>(id));

        scene.get_component_mut::<Position>(id).unwrap().x = 3.0;
        assert_eq!(
            scene.get_component::<Position>(id),
            Ok(&Position { x: 3.0, y: 2.0 })
        );
        assert!(matches!(
            scene.get_component::<Velocity>(id),
            Err(EcsError::MissingComponent { .. })
        ));
    }

    #[test]
    fn test_overwrite_drops_previous_value() {
        let drops = Rc::new(Cell::new(0));
        let mut scene = Scene::new(4);
        let id = scene.new_entity().unwrap();

        scene.add_component(id, Tracked(Rc::clone(&drops))).unwrap();
        scene.add_component(id, Tracked(Rc::clone(&drops))).unwrap();
        assert_eq!(drops.get(), 1);

        scene.remove_entity(id).unwrap();
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_remove_component_returns_value() {
        let mut scene = Scene::new(4);
        let id = scene.new_entity().unwrap();
        scene.add_component(id, Velocity { x: 1.0, y: 0.0 }).unwrap();

        let removed = scene.remove_component::<Velocity>(id).unwrap();
        assert_eq!(removed, Velocity { x: 1.0, y: 0.0 });
        assert!(!scene.has_component::<Velocity>(id));
        assert!(matches!(
            scene.remove_component::<Velocity>(id),
            Err(EcsError::MissingComponent { .. })
        ));
    }

    #[test]
    fn test_stale_handle_operations() {
        let mut scene = Scene::new(4);
        let old = scene.new_entity().unwrap();
        scene.add_component(old, Position { x: 0.0, y: 0.0 }).unwrap();
        scene.remove_entity(old).unwrap();
        let new = scene.new_entity().unwrap();
        scene.add_component(new, Position { x: 9.0, y: 9.0 }).unwrap();

        assert!(!scene.has_component::<Position>(old));
        assert_eq!(scene.get_component::<Position>(old), Err(EcsError::StaleEntity(old)));
        assert_eq!(
            scene.add_component(old, Position { x: 1.0, y: 1.0 }).map(|p| *p),
            Err(EcsError::StaleEntity(old))
        );
        assert_eq!(scene.remove_component::<Position>(old), Err(EcsError::StaleEntity(old)));
        assert_eq!(scene.get_component::<Position>(new), Ok(&Position { x: 9.0, y: 9.0 }));
    }

    #[test]
    fn test_scene_drop_tears_down_components() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut scene = Scene::new(8);
            for _ in 0..3 {
                let id = scene.new_entity().unwrap();
                scene.add_component(id, Tracked(Rc::clone(&drops))).unwrap();
            }
            let removed = scene.new_entity().unwrap();
            scene.add_component(removed, Tracked(Rc::clone(&drops))).unwrap();
            scene.remove_entity(removed).unwrap();
            assert_eq!(drops.get(), 1);
        }
        assert_eq!(drops.get(), 4);
    }

    #[test]
    fn test_clear_keeps_generations() {
        let mut scene = Scene::new(8);
        let ids: Vec<_> = (0..5).map(|_| scene.new_entity().unwrap()).collect();

        scene.clear();
        assert_eq!(scene.alive_count(), 0);
        assert!(ids.iter().all(|&id| !scene.is_alive(id)));

        let reused = scene.new_entity().unwrap();
        assert!(!ids.contains(&reused));
    }

    #[test]
    fn test_shared_registry() {
        let registry = Arc::new(ComponentRegistry::new());
        let mut first = Scene::with_registry(4, Arc::clone(&registry));
        let mut second = Scene::with_registry(4, Arc::clone(&registry));

        let a = first.new_entity().unwrap();
        first.add_component(a, Velocity { x: 0.0, y: 0.0 }).unwrap();
        let b = second.new_entity().unwrap();
        second.add_component(b, Position { x: 0.0, y: 0.0 }).unwrap();

        assert_eq!(registry.get::<Velocity>().map(ComponentTypeId::index), Some(0));
        assert_eq!(registry.get::<Position>().map(ComponentTypeId::index), Some(1));
        // Same handle value, different scenes: no cross-talk.
        assert!(!first.has_component::<Position>(a));
    }
}
