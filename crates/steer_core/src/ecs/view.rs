//! # Scene Views
//!
//! A view is a filter over a scene's slot table. Iterating it yields the ids
//! of every live entity whose mask contains the requested component types,
//! in slot-index order.
//!
//! ```rust
//! use steer_core::Scene;
//!
//! struct Position(f32);
//! struct Velocity(f32);
//!
//! let mut scene = Scene::new(8);
//! let moving = scene.new_entity().unwrap();
//! scene.add_component(moving, Position(0.0)).unwrap();
//! scene.add_component(moving, Velocity(1.0)).unwrap();
//! let still = scene.new_entity().unwrap();
//! scene.add_component(still, Position(0.0)).unwrap();
//!
//! let ids: Vec<_> = scene.view::<(Position, Velocity)>().iter().collect();
//! assert_eq!(ids, vec![moving]);
//! assert_eq!(scene.view::<()>().iter().count(), 2);
//! ```
//!
//! A view borrows the scene. Passes that mutate components while walking a
//! view take a detached [`ViewCursor`] instead and hand the scene back to
//! [`ViewCursor::advance`] on every step.

use std::iter::FusedIterator;

use super::component::{Component, ComponentMask};
use super::entity::{EntityId, EntitySlot};
use super::registry::ComponentRegistry;
use super::scene::Scene;

/// Which entities a view visits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewFilter {
    /// Every live entity.
    All,
    /// Live entities whose mask contains every bit of the mask.
    Require(ComponentMask),
    /// Nothing: one of the requested types could not be registered, so no
    /// entity can own it.
    Unmatchable,
}

impl ViewFilter {
    /// Returns `true` if the slot passes this filter.
    #[inline]
    #[must_use]
    pub fn matches(self, slot: &EntitySlot) -> bool {
        slot.is_occupied()
            && match self {
                Self::All => true,
                Self::Require(required) => slot.mask.contains_all(required),
                Self::Unmatchable => false,
            }
    }
}

/// A set of component types a view requires.
///
/// Implemented for `()` (no requirement) and for tuples of up to eight
/// component types.
pub trait ComponentSet {
    /// Builds the filter for this set, registering its types as needed.
    fn filter(registry: &ComponentRegistry) -> ViewFilter;
}

impl ComponentSet for () {
    fn filter(_registry: &ComponentRegistry) -> ViewFilter {
        ViewFilter::All
    }
}

macro_rules! impl_component_set {
    ($($ty:ident),+) => {
        impl<$($ty: Component),+> ComponentSet for ($($ty,)+) {
            fn filter(registry: &ComponentRegistry) -> ViewFilter {
                let mut required = ComponentMask::EMPTY;
                $(
                    match registry.id_of::<$ty>() {
                        Ok(id) => required.insert(id),
                        Err(error) => {
                            tracing::warn!(
                                component = std::any::type_name::<$ty>(),
                                %error,
                                "view requires an unregistered component type"
                            );
                            return ViewFilter::Unmatchable;
                        }
                    }
                )+
                ViewFilter::Require(required)
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

/// A filtered, restartable view over a scene.
///
/// Every call to [`SceneView::iter`] starts a fresh traversal from slot 0.
#[derive(Clone, Copy)]
pub struct SceneView<'a> {
    scene: &'a Scene,
    filter: ViewFilter,
}

impl<'a> SceneView<'a> {
    /// Creates a view of `scene` through `filter`.
    #[inline]
    #[must_use]
    pub const fn new(scene: &'a Scene, filter: ViewFilter) -> Self {
        Self { scene, filter }
    }

    /// Returns the filter this view applies.
    #[inline]
    #[must_use]
    pub const fn filter(&self) -> ViewFilter {
        self.filter
    }

    /// Starts a traversal from the first slot.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> ViewIter<'a> {
        ViewIter {
            scene: self.scene,
            cursor: self.cursor(),
        }
    }

    /// Returns a cursor positioned at the first slot that does not borrow
    /// the scene.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> ViewCursor {
        ViewCursor::new(self.filter)
    }

    /// Returns `true` if no entity matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl std::fmt::Debug for SceneView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneView")
            .field("filter", &self.filter)
            .field("slots", &self.scene.entities().len())
            .finish()
    }
}

impl<'a> IntoIterator for SceneView<'a> {
    type Item = EntityId;
    type IntoIter = ViewIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &SceneView<'a> {
    type Item = EntityId;
    type IntoIter = ViewIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the matching entities of a [`SceneView`].
#[derive(Clone)]
pub struct ViewIter<'a> {
    scene: &'a Scene,
    cursor: ViewCursor,
}

impl Iterator for ViewIter<'_> {
    type Item = EntityId;

    #[inline]
    fn next(&mut self) -> Option<EntityId> {
        self.cursor.advance(self.scene)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .scene
            .entities()
            .len()
            .saturating_sub(self.cursor.position());
        (0, Some(remaining))
    }
}

impl FusedIterator for ViewIter<'_> {}

/// Position of a traversal that does not hold a borrow of the scene.
///
/// The scene is passed to every [`ViewCursor::advance`] call, so the caller
/// is free to mutate components between steps:
///
/// ```rust
/// use steer_core::Scene;
///
/// struct Counter(u32);
///
/// let mut scene = Scene::new(4);
/// for _ in 0..3 {
///     let id = scene.new_entity().unwrap();
///     scene.add_component(id, Counter(0)).unwrap();
/// }
///
/// let mut cursor = scene.view::<(Counter,)>().cursor();
/// while let Some(id) = cursor.advance(&scene) {
///     scene.get_component_mut::<Counter>(id).unwrap().0 += 1;
/// }
/// ```
///
/// Slots are visited in index order. An entity created in a slot the cursor
/// has already passed is not visited; an entity removed before the cursor
/// reaches its slot is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewCursor {
    filter: ViewFilter,
    next_index: usize,
}

impl ViewCursor {
    /// Creates a cursor at the first slot.
    #[inline]
    #[must_use]
    pub const fn new(filter: ViewFilter) -> Self {
        Self {
            filter,
            next_index: 0,
        }
    }

    /// Moves to the next matching entity and returns it.
    pub fn advance(&mut self, scene: &Scene) -> Option<EntityId> {
        let entities = scene.entities();
        while let Some(slot) = entities.get(self.next_index) {
            self.next_index += 1;
            if self.filter.matches(slot) {
                return Some(slot.id);
            }
        }
        None
    }

    /// Index of the next slot to inspect.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.next_index
    }

    /// Rewinds to the first slot.
    #[inline]
    pub fn reset(&mut self) {
        self.next_index = 0;
    }
}
