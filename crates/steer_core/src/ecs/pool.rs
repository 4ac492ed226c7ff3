//! # Component Pool
//!
//! Fixed-capacity, type-erased storage for one component type.

// SAFETY: This module requires unsafe for raw, type-erased storage.
// All unsafe blocks are documented; the owning scene upholds the liveness
// contract through its component masks.
#![allow(unsafe_code)]

//! A pool is one allocation of `stride × capacity` bytes made when the pool
//! is created and released when it is dropped. It never moves, so pointers
//! into it stay valid for the pool's whole lifetime.
//!
//! ```text
//! slot:   0        1        2        3        ...  capacity-1
//!       [  T  ]  [  T  ]  [ ??? ]  [  T  ]   ...  [ ??? ]
//!                            ^ uninitialized, mask bit clear
//! ```
//!
//! The pool does not know which slots are initialized. Callers place values
//! with [`ComponentPool::write`] and tear them down with
//! [`ComponentPool::drop_slot`] or [`ComponentPool::read`].

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::any::{type_name, TypeId};
use std::ptr::NonNull;

use super::component::Component;
use crate::error::{EcsError, EcsResult};

/// Type-erased destructor for one slot.
type DropFn = unsafe fn(*mut u8);

/// Runs `T`'s destructor on the value at `ptr`.
///
/// # Safety
///
/// `ptr` must point at an initialized, properly aligned `T`.
unsafe fn drop_erased<T>(ptr: *mut u8) {
    std::ptr::drop_in_place(ptr.cast::<T>());
}

/// Raw storage for up to `capacity` values of a single component type.
pub struct ComponentPool {
    /// Start of the allocation (dangling when the allocation is empty).
    storage: NonNull<u8>,
    /// Layout of the whole allocation.
    storage_layout: Layout,
    /// Distance in bytes between consecutive slots.
    stride: usize,
    /// Number of slots.
    capacity: usize,
    /// Type stored in this pool.
    type_id: TypeId,
    /// Type name, for diagnostics.
    name: &'static str,
    /// Destructor hook, `None` for types without drop glue.
    drop_fn: Option<DropFn>,
}

impl ComponentPool {
    /// Allocates a pool with room for `capacity` values of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::PoolTooLarge`] if `size_of::<T>() × capacity`
    /// overflows the address space.
    pub fn new<T: Component>(capacity: usize) -> EcsResult<Self> {
        let drop_fn: Option<DropFn> = if std::mem::needs_drop::<T>() {
            Some(drop_erased::<T> as DropFn)
        } else {
            None
        };
        Self::with_layout(
            Layout::new::<T>(),
            capacity,
            TypeId::of::<T>(),
            type_name::<T>(),
            drop_fn,
        )
    }

    fn with_layout(
        item: Layout,
        capacity: usize,
        type_id: TypeId,
        name: &'static str,
        drop_fn: Option<DropFn>,
    ) -> EcsResult<Self> {
        let too_large = || EcsError::PoolTooLarge {
            component: name,
            capacity,
        };

        let stride = item.pad_to_align().size();
        let total_size = stride.checked_mul(capacity).ok_or_else(too_large)?;
        let storage_layout =
            Layout::from_size_align(total_size, item.align()).map_err(|_| too_large())?;

        let storage = if total_size == 0 {
            // Zero-sized types (or zero capacity): no memory, but the pointer
            // must still be aligned for `T`.
            NonNull::new(std::ptr::null_mut::<u8>().wrapping_add(item.align()))
                .unwrap_or(NonNull::dangling())
        } else {
            // SAFETY: `storage_layout` has a non-zero size.
            let ptr = unsafe { alloc(storage_layout) };
            NonNull::new(ptr).unwrap_or_else(|| handle_alloc_error(storage_layout))
        };

        tracing::trace!(component = name, capacity, bytes = total_size, "allocated component pool");

        Ok(Self {
            storage,
            storage_layout,
            stride,
            capacity,
            type_id,
            name,
            drop_fn,
        })
    }

    /// Returns the number of slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the size in bytes of one slot.
    #[inline]
    #[must_use]
    pub const fn element_size(&self) -> usize {
        self.stride
    }

    /// Returns the stored component's type name.
    #[inline]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if this pool stores values of type `T`.
    #[inline]
    #[must_use]
    pub fn holds<T: Component>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns the address of slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    #[inline]
    #[must_use]
    pub fn slot_ptr(&self, index: usize) -> NonNull<u8> {
        assert!(
            index < self.capacity,
            "slot {index} out of range for {} pool of {}",
            self.name,
            self.capacity
        );
        // SAFETY: `index < capacity`, so the offset stays inside the
        // allocation (or is zero for zero-sized slots).
        unsafe { NonNull::new_unchecked(self.storage.as_ptr().add(index * self.stride)) }
    }

    /// Moves `value` into slot `index` and returns a reference to it.
    ///
    /// Any value already in the slot is overwritten without being dropped.
    ///
    /// # Safety
    ///
    /// The pool must have been created for `T`.
    #[inline]
    pub unsafe fn write<T: Component>(&mut self, index: usize, value: T) -> &mut T {
        debug_assert!(self.holds::<T>(), "type confusion in {} pool", self.name);
        let ptr = self.slot_ptr(index).as_ptr().cast::<T>();
        ptr.write(value);
        &mut *ptr
    }

    /// Returns a reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// The pool must have been created for `T` and the slot must hold an
    /// initialized value.
    #[inline]
    #[must_use]
    pub unsafe fn get<T: Component>(&self, index: usize) -> &T {
        debug_assert!(self.holds::<T>(), "type confusion in {} pool", self.name);
        &*self.slot_ptr(index).as_ptr().cast::<T>()
    }

    /// Returns a mutable reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// Same contract as [`ComponentPool::get`].
    #[inline]
    pub unsafe fn get_mut<T: Component>(&mut self, index: usize) -> &mut T {
        debug_assert!(self.holds::<T>(), "type confusion in {} pool", self.name);
        &mut *self.slot_ptr(index).as_ptr().cast::<T>()
    }

    /// Moves the value out of slot `index`, leaving the slot uninitialized.
    ///
    /// # Safety
    ///
    /// Same contract as [`ComponentPool::get`]. The slot must not be read
    /// again until it is rewritten.
    #[inline]
    pub unsafe fn read<T: Component>(&mut self, index: usize) -> T {
        debug_assert!(self.holds::<T>(), "type confusion in {} pool", self.name);
        self.slot_ptr(index).as_ptr().cast::<T>().read()
    }

    /// Runs the destructor of the value in slot `index`.
    ///
    /// # Safety
    ///
    /// The slot must hold an initialized value. It is uninitialized afterwards.
    #[inline]
    pub unsafe fn drop_slot(&mut self, index: usize) {
        let ptr = self.slot_ptr(index);
        if let Some(drop_fn) = self.drop_fn {
            drop_fn(ptr.as_ptr());
        }
    }
}

impl Drop for ComponentPool {
    fn drop(&mut self) {
        // Values were already torn down by the owning scene; only the
        // backing memory is released here.
        if self.storage_layout.size() != 0 {
            // SAFETY: allocated in `with_layout` with this exact layout.
            unsafe { dealloc(self.storage.as_ptr(), self.storage_layout) };
        }
    }
}

impl std::fmt::Debug for ComponentPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentPool")
            .field("component", &self.name)
            .field("capacity", &self.capacity)
            .field("element_size", &self.stride)
            .finish_non_exhaustive()
    }
}
