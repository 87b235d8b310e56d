//! Fixed-size, type-erased component storage.

use std::alloc::{self, Layout};
use std::fmt::{self, Debug, Formatter};
use std::ptr::{self, NonNull};

use crate::component::{Component, ComponentRegistration};
use crate::error::ConfigError;

/// A pool of component values of a single type.
///
/// The pool is one contiguous block of memory, allocated up front with room
/// for `capacity` values and never resized. Values are addressed by their
/// dense slot index.
pub struct ComponentPool {
    registration: ComponentRegistration,
    stride: usize,
    capacity: usize,
    layout: Layout,
    ptr: NonNull<u8>,
}

impl ComponentPool {
    /// Allocate a new pool for the registered type.
    ///
    /// Every slot starts out holding the default value.
    pub fn new(registration: ComponentRegistration, capacity: usize) -> Result<ComponentPool, ConfigError> {
        let element = registration.layout().pad_to_align();
        let stride = element.size();
        let layout = stride.checked_mul(capacity)
            .and_then(|size| Layout::from_size_align(size, element.align()).ok())
            .ok_or(ConfigError::ArenaOverflow(registration.name()))?;

        let ptr = if layout.size() == 0 {
            // Zero-sized values still need a well-aligned address.
            NonNull::new(layout.align() as *mut u8).ok_or(ConfigError::ArenaOverflow(registration.name()))?
        } else {
            let raw_ptr = unsafe { alloc::alloc_zeroed(layout) };
            match NonNull::new(raw_ptr) {
                Some(ptr) => ptr,
                None => alloc::handle_alloc_error(layout),
            }
        };

        let mut pool = ComponentPool {
            registration,
            stride,
            capacity,
            layout,
            ptr,
        };

        for slot in 0..capacity {
            pool.set_default(slot);
        }

        Ok(pool)
    }

    /// Return the registration for the type stored in this pool.
    pub fn registration(&self) -> &ComponentRegistration {
        &self.registration
    }

    /// Return the number of slots in this pool.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the distance in bytes between two adjacent slots.
    pub fn stride(&self) -> usize {
        self.stride
    }

    fn slot_ptr(&self, slot: usize) -> *mut u8 {
        assert!(slot < self.capacity, "slot {} out of range for pool of {}", slot, self.capacity);
        unsafe { self.ptr.as_ptr().add(slot * self.stride) }
    }

    /// Get the raw bytes of the value in a slot.
    pub fn bytes(&self, slot: usize) -> &[u8] {
        let size = self.registration.layout().size();
        unsafe { std::slice::from_raw_parts(self.slot_ptr(slot), size) }
    }

    /// Get the raw bytes of the value in a slot, mutably.
    pub fn bytes_mut(&mut self, slot: usize) -> &mut [u8] {
        let size = self.registration.layout().size();
        unsafe { std::slice::from_raw_parts_mut(self.slot_ptr(slot), size) }
    }

    /// Get a reference to the value in a slot.
    ///
    /// # Panics
    /// If `T` is not the type this pool was created for.
    pub fn get<T: Component>(&self, slot: usize) -> &T {
        assert!(self.registration.is::<T>(), "pool holds {}, not {}",
                self.registration.name(), std::any::type_name::<T>());
        unsafe { &*(self.slot_ptr(slot) as *const T) }
    }

    /// Get a mutable reference to the value in a slot.
    ///
    /// # Panics
    /// If `T` is not the type this pool was created for.
    pub fn get_mut<T: Component>(&mut self, slot: usize) -> &mut T {
        assert!(self.registration.is::<T>(), "pool holds {}, not {}",
                self.registration.name(), std::any::type_name::<T>());
        unsafe { &mut *(self.slot_ptr(slot) as *mut T) }
    }

    /// Reset a slot to the default value.
    pub fn set_default(&mut self, slot: usize) {
        let registration = self.registration;
        registration.set_default(self.bytes_mut(slot));
    }

    /// Copy the value in one slot over another.
    pub fn copy(&mut self, from: usize, to: usize) {
        let size = self.registration.layout().size();
        if from == to || size == 0 {
            return;
        }

        let src = self.slot_ptr(from);
        let dest = self.slot_ptr(to);
        unsafe { ptr::copy_nonoverlapping(src, dest, size) };
    }

    /// Exchange the values in two slots.
    pub fn swap(&mut self, a: usize, b: usize) {
        let size = self.registration.layout().size();
        if a == b || size == 0 {
            return;
        }

        let pa = self.slot_ptr(a);
        let pb = self.slot_ptr(b);
        unsafe { ptr::swap_nonoverlapping(pa, pb, size) };
    }
}

impl Debug for ComponentPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentPool {{ type: {}, capacity: {}, stride: {} }}",
               self.registration.name(), self.capacity, self.stride)
    }
}

impl Drop for ComponentPool {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
        }
    }
}
