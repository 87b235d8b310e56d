//! Base definitions for components.
//!
//! All entities in this library are built out of components. There is no intrinsic
//! value to an entity. This module provides means of defining and registering
//! components.
//!
//! Component types are registered with a `ComponentRegistry`, which assigns
//! each one a small `ComponentTypeID` in registration order. There is a macro
//! (`component`) to mark a type as a component.

use std::alloc::Layout;
use std::any::{type_name, TypeId};
use std::cmp::{Ord, Ordering};
use std::fmt::{self, Debug, Formatter};

use crate::error::ConfigError;

/// The maximum number of component types a single registry can hold.
///
/// Entity signatures are one byte wide, so this is also the signature width.
pub const MAX_COMPONENTS: usize = 8;

/// A component type ID, unique within one `ComponentRegistry`.
///
/// IDs are assigned densely from zero in registration order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentTypeID(u8);

impl ComponentTypeID {
    /// Construct a new `ComponentTypeID` from the inner value.
    ///
    /// # Panics
    /// If `inner` is not below `MAX_COMPONENTS`.
    pub fn new(inner: usize) -> ComponentTypeID {
        assert!(inner < MAX_COMPONENTS, "component type ID {} out of range", inner);
        ComponentTypeID(inner as u8)
    }

    /// Return the inner ID.
    pub fn id(&self) -> usize {
        self.0 as usize
    }
}

impl Debug for ComponentTypeID {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTypeID(#{})", self.0)
    }
}

/// The component trait is implemented on all component types.
///
/// Components are stored as raw bytes and moved around with plain memory
/// copies, so they must be `Copy`. Freshly attached components start out as
/// `Default::default()`.
pub trait Component: Debug + Default + Copy + 'static {}

/// Implement the `Component` trait on one or more types.
///
/// Component types must implement Copy, Default and Debug.
#[macro_export]
macro_rules! component {
    ($($i:ident),+ $(,)?) => {
        $(
            impl $crate::component::Component for $i {}
        )+
    };
}

/// A ComponentRegistration is the dynamic version of a type implementing Component.
///
/// It describes everything component storage needs to know about a type
/// without knowing the type itself.
#[derive(Clone, Copy)]
pub struct ComponentRegistration {
    type_id: ComponentTypeID,
    rust_type: TypeId,
    layout: Layout,
    set_default: fn(&mut [u8]),
    name: &'static str,
}

impl ComponentRegistration {
    /// Create a ComponentRegistration for a static type.
    pub fn new<T: Component>(type_id: ComponentTypeID) -> ComponentRegistration {
        fn default<T: Component>(bytes: &mut [u8]) {
            assert_eq!(bytes.len(), std::mem::size_of::<T>());
            unsafe { std::ptr::write_unaligned(bytes.as_mut_ptr() as *mut T, T::default()) };
        }

        ComponentRegistration {
            type_id,
            rust_type: TypeId::of::<T>(),
            layout: Layout::new::<T>(),
            set_default: default::<T>,
            name: type_name::<T>(),
        }
    }

    /// Return the registry-local type ID for this `ComponentRegistration`.
    pub fn type_id(&self) -> ComponentTypeID {
        self.type_id
    }

    /// Return the memory layout of a single instance of this component.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Get the name of this component type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this registration describes `T`.
    pub fn is<T: Component>(&self) -> bool {
        self.rust_type == TypeId::of::<T>()
    }

    /// Given the storage buffer of a component instance, fill in the default
    /// value.
    pub fn set_default(&self, bytes: &mut [u8]) {
        (self.set_default)(bytes)
    }
}

impl PartialEq for ComponentRegistration {
    fn eq(&self, other: &ComponentRegistration) -> bool {
        self.type_id.eq(&other.type_id)
    }
}

impl Eq for ComponentRegistration {}

impl PartialOrd for ComponentRegistration {
    fn partial_cmp(&self, other: &ComponentRegistration) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComponentRegistration {
    fn cmp(&self, other: &ComponentRegistration) -> Ordering {
        self.type_id.cmp(&other.type_id)
    }
}

impl Debug for ComponentRegistration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<ComponentRegistration #{} {}>", self.type_id.id(), self.name)
    }
}

/// The ordered set of component types known to a `World`.
#[derive(Clone, Debug, Default)]
pub struct ComponentRegistry {
    registrations: Vec<ComponentRegistration>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> ComponentRegistry {
        ComponentRegistry {
            registrations: Vec::with_capacity(MAX_COMPONENTS),
        }
    }

    /// Register a component type, returning its newly assigned ID.
    pub fn register<T: Component>(&mut self) -> Result<ComponentTypeID, ConfigError> {
        if self.type_id_of::<T>().is_some() {
            return Err(ConfigError::DuplicateComponent(type_name::<T>()));
        }

        if self.registrations.len() >= MAX_COMPONENTS {
            return Err(ConfigError::TooManyComponents(MAX_COMPONENTS));
        }

        let id = ComponentTypeID::new(self.registrations.len());
        self.registrations.push(ComponentRegistration::new::<T>(id));
        Ok(id)
    }

    /// Builder-style version of `register`.
    pub fn with<T: Component>(mut self) -> Result<ComponentRegistry, ConfigError> {
        self.register::<T>()?;
        Ok(self)
    }

    /// Look up the ID assigned to `T`, if it was registered.
    pub fn type_id_of<T: Component>(&self) -> Option<ComponentTypeID> {
        self.registrations.iter()
            .find(|r| r.is::<T>())
            .map(|r| r.type_id())
    }

    /// Fetch the registration for an ID.
    pub fn registration(&self, type_id: ComponentTypeID) -> Option<&ComponentRegistration> {
        self.registrations.get(type_id.id())
    }

    /// Return all registrations in ID order.
    pub fn registrations(&self) -> &[ComponentRegistration] {
        &self.registrations
    }

    /// Return the number of registered component types.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns true if no component types have been registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
