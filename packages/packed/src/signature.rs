//! Signatures are the 'layout' of entities: the set of component types attached.

use std::fmt::{self, Debug, Formatter};

use crate::component::{Component, ComponentRegistry, ComponentTypeID, MAX_COMPONENTS};
use crate::error::{ConfigError, EcsError};

/// A bitmask with one bit per registered component type.
///
/// The empty signature marks a dead entity slot.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature(u8);

impl Signature {
    /// The signature with no components.
    pub const EMPTY: Signature = Signature(0);

    /// Create a signature from its raw bits.
    pub const fn from_bits(bits: u8) -> Signature {
        Signature(bits)
    }

    /// Return the raw bits of this signature.
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Build a signature out of a list of component types.
    pub fn from_types(component_types: impl IntoIterator<Item=ComponentTypeID>) -> Signature {
        component_types.into_iter()
            .fold(Signature::EMPTY, |sig, ty| sig.with(ty))
    }

    /// Returns true if no components are present.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Return the number of component types in this signature.
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns true if this signature contains the given component type.
    pub fn contains(&self, component_type: ComponentTypeID) -> bool {
        self.0 & Self::bit(component_type) != 0
    }

    /// Returns true if this signature contains every component of `other`.
    pub const fn includes_all(&self, other: Signature) -> bool {
        self.0 & other.0 == other.0
    }

    /// Return a copy of this signature with the given component added.
    #[must_use]
    pub fn with(self, component_type: ComponentTypeID) -> Signature {
        Signature(self.0 | Self::bit(component_type))
    }

    /// Return a copy of this signature with the given component removed.
    #[must_use]
    pub fn without(self, component_type: ComponentTypeID) -> Signature {
        Signature(self.0 & !Self::bit(component_type))
    }

    /// Return the union of two signatures.
    #[must_use]
    pub const fn union(self, other: Signature) -> Signature {
        Signature(self.0 | other.0)
    }

    /// Iterate over the component types in this signature, in ID order.
    pub fn iter(&self) -> SignatureIter {
        SignatureIter(self.0)
    }

    fn bit(component_type: ComponentTypeID) -> u8 {
        1 << component_type.id()
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:0width$b})", self.0, width = MAX_COMPONENTS)
    }
}

impl IntoIterator for Signature {
    type Item = ComponentTypeID;
    type IntoIter = SignatureIter;

    fn into_iter(self) -> SignatureIter {
        self.iter()
    }
}

/// An iterator over the component types in a `Signature`.
#[derive(Clone, Debug)]
pub struct SignatureIter(u8);

impl Iterator for SignatureIter {
    type Item = ComponentTypeID;

    fn next(&mut self) -> Option<ComponentTypeID> {
        if self.0 == 0 {
            return None;
        }

        let id = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(ComponentTypeID::new(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SignatureIter {}

/// A statically known list of component types.
///
/// This is implemented for tuples of up to eight components, e.g. `(A,)` or
/// `(A, B)`.
pub trait ComponentSet {
    /// Register every component in the set, in tuple order.
    fn register(registry: &mut ComponentRegistry) -> Result<(), ConfigError>;

    /// Resolve the set into a signature for the given registry.
    fn signature(registry: &ComponentRegistry) -> Result<Signature, EcsError>;
}

/// Resolve the ID of a single component type, failing if unregistered.
pub(crate) fn type_id_in<T: Component>(registry: &ComponentRegistry) -> Result<ComponentTypeID, EcsError> {
    registry.type_id_of::<T>()
        .ok_or(EcsError::UnregisteredComponent(std::any::type_name::<T>()))
}

macro_rules! impl_component_set {
    ($($t:ident),+) => {
        impl<$($t: Component),+> ComponentSet for ($($t,)+) {
            fn register(registry: &mut ComponentRegistry) -> Result<(), ConfigError> {
                $(registry.register::<$t>()?;)+
                Ok(())
            }

            fn signature(registry: &ComponentRegistry) -> Result<Signature, EcsError> {
                let mut signature = Signature::EMPTY;
                $(signature = signature.with(type_id_in::<$t>(registry)?);)+
                Ok(signature)
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
