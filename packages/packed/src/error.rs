//! Error types.

use thiserror::Error;

use crate::component::ComponentTypeID;
use crate::signature::Signature;

/// A problem with how a `World` or its registry was set up.
///
/// These are returned while building a world, never during normal operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("world capacity must be greater than zero")]
    ZeroCapacity,
    #[error("world capacity {requested} exceeds the maximum of {max}")]
    CapacityTooLarge { requested: usize, max: usize },
    #[error("cannot register more than {0} component types")]
    TooManyComponents(usize),
    #[error("component type `{0}` was registered twice")]
    DuplicateComponent(&'static str),
    #[error("storage for component `{0}` does not fit in memory at this capacity")]
    ArenaOverflow(&'static str),
    #[error("failed to parse world config: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// A recoverable error returned to the caller of a `World` operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    #[error("world is full ({capacity} entities)")]
    CapacityExceeded { capacity: usize },
    #[error("entities must hold at least one component")]
    EmptySignature,
    #[error("component type `{0}` is not registered with this world")]
    UnregisteredComponent(&'static str),
    #[error("signature {0:?} refers to unregistered component types")]
    UnknownSignature(Signature),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A broken structural invariant of the entity table or its groups.
///
/// Returned by `World::check_invariants`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("group {group} starts at {start}, expected {expected}")]
    Gap { group: usize, start: usize, expected: usize },
    #[error("group {group} is empty")]
    EmptyGroup { group: usize },
    #[error("groups cover {covered} entities but {live} are live")]
    Coverage { covered: usize, live: usize },
    #[error("groups {first} and {second} share signature {signature:?}")]
    DuplicateSignature { first: usize, second: usize, signature: Signature },
    #[error("entity {index} has signature {found:?} inside a group tagged {expected:?}")]
    ForeignSignature { index: usize, expected: Signature, found: Signature },
    #[error("entity {index} inside the live prefix is dead")]
    DeadEntity { index: usize },
    #[error("entity {index} beyond the live prefix is alive")]
    LiveOutsidePrefix { index: usize },
    #[error("entity {index} maps {component:?} to unoccupied dense slot {slot}")]
    UnoccupiedSlot { index: usize, component: ComponentTypeID, slot: usize },
    #[error("entities {first} and {second} share dense slot {slot} of {component:?}")]
    SharedSlot { first: usize, second: usize, component: ComponentTypeID, slot: usize },
    #[error("{occupied} dense slots of {component:?} are occupied but {holders} entities hold it")]
    SlotLeak { component: ComponentTypeID, occupied: usize, holders: usize },
}
