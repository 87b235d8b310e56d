//! An entity component system which keeps like entities packed together.
//!
//! Every live entity sits in the prefix `0..len()` of a fixed-capacity table,
//! and entities with exactly the same set of components form a contiguous
//! group. Queries walk whole groups rather than testing every entity.

pub use component::{
    Component,
    ComponentRegistry,
    ComponentTypeID,
};
pub use config::WorldConfig;
pub use entity::{EntityHandle, EntityID, GenerationID};
pub use error::{ConfigError, EcsError, PartitionError};
pub use group::EntityGroup;
pub use signature::{ComponentSet, Signature};
pub use system::{
    BoxSystem,
    System,
    SystemGroup,
    SystemToken,
};
pub use world::{QueryIter, World};

pub mod component;
pub mod config;
pub mod entity;
pub mod error;
pub mod group;
pub mod signature;

pub mod pool;
pub mod sparse;
pub mod table;

pub mod world;
pub mod system;
