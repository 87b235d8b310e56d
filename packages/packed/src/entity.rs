//! Entity handles.
//!
//! An `EntityID` is just the entity's current index in the world's table.
//! Entities are kept packed at the front of the table, so an entity's index
//! changes whenever it is moved to make room or close a gap. Long-lived
//! references should use an `EntityHandle`, which can detect that its slot has
//! since been given to a different entity.

/// A counter which is bumped every time the occupant of a slot changes.
pub type GenerationID = u64;

/// The index of a single entity in a `World`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityID(u32);

impl EntityID {
    /// The largest number of entities a world can hold.
    pub const MAX_ENTITIES: usize = u32::MAX as usize;

    /// Create a new EntityID given the index.
    ///
    /// # Panics
    /// If `index` does not fit in the handle.
    pub fn new(index: usize) -> EntityID {
        assert!(index < Self::MAX_ENTITIES, "entity index {} out of range", index);
        EntityID(index as u32)
    }

    /// Return the index of this entity.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<EntityID> for usize {
    fn from(id: EntityID) -> usize {
        id.index()
    }
}

/// An `EntityID` paired with the generation of its slot when it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    id: EntityID,
    generation: GenerationID,
}

impl EntityHandle {
    pub(crate) fn new(id: EntityID, generation: GenerationID) -> EntityHandle {
        EntityHandle { id, generation }
    }

    /// Return the index this handle was taken at.
    pub fn id(&self) -> EntityID {
        self.id
    }

    /// Return the slot generation this handle was taken at.
    pub fn generation(&self) -> GenerationID {
        self.generation
    }
}
