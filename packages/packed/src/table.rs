//! The entity table: signatures, slot generations and component storage.
//!
//! The table knows nothing about groups. It provides the primitive moves
//! (`swap`, `transfer`) which keep the per-component sparse sets in step with
//! the entity signatures, and the `World` builds the grouped layout on top.

use crate::component::{Component, ComponentRegistry, ComponentTypeID};
use crate::entity::{EntityID, GenerationID};
use crate::error::{ConfigError, PartitionError};
use crate::pool::ComponentPool;
use crate::signature::Signature;
use crate::sparse::SparseSet;

/// Fixed-capacity storage for entity signatures and their component data.
#[derive(Debug)]
pub struct EntityTable {
    signatures: Vec<Signature>,
    generations: Vec<GenerationID>,
    live: usize,
    pools: Vec<ComponentPool>,
    sparse: Vec<SparseSet>,
}

impl EntityTable {
    /// Allocate a table for `capacity` entities with a pool for every
    /// registered component type.
    pub fn new(registry: &ComponentRegistry, capacity: usize) -> Result<EntityTable, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        if capacity > EntityID::MAX_ENTITIES {
            return Err(ConfigError::CapacityTooLarge {
                requested: capacity,
                max: EntityID::MAX_ENTITIES,
            });
        }

        let pools = registry.registrations().iter()
            .map(|registration| ComponentPool::new(*registration, capacity))
            .collect::<Result<Vec<_>, _>>()?;
        let sparse = (0..registry.len())
            .map(|_| SparseSet::new(capacity))
            .collect();

        Ok(EntityTable {
            signatures: vec![Signature::EMPTY; capacity],
            generations: vec![0; capacity],
            live: 0,
            pools,
            sparse,
        })
    }

    /// Return the maximum number of entities.
    pub fn capacity(&self) -> usize {
        self.signatures.len()
    }

    /// Return the number of live entities.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if there are no live entities.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns true if no more entities can be created.
    pub fn is_full(&self) -> bool {
        self.live == self.capacity()
    }

    pub(crate) fn grow(&mut self) {
        assert!(self.live < self.capacity(), "entity table overflow");
        self.live += 1;
    }

    pub(crate) fn shrink(&mut self) {
        assert!(self.live > 0, "entity table underflow");
        self.live -= 1;
    }

    /// Return the signature stored at an index.
    pub fn signature(&self, index: usize) -> Signature {
        self.signatures[index]
    }

    /// Return the signatures of the live prefix.
    pub fn live_signatures(&self) -> &[Signature] {
        &self.signatures[..self.live]
    }

    /// Return the generation of the slot at an index.
    pub fn generation(&self, index: usize) -> GenerationID {
        self.generations[index]
    }

    /// Returns true if the slot at an index holds an entity.
    pub fn is_alive(&self, index: usize) -> bool {
        self.signatures.get(index).map_or(false, |sig| !sig.is_empty())
    }

    fn bump(&mut self, index: usize) {
        self.generations[index] = self.generations[index].wrapping_add(1);
    }

    /// Return the pool for a component type.
    pub fn pool(&self, component_type: ComponentTypeID) -> &ComponentPool {
        &self.pools[component_type.id()]
    }

    /// Return the sparse set for a component type.
    pub fn sparse_set(&self, component_type: ComponentTypeID) -> &SparseSet {
        &self.sparse[component_type.id()]
    }

    /// Return the dense slot holding an entity's component, if attached.
    pub fn slot(&self, index: usize, component_type: ComponentTypeID) -> Option<usize> {
        if self.signatures[index].contains(component_type) {
            Some(self.sparse[component_type.id()].slot(index))
        } else {
            None
        }
    }

    /// Get a reference to an entity's component, if attached.
    pub fn get<T: Component>(&self, index: usize, component_type: ComponentTypeID) -> Option<&T> {
        self.slot(index, component_type)
            .map(|slot| self.pools[component_type.id()].get::<T>(slot))
    }

    /// Get a mutable reference to an entity's component, if attached.
    pub fn get_mut<T: Component>(&mut self, index: usize, component_type: ComponentTypeID) -> Option<&mut T> {
        let slot = self.slot(index, component_type)?;
        Some(self.pools[component_type.id()].get_mut::<T>(slot))
    }

    /// Attach a default-initialised component to an entity slot.
    ///
    /// Returns false if the component was already attached.
    pub fn attach(&mut self, index: usize, component_type: ComponentTypeID) -> bool {
        if self.signatures[index].contains(component_type) {
            return false;
        }

        let ty = component_type.id();
        let slot = self.sparse[ty].attach(index)
            .expect("dense slots outnumber entities, so a free slot must exist");
        self.pools[ty].set_default(slot);
        self.signatures[index] = self.signatures[index].with(component_type);
        true
    }

    /// Detach a component from an entity slot, releasing its dense slot.
    ///
    /// Returns false if the component was not attached.
    pub fn detach(&mut self, index: usize, component_type: ComponentTypeID) -> bool {
        if !self.signatures[index].contains(component_type) {
            return false;
        }

        self.sparse[component_type.id()].detach(index);
        self.signatures[index] = self.signatures[index].without(component_type);
        true
    }

    /// Bring a dead slot to life with default components for `signature`.
    pub(crate) fn spawn_at(&mut self, index: usize, signature: Signature) {
        assert!(!self.is_alive(index), "slot {} is already occupied", index);
        for component_type in signature {
            self.attach(index, component_type);
        }
        self.bump(index);
    }

    /// Kill the entity in a slot, releasing all of its components.
    pub(crate) fn release(&mut self, index: usize) {
        let signature = self.signatures[index];
        for component_type in signature {
            self.sparse[component_type.id()].detach(index);
        }
        self.signatures[index] = Signature::EMPTY;
        self.bump(index);
    }

    /// Exchange two entities, components included.
    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }

        let touched = self.signatures[a].union(self.signatures[b]);
        for component_type in touched {
            self.sparse[component_type.id()].swap(a, b);
        }
        self.signatures.swap(a, b);
        self.bump(a);
        self.bump(b);
    }

    /// Move a live entity into a dead slot, leaving `from` dead.
    pub(crate) fn transfer(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }

        assert!(!self.is_alive(to), "cannot transfer onto live slot {}", to);
        let signature = self.signatures[from];
        for component_type in signature {
            self.sparse[component_type.id()].relocate(from, to);
        }
        self.signatures[to] = signature;
        self.signatures[from] = Signature::EMPTY;
        self.bump(from);
        self.bump(to);
    }

    /// Copy every component value `from` and `to` have in common.
    pub(crate) fn copy_components(&mut self, from: usize, to: usize) {
        let shared = Signature::from_bits(self.signatures[from].bits() & self.signatures[to].bits());
        for component_type in shared {
            let ty = component_type.id();
            let src = self.sparse[ty].slot(from);
            let dest = self.sparse[ty].slot(to);
            self.pools[ty].copy(src, dest);
        }
    }

    /// Reorder the pool for a component so the n-th live holder (in table
    /// order) owns dense slot n.
    pub(crate) fn pack(&mut self, component_type: ComponentTypeID) {
        let ty = component_type.id();
        let capacity = self.capacity();
        let holders = (0..self.live)
            .filter(|&index| self.signatures[index].contains(component_type))
            .collect::<Vec<_>>();

        let mut owner = vec![None; capacity];
        for &index in &holders {
            owner[self.sparse[ty].slot(index)] = Some(index);
        }

        for (target, &index) in holders.iter().enumerate() {
            let slot = self.sparse[ty].slot(index);
            if slot == target {
                continue;
            }

            self.pools[ty].swap(slot, target);
            if let Some(displaced) = owner[target] {
                self.sparse[ty].set_slot(displaced, slot);
            }
            owner[slot] = owner[target];
            owner[target] = Some(index);
            self.sparse[ty].set_slot(index, target);
        }

        self.sparse[ty].occupy_prefix(holders.len());
    }

    /// Verify the live prefix is dense and every component mapping is sound.
    pub fn check(&self) -> Result<(), PartitionError> {
        for index in 0..self.capacity() {
            let alive = self.is_alive(index);
            if index < self.live && !alive {
                return Err(PartitionError::DeadEntity { index });
            }
            if index >= self.live && alive {
                return Err(PartitionError::LiveOutsidePrefix { index });
            }
        }

        for (ty, set) in self.sparse.iter().enumerate() {
            let component = ComponentTypeID::new(ty);
            let mut owner = vec![None; self.capacity()];
            let mut holders = 0;

            for index in 0..self.live {
                if !self.signatures[index].contains(component) {
                    continue;
                }

                holders += 1;
                let slot = set.slot(index);
                if !set.is_occupied(slot) {
                    return Err(PartitionError::UnoccupiedSlot { index, component, slot });
                }
                if let Some(first) = owner[slot] {
                    return Err(PartitionError::SharedSlot { first, second: index, component, slot });
                }
                owner[slot] = Some(index);
            }

            let occupied = set.occupied();
            if occupied != holders {
                return Err(PartitionError::SlotLeak { component, occupied, holders });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::component;

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Position(f32, f32);
    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Tag(u32);

    component!(Position, Tag);

    fn position() -> ComponentTypeID {
        ComponentTypeID::new(0)
    }

    fn table(capacity: usize) -> EntityTable {
        let registry = ComponentRegistry::new()
            .with::<Position>().unwrap()
            .with::<Tag>().unwrap();
        EntityTable::new(&registry, capacity).unwrap()
    }

    fn spawn(table: &mut EntityTable, signature: Signature) -> usize {
        let index = table.len();
        table.spawn_at(index, signature);
        table.grow();
        index
    }

    #[test]
    fn test_zero_capacity() {
        let registry = ComponentRegistry::new();
        assert_eq!(EntityTable::new(&registry, 0).unwrap_err(), ConfigError::ZeroCapacity);
    }

    #[test]
    fn test_spawn_and_release() {
        let mut table = table(4);
        let e = spawn(&mut table, Signature::from_bits(0b11));
        assert_eq!(table.get::<Position>(e, position()), Some(&Position(0.0, 0.0)));
        assert_eq!(table.sparse_set(position()).occupied(), 1);

        let generation = table.generation(e);
        table.release(e);
        table.shrink();
        assert!(!table.is_alive(e));
        assert_ne!(table.generation(e), generation);
        assert_eq!(table.sparse_set(position()).occupied(), 0);
        table.check().unwrap();
    }

    #[test]
    fn test_swap_moves_components() {
        let mut table = table(4);
        let a = spawn(&mut table, Signature::from_bits(0b01));
        let b = spawn(&mut table, Signature::from_bits(0b11));
        *table.get_mut::<Position>(a, position()).unwrap() = Position(1.0, 1.0);
        *table.get_mut::<Position>(b, position()).unwrap() = Position(2.0, 2.0);

        table.swap(a, b);
        assert_eq!(table.signature(a), Signature::from_bits(0b11));
        assert_eq!(table.get::<Position>(a, position()), Some(&Position(2.0, 2.0)));
        assert_eq!(table.get::<Position>(b, position()), Some(&Position(1.0, 1.0)));
        table.check().unwrap();
    }

    #[test]
    fn test_transfer_moves_components() {
        let mut table = table(4);
        let a = spawn(&mut table, Signature::from_bits(0b01));
        *table.get_mut::<Position>(a, position()).unwrap() = Position(3.0, 4.0);

        table.transfer(a, 2);
        assert!(!table.is_alive(a));
        assert_eq!(table.get::<Position>(2, position()), Some(&Position(3.0, 4.0)));
        assert_eq!(table.get::<Position>(a, position()), None);
    }

    #[test]
    #[should_panic]
    fn test_transfer_onto_live_slot() {
        let mut table = table(4);
        let a = spawn(&mut table, Signature::from_bits(0b01));
        let b = spawn(&mut table, Signature::from_bits(0b01));
        table.transfer(a, b);
    }

    #[test]
    fn test_pack() {
        let mut table = table(4);
        let a = spawn(&mut table, Signature::from_bits(0b01));
        let b = spawn(&mut table, Signature::from_bits(0b01));
        let c = spawn(&mut table, Signature::from_bits(0b01));
        *table.get_mut::<Position>(c, position()).unwrap() = Position(9.0, 9.0);

        // Scramble the dense slots: a -> 2, b -> 0, c -> 1.
        table.detach(b, position());
        table.detach(a, position());
        table.attach(b, position());
        table.attach(a, position());
        table.swap(a, c);

        table.pack(position());
        assert_eq!(table.slot(a, position()), Some(0));
        assert_eq!(table.slot(b, position()), Some(1));
        assert_eq!(table.slot(c, position()), Some(2));
        assert_eq!(table.get::<Position>(a, position()), Some(&Position(9.0, 9.0)));
        table.check().unwrap();
    }
}
