//! A world which holds entities packed into signature groups.
//!
//! Live entities always occupy the front of the table, `0..len()`, and the
//! `GroupPartition` splits that prefix into one contiguous run per signature.
//! Creating an entity inserts it at the end of its group, shuffling the first
//! entity of every later group along by one. Destroying an entity fills the
//! hole from the end of its group and shuffles every later group back.
//!
//! Attaching or detaching components changes a signature in place, which
//! leaves the partition stale until the next `refactor()`.

use log::{debug, trace};

pub use query::QueryIter;

use crate::component::{Component, ComponentRegistry, ComponentTypeID};
use crate::config::WorldConfig;
use crate::entity::{EntityHandle, EntityID};
use crate::error::{ConfigError, EcsError, PartitionError};
use crate::group::{EntityGroup, GroupPartition};
use crate::signature::{type_id_in, ComponentSet, Signature};
use crate::table::EntityTable;

mod query;
mod refactor;

/// A fixed-capacity collection of entities and their components.
#[derive(Debug)]
pub struct World {
    registry: ComponentRegistry,
    config: WorldConfig,
    table: EntityTable,
    groups: GroupPartition,
    stale: bool,
}

impl World {
    /// Create a new, empty world.
    ///
    /// The registry is fixed for the lifetime of the world.
    pub fn new(registry: ComponentRegistry, config: WorldConfig) -> Result<World, ConfigError> {
        config.validate()?;
        let table = EntityTable::new(&registry, config.capacity)?;
        debug!("created world for {} entities with {} component types", config.capacity, registry.len());

        Ok(World {
            registry,
            config,
            table,
            groups: GroupPartition::new(),
            stale: false,
        })
    }

    /// Create a new world registering the component types in `S`, in order.
    pub fn with_capacity<S: ComponentSet>(capacity: usize) -> Result<World, ConfigError> {
        let mut registry = ComponentRegistry::new();
        S::register(&mut registry)?;
        World::new(registry, WorldConfig::with_capacity(capacity))
    }

    /// Return the component registry of this world.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Return the settings this world was built with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Return the underlying entity table.
    pub fn table(&self) -> &EntityTable {
        &self.table
    }

    /// Return the maximum number of entities.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Return the number of live entities.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if there are no live entities.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Return the entity groups, in index order.
    pub fn groups(&self) -> &[EntityGroup] {
        self.groups.groups()
    }

    /// Returns true if every group holds only entities of its own signature.
    ///
    /// This is false after `attach` or `detach` until `refactor` is called.
    pub fn is_partitioned(&self) -> bool {
        !self.stale
    }

    /// Returns true if an entity exists at the given index.
    pub fn is_alive(&self, id: EntityID) -> bool {
        self.table.is_alive(id.index())
    }

    /// Return the signature of an entity, empty if it is dead.
    pub fn signature(&self, id: EntityID) -> Signature {
        if id.index() < self.capacity() {
            self.table.signature(id.index())
        } else {
            Signature::EMPTY
        }
    }

    /// Resolve the signature for a set of component types.
    pub fn signature_of<S: ComponentSet>(&self) -> Result<Signature, EcsError> {
        S::signature(&self.registry)
    }

    /// Return the ID assigned to a component type in this world.
    pub fn component_type<T: Component>(&self) -> Result<ComponentTypeID, EcsError> {
        type_id_in::<T>(&self.registry)
    }

    fn expect_component_type<T: Component>(&self) -> ComponentTypeID {
        match self.component_type::<T>() {
            Ok(ty) => ty,
            Err(err) => panic!("{}", err),
        }
    }

    fn expect_alive(&self, id: EntityID) {
        assert!(self.is_alive(id), "entity {} is not alive", id.index());
    }

    /// Take a handle to an entity which can later detect that its slot has
    /// been reused or its entity moved.
    pub fn handle(&self, id: EntityID) -> Option<EntityHandle> {
        if self.is_alive(id) {
            Some(EntityHandle::new(id, self.table.generation(id.index())))
        } else {
            None
        }
    }

    /// Return the entity a handle refers to, if the slot has not changed hands.
    pub fn resolve(&self, handle: EntityHandle) -> Option<EntityID> {
        let id = handle.id();
        if self.is_alive(id) && self.table.generation(id.index()) == handle.generation() {
            Some(id)
        } else {
            None
        }
    }

    /// Create an entity with default-initialised components of the types in `S`.
    pub fn create<S: ComponentSet>(&mut self) -> Result<EntityID, EcsError> {
        let signature = S::signature(&self.registry)?;
        self.create_with_signature(signature)
    }

    /// Create an entity with default-initialised components for a signature.
    pub fn create_with_signature(&mut self, signature: Signature) -> Result<EntityID, EcsError> {
        self.spawn(signature, None).map(|(id, _)| id)
    }

    /// Create a copy of an entity, components included.
    ///
    /// Like `create`, this may move other entities. While the world is not
    /// partitioned that can include the source entity itself.
    ///
    /// # Panics
    /// If `id` is not alive.
    pub fn clone_entity(&mut self, id: EntityID) -> Result<EntityID, EcsError> {
        self.expect_alive(id);
        let signature = self.table.signature(id.index());
        let (clone, source) = self.spawn(signature, Some(id.index()))?;
        if let Some(source) = source {
            self.table.copy_components(source, clone.index());
        }
        Ok(clone)
    }

    fn validate_signature(&self, signature: Signature) -> Result<(), EcsError> {
        if signature.is_empty() {
            return Err(EcsError::EmptySignature);
        }

        if (signature.bits() as u16) >> self.registry.len() != 0 {
            return Err(EcsError::UnknownSignature(signature));
        }

        Ok(())
    }

    /// Insert a new entity at the end of its group.
    ///
    /// `follow` is an entity index to track through the moves made to open up
    /// room. Its final index is returned alongside the new entity.
    fn spawn(&mut self, signature: Signature, follow: Option<usize>) -> Result<(EntityID, Option<usize>), EcsError> {
        self.validate_signature(signature)?;

        if self.table.is_full() {
            debug!("cannot create entity with {:?}: world is full", signature);
            return Err(EcsError::CapacityExceeded { capacity: self.capacity() });
        }

        let group = match self.groups.find(signature) {
            Some(group) => group,
            None => {
                let group = self.groups.push(signature);
                debug!("new group {} for {:?} at {}", group, signature, self.groups.end());
                group
            }
        };

        let follow = self.make_room(group, follow);
        let index = self.groups.groups()[group].end();
        self.table.spawn_at(index, signature);
        self.table.grow();
        self.groups.grow(group);
        debug_assert_eq!(self.groups.check(self.table.len(), None), Ok(()));

        Ok((EntityID::new(index), follow))
    }

    /// Free the slot just past the end of `group`.
    ///
    /// Every later group moves its first entity to its own end, starting from
    /// the last group (whose end is always free).
    fn make_room(&mut self, group: usize, mut follow: Option<usize>) -> Option<usize> {
        let mut pending = Vec::new();
        let mut slot = self.groups.groups()[group].end();
        while self.table.is_alive(slot) {
            let occupant = self.groups.index_of(slot)
                .expect("live entities always belong to a group");
            pending.push(occupant);
            slot = self.groups.groups()[occupant].end();
        }

        while let Some(displaced) = pending.pop() {
            let g = self.groups.groups()[displaced];
            trace!("moving entity {} to {} to grow group {}", g.start(), g.end(), group);
            self.table.transfer(g.start(), g.end());
            if follow == Some(g.start()) {
                follow = Some(g.end());
            }
            self.groups.shift_up(displaced);
        }

        follow
    }

    /// Destroy an entity and all of its components.
    ///
    /// Other entities may be moved to keep the live prefix packed, so any
    /// indices held from before this call should be considered invalid.
    /// Destroying a dead entity does nothing.
    pub fn destroy(&mut self, id: EntityID) {
        let index = id.index();
        if !self.table.is_alive(index) {
            return;
        }

        let group = self.groups.index_of(index)
            .expect("live entities always belong to a group");
        let last = self.groups.groups()[group].end() - 1;

        self.table.release(index);
        self.table.transfer(last, index);
        self.groups.shrink(group);

        let next = if self.groups.groups()[group].is_empty() {
            let removed = self.groups.remove(group);
            debug!("removed empty group for {:?}", removed.signature());
            group
        } else {
            group + 1
        };

        let mut hole = last;
        for g in next..self.groups.len() {
            let tail = self.groups.groups()[g].end() - 1;
            trace!("moving entity {} to {} to close gap", tail, hole);
            self.table.transfer(tail, hole);
            self.groups.shift_down(g);
            hole = tail;
        }

        self.table.shrink();
        debug_assert_eq!(hole, self.table.len());
        debug_assert_eq!(self.groups.check(self.table.len(), None), Ok(()));
    }

    /// Attach a default-initialised component to an entity.
    ///
    /// The entity keeps its index. Attaching a component the entity already
    /// has does nothing.
    ///
    /// # Panics
    /// If `id` is not alive.
    pub fn attach<T: Component>(&mut self, id: EntityID) -> Result<(), EcsError> {
        let component_type = self.component_type::<T>()?;
        self.expect_alive(id);

        if self.table.attach(id.index(), component_type) {
            self.stale = true;
        }
        Ok(())
    }

    /// Detach a component from an entity.
    ///
    /// The entity keeps its index, unless this was its last component, in
    /// which case the entity is destroyed. Detaching a component the entity
    /// does not have does nothing.
    ///
    /// # Panics
    /// If `id` is not alive.
    pub fn detach<T: Component>(&mut self, id: EntityID) -> Result<(), EcsError> {
        let component_type = self.component_type::<T>()?;
        self.expect_alive(id);

        let signature = self.table.signature(id.index());
        if !signature.contains(component_type) {
            return Ok(());
        }

        if signature.without(component_type).is_empty() {
            self.destroy(id);
        } else {
            self.table.detach(id.index(), component_type);
            self.stale = true;
        }
        Ok(())
    }

    /// Returns true if the entity has a component of type `T`.
    pub fn has<T: Component>(&self, id: EntityID) -> bool {
        match self.registry.type_id_of::<T>() {
            Some(component_type) => self.signature(id).contains(component_type),
            None => false,
        }
    }

    /// Get a component of an entity, if it is attached.
    pub fn try_get<T: Component>(&self, id: EntityID) -> Option<&T> {
        let component_type = self.registry.type_id_of::<T>()?;
        if id.index() >= self.capacity() {
            return None;
        }
        self.table.get::<T>(id.index(), component_type)
    }

    /// Get a component of an entity mutably, if it is attached.
    pub fn try_get_mut<T: Component>(&mut self, id: EntityID) -> Option<&mut T> {
        let component_type = self.registry.type_id_of::<T>()?;
        if id.index() >= self.capacity() {
            return None;
        }
        self.table.get_mut::<T>(id.index(), component_type)
    }

    /// Get a component of an entity.
    ///
    /// # Panics
    /// If the entity does not have a component of type `T`.
    pub fn get<T: Component>(&self, id: EntityID) -> &T {
        let component_type = self.expect_component_type::<T>();
        match self.table.get::<T>(id.index(), component_type) {
            Some(component) => component,
            None => panic!("entity {} has no {} component", id.index(), std::any::type_name::<T>()),
        }
    }

    /// Get a component of an entity mutably.
    ///
    /// # Panics
    /// If the entity does not have a component of type `T`.
    pub fn get_mut<T: Component>(&mut self, id: EntityID) -> &mut T {
        let component_type = self.expect_component_type::<T>();
        match self.table.get_mut::<T>(id.index(), component_type) {
            Some(component) => component,
            None => panic!("entity {} has no {} component", id.index(), std::any::type_name::<T>()),
        }
    }

    /// Return the number of dense slots in use for component `T`.
    pub fn occupied_slots<T: Component>(&self) -> Result<usize, EcsError> {
        let component_type = self.component_type::<T>()?;
        Ok(self.table.sparse_set(component_type).occupied())
    }

    /// Check every structural invariant of the table and its groups.
    ///
    /// Group signatures are only checked while the world is partitioned.
    pub fn check_invariants(&self) -> Result<(), PartitionError> {
        self.table.check()?;
        let signatures = if self.stale {
            None
        } else {
            Some(self.table.live_signatures())
        };
        self.groups.check(self.table.len(), signatures)
    }
}

#[cfg(test)]
mod test {
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    use super::*;
    use crate::component;

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    pub(crate) struct A(pub u32);
    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    pub(crate) struct B(pub u32);
    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    pub(crate) struct C(pub u32);
    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Unregistered;

    component!(A, B, C, Unregistered);

    pub(crate) fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    pub(crate) fn world(capacity: usize) -> World {
        init_logger();
        World::with_capacity::<(A, B, C)>(capacity).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let registry = ComponentRegistry::new();
        assert_eq!(World::new(registry, WorldConfig::with_capacity(0)).unwrap_err(), ConfigError::ZeroCapacity);
    }

    #[test]
    fn test_two_kind_scenario() {
        let mut world = World::with_capacity::<(A, B)>(4).unwrap();

        world.create::<(A,)>().unwrap();
        world.create::<(A, B)>().unwrap();
        world.create::<(A,)>().unwrap();
        world.create::<(B,)>().unwrap();
        world.check_invariants().unwrap();

        let with_a = world.query::<(A,)>().unwrap();
        assert_eq!(with_a.len(), 3);
        assert!(with_a.iter().all(|&id| world.has::<A>(id)));

        let with_ab = world.query::<(A, B)>().unwrap();
        assert_eq!(with_ab.len(), 1);
        assert_eq!(world.signature(with_ab[0]), world.signature_of::<(A, B)>().unwrap());

        // Destroy the first entity holding only A.
        let e0 = world.query::<(A,)>().unwrap().into_iter()
            .find(|&id| !world.has::<B>(id))
            .unwrap();
        world.destroy(e0);

        assert_eq!(world.len(), 3);
        let with_a = world.query::<(A,)>().unwrap();
        assert_eq!(with_a.len(), 2);
        assert_eq!(with_a.iter().filter(|&&id| world.has::<B>(id)).count(), 1);
        for index in 0..world.len() {
            assert!(!world.signature(EntityID::new(index)).is_empty());
        }
        world.check_invariants().unwrap();
    }

    #[test]
    fn test_create_cascades_through_groups() {
        let mut world = world(8);
        let a = world.create::<(A,)>().unwrap();
        let b = world.create::<(B,)>().unwrap();
        let c = world.create::<(C,)>().unwrap();
        *world.get_mut::<B>(b) = B(2);
        *world.get_mut::<C>(c) = C(3);
        assert_eq!((a.index(), b.index(), c.index()), (0, 1, 2));

        // Growing the first group pushes B and C along by one each.
        let a2 = world.create::<(A,)>().unwrap();
        assert_eq!(a2.index(), 1);
        assert_eq!(*world.get::<B>(EntityID::new(2)), B(2));
        assert_eq!(*world.get::<C>(EntityID::new(3)), C(3));
        assert_eq!(world.groups().iter().map(|g| g.range()).collect::<Vec<_>>(),
                   vec![0..2, 2..3, 3..4]);
        world.check_invariants().unwrap();
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut world = world(2);
        world.create::<(A,)>().unwrap();
        world.create::<(B,)>().unwrap();
        assert_eq!(world.create::<(A,)>(), Err(EcsError::CapacityExceeded { capacity: 2 }));
        assert_eq!(world.len(), 2);
        world.check_invariants().unwrap();
    }

    #[test]
    fn test_create_rejects_bad_signatures() {
        let mut world = World::with_capacity::<(A, B)>(4).unwrap();
        assert_eq!(world.create_with_signature(Signature::EMPTY), Err(EcsError::EmptySignature));
        assert_eq!(world.create_with_signature(Signature::from_bits(0b100)),
                   Err(EcsError::UnknownSignature(Signature::from_bits(0b100))));
        assert!(matches!(world.create::<(Unregistered,)>(), Err(EcsError::UnregisteredComponent(_))));
        assert!(world.is_empty());
    }

    #[test]
    fn test_destroy_last_entity() {
        let mut world = world(4);
        world.create::<(A,)>().unwrap();
        let last = world.create::<(B,)>().unwrap();
        world.destroy(last);
        assert_eq!(world.len(), 1);
        assert_eq!(world.groups().len(), 1);

        // Destroying again is a no-op.
        world.destroy(last);
        world.destroy(EntityID::new(1000));
        assert_eq!(world.len(), 1);
        world.check_invariants().unwrap();
    }

    #[test]
    fn test_destroy_keeps_components_with_their_entities() {
        let mut world = world(8);
        for i in 0..3 {
            let id = world.create::<(A,)>().unwrap();
            world.get_mut::<A>(id).0 = i;
        }
        let b = world.create::<(B,)>().unwrap();
        world.get_mut::<B>(b).0 = 77;

        world.destroy(EntityID::new(0));

        let mut values = world.query::<(A,)>().unwrap().into_iter()
            .map(|id| world.get::<A>(id).0)
            .collect::<Vec<_>>();
        values.sort();
        assert_eq!(values, vec![1, 2]);
        assert_eq!(world.query::<(B,)>().unwrap().into_iter().map(|id| world.get::<B>(id).0).collect::<Vec<_>>(), vec![77]);
        world.check_invariants().unwrap();
    }

    #[test]
    fn test_attach_is_default() {
        let mut world = world(4);
        let id = world.create::<(A,)>().unwrap();
        world.attach::<B>(id).unwrap();
        assert_eq!(*world.get::<B>(id), B::default());
        assert!(!world.is_partitioned());
        world.check_invariants().unwrap();
    }

    #[test]
    fn test_destroyed_data_does_not_leak() {
        let mut world = world(4);
        let id = world.create::<(A, B)>().unwrap();
        world.get_mut::<A>(id).0 = 5;
        world.get_mut::<B>(id).0 = 6;
        world.destroy(id);

        let id = world.create::<(A,)>().unwrap();
        assert_eq!(*world.get::<A>(id), A::default());
        assert_eq!(world.try_get::<B>(id), None);
        world.attach::<B>(id).unwrap();
        assert_eq!(*world.get::<B>(id), B::default());
    }

    #[test]
    fn test_detach_leaves_stale_mapping_unreadable() {
        let mut world = world(4);
        let id = world.create::<(A, B)>().unwrap();
        world.detach::<B>(id).unwrap();

        assert!(!world.has::<B>(id));
        assert_eq!(world.try_get::<B>(id), None);
        assert_eq!(world.occupied_slots::<B>().unwrap(), 0);

        // The mapping is stale but a fresh slot is chosen on re-attach.
        let other = world.create::<(B,)>().unwrap();
        world.get_mut::<B>(other).0 = 9;
        world.attach::<B>(id).unwrap();
        assert_eq!(*world.get::<B>(id), B::default());
        assert_eq!(*world.get::<B>(other), B(9));
    }

    #[test]
    #[should_panic]
    fn test_get_missing_component_panics() {
        let mut world = world(4);
        let id = world.create::<(A,)>().unwrap();
        world.get::<B>(id);
    }

    #[test]
    fn test_attach_detach_does_not_leak_slots() {
        let mut world = world(4);
        let id = world.create::<(A,)>().unwrap();
        world.create::<(B,)>().unwrap();

        for _ in 0..10 {
            world.attach::<B>(id).unwrap();
            world.attach::<B>(id).unwrap();
            assert_eq!(world.occupied_slots::<B>().unwrap(), 2);
            world.detach::<B>(id).unwrap();
            world.detach::<B>(id).unwrap();
            assert_eq!(world.occupied_slots::<B>().unwrap(), 1);
            world.check_invariants().unwrap();
        }
    }

    #[test]
    fn test_detach_last_component_destroys() {
        let mut world = world(4);
        let id = world.create::<(A,)>().unwrap();
        world.create::<(B,)>().unwrap();
        world.detach::<A>(id).unwrap();

        assert_eq!(world.len(), 1);
        assert_eq!(world.occupied_slots::<A>().unwrap(), 0);
        assert!(world.is_partitioned());
        world.check_invariants().unwrap();
    }

    #[test]
    fn test_clone_entity() {
        let mut world = world(8);
        let source = world.create::<(A, C)>().unwrap();
        let b = world.create::<(B,)>().unwrap();
        world.get_mut::<A>(source).0 = 4;
        world.get_mut::<C>(source).0 = 5;
        world.get_mut::<B>(b).0 = 6;

        // The B group is shuffled along to make room for the clone.
        let clone = world.clone_entity(source).unwrap();
        assert_eq!(clone.index(), 1);
        assert_eq!(world.get::<B>(EntityID::new(2)).0, 6);

        let values = world.query::<(A, C)>().unwrap().into_iter()
            .map(|id| (world.get::<A>(id).0, world.get::<C>(id).0))
            .collect::<Vec<_>>();
        assert_eq!(values, vec![(4, 5), (4, 5)]);
        assert!(world.has::<C>(clone));
        world.check_invariants().unwrap();
    }

    #[test]
    fn test_handles_detect_moves() {
        let mut world = world(4);
        let a = world.create::<(A,)>().unwrap();
        let b = world.create::<(B,)>().unwrap();
        let handle_a = world.handle(a).unwrap();
        let handle_b = world.handle(b).unwrap();

        // `b` is pushed along to make room for the second A.
        world.create::<(A,)>().unwrap();
        assert_eq!(world.resolve(handle_a), Some(a));
        assert_eq!(world.resolve(handle_b), None);
        assert_eq!(world.handle(EntityID::new(3)), None);
    }

    #[test]
    fn test_clone_while_stale() {
        let mut world = world(8);
        world.create::<(A,)>().unwrap();
        world.create::<(A, B)>().unwrap();
        let source = world.create::<(B,)>().unwrap();
        world.get_mut::<B>(source).0 = 42;
        world.attach::<A>(source).unwrap();
        world.get_mut::<A>(source).0 = 7;

        // The source now matches the earlier (A, B) group, which grows into
        // the source's slot and pushes it along.
        let clone = world.clone_entity(source).unwrap();
        assert_eq!(clone.index(), 2);
        assert_eq!((world.get::<A>(clone).0, world.get::<B>(clone).0), (7, 42));

        let copies = world.query::<(A, B)>().unwrap().into_iter()
            .filter(|&id| (world.get::<A>(id).0, world.get::<B>(id).0) == (7, 42))
            .count();
        assert_eq!(copies, 2);
        world.check_invariants().unwrap();
    }

    fn components(world: &World, id: EntityID) -> (Option<A>, Option<B>, Option<C>) {
        (world.try_get::<A>(id).copied(), world.try_get::<B>(id).copied(), world.try_get::<C>(id).copied())
    }

    #[test]
    fn test_random_churn_keeps_invariants() {
        let mut world = world(64);
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for step in 0..3000 {
            match rng.gen_range(0..12) {
                0..=4 => {
                    let signature = Signature::from_bits(rng.gen_range(1..8));
                    match world.create_with_signature(signature) {
                        Ok(id) => {
                            assert_eq!(world.signature(id), signature);
                            if let Some(a) = world.try_get_mut::<A>(id) {
                                a.0 = step;
                            }
                            if let Some(c) = world.try_get_mut::<C>(id) {
                                c.0 = step * 2;
                            }
                        }
                        Err(err) => assert_eq!(err, EcsError::CapacityExceeded { capacity: 64 }),
                    }
                }
                5..=6 if !world.is_empty() => {
                    let id = EntityID::new(rng.gen_range(0..world.len()));
                    world.destroy(id);
                }
                7..=8 if !world.is_empty() => {
                    let id = EntityID::new(rng.gen_range(0..world.len()));
                    if rng.gen() {
                        world.attach::<C>(id).unwrap();
                        world.get_mut::<C>(id).0 = step;
                    } else {
                        world.detach::<A>(id).unwrap();
                    }
                }
                9..=10 if !world.is_empty() => {
                    let id = EntityID::new(rng.gen_range(0..world.len()));
                    let expected = components(&world, id);
                    match world.clone_entity(id) {
                        Ok(clone) => assert_eq!(components(&world, clone), expected, "clone at step {}", step),
                        Err(err) => assert_eq!(err, EcsError::CapacityExceeded { capacity: 64 }),
                    }
                }
                _ => world.refactor(),
            }

            if let Err(err) = world.check_invariants() {
                panic!("invariant broken at step {}: {}", step, err);
            }

            // Queries agree with the entity signatures, partitioned or not.
            let signatures = world.table().live_signatures();
            for bits in 0..8 {
                let required = Signature::from_bits(bits);
                let expected = (0..signatures.len())
                    .filter(|&index| signatures[index].includes_all(required))
                    .map(EntityID::new)
                    .collect::<Vec<_>>();
                assert_eq!(world.query_signature(required), expected,
                           "query {:?} at step {} (partitioned: {})", required, step, world.is_partitioned());
            }
        }
    }
}
