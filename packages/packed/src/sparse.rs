//! Sparse sets mapping entity indices to dense component slots.

use bit_vec::BitVec;

/// The index from entities to the dense slots of one `ComponentPool`.
///
/// `occupied` has one bit per dense slot, set while some entity owns it.
///
/// Detaching only clears the occupancy bit: the entity's mapping is left
/// pointing at the released slot. It is only meaningful while the owning
/// entity's signature includes this component, and is overwritten by the next
/// attach.
#[derive(Clone, Debug)]
pub struct SparseSet {
    sparse: Vec<usize>,
    occupied: BitVec,
}

impl SparseSet {
    /// Create a sparse set for `capacity` entities and `capacity` dense slots.
    pub fn new(capacity: usize) -> SparseSet {
        SparseSet {
            sparse: vec![0; capacity],
            occupied: BitVec::from_elem(capacity, false),
        }
    }

    /// Return the number of entity indices (and dense slots) in this set.
    pub fn capacity(&self) -> usize {
        self.sparse.len()
    }

    /// Claim the first free dense slot for `entity` and return it.
    ///
    /// This is a linear scan of the occupancy bits. Returns `None` if every
    /// slot is taken.
    pub fn attach(&mut self, entity: usize) -> Option<usize> {
        let slot = self.occupied.iter().position(|used| !used)?;
        self.occupied.set(slot, true);
        self.sparse[entity] = slot;
        Some(slot)
    }

    /// Release the dense slot currently mapped for `entity` and return it.
    pub fn detach(&mut self, entity: usize) -> usize {
        let slot = self.sparse[entity];
        self.occupied.set(slot, false);
        slot
    }

    /// Return the dense slot mapped for `entity`.
    ///
    /// The result is stale if `entity` does not currently hold the component.
    pub fn slot(&self, entity: usize) -> usize {
        self.sparse[entity]
    }

    /// Point `entity` at a specific dense slot.
    ///
    /// Occupancy is not touched.
    pub fn set_slot(&mut self, entity: usize, slot: usize) {
        self.sparse[entity] = slot;
    }

    /// Copy the mapping of `from` onto `to`.
    pub fn relocate(&mut self, from: usize, to: usize) {
        self.sparse[to] = self.sparse[from];
    }

    /// Exchange the mappings of two entities.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.sparse.swap(a, b);
    }

    /// Returns true if a dense slot is in use.
    pub fn is_occupied(&self, slot: usize) -> bool {
        self.occupied.get(slot).unwrap_or(false)
    }

    /// Return the number of dense slots in use.
    pub fn occupied(&self) -> usize {
        self.occupied.iter().filter(|used| *used).count()
    }

    /// Mark exactly the first `n` dense slots as in use.
    pub(crate) fn occupy_prefix(&mut self, n: usize) {
        self.occupied.clear();
        for slot in 0..n {
            self.occupied.set(slot, true);
        }
    }
}
