//! Finding entities by the components they hold.

use std::ops::Range;

use crate::entity::EntityID;
use crate::error::EcsError;
use crate::signature::{ComponentSet, Signature};
use super::World;

enum QueryState {
    /// Walking whole groups, yielding every index of each matching one.
    Groups { next: usize, current: Range<usize> },
    /// Testing the live entities one by one.
    Scan { next: usize },
}

/// An iterator over every entity holding at least a given set of components.
///
/// While the world is partitioned this visits whole groups, skipping any
/// whose signature is too small to hold the query. Otherwise it falls back to
/// checking each live entity.
pub struct QueryIter<'a> {
    world: &'a World,
    required: Signature,
    state: QueryState,
}

impl<'a> QueryIter<'a> {
    fn new(world: &'a World, required: Signature) -> QueryIter<'a> {
        let state = if world.is_partitioned() {
            QueryState::Groups { next: 0, current: 0..0 }
        } else {
            QueryState::Scan { next: 0 }
        };

        QueryIter { world, required, state }
    }

    /// Return the signature being matched.
    pub fn required(&self) -> Signature {
        self.required
    }
}

impl<'a> Iterator for QueryIter<'a> {
    type Item = EntityID;

    fn next(&mut self) -> Option<EntityID> {
        match &mut self.state {
            QueryState::Groups { next, current } => loop {
                if let Some(index) = current.next() {
                    return Some(EntityID::new(index));
                }

                let group = self.world.groups.get(*next)?;
                *next += 1;

                let signature = group.signature();
                if signature.len() >= self.required.len() && signature.includes_all(self.required) {
                    *current = group.range();
                }
            },
            QueryState::Scan { next } => {
                let signatures = self.world.table.live_signatures();
                while *next < signatures.len() {
                    let index = *next;
                    *next += 1;
                    if signatures[index].includes_all(self.required) {
                        return Some(EntityID::new(index));
                    }
                }
                None
            }
        }
    }
}

impl World {
    /// Iterate over every entity whose signature includes `required`.
    ///
    /// An empty signature matches every live entity.
    pub fn iter_signature(&self, required: Signature) -> QueryIter<'_> {
        QueryIter::new(self, required)
    }

    /// Collect every entity whose signature includes `required`.
    pub fn query_signature(&self, required: Signature) -> Vec<EntityID> {
        self.iter_signature(required).collect()
    }

    /// Collect every entity holding all of the component types in `S`.
    pub fn query<S: ComponentSet>(&self) -> Result<Vec<EntityID>, EcsError> {
        let required = S::signature(&self.registry)?;
        Ok(self.query_signature(required))
    }
}
