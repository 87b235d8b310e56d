//! Rebuilding the group layout from the signatures of the live entities.

use log::debug;

use crate::component::ComponentTypeID;
use crate::group::EntityGroup;
use crate::signature::Signature;
use super::World;

/// The live entities sharing one signature, gathered during a refactor.
#[derive(Debug, Clone)]
struct SortingGroup {
    signature: Signature,
    members: Vec<usize>,
}

/// Bucket entity indices by signature, keeping buckets in order of first
/// appearance and members in index order.
fn sorting_groups(signatures: &[Signature]) -> Vec<SortingGroup> {
    let mut groups: Vec<SortingGroup> = Vec::new();
    for (index, &signature) in signatures.iter().enumerate() {
        match groups.iter_mut().find(|g| g.signature == signature) {
            Some(group) => group.members.push(index),
            None => groups.push(SortingGroup {
                signature,
                members: vec![index],
            }),
        }
    }
    groups
}

impl World {
    /// Regroup every live entity by its current signature.
    ///
    /// Groups are laid out largest first; ties keep the order in which the
    /// signatures first appear in the table. This repairs the partition after
    /// `attach` or `detach`, and running it twice in a row changes nothing.
    ///
    /// Entities may move, so indices held from before this call should be
    /// considered invalid.
    pub fn refactor(&mut self) {
        let live = self.table.len();
        let mut sorting = sorting_groups(self.table.live_signatures());
        sorting.sort_by(|a, b| b.members.len().cmp(&a.members.len()));

        // (sorting group, member) currently sitting at each index.
        let mut owner = vec![(0, 0); live];
        for (s, group) in sorting.iter().enumerate() {
            for (m, &index) in group.members.iter().enumerate() {
                owner[index] = (s, m);
            }
        }

        self.groups.clear();
        let mut cursor = 0;
        for s in 0..sorting.len() {
            let start = cursor;
            for m in 0..sorting[s].members.len() {
                let index = sorting[s].members[m];
                if index != cursor {
                    self.table.swap(index, cursor);

                    let (os, om) = owner[cursor];
                    sorting[os].members[om] = index;
                    owner[index] = (os, om);
                    sorting[s].members[m] = cursor;
                    owner[cursor] = (s, m);
                }
                cursor += 1;
            }

            self.groups.push_group(EntityGroup::new(start, cursor - start, sorting[s].signature));
        }

        self.stale = false;
        debug!("refactored {} entities into {} groups", live, self.groups.len());

        if self.config.pack_on_refactor {
            self.pack_components();
        }
    }

    /// Reorder every component pool so the n-th holder in table order owns
    /// dense slot n.
    pub fn pack_components(&mut self) {
        for ty in 0..self.registry.len() {
            self.table.pack(ComponentTypeID::new(ty));
        }
        debug!("packed {} component pools", self.registry.len());
    }

    /// Refactor the groups and pack the component pools.
    pub fn defragment(&mut self) {
        self.refactor();
        if !self.config.pack_on_refactor {
            self.pack_components();
        }
    }
}
