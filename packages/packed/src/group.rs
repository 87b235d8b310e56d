//! Entity groups: contiguous runs of entities which share a signature.

use std::ops::Range;

use crate::error::PartitionError;
use crate::signature::Signature;

/// A contiguous run of entities in the table which share one signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityGroup {
    start: usize,
    len: usize,
    signature: Signature,
}

impl EntityGroup {
    /// Create a new group.
    pub fn new(start: usize, len: usize, signature: Signature) -> EntityGroup {
        EntityGroup { start, len, signature }
    }

    /// Return the index of the first entity in this group.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Return the index one past the last entity in this group.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Return the number of entities in this group.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if this group holds no entities.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return the signature shared by all entities in this group.
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Return the range of entity indices covered by this group.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Returns true if the entity index falls inside this group.
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end()
    }
}

/// The ordered list of groups covering the live entities of a table.
///
/// Groups are sorted by start index, never overlap and leave no gaps: together
/// they cover exactly `0..len` where `len` is the number of live entities.
#[derive(Clone, Debug, Default)]
pub struct GroupPartition {
    groups: Vec<EntityGroup>,
}

impl GroupPartition {
    /// Create an empty partition.
    pub fn new() -> GroupPartition {
        GroupPartition {
            groups: Vec::new(),
        }
    }

    /// Return the groups in index order.
    pub fn groups(&self) -> &[EntityGroup] {
        &self.groups
    }

    /// Return the number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Return the total number of entities covered.
    pub fn end(&self) -> usize {
        self.groups.last().map_or(0, EntityGroup::end)
    }

    /// Find the group tagged with exactly this signature.
    pub fn find(&self, signature: Signature) -> Option<usize> {
        self.groups.iter().position(|g| g.signature == signature)
    }

    /// Find the group containing an entity index.
    pub fn index_of(&self, index: usize) -> Option<usize> {
        let idx = match self.groups.binary_search_by_key(&index, |g| g.start) {
            Ok(idx) => idx,
            Err(0) => return None,
            Err(idx) => idx - 1,
        };

        if self.groups[idx].contains(index) {
            Some(idx)
        } else {
            None
        }
    }

    /// Return the group at a position in the partition.
    pub fn get(&self, group: usize) -> Option<&EntityGroup> {
        self.groups.get(group)
    }

    /// Append an empty group after the last one and return its position.
    pub(crate) fn push(&mut self, signature: Signature) -> usize {
        let start = self.end();
        self.groups.push(EntityGroup::new(start, 0, signature));
        self.groups.len() - 1
    }

    /// Append a group with the given extent.
    pub(crate) fn push_group(&mut self, group: EntityGroup) {
        debug_assert_eq!(group.start, self.end());
        self.groups.push(group);
    }

    pub(crate) fn clear(&mut self) {
        self.groups.clear();
    }

    pub(crate) fn remove(&mut self, group: usize) -> EntityGroup {
        self.groups.remove(group)
    }

    /// Add one entity to the end of a group.
    pub(crate) fn grow(&mut self, group: usize) {
        self.groups[group].len += 1;
    }

    /// Remove one entity from the end of a group.
    pub(crate) fn shrink(&mut self, group: usize) {
        self.groups[group].len -= 1;
    }

    /// Shift a group one slot towards the end, keeping its length.
    pub(crate) fn shift_up(&mut self, group: usize) {
        self.groups[group].start += 1;
    }

    /// Shift a group one slot towards the front, keeping its length.
    pub(crate) fn shift_down(&mut self, group: usize) {
        self.groups[group].start -= 1;
    }

    /// Check the groups tile `0..live` with non-empty runs.
    ///
    /// If `signatures` is given, also check that every entity matches the tag of
    /// the group it falls in and that no two groups share a tag.
    pub fn check(&self, live: usize, signatures: Option<&[Signature]>) -> Result<(), PartitionError> {
        let mut expected = 0;
        for (group, g) in self.groups.iter().enumerate() {
            if g.start != expected {
                return Err(PartitionError::Gap { group, start: g.start, expected });
            }
            if g.is_empty() {
                return Err(PartitionError::EmptyGroup { group });
            }
            expected = g.end();
        }

        if expected != live {
            return Err(PartitionError::Coverage { covered: expected, live });
        }

        if let Some(signatures) = signatures {
            for (first, a) in self.groups.iter().enumerate() {
                if let Some(offset) = self.groups[first + 1..].iter().position(|b| b.signature == a.signature) {
                    return Err(PartitionError::DuplicateSignature {
                        first,
                        second: first + 1 + offset,
                        signature: a.signature,
                    });
                }

                for index in a.range() {
                    if signatures[index] != a.signature {
                        return Err(PartitionError::ForeignSignature {
                            index,
                            expected: a.signature,
                            found: signatures[index],
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
