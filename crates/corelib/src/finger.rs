//! Finger table of a ring node.

use std::ops::Index;

use crate::node::NodeId;

/// Routing table of `m` entries.
///
/// Entry `k` approximates the successor of `(owner + 2^k) mod 2^m`. Entries
/// start out pointing at the owner and are only ever rewritten as a whole,
/// see [`Chord::fix_fingers`](crate::protocol::Chord::fix_fingers).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FingerTable {
    owner: NodeId,
    finger: Vec<NodeId>,
}

impl FingerTable {
    pub fn new(owner: NodeId, size: usize) -> Self {
        Self {
            owner,
            finger: vec![owner; size],
        }
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.finger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.finger.is_empty()
    }

    /// Entry `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.finger.get(index).copied()
    }

    /// Entries in index order, shortest reach first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.finger.iter().copied()
    }

    /// Overwrites every entry. `entries` must have the table's length.
    pub(crate) fn replace(&mut self, entries: Vec<NodeId>) {
        debug_assert_eq!(entries.len(), self.finger.len());
        self.finger = entries;
    }
}

impl Index<usize> for FingerTable {
    type Output = NodeId;

    fn index(&self, index: usize) -> &Self::Output {
        &self.finger[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_pointing_at_owner() {
        let table = FingerTable::new(NodeId(3), 4);
        assert_eq!(table.len(), 4);
        assert_eq!(table.owner(), NodeId(3));
        assert_eq!(table.get(3), Some(NodeId(3)));
        assert_eq!(table.get(4), None);
    }

    #[test]
    fn test_replace_and_reverse_scan() {
        let mut table = FingerTable::new(NodeId(0), 3);
        table.replace(vec![NodeId(1), NodeId(2), NodeId(4)]);
        assert_eq!(table[2], NodeId(4));
        let reversed: Vec<_> = table.iter().rev().collect();
        assert_eq!(reversed, vec![NodeId(4), NodeId(2), NodeId(1)]);
    }
}
