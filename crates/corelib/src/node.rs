//! Ring participants.
//!
//! Nodes never hold references to each other. Successor, predecessor and
//! finger entries are plain [`NodeId`]s resolved through the
//! [`RingDirectory`](crate::ring::RingDirectory) that owns every node.

use std::fmt;

use crate::finger::FingerTable;

/// Identifier of a node on the ring.
///
/// Newtype over `u64` so it stays `Copy` and cheap to compare. Values are
/// always inside the directory's [`IdentifierSpace`](crate::ring::IdentifierSpace).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NodeId> for u64 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// One participant of the ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingNode {
    id: NodeId,
    /// `None` until the node is created or joined.
    successor: Option<NodeId>,
    predecessor: Option<NodeId>,
    finger: FingerTable,
}

impl RingNode {
    /// Allocates an unlinked node with a finger table of `bits` entries.
    pub fn new(id: NodeId, bits: u32) -> Self {
        Self {
            id,
            successor: None,
            predecessor: None,
            finger: FingerTable::new(id, bits as usize),
        }
    }

    /// Turns this node into a one-node ring.
    pub fn create(&mut self) {
        self.successor = Some(self.id);
        self.predecessor = None;
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn successor(&self) -> Option<NodeId> {
        self.successor
    }

    #[inline]
    pub fn predecessor(&self) -> Option<NodeId> {
        self.predecessor
    }

    #[inline]
    pub fn finger(&self) -> &FingerTable {
        &self.finger
    }

    /// True once the node has a successor.
    pub fn is_linked(&self) -> bool {
        self.successor.is_some()
    }

    pub(crate) fn set_successor(&mut self, successor: NodeId) {
        self.successor = Some(successor);
    }

    pub(crate) fn set_predecessor(&mut self, predecessor: Option<NodeId>) {
        self.predecessor = predecessor;
    }

    pub(crate) fn finger_mut(&mut self) -> &mut FingerTable {
        &mut self.finger
    }
}
