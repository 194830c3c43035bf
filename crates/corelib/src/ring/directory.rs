//! Directory of ring members.
//!
//! The directory is the arena every [`RingNode`] lives in. It owns node
//! lifetime: nodes are allocated by [`RingDirectory::add`] and destroyed by
//! [`RingDirectory::remove`] or when the directory itself is dropped. Pointers
//! between nodes are identifiers looked up here, so removing a node can never
//! leave a dangling reference in memory, only a stale identifier.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::node::{NodeId, RingNode};
use crate::ring::space::IdentifierSpace;

/// Mapping from identifier to node, ordered by identifier.
#[derive(Clone, Debug)]
pub struct RingDirectory {
    space: IdentifierSpace,
    nodes: BTreeMap<NodeId, RingNode>,
}

impl RingDirectory {
    /// Creates an empty directory over a ring of `2^bits` identifiers.
    pub fn new(bits: u32) -> Result<Self> {
        Ok(Self::with_space(IdentifierSpace::new(bits)?))
    }

    pub fn with_space(space: IdentifierSpace) -> Self {
        Self {
            space,
            nodes: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn space(&self) -> &IdentifierSpace {
        &self.space
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Validates a raw identifier and checks that it names a member.
    pub fn resolve(&self, raw: u64) -> Result<NodeId> {
        let id = self.space.check(raw)?;
        if self.contains(id) {
            Ok(id)
        } else {
            Err(Error::NotFound(id))
        }
    }

    pub fn get(&self, id: NodeId) -> Result<&RingNode> {
        self.nodes.get(&id).ok_or(Error::NotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut RingNode> {
        self.nodes.get_mut(&id).ok_or(Error::NotFound(id))
    }

    /// Adds a node.
    ///
    /// The first node of an empty directory bootstraps a one-node ring. Any
    /// later node stays unlinked until it is explicitly joined.
    pub fn add(&mut self, raw: u64) -> Result<NodeId> {
        let id = self.space.check(raw)?;
        if self.contains(id) {
            return Err(Error::AlreadyExists(id));
        }

        let mut node = RingNode::new(id, self.space.bits());
        if self.nodes.is_empty() {
            node.create();
            info!(%id, "bootstrapped new ring");
        } else {
            info!(%id, members = self.nodes.len(), "added unlinked node");
        }
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Removes a node and relinks its neighbours around it.
    ///
    /// The successor's predecessor becomes the removed node's predecessor and,
    /// when a predecessor is known, its successor becomes the removed node's
    /// successor. Finger tables elsewhere are left stale.
    pub fn remove(&mut self, raw: u64) -> Result<RingNode> {
        let id = self.resolve(raw)?;
        let node = self.nodes.remove(&id).ok_or(Error::NotFound(id))?;

        if let Some(successor) = node.successor().filter(|s| *s != id) {
            match self.nodes.get_mut(&successor) {
                Some(succ) => {
                    let predecessor = node.predecessor().filter(|p| *p != id);
                    succ.set_predecessor(predecessor);
                    debug!(%id, %successor, ?predecessor, "relinked successor");
                }
                None => debug!(%id, %successor, "successor already gone"),
            }

            if let Some(predecessor) = node.predecessor().filter(|p| *p != id) {
                if let Some(pred) = self.nodes.get_mut(&predecessor) {
                    pred.set_successor(successor);
                    debug!(%id, %predecessor, %successor, "relinked predecessor");
                }
            }
        }

        info!(%id, members = self.nodes.len(), "dropped node");
        Ok(node)
    }

    /// All member identifiers in ascending order.
    pub fn list(&self) -> Result<Vec<NodeId>> {
        if self.nodes.is_empty() {
            return Err(Error::EmptyRing);
        }
        Ok(self.nodes.keys().copied().collect())
    }

    /// Looks up a node for inspection.
    pub fn show(&self, raw: u64) -> Result<&RingNode> {
        let id = self.resolve(raw)?;
        self.get(id)
    }

    /// Members in ascending identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &RingNode> + '_ {
        self.nodes.values()
    }

    /// Releases every node, returning how many were held.
    pub fn clear(&mut self) -> usize {
        let released = self.nodes.len();
        self.nodes.clear();
        released
    }
}
