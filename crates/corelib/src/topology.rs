//! Ring topology views.
//!
//! Read-only views computed from the whole membership rather than from any
//! node's pointers. They give the ground truth the protocol converges to and
//! let callers check how far the pointers currently are from it.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::ring::RingDirectory;

/// Path obtained by following successor pointers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuccessorWalk {
    /// Visited nodes, starting node first. The start is not repeated at the end.
    pub path: Vec<NodeId>,
    /// True if the walk came back to its start.
    pub closed: bool,
}

/// Read-only view over a [`RingDirectory`].
#[derive(Copy, Clone, Debug)]
pub struct RingTopology<'a> {
    directory: &'a RingDirectory,
}

impl<'a> RingTopology<'a> {
    pub fn new(directory: &'a RingDirectory) -> Self {
        Self { directory }
    }

    /// Member responsible for `target`: the smallest identifier at or after
    /// it, wrapping to the smallest member.
    pub fn owner_of(&self, target: NodeId) -> Result<NodeId> {
        let mut ids = self.directory.nodes().map(|n| n.id());
        let first = ids.next().ok_or(Error::EmptyRing)?;
        if first >= target {
            return Ok(first);
        }
        Ok(ids.find(|id| *id >= target).unwrap_or(first))
    }

    /// Member immediately before `id` on the ring.
    pub fn predecessor_of(&self, id: NodeId) -> Result<NodeId> {
        let ids = self.directory.list()?;
        let before = ids.iter().rev().find(|other| **other < id);
        Ok(*before.or_else(|| ids.last()).ok_or(Error::EmptyRing)?)
    }

    /// Follows successor pointers from `start`.
    ///
    /// Stops on returning to `start`, on revisiting any other node, or on
    /// reaching a node that is unlinked or no longer a member.
    pub fn successor_walk(&self, start: NodeId) -> Result<SuccessorWalk> {
        self.directory.get(start)?;
        let mut path = vec![start];
        let mut seen = HashSet::from([start]);
        let mut current = start;

        loop {
            let next = match self.directory.get(current).ok().and_then(|n| n.successor()) {
                Some(next) => next,
                None => return Ok(SuccessorWalk { path, closed: false }),
            };
            if next == start {
                return Ok(SuccessorWalk { path, closed: true });
            }
            if !seen.insert(next) || !self.directory.contains(next) {
                return Ok(SuccessorWalk { path, closed: false });
            }
            path.push(next);
            current = next;
        }
    }

    /// True when every successor and predecessor matches the ground truth.
    ///
    /// This implies the successor walk from any member visits every member
    /// exactly once before closing.
    pub fn is_consistent(&self) -> bool {
        let ids: Vec<NodeId> = self.directory.nodes().map(|n| n.id()).collect();
        if ids.is_empty() {
            return false;
        }
        ids.iter().enumerate().all(|(i, id)| {
            let expected_successor = ids[(i + 1) % ids.len()];
            let expected_predecessor = ids[(i + ids.len() - 1) % ids.len()];
            self.directory.get(*id).is_ok_and(|node| {
                node.successor() == Some(expected_successor)
                    && node.predecessor() == Some(expected_predecessor)
            })
        })
    }
}
