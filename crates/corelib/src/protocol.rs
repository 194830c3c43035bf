//! Chord routing and ring maintenance.
//!
//! The operations follow the classic Chord description: `find_successor`
//! resolves the node responsible for an identifier, `join` links a node
//! through any current member, and `stabilize`/`notify`/`fix_fingers` repair
//! pointers after the topology changes. None of them runs on a schedule; the
//! caller decides when a node stabilizes or refreshes its fingers, and the ring
//! converges only as fast as those calls are made.
//!
//! Every operation is addressed by [`NodeId`] against a [`RingDirectory`], so
//! a "remote" call is simply a lookup of another node in the same arena.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::node::{NodeId, RingNode};
use crate::ring::RingDirectory;

/// Result of routing a target through the ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    /// Node responsible for the target.
    pub owner: NodeId,
    /// Number of forwarding steps taken after the starting node.
    pub hops: usize,
    /// Nodes visited, starting node first.
    pub path: Vec<NodeId>,
}

/// What a single stabilize round changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StabilizeOutcome {
    /// Successor after the round.
    pub successor: NodeId,
    pub successor_changed: bool,
    /// True if the successor adopted this node as its predecessor.
    pub notified: bool,
}

/// Chord protocol operations over a set of nodes.
pub trait Chord {
    /// Makes `id` a one-node ring.
    fn create(&mut self, id: NodeId) -> Result<()>;

    /// Resolves the node responsible for `target`, starting at `from`.
    fn find_successor(&self, from: NodeId, target: NodeId) -> Result<NodeId> {
        self.lookup(from, target).map(|route| route.owner)
    }

    /// Same walk as [`Chord::find_successor`], keeping the visited path.
    fn lookup(&self, from: NodeId, target: NodeId) -> Result<Route>;

    /// Furthest finger of `from` that precedes `target` without reaching it,
    /// or `from` itself when no finger qualifies.
    fn closest_preceding_node(&self, from: NodeId, target: NodeId) -> Result<NodeId>;

    /// Links `id` into the ring that `introducer` belongs to. Returns the new
    /// successor.
    fn join(&mut self, id: NodeId, introducer: NodeId) -> Result<NodeId>;

    /// One stabilize round for `id`.
    fn stabilize(&mut self, id: NodeId) -> Result<StabilizeOutcome>;

    /// Tells `id` that `candidate` might be its predecessor. Returns whether
    /// the predecessor changed.
    fn notify(&mut self, id: NodeId, candidate: NodeId) -> Result<bool>;

    /// Recomputes every finger of `id`.
    fn fix_fingers(&mut self, id: NodeId) -> Result<()>;
}

impl RingDirectory {
    /// Successor of `id`, which must be linked and still a member.
    fn live_successor(&self, id: NodeId) -> Result<NodeId> {
        let successor = self.get(id)?.successor().ok_or(Error::Unlinked(id))?;
        if !self.contains(successor) {
            warn!(node = %id, missing = %successor, "successor was dropped");
            return Err(Error::DanglingReference {
                node: id,
                missing: successor,
            });
        }
        Ok(successor)
    }
}

impl Chord for RingDirectory {
    fn create(&mut self, id: NodeId) -> Result<()> {
        self.get_mut(id)?.create();
        debug!(%id, "created ring");
        Ok(())
    }

    fn lookup(&self, from: NodeId, target: NodeId) -> Result<Route> {
        let space = *self.space();
        // every hop moves strictly clockwise toward the target, so a healthy
        // walk visits each member at most once
        let budget = self.len();
        let mut path = vec![from];
        let mut current = from;

        loop {
            let successor = self.live_successor(current)?;
            if space.between_right_inclusive(current, successor, target) {
                let hops = path.len() - 1;
                debug!(%target, %from, owner = %successor, hops, "resolved");
                return Ok(Route {
                    owner: successor,
                    hops,
                    path,
                });
            }

            let mut next = self.closest_preceding_node(current, target)?;
            if next == current {
                next = successor;
            }
            if path.len() >= budget {
                return Err(Error::RoutingLoop {
                    target,
                    hops: path.len(),
                });
            }
            debug!(%target, %current, %next, "forwarding");
            path.push(next);
            current = next;
        }
    }

    fn closest_preceding_node(&self, from: NodeId, target: NodeId) -> Result<NodeId> {
        let space = self.space();
        let node = self.get(from)?;
        for candidate in node.finger().iter().rev() {
            if !space.between(from, target, candidate) {
                continue;
            }
            // dropped, or dropped and re-added without joining yet
            if self.get(candidate).is_ok_and(RingNode::is_linked) {
                return Ok(candidate);
            }
            debug!(node = %from, stale = %candidate, "skipping stale finger");
        }
        Ok(from)
    }

    fn join(&mut self, id: NodeId, introducer: NodeId) -> Result<NodeId> {
        if id == introducer {
            return Err(Error::SelfJoin(id));
        }
        self.get(id)?;
        self.get(introducer)?;

        let successor = self.find_successor(introducer, id)?;
        let node = self.get_mut(id)?;
        node.set_predecessor(None);
        node.set_successor(successor);
        info!(%id, %introducer, %successor, "joined ring");
        Ok(successor)
    }

    fn stabilize(&mut self, id: NodeId) -> Result<StabilizeOutcome> {
        let space = *self.space();
        let successor = self.live_successor(id)?;

        let mut next = successor;
        if let Some(x) = self.get(successor)?.predecessor() {
            if !self.contains(x) {
                debug!(node = %id, stale = %x, "successor's predecessor was dropped");
            } else if successor == id || space.between(id, successor, x) {
                next = x;
            }
        }

        let successor_changed = next != successor;
        if successor_changed {
            self.get_mut(id)?.set_successor(next);
            debug!(%id, old = %successor, new = %next, "successor updated");
        }
        let notified = self.notify(next, id)?;

        Ok(StabilizeOutcome {
            successor: next,
            successor_changed,
            notified,
        })
    }

    fn notify(&mut self, id: NodeId, candidate: NodeId) -> Result<bool> {
        let space = *self.space();
        if !self.contains(candidate) {
            return Err(Error::NotFound(candidate));
        }
        // a predecessor that has been dropped counts as unknown
        let current = self
            .get(id)?
            .predecessor()
            .filter(|p| self.contains(*p));

        let adopt = match current {
            None => true,
            Some(predecessor) => space.between(predecessor, id, candidate),
        };
        if adopt {
            self.get_mut(id)?.set_predecessor(Some(candidate));
            debug!(%id, ?current, new = %candidate, "predecessor updated");
        }
        Ok(adopt)
    }

    fn fix_fingers(&mut self, id: NodeId) -> Result<()> {
        let space = *self.space();
        self.live_successor(id)?;

        let entries = (0..space.bits())
            .map(|k| self.find_successor(id, space.finger_start(id, k)))
            .collect::<Result<Vec<_>>>()?;
        debug!(%id, fingers = ?entries, "fingers refreshed");
        self.get_mut(id)?.finger_mut().replace(entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(bits: u32, ids: &[u64]) -> RingDirectory {
        let mut dir = RingDirectory::new(bits).unwrap();
        for &id in ids {
            dir.add(id).unwrap();
        }
        dir
    }

    fn stabilize_all(dir: &mut RingDirectory, rounds: usize) {
        let ids = dir.list().unwrap();
        for _ in 0..rounds {
            for &id in &ids {
                dir.stabilize(id).unwrap();
            }
        }
    }

    #[test]
    fn test_single_node_resolves_everything_to_itself() {
        let dir = ring(3, &[5]);
        for t in 0..8 {
            assert_eq!(dir.find_successor(NodeId(5), NodeId(t)), Ok(NodeId(5)));
        }
    }

    #[test]
    fn test_join_through_introducer() {
        let mut dir = ring(3, &[0, 4]);
        assert_eq!(dir.join(NodeId(4), NodeId(0)), Ok(NodeId(0)));
        let node = dir.get(NodeId(4)).unwrap();
        assert_eq!(node.successor(), Some(NodeId(0)));
        assert_eq!(node.predecessor(), None);
    }

    #[test]
    fn test_join_errors() {
        let mut dir = ring(3, &[0, 4, 6]);
        assert_eq!(dir.join(NodeId(4), NodeId(4)), Err(Error::SelfJoin(NodeId(4))));
        assert_eq!(dir.join(NodeId(4), NodeId(2)), Err(Error::NotFound(NodeId(2))));
        assert_eq!(dir.join(NodeId(4), NodeId(6)), Err(Error::Unlinked(NodeId(6))));
        assert!(!dir.get(NodeId(4)).unwrap().is_linked());
    }

    #[test]
    fn test_two_node_stabilization() {
        let mut dir = ring(3, &[0, 4]);
        dir.join(NodeId(4), NodeId(0)).unwrap();

        dir.stabilize(NodeId(0)).unwrap();
        dir.stabilize(NodeId(4)).unwrap();
        let outcome = dir.stabilize(NodeId(0)).unwrap();
        assert!(outcome.successor_changed);
        assert_eq!(outcome.successor, NodeId(4));

        let zero = dir.get(NodeId(0)).unwrap();
        assert_eq!(zero.successor(), Some(NodeId(4)));
        assert_eq!(zero.predecessor(), Some(NodeId(4)));
        let four = dir.get(NodeId(4)).unwrap();
        assert_eq!(four.successor(), Some(NodeId(0)));
        assert_eq!(four.predecessor(), Some(NodeId(0)));
    }

    #[test]
    fn test_notify_keeps_closer_predecessor() {
        let mut dir = ring(4, &[8, 2, 6]);
        assert_eq!(dir.notify(NodeId(8), NodeId(2)), Ok(true));
        assert_eq!(dir.notify(NodeId(8), NodeId(6)), Ok(true));
        // 2 is further away than 6
        assert_eq!(dir.notify(NodeId(8), NodeId(2)), Ok(false));
        assert_eq!(dir.notify(NodeId(8), NodeId(6)), Ok(false));
        assert_eq!(dir.get(NodeId(8)).unwrap().predecessor(), Some(NodeId(6)));
    }

    #[test]
    fn test_closest_preceding_node_scans_from_longest_reach() {
        let mut dir = ring(3, &[0, 2, 5]);
        dir.join(NodeId(2), NodeId(0)).unwrap();
        dir.join(NodeId(5), NodeId(0)).unwrap();
        stabilize_all(&mut dir, 4);
        dir.fix_fingers(NodeId(0)).unwrap();

        // fingers of 0 target 1, 2, 4 -> 2, 2, 5
        let fingers: Vec<_> = dir.get(NodeId(0)).unwrap().finger().iter().collect();
        assert_eq!(fingers, vec![NodeId(2), NodeId(2), NodeId(5)]);
        assert_eq!(dir.closest_preceding_node(NodeId(0), NodeId(7)), Ok(NodeId(5)));
        assert_eq!(dir.closest_preceding_node(NodeId(0), NodeId(4)), Ok(NodeId(2)));
        assert_eq!(dir.closest_preceding_node(NodeId(0), NodeId(1)), Ok(NodeId(0)));
    }

    #[test]
    fn test_lookup_uses_fingers() {
        let mut dir = ring(4, &[0, 3, 7, 12]);
        for id in [3, 7, 12] {
            dir.join(NodeId(id), NodeId(0)).unwrap();
        }
        stabilize_all(&mut dir, 6);
        for id in dir.list().unwrap() {
            dir.fix_fingers(id).unwrap();
        }

        let route = dir.lookup(NodeId(0), NodeId(13)).unwrap();
        assert_eq!(route.owner, NodeId(0));
        assert_eq!(route.path, vec![NodeId(0), NodeId(12)]);
        assert_eq!(route.hops, 1);

        assert_eq!(dir.find_successor(NodeId(3), NodeId(5)), Ok(NodeId(7)));
        assert_eq!(dir.find_successor(NodeId(12), NodeId(1)), Ok(NodeId(3)));
    }

    #[test]
    fn test_fix_fingers_requires_linked_node() {
        let mut dir = ring(3, &[0, 3]);
        assert_eq!(dir.fix_fingers(NodeId(3)), Err(Error::Unlinked(NodeId(3))));
        assert_eq!(dir.stabilize(NodeId(3)), Err(Error::Unlinked(NodeId(3))));
    }

    #[test]
    fn test_dangling_successor_after_drop() {
        let mut dir = ring(3, &[0, 2, 5]);
        dir.join(NodeId(2), NodeId(0)).unwrap();
        dir.join(NodeId(5), NodeId(0)).unwrap();
        // 2 and 5 both still point at 0; dropping it strands them
        dir.remove(0).unwrap();
        assert_eq!(
            dir.stabilize(NodeId(5)),
            Err(Error::DanglingReference {
                node: NodeId(5),
                missing: NodeId(0),
            })
        );
    }

    #[test]
    fn test_stale_fingers_are_skipped() {
        let mut dir = ring(3, &[0, 2, 5]);
        dir.join(NodeId(2), NodeId(0)).unwrap();
        dir.join(NodeId(5), NodeId(0)).unwrap();
        stabilize_all(&mut dir, 4);
        dir.fix_fingers(NodeId(0)).unwrap();

        dir.remove(5).unwrap();
        // finger[2] of 0 still names 5
        assert_eq!(dir.get(NodeId(0)).unwrap().finger()[2], NodeId(5));
        assert_eq!(dir.closest_preceding_node(NodeId(0), NodeId(7)), Ok(NodeId(2)));
        assert_eq!(dir.find_successor(NodeId(0), NodeId(6)), Ok(NodeId(0)));
    }

    #[test]
    fn test_fingers_naming_readded_unlinked_node_are_skipped() {
        let mut dir = ring(3, &[0, 2, 5]);
        dir.join(NodeId(2), NodeId(0)).unwrap();
        dir.join(NodeId(5), NodeId(0)).unwrap();
        stabilize_all(&mut dir, 4);
        dir.fix_fingers(NodeId(0)).unwrap();

        dir.remove(5).unwrap();
        dir.add(5).unwrap();
        assert_eq!(dir.get(NodeId(0)).unwrap().finger()[2], NodeId(5));
        assert_eq!(dir.closest_preceding_node(NodeId(0), NodeId(7)), Ok(NodeId(2)));
        assert_eq!(dir.find_successor(NodeId(0), NodeId(7)), Ok(NodeId(0)));
    }
}
