//! Error types for the core library.

use crate::node::NodeId;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while operating on the ring.
///
/// Every variant is recoverable: the operation that produced it leaves the
/// directory exactly as it found it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Identifier does not fit the identifier space.
    #[error("node id must be in [0,{size})")]
    OutOfBounds { id: u64, size: u64 },

    /// A node with this identifier is already a member.
    #[error("node {0} exists")]
    AlreadyExists(NodeId),

    /// No node with this identifier is a member.
    #[error("node {0} does not exist")]
    NotFound(NodeId),

    /// A node was asked to join through itself.
    #[error("cannot join node {0} to itself")]
    SelfJoin(NodeId),

    /// The node was added but has neither been created nor joined.
    #[error("node {0} has not joined a ring")]
    Unlinked(NodeId),

    /// A pointer still names a node that has since been dropped.
    #[error("node {node} points to dropped node {missing}")]
    DanglingReference { node: NodeId, missing: NodeId },

    /// Routing did not converge within the hop budget.
    #[error("lookup of {target} did not converge after {hops} hops")]
    RoutingLoop { target: NodeId, hops: usize },

    /// The directory holds no nodes.
    #[error("no nodes in the ring")]
    EmptyRing,

    /// Ring exponent outside the supported range.
    #[error("ring exponent must be in [1,{max}], got {bits}")]
    InvalidBits { bits: u32, max: u32 },
}
