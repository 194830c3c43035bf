//! The ring: identifier arithmetic and the directory of members.
//!
//! [`IdentifierSpace`] handles modulo-`2^m` arithmetic and circular ordering.
//! [`RingDirectory`] owns the nodes and is what the
//! [`Chord`](crate::protocol::Chord) operations run against.

pub mod directory;
pub mod space;

pub use directory::RingDirectory;
pub use space::{IdentifierSpace, MAX_BITS};
