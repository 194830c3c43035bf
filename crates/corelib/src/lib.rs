//! Core library for the Chord ring simulator.
//!
//! This crate provides the routing structure of a Chord ring held entirely in
//! one process:
//! - Identifier space arithmetic and circular ordering
//! - Ring nodes and their finger tables
//! - The directory that owns every node
//! - The Chord protocol: join, routing, stabilization, finger repair
//! - Topology views used to inspect convergence

pub mod error;
pub mod finger;
pub mod node;
pub mod protocol;
pub mod ring;
pub mod topology;

pub use error::{Error, Result};
pub use finger::FingerTable;
pub use node::{NodeId, RingNode};
pub use protocol::{Chord, Route, StabilizeOutcome};
pub use ring::{IdentifierSpace, RingDirectory};
pub use topology::{RingTopology, SuccessorWalk};
