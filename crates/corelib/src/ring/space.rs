//! Identifier space of the ring.
//!
//! All identifiers live in `[0, 2^m)` and every piece of arithmetic on them is
//! taken modulo `2^m`. The circular interval predicates defined here are the
//! only place where wraparound is handled; routing code never compares
//! identifiers numerically.

use crate::error::{Error, Result};
use crate::node::NodeId;

/// Largest supported ring exponent. Keeps `id + 2^(m-1)` inside `u64`.
pub const MAX_BITS: u32 = 63;

/// The modulo-`2^m` identifier circle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IdentifierSpace {
    bits: u32,
    mask: u64,
}

impl IdentifierSpace {
    /// Creates the space for exponent `bits`.
    pub fn new(bits: u32) -> Result<Self> {
        if bits == 0 || bits > MAX_BITS {
            return Err(Error::InvalidBits {
                bits,
                max: MAX_BITS,
            });
        }
        Ok(Self {
            bits,
            mask: (1u64 << bits) - 1,
        })
    }

    /// The exponent `m`. Also the length of every finger table.
    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Number of identifiers on the ring, `2^m`.
    #[inline]
    pub fn size(&self) -> u64 {
        self.mask + 1
    }

    #[inline]
    pub fn contains(&self, id: u64) -> bool {
        id <= self.mask
    }

    /// Validates a raw identifier.
    pub fn check(&self, id: u64) -> Result<NodeId> {
        if self.contains(id) {
            Ok(NodeId(id))
        } else {
            Err(Error::OutOfBounds {
                id,
                size: self.size(),
            })
        }
    }

    /// `(id + offset) mod 2^m`.
    #[inline]
    pub fn add(&self, id: NodeId, offset: u64) -> NodeId {
        NodeId(id.0.wrapping_add(offset) & self.mask)
    }

    /// Start of finger `k`: `(id + 2^k) mod 2^m`, for `k` in `0..m`.
    pub fn finger_start(&self, id: NodeId, k: u32) -> NodeId {
        debug_assert!(k < self.bits);
        self.add(id, 1u64 << k)
    }

    /// Clockwise distance from `from` to `to`.
    #[inline]
    pub fn distance(&self, from: NodeId, to: NodeId) -> u64 {
        to.0.wrapping_sub(from.0) & self.mask
    }

    /// True if `x` lies strictly inside the clockwise interval `(a, b)`.
    ///
    /// When `a == b` the interval covers the whole ring except `a` itself.
    pub fn between(&self, a: NodeId, b: NodeId, x: NodeId) -> bool {
        if a < b {
            a < x && x < b
        } else {
            // wraps past zero (or a == b)
            x > a || x < b
        }
    }

    /// True if `x` lies in the half-open clockwise interval `(a, b]`.
    ///
    /// When `a == b` the interval is the whole ring.
    pub fn between_right_inclusive(&self, a: NodeId, b: NodeId, x: NodeId) -> bool {
        a == b || x == b || self.between(a, b, x)
    }
}
