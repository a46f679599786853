//! Error types for ring lookups.

/// Errors that can occur when querying the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// The ring cannot supply the requested number of virtual-node
    /// positions.
    ///
    /// The count is of positions, not distinct members: with a replication
    /// factor above one, a ring can satisfy a request larger than its
    /// member count. Callers should treat this as "no route available" and
    /// apply their own fallback.
    #[error("too few members in the hashring: requested {requested}, available {available}")]
    TooFewMembers {
        /// Number of positions the lookup asked for.
        requested: usize,
        /// Number of positions the ring could supply.
        available: usize,
    },
}
