#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod error;
mod hasher;
mod token;

use {
    crossbeam_skiplist::SkipMap,
    std::{fmt::Display, num::NonZeroUsize, sync::Arc},
    tracing::debug,
};
pub use {
    error::RingError,
    hasher::{DefaultHasher, RingHasher, Xxh3Hasher},
    token::RingToken,
};

/// Member of the hashring, i.e. a destination that can own positions on it.
///
/// The `Display` rendering is the member's identity: it seeds the member's
/// virtual-node positions, so it must stay stable for the member's lifetime
/// and be unique among members present on the same ring. Two members
/// rendering to the same identity silently merge their virtual nodes.
pub trait RingMember: Display + Clone + Send + 'static {}

impl<T> RingMember for T where T: Display + Clone + Send + 'static {}

/// Position on the ring.
pub type RingPosition = u64;

/// Configuration of a [`HashRing`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingConfig {
    /// Number of virtual nodes created per member.
    ///
    /// A factor above one places each member at multiple ring positions,
    /// smoothing load distribution at the cost of more positions to store
    /// and scan. Must stay fixed for the lifetime of a ring: positions are
    /// recomputed on removal, so changing the factor between an add and the
    /// matching remove would leave orphaned entries behind.
    pub replication_factor: NonZeroUsize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replication_factor: NonZeroUsize::MIN,
        }
    }
}

impl RingConfig {
    /// Creates a configuration with the given replication factor.
    pub fn with_replication_factor(replication_factor: NonZeroUsize) -> Self {
        Self { replication_factor }
    }
}

/// Consistent hashring.
///
/// Members are assigned `replication_factor` virtual-node positions each on
/// a `u64` ring. A key is routed to the members owning the positions that
/// follow the key's own position clockwise, wrapping past the maximum back
/// to the minimum.
///
/// The ring is cheap to clone; clones share the same underlying storage.
/// Membership changes made through one clone are visible through all others.
#[derive(Clone)]
pub struct HashRing<M: RingMember, H = DefaultHasher> {
    /// Hasher used to place virtual nodes and keys on the ring.
    hasher: H,

    /// Virtual nodes created per member.
    replication_factor: NonZeroUsize,

    /// The ring positions assigned to members (sorted in ascending order).
    positions: Arc<SkipMap<RingPosition, M>>,
}

impl<M: RingMember> Default for HashRing<M> {
    fn default() -> Self {
        Self::new(DefaultHasher::new(), RingConfig::default())
    }
}

impl<M: RingMember, H: RingHasher> HashRing<M, H> {
    /// Creates a new, empty hashring.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashring::{HashRing, RingConfig, Xxh3Hasher};
    ///
    /// let ring = HashRing::new(Xxh3Hasher::new(), RingConfig::default());
    /// ring.add("10.0.0.1:50051");
    /// ring.add("10.0.0.2:50051");
    /// assert_eq!(ring.len(), 2);
    /// ```
    pub fn new(hasher: H, config: RingConfig) -> Self {
        Self {
            hasher,
            replication_factor: config.replication_factor,
            positions: Arc::new(SkipMap::new()),
        }
    }

    /// Creates a hashring pre-seeded with the given members.
    ///
    /// Members are added in the order given, as if by repeated [`add`]
    /// calls. Useful when the full membership set is rebuilt on every
    /// membership change and swapped in atomically.
    ///
    /// [`add`]: Self::add
    pub fn with_members<I>(hasher: H, config: RingConfig, members: I) -> Self
    where
        I: IntoIterator<Item = M>,
    {
        let ring = Self::new(hasher, config);
        for member in members {
            ring.add(member);
        }
        ring
    }

    /// Adds a member to the ring.
    ///
    /// The member is placed at `replication_factor` positions, each computed
    /// from the member's identity and the virtual-node index. Re-adding a
    /// member recomputes the same positions and overwrites them, so the
    /// resulting position set is unchanged. If two virtual-node seeds hash
    /// to the same position, the later insertion owns it.
    pub fn add(&self, member: M) {
        let replicas = self.replication_factor.get();
        for i in 0..replicas {
            let pos = self.vnode_position(&member, i);
            self.positions.insert(pos, member.clone());
        }
        debug!(member = %member, replicas, "added member to ring");
    }

    /// Removes a member and all of its virtual nodes from the ring.
    ///
    /// Positions are recomputed the same way [`add`](Self::add) computed
    /// them and deleted if present. Removing a member that was never added,
    /// or removing one twice, is a no-op.
    pub fn remove(&self, member: &M) {
        let mut removed = 0;
        for i in 0..self.replication_factor.get() {
            let pos = self.vnode_position(member, i);
            if self.positions.remove(&pos).is_some() {
                removed += 1;
            }
        }
        debug!(member = %member, removed, "removed member from ring");
    }

    /// Returns the `n` members nearest to the given key, in ring order.
    ///
    /// The key is hashed to a ring position, and the walk proceeds clockwise
    /// from the first position at or after it, wrapping around to the ring
    /// minimum, until `n` positions are collected. The ascending-with-
    /// wraparound order of the result is significant: callers may pick the
    /// first entry deterministically, or uniformly at random among the `n`.
    ///
    /// The request is satisfiable when the ring holds at least `n`
    /// virtual-node *positions*, not `n` distinct members. With a
    /// replication factor above one, a single member can satisfy several of
    /// the requested slots, and the result then contains that member more
    /// than once. Callers needing distinct members must deduplicate
    /// themselves.
    ///
    /// `n == 0` is degenerate but valid, and yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::TooFewMembers`] when the ring holds fewer
    /// positions than requested.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashring::{HashRing, RingConfig, Xxh3Hasher};
    ///
    /// let ring = HashRing::new(Xxh3Hasher::new(), RingConfig::default());
    /// ring.add("a");
    /// ring.add("b");
    /// ring.add("c");
    ///
    /// let owners = ring.find_nearest_n(b"some key", 2).unwrap();
    /// assert_eq!(owners.len(), 2);
    /// ```
    pub fn find_nearest_n(
        &self,
        key: &[u8],
        n: usize,
    ) -> Result<Vec<RingToken<'_, M>>, RingError> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let available = self.positions.len();
        if available < n {
            return Err(RingError::TooFewMembers {
                requested: n,
                available,
            });
        }

        let query = self.position(key);
        let tokens = self
            .positions
            .range(query..)
            .chain(self.positions.range(0..query))
            .take(n)
            .map(Into::into)
            .collect::<Vec<RingToken<'_, M>>>();

        // Entries can vanish between the length check and the walk when a
        // concurrent caller removes a member.
        if tokens.len() < n {
            return Err(RingError::TooFewMembers {
                requested: n,
                available: tokens.len(),
            });
        }

        Ok(tokens)
    }

    /// Returns the ring position a given key hashes to.
    pub fn position(&self, key: &[u8]) -> RingPosition {
        self.hasher.position(key)
    }

    /// Returns all virtual nodes currently on the ring, in ring order.
    pub fn virtual_nodes(&self) -> Vec<RingToken<'_, M>> {
        self.positions.iter().map(Into::into).collect()
    }

    /// Returns the number of virtual-node positions on the ring.
    ///
    /// Each member accounts for `replication_factor` positions, so this is
    /// not the number of distinct members.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the ring holds no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Computes the ring position of a member's virtual node.
    ///
    /// The seed is the member identity with the vnode index appended in
    /// decimal, no separator. The same seed must be reproducible on removal.
    fn vnode_position(&self, member: &M, index: usize) -> RingPosition {
        let seed = format!("{member}{index}");
        self.hasher.position(seed.as_bytes())
    }
}
