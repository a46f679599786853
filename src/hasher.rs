use {crate::RingPosition, xxhash_rust::xxh3::xxh3_64};

/// Maps byte strings to positions on the ring.
///
/// The hasher places both virtual-node seeds and lookup keys, so it must be
/// pure and deterministic, and should distribute its input domain uniformly
/// over the full `u64` space. The ring itself is hash-function-agnostic.
pub trait RingHasher {
    /// Returns the ring position for the given key.
    fn position(&self, key: &[u8]) -> RingPosition;
}

/// A hasher backed by the XXH3 hash function.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3Hasher;

impl Xxh3Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RingHasher for Xxh3Hasher {
    fn position(&self, key: &[u8]) -> RingPosition {
        xxh3_64(key)
    }
}

/// Default hasher.
pub type DefaultHasher = Xxh3Hasher;
