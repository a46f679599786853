use {
    crate::{RingMember, RingPosition},
    crossbeam_skiplist::map::Entry,
    std::{borrow::Borrow, ops::Deref},
};

/// A virtual node on the ring: a position owned by a member.
///
/// Wrapper around `crossbeam_skiplist::map::Entry` that exposes the position
/// and the owning member as references, without cloning the member out of
/// the ring.
#[derive(Clone, Debug)]
pub struct RingToken<'a, M>(Entry<'a, RingPosition, M>);

impl<M: RingMember> RingToken<'_, M> {
    /// Returns the position of this virtual node on the ring.
    pub fn position(&self) -> RingPosition {
        *self.0.key()
    }

    /// Returns the member that owns this virtual node.
    pub fn member(&self) -> &M {
        self.0.value()
    }
}

impl<M> Deref for RingToken<'_, M> {
    type Target = M;

    fn deref(&self) -> &Self::Target {
        self.0.value()
    }
}

impl<M> AsRef<M> for RingToken<'_, M> {
    fn as_ref(&self) -> &M {
        self.0.value()
    }
}

impl<M> Borrow<M> for RingToken<'_, M> {
    fn borrow(&self) -> &M {
        self.0.value()
    }
}

impl<'a, M> From<Entry<'a, RingPosition, M>> for RingToken<'a, M> {
    fn from(entry: Entry<'a, RingPosition, M>) -> Self {
        Self(entry)
    }
}

impl<M: RingMember> PartialEq for RingToken<'_, M> {
    fn eq(&self, other: &Self) -> bool {
        self.position() == other.position()
    }
}

impl<M: RingMember> Eq for RingToken<'_, M> {}

impl<M> PartialEq<M> for RingToken<'_, M>
where
    M: RingMember + PartialEq,
{
    fn eq(&self, other: &M) -> bool {
        self.member() == other
    }
}

impl<M> PartialEq<&M> for RingToken<'_, M>
where
    M: RingMember + PartialEq,
{
    fn eq(&self, other: &&M) -> bool {
        self.member() == *other
    }
}

impl<M: RingMember> PartialOrd for RingToken<'_, M> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<M: RingMember> Ord for RingToken<'_, M> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.position().cmp(&other.position())
    }
}
