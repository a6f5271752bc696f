//! Strongly-typed handles and slot indices.

use std::fmt;

/// An opaque, externally issued 64-bit handle.
///
/// Nothing is assumed about its structure beyond equality; the origin and
/// uniqueness of handles are the caller's responsibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for Handle {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Dense index of a record inside a [`Pool`](crate::Pool).
///
/// Stable across pool growth; reused after the slot is freed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(pub u32);

impl SlotIndex {
    /// The index as a `usize`, for addressing storage.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SlotIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<SlotIndex> for u32 {
    fn from(v: SlotIndex) -> Self {
        v.0
    }
}
