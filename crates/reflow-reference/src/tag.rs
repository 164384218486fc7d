#![forbid(unsafe_code)]

//! Version stamps for change detection.

/// A comparable version stamp attached to a [`Reference`](crate::Reference).
///
/// Tags are compared for equality only, never ordered: two tags taken from
/// the same reference are equal iff no mutation affecting that reference
/// occurred between the two reads.
///
/// # Invariants
///
/// 1. A mutated cell never hands out a tag equal to one taken before the
///    mutation.
/// 2. [`Tag::CONST`] is reserved for references that can never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(u64);

impl Tag {
    /// Tag of a reference that never changes.
    pub const CONST: Tag = Tag(0);

    /// First revision of a mutable source.
    pub(crate) const INITIAL: Tag = Tag(1);

    /// The tag after one more mutation of the same source.
    #[must_use]
    pub(crate) fn bumped(self) -> Tag {
        Tag(self.0 + 1)
    }

    /// Raw revision number, exposed for diagnostics only.
    #[must_use]
    pub fn revision(self) -> u64 {
        self.0
    }
}
