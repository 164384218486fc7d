#![forbid(unsafe_code)]

//! Memoizing cache over a reference.

use crate::reference::Reference;
use crate::tag::Tag;

/// Result of one cache revalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T> {
    /// The stored value is still valid; nothing was recomputed.
    Const,
    /// The reference changed; the fresh value is carried here and is also
    /// the new stored value.
    Modified(T),
}

impl<T> Validation<T> {
    #[must_use]
    pub fn is_modified(&self) -> bool {
        matches!(self, Validation::Modified(_))
    }
}

/// Memoizes a reference's last-seen value and tag.
///
/// Created at first-pass evaluation time; destroyed when its owning
/// update opcode is torn down.
///
/// # Invariants
///
/// 1. After the initial read, `peek` never recomputes.
/// 2. `revalidate` recomputes exactly when the reference's tag differs
///    from the stored tag.
/// 3. The stored (tag, value) pair always comes from a single read.
///
/// # Failure Modes
///
/// Calling [`revalidate`](ReferenceCache::revalidate) before any read is
/// a programmer error and panics; there is no stale value to classify
/// against.
pub struct ReferenceCache<R: Reference> {
    reference: R,
    state: Option<(Tag, R::Value)>,
}

impl<R: Reference> ReferenceCache<R>
where
    R::Value: Clone,
{
    pub fn new(reference: R) -> Self {
        Self {
            reference,
            state: None,
        }
    }

    /// Tag captured at the last read, if any read happened yet.
    ///
    /// A generic "has anything changed" scan compares this against the
    /// reference's current tag without knowing cache internals.
    #[must_use]
    pub fn tag(&self) -> Option<Tag> {
        self.state.as_ref().map(|(tag, _)| *tag)
    }

    /// Last computed value, if any read happened yet. No side effects;
    /// used for diagnostics snapshots.
    #[must_use]
    pub fn last(&self) -> Option<&R::Value> {
        self.state.as_ref().map(|(_, value)| value)
    }

    /// Return the last computed value, performing the initial read on the
    /// first call. Never recomputes afterwards.
    pub fn peek(&mut self) -> R::Value {
        match &self.state {
            Some((_, value)) => value.clone(),
            None => self.initialize(),
        }
    }

    /// Re-check the reference's tag; recompute only on change.
    ///
    /// # Panics
    ///
    /// Panics if called before any read ([`peek`](ReferenceCache::peek)
    /// performs the initial one).
    pub fn revalidate(&mut self) -> Validation<R::Value> {
        let Some((stored, _)) = &self.state else {
            panic!("ReferenceCache::revalidate called before initial read");
        };
        if *stored == self.reference.tag() {
            return Validation::Const;
        }
        let value = self.initialize();
        #[cfg(feature = "tracing")]
        tracing::trace!("reference cache recomputed");
        Validation::Modified(value)
    }

    fn initialize(&mut self) -> R::Value {
        let tag = self.reference.tag();
        let value = self.reference.value();
        self.state = Some((tag, value.clone()));
        value
    }
}
