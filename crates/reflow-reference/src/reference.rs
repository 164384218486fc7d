#![forbid(unsafe_code)]

//! The lazy, versioned value source consumed by the VM.

use crate::tag::Tag;

/// A lazily-evaluated value source carrying a version stamp.
///
/// Two kinds exist: *constant* references (value never changes, safe to
/// read once, must never be placed on an updating list) and *variable*
/// references (value may change across revalidation ticks, always read
/// through a [`ReferenceCache`](crate::ReferenceCache)).
///
/// # Invariants
///
/// 1. `is_const()` is a static property: callers may query it before any
///    value is produced, and it never changes for a given reference.
/// 2. `tag()` does not evaluate the reference.
pub trait Reference {
    /// The value this reference produces.
    type Value;

    /// Produce the current value. May be arbitrarily expensive; callers
    /// are expected to memoize through a cache.
    fn value(&self) -> Self::Value;

    /// Current version stamp. Cheap; never triggers evaluation.
    fn tag(&self) -> Tag;

    /// Whether this reference is statically known to never change.
    fn is_const(&self) -> bool {
        false
    }
}

// References are shared through `Rc` on the VM's evaluation stack.
impl<R: Reference + ?Sized> Reference for std::rc::Rc<R> {
    type Value = R::Value;

    fn value(&self) -> Self::Value {
        (**self).value()
    }

    fn tag(&self) -> Tag {
        (**self).tag()
    }

    fn is_const(&self) -> bool {
        (**self).is_const()
    }
}

/// A reference whose value never changes.
///
/// Constant references short-circuit the update machinery: the append
/// opcode reads them once and registers nothing on the updating list.
#[derive(Debug, Clone)]
pub struct ConstReference<T> {
    value: T,
}

impl<T> ConstReference<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone> Reference for ConstReference<T> {
    type Value = T;

    fn value(&self) -> T {
        self.value.clone()
    }

    fn tag(&self) -> Tag {
        Tag::CONST
    }

    fn is_const(&self) -> bool {
        true
    }
}
