#![forbid(unsafe_code)]

//! Pure transforms over references.

use crate::reference::Reference;
use crate::tag::Tag;

/// A reference derived from another by a pure function.
///
/// The transform is assumed side-effect free and deterministic for a
/// given input, so the inner tag is propagated unchanged: if the inner
/// reference did not change, neither did the mapped value, and a cache
/// sitting on top of the map sees straight through it.
pub struct MapReference<R, F> {
    inner: R,
    map: F,
}

impl<R, F> MapReference<R, F> {
    pub fn new(inner: R, map: F) -> Self {
        Self { inner, map }
    }
}

impl<R, F, U> Reference for MapReference<R, F>
where
    R: Reference,
    F: Fn(R::Value) -> U,
{
    type Value = U;

    fn value(&self) -> U {
        (self.map)(self.inner.value())
    }

    fn tag(&self) -> Tag {
        self.inner.tag()
    }

    fn is_const(&self) -> bool {
        self.inner.is_const()
    }
}
