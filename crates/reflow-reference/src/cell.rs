#![forbid(unsafe_code)]

//! Mutable root references.

use std::cell::RefCell;
use std::rc::Rc;

use crate::reference::Reference;
use crate::tag::Tag;

struct CellInner<T> {
    value: T,
    tag: Tag,
}

/// A shared, version-tracked mutable value — the root of every variable
/// reference chain.
///
/// Cloning a `ValueCell` creates a new handle to the **same** inner state.
///
/// # Invariants
///
/// 1. The tag changes exactly when a [`set`](ValueCell::set) stores a
///    value that differs from the current one.
/// 2. Setting a value equal to the current value is a no-op (no tag bump).
pub struct ValueCell<T> {
    inner: Rc<RefCell<CellInner<T>>>,
}

impl<T> Clone for ValueCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ValueCell")
            .field("value", &inner.value)
            .field("tag", &inner.tag)
            .finish()
    }
}

impl<T: Clone + PartialEq> ValueCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CellInner {
                value,
                tag: Tag::INITIAL,
            })),
        }
    }

    /// Replace the stored value, bumping the tag if it actually changed.
    pub fn set(&self, value: T) {
        let mut inner = self.inner.borrow_mut();
        if inner.value == value {
            return;
        }
        inner.value = value;
        inner.tag = inner.tag.bumped();
        #[cfg(feature = "tracing")]
        tracing::trace!(revision = inner.tag.revision(), "value cell mutated");
    }

    /// Read the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }
}

impl<T: Clone> Reference for ValueCell<T> {
    type Value = T;

    fn value(&self) -> T {
        self.inner.borrow().value.clone()
    }

    fn tag(&self) -> Tag {
        self.inner.borrow().tag
    }
}
