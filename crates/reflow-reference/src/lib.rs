#![forbid(unsafe_code)]

//! Versioned lazy references and memoizing caches for reflow.
//!
//! This crate provides the change-tracking leaves of the rendering VM:
//!
//! - [`Tag`]: a comparable version stamp used purely for change detection.
//! - [`Reference`]: a lazily-evaluated value source carrying a [`Tag`].
//! - [`ConstReference`], [`ValueCell`], [`MapReference`]: the three
//!   reference shapes the VM consumes.
//! - [`ReferenceCache`]: memoizes a reference's last-seen value and tag,
//!   classifying each revalidation as [`Validation::Const`] or
//!   [`Validation::Modified`].
//!
//! # Architecture
//!
//! `ValueCell<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. There are no subscriber callbacks: consumers poll tags on
//! each revalidation tick, so a cell only has to bump its revision on
//! mutation.
//!
//! # Invariants
//!
//! 1. `is_const()` is decidable without evaluating the reference.
//! 2. Two tags from the same reference compare equal iff no mutation
//!    affecting that reference occurred between the two reads.
//! 3. A pure map over a reference propagates the inner tag unchanged, so
//!    caching is transparent through the transform.
//! 4. `ReferenceCache::revalidate` recomputes only when the tag changed.

pub mod cache;
pub mod cell;
pub mod map;
pub mod reference;
pub mod tag;

pub use cache::{ReferenceCache, Validation};
pub use cell::ValueCell;
pub use map::MapReference;
pub use reference::{ConstReference, Reference};
pub use tag::Tag;
