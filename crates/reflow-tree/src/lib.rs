#![forbid(unsafe_code)]

//! Render-target tree for reflow.
//!
//! An arena-based output tree with the small synchronous surface the VM
//! reconciles against: create text/raw-markup/element nodes, insert
//! before a marker, remove a delimited range, set text content, and check
//! liveness. Node handles ([`NodeId`]) are stable for the lifetime of the
//! node and usable as [`Bounds`] anchors.
//!
//! # Invariants
//!
//! 1. Mutations are applied in call order; there is no deferred batching.
//! 2. A removed node (and its whole subtree) is dead: its id stays
//!    allocated but every further use of it panics.
//! 3. Child order is explicit and deterministic.
//! 4. Serialization escapes text nodes and passes raw-markup nodes
//!    through verbatim.

pub mod cursor;
pub mod escape;
pub mod tree;
pub mod trusted;

pub use cursor::{Bounds, Cursor};
pub use escape::escape_text;
pub use tree::{NodeId, NodeKind, Tree};
pub use trusted::TrustedString;
