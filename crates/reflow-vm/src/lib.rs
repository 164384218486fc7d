#![forbid(unsafe_code)]

//! Dual-pass reactive rendering virtual machine.
//!
//! The first pass executes a linear [`Program`] of opcodes, materializing
//! value references into a [`Tree`](reflow_tree::Tree). Every
//! non-constant reference leaves behind an [`UpdateOpcode`] on the
//! updating list owned by the resulting [`RenderResult`]. A later
//! revalidation tick ([`RenderResult::revalidate`]) walks that list in
//! registration order and applies the minimal mutation needed to bring
//! the tree back in sync — nothing is ever re-derived from scratch.
//!
//! # Invariants
//!
//! 1. First-pass opcodes execute in strict program order; each one's
//!    output lands immediately after the previous one's bounds.
//! 2. Updating opcodes fire in registration order, which is document
//!    order, so sibling mutations never reorder relative to each other.
//! 3. Constant references are read once and never registered on the
//!    updating list.
//! 4. An update opcode's `Upsert` and its `Bounds` are swapped as one
//!    unit on the teardown+reinsert path; a mismatched pair is
//!    unrepresentable.

pub mod insertion;
pub mod opcode;
pub mod upsert;
pub mod value;
pub mod vm;

pub use insertion::{Insertion, Trust, normalize_cautious, normalize_trusting};
pub use opcode::{Op, OpcodeSnapshot, Program, UpdateOpcode};
pub use upsert::Upsert;
pub use value::{DynReference, Value, reference};
pub use vm::{RenderResult, VmError, render};
