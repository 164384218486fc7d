#![forbid(unsafe_code)]

//! Reflow public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use reflow_reference as reference;
    pub use reflow_tree as tree;
    pub use reflow_vm as vm;
}
