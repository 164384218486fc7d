#![forbid(unsafe_code)]

//! Host values flowing over the evaluation stack.

use std::rc::Rc;

use reflow_reference::Reference;
use reflow_tree::{NodeId, TrustedString};

/// The closed set of host values the VM renders.
///
/// `Trusted` carries the explicit safe-markup marker; `Node` adopts an
/// existing (detached) tree node by handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Trusted(TrustedString),
    Node(NodeId),
}

impl Value {
    /// Generic textual conversion used by normalization for values that
    /// are neither strings, trusted markup, nor nodes.
    #[must_use]
    pub(crate) fn stringify(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::Trusted(t) => Some(t.raw().to_string()),
            Value::Node(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<TrustedString> for Value {
    fn from(t: TrustedString) -> Self {
        Value::Trusted(t)
    }
}

/// A shared, type-erased value reference as held on the evaluation stack.
pub type DynReference = Rc<dyn Reference<Value = Value>>;

/// Erase a concrete reference for the evaluation stack.
pub fn reference<R>(reference: R) -> DynReference
where
    R: Reference<Value = Value> + 'static,
{
    Rc::new(reference)
}
