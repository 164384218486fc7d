#![forbid(unsafe_code)]

//! Normalization of host values into insertable shapes.

use reflow_tree::NodeId;

use crate::value::Value;

/// The closed set of shapes that can be materialized into the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Insertion {
    /// Nothing to show; rendered as an empty text node so the position
    /// stays occupied and updatable.
    Empty,
    /// Plain text, escaped on serialization.
    Text(String),
    /// Raw markup, serialized verbatim.
    TrustedMarkup(String),
    /// An existing detached node, moved into the tree (not copied).
    Node(NodeId),
}

impl Insertion {
    /// Textual form for diagnostics snapshots.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Insertion::Empty => String::new(),
            Insertion::Text(s) | Insertion::TrustedMarkup(s) => s.clone(),
            Insertion::Node(id) => format!("{id:?}"),
        }
    }
}

/// Escaping normalization: everything textual becomes [`Insertion::Text`]
/// unless the value was already marked safe.
///
/// Total: every [`Value`] maps to exactly one variant, never fails.
#[must_use]
pub fn normalize_cautious(value: &Value) -> Insertion {
    match value {
        Value::Null => Insertion::Empty,
        Value::Str(s) => Insertion::Text(s.clone()),
        Value::Trusted(t) => Insertion::TrustedMarkup(t.raw().to_string()),
        Value::Node(id) => Insertion::Node(*id),
        other => match other.stringify() {
            Some(text) => Insertion::Text(text),
            None => Insertion::Empty,
        },
    }
}

/// Non-escaping normalization: identical to [`normalize_cautious`] except
/// that a bare string passes through as raw markup.
///
/// This is the only behavioral delta between the two modes and it is a
/// deliberate trust boundary: callers choosing this path assert the
/// string is already sanitized.
#[must_use]
pub fn normalize_trusting(value: &Value) -> Insertion {
    match value {
        Value::Str(s) => Insertion::TrustedMarkup(s.clone()),
        other => normalize_cautious(other),
    }
}

/// Which normalization a dynamic-content opcode uses.
///
/// The cautious/trusting opcode hierarchies collapse into this closed
/// variant; no other opcode-level behavior differs between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trust {
    Cautious,
    Trusting,
}

impl Trust {
    /// Apply this mode's normalization function.
    #[must_use]
    pub fn normalize(self, value: &Value) -> Insertion {
        match self {
            Trust::Cautious => normalize_cautious(value),
            Trust::Trusting => normalize_trusting(value),
        }
    }

    /// Type tag used in diagnostics snapshots.
    #[must_use]
    pub fn opcode_name(self) -> &'static str {
        match self {
            Trust::Cautious => "update-cautious",
            Trust::Trusting => "update-trusting",
        }
    }
}
