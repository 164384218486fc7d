#![forbid(unsafe_code)]

//! First-pass and updating opcodes.

use std::rc::Rc;

use reflow_reference::{MapReference, Reference as _, ReferenceCache, Tag, Validation};
use reflow_tree::{Bounds, Tree};

use crate::insertion::{Insertion, Trust};
use crate::upsert::Upsert;
use crate::value::{DynReference, Value};
use crate::vm::{Vm, VmError};

/// A compiled opcode sequence. Cheap to clone and share between frames.
#[derive(Clone)]
pub struct Program {
    ops: Rc<[Op]>,
}

impl Program {
    #[must_use]
    pub fn new(ops: Vec<Op>) -> Self {
        Self { ops: ops.into() }
    }

    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }
}

/// One first-pass opcode.
#[derive(Clone)]
pub enum Op {
    /// Push a value reference onto the evaluation stack.
    Push(DynReference),
    /// Push the current frame's local at `index`.
    Local(usize),
    /// Append constant text. Never registers an updating opcode.
    Text(String),
    /// Open an element and move the cursor inside it.
    OpenElement(String),
    /// Close the innermost open element.
    CloseElement,
    /// Pop a reference, normalize it, materialize it, and register an
    /// updating counterpart unless the reference is constant.
    AppendDynamic(Trust),
    /// Pop `args` references into a fresh frame's locals and execute the
    /// nested program, sharing the evaluation stack and output cursor.
    Invoke { program: Program, args: usize },
}

/// The normalized view of a popped reference: the trust mode's pure
/// transform layered over the original, tag passed through unchanged.
type NormalizedReference = MapReference<DynReference, Box<dyn Fn(Value) -> Insertion>>;

fn normalized(reference: DynReference, trust: Trust) -> NormalizedReference {
    MapReference::new(reference, Box::new(move |value| trust.normalize(&value)))
}

/// The first-pass dynamic-content opcode (`Op::AppendDynamic` body).
pub(crate) struct AppendDynamicOpcode {
    pub(crate) trust: Trust,
}

impl AppendDynamicOpcode {
    pub(crate) fn evaluate(&self, vm: &mut Vm, tree: &mut Tree) -> Result<(), VmError> {
        let reference = vm.pop()?;
        let cursor = vm.elements();

        if reference.is_const() {
            // Constant short-circuit: read once, render, register nothing.
            let insertion = self.trust.normalize(&reference.value());
            let _ = Upsert::insert(tree, cursor, insertion);
            return Ok(());
        }

        let mut cache = ReferenceCache::new(normalized(reference, self.trust));
        // peek() performs the initial read implicitly.
        let insertion = cache.peek();
        let upsert = Upsert::insert(tree, cursor, insertion);
        vm.update_with(UpdateOpcode::new(self.trust, cache, upsert));
        Ok(())
    }
}

/// A node in the second-pass list: revalidates its private cache each
/// tick and applies the minimal mutation to its region.
pub struct UpdateOpcode {
    trust: Trust,
    cache: ReferenceCache<NormalizedReference>,
    upsert: Upsert,
}

impl UpdateOpcode {
    fn new(trust: Trust, cache: ReferenceCache<NormalizedReference>, upsert: Upsert) -> Self {
        Self {
            trust,
            cache,
            upsert,
        }
    }

    /// Tag captured at the cache's last read, so an outer scan can test
    /// for possible change without knowing opcode internals.
    #[must_use]
    pub fn tag(&self) -> Option<Tag> {
        self.cache.tag()
    }

    /// The region this opcode currently owns.
    #[must_use]
    pub fn bounds(&self) -> &Bounds {
        self.upsert.bounds()
    }

    /// One revalidation tick for this opcode.
    ///
    /// `Const` is a no-op. `Modified` first attempts an in-place update;
    /// if the pairing is not patchable, the old region is torn down and
    /// the fresh insertion lands at the freed cursor, replacing the
    /// upsert (and with it the bounds) in a single swap.
    pub fn evaluate(&mut self, tree: &mut Tree) {
        match self.cache.revalidate() {
            Validation::Const => {}
            Validation::Modified(insertion) => {
                if self.upsert.update(tree, insertion.clone()) {
                    return;
                }
                let cursor = self.upsert.bounds().clear(tree);
                self.upsert = Upsert::insert(tree, cursor, insertion);
                #[cfg(feature = "tracing")]
                tracing::debug!(kind = self.trust.opcode_name(), "teardown and reinsert");
            }
        }
    }

    /// Debug snapshot: type tag plus the last cached value's textual
    /// form. The only serializable state this opcode exposes.
    #[must_use]
    pub fn snapshot(&self) -> OpcodeSnapshot {
        OpcodeSnapshot {
            kind: self.trust.opcode_name(),
            last_value: self.cache.last().map(Insertion::display_text),
        }
    }
}

/// Diagnostics view of one [`UpdateOpcode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeSnapshot {
    pub kind: &'static str,
    pub last_value: Option<String>,
}

impl std::fmt::Display for OpcodeSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.last_value {
            Some(value) => write!(f, "{}({value:?})", self.kind),
            None => write!(f, "{}(<unread>)", self.kind),
        }
    }
}
