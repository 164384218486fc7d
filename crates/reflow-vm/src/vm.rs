#![forbid(unsafe_code)]

//! The interpreter driver and the render-range handle it produces.

use smallvec::SmallVec;

use reflow_tree::{Bounds, Cursor, Tree};

use crate::opcode::{AppendDynamicOpcode, Op, OpcodeSnapshot, Program, UpdateOpcode};
use crate::value::DynReference;

/// Error produced by a malformed program.
///
/// These are recoverable by the host (the program came from outside);
/// everything else in the core fails fast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    /// An opcode popped from an empty evaluation stack.
    StackUnderflow,
    /// `CloseElement` without a matching `OpenElement`.
    UnmatchedClose,
    /// `Local` outside any frame.
    NoFrame,
    /// `Local` index past the current frame's locals.
    UnknownLocal { index: usize, len: usize },
}

impl std::fmt::Display for VmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StackUnderflow => write!(f, "evaluation stack underflow"),
            Self::UnmatchedClose => write!(f, "close-element without open-element"),
            Self::NoFrame => write!(f, "local access outside any frame"),
            Self::UnknownLocal { index, len } => {
                write!(f, "local {index} out of range (frame has {len})")
            }
        }
    }
}

impl std::error::Error for VmError {}

struct Frame {
    locals: Vec<DynReference>,
}

/// The first-pass interpreter.
///
/// Owns the evaluation stack, the frame stack, the cursor stack, and the
/// updating-opcode list being accumulated for the current render range.
/// The stack retains nothing across one opcode's evaluation except what
/// is explicitly stashed into an opcode or cache.
///
/// Constructed and driven exclusively by [`render`]; opcodes see it only
/// for the duration of their own evaluation.
pub(crate) struct Vm {
    stack: Vec<DynReference>,
    frames: SmallVec<[Frame; 4]>,
    cursors: SmallVec<[Cursor; 8]>,
    updating: Vec<UpdateOpcode>,
}

impl Vm {
    fn new(cursor: Cursor) -> Self {
        let mut cursors = SmallVec::new();
        cursors.push(cursor);
        Self {
            stack: Vec::new(),
            frames: SmallVec::new(),
            cursors,
            updating: Vec::new(),
        }
    }

    /// Push a value reference onto the evaluation stack.
    pub(crate) fn push(&mut self, reference: DynReference) {
        self.stack.push(reference);
    }

    /// Pop the topmost value reference.
    pub(crate) fn pop(&mut self) -> Result<DynReference, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow)
    }

    /// The cursor append opcodes currently render into.
    #[must_use]
    pub(crate) fn elements(&self) -> Cursor {
        *self.cursors.last().expect("cursor stack is never empty")
    }

    /// Register an updating opcode with the current render range.
    pub(crate) fn update_with(&mut self, opcode: UpdateOpcode) {
        self.updating.push(opcode);
    }

    /// Begin a nested opcode sequence with its own lexical scope for
    /// locals, sharing the evaluation stack and the output cursor.
    fn push_frame(
        &mut self,
        tree: &mut Tree,
        program: &Program,
        locals: Vec<DynReference>,
    ) -> Result<(), VmError> {
        self.frames.push(Frame { locals });
        let result = self.exec(tree, program);
        self.frames.pop();
        result
    }

    fn local(&self, index: usize) -> Result<DynReference, VmError> {
        let frame = self.frames.last().ok_or(VmError::NoFrame)?;
        frame
            .locals
            .get(index)
            .cloned()
            .ok_or(VmError::UnknownLocal {
                index,
                len: frame.locals.len(),
            })
    }

    fn exec(&mut self, tree: &mut Tree, program: &Program) -> Result<(), VmError> {
        for op in program.ops() {
            match op {
                Op::Push(reference) => self.push(reference.clone()),
                Op::Local(index) => {
                    let reference = self.local(*index)?;
                    self.push(reference);
                }
                Op::Text(text) => {
                    let node = tree.create_text(text.clone());
                    self.elements().insert(tree, node);
                }
                Op::OpenElement(name) => {
                    let element = tree.create_element(name.clone());
                    self.elements().insert(tree, element);
                    self.cursors.push(Cursor::append_to(element));
                }
                Op::CloseElement => {
                    if self.cursors.len() <= 1 {
                        return Err(VmError::UnmatchedClose);
                    }
                    self.cursors.pop();
                }
                Op::AppendDynamic(trust) => {
                    AppendDynamicOpcode { trust: *trust }.evaluate(self, tree)?;
                }
                Op::Invoke { program, args } => {
                    let mut locals = Vec::with_capacity(*args);
                    for _ in 0..*args {
                        locals.push(self.pop()?);
                    }
                    // Popped in reverse: local 0 is the first argument pushed.
                    locals.reverse();
                    self.push_frame(tree, program, locals)?;
                }
            }
        }
        Ok(())
    }
}

/// Execute `program` at `cursor`, returning the handle that owns the
/// produced render range.
///
/// The range is delimited by two invisible marker nodes, so its bounds
/// stay valid however often the dynamic content between them is torn
/// down and reinserted.
pub fn render(program: &Program, tree: &mut Tree, cursor: Cursor) -> Result<RenderResult, VmError> {
    let open = tree.create_marker();
    cursor.insert(tree, open);
    let close = tree.create_marker();
    cursor.insert(tree, close);

    let mut vm = Vm::new(Cursor::before(cursor.parent(), Some(close)));
    vm.exec(tree, program)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(updating = vm.updating.len(), "first pass complete");

    Ok(RenderResult {
        updating: vm.updating,
        bounds: Bounds::new(cursor.parent(), open, close),
    })
}

/// A mounted render range: the region's bounds plus the updating opcodes
/// registered while rendering it.
pub struct RenderResult {
    updating: Vec<UpdateOpcode>,
    bounds: Bounds,
}

impl std::fmt::Debug for RenderResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderResult")
            .field("updating", &self.updating.len())
            .field("bounds", &self.bounds)
            .finish()
    }
}

impl RenderResult {
    /// The marker-anchored region this render occupies.
    #[must_use]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// The updating opcodes, in registration (= document) order.
    #[must_use]
    pub fn updating(&self) -> &[UpdateOpcode] {
        &self.updating
    }

    /// One revalidation tick: every updating opcode re-checks its cache
    /// in registration order and patches its region if modified.
    pub fn revalidate(&mut self, tree: &mut Tree) {
        for opcode in &mut self.updating {
            opcode.evaluate(tree);
        }
    }

    /// Unmount: discard the whole updating list and release the range's
    /// content from the tree in one operation.
    pub fn teardown(self, tree: &mut Tree) {
        let _ = self.bounds.clear(tree);
        #[cfg(feature = "tracing")]
        tracing::debug!(discarded = self.updating.len(), "render range torn down");
    }

    /// Diagnostics snapshot of every updating opcode.
    #[must_use]
    pub fn snapshot(&self) -> Vec<OpcodeSnapshot> {
        self.updating.iter().map(UpdateOpcode::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insertion::Trust;
    use crate::value::{Value, reference};
    use reflow_reference::{ConstReference, ValueCell};

    fn cautious(value: Value) -> Vec<Op> {
        vec![
            Op::Push(reference(ValueCell::new(value))),
            Op::AppendDynamic(Trust::Cautious),
        ]
    }

    #[test]
    fn static_text_and_elements() {
        let mut tree = Tree::new();
        let program = Program::new(vec![
            Op::Text("a".into()),
            Op::OpenElement("b".into()),
            Op::Text("c".into()),
            Op::CloseElement,
            Op::Text("d".into()),
        ]);
        let cursor = Cursor::append_to(tree.root());
        let result = render(&program, &mut tree, cursor).unwrap();
        assert_eq!(tree.to_markup(), "a<b>c</b>d");
        assert!(result.updating().is_empty());
    }

    #[test]
    fn constant_reference_registers_no_update_opcode() {
        let mut tree = Tree::new();
        let program = Program::new(vec![
            Op::Push(reference(ConstReference::new(Value::from("hello")))),
            Op::AppendDynamic(Trust::Cautious),
        ]);
        let cursor = Cursor::append_to(tree.root());
        let result = render(&program, &mut tree, cursor).unwrap();
        assert_eq!(tree.to_markup(), "hello");
        assert_eq!(result.updating().len(), 0);
    }

    #[test]
    fn variable_reference_registers_one_update_opcode() {
        let mut tree = Tree::new();
        let program = Program::new(cautious(Value::from("hi")));
        let cursor = Cursor::append_to(tree.root());
        let result = render(&program, &mut tree, cursor).unwrap();
        assert_eq!(result.updating().len(), 1);
    }

    #[test]
    fn stack_underflow_is_reported() {
        let mut tree = Tree::new();
        let program = Program::new(vec![Op::AppendDynamic(Trust::Cautious)]);
        let cursor = Cursor::append_to(tree.root());
        let err = render(&program, &mut tree, cursor).unwrap_err();
        assert_eq!(err, VmError::StackUnderflow);
    }

    #[test]
    fn unmatched_close_is_reported() {
        let mut tree = Tree::new();
        let program = Program::new(vec![Op::CloseElement]);
        let cursor = Cursor::append_to(tree.root());
        let err = render(&program, &mut tree, cursor).unwrap_err();
        assert_eq!(err, VmError::UnmatchedClose);
    }

    #[test]
    fn invoke_binds_locals_in_push_order() {
        let mut tree = Tree::new();
        let inner = Program::new(vec![
            Op::Local(0),
            Op::AppendDynamic(Trust::Cautious),
            Op::Local(1),
            Op::AppendDynamic(Trust::Cautious),
        ]);
        let program = Program::new(vec![
            Op::Push(reference(ConstReference::new(Value::from("first")))),
            Op::Push(reference(ConstReference::new(Value::from("second")))),
            Op::Invoke {
                program: inner,
                args: 2,
            },
        ]);
        let cursor = Cursor::append_to(tree.root());
        render(&program, &mut tree, cursor).unwrap();
        assert_eq!(tree.to_markup(), "firstsecond");
    }

    #[test]
    fn local_outside_frame_is_reported() {
        let mut tree = Tree::new();
        let program = Program::new(vec![Op::Local(0)]);
        let cursor = Cursor::append_to(tree.root());
        let err = render(&program, &mut tree, cursor).unwrap_err();
        assert_eq!(err, VmError::NoFrame);
    }

    #[test]
    fn local_index_past_frame_is_reported() {
        let mut tree = Tree::new();
        let inner = Program::new(vec![Op::Local(1), Op::AppendDynamic(Trust::Cautious)]);
        let program = Program::new(vec![
            Op::Push(reference(ConstReference::new(Value::from("only")))),
            Op::Invoke {
                program: inner,
                args: 1,
            },
        ]);
        let cursor = Cursor::append_to(tree.root());
        let err = render(&program, &mut tree, cursor).unwrap_err();
        assert_eq!(err, VmError::UnknownLocal { index: 1, len: 1 });
    }

    #[test]
    fn invoke_shares_stack_and_cursor() {
        let mut tree = Tree::new();
        // The nested program consumes a reference pushed by the outer one.
        let inner = Program::new(vec![Op::AppendDynamic(Trust::Cautious)]);
        let program = Program::new(vec![
            Op::OpenElement("p".into()),
            Op::Push(reference(ValueCell::new(Value::from("x")))),
            Op::Invoke {
                program: inner,
                args: 0,
            },
            Op::CloseElement,
        ]);
        let cursor = Cursor::append_to(tree.root());
        let result = render(&program, &mut tree, cursor).unwrap();
        assert_eq!(tree.to_markup(), "<p>x</p>");
        assert_eq!(result.updating().len(), 1);
    }

    #[test]
    fn teardown_releases_the_whole_range() {
        let mut tree = Tree::new();
        let before = tree.create_text("[");
        let root = tree.root();
        tree.insert_before(root, before, None);

        let program = Program::new(cautious(Value::from("content")));
        let result = render(&program, &mut tree, Cursor::append_to(root)).unwrap();
        let after = tree.create_text("]");
        tree.insert_before(root, after, None);
        assert_eq!(tree.to_markup(), "[content]");

        result.teardown(&mut tree);
        assert_eq!(tree.to_markup(), "[]");
    }

    #[test]
    fn render_between_siblings_respects_marker() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.create_text("a");
        let z = tree.create_text("z");
        tree.insert_before(root, a, None);
        tree.insert_before(root, z, None);

        let program = Program::new(vec![Op::Text("m".into()), Op::Text("n".into())]);
        render(&program, &mut tree, Cursor::before(root, Some(z))).unwrap();
        assert_eq!(tree.to_markup(), "amnz");
    }

    #[test]
    fn snapshot_lists_opcodes_in_order() {
        let mut tree = Tree::new();
        let program = Program::new(vec![
            Op::Push(reference(ValueCell::new(Value::from("safe")))),
            Op::AppendDynamic(Trust::Cautious),
            Op::Push(reference(ValueCell::new(Value::from("<raw>")))),
            Op::AppendDynamic(Trust::Trusting),
        ]);
        let cursor = Cursor::append_to(tree.root());
        let result = render(&program, &mut tree, cursor).unwrap();
        let snaps = result.snapshot();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].kind, "update-cautious");
        assert_eq!(snaps[0].last_value.as_deref(), Some("safe"));
        assert_eq!(snaps[1].kind, "update-trusting");
        assert_eq!(snaps[1].last_value.as_deref(), Some("<raw>"));
    }
}
