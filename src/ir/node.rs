//! The polymorphic node record and its kind-specific payload.
//!
//! The source mixes inheritance (`FixedInputs<N>`, `DynamicInputs`,
//! `ControlProp<T>`) with an `Opcode` tag. Per DESIGN NOTES (§9) this
//! collapses into one sum type: a `Node` with a flat `Opcode`, a single
//! `SmallVec` of raw inputs (control slot included at index 0 when the
//! opcode has one), and a `Payload` enum carrying whatever else the kind
//! needs. Downcasts become `payload`-matching helpers (`as_if`, `as_region`,
//! ...), never a runtime type check.

use smallvec::SmallVec;

use crate::entity::{LoopId, NodeId};
use crate::ir::opcode::{Arity, Opcode};
use crate::ir::types::{ConditionCode, Type};

/// Kind-specific fields that don't fit the uniform input/user edges.
#[derive(Clone, Debug)]
pub enum Payload {
    None,
    /// `Constant`'s 64-bit immediate.
    Immediate(i64),
    /// `Compare`'s condition code.
    Compare(ConditionCode),
    /// `Parameter`'s 0-based index.
    ParamIndex(u32),
    /// `Call`'s target function name.
    CallName(String),
    /// `If`'s two successor slots. Unlike every other control-bearing
    /// opcode, `If` does not reuse the generic `control_user` reservation
    /// for its single successor slot because it needs two.
    If {
        true_branch: Option<NodeId>,
        false_branch: Option<NodeId>,
    },
    /// `Start`/`Region`/`End`'s scheduling and dominance bookkeeping.
    Region(RegionData),
}

/// Fields carried only by control regions.
#[derive(Clone, Debug, Default)]
pub struct RegionData {
    pub dominator: Option<NodeId>,
    pub dominated: Vec<NodeId>,
    pub loop_id: Option<LoopId>,
    pub is_loop_header: bool,
    /// Head of the post-GCM placed-node list.
    pub first: Option<NodeId>,
    /// Tail of the post-GCM placed-node list.
    pub last: Option<NodeId>,
}

/// A single node in a [`crate::ir::Graph`].
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    opcode: Opcode,
    ty: Type,
    /// Raw input edges. For opcodes with [`Opcode::has_control_input`] slot
    /// 0 is the control predecessor; the rest are data inputs. `Region`'s
    /// inputs are its control predecessors in arrival order (no control/data
    /// split applies to regions themselves).
    inputs: SmallVec<[NodeId; 2]>,
    /// Reserved "user slot 0": the one node that took `self` as its control
    /// input. Unused (always `None`) for `If`, which stores its two
    /// successors in `Payload::If` instead.
    control_user: Option<NodeId>,
    /// Every other ("data") user of this node's value.
    data_users: SmallVec<[NodeId; 4]>,
    linear_number: Option<u32>,
    life_number: Option<u32>,
    placed: bool,
    /// Owning region once placed by GCM (Start, for Constants/Parameters).
    region: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    payload: Payload,
}

impl Node {
    pub(crate) fn new(id: NodeId, opcode: Opcode) -> Self {
        let ty = if opcode == Opcode::Constant {
            Type::DEFAULT_CONSTANT
        } else if opcode == Opcode::Compare {
            Type::Bool
        } else {
            Type::None
        };
        let payload = match opcode {
            Opcode::Constant => Payload::Immediate(0),
            Opcode::Compare => Payload::Compare(ConditionCode::Eq),
            Opcode::Parameter => Payload::ParamIndex(0),
            Opcode::Call => Payload::CallName(String::new()),
            Opcode::If => Payload::If {
                true_branch: None,
                false_branch: None,
            },
            Opcode::Start | Opcode::Region | Opcode::End => Payload::Region(RegionData::default()),
            _ => Payload::None,
        };
        Node {
            id,
            opcode,
            ty,
            inputs: SmallVec::new(),
            control_user: None,
            data_users: SmallVec::new(),
            linear_number: None,
            life_number: None,
            placed: false,
            region: None,
            prev: None,
            next: None,
            payload,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn set_ty(&mut self, ty: Type) {
        self.ty = ty;
    }

    pub fn is_region(&self) -> bool {
        self.opcode.is_region()
    }

    pub fn has_control_input(&self) -> bool {
        self.opcode.has_control_input()
    }

    /// All raw inputs, control slot included.
    pub fn raw_inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn raw_input(&self, index: usize) -> NodeId {
        self.inputs
            .get(index)
            .copied()
            .unwrap_or_else(|| panic!("{:?}: no raw input {}", self.id, index))
    }

    pub fn num_all_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Control input, i.e. raw input slot 0. Panics on opcodes without one.
    pub fn control_input(&self) -> NodeId {
        assert!(
            self.has_control_input(),
            "{:?} ({:?}) has no control input",
            self.id,
            self.opcode
        );
        self.raw_input(0)
    }

    pub fn num_data_inputs(&self) -> usize {
        if self.has_control_input() {
            self.inputs.len().saturating_sub(1)
        } else {
            self.inputs.len()
        }
    }

    pub fn data_input(&self, index: usize) -> NodeId {
        let offset = if self.has_control_input() { index + 1 } else { index };
        self.raw_input(offset)
    }

    pub fn data_inputs(&self) -> &[NodeId] {
        if self.has_control_input() {
            &self.inputs[1.min(self.inputs.len())..]
        } else {
            &self.inputs
        }
    }

    pub fn control_user(&self) -> Option<NodeId> {
        self.control_user
    }

    pub fn data_users(&self) -> &[NodeId] {
        &self.data_users
    }

    pub fn num_data_users(&self) -> usize {
        self.data_users.len()
    }

    pub fn linear_number(&self) -> Option<u32> {
        self.linear_number
    }

    pub fn set_linear_number(&mut self, n: u32) {
        self.linear_number = Some(n);
    }

    pub fn life_number(&self) -> Option<u32> {
        self.life_number
    }

    pub fn set_life_number(&mut self, n: u32) {
        self.life_number = Some(n);
    }

    pub fn is_placed(&self) -> bool {
        self.placed
    }

    pub fn set_placed(&mut self) {
        self.placed = true;
    }

    pub fn region(&self) -> Option<NodeId> {
        self.region
    }

    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn imm(&self) -> i64 {
        match self.payload {
            Payload::Immediate(v) => v,
            _ => panic!("{:?} ({:?}) is not a Constant", self.id, self.opcode),
        }
    }

    pub fn set_imm(&mut self, v: i64) {
        match &mut self.payload {
            Payload::Immediate(slot) => *slot = v,
            _ => panic!("{:?} ({:?}) is not a Constant", self.id, self.opcode),
        }
    }

    pub fn cc(&self) -> ConditionCode {
        match self.payload {
            Payload::Compare(cc) => cc,
            _ => panic!("{:?} ({:?}) is not a Compare", self.id, self.opcode),
        }
    }

    pub fn set_cc(&mut self, cc: ConditionCode) {
        match &mut self.payload {
            Payload::Compare(slot) => *slot = cc,
            _ => panic!("{:?} ({:?}) is not a Compare", self.id, self.opcode),
        }
    }

    pub fn param_index(&self) -> u32 {
        match self.payload {
            Payload::ParamIndex(i) => i,
            _ => panic!("{:?} ({:?}) is not a Parameter", self.id, self.opcode),
        }
    }

    pub fn set_param_index(&mut self, i: u32) {
        match &mut self.payload {
            Payload::ParamIndex(slot) => *slot = i,
            _ => panic!("{:?} ({:?}) is not a Parameter", self.id, self.opcode),
        }
    }

    pub fn call_name(&self) -> &str {
        match &self.payload {
            Payload::CallName(s) => s.as_str(),
            _ => panic!("{:?} ({:?}) is not a Call", self.id, self.opcode),
        }
    }

    pub fn set_call_name(&mut self, name: impl Into<String>) {
        match &mut self.payload {
            Payload::CallName(slot) => *slot = name.into(),
            _ => panic!("{:?} ({:?}) is not a Call", self.id, self.opcode),
        }
    }

    pub fn true_branch(&self) -> Option<NodeId> {
        match self.payload {
            Payload::If { true_branch, .. } => true_branch,
            _ => panic!("{:?} ({:?}) is not an If", self.id, self.opcode),
        }
    }

    pub fn false_branch(&self) -> Option<NodeId> {
        match self.payload {
            Payload::If { false_branch, .. } => false_branch,
            _ => panic!("{:?} ({:?}) is not an If", self.id, self.opcode),
        }
    }

    pub fn region_data(&self) -> &RegionData {
        match &self.payload {
            Payload::Region(r) => r,
            _ => panic!("{:?} ({:?}) is not a region", self.id, self.opcode),
        }
    }

    pub fn region_data_mut(&mut self) -> &mut RegionData {
        match &mut self.payload {
            Payload::Region(r) => r,
            _ => panic!("{:?} ({:?}) is not a region", self.id, self.opcode),
        }
    }

    pub fn dominator(&self) -> Option<NodeId> {
        self.region_data().dominator
    }

    pub fn dominated(&self) -> &[NodeId] {
        &self.region_data().dominated
    }

    pub fn loop_id(&self) -> Option<LoopId> {
        self.region_data().loop_id
    }

    pub fn is_loop_header(&self) -> bool {
        self.region_data().is_loop_header
    }

    pub fn first(&self) -> Option<NodeId> {
        self.region_data().first
    }

    pub fn last(&self) -> Option<NodeId> {
        self.region_data().last
    }

    // --- mutators used only by the owning Graph / pass implementations ---

    pub(crate) fn push_raw_input(&mut self, n: NodeId) {
        self.check_arity_growth();
        self.inputs.push(n);
    }

    pub(crate) fn set_raw_input(&mut self, index: usize, n: NodeId) {
        assert!(index < self.inputs.len(), "raw input index out of range");
        self.inputs[index] = n;
    }

    pub(crate) fn remove_raw_input_value(&mut self, n: NodeId) {
        let pos = self
            .inputs
            .iter()
            .position(|&x| x == n)
            .expect("delete_input: value not found among inputs");
        self.inputs.remove(pos);
    }

    pub(crate) fn set_control_user(&mut self, n: NodeId) {
        self.control_user = Some(n);
    }

    pub(crate) fn clear_control_user(&mut self) {
        self.control_user = None;
    }

    pub(crate) fn add_data_user(&mut self, n: NodeId) {
        if !self.data_users.contains(&n) {
            self.data_users.push(n);
        }
    }

    pub(crate) fn remove_data_user(&mut self, n: NodeId) {
        if let Some(pos) = self.data_users.iter().position(|&x| x == n) {
            self.data_users.remove(pos);
        }
    }

    pub(crate) fn clear_data_users(&mut self) {
        self.data_users.clear();
    }

    pub(crate) fn set_true_branch(&mut self, n: NodeId) {
        match &mut self.payload {
            Payload::If { true_branch, .. } => *true_branch = Some(n),
            _ => unreachable!("set_true_branch on non-If"),
        }
    }

    pub(crate) fn set_false_branch(&mut self, n: NodeId) {
        match &mut self.payload {
            Payload::If { false_branch, .. } => *false_branch = Some(n),
            _ => unreachable!("set_false_branch on non-If"),
        }
    }

    pub(crate) fn set_dominator(&mut self, n: NodeId) {
        self.region_data_mut().dominator = Some(n);
    }

    pub(crate) fn add_dominated(&mut self, n: NodeId) {
        self.region_data_mut().dominated.push(n);
    }

    pub(crate) fn set_loop(&mut self, id: LoopId) {
        self.region_data_mut().loop_id = Some(id);
    }

    pub(crate) fn clear_loop(&mut self) {
        self.region_data_mut().loop_id = None;
    }

    pub(crate) fn set_loop_header(&mut self) {
        self.region_data_mut().is_loop_header = true;
    }

    pub(crate) fn set_placed_in(&mut self, region: NodeId) {
        self.region = Some(region);
        self.placed = true;
    }

    pub(crate) fn set_prev(&mut self, n: Option<NodeId>) {
        self.prev = n;
    }

    pub(crate) fn set_next(&mut self, n: Option<NodeId>) {
        self.next = n;
    }

    pub(crate) fn set_region_first(&mut self, n: Option<NodeId>) {
        self.region_data_mut().first = n;
    }

    pub(crate) fn set_region_last(&mut self, n: Option<NodeId>) {
        self.region_data_mut().last = n;
    }

    /// Undoes `set_placed_in`/`push_back_inst`/`set_region_first`/`last`, so
    /// GCM can be rerun after a pass invalidates scheduling.
    pub(crate) fn clear_placement(&mut self) {
        self.placed = false;
        self.region = None;
        self.prev = None;
        self.next = None;
        if self.is_region() {
            let r = self.region_data_mut();
            r.first = None;
            r.last = None;
        }
    }

    fn check_arity_growth(&self) {
        if let Arity::Fixed(n) = self.opcode.arity() {
            debug_assert!(
                (self.inputs.len() as u32) < n,
                "{:?} ({:?}) input count would exceed fixed arity {}",
                self.id,
                self.opcode,
                n
            );
        }
    }
}
