//! The node store and graph builder façade (§3, §4.1).

use crate::entity::{LoopId, NodeId};
use crate::ir::node::Node;
use crate::ir::opcode::Opcode;
use crate::ir::types::{ConditionCode, Type};
use crate::loop_analysis::Loop;

/// A named method container owning a densely indexed sequence of nodes.
///
/// Node at index 0 is always the `Start` region; node at index 1 is always
/// the `End` region (§3 invariant). Deletion nulls a node's slot, preserving
/// every other node's index as a stable identifier.
pub struct Graph {
    nodes: Vec<Option<Node>>,
    regions: Vec<NodeId>,
    graveyard: Vec<NodeId>,
    loops: Vec<Loop>,
    root_loop: Option<LoopId>,
    method_name: String,
    num_params: u32,
    placed: bool,
    unit_test_mode: bool,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Builds a fresh graph with `Start` at index 0 and `End` at index 1.
    pub fn new() -> Self {
        let mut g = Graph {
            nodes: Vec::new(),
            regions: Vec::new(),
            graveyard: Vec::new(),
            loops: Vec::new(),
            root_loop: None,
            method_name: String::new(),
            num_params: 0,
            placed: false,
            unit_test_mode: false,
        };
        let start = g.create_by_opcode(Opcode::Start);
        let end = g.create_by_opcode(Opcode::End);
        debug_assert_eq!(start, g.start_region());
        debug_assert_eq!(end, g.end_region());
        g
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn set_method_name(&mut self, name: impl Into<String>) {
        self.method_name = name.into();
    }

    pub fn num_params(&self) -> u32 {
        self.num_params
    }

    pub fn set_num_params(&mut self, n: u32) {
        self.num_params = n;
    }

    pub fn set_unit_test_mode(&mut self) {
        self.unit_test_mode = true;
    }

    pub fn is_unit_test_mode(&self) -> bool {
        self.unit_test_mode
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn start_region(&self) -> NodeId {
        NodeId::new(0)
    }

    pub fn end_region(&self) -> NodeId {
        NodeId::new(1)
    }

    pub fn is_placed(&self) -> bool {
        self.placed
    }

    pub fn set_placed(&mut self) {
        self.placed = true;
    }

    /// Undoes every prior GCM placement so it can be rerun after a pass
    /// changes the data-flow graph.
    pub fn reset_placement(&mut self) {
        for slot in self.nodes.iter_mut() {
            if let Some(n) = slot {
                n.clear_placement();
            }
        }
        self.placed = false;
    }

    /// Invalidates the "instructions placed" flag. Every pass downstream of
    /// GCM (liveness, linear-scan) requires it set; peepholes and inlining
    /// that add/remove nodes after scheduling must call this, then rerun
    /// GCM, matching §5's "invalidation between passes is the caller's
    /// responsibility".
    pub fn clear_placed(&mut self) {
        self.placed = false;
    }

    pub fn all_regions(&self) -> &[NodeId] {
        &self.regions
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn get_by_index(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("{:?} was deleted", id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.index()]
            .as_mut()
            .unwrap_or_else(|| panic!("{:?} was deleted", id))
    }

    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    pub fn loop_by_id(&self, id: LoopId) -> &Loop {
        &self.loops[id.index()]
    }

    pub fn loop_mut(&mut self, id: LoopId) -> &mut Loop {
        &mut self.loops[id.index()]
    }

    pub fn root_loop(&self) -> Option<LoopId> {
        self.root_loop
    }

    pub(crate) fn push_loop(&mut self, l: Loop) -> LoopId {
        let id = LoopId(self.loops.len() as u32);
        self.loops.push(l);
        id
    }

    pub(crate) fn set_root_loop(&mut self, id: LoopId) {
        self.root_loop = Some(id);
    }

    pub(crate) fn clear_loops(&mut self) {
        self.loops.clear();
        self.root_loop = None;
        for slot in &mut self.nodes {
            if let Some(n) = slot {
                if n.is_region() {
                    n.clear_loop();
                }
            }
        }
    }

    // --- node creation -----------------------------------------------

    /// Dispatch used by cloning (`lite_clone`) and direct opcode-driven
    /// construction. Panics on an opcode the dispatch doesn't know, matching
    /// `CreateClearInstByOpcode`'s fatal "Incorrect opcode!" path.
    pub fn create_by_opcode(&mut self, opc: Opcode) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let node = Node::new(id, opc);
        self.nodes.push(Some(node));
        if opc.is_region() {
            self.regions.push(id);
        }
        id
    }

    /// Unit-test-only construction at an explicit index (`CreateInstByIndex`).
    /// Fatal if not in unit-test mode or if the index is already occupied.
    pub fn create_at_index(&mut self, index: usize, opc: Opcode) -> NodeId {
        assert!(
            self.unit_test_mode,
            "create_at_index is for unit tests only; call set_unit_test_mode() first"
        );
        assert!(
            self.nodes.get(index).map(|s| s.is_none()).unwrap_or(true),
            "node with index {} already exists",
            index
        );
        if index >= self.nodes.len() {
            self.nodes.resize(index + 1, None);
        }
        let id = NodeId::new(index);
        self.nodes[index] = Some(Node::new(id, opc));
        if opc.is_region() {
            self.regions.push(id);
        }
        id
    }

    pub fn create_region(&mut self) -> NodeId {
        self.create_by_opcode(Opcode::Region)
    }

    pub fn create_if(&mut self) -> NodeId {
        self.create_by_opcode(Opcode::If)
    }

    pub fn create_jump(&mut self) -> NodeId {
        self.create_by_opcode(Opcode::Jump)
    }

    fn create_binary(&mut self, opc: Opcode, ty: Type, lhs: NodeId, rhs: NodeId) -> NodeId {
        let id = self.create_by_opcode(opc);
        self.node_mut(id).set_ty(ty);
        self.push_data_input(id, lhs);
        self.push_data_input(id, rhs);
        id
    }

    pub fn create_add(&mut self, ty: Type, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.create_binary(Opcode::Add, ty, lhs, rhs)
    }

    pub fn create_sub(&mut self, ty: Type, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.create_binary(Opcode::Sub, ty, lhs, rhs)
    }

    pub fn create_mul(&mut self, ty: Type, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.create_binary(Opcode::Mul, ty, lhs, rhs)
    }

    pub fn create_div(&mut self, ty: Type, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.create_binary(Opcode::Div, ty, lhs, rhs)
    }

    pub fn create_shl(&mut self, ty: Type, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.create_binary(Opcode::Shl, ty, lhs, rhs)
    }

    pub fn create_shr(&mut self, ty: Type, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.create_binary(Opcode::Shr, ty, lhs, rhs)
    }

    pub fn create_and(&mut self, ty: Type, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.create_binary(Opcode::And, ty, lhs, rhs)
    }

    pub fn create_or(&mut self, ty: Type, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.create_binary(Opcode::Or, ty, lhs, rhs)
    }

    pub fn create_compare(&mut self, cc: ConditionCode, lhs: NodeId, rhs: NodeId) -> NodeId {
        let id = self.create_by_opcode(Opcode::Compare);
        self.node_mut(id).set_cc(cc);
        self.push_data_input(id, lhs);
        self.push_data_input(id, rhs);
        id
    }

    pub fn create_constant(&mut self, imm: i64) -> NodeId {
        let id = self.create_by_opcode(Opcode::Constant);
        self.node_mut(id).set_imm(imm);
        id
    }

    pub fn create_parameter(&mut self, index: u32) -> NodeId {
        let id = self.create_by_opcode(Opcode::Parameter);
        self.node_mut(id).set_param_index(index);
        id
    }

    pub fn create_phi(&mut self) -> NodeId {
        self.create_by_opcode(Opcode::Phi)
    }

    pub fn create_call(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.create_by_opcode(Opcode::Call);
        self.node_mut(id).set_call_name(name);
        id
    }

    pub fn create_return(&mut self) -> NodeId {
        self.create_by_opcode(Opcode::Return)
    }

    pub fn create_null_check(&mut self) -> NodeId {
        self.create_by_opcode(Opcode::NullCheck)
    }

    pub fn create_bounds_check(&mut self) -> NodeId {
        self.create_by_opcode(Opcode::BoundsCheck)
    }

    // --- deletion ------------------------------------------------------

    /// Nulls `id`'s slot (preserving every other index), detaches it from
    /// every input's user lists, and appends it to the graveyard. `id` must
    /// already have no remaining users — peepholes leave a folded-away node
    /// orphaned in place rather than deleting it out from under a caller
    /// that might still hold a reference, exactly as the seed scenarios in
    /// spec §8 expect.
    pub fn delete(&mut self, id: NodeId) {
        let inputs: Vec<NodeId> = self.node(id).raw_inputs().to_vec();
        let has_control = self.node(id).has_control_input();
        debug_assert!(
            self.node(id).num_data_users() == 0 && self.node(id).control_user().is_none(),
            "deleting {:?} with live users; rewire them first",
            id
        );
        for (i, input) in inputs.into_iter().enumerate() {
            if has_control && i == 0 {
                if self.node(input).control_user() == Some(id) {
                    self.node_mut(input).clear_control_user();
                }
            } else {
                self.node_mut(input).remove_data_user(id);
            }
        }
        self.nodes[id.index()] = None;
        self.graveyard.push(id);
    }

    pub fn graveyard(&self) -> &[NodeId] {
        &self.graveyard
    }

    // --- edge operations (§4.1) -----------------------------------------

    /// `set_control_input`: sets `node`'s slot 0 to `pred`, and registers
    /// `node` as `pred`'s control user.
    pub fn set_control_input(&mut self, node: NodeId, pred: NodeId) {
        assert!(
            self.node(node).has_control_input(),
            "{:?} has no control slot",
            node
        );
        if self.node(node).num_all_inputs() == 0 {
            self.node_mut(node).push_raw_input(pred);
        } else {
            self.node_mut(node).set_raw_input(0, pred);
        }
        self.node_mut(pred).set_control_user(node);
    }

    /// `set_data_input`: writes data slot `index` (offset by the control
    /// slot when present); detaches the previous occupant's user edge if
    /// replacing, and registers `node` as `value`'s data user.
    pub fn set_data_input(&mut self, node: NodeId, index: usize, value: NodeId) {
        let offset = if self.node(node).has_control_input() { index + 1 } else { index };
        let len = self.node(node).num_all_inputs();
        if offset < len {
            let old = self.node(node).raw_input(offset);
            if old != value {
                self.node_mut(old).remove_data_user(node);
            }
            self.node_mut(node).set_raw_input(offset, value);
        } else {
            assert_eq!(offset, len, "set_data_input: sparse index {} (len {})", offset, len);
            self.node_mut(node).push_raw_input(value);
        }
        self.node_mut(value).add_data_user(node);
    }

    /// Appends `value` as a new data input (dynamic-arity nodes: Phi args,
    /// Call args).
    pub fn push_data_input(&mut self, node: NodeId, value: NodeId) {
        let index = self.node(node).num_data_inputs();
        self.set_data_input(node, index, value);
    }

    /// Every data user of `old` that references `old` is retargeted to
    /// `new`; `old`'s data user list is cleared.
    pub fn replace_data_users(&mut self, new: NodeId, old: NodeId) {
        let users: Vec<NodeId> = self.node(old).data_users().to_vec();
        for user in users {
            let has_control = self.node(user).has_control_input();
            let positions: Vec<usize> = self
                .node(user)
                .raw_inputs()
                .iter()
                .enumerate()
                .filter(|&(i, &v)| v == old && !(has_control && i == 0))
                .map(|(i, _)| i)
                .collect();
            for pos in positions {
                self.node_mut(user).set_raw_input(pos, new);
            }
            self.node_mut(new).add_data_user(user);
        }
        self.node_mut(old).clear_data_users();
    }

    /// Retargets whichever node has `old` as its control input to `new`.
    pub fn replace_ctrl_user(&mut self, old: NodeId, new: NodeId) {
        if let Some(user) = self.node(old).control_user() {
            self.node_mut(user).set_raw_input(0, new);
            self.node_mut(new).set_control_user(user);
        }
        self.node_mut(old).clear_control_user();
    }

    pub fn delete_data_user(&mut self, producer: NodeId, consumer: NodeId) {
        self.node_mut(producer).remove_data_user(consumer);
    }

    pub fn delete_raw_user(&mut self, producer: NodeId, consumer: NodeId) {
        if self.node(producer).control_user() == Some(consumer) {
            self.node_mut(producer).clear_control_user();
        }
    }

    /// `delete_input`: removes `value` from `node`'s dynamic input list.
    /// Per the resolved Open Question in DESIGN NOTES §9, this asserts the
    /// value **is** found (the source's `DeleteInput` asserted the opposite,
    /// which the design notes call out as a bug).
    pub fn delete_input(&mut self, node: NodeId, value: NodeId) {
        self.node_mut(node).remove_raw_input_value(value);
    }

    // --- region wiring ---------------------------------------------------

    pub fn add_region_predecessor(&mut self, region: NodeId, pred: NodeId) {
        self.node_mut(region).push_raw_input(pred);
    }

    pub fn set_jump_target(&mut self, jump: NodeId, target: NodeId) {
        debug_assert_eq!(self.node(jump).opcode(), Opcode::Jump);
        self.node_mut(jump).set_control_user(target);
        self.add_region_predecessor(target, jump);
    }

    pub fn set_true_branch(&mut self, if_node: NodeId, target: NodeId) {
        debug_assert_eq!(self.node(if_node).opcode(), Opcode::If);
        self.node_mut(if_node).set_true_branch(target);
        self.add_region_predecessor(target, if_node);
    }

    pub fn set_false_branch(&mut self, if_node: NodeId, target: NodeId) {
        debug_assert_eq!(self.node(if_node).opcode(), Opcode::If);
        self.node_mut(if_node).set_false_branch(target);
        self.add_region_predecessor(target, if_node);
    }

    pub fn jump_target(&self, jump: NodeId) -> NodeId {
        debug_assert_eq!(self.node(jump).opcode(), Opcode::Jump);
        self.node(jump)
            .control_user()
            .expect("Jump has no target wired")
    }

    /// Wires an unconditional fall-through from a `Return` straight into
    /// `End`, the same as `set_jump_target` does for `Jump`, except `Return`
    /// has exactly one possible destination so there is nothing to store.
    pub fn wire_return_to_end(&mut self, ret: NodeId) {
        debug_assert_eq!(self.node(ret).opcode(), Opcode::Return);
        let end = self.end_region();
        self.add_region_predecessor(end, ret);
    }

    /// Next control-bearing node in program order after `node` (a region or
    /// a pass-through control instruction), following the chain GCM walks
    /// when placing data inputs. `None` once `node` is itself a terminator
    /// (`If`/`Jump`/`Return`) or has no successor wired yet.
    pub fn control_chain_next(&self, node: NodeId) -> Option<NodeId> {
        match self.node(node).opcode() {
            Opcode::If | Opcode::Return => None,
            Opcode::Jump => None,
            _ => self.node(node).control_user(),
        }
    }

    /// Walks the control chain starting at `region` until it reaches the
    /// region's terminator (`If`, `Jump`, or `Return`).
    pub fn terminator_of(&self, region: NodeId) -> NodeId {
        let mut cur = region;
        loop {
            match self.node(cur).opcode() {
                Opcode::If | Opcode::Jump | Opcode::Return => return cur,
                _ => {
                    cur = self
                        .node(cur)
                        .control_user()
                        .unwrap_or_else(|| panic!("{:?}: control chain dead-ends before a terminator", region));
                }
            }
        }
    }

    /// Walks a branching instruction's control-input chain backward until it
    /// reaches the region that owns it. Used by loop analysis, which runs
    /// before GCM assigns `Node::region`.
    pub fn owning_region_backward(&self, node: NodeId) -> NodeId {
        let mut cur = node;
        loop {
            if self.node(cur).is_region() {
                return cur;
            }
            cur = self.node(cur).control_input();
        }
    }

    /// Predecessor regions of `region`, derived by walking each of its
    /// direct predecessor branch instructions back to the region owning it.
    pub fn predecessor_regions(&self, region: NodeId) -> smallvec::SmallVec<[NodeId; 2]> {
        self.node(region)
            .raw_inputs()
            .iter()
            .map(|&p| self.owning_region_backward(p))
            .collect()
    }

    /// Successor regions reached directly from `region`'s terminator.
    pub fn control_successors(&self, region: NodeId) -> smallvec::SmallVec<[NodeId; 2]> {
        if region == self.end_region() {
            return smallvec::SmallVec::new();
        }
        let term = self.terminator_of(region);
        let mut out = smallvec::SmallVec::new();
        match self.node(term).opcode() {
            Opcode::If => {
                if let Some(t) = self.node(term).true_branch() {
                    out.push(t);
                }
                if let Some(f) = self.node(term).false_branch() {
                    out.push(f);
                }
            }
            Opcode::Jump => {
                out.push(self.jump_target(term));
            }
            Opcode::Return => {
                out.push(self.end_region());
            }
            _ => unreachable!("terminator_of returned a non-terminator"),
        }
        out
    }

    // --- placed list (post-GCM) ------------------------------------------

    /// Appends `node` to `region`'s placed-node list and marks it placed.
    pub fn push_back_inst(&mut self, region: NodeId, node: NodeId) {
        let tail = self.node(region).last();
        self.node_mut(node).set_placed_in(region);
        self.node_mut(node).set_prev(tail);
        self.node_mut(node).set_next(None);
        if let Some(tail) = tail {
            self.node_mut(tail).set_next(Some(node));
        } else {
            self.node_mut(region).set_region_first(Some(node));
        }
        self.node_mut(region).set_region_last(Some(node));
    }
}
