//! Peephole simplification: constant folding plus a handful of algebraic
//! identities, applied bottom-up so a folded leaf can immediately feed a
//! fold one level up in the same pass.
//!
//! A simplified node is never deleted — its users are redirected to the
//! replacement and the original is left orphaned in the arena. Later passes
//! never reach it because nothing points to it any more.

use crate::entity::NodeId;
use crate::ir::{Graph, Opcode, Type};
use crate::opt::constant_folding;
use crate::rpo::RpoNodes;

pub struct Peepholes;

impl Peepholes {
    /// Runs one bottom-up pass over every reachable node, returning how
    /// many nodes were simplified.
    pub fn run(graph: &mut Graph) -> u32 {
        let rpo = RpoNodes::compute(graph);
        let nodes: Vec<NodeId> = rpo.order().to_vec();
        let mut count = 0;
        for node in nodes.into_iter().rev() {
            if graph.get_by_index(node.index()).is_none() {
                continue;
            }
            if simplify(graph, node) {
                count += 1;
            }
        }
        log::debug!("peepholes: simplified {} node(s)", count);
        count
    }
}

fn simplify(graph: &mut Graph, node: NodeId) -> bool {
    if let Some(folded) = constant_folding::try_fold(graph, node) {
        let c = graph.create_constant(folded);
        graph.replace_data_users(c, node);
        log::trace!("{:?}: folded to constant {}", node, folded);
        return true;
    }
    match graph.node(node).opcode() {
        Opcode::Sub => try_sub(graph, node),
        Opcode::Or => try_or_zero(graph, node),
        Opcode::Shl => try_shl_after_shr(graph, node),
        _ => false,
    }
}

fn is_const_zero(graph: &Graph, n: NodeId) -> bool {
    graph.node(n).opcode() == Opcode::Constant && graph.node(n).imm() == 0
}

/// `x - 0 => x`, and `(a - b) - c => a - (b + c)` when the inner `Sub` has
/// no other data user (otherwise the rewrite would leave that other user
/// reading a now-orphaned computation instead of sharing it).
fn try_sub(graph: &mut Graph, node: NodeId) -> bool {
    let lhs = graph.node(node).data_input(0);
    let rhs = graph.node(node).data_input(1);

    if is_const_zero(graph, rhs) {
        graph.replace_data_users(lhs, node);
        log::trace!("{:?}: x - 0 => x", node);
        return true;
    }

    if graph.node(lhs).opcode() == Opcode::Sub && graph.node(lhs).data_users().len() == 1 {
        let a = graph.node(lhs).data_input(0);
        let b = graph.node(lhs).data_input(1);
        let ty = graph.node(node).ty();
        let sum = graph.create_add(ty, b, rhs);
        let merged = graph.create_sub(ty, a, sum);
        graph.replace_data_users(merged, node);
        log::trace!("{:?}: (a - b) - c => a - (b + c)", node);
        return true;
    }

    false
}

/// `x | 0 => x` on either operand.
fn try_or_zero(graph: &mut Graph, node: NodeId) -> bool {
    let lhs = graph.node(node).data_input(0);
    let rhs = graph.node(node).data_input(1);
    if is_const_zero(graph, rhs) {
        graph.replace_data_users(lhs, node);
        log::trace!("{:?}: x | 0 => x", node);
        return true;
    }
    if is_const_zero(graph, lhs) {
        graph.replace_data_users(rhs, node);
        log::trace!("{:?}: 0 | x => x", node);
        return true;
    }
    false
}

/// `(x >> k) << k => x & mask`, clearing the low `k` bits instead of two
/// shifts, when both shift amounts are the same constant `k`.
fn try_shl_after_shr(graph: &mut Graph, node: NodeId) -> bool {
    let shr = graph.node(node).data_input(0);
    let shl_amount = graph.node(node).data_input(1);
    if graph.node(shr).opcode() != Opcode::Shr {
        return false;
    }
    let shr_amount = graph.node(shr).data_input(1);
    if graph.node(shl_amount).opcode() != Opcode::Constant || graph.node(shr_amount).opcode() != Opcode::Constant {
        return false;
    }
    let k1 = graph.node(shl_amount).imm();
    let k2 = graph.node(shr_amount).imm();
    if k1 != k2 || k1 < 0 {
        return false;
    }

    let x = graph.node(shr).data_input(0);
    let ty = graph.node(node).ty();
    let width: u32 = match ty {
        Type::I32 | Type::U32 => 32,
        _ => 64,
    };
    let k = k1 as u32;
    let mask: i64 = if k >= width {
        0
    } else {
        let full: u64 = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
        ((u64::MAX << k) & full) as i64
    };

    let mask_const = graph.create_constant(mask);
    let anded = graph.create_and(ty, x, mask_const);
    graph.replace_data_users(anded, node);
    log::trace!("{:?}: (x >> {}) << {} => x & {:#x}", node, k, k, mask);
    true
}
