//! Constant folding of arithmetic binary ops: the first thing peepholes
//! tries on every visited node before falling through to the algebraic
//! identities in [`crate::opt::peepholes`].

use crate::entity::NodeId;
use crate::ir::{Graph, Opcode};

/// If `node` is an arithmetic binary op whose operands are both `Constant`,
/// computes the folded value. Division by zero is left unfolded; there is
/// no runtime here to trap it, so the check is deferred rather than baked
/// into a bogus constant.
pub fn try_fold(graph: &Graph, node: NodeId) -> Option<i64> {
    let n = graph.node(node);
    if !n.opcode().is_arithmetic_binary() {
        return None;
    }
    let lhs = n.data_input(0);
    let rhs = n.data_input(1);
    if graph.node(lhs).opcode() != Opcode::Constant || graph.node(rhs).opcode() != Opcode::Constant {
        return None;
    }
    let a = graph.node(lhs).imm();
    let b = graph.node(rhs).imm();
    match n.opcode() {
        Opcode::Add => Some(a.wrapping_add(b)),
        Opcode::Sub => Some(a.wrapping_sub(b)),
        Opcode::Mul => Some(a.wrapping_mul(b)),
        Opcode::Div => {
            if b == 0 {
                None
            } else {
                Some(a.wrapping_div(b))
            }
        }
        Opcode::Shl => Some(a.wrapping_shl(b as u32)),
        Opcode::Shr => Some(a.wrapping_shr(b as u32)),
        Opcode::And => Some(a & b),
        Opcode::Or => Some(a | b),
        _ => unreachable!("is_arithmetic_binary covers exactly these opcodes"),
    }
}
