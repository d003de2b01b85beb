//! Call-site inlining.
//!
//! Each call site is replaced by a fresh copy ("lite clone": structure and
//! scalar payload only, none of the callee's computed analyses) of the
//! callee's body spliced into the caller's control chain at the call's
//! position. A single `Return` becomes a plain splice of its value and
//! control successor; multiple `Return`s merge through a synthesized region
//! and, if the callee returns a value, a `Phi` over it.

use std::collections::HashMap;

use crate::entity::NodeId;
use crate::ir::{Graph, Opcode};
use crate::result::{PassError, PassResult};
use crate::rpo::RpoRegions;

/// Name-keyed table of callee graphs available to inline from, the
/// counterpart of a linker's symbol table for this single-method IR.
#[derive(Default)]
pub struct CalleeRegistry {
    graphs: HashMap<String, Graph>,
}

impl CalleeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, graph: Graph) {
        self.graphs.insert(graph.method_name().to_string(), graph);
    }

    pub fn get(&self, name: &str) -> Option<&Graph> {
        self.graphs.get(name)
    }
}

pub struct Inlining;

impl Inlining {
    /// Inlines every eligible call site in `graph` once. Call sites that
    /// fail a check (missing callee, `__noinline__`, budget) are skipped
    /// and reported, rather than aborting the whole pass.
    pub fn run(graph: &mut Graph, callees: &CalleeRegistry, budget: u32) -> (u32, Vec<PassError>) {
        let call_sites = collect_call_sites(graph);
        let mut inlined = 0;
        let mut errors = Vec::new();
        let mut already_inlined: u32 = 0;

        for call in call_sites {
            if graph.get_by_index(call.index()).is_none() {
                continue; // spliced away by an earlier inline in this same pass
            }
            match try_inline_one(graph, call, callees, budget, &mut already_inlined) {
                Ok(()) => inlined += 1,
                Err(e) => {
                    log::warn!("{}", e);
                    errors.push(e);
                }
            }
        }

        log::debug!("inlining: inlined {} call site(s), {} skipped", inlined, errors.len());
        (inlined, errors)
    }
}

fn collect_call_sites(graph: &Graph) -> Vec<NodeId> {
    let rpo = RpoRegions::compute(graph);
    let mut calls = Vec::new();
    for &region in rpo.order() {
        let mut cur = region;
        while let Some(next) = graph.control_chain_next(cur) {
            if graph.node(next).opcode() == Opcode::Call {
                calls.push(next);
            }
            cur = next;
        }
    }
    calls
}

fn try_inline_one(
    graph: &mut Graph,
    call: NodeId,
    callees: &CalleeRegistry,
    budget: u32,
    already_inlined: &mut u32,
) -> PassResult<()> {
    let name = graph.node(call).call_name().to_string();
    let callee = callees.get(&name).ok_or_else(|| PassError::CalleeNotFound { call, name: name.clone() })?;

    if name.contains("__noinline__") {
        return Err(PassError::NoInlineMarker { call, callee: name });
    }

    let callee_size = callee.num_nodes() as u32;
    let would_be = *already_inlined + callee_size;
    if would_be > budget {
        return Err(PassError::InlineBudgetExceeded { call, would_be, budget });
    }

    inline(graph, call, callee);
    *already_inlined += callee_size;
    // `inline` rewires whatever the call's control user pointed at, but
    // never clears the call's own (now stale) control-user/data-user
    // bookkeeping; do that before handing it to the graveyard.
    graph.node_mut(call).clear_control_user();
    graph.node_mut(call).clear_data_users();
    graph.delete(call);
    Ok(())
}

fn inline(graph: &mut Graph, call: NodeId, callee: &Graph) {
    let callee_start = callee.start_region();
    let callee_end = callee.end_region();

    // Pass A: create a shell for every reachable callee node except Start,
    // End, and Parameters (which alias straight to the call's arguments).
    let mut clone_map: HashMap<NodeId, NodeId> = HashMap::new();
    for callee_node in callee.all_nodes() {
        let id = callee_node.id();
        if id == callee_start || id == callee_end {
            continue;
        }
        if callee_node.opcode() == Opcode::Parameter {
            let arg = graph.node(call).data_input(callee_node.param_index() as usize);
            clone_map.insert(id, arg);
            continue;
        }
        let new_id = graph.create_by_opcode(callee_node.opcode());
        graph.node_mut(new_id).set_ty(callee_node.ty());
        clone_scalar_payload(graph, new_id, callee_node);
        clone_map.insert(id, new_id);
    }

    let call_pred = graph.node(call).control_input();
    let original_succ = graph
        .node(call)
        .control_user()
        .expect("Call must chain to something before End");

    // Pass B: wire every cloned node's edges, translating ids through
    // `clone_map`. Nodes whose callee-side control predecessor was the
    // callee's `Start` splice directly onto the call site's predecessor.
    let mut cloned_returns: Vec<NodeId> = Vec::new();
    for callee_node in callee.all_nodes() {
        let id = callee_node.id();
        if id == callee_start || id == callee_end || callee_node.opcode() == Opcode::Parameter {
            continue;
        }
        let new_id = clone_map[&id];

        if callee_node.is_region() {
            for &pred in callee_node.raw_inputs() {
                let new_pred = clone_map[&pred];
                graph.add_region_predecessor(new_id, new_pred);
            }
            continue;
        }

        if callee_node.has_control_input() {
            let pred = callee_node.control_input();
            let new_pred = if pred == callee_start { call_pred } else { clone_map[&pred] };
            graph.set_control_input(new_id, new_pred);
        }

        for &data_in in callee_node.data_inputs() {
            let translated = clone_map[&data_in];
            graph.push_data_input(new_id, translated);
        }

        match callee_node.opcode() {
            Opcode::If => {
                if let Some(t) = callee_node.true_branch() {
                    graph.set_true_branch(new_id, clone_map[&t]);
                }
                if let Some(f) = callee_node.false_branch() {
                    graph.set_false_branch(new_id, clone_map[&f]);
                }
            }
            Opcode::Jump => {
                graph.set_jump_target(new_id, clone_map[&callee.jump_target(id)]);
            }
            Opcode::Return => {
                cloned_returns.push(new_id);
            }
            _ => {}
        }
    }

    match cloned_returns.len() {
        0 => {
            // A callee with no reachable return is void and falls straight
            // through; just splice the call out.
            graph.set_control_input(original_succ, call_pred);
        }
        1 => splice_single_return(graph, cloned_returns[0], call, original_succ),
        _ => splice_multi_return(graph, &cloned_returns, call, original_succ),
    }
}

fn clone_scalar_payload(graph: &mut Graph, new_id: NodeId, src: &crate::ir::Node) {
    match src.opcode() {
        Opcode::Constant => graph.node_mut(new_id).set_imm(src.imm()),
        Opcode::Compare => graph.node_mut(new_id).set_cc(src.cc()),
        Opcode::Call => graph.node_mut(new_id).set_call_name(src.call_name()),
        _ => {}
    }
}

/// Single-return splice: the return's value replaces the call's result
/// directly, and the return instruction is removed from the chain (its
/// predecessor now leads straight to whatever followed the call).
fn splice_single_return(graph: &mut Graph, ret: NodeId, call: NodeId, original_succ: NodeId) {
    if !graph.node(ret).data_inputs().is_empty() {
        let ret_value = graph.node(ret).data_input(0);
        graph.replace_data_users(ret_value, call);
    }
    let pred = graph.node(ret).control_input();
    graph.set_control_input(original_succ, pred);
    graph.delete(ret);
}

/// Multi-return splice: every cloned `Return` becomes an unconditional
/// jump into a synthesized merge region, and (if the callee returns a
/// value) a `Phi` in that region replaces the call's result.
fn splice_multi_return(graph: &mut Graph, returns: &[NodeId], call: NodeId, original_succ: NodeId) {
    let merge = graph.create_region();
    let mut phi = None;
    if !graph.node(returns[0]).data_inputs().is_empty() {
        let p = graph.create_phi();
        graph.set_control_input(p, merge);
        phi = Some(p);
    }

    for &ret in returns {
        graph.node_mut(ret).set_control_user(merge);
        graph.add_region_predecessor(merge, ret);
        if let Some(p) = phi {
            let value = graph.node(ret).data_input(0);
            graph.push_data_input(p, value);
        }
    }

    if let Some(p) = phi {
        graph.replace_data_users(p, call);
    }
    graph.set_control_input(original_succ, merge);
}
