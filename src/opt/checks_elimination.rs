//! Redundant `NullCheck`/`BoundsCheck` elimination.
//!
//! A check is redundant if some dominating region already performed the
//! identical check (same checked reference, same index for bounds checks).
//! Walking the dominator tree top-down with a scoped "available checks" map
//! finds every such case in one pass: entries made available while
//! descending into a child are removed again once that child's subtree is
//! done, so a check never leaks into a sibling region it doesn't dominate.

use std::collections::HashMap;

use crate::dominator_tree::DomTree;
use crate::entity::NodeId;
use crate::ir::{Graph, Opcode};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum CheckKey {
    Null(NodeId),
    Bounds(NodeId, NodeId),
}

pub struct ChecksElimination;

impl ChecksElimination {
    /// Requires `doms` to already reflect `graph`'s current control
    /// structure (run [`DomTree::compute`] first).
    pub fn run(graph: &mut Graph, doms: &DomTree) -> u32 {
        let mut available: HashMap<CheckKey, NodeId> = HashMap::new();
        let mut count = 0;
        visit(graph, doms, graph.start_region(), &mut available, &mut count);
        log::debug!("checks elimination: removed {} redundant check(s)", count);
        count
    }
}

fn visit(
    graph: &mut Graph,
    doms: &DomTree,
    region: NodeId,
    available: &mut HashMap<CheckKey, NodeId>,
    count: &mut u32,
) {
    let mut added = Vec::new();
    let mut cur = region;
    loop {
        let next = match graph.control_chain_next(cur) {
            Some(n) => n,
            None => break,
        };
        if let Some(key) = check_key(graph, next) {
            if let Some(&existing) = available.get(&key) {
                graph.replace_data_users(existing, next);
                splice_out(graph, next);
                *count += 1;
                continue;
            } else {
                available.insert(key, next);
                added.push(key);
            }
        }
        cur = next;
    }

    let children = doms.immediate_children(graph, region);
    for child in children {
        visit(graph, doms, child, available, count);
    }

    for key in added {
        available.remove(&key);
    }
}

fn check_key(graph: &Graph, node: NodeId) -> Option<CheckKey> {
    match graph.node(node).opcode() {
        Opcode::NullCheck => Some(CheckKey::Null(graph.node(node).data_input(0))),
        Opcode::BoundsCheck => Some(CheckKey::Bounds(
            graph.node(node).data_input(0),
            graph.node(node).data_input(1),
        )),
        _ => None,
    }
}

/// Removes `node` from the control chain, rewiring its predecessor directly
/// to its successor. `node` is left in the arena, orphaned.
fn splice_out(graph: &mut Graph, node: NodeId) {
    let pred = graph.node(node).control_input();
    if let Some(succ) = graph.node(node).control_user() {
        graph.set_control_input(succ, pred);
    }
    graph.node_mut(node).clear_control_user();
}
