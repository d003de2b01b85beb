//! Textual dumps of a graph, for tests and ad-hoc debugging.
//!
//! Three views: the unscheduled node list (inputs/users only), the
//! scheduled view grouped by region once GCM has run, and the dominator
//! tree.

use std::fmt::Write as _;

use crate::ir::{Graph, Node, Opcode};

fn users_suffix(node: &Node) -> String {
    let mut users: Vec<String> = Vec::new();
    if let Some(u) = node.control_user() {
        users.push(format!("{}", u));
    }
    users.extend(node.data_users().iter().map(|u| format!("{}", u)));
    if users.is_empty() {
        "NOT_SET".to_string()
    } else {
        format!("-> {}", users.join(", "))
    }
}

fn inputs_suffix(graph: &Graph, node: &Node) -> String {
    match node.opcode() {
        Opcode::If => format!(
            "T:{}, F:{}",
            node.true_branch().map(|t| t.to_string()).unwrap_or_else(|| "NOT_SET".to_string()),
            node.false_branch().map(|f| f.to_string()).unwrap_or_else(|| "NOT_SET".to_string()),
        ),
        Opcode::Phi => {
            let region = node.control_input();
            let preds = graph.node(region).raw_inputs();
            let args: Vec<String> = node
                .data_inputs()
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let pred_region = preds
                        .get(i)
                        .map(|&p| graph.owning_region_backward(p))
                        .unwrap_or(region);
                    format!("{}(R{})", v, pred_region)
                })
                .collect();
            args.join(", ")
        }
        Opcode::Constant => format!("#{}", node.imm()),
        Opcode::Parameter => format!("arg{}", node.param_index()),
        Opcode::Call => format!("\"{}\"({})", node.call_name(), fmt_list(node.data_inputs())),
        _ if node.is_region() => fmt_list(node.raw_inputs()),
        _ => fmt_list(node.raw_inputs()),
    }
}

fn fmt_list(ids: &[crate::entity::NodeId]) -> String {
    ids.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ")
}

/// Bare numerals, no `v` prefix — used for the region-id columns in
/// `dump_dominators`, which the `v`-prefixed node dumps don't use.
fn fmt_list_bare(ids: &[crate::entity::NodeId]) -> String {
    ids.iter().map(|n| n.index().to_string()).collect::<Vec<_>>().join(", ")
}

/// One line per reachable node: id, type, opcode, inputs, users. Order
/// follows arena index, which is creation order.
pub fn dump_unscheduled(graph: &Graph) -> String {
    let mut out = String::new();
    writeln!(out, "Method: {}", graph.method_name()).unwrap();
    writeln!(out, "Instructions:").unwrap();
    for node in graph.all_nodes() {
        writeln!(
            out,
            "{:>4}.{:<4}{:<10} {}  {}",
            node.id().index(),
            node.ty(),
            node.opcode(),
            inputs_suffix(graph, node),
            users_suffix(node)
        )
        .unwrap();
    }
    out
}

/// Same per-node line, but grouped by region in placed order; requires
/// `graph.is_placed()`.
pub fn dump_scheduled(graph: &Graph) -> String {
    assert!(graph.is_placed(), "dump_scheduled requires GCM to have run");
    let mut out = String::new();
    writeln!(out, "Method: {}", graph.method_name()).unwrap();
    for &region in graph.all_regions() {
        writeln!(out, "Region {}:", region).unwrap();
        let mut cursor = graph.node(region).first();
        while let Some(id) = cursor {
            let node = graph.node(id);
            writeln!(
                out,
                "{:>4}.{:<4}{:<10} {}  {}",
                node.id().index(),
                node.ty(),
                node.opcode(),
                inputs_suffix(graph, node),
                users_suffix(node)
            )
            .unwrap();
            cursor = node.next();
        }
    }
    out
}

/// `"Dominations in graph:"` followed by, for every region in arena order,
/// its immediate dominator and the regions it immediately dominates.
pub fn dump_dominators(graph: &Graph) -> String {
    let mut out = String::new();
    writeln!(out, "Dominations in graph:").unwrap();
    for &region in graph.all_regions() {
        let node = graph.node(region);
        let dom = node.dominator().map(|d| d.index().to_string()).unwrap_or_default();
        let dominated = fmt_list_bare(node.dominated());
        writeln!(out, "{:>4}) {} -> {}", region.index(), dom, dominated).unwrap();
    }
    out
}
