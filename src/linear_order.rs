//! Computes a single linear ordering of a graph's regions for code layout.
//!
//! Each region becomes "ready" once every non-back-edge predecessor has
//! been visited, except loop headers, which become ready as soon as any
//! predecessor (their pre-header) has been visited — waiting on the
//! back-edge predecessor too would deadlock. `If` successors are pushed
//! true-then-false so false is popped (and thus laid out) first,
//! immediately after the branch, leaving the true edge as the one that
//! needs an explicit jump.

use crate::entity::NodeId;
use crate::ir::{Graph, Opcode};
use crate::marker::Marker;

pub struct LinearOrder {
    order: Vec<NodeId>,
}

impl LinearOrder {
    pub fn compute(graph: &Graph) -> Self {
        let mut order = Vec::new();
        let mut visited = Marker::new(graph);
        let mut stack = vec![graph.start_region()];

        while let Some(region) = stack.pop() {
            if visited.is_marked(region) {
                continue;
            }
            if !graph.node(region).is_loop_header() && !all_preds_visited(graph, region, &visited) {
                continue;
            }
            visited.set_marker(region);
            order.push(region);

            let term = graph.terminator_of(region);
            match graph.node(term).opcode() {
                Opcode::If => {
                    if let Some(t) = graph.node(term).true_branch() {
                        stack.push(t);
                    }
                    if let Some(f) = graph.node(term).false_branch() {
                        stack.push(f);
                    }
                }
                Opcode::Jump => stack.push(graph.jump_target(term)),
                Opcode::Return => stack.push(graph.end_region()),
                _ => unreachable!("terminator_of returned a non-terminator"),
            }
        }

        let total_regions = graph.all_regions().len();
        assert!(
            order.len() == total_regions,
            "control flow could not be linearized: irreducible region unreachable through any ready predecessor"
        );

        LinearOrder { order }
    }

    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn position(&self, region: NodeId) -> Option<usize> {
        self.order.iter().position(|&r| r == region)
    }
}

fn all_preds_visited(graph: &Graph, region: NodeId, visited: &Marker) -> bool {
    graph
        .predecessor_regions(region)
        .iter()
        .all(|&p| visited.is_marked(p))
}
