//! Reverse-postorder traversals over a graph's regions and over its full
//! node dependency DFS.

use smallvec::SmallVec;

use crate::entity::NodeId;
use crate::ir::Graph;
use crate::marker::Marker;

/// Reverse postorder over control regions only, reached by walking each
/// region's terminator's successors (`Graph::control_successors`).
pub struct RpoRegions {
    order: Vec<NodeId>,
}

impl RpoRegions {
    /// Computes RPO starting from `graph`'s `Start` region.
    pub fn compute(graph: &Graph) -> Self {
        let mut visited = Marker::new(graph);
        let mut postorder = Vec::new();
        let start = graph.start_region();
        let mut stack: Vec<(NodeId, usize)> = vec![(start, 0)];
        visited.set_marker(start);

        while let Some((region, next_child)) = stack.pop() {
            let succs = graph.control_successors(region);
            if next_child < succs.len() {
                stack.push((region, next_child + 1));
                let child = succs[next_child];
                if visited.try_set_marker(child) {
                    stack.push((child, 0));
                }
            } else {
                postorder.push(region);
            }
        }

        postorder.reverse();
        RpoRegions { order: postorder }
    }

    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn position(&self, region: NodeId) -> Option<usize> {
        self.order.iter().position(|&r| r == region)
    }
}

/// Reverse postorder over every reachable node (control and data), starting
/// the dependency DFS from `End` and following every raw input backward.
pub struct RpoNodes {
    order: Vec<NodeId>,
}

impl RpoNodes {
    pub fn compute(graph: &Graph) -> Self {
        let mut visited = Marker::new(graph);
        let mut postorder = Vec::new();
        let end = graph.end_region();
        let mut stack: Vec<(NodeId, usize)> = vec![(end, 0)];
        visited.set_marker(end);

        while let Some((node, next_input)) = stack.pop() {
            let inputs: SmallVec<[NodeId; 4]> = graph.node(node).raw_inputs().iter().copied().collect();
            if next_input < inputs.len() {
                stack.push((node, next_input + 1));
                let dep = inputs[next_input];
                if visited.try_set_marker(dep) {
                    stack.push((dep, 0));
                }
            } else {
                postorder.push(node);
            }
        }

        postorder.reverse();
        RpoNodes { order: postorder }
    }

    pub fn order(&self) -> &[NodeId] {
        &self.order
    }
}
