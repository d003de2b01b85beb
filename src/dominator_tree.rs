//! Dominator tree construction.
//!
//! Deliberately the textbook O(V·(V+E)) algorithm rather than
//! Cooper-Harvey-Kennedy: for every candidate region, remove it from the
//! control graph and see which other regions fall out of reachability from
//! `Start`. Slower than a fixed-point iterative scheme, but it is what the
//! source's own dominator pass does, and the regions in a single method body
//! are few enough that the asymptotics never matter.

use std::collections::HashMap;

use crate::entity::NodeId;
use crate::ir::Graph;
use crate::rpo::RpoRegions;

/// Dominance relation over a graph's control regions, computed once and
/// cached; also writes `dominator`/`dominated` back onto each region's
/// [`crate::ir::RegionData`].
pub struct DomTree {
    idom: HashMap<NodeId, NodeId>,
}

impl DomTree {
    /// Computes dominance and records it on `graph`'s regions.
    pub fn compute(graph: &mut Graph) -> Self {
        let rpo = RpoRegions::compute(graph);
        let regions: Vec<NodeId> = rpo.order().to_vec();
        let start = graph.start_region();

        // doms[n] = set of every region whose removal disconnects n from
        // start (n's strict dominators).
        let mut doms: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for &n in &regions {
            doms.insert(n, Vec::new());
        }

        for &candidate in &regions {
            if candidate == start {
                continue;
            }
            let reachable = reachable_excluding(graph, &regions, start, candidate);
            for &n in &regions {
                if n != candidate && !reachable.contains(&n) {
                    doms.get_mut(&n).unwrap().push(candidate);
                }
            }
        }

        // The immediate dominator is whichever strict dominator is itself
        // dominated by every other strict dominator of n, i.e. the one with
        // the largest dominator set of its own.
        let mut idom = HashMap::new();
        for &n in &regions {
            if n == start {
                continue;
            }
            let candidates = &doms[&n];
            if candidates.is_empty() {
                continue;
            }
            let best = *candidates
                .iter()
                .max_by_key(|&&c| doms[&c].len())
                .expect("non-empty dominator set");
            idom.insert(n, best);
        }

        for (&n, &d) in &idom {
            graph.node_mut(n).set_dominator(d);
        }

        // `dominated` is the transitive closure (every region this one
        // strictly dominates, not just its immediate children in the
        // dominator tree), recorded in RPO order of the dominated region.
        for &n in &regions {
            if n == start {
                continue;
            }
            for &d in &doms[&n] {
                graph.node_mut(d).add_dominated(n);
            }
        }

        DomTree { idom }
    }

    pub fn idom(&self, n: NodeId) -> Option<NodeId> {
        self.idom.get(&n).copied()
    }

    /// `region`'s immediate children in the dominator tree, i.e. regions
    /// whose *immediate* dominator is `region` — unlike
    /// [`crate::ir::RegionData::dominated`], which is the full transitive
    /// set. Order follows `graph.all_regions()` (arena order).
    pub fn immediate_children(&self, graph: &Graph, region: NodeId) -> Vec<NodeId> {
        graph
            .all_regions()
            .iter()
            .copied()
            .filter(|&n| self.idom(n) == Some(region))
            .collect()
    }

    /// Does `a` dominate `b`, reflexively (every region dominates itself)?
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        let mut cur = b;
        loop {
            if cur == a {
                return true;
            }
            match self.idom(cur) {
                Some(next) => cur = next,
                None => return false,
            }
        }
    }
}

fn reachable_excluding(
    graph: &Graph,
    regions: &[NodeId],
    start: NodeId,
    excluded: NodeId,
) -> std::collections::HashSet<NodeId> {
    let mut seen = std::collections::HashSet::new();
    if start == excluded {
        return seen;
    }
    let mut stack = vec![start];
    seen.insert(start);
    while let Some(r) = stack.pop() {
        for succ in graph.control_successors(r) {
            if succ == excluded || seen.contains(&succ) {
                continue;
            }
            if !regions.contains(&succ) {
                continue;
            }
            seen.insert(succ);
            stack.push(succ);
        }
    }
    seen
}
