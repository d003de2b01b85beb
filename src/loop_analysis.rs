//! Natural-loop discovery: back-edge detection, loop body population, and
//! loop nesting.

use std::collections::{HashMap, HashSet};

use crate::dominator_tree::DomTree;
use crate::entity::{LoopId, NodeId};
use crate::ir::Graph;
use crate::rpo::RpoRegions;

/// One entry in a graph's loop forest. Loop id 0 is always the synthetic
/// root, standing in for "outside every real loop" so every region has a
/// loop parent to query without special-casing `None`.
#[derive(Clone, Debug)]
pub struct Loop {
    id: LoopId,
    header: Option<NodeId>,
    parent: Option<LoopId>,
    depth: u32,
    body: Vec<NodeId>,
    is_irreducible: bool,
}

impl Loop {
    pub fn id(&self) -> LoopId {
        self.id
    }

    /// `None` only for the synthetic root.
    pub fn header(&self) -> Option<NodeId> {
        self.header
    }

    pub fn parent(&self) -> Option<LoopId> {
        self.parent
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn body(&self) -> &[NodeId] {
        &self.body
    }

    pub fn is_irreducible(&self) -> bool {
        self.is_irreducible
    }
}

/// Computes the loop forest and writes `loop_id`/`is_loop_header` back onto
/// each region.
pub struct LoopAnalysis;

impl LoopAnalysis {
    pub fn compute(graph: &mut Graph, doms: &DomTree) {
        graph.clear_loops();
        let rpo = RpoRegions::compute(graph);
        let regions: Vec<NodeId> = rpo.order().to_vec();

        let back_edges = find_back_edges(graph, &regions);

        // Merge back-edges that share a header into one natural loop body;
        // a header whose own dominance check fails for *any* of its
        // back-edges is irreducible.
        let mut by_header: HashMap<NodeId, (Vec<NodeId>, bool)> = HashMap::new();
        for (src, header) in back_edges {
            let reducible = doms.dominates(header, src);
            let entry = by_header.entry(header).or_insert_with(|| (Vec::new(), true));
            entry.0.push(src);
            entry.1 = entry.1 && reducible;
        }

        struct Natural {
            header: NodeId,
            body: HashSet<NodeId>,
            irreducible: bool,
        }
        let mut naturals = Vec::new();
        for (header, (sources, reducible)) in by_header {
            let mut body = HashSet::new();
            body.insert(header);
            let mut worklist: Vec<NodeId> = sources.clone();
            while let Some(n) = worklist.pop() {
                if n == header {
                    continue;
                }
                if !body.insert(n) {
                    continue;
                }
                for pred in graph.predecessor_regions(n) {
                    worklist.push(pred);
                }
            }
            naturals.push(Natural {
                header,
                body,
                irreducible: !reducible,
            });
        }

        // Root loop spans every region; every real loop nests under it by
        // default unless a smaller enclosing loop claims it.
        let root_id = graph.push_loop(Loop {
            id: LoopId::ROOT,
            header: None,
            parent: None,
            depth: 0,
            body: regions.clone(),
            is_irreducible: false,
        });
        graph.set_root_loop(root_id);

        // Process outer loops before inner ones so a loop's parent search
        // only ever looks at already-created, strictly larger loops.
        naturals.sort_by_key(|n| std::cmp::Reverse(n.body.len()));

        let mut loop_ids: Vec<LoopId> = Vec::new();
        for nat in &naturals {
            let mut body: Vec<NodeId> = regions
                .iter()
                .copied()
                .filter(|r| nat.body.contains(r))
                .collect();
            body.sort_by_key(|&r| r.index());
            let id = graph.push_loop(Loop {
                id: LoopId(0),
                header: Some(nat.header),
                parent: Some(root_id),
                depth: 1,
                body,
                is_irreducible: nat.irreducible,
            });
            graph.loop_mut(id).id = id;
            loop_ids.push(id);
        }

        // Parent = smallest already-placed loop (besides root) whose body
        // contains this loop's header.
        for &id in &loop_ids {
            let header = graph.loop_by_id(id).header.unwrap();
            let mut best: Option<LoopId> = None;
            for &cand in &loop_ids {
                if cand == id {
                    continue;
                }
                if graph.loop_by_id(cand).body.contains(&header) {
                    let smaller = match best {
                        None => true,
                        Some(b) => graph.loop_by_id(cand).body.len() < graph.loop_by_id(b).body.len(),
                    };
                    if smaller {
                        best = Some(cand);
                    }
                }
            }
            graph.loop_mut(id).parent = Some(best.unwrap_or(root_id));
        }

        // Depths: iterate to a fixpoint (loop count per method is tiny).
        loop {
            let mut changed = false;
            for &id in &loop_ids {
                let parent = graph.loop_by_id(id).parent.unwrap();
                let parent_depth = graph.loop_by_id(parent).depth;
                let want = parent_depth + 1;
                if graph.loop_by_id(id).depth != want {
                    graph.loop_mut(id).depth = want;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        // Assign each region to its innermost containing loop.
        for &region in &regions {
            let mut innermost = root_id;
            for &id in &loop_ids {
                if graph.loop_by_id(id).body.contains(&region)
                    && graph.loop_by_id(id).body.len() < graph.loop_by_id(innermost).body.len()
                {
                    innermost = id;
                }
            }
            graph.node_mut(region).set_loop(innermost);
        }
        for &id in &loop_ids {
            let header = graph.loop_by_id(id).header.unwrap();
            graph.node_mut(header).set_loop_header();
        }
    }
}

fn find_back_edges(graph: &Graph, regions: &[NodeId]) -> Vec<(NodeId, NodeId)> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Unvisited,
        OnStack,
        Done,
    }
    let mut state: HashMap<NodeId, State> = regions.iter().map(|&r| (r, State::Unvisited)).collect();
    let mut back_edges = Vec::new();
    let start = graph.start_region();

    struct Frame {
        node: NodeId,
        succs: smallvec::SmallVec<[NodeId; 2]>,
        next: usize,
    }
    let mut stack = vec![Frame {
        node: start,
        succs: graph.control_successors(start),
        next: 0,
    }];
    state.insert(start, State::OnStack);

    while !stack.is_empty() {
        let top = stack.len() - 1;
        if stack[top].next >= stack[top].succs.len() {
            state.insert(stack[top].node, State::Done);
            stack.pop();
            continue;
        }
        let node = stack[top].node;
        let succ = stack[top].succs[stack[top].next];
        stack[top].next += 1;
        if succ == graph.end_region() {
            continue;
        }
        match state.get(&succ).copied().unwrap_or(State::Unvisited) {
            State::Unvisited => {
                state.insert(succ, State::OnStack);
                let succs = graph.control_successors(succ);
                stack.push(Frame { node: succ, succs, next: 0 });
            }
            State::OnStack => {
                back_edges.push((node, succ));
            }
            State::Done => {}
        }
    }
    back_edges
}
