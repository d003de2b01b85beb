//! Liveness analysis over a linearized, GCM-placed graph.
//!
//! Two phases. Phase A walks the linear region order once and stamps every
//! placed node with a `linear_number` (its global program-order position)
//! and a `life_number` (the point linear-scan reasons about): life advances
//! by 2 per real instruction, reserving the odd slot for a spill/fill move,
//! and block boundaries get their own +2 bump so a value live across a
//! block edge never aliases an in-block definition point. Phase B walks
//! regions in reverse linear order and, within each region, instructions in
//! reverse, building up append-only [`LiveInterval`]s the way a single
//! backward dataflow pass naturally does: a range only ever grows to cover
//! more of the program, it is never shrunk or deleted once recorded, except
//! for `trim_begin`, which narrows the *lower* bound once the backward walk
//! actually reaches a value's definition.
//!
//! A value live into a loop header must stay live for the loop's entire
//! body, since the back edge can hand control back to any program point
//! inside it; the final pass widens every such interval accordingly.

use std::collections::{HashMap, HashSet};

use crate::entity::NodeId;
use crate::ir::{Graph, Opcode};
use crate::linear_order::LinearOrder;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LiveRange {
    pub start: u32,
    pub end: u32,
}

impl LiveRange {
    pub fn contains(&self, point: u32) -> bool {
        self.start <= point && point < self.end
    }
}

/// The live range of one SSA value. Conceptually a single `[begin, end)`
/// span: `append` only ever merges a touching or overlapping range into it,
/// never starts a second fragment, and `trim_begin` only ever raises the
/// lower bound. A value that is defined but never used gets a zero-length
/// interval (`begin() == end()`) rather than no entry at all, so linear-scan
/// can still see it and skip it explicitly.
#[derive(Clone, Debug)]
pub struct LiveInterval {
    pub value: Option<NodeId>,
    range: Option<LiveRange>,
}

impl LiveInterval {
    fn new(value: NodeId) -> Self {
        LiveInterval { value: Some(value), range: None }
    }

    /// Merges `[start, end)` into the interval. A push that neither
    /// overlaps nor touches the existing range means backward liveness
    /// skipped over a gap it shouldn't have — fatal rather than silently
    /// fragmenting the interval.
    fn append(&mut self, start: u32, end: u32) {
        match &mut self.range {
            None => self.range = Some(LiveRange { start, end }),
            Some(r) => {
                assert!(
                    start <= r.end && end >= r.start,
                    "live-interval append with non-adjacent ranges: existing [{}, {}), new [{}, {})",
                    r.start,
                    r.end,
                    start,
                    end
                );
                r.start = r.start.min(start);
                r.end = r.end.max(end);
            }
        }
    }

    /// Raises the interval's lower bound to `n`, the value's definition
    /// point. Per-use appends conservatively start from the owning block's
    /// entry life, since the backward walk hasn't reached the definition
    /// yet; once it does, this narrows the bound. A value with no range at
    /// all yet (defined but never used) gets a fresh zero-length range here
    /// instead, so it still gets tracked rather than vanishing.
    fn trim_begin(&mut self, n: u32) {
        match &mut self.range {
            None => self.range = Some(LiveRange { start: n, end: n }),
            Some(r) => {
                if n > r.start {
                    r.start = n;
                }
            }
        }
    }

    pub fn begin(&self) -> u32 {
        self.range.map(|r| r.start).unwrap_or(0)
    }

    pub fn end(&self) -> u32 {
        self.range.map(|r| r.end).unwrap_or(0)
    }

    pub fn covers(&self, point: u32) -> bool {
        self.range.map(|r| r.contains(point)).unwrap_or(false)
    }

    /// Defined but never used: linear-scan sees it and assigns no location.
    pub fn is_zero_length(&self) -> bool {
        self.begin() == self.end()
    }
}

/// Per-region bookkeeping produced by Phase A and consumed by Phase B.
#[derive(Copy, Clone, Debug)]
struct BlockInfo {
    /// Life number at block entry.
    start: u32,
    /// Life number one past the block's end marker (raw end-of-instructions
    /// life plus 2, except for `End`, which has no marker of its own).
    end: u32,
    /// Life number assigned to this region's terminator (`If`/`Jump`/`Return`).
    terminator_life: u32,
}

pub struct LivenessAnalyzer {
    intervals: HashMap<NodeId, LiveInterval>,
    order: Vec<NodeId>,
}

impl LivenessAnalyzer {
    pub fn compute(graph: &mut Graph, order: &LinearOrder) -> Self {
        let blocks = number_instructions(graph, order);

        let mut intervals: HashMap<NodeId, LiveInterval> = HashMap::new();
        let mut live_in: HashMap<NodeId, HashSet<NodeId>> = HashMap::new();

        for &region in order.order().iter().rev() {
            let block = blocks[&region];
            let mut live: HashSet<NodeId> = HashSet::new();

            // Step 1: seed from successors' live-in, substituting Phi
            // operands that correspond to arriving from this region.
            for succ in graph.control_successors(region) {
                if let Some(succ_live_in) = live_in.get(&succ) {
                    for &v in succ_live_in {
                        let contributor = phi_operand_for_pred(graph, succ, v, region).unwrap_or(v);
                        live.insert(contributor);
                    }
                }
            }

            // Step 2: every seeded value is live across this entire region,
            // from its start up through the terminator.
            for &v in &live {
                intervals.entry(v).or_insert_with(|| LiveInterval::new(v)).append(block.start, block.terminator_life);
            }

            // Step 3: walk the region's placed nodes backward.
            let mut region_phis = Vec::new();
            let mut cursor = graph.node(region).last();
            while let Some(node) = cursor {
                let opcode = graph.node(node).opcode();
                if opcode == Opcode::Phi {
                    region_phis.push(node);
                }

                if opcode != Opcode::Jump {
                    let life = graph
                        .node(node)
                        .life_number()
                        .expect("GCM-placed node missing a life number");

                    if opcode.is_value() {
                        intervals.entry(node).or_insert_with(|| LiveInterval::new(node)).trim_begin(life);
                        live.remove(&node);
                    }

                    let inputs: Vec<NodeId> = graph.node(node).data_inputs().to_vec();
                    for input in inputs {
                        // Constants and Parameters live globally from their
                        // definition in Start; they don't need per-use
                        // range extension the way a block-local value does.
                        if matches!(graph.node(input).opcode(), Opcode::Constant | Opcode::Parameter) {
                            continue;
                        }
                        live.insert(input);
                        intervals.entry(input).or_insert_with(|| LiveInterval::new(input)).append(block.start, life);
                    }
                }

                cursor = graph.node(node).prev();
            }

            // Step 4: a region's own Phis are never live into that region.
            for phi in region_phis {
                live.remove(&phi);
            }

            live_in.insert(region, live);
        }

        extend_across_loops(graph, &blocks, &live_in, &mut intervals);

        LivenessAnalyzer {
            intervals,
            order: order.order().to_vec(),
        }
    }

    pub fn interval(&self, value: NodeId) -> Option<&LiveInterval> {
        self.intervals.get(&value)
    }

    pub fn intervals(&self) -> &HashMap<NodeId, LiveInterval> {
        &self.intervals
    }

    pub fn regions_in_order(&self) -> &[NodeId] {
        &self.order
    }
}

/// Phase A. Stamps every placed node with a linear number and a life number
/// and returns each region's `{start, end, terminator_life}`.
fn number_instructions(graph: &mut Graph, order: &LinearOrder) -> HashMap<NodeId, BlockInfo> {
    let mut linear: u32 = 0;
    let mut life: u32 = 0;
    let mut blocks = HashMap::new();
    let end_region = graph.end_region();

    for &region in order.order() {
        let start = life;
        let mut terminator_life = start;

        let mut cursor = graph.node(region).first();
        while let Some(node) = cursor {
            let opcode = graph.node(node).opcode();

            if opcode == Opcode::Jump {
                graph.node_mut(node).set_life_number(life);
                terminator_life = life;
                break;
            }

            graph.node_mut(node).set_linear_number(linear);
            linear += 1;
            if opcode != Opcode::Phi {
                life += 2;
            }
            graph.node_mut(node).set_life_number(life);
            if opcode == Opcode::If || opcode == Opcode::Return {
                terminator_life = life;
            }

            cursor = graph.node(node).next();
        }

        let end = if region == end_region {
            life
        } else {
            life + 2
        };
        life = end;
        blocks.insert(region, BlockInfo { start, end, terminator_life });
    }

    blocks
}

/// For a value `v` live into `succ`, if `v` is actually a `Phi` owned by
/// `succ`, returns the operand that corresponds to arriving from `pred`
/// rather than the phi's merged identity (which has no single definition
/// point of its own on that edge).
fn phi_operand_for_pred(graph: &Graph, succ: NodeId, v: NodeId, pred: NodeId) -> Option<NodeId> {
    if graph.node(v).opcode() != Opcode::Phi || graph.node(v).region() != Some(succ) {
        return None;
    }
    let preds = graph.node(succ).raw_inputs();
    let slot = preds.iter().position(|&branch| graph.owning_region_backward(branch) == pred)?;
    Some(graph.node(v).data_input(slot))
}

/// Phase B step 5: a value live into a loop header must stay live across
/// the header's entire body, since the back edge can resume control at any
/// point inside it.
fn extend_across_loops(
    graph: &Graph,
    blocks: &HashMap<NodeId, BlockInfo>,
    live_in: &HashMap<NodeId, HashSet<NodeId>>,
    intervals: &mut HashMap<NodeId, LiveInterval>,
) {
    for l in graph.loops() {
        let header = match l.header() {
            Some(h) => h,
            None => continue,
        };
        if l.body().is_empty() {
            continue;
        }

        let header_block = match blocks.get(&header) {
            Some(b) => *b,
            None => continue,
        };
        let max_body_end = match l.body().iter().filter_map(|r| blocks.get(r)).map(|b| b.end).max() {
            Some(e) => e,
            None => continue,
        };

        let live_at_header: Vec<NodeId> = live_in.get(&header).map(|s| s.iter().copied().collect()).unwrap_or_default();
        for value in live_at_header {
            intervals
                .entry(value)
                .or_insert_with(|| LiveInterval::new(value))
                .append(header_block.start, max_body_end);
        }
    }
}
