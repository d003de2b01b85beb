//! Global code motion: schedules every data node into a control region.
//!
//! `Constant` and `Parameter` are pinned to `Start`; every other data node
//! is placed in the region of its first encountered use, walked in RPO
//! region order and, within a region, in control-chain program order. This
//! is the simple "schedule early, never reschedule for loop invariance"
//! policy (§5 simplification): no sinking/hoisting across loop bodies.

use smallvec::SmallVec;

use crate::entity::NodeId;
use crate::ir::{Graph, Opcode};
use crate::rpo::RpoRegions;

pub struct Gcm;

impl Gcm {
    pub fn run(graph: &mut Graph) {
        graph.reset_placement();
        let rpo = RpoRegions::compute(graph);

        for &region in rpo.order() {
            let mut cur = region;
            loop {
                match graph.control_chain_next(cur) {
                    Some(next) => {
                        place_chain_member(graph, next, region);
                        cur = next;
                    }
                    None => break,
                }
            }
        }

        debug_assert!(
            graph.all_nodes().all(|n| n.is_region() || n.is_placed()),
            "GCM left a reachable data node unscheduled"
        );
        graph.set_placed();
    }
}

/// Places `node`'s data inputs before `node` itself, so every value a chain
/// member reads is already placed earlier in program order.
fn place_chain_member(graph: &mut Graph, node: NodeId, region: NodeId) {
    schedule_data_inputs(graph, node, region);
    graph.push_back_inst(region, node);
}

fn schedule_data_inputs(graph: &mut Graph, node: NodeId, region: NodeId) {
    let inputs: SmallVec<[NodeId; 4]> = SmallVec::from_vec(graph.node(node).data_inputs().to_vec());
    for input in inputs {
        if graph.node(input).is_placed() {
            continue;
        }
        match graph.node(input).opcode() {
            Opcode::Constant | Opcode::Parameter => {
                let start = graph.start_region();
                if !graph.node(input).is_placed() {
                    graph.push_back_inst(start, input);
                }
            }
            _ => {
                // Post-order: this input's own inputs go first, then it.
                schedule_data_inputs(graph, input, region);
                if !graph.node(input).is_placed() {
                    graph.push_back_inst(region, input);
                }
            }
        }
    }
}
