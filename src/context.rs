//! Ties the IR and every analysis/pass together into one documented
//! pipeline, the way `cranelift_codegen::Context` bundles a `Function` with
//! its `ControlFlowGraph`/`DominatorTree`/register allocation state.

use crate::dominator_tree::DomTree;
use crate::gcm::Gcm;
use crate::ir::Graph;
use crate::linear_order::LinearOrder;
use crate::loop_analysis::LoopAnalysis;
use crate::opt::{CalleeRegistry, ChecksElimination, Inlining, Peepholes};
use crate::regalloc::{LinearScanRegAlloc, LivenessAnalyzer};
use crate::result::PassError;

/// Tunable knobs for the passes a [`Context`] runs.
#[derive(Clone, Debug)]
pub struct Config {
    pub num_registers: u32,
    pub register_name_prefix: String,
    pub spill_slot_name_prefix: String,
    pub inline_budget: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            num_registers: 3,
            register_name_prefix: "r".to_string(),
            spill_slot_name_prefix: "slot".to_string(),
            inline_budget: 20,
        }
    }
}

/// Owns a graph plus whichever analyses have been run on it so far. Each
/// `run_*` method is a thin wrapper that panics if its prerequisite analysis
/// hasn't been computed yet — the same "call things in the right order or
/// it's a logic error" discipline the rest of this crate uses.
pub struct Context {
    graph: Graph,
    config: Config,
    dom_tree: Option<DomTree>,
    linear_order: Option<LinearOrder>,
    liveness: Option<LivenessAnalyzer>,
    regalloc: Option<LinearScanRegAlloc>,
}

impl Context {
    pub fn new(graph: Graph, config: Config) -> Self {
        Context {
            graph,
            config,
            dom_tree: None,
            linear_order: None,
            liveness: None,
            regalloc: None,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dom_tree(&self) -> Option<&DomTree> {
        self.dom_tree.as_ref()
    }

    pub fn linear_order(&self) -> Option<&LinearOrder> {
        self.linear_order.as_ref()
    }

    pub fn liveness(&self) -> Option<&LivenessAnalyzer> {
        self.liveness.as_ref()
    }

    pub fn regalloc(&self) -> Option<&LinearScanRegAlloc> {
        self.regalloc.as_ref()
    }

    pub fn run_peepholes(&mut self) -> u32 {
        Peepholes::run(&mut self.graph)
    }

    pub fn run_inlining(&mut self, callees: &CalleeRegistry) -> (u32, Vec<PassError>) {
        Inlining::run(&mut self.graph, callees, self.config.inline_budget)
    }

    pub fn run_dominators(&mut self) {
        self.dom_tree = Some(DomTree::compute(&mut self.graph));
    }

    pub fn run_loop_analysis(&mut self) {
        let doms = self.dom_tree.as_ref().expect("run_dominators must run before run_loop_analysis");
        LoopAnalysis::compute(&mut self.graph, doms);
    }

    pub fn run_checks_elimination(&mut self) -> u32 {
        let doms = self.dom_tree.as_ref().expect("run_dominators must run before run_checks_elimination");
        ChecksElimination::run(&mut self.graph, doms)
    }

    pub fn run_gcm(&mut self) {
        Gcm::run(&mut self.graph);
    }

    pub fn run_linear_order(&mut self) {
        assert!(self.graph.is_placed(), "run_gcm must run before run_linear_order");
        self.linear_order = Some(LinearOrder::compute(&self.graph));
    }

    pub fn run_liveness(&mut self) {
        let order = self.linear_order.take().expect("run_linear_order must run before run_liveness");
        self.liveness = Some(LivenessAnalyzer::compute(&mut self.graph, &order));
        self.linear_order = Some(order);
    }

    pub fn run_register_allocation(&mut self) {
        let liveness = self.liveness.as_ref().expect("run_liveness must run before run_register_allocation");
        self.regalloc = Some(LinearScanRegAlloc::run_with_names(
            liveness,
            self.config.num_registers,
            &self.config.register_name_prefix,
            &self.config.spill_slot_name_prefix,
        ));
    }

    /// Runs every pass in the only order that satisfies their
    /// prerequisites: inline call sites, simplify what that exposes,
    /// compute dominance and loop structure (needed by check elimination
    /// and, eventually, smarter scheduling), schedule, then allocate.
    pub fn run_full_pipeline(&mut self, callees: &CalleeRegistry) -> Vec<PassError> {
        let (_, inline_errors) = self.run_inlining(callees);
        self.run_peepholes();
        self.run_dominators();
        self.run_checks_elimination();
        self.run_loop_analysis();
        self.run_gcm();
        self.run_linear_order();
        self.run_liveness();
        self.run_register_allocation();
        inline_errors
    }
}
