mod support;

use midcore::dominator_tree::DomTree;
use midcore::ir::{ConditionCode, Graph};
use midcore::rpo::RpoRegions;

/// `Start -> If -> {B, C} -> (Jump) -> M -> Return`, the smallest diamond.
fn diamond() -> (Graph, midcore::entity::NodeId, midcore::entity::NodeId, midcore::entity::NodeId, midcore::entity::NodeId) {
    let mut g = Graph::new();
    g.set_method_name("diamond");
    let start = g.start_region();

    let param = g.create_parameter(0);
    let zero = g.create_constant(0);
    let cmp = g.create_compare(ConditionCode::Gt, param, zero);
    let if_node = g.create_if();
    g.set_control_input(if_node, start);
    g.set_data_input(if_node, 0, cmp);

    let b = g.create_region();
    let c = g.create_region();
    g.set_true_branch(if_node, b);
    g.set_false_branch(if_node, c);

    let jb = g.create_jump();
    g.set_control_input(jb, b);
    let jc = g.create_jump();
    g.set_control_input(jc, c);

    let m = g.create_region();
    g.set_jump_target(jb, m);
    g.set_jump_target(jc, m);

    let ret = g.create_return();
    g.set_control_input(ret, m);
    let result = g.create_constant(1);
    g.set_data_input(ret, 0, result);
    g.wire_return_to_end(ret);

    (g, b, c, m, start)
}

#[test]
fn rpo_regions_respects_predecessor_order() {
    let (g, b, c, m, start) = diamond();
    let rpo = RpoRegions::compute(&g);
    let order = rpo.order();

    let pos = |n| order.iter().position(|&r| r == n).unwrap();
    assert_eq!(pos(start), 0);
    assert!(pos(b) < pos(m));
    assert!(pos(c) < pos(m));
    assert!(pos(m) < pos(g.end_region()));
    assert_eq!(order.len(), 5);
}

#[test]
fn dominator_tree_of_a_diamond() {
    let (mut g, b, c, m, start) = diamond();
    let doms = DomTree::compute(&mut g);

    assert_eq!(doms.idom(b), Some(start));
    assert_eq!(doms.idom(c), Some(start));
    assert_eq!(doms.idom(m), Some(start));
    assert_eq!(doms.idom(g.end_region()), Some(m));

    assert!(doms.dominates(start, m));
    assert!(!doms.dominates(b, m));
    assert!(!doms.dominates(c, m));
    assert!(doms.dominates(start, start));
}

#[test]
fn dump_dominators_lists_each_region_once() {
    let (mut g, ..) = diamond();
    DomTree::compute(&mut g);
    let dump = midcore::write::dump_dominators(&g);
    assert!(dump.starts_with("Dominations in graph:\n"));
    assert_eq!(dump.lines().count(), 1 + g.all_regions().len());
}
