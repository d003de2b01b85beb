mod support;

use midcore::dominator_tree::DomTree;
use midcore::ir::{Graph, Opcode};
use midcore::opt::ChecksElimination;

/// `Start -> NullCheck(r) -> NullCheck(r) -> Return <second check>`; the
/// second check is redundant and should be spliced out of the control chain,
/// with its users redirected to the first.
fn duplicate_null_checks() -> Graph {
    let mut g = Graph::new();
    g.set_method_name("duplicate_null_checks");
    let start = g.start_region();

    let r = g.create_parameter(0);

    let nc1 = g.create_null_check();
    g.set_control_input(nc1, start);
    g.push_data_input(nc1, r);

    let nc2 = g.create_null_check();
    g.set_control_input(nc2, nc1);
    g.push_data_input(nc2, r);

    let ret = g.create_return();
    g.set_control_input(ret, nc2);
    g.set_data_input(ret, 0, nc2);
    g.wire_return_to_end(ret);

    g
}

#[test]
fn redundant_null_check_is_eliminated() {
    let mut g = duplicate_null_checks();
    let doms = DomTree::compute(&mut g);

    let removed = ChecksElimination::run(&mut g, &doms);
    assert_eq!(removed, 1);

    let end = g.end_region();
    let ret = g.node(end).raw_inputs()[0];

    let value = g.node(ret).data_input(0);
    assert_eq!(g.node(value).opcode(), Opcode::NullCheck);

    // The control chain from Start must now reach `ret` in one hop, skipping
    // the eliminated second check entirely.
    let start = g.start_region();
    let first = g.control_chain_next(start).unwrap();
    assert_eq!(g.node(first).opcode(), Opcode::NullCheck);
    let second = g.control_chain_next(first).unwrap();
    assert_eq!(second, ret);
}

#[test]
fn checks_guarded_by_different_branches_both_survive() {
    use midcore::ir::ConditionCode;

    let mut g = Graph::new();
    g.set_method_name("checks_on_both_sides");
    let start = g.start_region();

    let r = g.create_parameter(0);
    let flag = g.create_parameter(1);
    let zero = g.create_constant(0);
    let cmp = g.create_compare(ConditionCode::Ne, flag, zero);

    let if_node = g.create_if();
    g.set_control_input(if_node, start);
    g.set_data_input(if_node, 0, cmp);

    let b = g.create_region();
    let c = g.create_region();
    g.set_true_branch(if_node, b);
    g.set_false_branch(if_node, c);

    let nc_b = g.create_null_check();
    g.set_control_input(nc_b, b);
    g.push_data_input(nc_b, r);
    let jb = g.create_jump();
    g.set_control_input(jb, nc_b);

    let nc_c = g.create_null_check();
    g.set_control_input(nc_c, c);
    g.push_data_input(nc_c, r);
    let jc = g.create_jump();
    g.set_control_input(jc, nc_c);

    let m = g.create_region();
    g.set_jump_target(jb, m);
    g.set_jump_target(jc, m);

    let ret = g.create_return();
    g.set_control_input(ret, m);
    let result = g.create_constant(0);
    g.set_data_input(ret, 0, result);
    g.wire_return_to_end(ret);

    let doms = DomTree::compute(&mut g);
    let removed = ChecksElimination::run(&mut g, &doms);
    assert_eq!(removed, 0, "neither check dominates the other, so both must stay");
}
