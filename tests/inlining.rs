mod support;

use midcore::ir::{Graph, Opcode, Type};
use midcore::opt::{CalleeRegistry, Inlining};

/// `Start -> Param0 + Param1 -> Return`, a two-argument add with a single
/// return, callable by name `"add"`.
fn callee_add() -> Graph {
    let mut g = Graph::new();
    g.set_method_name("add");
    g.set_num_params(2);
    let start = g.start_region();
    let a = g.create_parameter(0);
    let b = g.create_parameter(1);
    let sum = g.create_add(Type::I64, a, b);
    let ret = g.create_return();
    g.set_control_input(ret, start);
    g.set_data_input(ret, 0, sum);
    g.wire_return_to_end(ret);
    g
}

/// `Start -> Call("add", x, y) -> Return <call>`, the caller.
fn caller_calling_add() -> (Graph, midcore::entity::NodeId) {
    let mut g = Graph::new();
    g.set_method_name("caller");
    let start = g.start_region();

    let x = g.create_constant(3);
    let y = g.create_constant(4);
    let call = g.create_call("add");
    g.set_control_input(call, start);
    g.push_data_input(call, x);
    g.push_data_input(call, y);

    let ret = g.create_return();
    g.set_control_input(ret, call);
    g.set_data_input(ret, 0, call);
    g.wire_return_to_end(ret);

    (g, call)
}

#[test]
fn single_return_callee_is_spliced_in_and_replaces_the_call() {
    let mut registry = CalleeRegistry::new();
    registry.register(callee_add());

    let (mut g, call) = caller_calling_add();
    let nodes_before = g.num_nodes();

    let (inlined, errors) = Inlining::run(&mut g, &registry, 1000);
    assert_eq!(inlined, 1);
    assert!(errors.is_empty());

    // The call site itself is gone from the live control chain: nothing
    // still uses it as a control predecessor, and the return's value no
    // longer comes from the (now orphaned) call node.
    let end = g.end_region();
    let ret = g.node(end).raw_inputs()[0];
    let value = g.node(ret).data_input(0);
    assert_ne!(value, call);
    assert_eq!(g.node(value).opcode(), Opcode::Add);

    assert!(g.num_nodes() > nodes_before);
}

#[test]
fn missing_callee_is_reported_and_left_in_place() {
    let registry = CalleeRegistry::new();
    let (mut g, call) = caller_calling_add();

    let (inlined, errors) = Inlining::run(&mut g, &registry, 1000);
    assert_eq!(inlined, 0);
    assert_eq!(errors.len(), 1);

    let end = g.end_region();
    let ret = g.node(end).raw_inputs()[0];
    assert_eq!(g.node(ret).data_input(0), call);
}

#[test]
fn call_over_budget_is_skipped() {
    let mut registry = CalleeRegistry::new();
    registry.register(callee_add());

    let (mut g, _call) = caller_calling_add();
    let (inlined, errors) = Inlining::run(&mut g, &registry, 1);
    assert_eq!(inlined, 0);
    assert_eq!(errors.len(), 1);
}
