mod support;

use midcore::ir::{Opcode, Type};
use midcore::opt::Peepholes;

#[test]
fn sub_zero_replaces_with_lhs() {
    let mut g = support::single_value_method(|g| {
        let x = g.create_parameter(0);
        let zero = g.create_constant(0);
        g.create_sub(Type::I64, x, zero)
    });

    let simplified = Peepholes::run(&mut g);
    assert_eq!(simplified, 1);

    let end = g.end_region();
    let ret = g.node(end).raw_inputs()[0];
    let value = g.node(ret).data_input(0);
    assert_eq!(g.node(value).opcode(), Opcode::Parameter);
}

#[test]
fn constant_sub_folds() {
    let mut g = support::single_value_method(|g| {
        let a = g.create_constant(10);
        let b = g.create_constant(3);
        g.create_sub(Type::I64, a, b)
    });

    let simplified = Peepholes::run(&mut g);
    assert_eq!(simplified, 1);

    let end = g.end_region();
    let ret = g.node(end).raw_inputs()[0];
    let value = g.node(ret).data_input(0);
    assert_eq!(g.node(value).opcode(), Opcode::Constant);
    assert_eq!(g.node(value).imm(), 7);
}

#[test]
fn or_zero_replaces_with_operand() {
    let mut g = support::single_value_method(|g| {
        let x = g.create_parameter(0);
        let zero = g.create_constant(0);
        g.create_or(Type::I64, zero, x)
    });

    let simplified = Peepholes::run(&mut g);
    assert_eq!(simplified, 1);

    let end = g.end_region();
    let ret = g.node(end).raw_inputs()[0];
    let value = g.node(ret).data_input(0);
    assert_eq!(g.node(value).opcode(), Opcode::Parameter);
}

#[test]
fn shr_then_shl_same_amount_becomes_and() {
    let mut g = support::single_value_method(|g| {
        let x = g.create_parameter(0);
        let k = g.create_constant(4);
        let k2 = g.create_constant(4);
        let shr = g.create_shr(Type::I64, x, k);
        g.create_shl(Type::I64, shr, k2)
    });

    let simplified = Peepholes::run(&mut g);
    assert_eq!(simplified, 1);

    let end = g.end_region();
    let ret = g.node(end).raw_inputs()[0];
    let value = g.node(ret).data_input(0);
    assert_eq!(g.node(value).opcode(), Opcode::And);
    let mask = g.node(value).data_input(1);
    assert_eq!(g.node(mask).imm(), !0i64 << 4);
}

#[test]
fn sub_sub_merges_into_single_subtraction_of_a_sum() {
    let mut g = support::single_value_method(|g| {
        let a = g.create_parameter(0);
        let b = g.create_parameter(1);
        let c = g.create_parameter(2);
        let inner = g.create_sub(Type::I64, a, b);
        g.create_sub(Type::I64, inner, c)
    });

    let simplified = Peepholes::run(&mut g);
    assert!(simplified >= 1);

    let end = g.end_region();
    let ret = g.node(end).raw_inputs()[0];
    let value = g.node(ret).data_input(0);
    assert_eq!(g.node(value).opcode(), Opcode::Sub);
    let rhs = g.node(value).data_input(1);
    assert_eq!(g.node(rhs).opcode(), Opcode::Add);
}
