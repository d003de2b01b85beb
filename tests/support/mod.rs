use midcore::entity::NodeId;
use midcore::ir::Graph;

/// Builds the simplest possible method: `Start -> Return <value>`, where
/// `value_builder` constructs whatever expression is under test.
pub fn single_value_method(value_builder: impl FnOnce(&mut Graph) -> NodeId) -> Graph {
    let mut g = Graph::new();
    g.set_method_name("test_method");
    let value = value_builder(&mut g);
    let start = g.start_region();
    let ret = g.create_return();
    g.set_control_input(ret, start);
    g.set_data_input(ret, 0, value);
    g.wire_return_to_end(ret);
    g
}
