//! A per-node boolean scratch set, sized to a graph's current node count.
//!
//! The source hand-manages a `new bool[graph->GetNumInsts()]` /
//! `delete[]` pair around every marking pass. A `Vec<bool>` gives the same
//! dense O(1)-indexed membership test with none of the manual lifetime
//! bookkeeping — §5 simplification, not a behavior change.

use crate::entity::NodeId;
use crate::ir::Graph;

/// Dense marker set over a graph's node ids.
pub struct Marker {
    bits: Vec<bool>,
}

impl Marker {
    /// Allocates a marker sized to `graph`'s current node count, all unset.
    pub fn new(graph: &Graph) -> Self {
        Marker {
            bits: vec![false; graph.num_nodes()],
        }
    }

    pub fn is_marked(&self, id: NodeId) -> bool {
        self.bits.get(id.index()).copied().unwrap_or(false)
    }

    pub fn set_marker(&mut self, id: NodeId) {
        if id.index() >= self.bits.len() {
            self.bits.resize(id.index() + 1, false);
        }
        self.bits[id.index()] = true;
    }

    pub fn clear_marker(&mut self, id: NodeId) {
        if let Some(bit) = self.bits.get_mut(id.index()) {
            *bit = false;
        }
    }

    /// Sets the marker and reports whether it was already set, the common
    /// "visit once" idiom used by every DFS/RPO walk in this crate.
    pub fn try_set_marker(&mut self, id: NodeId) -> bool {
        let was_marked = self.is_marked(id);
        self.set_marker(id);
        !was_marked
    }

    pub fn clear(&mut self) {
        for bit in &mut self.bits {
            *bit = false;
        }
    }
}
