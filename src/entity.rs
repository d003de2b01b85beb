//! Dense `u32` entity references into [`crate::ir::Graph`]'s node arena.
//!
//! Translates the source's raw `Inst *` pointers and `id_t` indices into a
//! single typed newtype, the same move the teacher's `cranelift_codegen::ir`
//! entities module makes for `Ebb`/`Value`/etc: a `u32` wrapping struct with
//! a reserved sentinel, `Display`, and no public constructor outside the
//! owning arena.

use core::fmt;

/// A stable reference to a node in a [`crate::ir::Graph`].
///
/// Equal to the node's index in the arena for as long as the node is alive;
/// the graph never reuses an id, even after [`crate::ir::Graph::delete`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel used only inside `Option<NodeId>`-shaped fields that predate
    /// a value being wired up (e.g. `If`'s two branch user slots before
    /// `set_true_branch`/`set_false_branch` run). Never observable through
    /// the public API.
    const RESERVED: u32 = u32::MAX;

    pub(crate) fn new(index: usize) -> Self {
        let index = index as u32;
        debug_assert!(index != Self::RESERVED, "node index space exhausted");
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Identifies a [`crate::loop_analysis::Loop`] inside a graph's loop forest.
/// Id 0 is always the synthetic root loop.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct LoopId(pub(crate) u32);

impl LoopId {
    pub const ROOT: LoopId = LoopId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
