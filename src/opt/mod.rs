//! Transformation passes: peephole simplification (with constant folding),
//! redundant check elimination, and call-site inlining.

pub mod checks_elimination;
pub mod constant_folding;
pub mod inlining;
pub mod peepholes;

pub use checks_elimination::ChecksElimination;
pub use inlining::{CalleeRegistry, Inlining};
pub use peepholes::Peepholes;
