//! Register allocation: liveness over a scheduled graph, then linear scan.

pub mod liveness;
pub mod linear_scan;

pub use linear_scan::{LinearScanRegAlloc, Location};
pub use liveness::{LiveInterval, LiveRange, LivenessAnalyzer};
