//! Error type for the handful of pass diagnostics that are recoverable
//! rather than programmer errors (§7).
//!
//! Everything else — a malformed graph, a missing edge, re-creating a node
//! at an occupied index — is a logic error and panics. Only inlining's three
//! "the call site legitimately can't be inlined" cases go through here.

use core::fmt;

use crate::entity::NodeId;

/// A non-fatal failure from a transformation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassError {
    /// A `Call` node names a function the running [`crate::context::Context`]
    /// has no registered graph for.
    CalleeNotFound { call: NodeId, name: String },
    /// Inlining this call site would push the running total of nodes
    /// inlined so far in this pass past
    /// [`crate::context::Config::inline_budget`].
    InlineBudgetExceeded { call: NodeId, would_be: u32, budget: u32 },
    /// The callee carries the `__noinline__` marker in its method name.
    NoInlineMarker { call: NodeId, callee: String },
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassError::CalleeNotFound { call, name } => {
                write!(f, "{}: call to unknown callee {:?}", call, name)
            }
            PassError::InlineBudgetExceeded { call, would_be, budget } => write!(
                f,
                "{}: inlining would bring the total inlined node count to {}, exceeding budget {}",
                call, would_be, budget
            ),
            PassError::NoInlineMarker { call, callee } => {
                write!(f, "{}: callee {:?} is marked __noinline__", call, callee)
            }
        }
    }
}

impl std::error::Error for PassError {}

pub type PassResult<T> = Result<T, PassError>;
