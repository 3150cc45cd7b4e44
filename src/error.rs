//! Error taxonomy for the selection engine.
//!
//! Only conditions detected *before* or *outside* a solve attempt are
//! errors. "No feasible portfolio exists" and "the solver gave up" are
//! expected outcomes a caller must handle, so they are reported through
//! [`crate::rules::RuleStatus`] rather than raised.

use std::fmt;

/// Errors reported by the selection engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// Malformed input rejected before any solving attempt: confidence
    /// or penalty weight outside [0, 1], negative budget, duplicate
    /// initiative ids, missing scenario returns, bad weight maps.
    Validation(String),

    /// The scenario set itself is unusable: empty, duplicate names, or
    /// no designated worst-case reference.
    Configuration(String),

    /// The solving capability failed for a reason other than
    /// infeasibility or unboundedness. Rules convert this into an
    /// `Error` status; it never absorbs unrelated runtime faults.
    Solver(String),
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectError::Validation(msg) => write!(f, "validation error: {msg}"),
            SelectError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            SelectError::Solver(msg) => write!(f, "solver error: {msg}"),
        }
    }
}

impl std::error::Error for SelectError {}
