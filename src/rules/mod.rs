//! Decision rules for portfolio selection under scenario uncertainty.
//!
//! A rule takes candidate [`Initiative`]s, a budget, and a
//! [`ScenarioSet`](crate::scenario::ScenarioSet), and produces a
//! [`RuleResult`] through a pluggable [`MilpSolver`]. Two rules are
//! provided:
//!
//! - [`MinimaxRegret`] minimizes the largest shortfall against the
//!   per-scenario benchmarks (see [`benchmark`]).
//! - [`Bayesian`] maximizes the prior-weighted expected return.
//!
//! Both share the same preprocessing (validation, confidence
//! filtering, penalty blending) and the same result shape, so their
//! outputs are directly comparable.

mod bayesian;
pub mod benchmark;
mod common;
mod minimax_regret;
mod types;

pub use bayesian::Bayesian;
pub use minimax_regret::MinimaxRegret;
pub use types::{
    Initiative, RuleDetail, RuleKind, RuleResult, RuleStatus, Selection, SolveConfig,
};

use crate::error::SelectError;
use crate::milp::{BranchBoundSolver, MilpSolver};
use crate::penalty::{gamma, PenaltyFn};
use crate::scenario::ScenarioSet;

/// A portfolio-selection decision rule.
///
/// Implementations must be deterministic: the same inputs solved with
/// the same solver produce the same [`RuleResult`].
pub trait DecisionRule {
    /// Which rule this is, for result tagging.
    fn kind(&self) -> RuleKind;

    /// Solves with an explicit penalty function mapping confidence to
    /// a blend factor in `[0, 1]`.
    ///
    /// Returns `Err` only for input problems caught before solving;
    /// solver-side failures surface as [`RuleStatus::Error`] in the
    /// result so partial diagnostics are preserved.
    fn solve_with_penalty(
        &self,
        initiatives: &[Initiative],
        budget: f64,
        scenarios: &ScenarioSet,
        config: &SolveConfig,
        solver: &dyn MilpSolver,
        penalty: &PenaltyFn,
    ) -> Result<RuleResult, SelectError>;

    /// Solves with the default linear penalty `gamma = 1 - confidence`.
    fn solve(
        &self,
        initiatives: &[Initiative],
        budget: f64,
        scenarios: &ScenarioSet,
        config: &SolveConfig,
        solver: &dyn MilpSolver,
    ) -> Result<RuleResult, SelectError> {
        self.solve_with_penalty(initiatives, budget, scenarios, config, solver, &gamma)
    }
}

/// Runs the minimax-regret rule with the bundled solver.
pub fn solve_minimax_regret(
    initiatives: &[Initiative],
    budget: f64,
    scenarios: &ScenarioSet,
    config: &SolveConfig,
) -> Result<RuleResult, SelectError> {
    MinimaxRegret::new().solve(initiatives, budget, scenarios, config, &BranchBoundSolver::new())
}

/// Runs the Bayesian rule with the bundled solver.
pub fn solve_bayesian<I, S>(
    initiatives: &[Initiative],
    budget: f64,
    scenarios: &ScenarioSet,
    config: &SolveConfig,
    weights: I,
) -> Result<RuleResult, SelectError>
where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
{
    Bayesian::new(weights)?.solve(
        initiatives,
        budget,
        scenarios,
        config,
        &BranchBoundSolver::new(),
    )
}
