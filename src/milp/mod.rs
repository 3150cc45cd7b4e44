//! Mixed 0/1 linear programming capability.
//!
//! Provides a narrow modeling layer for the budget-constrained 0/1
//! selection programs the decision rules emit, plus the solver interface
//! they run against.
//!
//! # Key Components
//!
//! - **Variables**: [`BinaryVar`], [`ContinuousVar`] — decision variables
//! - **Model**: [`MilpModel`] — variables, linear constraints, objective
//! - **Solver**: [`MilpSolver`] trait — interface for solver implementations
//! - **Reference solver**: [`BranchBoundSolver`] — bundled exact solver
//!
//! # Design
//!
//! This module defines the modeling layer and a reference solver only.
//! The [`MilpSolver`] trait allows plugging in external MILP engines
//! (CBC, HiGHS, CP-SAT) without touching rule logic; implementations
//! must honor the wall-clock time limit and silent mode carried by
//! [`SolverConfig`].
//!
//! Domain concepts (initiatives, scenarios, regret) do not appear here;
//! this layer sees only variables, coefficients, and constraints.

mod model;
mod solver;

pub use model::{
    BinaryVar, ConstraintSense, ContinuousVar, LinearConstraint, LinearExpr, MilpModel, Objective,
};
pub use solver::{BranchBoundSolver, MilpSolution, MilpSolver, SolveStatus, SolverConfig};
