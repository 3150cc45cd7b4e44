//! Decision-theoretic portfolio selection under scenario uncertainty.
//!
//! Selects a subset of candidate initiatives under a budget constraint,
//! optimizing a decision rule over multiple named outcome scenarios:
//!
//! - **Minimax Regret**: minimizes the worst-case regret across scenarios,
//!   where regret is the gap between the best achievable return for a
//!   scenario and the return the chosen portfolio actually achieves.
//! - **Bayesian-Weighted**: maximizes the expected return under explicit
//!   scenario probability weights (the Laplace criterion is the special
//!   case of equal weights).
//!
//! Return estimates are uncertain; each initiative carries a confidence
//! score, and every rule first blends scenario returns toward the
//! worst-case estimate in proportion to `1 - confidence` (the [`penalty`]
//! module). The scenario set itself is data — any non-empty ordered set
//! of named scenarios with one designated worst-case reference — never a
//! fixed constant.
//!
//! # Architecture
//!
//! The rules construct 0/1 selection programs and hand them to a narrow
//! solving capability, the [`milp::MilpSolver`] trait. A bundled exact
//! branch-and-bound solver covers the program shapes this crate emits;
//! any compliant MILP engine can be substituted without touching rule
//! logic. The crate is stateless between calls and fully deterministic:
//! identical inputs always yield the identical selection, not merely the
//! same objective value.

pub mod error;
pub mod milp;
pub mod penalty;
pub mod rules;
pub mod scenario;
