//! Minimax regret decision rule.
//!
//! Regret for a scenario is the gap between the best achievable
//! aggregate return under that scenario alone (its benchmark) and the
//! return the chosen portfolio actually achieves. This rule selects the
//! portfolio minimizing the largest regret across all declared
//! scenarios:
//!
//! ```text
//! min theta
//! s.t. theta >= benchmark(j) - sum_i x_i * effective(i, j)   for all j
//!      sum_i x_i * cost(i)      <= budget
//!      sum_i x_i * raw_worst(i) >= min_worst_return   (when supplied)
//!      x_i in {0, 1},  theta free in sign
//! ```

use std::collections::BTreeMap;

use crate::error::SelectError;
use crate::milp::{
    ConstraintSense, ContinuousVar, LinearExpr, MilpModel, MilpSolver, Objective, SolveStatus,
};
use crate::penalty::{PenalizedInitiative, PenaltyFn};
use crate::rules::benchmark::{scenario_benchmarks, BenchmarkOutcome};
use crate::rules::common::{
    add_budget_constraint, add_min_worst_constraint, add_selection_vars, any_fits, assemble,
    empty_selection, extract_selection, preprocess, rule_status, select_var, solver_config,
};
use crate::rules::{
    DecisionRule, Initiative, RuleDetail, RuleKind, RuleResult, RuleStatus, SolveConfig,
};
use crate::scenario::ScenarioSet;

/// The minimax-regret rule.
///
/// # Examples
///
/// ```
/// use scenario_select::milp::BranchBoundSolver;
/// use scenario_select::rules::{DecisionRule, Initiative, MinimaxRegret, SolveConfig};
/// use scenario_select::scenario::ScenarioSet;
///
/// let initiatives = vec![
///     Initiative::new("A", 4.0, 0.9)
///         .with_return("best", 15.0)
///         .with_return("med", 10.0)
///         .with_return("worst", 2.0),
///     Initiative::new("B", 3.0, 0.6)
///         .with_return("best", 12.0)
///         .with_return("med", 8.0)
///         .with_return("worst", 1.0),
/// ];
/// let result = MinimaxRegret::new()
///     .solve(
///         &initiatives,
///         10.0,
///         &ScenarioSet::default(),
///         &SolveConfig::default(),
///         &BranchBoundSolver::new(),
///     )
///     .unwrap();
/// assert!(result.selection.total_cost <= 10.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimaxRegret;

impl MinimaxRegret {
    pub fn new() -> Self {
        Self
    }
}

impl DecisionRule for MinimaxRegret {
    fn kind(&self) -> RuleKind {
        RuleKind::MinimaxRegret
    }

    fn solve_with_penalty(
        &self,
        initiatives: &[Initiative],
        budget: f64,
        scenarios: &ScenarioSet,
        config: &SolveConfig,
        solver: &dyn MilpSolver,
        penalty: &PenaltyFn,
    ) -> Result<RuleResult, SelectError> {
        let penalized = preprocess(initiatives, budget, scenarios, config, penalty)?;

        let bail = |status: RuleStatus, benchmarks: BTreeMap<String, f64>| {
            assemble(
                status,
                None,
                empty_selection(scenarios),
                RuleKind::MinimaxRegret,
                RuleDetail::MinimaxRegret {
                    benchmarks,
                    regrets: BTreeMap::new(),
                },
            )
        };

        if penalized.is_empty() || !any_fits(&penalized, budget) {
            return Ok(bail(RuleStatus::Infeasible, BTreeMap::new()));
        }

        let solver_cfg = solver_config(config);
        let outcomes =
            match scenario_benchmarks(&penalized, budget, scenarios, solver, &solver_cfg) {
                Ok(outcomes) => outcomes,
                Err(SelectError::Solver(message)) => {
                    return Ok(bail(RuleStatus::Error(message), BTreeMap::new()))
                }
                Err(other) => return Err(other),
            };

        let mut benchmarks = BTreeMap::new();
        let mut all_proven = true;
        for (name, outcome) in &outcomes {
            match outcome {
                BenchmarkOutcome::Feasible { value, proven } => {
                    benchmarks.insert(name.clone(), *value);
                    all_proven &= proven;
                }
                BenchmarkOutcome::Infeasible => {
                    return Ok(bail(RuleStatus::Infeasible, benchmarks))
                }
                BenchmarkOutcome::Stopped => return Ok(bail(RuleStatus::Stopped, benchmarks)),
                BenchmarkOutcome::Unbounded => {
                    return Ok(bail(
                        RuleStatus::Error(format!(
                            "benchmark unbounded for scenario '{name}'"
                        )),
                        benchmarks,
                    ))
                }
            }
        }

        let model = master_model(&penalized, budget, scenarios, config, &benchmarks);
        let solution = solver.solve(&model, &solver_cfg);

        match rule_status(&solution) {
            RuleStatus::Optimal | RuleStatus::Stopped if solution.has_incumbent() => {
                let selection = extract_selection(&solution, &penalized, scenarios);
                let regrets = benchmarks
                    .iter()
                    .map(|(name, bench)| {
                        let achieved = selection.returns.get(name).copied().unwrap_or(0.0);
                        (name.clone(), bench - achieved)
                    })
                    .collect();
                let proven = all_proven && solution.status == SolveStatus::Optimal;
                Ok(assemble(
                    if proven {
                        RuleStatus::Optimal
                    } else {
                        RuleStatus::Stopped
                    },
                    solution.objective_value,
                    selection,
                    RuleKind::MinimaxRegret,
                    RuleDetail::MinimaxRegret {
                        benchmarks,
                        regrets,
                    },
                ))
            }
            status => Ok(bail(status, benchmarks)),
        }
    }
}

/// Builds the master problem from the per-scenario benchmarks.
fn master_model(
    penalized: &[PenalizedInitiative],
    budget: f64,
    scenarios: &ScenarioSet,
    config: &SolveConfig,
    benchmarks: &BTreeMap<String, f64>,
) -> MilpModel {
    let mut model = MilpModel::new("minimax_regret");
    add_selection_vars(&mut model, penalized);
    model.add_continuous(ContinuousVar::free("max_regret"));

    for name in scenarios.names() {
        let mut expr = LinearExpr::new().term("max_regret", 1.0);
        for p in penalized {
            expr = expr.term(
                select_var(&p.id),
                p.effective.get(name.as_str()).copied().unwrap_or(0.0),
            );
        }
        model.add_constraint(
            format!("regret_{name}"),
            expr,
            ConstraintSense::Ge,
            benchmarks.get(name.as_str()).copied().unwrap_or(0.0),
        );
    }

    add_budget_constraint(&mut model, penalized, budget);
    add_min_worst_constraint(&mut model, penalized, config.min_worst_return);
    model.set_objective(Objective::Minimize {
        terms: vec![("max_regret".into(), 1.0)],
    });
    model
}
