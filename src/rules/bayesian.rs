//! Bayesian-weighted decision rule.
//!
//! Each scenario carries a prior weight; the rule maximizes the
//! weighted expected aggregate effective return:
//!
//! ```text
//! max sum_i x_i * sum_j w_j * effective(i, j)
//! s.t. sum_i x_i * cost(i)      <= budget
//!      sum_i x_i * raw_worst(i) >= min_worst_return   (when supplied)
//!      x_i in {0, 1}
//! ```
//!
//! Weights need not sum to one; they are normalized before solving.
//! Scenarios without a declared weight contribute nothing.

use std::collections::BTreeMap;

use crate::error::SelectError;
use crate::milp::{LinearExpr, MilpSolver, MilpModel, Objective};
use crate::penalty::PenaltyFn;
use crate::rules::common::{
    add_budget_constraint, add_min_worst_constraint, add_selection_vars, any_fits, assemble,
    empty_selection, extract_selection, preprocess, rule_status, select_var, solver_config,
};
use crate::rules::{
    DecisionRule, Initiative, RuleDetail, RuleKind, RuleResult, RuleStatus, SolveConfig,
};
use crate::scenario::ScenarioSet;

/// The Bayesian-weighted rule.
///
/// # Examples
///
/// ```
/// use scenario_select::milp::BranchBoundSolver;
/// use scenario_select::rules::{Bayesian, DecisionRule, Initiative, SolveConfig};
/// use scenario_select::scenario::ScenarioSet;
///
/// let rule = Bayesian::new([("best", 0.2), ("med", 0.5), ("worst", 0.3)]).unwrap();
/// let initiatives = vec![Initiative::new("A", 4.0, 0.9)
///     .with_return("best", 15.0)
///     .with_return("med", 10.0)
///     .with_return("worst", 2.0)];
/// let result = rule
///     .solve(
///         &initiatives,
///         10.0,
///         &ScenarioSet::default(),
///         &SolveConfig::default(),
///         &BranchBoundSolver::new(),
///     )
///     .unwrap();
/// assert_eq!(result.selection.ids, ["A"]);
/// ```
#[derive(Debug, Clone)]
pub struct Bayesian {
    weights: BTreeMap<String, f64>,
}

impl Bayesian {
    /// Creates the rule from scenario prior weights.
    ///
    /// Weights must be non-negative with a positive sum. Whether every
    /// key names a declared scenario is checked at solve time, against
    /// the [`ScenarioSet`] actually supplied.
    pub fn new<I, S>(weights: I) -> Result<Self, SelectError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let weights: BTreeMap<String, f64> =
            weights.into_iter().map(|(k, v)| (k.into(), v)).collect();
        for (name, weight) in &weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(SelectError::Validation(format!(
                    "weight for scenario '{name}' must be finite and non-negative, got {weight}"
                )));
            }
        }
        let total: f64 = weights.values().sum();
        if total <= 0.0 {
            return Err(SelectError::Validation(
                "scenario weights must have a positive sum".into(),
            ));
        }
        Ok(Self { weights })
    }

    /// Weights rescaled to sum to one.
    fn normalized(&self) -> BTreeMap<String, f64> {
        let total: f64 = self.weights.values().sum();
        self.weights
            .iter()
            .map(|(k, v)| (k.clone(), v / total))
            .collect()
    }
}

impl DecisionRule for Bayesian {
    fn kind(&self) -> RuleKind {
        RuleKind::Bayesian
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
        for name in self.weights.keys() {
            if !scenarios.contains(name) {
                return Err(SelectError::Validation(format!(
                    "weight references undeclared scenario '{name}'"
                )));
            }
        }
        let penalized = preprocess(initiatives, budget, scenarios, config, penalty)?;
        let weights = self.normalized();

        let bail = |status: RuleStatus| {
            assemble(
                status,
                None,
                empty_selection(scenarios),
                RuleKind::Bayesian,
                RuleDetail::Bayesian {
                    weights: weights.clone(),
                },
            )
        };

        if penalized.is_empty() || !any_fits(&penalized, budget) {
            return Ok(bail(RuleStatus::Infeasible));
        }

        let mut model = MilpModel::new("bayesian");
        add_selection_vars(&mut model, &penalized);
        add_budget_constraint(&mut model, &penalized, budget);
        add_min_worst_constraint(&mut model, &penalized, config.min_worst_return);

        let expr: LinearExpr = penalized
            .iter()
            .map(|p| {
                let expected: f64 = weights
                    .iter()
                    .map(|(name, w)| w * p.effective.get(name.as_str()).copied().unwrap_or(0.0))
                    .sum();
                (select_var(&p.id), expected)
            })
            .collect();
        model.set_objective(Objective::Maximize { terms: expr.terms });

        let solver_cfg = solver_config(config);
        let solution = solver.solve(&model, &solver_cfg);

        match rule_status(&solution) {
            status @ (RuleStatus::Optimal | RuleStatus::Stopped) if solution.has_incumbent() => {
                let selection = extract_selection(&solution, &penalized, scenarios);
                Ok(assemble(
                    status,
                    solution.objective_value,
                    selection,
                    RuleKind::Bayesian,
                    RuleDetail::Bayesian {
                        weights: weights.clone(),
                    },
                ))
            }
            status => Ok(bail(status)),
        }
    }
}
