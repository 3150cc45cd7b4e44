//! Shared preprocessing, model building, and result plumbing.
//!
//! Every decision rule runs the same pre-step (validate, filter by
//! confidence, apply the penalty transform), emits the same budget and
//! minimum-worst-return constraint blocks, and reduces solved variables
//! through the same extractor. None of this is rule-specific.

use std::collections::BTreeMap;

use crate::error::SelectError;
use crate::milp::{
    BinaryVar, ConstraintSense, LinearExpr, MilpModel, MilpSolution, SolveStatus, SolverConfig,
};
use crate::penalty::{effective_returns, PenalizedInitiative, PenaltyFn};
use crate::rules::types::{
    Initiative, RuleDetail, RuleKind, RuleResult, RuleStatus, Selection, SolveConfig,
};
use crate::scenario::ScenarioSet;

/// Name of the selection variable for an initiative.
pub(crate) fn select_var(id: &str) -> String {
    format!("select_{id}")
}

/// Validates inputs, filters by confidence, and applies the penalty.
///
/// Runs entirely before any solve attempt. Initiatives below the
/// confidence threshold are dropped; the survivors are penalized in
/// input order.
///
/// # Errors
///
/// `Validation` for a bad config, negative budget, duplicate ids,
/// negative cost, confidence outside [0, 1], or a missing declared
/// scenario return on any initiative (filtered or not).
pub(crate) fn preprocess(
    initiatives: &[Initiative],
    budget: f64,
    scenarios: &ScenarioSet,
    config: &SolveConfig,
    penalty: &PenaltyFn,
) -> Result<Vec<PenalizedInitiative>, SelectError> {
    config.validate().map_err(SelectError::Validation)?;
    if budget < 0.0 {
        return Err(SelectError::Validation(format!(
            "budget must be non-negative, got {budget}"
        )));
    }

    for (i, initiative) in initiatives.iter().enumerate() {
        if initiatives[..i].iter().any(|other| other.id == initiative.id) {
            return Err(SelectError::Validation(format!(
                "duplicate initiative id: {}",
                initiative.id
            )));
        }
        if initiative.cost < 0.0 {
            return Err(SelectError::Validation(format!(
                "initiative '{}' has negative cost {}",
                initiative.id, initiative.cost
            )));
        }
        if !(0.0..=1.0).contains(&initiative.confidence) {
            return Err(SelectError::Validation(format!(
                "initiative '{}' has confidence {} outside [0, 1]",
                initiative.id, initiative.confidence
            )));
        }
        for scenario in scenarios.names() {
            if !initiative.returns.contains_key(scenario) {
                return Err(SelectError::Validation(format!(
                    "initiative '{}' has no return for scenario '{scenario}'",
                    initiative.id
                )));
            }
        }
    }

    initiatives
        .iter()
        .filter(|i| i.confidence >= config.min_confidence)
        .map(|i| effective_returns(i, scenarios, penalty))
        .collect()
}

/// Whether any candidate can be afforded at all.
///
/// An empty portfolio is not an allocation: when nothing fits, the
/// rules report `Infeasible` instead of an empty `Optimal` selection.
pub(crate) fn any_fits(penalized: &[PenalizedInitiative], budget: f64) -> bool {
    penalized.iter().any(|p| p.cost <= budget)
}

/// Adds one binary selection variable per initiative, in input order.
///
/// Input order matters: the solver's tie-break prefers assignments
/// selecting earlier-declared variables.
pub(crate) fn add_selection_vars(model: &mut MilpModel, penalized: &[PenalizedInitiative]) {
    for p in penalized {
        model.add_binary(BinaryVar::new(select_var(&p.id)));
    }
}

/// Adds the budget constraint over raw costs.
pub(crate) fn add_budget_constraint(
    model: &mut MilpModel,
    penalized: &[PenalizedInitiative],
    budget: f64,
) {
    let expr: LinearExpr = penalized
        .iter()
        .map(|p| (select_var(&p.id), p.cost))
        .collect();
    model.add_constraint("budget", expr, ConstraintSense::Le, budget);
}

/// Adds the minimum-worst-return constraint over *raw* worst returns.
///
/// A threshold of exactly 0.0 means unconstrained and adds nothing.
pub(crate) fn add_min_worst_constraint(
    model: &mut MilpModel,
    penalized: &[PenalizedInitiative],
    threshold: f64,
) {
    if threshold == 0.0 {
        return;
    }
    let expr: LinearExpr = penalized
        .iter()
        .map(|p| (select_var(&p.id), p.raw_worst))
        .collect();
    model.add_constraint("min_worst_return", expr, ConstraintSense::Ge, threshold);
}

/// Solver configuration for one rule solve.
pub(crate) fn solver_config(config: &SolveConfig) -> SolverConfig {
    SolverConfig {
        time_limit_ms: config.time_limit_ms,
        silent: true,
    }
}

/// Reduces a solved assignment to the selected portfolio.
///
/// A variable counts as "on" when its value exceeds 0.5, tolerating
/// solver floating-point slack. Pure and shared verbatim by every rule.
pub(crate) fn extract_selection(
    solution: &MilpSolution,
    penalized: &[PenalizedInitiative],
    scenarios: &ScenarioSet,
) -> Selection {
    let mut ids = Vec::new();
    let mut total_cost = 0.0;
    let mut returns: BTreeMap<String, f64> =
        scenarios.names().iter().map(|s| (s.clone(), 0.0)).collect();

    for p in penalized {
        let on = solution
            .value(&select_var(&p.id))
            .map_or(false, |v| v > 0.5);
        if !on {
            continue;
        }
        ids.push(p.id.clone());
        total_cost += p.cost;
        for scenario in scenarios.names() {
            if let Some(total) = returns.get_mut(scenario.as_str()) {
                *total += p.effective.get(scenario.as_str()).copied().unwrap_or(0.0);
            }
        }
    }

    Selection {
        ids,
        total_cost,
        returns,
    }
}

/// A selection with nothing in it and zeroed aggregates.
pub(crate) fn empty_selection(scenarios: &ScenarioSet) -> Selection {
    Selection {
        ids: Vec::new(),
        total_cost: 0.0,
        returns: scenarios.names().iter().map(|s| (s.clone(), 0.0)).collect(),
    }
}

/// Packages extractor output and rule diagnostics into the uniform
/// result shape.
pub(crate) fn assemble(
    status: RuleStatus,
    objective: Option<f64>,
    selection: Selection,
    rule: RuleKind,
    detail: RuleDetail,
) -> RuleResult {
    RuleResult {
        status,
        objective,
        selection,
        rule,
        detail,
    }
}

/// Maps a master-problem solver status onto the rule status taxonomy.
pub(crate) fn rule_status(solution: &MilpSolution) -> RuleStatus {
    match solution.status {
        SolveStatus::Optimal => RuleStatus::Optimal,
        SolveStatus::Infeasible => RuleStatus::Infeasible,
        SolveStatus::Stopped => RuleStatus::Stopped,
        SolveStatus::Unbounded => RuleStatus::Error("master problem unbounded".into()),
        SolveStatus::Error => RuleStatus::Error(
            solution
                .message
                .clone()
                .unwrap_or_else(|| "solver failed without detail".into()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::penalty::gamma;

    fn abc() -> Vec<Initiative> {
        vec![
            Initiative::new("A", 4.0, 0.9)
                .with_return("best", 15.0)
                .with_return("med", 10.0)
                .with_return("worst", 2.0),
            Initiative::new("B", 3.0, 0.6)
                .with_return("best", 12.0)
                .with_return("med", 8.0)
                .with_return("worst", 1.0),
            Initiative::new("C", 3.0, 0.8)
                .with_return("best", 9.0)
                .with_return("med", 6.0)
                .with_return("worst", 2.0),
        ]
    }

    #[test]
    fn test_preprocess_filters_by_confidence() {
        let scenarios = ScenarioSet::default();
        let config = SolveConfig::default().with_min_confidence(0.7);
        let penalized = preprocess(&abc(), 10.0, &scenarios, &config, &gamma).unwrap();
        let ids: Vec<_> = penalized.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["A", "C"]);
    }

    #[test]
    fn test_preprocess_rejects_negative_budget() {
        let err = preprocess(
            &abc(),
            -1.0,
            &ScenarioSet::default(),
            &SolveConfig::default(),
            &gamma,
        )
        .unwrap_err();
        assert!(matches!(err, SelectError::Validation(_)));
    }

    #[test]
    fn test_preprocess_rejects_duplicate_ids() {
        let mut initiatives = abc();
        initiatives.push(initiatives[0].clone());
        let err = preprocess(
            &initiatives,
            10.0,
            &ScenarioSet::default(),
            &SolveConfig::default(),
            &gamma,
        )
        .unwrap_err();
        assert!(matches!(err, SelectError::Validation(_)));
    }

    #[test]
    fn test_preprocess_rejects_missing_scenario() {
        let initiatives = vec![Initiative::new("X", 1.0, 0.5).with_return("best", 1.0)];
        let err = preprocess(
            &initiatives,
            10.0,
            &ScenarioSet::default(),
            &SolveConfig::default(),
            &gamma,
        )
        .unwrap_err();
        assert!(matches!(err, SelectError::Validation(_)));
    }

    #[test]
    fn test_preprocess_rejects_out_of_range_confidence_even_if_filtered() {
        let initiatives = vec![Initiative::new("X", 1.0, -0.2)
            .with_return("best", 1.0)
            .with_return("med", 1.0)
            .with_return("worst", 1.0)];
        let config = SolveConfig::default().with_min_confidence(0.5);
        let err = preprocess(&initiatives, 10.0, &ScenarioSet::default(), &config, &gamma)
            .unwrap_err();
        assert!(matches!(err, SelectError::Validation(_)));
    }

    #[test]
    fn test_any_fits() {
        let scenarios = ScenarioSet::default();
        let penalized =
            preprocess(&abc(), 10.0, &scenarios, &SolveConfig::default(), &gamma).unwrap();
        assert!(any_fits(&penalized, 3.0));
        assert!(!any_fits(&penalized, 2.0));
    }

    #[test]
    fn test_empty_selection_covers_all_scenarios() {
        let scenarios = ScenarioSet::new(["a", "b"], "b").unwrap();
        let selection = empty_selection(&scenarios);
        assert!(selection.ids.is_empty());
        assert_eq!(selection.returns.len(), 2);
        assert_eq!(selection.returns["a"], 0.0);
    }
}
