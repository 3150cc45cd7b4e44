//! MILP solver interface and bundled exact solver.

use super::model::{ConstraintSense, MilpModel, Objective};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Feasibility tolerance for constraint satisfaction.
const FEAS_EPS: f64 = 1e-6;

/// Objective tolerance: an incumbent is only replaced on improvement
/// beyond this, so ties resolve by search order.
const TIE_EPS: f64 = 1e-9;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven optimal solution found.
    Optimal,
    /// No feasible solution exists.
    Infeasible,
    /// The objective can be improved without bound.
    Unbounded,
    /// Time limit reached before proof of optimality; the solution
    /// carries the best incumbent found, if any.
    Stopped,
    /// The solver itself failed; see [`MilpSolution::message`].
    Error,
}

/// Solution from a MILP solver.
#[derive(Debug, Clone)]
pub struct MilpSolution {
    /// Solver status.
    pub status: SolveStatus,
    /// Objective function value, when a feasible incumbent exists.
    pub objective_value: Option<f64>,
    /// Assignment per variable name. Binary variables report 0.0/1.0
    /// up to solver slack; consumers treat `> 0.5` as selected.
    pub values: HashMap<String, f64>,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
    /// Diagnostic detail for `Error` status.
    pub message: Option<String>,
}

impl MilpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolveStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: HashMap::new(),
            solve_time_ms: 0,
            message: None,
        }
    }

    /// Creates an `Error` solution carrying a diagnostic message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty(SolveStatus::Error)
        }
    }

    /// Whether a feasible incumbent is available.
    pub fn has_incumbent(&self) -> bool {
        self.objective_value.is_some() || !self.values.is_empty()
    }

    /// Value assigned to `name`, if any.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock time limit in milliseconds. `None` means no limit.
    pub time_limit_ms: Option<u64>,
    /// Suppress solver console output. The bundled solver never prints;
    /// adapters over console-printing engines must honor this.
    pub silent: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: None,
            silent: true,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }
}

/// Trait for MILP solver implementations.
///
/// Implementors provide the actual optimization logic. This can wrap
/// external engines (CBC, HiGHS, CP-SAT) or use the bundled
/// [`BranchBoundSolver`]. Implementations must be safe for concurrent
/// independent invocations (hence the `Sync` bound) and must report a
/// time-limit stop as [`SolveStatus::Stopped`], never as `Optimal`.
pub trait MilpSolver: Sync {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &MilpModel, config: &SolverConfig) -> MilpSolution;
}

/// Bundled exact branch-and-bound solver.
///
/// Explores binary variables in declaration order via depth-first
/// search, branching on "selected" first, with constraint-range and
/// objective-bound pruning. Continuous variables are resolved in closed
/// form at each leaf.
///
/// # Determinism
///
/// The incumbent is only replaced on strict objective improvement, so
/// among equally-optimal assignments the solver returns the first one
/// in search order — the assignment preferring earlier-declared
/// variables set to 1. Identical models always solve to the identical
/// assignment.
///
/// # Limitations
///
/// - Each constraint may reference at most one continuous variable
///   (covers the selection programs this crate emits); richer programs
///   return an `Error` status.
/// - Exponential in the number of binary variables; intended for the
///   moderate candidate counts of portfolio selection. Substitute an
///   external engine through [`MilpSolver`] for large instances.
#[derive(Debug, Clone, Default)]
pub struct BranchBoundSolver;

impl BranchBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

struct PreparedConstraint {
    /// (binary index, coefficient), zero coefficients dropped.
    bin: Vec<(usize, f64)>,
    /// At most one continuous term: (continuous index, coefficient).
    cont: Option<(usize, f64)>,
    sense: ConstraintSense,
    rhs: f64,
}

struct Prepared {
    nbin: usize,
    bin_obj: Vec<f64>,
    cont_obj: Vec<f64>,
    cont_bounds: Vec<(f64, f64)>,
    maximize: bool,
    has_objective: bool,
    constraints: Vec<PreparedConstraint>,
}

struct Incumbent {
    objective: f64,
    bins: Vec<bool>,
    cont: Vec<f64>,
}

struct Search {
    assignment: Vec<bool>,
    incumbent: Option<Incumbent>,
    stopped: bool,
    unbounded: bool,
    deadline: Option<Instant>,
}

impl MilpSolver for BranchBoundSolver {
    fn solve(&self, model: &MilpModel, config: &SolverConfig) -> MilpSolution {
        let start = Instant::now();

        if let Err(msg) = model.validate() {
            return MilpSolution::error(format!("invalid model: {msg}"));
        }
        let prepared = match prepare(model) {
            Ok(p) => p,
            Err(msg) => return MilpSolution::error(msg),
        };

        let mut search = Search {
            assignment: vec![false; prepared.nbin],
            incumbent: None,
            stopped: false,
            unbounded: false,
            deadline: config
                .time_limit_ms
                .map(|ms| start + Duration::from_millis(ms)),
        };

        dfs(&prepared, &mut search, 0);

        let solve_time_ms = start.elapsed().as_millis() as i64;

        if search.unbounded {
            return MilpSolution {
                solve_time_ms,
                ..MilpSolution::empty(SolveStatus::Unbounded)
            };
        }

        let status = match (&search.incumbent, search.stopped) {
            (_, true) => SolveStatus::Stopped,
            (Some(_), false) => SolveStatus::Optimal,
            (None, false) => SolveStatus::Infeasible,
        };

        let mut values = HashMap::new();
        let mut objective_value = None;
        if let Some(incumbent) = &search.incumbent {
            for (var, &on) in model.binaries.iter().zip(&incumbent.bins) {
                values.insert(var.name.clone(), if on { 1.0 } else { 0.0 });
            }
            for (var, &value) in model.continuous.iter().zip(&incumbent.cont) {
                values.insert(var.name.clone(), value);
            }
            if prepared.has_objective {
                objective_value = Some(incumbent.objective);
            }
        }

        MilpSolution {
            status,
            objective_value,
            values,
            solve_time_ms,
            message: None,
        }
    }
}

fn prepare(model: &MilpModel) -> Result<Prepared, String> {
    let nbin = model.binaries.len();
    let bin_index: HashMap<&str, usize> = model
        .binaries
        .iter()
        .enumerate()
        .map(|(i, v)| (v.name.as_str(), i))
        .collect();
    let cont_index: HashMap<&str, usize> = model
        .continuous
        .iter()
        .enumerate()
        .map(|(i, v)| (v.name.as_str(), i))
        .collect();

    let mut bin_obj = vec![0.0; nbin];
    let mut cont_obj = vec![0.0; model.continuous.len()];
    let maximize = matches!(model.objective, Some(Objective::Maximize { .. }));
    let has_objective = model.objective.is_some();
    if let Some(objective) = &model.objective {
        for (name, coefficient) in objective.terms() {
            if let Some(&i) = bin_index.get(name.as_str()) {
                bin_obj[i] += coefficient;
            } else if let Some(&i) = cont_index.get(name.as_str()) {
                cont_obj[i] += coefficient;
            }
        }
    }

    let mut constraints = Vec::with_capacity(model.constraints.len());
    for constraint in &model.constraints {
        let mut bin_coef = vec![0.0; nbin];
        let mut cont_coef = vec![0.0; model.continuous.len()];
        for (name, coefficient) in &constraint.expr.terms {
            if let Some(&i) = bin_index.get(name.as_str()) {
                bin_coef[i] += coefficient;
            } else if let Some(&i) = cont_index.get(name.as_str()) {
                cont_coef[i] += coefficient;
            }
        }
        let mut cont = None;
        for (i, &coefficient) in cont_coef.iter().enumerate() {
            if coefficient != 0.0 {
                if cont.is_some() {
                    return Err(format!(
                        "constraint {} references more than one continuous variable; \
                         unsupported by BranchBoundSolver",
                        constraint.name
                    ));
                }
                cont = Some((i, coefficient));
            }
        }
        constraints.push(PreparedConstraint {
            bin: bin_coef
                .into_iter()
                .enumerate()
                .filter(|&(_, c)| c != 0.0)
                .collect(),
            cont,
            sense: constraint.sense,
            rhs: constraint.rhs,
        });
    }

    Ok(Prepared {
        nbin,
        bin_obj,
        cont_obj,
        cont_bounds: model.continuous.iter().map(|v| (v.min, v.max)).collect(),
        maximize,
        has_objective,
        constraints,
    })
}

fn dfs(prepared: &Prepared, search: &mut Search, depth: usize) {
    if search.stopped || search.unbounded {
        return;
    }
    if let Some(deadline) = search.deadline {
        if Instant::now() >= deadline {
            search.stopped = true;
            return;
        }
    }
    if !subtree_feasible(prepared, search, depth) {
        return;
    }
    if subtree_dominated(prepared, search, depth) {
        return;
    }
    if depth == prepared.nbin {
        evaluate_leaf(prepared, search);
        return;
    }

    search.assignment[depth] = true;
    dfs(prepared, search, depth + 1);
    search.assignment[depth] = false;
    dfs(prepared, search, depth + 1);
}

/// Range check: can any completion of the fixed prefix still satisfy
/// every constraint? Continuous variables contribute their bound range.
fn subtree_feasible(prepared: &Prepared, search: &Search, depth: usize) -> bool {
    for constraint in &prepared.constraints {
        let mut lo = 0.0;
        let mut hi = 0.0;
        for &(i, coefficient) in &constraint.bin {
            if i < depth {
                if search.assignment[i] {
                    lo += coefficient;
                    hi += coefficient;
                }
            } else {
                lo += coefficient.min(0.0);
                hi += coefficient.max(0.0);
            }
        }
        if let Some((i, coefficient)) = constraint.cont {
            let (min, max) = prepared.cont_bounds[i];
            let a = coefficient * min;
            let b = coefficient * max;
            lo += a.min(b);
            hi += a.max(b);
        }
        let feasible = match constraint.sense {
            ConstraintSense::Le => lo <= constraint.rhs + FEAS_EPS,
            ConstraintSense::Ge => hi >= constraint.rhs - FEAS_EPS,
            ConstraintSense::Eq => {
                lo <= constraint.rhs + FEAS_EPS && hi >= constraint.rhs - FEAS_EPS
            }
        };
        if !feasible {
            return false;
        }
    }
    true
}

/// Bound check: can any completion still strictly beat the incumbent?
fn subtree_dominated(prepared: &Prepared, search: &Search, depth: usize) -> bool {
    let Some(incumbent) = &search.incumbent else {
        return false;
    };
    if !prepared.has_objective {
        // Feasibility search: the first incumbent is final.
        return true;
    }

    let mut optimistic = 0.0;
    for (i, &coefficient) in prepared.bin_obj.iter().enumerate() {
        if i < depth {
            if search.assignment[i] {
                optimistic += coefficient;
            }
        } else if prepared.maximize {
            optimistic += coefficient.max(0.0);
        } else {
            optimistic += coefficient.min(0.0);
        }
    }
    for (i, &weight) in prepared.cont_obj.iter().enumerate() {
        if weight == 0.0 {
            continue;
        }
        let (min, max) = prepared.cont_bounds[i];
        let a = weight * min;
        let b = weight * max;
        optimistic += if prepared.maximize { a.max(b) } else { a.min(b) };
    }
    // Infinite optimism (free continuous objective term) never prunes.
    if optimistic.is_infinite() {
        return false;
    }

    if prepared.maximize {
        optimistic <= incumbent.objective + TIE_EPS
    } else {
        optimistic >= incumbent.objective - TIE_EPS
    }
}

fn evaluate_leaf(prepared: &Prepared, search: &mut Search) {
    // Tighten each continuous variable's interval from the constraints
    // it appears in, and check the pure-binary constraints exactly.
    let mut bounds = prepared.cont_bounds.clone();
    for constraint in &prepared.constraints {
        let bin_sum: f64 = constraint
            .bin
            .iter()
            .filter(|&&(i, _)| search.assignment[i])
            .map(|&(_, c)| c)
            .sum();
        match constraint.cont {
            None => {
                let satisfied = match constraint.sense {
                    ConstraintSense::Le => bin_sum <= constraint.rhs + FEAS_EPS,
                    ConstraintSense::Ge => bin_sum >= constraint.rhs - FEAS_EPS,
                    ConstraintSense::Eq => (bin_sum - constraint.rhs).abs() <= FEAS_EPS,
                };
                if !satisfied {
                    return;
                }
            }
            Some((i, coefficient)) => {
                let residual = (constraint.rhs - bin_sum) / coefficient;
                let (lo, hi) = &mut bounds[i];
                let upper_bounded = match constraint.sense {
                    ConstraintSense::Le => coefficient > 0.0,
                    ConstraintSense::Ge => coefficient < 0.0,
                    ConstraintSense::Eq => {
                        *lo = lo.max(residual);
                        *hi = hi.min(residual);
                        continue;
                    }
                };
                if upper_bounded {
                    *hi = hi.min(residual);
                } else {
                    *lo = lo.max(residual);
                }
            }
        }
    }

    let mut cont_values = Vec::with_capacity(bounds.len());
    let mut objective = 0.0;
    for (i, &(lo, hi)) in bounds.iter().enumerate() {
        if lo > hi + FEAS_EPS {
            return;
        }
        let weight = prepared.cont_obj[i];
        let prefer_high = (weight > 0.0) == prepared.maximize && weight != 0.0;
        let value = if weight == 0.0 {
            if lo.is_finite() {
                lo
            } else if hi.is_finite() {
                hi
            } else {
                0.0
            }
        } else if prefer_high {
            hi
        } else {
            lo
        };
        if value.is_infinite() {
            search.unbounded = true;
            return;
        }
        objective += weight * value;
        cont_values.push(value);
    }
    for (i, &weight) in prepared.bin_obj.iter().enumerate() {
        if search.assignment[i] {
            objective += weight;
        }
    }

    let improves = match &search.incumbent {
        None => true,
        Some(incumbent) if prepared.maximize => objective > incumbent.objective + TIE_EPS,
        Some(incumbent) => objective < incumbent.objective - TIE_EPS,
    };
    if improves {
        search.incumbent = Some(Incumbent {
            objective,
            bins: search.assignment.clone(),
            cont: cont_values,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::{BinaryVar, ContinuousVar, LinearExpr, MilpModel, Objective};

    fn knapsack(costs: &[f64], values: &[f64], budget: f64) -> MilpModel {
        let mut model = MilpModel::new("knapsack");
        let mut cost_expr = LinearExpr::new();
        let mut terms = Vec::new();
        for (i, (&cost, &value)) in costs.iter().zip(values).enumerate() {
            let name = format!("x{i}");
            model.add_binary(BinaryVar::new(&name));
            cost_expr = cost_expr.term(&name, cost);
            terms.push((name, value));
        }
        model.add_constraint("budget", cost_expr, ConstraintSense::Le, budget);
        model.set_objective(Objective::Maximize { terms });
        model
    }

    #[test]
    fn test_knapsack_optimal() {
        // Classic: budget 10, best is {x1, x2} with value 14.
        let model = knapsack(&[6.0, 5.0, 5.0], &[9.0, 7.0, 7.0], 10.0);
        let solution = BranchBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective_value, Some(14.0));
        assert_eq!(solution.value("x0"), Some(0.0));
        assert_eq!(solution.value("x1"), Some(1.0));
        assert_eq!(solution.value("x2"), Some(1.0));
    }

    #[test]
    fn test_empty_selection_is_optimal_when_nothing_pays() {
        let model = knapsack(&[2.0, 3.0], &[-1.0, -5.0], 10.0);
        let solution = BranchBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective_value, Some(0.0));
        assert_eq!(solution.value("x0"), Some(0.0));
        assert_eq!(solution.value("x1"), Some(0.0));
    }

    #[test]
    fn test_infeasible() {
        let mut model = MilpModel::new("infeasible");
        model.add_binary(BinaryVar::new("x"));
        model.add_constraint(
            "on",
            LinearExpr::new().term("x", 1.0),
            ConstraintSense::Ge,
            1.0,
        );
        model.add_constraint(
            "off",
            LinearExpr::new().term("x", 1.0),
            ConstraintSense::Le,
            0.0,
        );
        let solution = BranchBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(!solution.has_incumbent());
    }

    #[test]
    fn test_tie_break_prefers_earlier_declared() {
        // Two identical items, only one fits: the first declared wins.
        let model = knapsack(&[3.0, 3.0], &[5.0, 5.0], 3.0);
        let solution = BranchBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.value("x0"), Some(1.0));
        assert_eq!(solution.value("x1"), Some(0.0));
    }

    #[test]
    fn test_continuous_min_of_max() {
        // min t  s.t.  t >= 4 - 3x,  t >= 1 + x,  x binary.
        // x=1: t >= 1 and t >= 2 -> t = 2.  x=0: t >= 4 -> t = 4.
        let mut model = MilpModel::new("minimax");
        model.add_binary(BinaryVar::new("x"));
        model.add_continuous(ContinuousVar::free("t"));
        model.add_constraint(
            "c1",
            LinearExpr::new().term("t", 1.0).term("x", 3.0),
            ConstraintSense::Ge,
            4.0,
        );
        model.add_constraint(
            "c2",
            LinearExpr::new().term("t", 1.0).term("x", -1.0),
            ConstraintSense::Ge,
            1.0,
        );
        model.set_objective(Objective::Minimize {
            terms: vec![("t".into(), 1.0)],
        });
        let solution = BranchBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective_value, Some(2.0));
        assert_eq!(solution.value("x"), Some(1.0));
        assert_eq!(solution.value("t"), Some(2.0));
    }

    #[test]
    fn test_unbounded() {
        let mut model = MilpModel::new("unbounded");
        model.add_continuous(ContinuousVar::free("t"));
        model.set_objective(Objective::Maximize {
            terms: vec![("t".into(), 1.0)],
        });
        let solution = BranchBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Unbounded);
    }

    #[test]
    fn test_time_limit_stops() {
        let model = knapsack(&[1.0; 16], &[1.0; 16], 8.0);
        let config = SolverConfig::default().with_time_limit_ms(0);
        let solution = BranchBoundSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolveStatus::Stopped);
    }

    #[test]
    fn test_invalid_model_is_error() {
        let mut model = MilpModel::new("bad");
        model.set_objective(Objective::Maximize {
            terms: vec![("ghost".into(), 1.0)],
        });
        let solution = BranchBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Error);
        assert!(solution.message.is_some());
    }

    #[test]
    fn test_two_continuous_in_one_constraint_is_error() {
        let mut model = MilpModel::new("unsupported");
        model.add_continuous(ContinuousVar::new("a", 0.0, 1.0));
        model.add_continuous(ContinuousVar::new("b", 0.0, 1.0));
        model.add_constraint(
            "sum",
            LinearExpr::new().term("a", 1.0).term("b", 1.0),
            ConstraintSense::Le,
            1.0,
        );
        let solution = BranchBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Error);
    }

    #[test]
    fn test_determinism() {
        let model = knapsack(&[4.0, 3.0, 3.0], &[9.0, 7.0, 7.0], 7.0);
        let solver = BranchBoundSolver::new();
        let a = solver.solve(&model, &SolverConfig::default());
        let b = solver.solve(&model, &SolverConfig::default());
        assert_eq!(a.status, b.status);
        assert_eq!(a.objective_value, b.objective_value);
        assert_eq!(a.values, b.values);
    }

    #[test]
    fn test_equality_constraint() {
        let mut model = MilpModel::new("eq");
        model.add_binary(BinaryVar::new("x"));
        model.add_binary(BinaryVar::new("y"));
        model.add_constraint(
            "pick_one",
            LinearExpr::new().term("x", 1.0).term("y", 1.0),
            ConstraintSense::Eq,
            1.0,
        );
        model.set_objective(Objective::Maximize {
            terms: vec![("x".into(), 1.0), ("y".into(), 3.0)],
        });
        let solution = BranchBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective_value, Some(3.0));
        assert_eq!(solution.value("y"), Some(1.0));
    }
}
