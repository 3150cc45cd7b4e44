//! MILP model definition.

use std::collections::HashSet;

/// A binary (0/1) decision variable.
#[derive(Debug, Clone)]
pub struct BinaryVar {
    /// Variable name (unique identifier within a model).
    pub name: String,
}

impl BinaryVar {
    /// Creates a new binary variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A continuous decision variable with bounds.
///
/// Bounds may be infinite; a free variable is unbounded on both sides.
#[derive(Debug, Clone)]
pub struct ContinuousVar {
    /// Variable name.
    pub name: String,
    /// Lower bound (may be `f64::NEG_INFINITY`).
    pub min: f64,
    /// Upper bound (may be `f64::INFINITY`).
    pub max: f64,
}

impl ContinuousVar {
    /// Creates a continuous variable with the given bounds.
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// Creates a continuous variable unrestricted in sign.
    pub fn free(name: impl Into<String>) -> Self {
        Self::new(name, f64::NEG_INFINITY, f64::INFINITY)
    }
}

/// A linear expression: a sum of `coefficient * variable` terms.
#[derive(Debug, Clone, Default)]
pub struct LinearExpr {
    /// (variable_name, coefficient) pairs.
    pub terms: Vec<(String, f64)>,
}

impl LinearExpr {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a term; builder-style.
    pub fn term(mut self, var: impl Into<String>, coefficient: f64) -> Self {
        self.terms.push((var.into(), coefficient));
        self
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().map(|(n, c)| (n.into(), c)).collect(),
        }
    }
}

/// Direction of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
    /// `expr == rhs`
    Eq,
}

/// A linear constraint `expr <sense> rhs`.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    /// Constraint name (for diagnostics).
    pub name: String,
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Direction.
    pub sense: ConstraintSense,
    /// Right-hand side constant.
    pub rhs: f64,
}

/// Objective function for the model.
#[derive(Debug, Clone)]
pub enum Objective {
    /// Minimize a linear combination of variables.
    Minimize {
        /// (variable_name, coefficient) pairs.
        terms: Vec<(String, f64)>,
    },

    /// Maximize a linear combination of variables.
    Maximize {
        /// (variable_name, coefficient) pairs.
        terms: Vec<(String, f64)>,
    },
}

impl Objective {
    /// The objective's terms, regardless of direction.
    pub fn terms(&self) -> &[(String, f64)] {
        match self {
            Objective::Minimize { terms } | Objective::Maximize { terms } => terms,
        }
    }
}

/// A mixed 0/1 linear program.
///
/// Variable order is significant: solvers must break objective ties by
/// a rule derived from declaration order, so models built from the same
/// inputs solve to the same assignment.
///
/// # Examples
///
/// ```
/// use scenario_select::milp::{BinaryVar, ConstraintSense, LinearExpr, MilpModel, Objective};
///
/// let mut model = MilpModel::new("knapsack");
/// model.add_binary(BinaryVar::new("a"));
/// model.add_binary(BinaryVar::new("b"));
/// model.add_constraint(
///     "budget",
///     LinearExpr::new().term("a", 4.0).term("b", 3.0),
///     ConstraintSense::Le,
///     5.0,
/// );
/// model.set_objective(Objective::Maximize {
///     terms: vec![("a".into(), 10.0), ("b".into(), 6.0)],
/// });
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MilpModel {
    /// Model name.
    pub name: String,
    /// Binary variables, in declaration order.
    pub binaries: Vec<BinaryVar>,
    /// Continuous variables, in declaration order.
    pub continuous: Vec<ContinuousVar>,
    /// Constraints.
    pub constraints: Vec<LinearConstraint>,
    /// Objective function.
    pub objective: Option<Objective>,
}

impl MilpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binaries: Vec::new(),
            continuous: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Adds a binary variable.
    pub fn add_binary(&mut self, var: BinaryVar) {
        self.binaries.push(var);
    }

    /// Adds a continuous variable.
    pub fn add_continuous(&mut self, var: ContinuousVar) {
        self.continuous.push(var);
    }

    /// Adds a constraint.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        expr: LinearExpr,
        sense: ConstraintSense,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            expr,
            sense,
            rhs,
        });
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    /// Validates the model for consistency.
    ///
    /// Checks that variable names are unique across both kinds and that
    /// every name referenced by a constraint or the objective exists.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen: HashSet<&str> = HashSet::new();
        for name in self
            .binaries
            .iter()
            .map(|v| v.name.as_str())
            .chain(self.continuous.iter().map(|v| v.name.as_str()))
        {
            if !seen.insert(name) {
                return Err(format!("duplicate variable: {name}"));
            }
        }
        for var in &self.continuous {
            if var.min > var.max {
                return Err(format!(
                    "continuous variable {} has min {} > max {}",
                    var.name, var.min, var.max
                ));
            }
        }
        for constraint in &self.constraints {
            for (name, _) in &constraint.expr.terms {
                if !seen.contains(name.as_str()) {
                    return Err(format!(
                        "constraint {} references undefined variable: {name}",
                        constraint.name
                    ));
                }
            }
        }
        if let Some(objective) = &self.objective {
            for (name, _) in objective.terms() {
                if !seen.contains(name.as_str()) {
                    return Err(format!("objective references undefined variable: {name}"));
                }
            }
        }
        Ok(())
    }

    /// Returns the number of decision variables.
    pub fn variable_count(&self) -> usize {
        self.binaries.len() + self.continuous.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        let mut model = MilpModel::new("test");
        model.add_binary(BinaryVar::new("x1"));
        model.add_binary(BinaryVar::new("x2"));
        model.add_continuous(ContinuousVar::free("theta"));
        model.add_constraint(
            "cap",
            LinearExpr::new().term("x1", 2.0).term("x2", 3.0),
            ConstraintSense::Le,
            4.0,
        );
        model.set_objective(Objective::Minimize {
            terms: vec![("theta".into(), 1.0)],
        });

        assert_eq!(model.variable_count(), 3);
        assert_eq!(model.constraint_count(), 1);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_duplicate_variable() {
        let mut model = MilpModel::new("test");
        model.add_binary(BinaryVar::new("x"));
        model.add_continuous(ContinuousVar::new("x", 0.0, 1.0));
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_undefined_in_constraint() {
        let mut model = MilpModel::new("test");
        model.add_constraint(
            "bad",
            LinearExpr::new().term("ghost", 1.0),
            ConstraintSense::Ge,
            0.0,
        );
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_undefined_in_objective() {
        let mut model = MilpModel::new("test");
        model.set_objective(Objective::Maximize {
            terms: vec![("ghost".into(), 1.0)],
        });
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_inverted_bounds() {
        let mut model = MilpModel::new("test");
        model.add_continuous(ContinuousVar::new("c", 2.0, 1.0));
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_expr_from_iterator() {
        let expr: LinearExpr = [("a", 1.0), ("b", 2.0)].into_iter().collect();
        assert_eq!(expr.terms.len(), 2);
        assert_eq!(expr.terms[1], ("b".to_string(), 2.0));
    }
}
