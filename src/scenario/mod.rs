//! Scenario sets.
//!
//! A scenario is one named hypothetical future outcome for which every
//! initiative carries a return estimate. A [`ScenarioSet`] is an ordered,
//! non-empty collection of scenario names with exactly one designated as
//! the pessimistic (worst-case) reference; the confidence penalty blends
//! every scenario's return toward that reference.
//!
//! The set is data, not a constant: rules accept it as a parameter and
//! the historical three-name default `{best, med, worst}` is merely the
//! [`Default`] value.

use crate::error::SelectError;

/// An ordered set of named scenarios with one worst-case reference.
///
/// # Examples
///
/// ```
/// use scenario_select::scenario::ScenarioSet;
///
/// let set = ScenarioSet::new(
///     ["boom", "base", "bust"],
///     "bust",
/// ).unwrap();
/// assert_eq!(set.worst(), "bust");
/// assert_eq!(set.len(), 3);
///
/// let default = ScenarioSet::default();
/// assert_eq!(default.names(), ["best", "med", "worst"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioSet {
    names: Vec<String>,
    worst: String,
}

impl ScenarioSet {
    /// Creates a scenario set from ordered names and the worst reference.
    ///
    /// # Errors
    ///
    /// `Validation` if `names` is empty or contains duplicates;
    /// `Configuration` if `worst` is not one of `names`.
    pub fn new<I, S>(names: I, worst: impl Into<String>) -> Result<Self, SelectError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let worst = worst.into();

        if names.is_empty() {
            return Err(SelectError::Validation(
                "scenario set must be non-empty".into(),
            ));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(SelectError::Validation(format!(
                    "duplicate scenario name: {name}"
                )));
            }
        }
        if !names.contains(&worst) {
            return Err(SelectError::Configuration(format!(
                "worst reference '{worst}' is not a declared scenario"
            )));
        }

        Ok(Self { names, worst })
    }

    /// Declared scenario names, in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The designated worst-case reference scenario.
    pub fn worst(&self) -> &str {
        &self.worst
    }

    /// Whether `name` is a declared scenario.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Number of declared scenarios.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set is empty (never true for a constructed set).
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ScenarioSet {
    /// The historical three-scenario set: best, med, worst.
    fn default() -> Self {
        Self {
            names: vec!["best".into(), "med".into(), "worst".into()],
            worst: "worst".into(),
        }
    }
}
