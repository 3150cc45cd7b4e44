//! Confidence penalty transform.
//!
//! Return estimates carry a confidence score in [0, 1]. Before any rule
//! optimizes over them, every scenario return is blended toward the
//! initiative's own worst-case return:
//!
//! ```text
//! effective(j) = (1 - gamma) * raw(j) + gamma * raw(worst)
//! ```
//!
//! where `gamma = 1 - confidence` by default. A caller-supplied penalty
//! function may replace the linear mapping entirely, provided it maps a
//! confidence score to a weight in [0, 1].
//!
//! The transform is pure: it produces a new [`PenalizedInitiative`] and
//! leaves the input untouched. Because gamma lies in [0, 1], an
//! effective return never leaves the closed interval between the raw
//! scenario return and the raw worst-case return.

use std::collections::BTreeMap;

use crate::error::SelectError;
use crate::rules::Initiative;
use crate::scenario::ScenarioSet;

/// A confidence-to-penalty-weight mapping.
///
/// The returned weight must lie in [0, 1]; rules validate the output of
/// caller-supplied functions before using it.
pub type PenaltyFn = dyn Fn(f64) -> Result<f64, SelectError>;

/// Default penalty: `gamma = 1 - confidence`.
///
/// # Errors
///
/// `Validation` if `confidence` lies outside [0, 1].
///
/// # Examples
///
/// ```
/// use scenario_select::penalty::gamma;
///
/// assert_eq!(gamma(1.0).unwrap(), 0.0);
/// assert_eq!(gamma(0.0).unwrap(), 1.0);
/// assert!(gamma(1.5).is_err());
/// ```
pub fn gamma(confidence: f64) -> Result<f64, SelectError> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(SelectError::Validation(format!(
            "confidence must be between 0 and 1, got {confidence}"
        )));
    }
    Ok(1.0 - confidence)
}

/// An initiative after the confidence penalty has been applied.
///
/// Derived per solve call and never persisted; the raw worst-case
/// return is kept because the minimum-worst-return constraint binds on
/// raw, not penalized, values.
#[derive(Debug, Clone, PartialEq)]
pub struct PenalizedInitiative {
    /// Initiative identifier.
    pub id: String,
    /// Raw cost (unchanged by the transform).
    pub cost: f64,
    /// Original confidence score.
    pub confidence: f64,
    /// Penalty weight used for the blend.
    pub gamma: f64,
    /// Raw return under the worst-case reference scenario.
    pub raw_worst: f64,
    /// Effective (penalized) return per declared scenario.
    pub effective: BTreeMap<String, f64>,
}

/// Applies the confidence penalty to one initiative.
///
/// Produces a new record; `initiative` is not mutated. Every scenario
/// declared in `scenarios` must have a return on the initiative; extra
/// undeclared return keys are ignored.
///
/// # Errors
///
/// `Validation` if the penalty function rejects the confidence, returns
/// a weight outside [0, 1], or a declared scenario return is missing.
pub fn effective_returns(
    initiative: &Initiative,
    scenarios: &ScenarioSet,
    penalty: &PenaltyFn,
) -> Result<PenalizedInitiative, SelectError> {
    let g = penalty(initiative.confidence)?;
    if !(0.0..=1.0).contains(&g) {
        return Err(SelectError::Validation(format!(
            "penalty weight must be between 0 and 1, got {g} for initiative '{}'",
            initiative.id
        )));
    }

    let raw_worst = raw_return(initiative, scenarios.worst())?;

    let mut effective = BTreeMap::new();
    for name in scenarios.names() {
        let raw = raw_return(initiative, name)?;
        effective.insert(name.clone(), (1.0 - g) * raw + g * raw_worst);
    }

    Ok(PenalizedInitiative {
        id: initiative.id.clone(),
        cost: initiative.cost,
        confidence: initiative.confidence,
        gamma: g,
        raw_worst,
        effective,
    })
}

fn raw_return(initiative: &Initiative, scenario: &str) -> Result<f64, SelectError> {
    initiative.returns.get(scenario).copied().ok_or_else(|| {
        SelectError::Validation(format!(
            "initiative '{}' has no return for scenario '{scenario}'",
            initiative.id
        ))
    })
}
