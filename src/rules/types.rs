//! Input, configuration, and result types shared by every decision rule.

use std::collections::BTreeMap;

/// A candidate initiative.
///
/// Carries one return estimate per scenario name and a confidence score
/// in [0, 1]. Immutable once handed to a rule: every transform produces
/// a new record.
///
/// # Examples
///
/// ```
/// use scenario_select::rules::Initiative;
///
/// let a = Initiative::new("A", 4.0, 0.9)
///     .with_return("best", 15.0)
///     .with_return("med", 10.0)
///     .with_return("worst", 2.0);
/// assert_eq!(a.returns["med"], 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Initiative {
    /// Unique identifier.
    pub id: String,
    /// Non-negative cost.
    pub cost: f64,
    /// Return estimate per scenario name (any sign).
    pub returns: BTreeMap<String, f64>,
    /// Confidence in the estimates, in [0, 1].
    pub confidence: f64,
}

impl Initiative {
    /// Creates an initiative with no return estimates yet.
    pub fn new(id: impl Into<String>, cost: f64, confidence: f64) -> Self {
        Self {
            id: id.into(),
            cost,
            returns: BTreeMap::new(),
            confidence,
        }
    }

    /// Adds a return estimate for one scenario; builder-style.
    pub fn with_return(mut self, scenario: impl Into<String>, value: f64) -> Self {
        self.returns.insert(scenario.into(), value);
        self
    }
}

/// Thresholds and limits for one solve call.
///
/// # Examples
///
/// ```
/// use scenario_select::rules::SolveConfig;
///
/// let config = SolveConfig::default()
///     .with_min_confidence(0.5)
///     .with_min_worst_return(1.0)
///     .with_time_limit_ms(5_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SolveConfig {
    /// Initiatives below this confidence are excluded before solving.
    /// Default 0.0 (no filtering).
    pub min_confidence: f64,

    /// Minimum aggregate raw worst-case return the portfolio must
    /// reach. Default 0.0 (unconstrained).
    pub min_worst_return: f64,

    /// Wall-clock time limit per solve in milliseconds. `None` = no
    /// limit. When it stops a solve before proof of optimality the
    /// rule reports [`RuleStatus::Stopped`].
    pub time_limit_ms: Option<u64>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            min_worst_return: 0.0,
            time_limit_ms: None,
        }
    }
}

impl SolveConfig {
    pub fn with_min_confidence(mut self, threshold: f64) -> Self {
        self.min_confidence = threshold;
        self
    }

    pub fn with_min_worst_return(mut self, threshold: f64) -> Self {
        self.min_worst_return = threshold;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(format!(
                "min_confidence must be between 0 and 1, got {}",
                self.min_confidence
            ));
        }
        Ok(())
    }
}

/// Identifier of a decision rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleKind {
    /// Minimize the maximum regret across scenarios.
    MinimaxRegret,
    /// Maximize the expected return under scenario weights.
    Bayesian,
}

impl RuleKind {
    /// Stable string identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::MinimaxRegret => "minimax_regret",
            RuleKind::Bayesian => "bayesian",
        }
    }
}

/// Termination status of a rule solve.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleStatus {
    /// Solved to proven optimality.
    Optimal,
    /// No selection satisfies the constraints. Also covers the cases
    /// where confidence filtering leaves no candidates or no candidate
    /// fits the budget (an empty portfolio is not an allocation).
    Infeasible,
    /// The time limit expired before proof of optimality; the selection
    /// carries the best incumbent found, possibly none.
    Stopped,
    /// The solving capability failed for a reason other than
    /// infeasibility; carries the triggering detail.
    Error(String),
}

/// The selected portfolio and its aggregates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    /// Identifiers of selected initiatives, in input order.
    pub ids: Vec<String>,
    /// Sum of raw costs of the selected initiatives.
    pub total_cost: f64,
    /// Sum of effective returns per declared scenario.
    pub returns: BTreeMap<String, f64>,
}

/// Rule-specific diagnostics.
///
/// Tagged per rule so new rules never force changes on shared
/// consumers; only the producing rule is allowed to interpret its own
/// payload.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleDetail {
    /// Minimax-regret diagnostics.
    MinimaxRegret {
        /// Best achievable return per scenario under the budget alone.
        benchmarks: BTreeMap<String, f64>,
        /// `benchmark - achieved` per scenario for the chosen selection.
        regrets: BTreeMap<String, f64>,
    },
    /// Bayesian-weighted diagnostics.
    Bayesian {
        /// The normalized weights actually used.
        weights: BTreeMap<String, f64>,
    },
}

/// Uniform result of a decision-rule solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleResult {
    /// Termination status.
    pub status: RuleStatus,
    /// The rule's objective value: minimized maximum regret, or maximal
    /// weighted expected return. `None` unless an incumbent exists.
    pub objective: Option<f64>,
    /// The selected portfolio (empty on `Infeasible`/`Error`).
    pub selection: Selection,
    /// Which rule produced this result.
    pub rule: RuleKind,
    /// Rule-owned diagnostics; opaque to rule-unaware consumers.
    pub detail: RuleDetail,
}
