//! # Decision Scoring
//!
//! The decision cycle consumes two collaborators through narrow traits:
//!
//! - [`DecisionEvaluator`]: turns candidate actions into utilities, a
//!   probability distribution, and a choice
//! - [`RelevanceScorer`]: scores how strongly recalled memories support an
//!   option
//!
//! Reference implementations are [`SoftmaxEvaluator`] (utility with risk
//! aversion, softmax selection, capacity-limited working memory) and
//! [`KeywordRelevance`].

mod evaluator;
mod relevance;

pub use evaluator::{DEFAULT_RISK_AVERSION, SoftmaxEvaluator};
pub use relevance::{ActionFactory, IGNORED_VERBS, KeywordRelevance};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::memory::MemoryRecord;
use crate::modes::ModeProfile;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Errors raised while scoring options
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecisionError {
    /// No candidate options were supplied
    #[error("No options to decide between")]
    NoOptions,

    /// The same option name appears twice
    #[error("Duplicate option: {0}")]
    DuplicateOption(String),

    /// An action carries a non-finite score
    #[error("Invalid score for action {action}: {field} = {value}")]
    InvalidScore {
        action: String,
        field: &'static str,
        value: f64,
    },

    /// Evaluator parameter out of range
    #[error("Invalid evaluator parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, DecisionError>;

// ============================================================================
// TYPES
// ============================================================================

/// A scored option candidate, owned by one decision cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub name: String,
    pub expected_reward: f64,
    pub effort_cost: f64,
    pub risk: f64,
}

impl Action {
    pub fn new(id: impl Into<String>, name: impl Into<String>, expected_reward: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expected_reward,
            effort_cost: 0.0,
            risk: 0.0,
        }
    }

    pub fn with_costs(mut self, effort_cost: f64, risk: f64) -> Self {
        self.effort_cost = effort_cost;
        self.risk = risk;
        self
    }
}

/// The selected action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub name: String,
    pub utility: f64,
    pub probability: f64,
}

/// Result of evaluating a set of actions.
///
/// `utilities` and `probabilities` are parallel to the evaluated actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub utilities: Vec<f64>,
    pub probabilities: Vec<f64>,
    pub choice: Option<Choice>,
}

// ============================================================================
// TRAITS
// ============================================================================

/// Scores candidate actions. Holds working memory between calls.
pub trait DecisionEvaluator: Send {
    /// Replace working memory with ranked `(id, importance)` pairs.
    fn load_working_memory(&mut self, items: &[(String, f64)]);

    /// Score actions into utilities, probabilities and a choice.
    fn evaluate(&mut self, actions: &[Action]) -> Result<Evaluation>;

    /// Adopt mode-dependent parameters (temperature, capacity).
    fn configure(&mut self, profile: &ModeProfile);
}

/// How strongly a set of memories supports an option (0-1).
pub trait RelevanceScorer: Send + Sync {
    fn relevance(&self, option: &str, memories: &[MemoryRecord]) -> f64;
}
