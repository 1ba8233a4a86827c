//! Per-cycle context and result

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::decision::{Action, Choice};
use crate::dynamics::DistressSignal;
use crate::memory::MemoryRecord;

/// Final output of one decision cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    /// Chosen option, if any
    pub action: Option<String>,
    pub utility: f64,
    pub probability: f64,
    pub probability_distribution: BTreeMap<String, f64>,
    pub entropy: f64,
    pub core_strength: f64,
    pub habit_suggestion: Option<String>,
    /// The chosen option differs from the habit suggestion
    pub conflict: bool,
    pub cognitive_distress: bool,
    pub distress_message: String,
}

/// Mutable record threaded through every step of one cycle.
///
/// Owned by a single `execute` call; never shared between cycles.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    pub options: Vec<String>,
    pub habit_suggestion: Option<String>,
    pub memories: Vec<MemoryRecord>,
    pub actions: Vec<Action>,
    /// Parallel to `actions`
    pub utilities: Vec<f64>,
    /// Parallel to `actions`
    pub probabilities: Vec<f64>,
    pub choice: Option<Choice>,
    pub entropy: f64,
    pub core_strength: f64,
    pub torque: BTreeMap<String, f64>,
    pub distress: Option<DistressSignal>,
    pub metadata: Map<String, Value>,
    pub result: Option<DecisionResult>,
}

impl PipelineContext {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn with_habit(mut self, habit: impl Into<String>) -> Self {
        self.habit_suggestion = Some(habit.into());
        self
    }

    /// Probabilities keyed by option name.
    pub fn probability_distribution(&self) -> BTreeMap<String, f64> {
        self.actions
            .iter()
            .map(|a| a.name.clone())
            .zip(self.probabilities.iter().copied())
            .collect()
    }
}
