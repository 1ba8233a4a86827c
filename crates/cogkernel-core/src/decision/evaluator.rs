//! Softmax decision evaluator
//!
//! Utility: `U = reward - effort - κ·risk`. Selection probabilities:
//! `softmax(β·U)`, shifted by the maximum for numerical stability. The
//! choice is the highest-utility action; the earliest wins ties.

use tracing::debug;

use super::{Action, Choice, DecisionError, DecisionEvaluator, Evaluation, Result};
use crate::modes::ModeProfile;

/// Default risk-aversion coefficient κ
pub const DEFAULT_RISK_AVERSION: f64 = 0.5;

/// Reference evaluator with capacity-limited working memory.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftmaxEvaluator {
    temperature: f64,
    risk_aversion: f64,
    capacity: usize,
    working_memory: Vec<(String, f64)>,
}

impl Default for SoftmaxEvaluator {
    fn default() -> Self {
        Self::from_profile(&ModeProfile::default())
    }
}

impl SoftmaxEvaluator {
    pub fn from_profile(profile: &ModeProfile) -> Self {
        Self {
            temperature: profile.decision_temperature(),
            risk_aversion: DEFAULT_RISK_AVERSION,
            capacity: profile.working_memory_capacity(),
            working_memory: Vec::new(),
        }
    }

    pub fn with_risk_aversion(mut self, risk_aversion: f64) -> Result<Self> {
        if !(risk_aversion.is_finite() && risk_aversion >= 0.0) {
            return Err(DecisionError::InvalidParameter {
                name: "risk_aversion",
                value: risk_aversion,
            });
        }
        self.risk_aversion = risk_aversion;
        Ok(self)
    }

    /// Inverse temperature β
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn risk_aversion(&self) -> f64 {
        self.risk_aversion
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn working_memory(&self) -> &[(String, f64)] {
        &self.working_memory
    }

    pub fn utility(&self, action: &Action) -> f64 {
        action.expected_reward - action.effort_cost - self.risk_aversion * action.risk
    }

    pub fn softmax(&self, utilities: &[f64]) -> Vec<f64> {
        if utilities.is_empty() {
            return Vec::new();
        }
        let max = utilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = utilities
            .iter()
            .map(|u| (self.temperature * (u - max)).exp())
            .collect();
        let total: f64 = weights.iter().sum();
        weights.into_iter().map(|w| w / total).collect()
    }

    fn trim_working_memory(&mut self) {
        // stable sort keeps load order among equal importance
        self.working_memory.sort_by(|a, b| b.1.total_cmp(&a.1));
        self.working_memory.truncate(self.capacity);
    }
}

impl DecisionEvaluator for SoftmaxEvaluator {
    fn load_working_memory(&mut self, items: &[(String, f64)]) {
        self.working_memory = items.to_vec();
        self.trim_working_memory();
    }

    fn evaluate(&mut self, actions: &[Action]) -> Result<Evaluation> {
        if actions.is_empty() {
            return Ok(Evaluation::default());
        }
        for action in actions {
            let fields = [
                ("expected_reward", action.expected_reward),
                ("effort_cost", action.effort_cost),
                ("risk", action.risk),
            ];
            for (field, value) in fields {
                if !value.is_finite() {
                    return Err(DecisionError::InvalidScore {
                        action: action.name.clone(),
                        field,
                        value,
                    });
                }
            }
        }

        let utilities: Vec<f64> = actions.iter().map(|a| self.utility(a)).collect();
        let probabilities = self.softmax(&utilities);

        let mut best = 0;
        for (i, u) in utilities.iter().enumerate().skip(1) {
            if *u > utilities[best] {
                best = i;
            }
        }
        let choice = Choice {
            name: actions[best].name.clone(),
            utility: utilities[best],
            probability: probabilities[best],
        };
        debug!(
            action = %choice.name,
            utility = choice.utility,
            probability = choice.probability,
            "Evaluated actions"
        );

        Ok(Evaluation {
            utilities,
            probabilities,
            choice: Some(choice),
        })
    }

    fn configure(&mut self, profile: &ModeProfile) {
        self.temperature = profile.decision_temperature();
        self.capacity = profile.working_memory_capacity();
        self.trim_working_memory();
    }
}
