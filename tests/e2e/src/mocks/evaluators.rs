//! Scripted collaborators
//!
//! - [`FixedEvaluator`]: returns a preset distribution regardless of input
//! - [`SpyStep`]: records what the context looked like when it ran

use std::sync::{Arc, Mutex};

use cogkernel_core::decision::Result as DecisionResult;
use cogkernel_core::pipeline::Result as PipelineResult;
use cogkernel_core::{
    Action, Choice, DecisionError, DecisionEvaluator, Evaluation, ModeProfile, PipelineContext,
    PipelineStep,
};

/// Evaluator that always produces the same probabilities.
///
/// The chosen action is the one with the highest preset probability.
/// Working memory and profile updates are recorded for inspection.
#[derive(Debug, Clone, Default)]
pub struct FixedEvaluator {
    pub probabilities: Vec<f64>,
    pub working_memory: Arc<Mutex<Vec<(String, f64)>>>,
    pub configured_betas: Arc<Mutex<Vec<f64>>>,
}

impl FixedEvaluator {
    pub fn new(probabilities: Vec<f64>) -> Self {
        Self {
            probabilities,
            ..Default::default()
        }
    }
}

impl DecisionEvaluator for FixedEvaluator {
    fn load_working_memory(&mut self, items: &[(String, f64)]) {
        if let Ok(mut wm) = self.working_memory.lock() {
            *wm = items.to_vec();
        }
    }

    fn evaluate(&mut self, actions: &[Action]) -> DecisionResult<Evaluation> {
        if actions.len() != self.probabilities.len() {
            return Err(DecisionError::InvalidParameter {
                name: "actions",
                value: actions.len() as f64,
            });
        }
        let utilities: Vec<f64> = actions.iter().map(|a| a.expected_reward).collect();
        let best = self
            .probabilities
            .iter()
            .enumerate()
            .fold(0, |best, (i, p)| if *p > self.probabilities[best] { i } else { best });
        let choice = actions.get(best).map(|a| Choice {
            name: a.name.clone(),
            utility: utilities[best],
            probability: self.probabilities[best],
        });
        Ok(Evaluation {
            utilities,
            probabilities: self.probabilities.clone(),
            choice,
        })
    }

    fn configure(&mut self, profile: &ModeProfile) {
        if let Ok(mut betas) = self.configured_betas.lock() {
            betas.push(profile.decision_temperature());
        }
    }
}

/// Snapshot of the context as seen by a [`SpyStep`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub memories: usize,
    pub actions: Vec<String>,
    pub entropy: f64,
    pub torque: usize,
}

/// Step that records the context it sees without changing it.
#[derive(Debug, Clone, Default)]
pub struct SpyStep {
    pub seen: Arc<Mutex<Vec<Observation>>>,
}

impl SpyStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl PipelineStep for SpyStep {
    fn name(&self) -> &'static str {
        "Spy"
    }

    fn process(&self, context: &mut PipelineContext) -> PipelineResult<()> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(Observation {
                memories: context.memories.len(),
                actions: context.actions.iter().map(|a| a.name.clone()).collect(),
                entropy: context.entropy,
                torque: context.torque.len(),
            });
        }
        Ok(())
    }
}
