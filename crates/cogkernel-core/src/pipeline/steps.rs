//! Standard decision-cycle steps
//!
//! Steps reach long-lived components through [`Shared`] handles; the
//! context itself is the only per-cycle state.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, warn};

use super::{DecisionResult, PipelineContext, PipelineError, PipelineStep, Result};
use crate::clock::SharedClock;
use crate::decision::{ActionFactory, DecisionEvaluator, Evaluation};
use crate::dynamics::DynamicsCore;
use crate::memory::{DEFAULT_RECENCY_HALF_LIFE_SECS, MemorySource};
use crate::ranking::ImportanceRanker;

/// Handle to a component shared between steps and the owning kernel.
pub type Shared<T> = Arc<Mutex<T>>;

fn lock<'a, T: ?Sized>(handle: &'a Shared<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    handle
        .lock()
        .map_err(|e| PipelineError::LockPoisoned(format!("{what}: {e}")))
}

fn apply_evaluation(context: &mut PipelineContext, evaluation: Evaluation) {
    context.utilities = evaluation.utilities;
    context.probabilities = evaluation.probabilities;
    context.choice = evaluation.choice;
}

// ============================================================================
// MEMORY LOAD
// ============================================================================

/// Rebuilds the importance graph and loads the top-ranked memories.
///
/// The number of memories defaults to the active profile's working-memory
/// capacity.
pub struct MemoryLoadStep {
    source: Shared<dyn MemorySource>,
    ranker: Shared<ImportanceRanker>,
    dynamics: Shared<DynamicsCore>,
    clock: SharedClock,
    capacity: Option<usize>,
    half_life_secs: f64,
}

impl MemoryLoadStep {
    pub fn new(
        source: Shared<dyn MemorySource>,
        ranker: Shared<ImportanceRanker>,
        dynamics: Shared<DynamicsCore>,
        clock: SharedClock,
    ) -> Self {
        Self {
            source,
            ranker,
            dynamics,
            clock,
            capacity: None,
            half_life_secs: DEFAULT_RECENCY_HALF_LIFE_SECS,
        }
    }

    /// Load a fixed number of memories regardless of mode.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_half_life(mut self, half_life_secs: f64) -> Self {
        self.half_life_secs = half_life_secs;
        self
    }
}

impl PipelineStep for MemoryLoadStep {
    fn name(&self) -> &'static str {
        "MemoryLoad"
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let capacity = match self.capacity {
            Some(k) => k,
            None => lock(&self.dynamics, "dynamics")?
                .profile()
                .working_memory_capacity(),
        };

        let source = lock(&self.source, "memory source")?;
        let inputs = source.graph_inputs(self.clock.now(), self.half_life_secs);

        let mut ranker = lock(&self.ranker, "ranker")?;
        ranker.build_graph(inputs.edges, inputs.nodes)?;
        ranker.calculate_importance();

        context.memories = ranker
            .get_top_memories(capacity)
            .into_iter()
            .filter_map(|(id, score)| source.record(&id, score))
            .collect();
        debug!(loaded = context.memories.len(), capacity, "Memories loaded");
        Ok(())
    }
}

// ============================================================================
// WORKING MEMORY
// ============================================================================

/// Hands the loaded memories to the evaluator's working memory.
pub struct WorkingMemoryStep {
    evaluator: Shared<dyn DecisionEvaluator>,
}

impl WorkingMemoryStep {
    pub fn new(evaluator: Shared<dyn DecisionEvaluator>) -> Self {
        Self { evaluator }
    }
}

impl PipelineStep for WorkingMemoryStep {
    fn name(&self) -> &'static str {
        "WorkingMemory"
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let items: Vec<(String, f64)> = context
            .memories
            .iter()
            .map(|m| (m.id.clone(), m.importance))
            .collect();
        lock(&self.evaluator, "evaluator")?.load_working_memory(&items);
        Ok(())
    }
}

// ============================================================================
// ACTION CREATION & DECISION
// ============================================================================

/// Scores each option by its relevance to the loaded memories.
pub struct ActionCreationStep {
    factory: ActionFactory,
}

impl ActionCreationStep {
    pub fn new(factory: ActionFactory) -> Self {
        Self { factory }
    }
}

impl PipelineStep for ActionCreationStep {
    fn name(&self) -> &'static str {
        "ActionCreation"
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        context.actions = self
            .factory
            .build(&context.options, &context.memories, None)?;
        Ok(())
    }
}

/// Runs the evaluator over the current actions.
pub struct DecisionStep {
    evaluator: Shared<dyn DecisionEvaluator>,
}

impl DecisionStep {
    pub fn new(evaluator: Shared<dyn DecisionEvaluator>) -> Self {
        Self { evaluator }
    }
}

impl PipelineStep for DecisionStep {
    fn name(&self) -> &'static str {
        "Decision"
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let evaluation = lock(&self.evaluator, "evaluator")?.evaluate(&context.actions)?;
        apply_evaluation(context, evaluation);
        Ok(())
    }
}

// ============================================================================
// DYNAMICS
// ============================================================================

/// Entropy of the pre-torque distribution.
pub struct EntropyCalculationStep {
    dynamics: Shared<DynamicsCore>,
}

impl EntropyCalculationStep {
    pub fn new(dynamics: Shared<DynamicsCore>) -> Self {
        Self { dynamics }
    }
}

impl PipelineStep for EntropyCalculationStep {
    fn name(&self) -> &'static str {
        "EntropyCalculation"
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let mut dynamics = lock(&self.dynamics, "dynamics")?;
        context.entropy = dynamics.calculate_entropy(&context.probabilities)?;
        Ok(())
    }
}

/// Decaying core strength, distress check and history update.
pub struct CoreStrengthStep {
    dynamics: Shared<DynamicsCore>,
}

impl CoreStrengthStep {
    pub fn new(dynamics: Shared<DynamicsCore>) -> Self {
        Self { dynamics }
    }
}

impl PipelineStep for CoreStrengthStep {
    fn name(&self) -> &'static str {
        "CoreStrength"
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let mut dynamics = lock(&self.dynamics, "dynamics")?;
        let core = dynamics.update_core_strength(&context.memories)?;
        finish_core(&mut dynamics, context, core);
        Ok(())
    }
}

/// Undecayed core strength; never touches persisted decay state.
///
/// Swap in for [`CoreStrengthStep`] to run a profile without decay.
pub struct RawCoreStrengthStep {
    dynamics: Shared<DynamicsCore>,
}

impl RawCoreStrengthStep {
    pub fn new(dynamics: Shared<DynamicsCore>) -> Self {
        Self { dynamics }
    }
}

impl PipelineStep for RawCoreStrengthStep {
    fn name(&self) -> &'static str {
        "RawCoreStrength"
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let mut dynamics = lock(&self.dynamics, "dynamics")?;
        let core = dynamics.raw_core_strength(&context.memories);
        finish_core(&mut dynamics, context, core);
        Ok(())
    }
}

fn finish_core(dynamics: &mut DynamicsCore, context: &mut PipelineContext, core: f64) {
    context.core_strength = core;
    let signal = dynamics.check_cognitive_distress(context.entropy, core, context.options.len());
    dynamics.update_history(context.entropy, core);
    context.distress = Some(signal);
}

/// Rotating bias per option; records the advanced phase in metadata.
pub struct TorqueGenerationStep {
    dynamics: Shared<DynamicsCore>,
}

impl TorqueGenerationStep {
    pub fn new(dynamics: Shared<DynamicsCore>) -> Self {
        Self { dynamics }
    }
}

impl PipelineStep for TorqueGenerationStep {
    fn name(&self) -> &'static str {
        "TorqueGeneration"
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let mut dynamics = lock(&self.dynamics, "dynamics")?;
        context.torque = dynamics.generate_torque(&context.options, context.entropy)?;
        context.metadata.insert(
            "precession_phi".to_string(),
            Value::from(dynamics.state().precession_phi),
        );
        Ok(())
    }
}

/// Re-scores actions with torque added and re-runs the evaluator once.
/// No-op when there is no torque.
pub struct UtilityRecalculationStep {
    factory: ActionFactory,
    evaluator: Shared<dyn DecisionEvaluator>,
}

impl UtilityRecalculationStep {
    pub fn new(factory: ActionFactory, evaluator: Shared<dyn DecisionEvaluator>) -> Self {
        Self { factory, evaluator }
    }
}

impl PipelineStep for UtilityRecalculationStep {
    fn name(&self) -> &'static str {
        "UtilityRecalculation"
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        if context.torque.is_empty() {
            return Ok(());
        }
        context.actions = self
            .factory
            .build(&context.options, &context.memories, Some(&context.torque))?;
        let evaluation = lock(&self.evaluator, "evaluator")?.evaluate(&context.actions)?;
        apply_evaluation(context, evaluation);
        Ok(())
    }
}

// ============================================================================
// RESULT ASSEMBLY
// ============================================================================

/// Builds the [`DecisionResult`] and cross-checks the habit suggestion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssemblyStep;

impl PipelineStep for ResultAssemblyStep {
    fn name(&self) -> &'static str {
        "ResultAssembly"
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let (action, utility, probability) = match &context.choice {
            Some(choice) => (Some(choice.name.clone()), choice.utility, choice.probability),
            None => (None, 0.0, 0.0),
        };

        let conflict = match (&action, &context.habit_suggestion) {
            (Some(chosen), Some(habit)) => chosen != habit,
            _ => false,
        };
        if conflict {
            warn!(
                chosen = action.as_deref().unwrap_or_default(),
                habit = context.habit_suggestion.as_deref().unwrap_or_default(),
                "Decision conflicts with habit"
            );
        }

        let (cognitive_distress, distress_message) = match &context.distress {
            Some(signal) => (signal.distressed, signal.message.clone()),
            None => (false, String::new()),
        };

        context.result = Some(DecisionResult {
            action,
            utility,
            probability,
            probability_distribution: context.probability_distribution(),
            entropy: context.entropy,
            core_strength: context.core_strength,
            habit_suggestion: context.habit_suggestion.clone(),
            conflict,
            cognitive_distress,
            distress_message,
        });
        Ok(())
    }
}
