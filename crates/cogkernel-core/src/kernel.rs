//! # Cognitive Kernel
//!
//! Façade owning the long-lived components of a decision agent:
//!
//! - the memory bank (event store stand-in)
//! - the importance ranker
//! - the dynamics core (persisted core, phase, histories)
//! - the decision evaluator and relevance scorer
//! - the decision pipeline wired to all of the above
//!
//! Components are shared with pipeline steps through `Arc<Mutex<_>>`, so a
//! host may move the kernel across threads; calls are serialized per
//! component. `decide` is the only decision path.
//!
//! ## Example
//!
//! ```rust
//! use cogkernel_core::{CognitiveKernel, CognitiveMode, KernelConfig};
//! use serde_json::{Map, json};
//!
//! let mut kernel = CognitiveKernel::new(KernelConfig::default()).unwrap();
//! let mut content = Map::new();
//! content.insert("text".into(), json!("the red door was open"));
//! kernel.remember("observation", content, 0.9, 0.2, &[]).unwrap();
//!
//! let result = kernel
//!     .decide(&["choose_red".to_string(), "choose_blue".to_string()], None)
//!     .unwrap();
//! assert_eq!(result.action.as_deref(), Some("choose_red"));
//!
//! kernel.set_mode(CognitiveMode::Asd).unwrap();
//! assert_eq!(kernel.mode(), CognitiveMode::Asd);
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::clock::{SharedClock, SystemClock};
use crate::decision::{
    ActionFactory, DEFAULT_RISK_AVERSION, DecisionError, DecisionEvaluator, KeywordRelevance,
    RelevanceScorer, SoftmaxEvaluator,
};
use crate::dynamics::{
    DynamicsConfig, DynamicsCore, DynamicsError, DynamicsState, DynamicsStatus,
};
use crate::memory::{
    DEFAULT_RECENCY_HALF_LIFE_SECS, MemoryBank, MemoryBankError, MemoryRecord, MemorySource,
};
use crate::modes::{CognitiveMode, ModeError, ModeProfile};
use crate::pipeline::{
    ActionCreationStep, CoreStrengthStep, DecisionPipeline, DecisionResult, DecisionStep,
    EntropyCalculationStep, MemoryLoadStep, PipelineContext, PipelineError, ResultAssemblyStep,
    Shared, TorqueGenerationStep, UtilityRecalculationStep, WorkingMemoryStep,
};
use crate::ranking::{ImportanceRanker, RankingConfig, RankingError, RankingSnapshot};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Errors surfaced by the kernel façade
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryBankError),

    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),

    #[error("Dynamics error: {0}")]
    Dynamics(#[from] DynamicsError),

    #[error("Decision error: {0}")]
    Decision(#[from] DecisionError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Mode error: {0}")]
    Mode(#[from] ModeError),

    #[error("Invalid kernel config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The pipeline finished without assembling a result
    #[error("Pipeline produced no result (steps: {0})")]
    NoResult(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

pub type Result<T> = std::result::Result<T, KernelError>;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Kernel settings.
///
/// Ranking damping and local boost follow the active mode and override the
/// values in `ranking`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Mode active at construction
    pub mode: CognitiveMode,
    /// Fixed number of memories per cycle; `None` follows the mode
    pub working_memory_capacity: Option<usize>,
    /// Half-life for memory recency
    pub recency_half_life_secs: f64,
    /// Weight of memory relevance in expected reward
    pub relevance_alpha: f64,
    pub base_reward: f64,
    pub effort_cost: f64,
    pub risk: f64,
    /// Risk-aversion coefficient of the evaluator
    pub risk_aversion: f64,
    pub ranking: RankingConfig,
    pub dynamics: DynamicsConfig,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            mode: CognitiveMode::Normal,
            working_memory_capacity: None,
            recency_half_life_secs: DEFAULT_RECENCY_HALF_LIFE_SECS,
            relevance_alpha: ActionFactory::DEFAULT_ALPHA,
            base_reward: ActionFactory::DEFAULT_BASE_REWARD,
            effort_cost: ActionFactory::DEFAULT_EFFORT_COST,
            risk: ActionFactory::DEFAULT_RISK,
            risk_aversion: DEFAULT_RISK_AVERSION,
            ranking: RankingConfig::default(),
            dynamics: DynamicsConfig::default(),
        }
    }
}

impl KernelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.working_memory_capacity == Some(0) {
            return Err(KernelError::InvalidConfig(
                "working_memory_capacity must be at least 1".to_string(),
            ));
        }
        if !(self.recency_half_life_secs.is_finite() && self.recency_half_life_secs > 0.0) {
            return Err(KernelError::InvalidConfig(format!(
                "recency_half_life_secs must be positive, got {}",
                self.recency_half_life_secs
            )));
        }
        if !(self.risk_aversion.is_finite() && self.risk_aversion >= 0.0) {
            return Err(KernelError::InvalidConfig(format!(
                "risk_aversion must be non-negative, got {}",
                self.risk_aversion
            )));
        }
        self.ranking.validate()?;
        self.dynamics.validate()?;
        Ok(())
    }
}

/// Summary of the kernel's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelStatus {
    pub mode: CognitiveMode,
    pub memories: usize,
    pub relations: usize,
    pub pipeline: Vec<&'static str>,
    pub dynamics: DynamicsStatus,
}

// ============================================================================
// KERNEL
// ============================================================================

/// Builder for kernels with custom collaborators.
pub struct KernelBuilder {
    config: KernelConfig,
    clock: SharedClock,
    evaluator: Option<Shared<dyn DecisionEvaluator>>,
    relevance: Arc<dyn RelevanceScorer>,
}

impl KernelBuilder {
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn evaluator(mut self, evaluator: impl DecisionEvaluator + 'static) -> Self {
        self.evaluator = Some(Arc::new(Mutex::new(evaluator)));
        self
    }

    pub fn relevance(mut self, relevance: impl RelevanceScorer + 'static) -> Self {
        self.relevance = Arc::new(relevance);
        self
    }

    pub fn build(self) -> Result<CognitiveKernel> {
        self.config.validate()?;
        let profile = self.config.mode.profile();

        let mut ranker = ImportanceRanker::with_config(self.config.ranking.clone())?;
        ranker.set_profile(&profile);

        let dynamics = DynamicsCore::new(
            self.config.dynamics.clone(),
            profile.clone(),
            self.clock.clone(),
        )?;

        let evaluator = match self.evaluator {
            Some(evaluator) => {
                lock(&evaluator, "evaluator")?.configure(&profile);
                evaluator
            }
            None => {
                let softmax = SoftmaxEvaluator::from_profile(&profile)
                    .with_risk_aversion(self.config.risk_aversion)?;
                let shared: Shared<dyn DecisionEvaluator> = Arc::new(Mutex::new(softmax));
                shared
            }
        };

        let factory = ActionFactory::new(self.relevance.clone()).with_scores(
            self.config.relevance_alpha,
            self.config.base_reward,
            self.config.effort_cost,
            self.config.risk,
        )?;

        let mut kernel = CognitiveKernel {
            config: self.config,
            profile,
            clock: self.clock,
            bank: Arc::new(Mutex::new(MemoryBank::new())),
            ranker: Arc::new(Mutex::new(ranker)),
            dynamics: Arc::new(Mutex::new(dynamics)),
            evaluator,
            factory,
            pipeline: DecisionPipeline::new(),
        };
        kernel.pipeline = kernel.standard_pipeline();
        info!(mode = kernel.profile.mode().as_str(), "Cognitive kernel ready");
        Ok(kernel)
    }
}

/// A single decision agent.
pub struct CognitiveKernel {
    config: KernelConfig,
    profile: ModeProfile,
    clock: SharedClock,
    bank: Shared<MemoryBank>,
    ranker: Shared<ImportanceRanker>,
    dynamics: Shared<DynamicsCore>,
    evaluator: Shared<dyn DecisionEvaluator>,
    factory: ActionFactory,
    pipeline: DecisionPipeline,
}

impl std::fmt::Debug for CognitiveKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CognitiveKernel")
            .field("mode", &self.profile.mode())
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl CognitiveKernel {
    /// Kernel on the system clock with the reference evaluator and
    /// keyword relevance.
    pub fn new(config: KernelConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: KernelConfig) -> KernelBuilder {
        KernelBuilder {
            config,
            clock: Arc::new(SystemClock),
            evaluator: None,
            relevance: Arc::new(KeywordRelevance),
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn mode(&self) -> CognitiveMode {
        self.profile.mode()
    }

    pub fn profile(&self) -> &ModeProfile {
        &self.profile
    }

    // ========================================================================
    // MEMORY
    // ========================================================================

    /// Record an event; returns its generated id.
    pub fn remember(
        &self,
        event_type: impl Into<String>,
        content: Map<String, Value>,
        importance: f64,
        emotion: f64,
        related_to: &[String],
    ) -> Result<String> {
        let now = self.clock.now();
        let id = lock(&self.bank, "memory bank")?.remember(
            event_type,
            content,
            importance,
            emotion,
            related_to,
            now,
        )?;
        Ok(id)
    }

    /// Add an explicit relation between two recorded events.
    pub fn link(&self, source: &str, target: &str, weight: f64) -> Result<()> {
        lock(&self.bank, "memory bank")?.link(source, target, weight)?;
        Ok(())
    }

    /// Top-k memories by graph importance; `importance` carries the score.
    pub fn recall(&self, k: usize) -> Result<Vec<MemoryRecord>> {
        let bank = lock(&self.bank, "memory bank")?;
        let inputs = bank.graph_inputs(self.clock.now(), self.config.recency_half_life_secs);

        let mut ranker = lock(&self.ranker, "ranker")?;
        ranker.build_graph(inputs.edges, inputs.nodes)?;
        ranker.calculate_importance();

        Ok(ranker
            .get_top_memories(k)
            .into_iter()
            .filter_map(|(id, score)| bank.record(&id, score))
            .collect())
    }

    // ========================================================================
    // DECISION
    // ========================================================================

    /// Run one decision cycle over `options`.
    pub fn decide(
        &self,
        options: &[String],
        habit_suggestion: Option<&str>,
    ) -> Result<DecisionResult> {
        let mut context = PipelineContext::new(options.to_vec());
        context.habit_suggestion = habit_suggestion.map(str::to_string);
        let context = self.run_cycle(context)?;
        context
            .result
            .ok_or_else(|| KernelError::NoResult(self.pipeline.to_string()))
    }

    /// Run one cycle and return the full context.
    pub fn run_cycle(&self, context: PipelineContext) -> Result<PipelineContext> {
        Ok(self.pipeline.execute(context)?)
    }

    /// Switch to a preset mode.
    pub fn set_mode(&mut self, mode: CognitiveMode) -> Result<()> {
        self.set_profile(mode.profile())
    }

    /// Swap the active profile across every component. Persisted decay
    /// state is cleared.
    pub fn set_profile(&mut self, profile: ModeProfile) -> Result<()> {
        profile.validate()?;
        lock(&self.dynamics, "dynamics")?.set_profile(profile.clone())?;
        lock(&self.ranker, "ranker")?.set_profile(&profile);
        lock(&self.evaluator, "evaluator")?.configure(&profile);
        info!(
            from = self.profile.mode().as_str(),
            to = profile.mode().as_str(),
            "Cognitive mode switched"
        );
        self.profile = profile;
        Ok(())
    }

    // ========================================================================
    // PIPELINE
    // ========================================================================

    /// A fresh standard pipeline wired to this kernel's components.
    pub fn standard_pipeline(&self) -> DecisionPipeline {
        let source: Shared<dyn MemorySource> = self.bank.clone();
        let mut load = MemoryLoadStep::new(
            source,
            self.ranker.clone(),
            self.dynamics.clone(),
            self.clock.clone(),
        )
        .with_half_life(self.config.recency_half_life_secs);
        if let Some(capacity) = self.config.working_memory_capacity {
            load = load.with_capacity(capacity);
        }

        DecisionPipeline::new()
            .with_step(load)
            .with_step(WorkingMemoryStep::new(self.evaluator.clone()))
            .with_step(ActionCreationStep::new(self.factory.clone()))
            .with_step(DecisionStep::new(self.evaluator.clone()))
            .with_step(EntropyCalculationStep::new(self.dynamics.clone()))
            .with_step(CoreStrengthStep::new(self.dynamics.clone()))
            .with_step(TorqueGenerationStep::new(self.dynamics.clone()))
            .with_step(UtilityRecalculationStep::new(
                self.factory.clone(),
                self.evaluator.clone(),
            ))
            .with_step(ResultAssemblyStep)
    }

    pub fn pipeline(&self) -> &DecisionPipeline {
        &self.pipeline
    }

    /// Edit the pipeline between cycles.
    pub fn pipeline_mut(&mut self) -> &mut DecisionPipeline {
        &mut self.pipeline
    }

    /// Restore the standard step sequence.
    pub fn reset_pipeline(&mut self) {
        self.pipeline = self.standard_pipeline();
    }

    pub fn bank_handle(&self) -> Shared<MemoryBank> {
        self.bank.clone()
    }

    pub fn ranker_handle(&self) -> Shared<ImportanceRanker> {
        self.ranker.clone()
    }

    pub fn dynamics_handle(&self) -> Shared<DynamicsCore> {
        self.dynamics.clone()
    }

    pub fn evaluator_handle(&self) -> Shared<dyn DecisionEvaluator> {
        self.evaluator.clone()
    }

    pub fn action_factory(&self) -> &ActionFactory {
        &self.factory
    }

    // ========================================================================
    // STATE
    // ========================================================================

    pub fn dynamics_state(&self) -> Result<DynamicsState> {
        Ok(lock(&self.dynamics, "dynamics")?.snapshot())
    }

    /// Scores and edges from the latest ranking pass.
    pub fn ranking_snapshot(&self) -> Result<RankingSnapshot> {
        Ok(lock(&self.ranker, "ranker")?.snapshot())
    }

    pub fn dynamics_snapshot(&self) -> Result<Value> {
        let state = lock(&self.dynamics, "dynamics")?.snapshot();
        Ok(serde_json::to_value(state)?)
    }

    pub fn restore_dynamics(&self, snapshot: Value) -> Result<()> {
        let state: DynamicsState = serde_json::from_value(snapshot)?;
        lock(&self.dynamics, "dynamics")?.restore(state)?;
        Ok(())
    }

    pub fn status(&self) -> Result<KernelStatus> {
        let (memories, relations) = {
            let bank = lock(&self.bank, "memory bank")?;
            (bank.len(), bank.edges().len())
        };
        let dynamics = lock(&self.dynamics, "dynamics")?.status();
        Ok(KernelStatus {
            mode: self.profile.mode(),
            memories,
            relations,
            pipeline: self.pipeline.step_names(),
            dynamics,
        })
    }

    /// Forget all memories and reset dynamics. The mode is kept.
    pub fn clear(&self) -> Result<()> {
        lock(&self.bank, "memory bank")?.clear();
        lock(&self.ranker, "ranker")?.clear();
        lock(&self.dynamics, "dynamics")?.reset();
        lock(&self.evaluator, "evaluator")?.load_working_memory(&[]);
        info!("Cognitive kernel cleared");
        Ok(())
    }
}

fn lock<'a, T: ?Sized>(handle: &'a Shared<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    handle
        .lock()
        .map_err(|e| KernelError::LockPoisoned(format!("{what}: {e}")))
}
