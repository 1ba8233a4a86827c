//! # Cogkernel Core
//!
//! Decision kernel for memory-driven agents. Ranks recorded memories by
//! graph importance and uses that ranking, a decaying stability signal and
//! a rotating bias to steer a choice among named options:
//!
//! - **Importance Ranking**: damped propagation (PageRank) over a weighted
//!   relation graph, with a mode-dependent boost for local edges
//! - **Entropy**: Shannon uncertainty of the option distribution
//! - **Core Strength**: how strongly ranked memories anchor a decision;
//!   decays irreversibly (`exp(-λ·Δt)`) under degraded profiles
//! - **Precession Torque**: a slowly rotating per-option bias that grows
//!   with indecision
//! - **Cognitive Distress**: high entropy and a weak core at the same time
//! - **Decision Pipeline**: an ordered, editable sequence of steps running
//!   one deterministic cycle
//!
//! ## Cognitive Modes
//!
//! A closed set of presets selects the numeric regime:
//!
//! - **Normal**: balanced baseline
//! - **Adhd**: high exploration (low β, amplified torque)
//! - **Asd**: high exploitation (high β, damped torque, strong local links)
//! - **Ptsd**: fixation on strongly linked memories
//! - **Alzheimer**: core decay with frequent memory-update failure
//!
//! ## Quick Start
//!
//! ```rust
//! use cogkernel_core::prelude::*;
//! use serde_json::{Map, json};
//!
//! let kernel = CognitiveKernel::new(KernelConfig::default())?;
//!
//! let mut content = Map::new();
//! content.insert("text".into(), json!("coffee kept me awake"));
//! let first = kernel.remember("observation", content, 0.8, 0.3, &[])?;
//!
//! let mut content = Map::new();
//! content.insert("text".into(), json!("tea before bed"));
//! kernel.remember("observation", content, 0.6, 0.1, &[first])?;
//!
//! let options = vec!["drink_tea".to_string(), "drink_coffee".to_string()];
//! let result = kernel.decide(&options, Some("drink_coffee"))?;
//! println!("{:?} (entropy {:.3})", result.action, result.entropy);
//! # Ok::<(), cogkernel_core::KernelError>(())
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

/// Injectable time sources
pub mod clock;

/// Option scoring collaborators: evaluator and relevance
pub mod decision;

pub mod dynamics;
pub mod kernel;
pub mod memory;
pub mod modes;
pub mod pipeline;

/// Graph importance ranking
pub mod ranking;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};

pub use decision::{
    Action, ActionFactory, Choice, DecisionError, DecisionEvaluator, Evaluation,
    KeywordRelevance, RelevanceScorer, SoftmaxEvaluator,
};

pub use dynamics::{
    BoundedHistory, DISTRESS_MESSAGE, DistressSignal, DynamicsConfig, DynamicsCore,
    DynamicsError, DynamicsState, DynamicsStatus,
};

pub use kernel::{CognitiveKernel, KernelBuilder, KernelConfig, KernelError, KernelStatus};

pub use memory::{
    Edge, GraphInputs, MemoryBank, MemoryBankError, MemoryNode, MemoryRecord, MemorySource,
};

pub use modes::{CognitiveMode, ModeError, ModeProfile, ModeProfileBuilder};

pub use pipeline::{
    ActionCreationStep, CoreStrengthStep, DecisionPipeline, DecisionResult, DecisionStep,
    EntropyCalculationStep, MemoryLoadStep, PipelineContext, PipelineError, PipelineStep,
    RawCoreStrengthStep, ResultAssemblyStep, Shared, TorqueGenerationStep,
    UtilityRecalculationStep, WorkingMemoryStep,
};

pub use ranking::{
    ImportanceRanker, LocalityClassifier, RankingConfig, RankingError, RankingRun,
    RankingSnapshot, RecencyBuckets,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        CognitiveKernel, CognitiveMode, DecisionPipeline, DecisionResult, KernelConfig,
        KernelError, ManualClock, MemoryRecord, PipelineContext, PipelineStep,
    };
}
