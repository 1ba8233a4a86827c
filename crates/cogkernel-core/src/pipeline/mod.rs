//! # Decision Pipeline
//!
//! One decision cycle is an ordered list of steps threading a
//! [`PipelineContext`] through ranking, scoring, dynamics, torque feedback
//! and result assembly:
//!
//! ```text
//! MemoryLoad → WorkingMemory → ActionCreation → Decision → Entropy
//!   → CoreStrength → TorqueGeneration → UtilityRecalculation → ResultAssembly
//! ```
//!
//! Steps can be appended, inserted, removed or replaced between cycles.
//! `execute` borrows the pipeline immutably, so the structure cannot change
//! while a cycle runs. The first failing step aborts the cycle.
//!
//! ## Example
//!
//! ```rust
//! use cogkernel_core::pipeline::{DecisionPipeline, PipelineContext, PipelineStep, Result};
//!
//! struct Shortlist;
//!
//! impl PipelineStep for Shortlist {
//!     fn name(&self) -> &'static str {
//!         "Shortlist"
//!     }
//!
//!     fn process(&self, context: &mut PipelineContext) -> Result<()> {
//!         context.options.truncate(2);
//!         Ok(())
//!     }
//! }
//!
//! let mut pipeline = DecisionPipeline::new();
//! pipeline.push_step(Shortlist);
//! let context = pipeline
//!     .execute(PipelineContext::new(vec!["a".into(), "b".into(), "c".into()]))
//!     .unwrap();
//! assert_eq!(context.options.len(), 2);
//! assert_eq!(pipeline.to_string(), "DecisionPipeline([Shortlist])");
//! ```

mod context;
mod steps;

pub use context::{DecisionResult, PipelineContext};
pub use steps::{
    ActionCreationStep, CoreStrengthStep, DecisionStep, EntropyCalculationStep, MemoryLoadStep,
    RawCoreStrengthStep, ResultAssemblyStep, Shared, TorqueGenerationStep,
    UtilityRecalculationStep, WorkingMemoryStep,
};

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::decision::DecisionError;
use crate::dynamics::DynamicsError;
use crate::ranking::RankingError;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Errors surfaced by a decision cycle or pipeline edit
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Ranking failed: {0}")]
    Ranking(#[from] RankingError),

    #[error("Dynamics failed: {0}")]
    Dynamics(#[from] DynamicsError),

    #[error("Decision failed: {0}")]
    Decision(#[from] DecisionError),

    /// A shared component's lock was poisoned by a panicking holder
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// No step with this name
    #[error("Step not found: {0}")]
    UnknownStep(String),

    /// Insertion index past the end
    #[error("Step index {index} out of range (pipeline has {len} steps)")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// ============================================================================
// STEP TRAIT
// ============================================================================

/// One transformation over the cycle context.
pub trait PipelineStep: Send {
    /// Stable name used for lookup, removal and replacement.
    fn name(&self) -> &'static str;

    fn process(&self, context: &mut PipelineContext) -> Result<()>;
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Ordered, editable sequence of steps.
#[derive(Default)]
pub struct DecisionPipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl DecisionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with_step(mut self, step: impl PipelineStep + 'static) -> Self {
        self.push_step(step);
        self
    }

    pub fn push_step(&mut self, step: impl PipelineStep + 'static) {
        self.steps.push(Box::new(step));
    }

    pub fn insert_step(&mut self, index: usize, step: impl PipelineStep + 'static) -> Result<()> {
        if index > self.steps.len() {
            return Err(PipelineError::IndexOutOfRange {
                index,
                len: self.steps.len(),
            });
        }
        self.steps.insert(index, Box::new(step));
        Ok(())
    }

    /// Remove the first step with this name.
    pub fn remove_step(&mut self, name: &str) -> Result<Box<dyn PipelineStep>> {
        let index = self.position(name)?;
        Ok(self.steps.remove(index))
    }

    /// Swap the first step with this name, returning the old one.
    pub fn replace_step(
        &mut self,
        name: &str,
        step: impl PipelineStep + 'static,
    ) -> Result<Box<dyn PipelineStep>> {
        let index = self.position(name)?;
        Ok(std::mem::replace(&mut self.steps[index], Box::new(step)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.iter().any(|s| s.name() == name)
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order over a fresh context.
    pub fn execute(&self, mut context: PipelineContext) -> Result<PipelineContext> {
        for step in &self.steps {
            debug!(step = step.name(), "Running pipeline step");
            if let Err(e) = step.process(&mut context) {
                warn!(step = step.name(), error = %e, "Pipeline step failed");
                return Err(e);
            }
        }
        Ok(context)
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.steps
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| PipelineError::UnknownStep(name.to_string()))
    }
}

impl fmt::Display for DecisionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecisionPipeline([{}])", self.step_names().join(", "))
    }
}

impl fmt::Debug for DecisionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionPipeline")
            .field("steps", &self.step_names())
            .finish()
    }
}
