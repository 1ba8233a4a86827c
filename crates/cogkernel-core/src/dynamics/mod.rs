//! # Decision Dynamics
//!
//! Signals derived from one decision cycle and carried across cycles:
//!
//! - **Entropy**: Shannon uncertainty of the pre-torque distribution
//! - **Core strength**: how strongly ranked memories anchor the decision;
//!   decays irreversibly under pathological profiles
//! - **Precession torque**: a slowly rotating bias over the options, scaled
//!   by normalized entropy
//! - **Cognitive distress**: high entropy and a weak core at the same time
//!
//! The [`DynamicsCore`] is the only owner of phase and decay state.

mod config;
mod engine;
mod state;

pub use config::{
    DEFAULT_HISTORY_SIZE, DEFAULT_MEMORY_ALPHA, DEFAULT_PROBABILITY_TOLERANCE, DynamicsConfig,
};
pub use engine::{
    DISTRESS_MESSAGE, DistressSignal, DynamicsCore, DynamicsStatus, raw_core_strength,
    shannon_entropy,
};
pub use state::{BoundedHistory, DynamicsState};

use thiserror::Error;

use crate::modes::ModeError;

/// Errors raised at the dynamics boundary
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DynamicsError {
    /// Probabilities out of range or not summing to 1
    #[error("Invalid probability distribution: {0}")]
    InvalidDistribution(String),

    /// Argument or configuration value out of range
    #[error("Invalid {name}: {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// Profile failed validation
    #[error(transparent)]
    Mode(#[from] ModeError),
}

pub type Result<T> = std::result::Result<T, DynamicsError>;
