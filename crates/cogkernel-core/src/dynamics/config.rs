//! Dynamics configuration

use serde::{Deserialize, Serialize};

use super::{DynamicsError, Result};

/// Default history capacity
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Default scaling of the averaged memory importance into core strength
pub const DEFAULT_MEMORY_ALPHA: f64 = 0.5;

/// Default tolerance on a distribution's total probability
pub const DEFAULT_PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Engine-level settings. Mode-dependent constants live in
/// [`ModeProfile`](crate::modes::ModeProfile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    /// Capacity of the entropy and core-strength histories
    pub history_size: usize,
    /// Alpha used when deriving core strength from memories
    pub memory_alpha: f64,
    /// Allowed deviation of Σp from 1
    pub probability_tolerance: f64,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            memory_alpha: DEFAULT_MEMORY_ALPHA,
            probability_tolerance: DEFAULT_PROBABILITY_TOLERANCE,
        }
    }
}

impl DynamicsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history_size == 0 {
            return Err(DynamicsError::InvalidParameter {
                name: "history_size",
                value: 0.0,
                expected: ">= 1",
            });
        }
        if !(self.memory_alpha.is_finite() && (0.0..=1.0).contains(&self.memory_alpha)) {
            return Err(DynamicsError::InvalidParameter {
                name: "memory_alpha",
                value: self.memory_alpha,
                expected: "[0, 1]",
            });
        }
        if !(self.probability_tolerance.is_finite()
            && self.probability_tolerance > 0.0
            && self.probability_tolerance < 0.5)
        {
            return Err(DynamicsError::InvalidParameter {
                name: "probability_tolerance",
                value: self.probability_tolerance,
                expected: "(0, 0.5)",
            });
        }
        Ok(())
    }
}
