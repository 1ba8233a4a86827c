//! # Cognitive Modes
//!
//! A mode selects a behavioral regime by swapping in a whole bundle of
//! constants. Exploration and exploitation are modeled as the two extremes of
//! decision entropy:
//!
//! - **Adhd**: high entropy, over-exploration. Low softmax β, amplified torque.
//! - **Asd**: low entropy, over-exploitation. High softmax β, damped torque,
//!   strong local graph links.
//! - **Ptsd**: fixation. Heavier damping keeps mass on already-linked memories.
//! - **Alzheimer**: degradation. Core strength decays irreversibly and new
//!   memories only partially register.
//!
//! Profiles are immutable once built. A custom profile goes through
//! [`ModeProfileBuilder`], which validates every constant before any
//! decision cycle can see it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default base torque gain
pub const DEFAULT_BASE_GAMMA: f64 = 0.3;

/// Default phase advance per decision cycle (radians)
pub const DEFAULT_OMEGA: f64 = 0.05;

/// Fraction of the maximum entropy above which a decision counts as indecisive
pub const DEFAULT_ENTROPY_THRESHOLD_RATIO: f64 = 0.8;

/// Core strength below which the decision counts as unanchored
pub const DEFAULT_CORE_DISTRESS_THRESHOLD: f64 = 0.3;

/// Default PageRank damping
pub const DEFAULT_DAMPING: f64 = 0.85;

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised while building or parsing a mode profile
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModeError {
    /// A constant is outside its allowed range
    #[error("Invalid mode parameter `{name}` = {value}: {expected}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// Unknown mode name
    #[error("Unknown cognitive mode: {0}")]
    UnknownMode(String),
}

/// Result type for mode operations
pub type Result<T> = std::result::Result<T, ModeError>;

// ============================================================================
// COGNITIVE MODE
// ============================================================================

/// The closed set of behavioral regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveMode {
    /// Balanced baseline
    #[default]
    Normal,
    /// High exploration (high entropy)
    Adhd,
    /// High exploitation (low entropy)
    Asd,
    /// Trauma fixation
    Ptsd,
    /// Irreversible core degradation
    Alzheimer,
}

impl CognitiveMode {
    /// Every mode, in presentation order.
    pub const ALL: [CognitiveMode; 5] = [
        CognitiveMode::Normal,
        CognitiveMode::Adhd,
        CognitiveMode::Asd,
        CognitiveMode::Ptsd,
        CognitiveMode::Alzheimer,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CognitiveMode::Normal => "normal",
            CognitiveMode::Adhd => "adhd",
            CognitiveMode::Asd => "asd",
            CognitiveMode::Ptsd => "ptsd",
            CognitiveMode::Alzheimer => "alzheimer",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            CognitiveMode::Normal => "Balanced exploration and exploitation",
            CognitiveMode::Adhd => "High entropy: keeps trying new options, strong rotation",
            CognitiveMode::Asd => "Low entropy: holds established patterns, weak rotation",
            CognitiveMode::Ptsd => "Fixation on heavily linked memories, hyperarousal",
            CognitiveMode::Alzheimer => "Core strength decays and new memories fail to register",
        }
    }

    /// Whether this preset models a degraded or pathological regime.
    pub fn is_pathological(&self) -> bool {
        matches!(self, CognitiveMode::Ptsd | CognitiveMode::Alzheimer)
    }

    /// Parse a mode name. Accepts the canonical names plus the descriptive
    /// aliases `baseline`, `high-exploration` and `high-exploitation`.
    pub fn parse_name(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "normal" | "baseline" => Ok(CognitiveMode::Normal),
            "adhd" | "high-exploration" | "exploration" => Ok(CognitiveMode::Adhd),
            "asd" | "high-exploitation" | "exploitation" => Ok(CognitiveMode::Asd),
            "ptsd" => Ok(CognitiveMode::Ptsd),
            "alzheimer" | "alzheimers" => Ok(CognitiveMode::Alzheimer),
            _ => Err(ModeError::UnknownMode(s.to_string())),
        }
    }

    /// The preset profile for this mode.
    pub fn profile(self) -> ModeProfile {
        let base = ModeProfile {
            mode: self,
            decision_temperature: 1.0,
            working_memory_capacity: 7,
            damping: DEFAULT_DAMPING,
            local_weight_boost: 1.0,
            torque_multiplier: 1.0,
            base_gamma: DEFAULT_BASE_GAMMA,
            omega: DEFAULT_OMEGA,
            core_decay_rate: 0.0,
            memory_update_failure: 0.0,
            entropy_threshold_ratio: DEFAULT_ENTROPY_THRESHOLD_RATIO,
            core_distress_threshold: DEFAULT_CORE_DISTRESS_THRESHOLD,
        };

        match self {
            CognitiveMode::Normal => base,
            CognitiveMode::Adhd => ModeProfile {
                decision_temperature: 0.5,
                working_memory_capacity: 5,
                local_weight_boost: 0.8,
                torque_multiplier: 1.5,
                ..base
            },
            CognitiveMode::Asd => ModeProfile {
                decision_temperature: 5.0,
                local_weight_boost: 3.0,
                torque_multiplier: 0.5,
                ..base
            },
            CognitiveMode::Ptsd => ModeProfile {
                decision_temperature: 0.8,
                working_memory_capacity: 5,
                damping: 0.9,
                local_weight_boost: 2.0,
                ..base
            },
            CognitiveMode::Alzheimer => ModeProfile {
                core_decay_rate: 0.01,
                memory_update_failure: 0.8,
                ..base
            },
        }
    }
}

impl std::fmt::Display for CognitiveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CognitiveMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_name(s)
    }
}

// ============================================================================
// MODE PROFILE
// ============================================================================

/// Immutable bundle of constants for one regime.
///
/// Fields are read-only from outside the crate; build variations through
/// [`ModeProfile::builder`]. Serialize-only: profiles are re-created from a
/// mode name, never parsed back unvalidated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeProfile {
    mode: CognitiveMode,
    decision_temperature: f64,
    working_memory_capacity: usize,
    damping: f64,
    local_weight_boost: f64,
    torque_multiplier: f64,
    base_gamma: f64,
    omega: f64,
    core_decay_rate: f64,
    memory_update_failure: f64,
    entropy_threshold_ratio: f64,
    core_distress_threshold: f64,
}

impl Default for ModeProfile {
    fn default() -> Self {
        CognitiveMode::Normal.profile()
    }
}

impl ModeProfile {
    /// Start a validated variation of a preset.
    pub fn builder(mode: CognitiveMode) -> ModeProfileBuilder {
        ModeProfileBuilder {
            profile: mode.profile(),
        }
    }

    pub fn mode(&self) -> CognitiveMode {
        self.mode
    }

    /// Softmax inverse temperature β
    pub fn decision_temperature(&self) -> f64 {
        self.decision_temperature
    }

    pub fn working_memory_capacity(&self) -> usize {
        self.working_memory_capacity
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn local_weight_boost(&self) -> f64 {
        self.local_weight_boost
    }

    /// Gain applied on top of `base_gamma` for this regime
    pub fn torque_multiplier(&self) -> f64 {
        self.torque_multiplier
    }

    pub fn base_gamma(&self) -> f64 {
        self.base_gamma
    }

    /// Phase advance per cycle
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Exponential decay rate λ of the persistent core (per second)
    pub fn core_decay_rate(&self) -> f64 {
        self.core_decay_rate
    }

    pub fn memory_update_failure(&self) -> f64 {
        self.memory_update_failure
    }

    pub fn entropy_threshold_ratio(&self) -> f64 {
        self.entropy_threshold_ratio
    }

    pub fn core_distress_threshold(&self) -> f64 {
        self.core_distress_threshold
    }

    /// Whether core strength decays over time in this regime.
    pub fn decays(&self) -> bool {
        self.core_decay_rate > 0.0
    }

    /// Check every constant against its allowed range.
    pub fn validate(&self) -> Result<()> {
        fn unit(name: &'static str, value: f64) -> Result<()> {
            if value.is_finite() && (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ModeError::OutOfRange {
                    name,
                    value,
                    expected: "must be within [0, 1]",
                })
            }
        }

        fn positive(name: &'static str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ModeError::OutOfRange {
                    name,
                    value,
                    expected: "must be positive",
                })
            }
        }

        fn non_negative(name: &'static str, value: f64) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ModeError::OutOfRange {
                    name,
                    value,
                    expected: "must be non-negative",
                })
            }
        }

        positive("decision_temperature", self.decision_temperature)?;
        if self.working_memory_capacity == 0 {
            return Err(ModeError::OutOfRange {
                name: "working_memory_capacity",
                value: 0.0,
                expected: "must be at least 1",
            });
        }
        if !(self.damping.is_finite() && self.damping > 0.0 && self.damping < 1.0) {
            return Err(ModeError::OutOfRange {
                name: "damping",
                value: self.damping,
                expected: "must be within (0, 1)",
            });
        }
        positive("local_weight_boost", self.local_weight_boost)?;
        non_negative("torque_multiplier", self.torque_multiplier)?;
        unit("base_gamma", self.base_gamma)?;
        positive("omega", self.omega)?;
        non_negative("core_decay_rate", self.core_decay_rate)?;
        unit("memory_update_failure", self.memory_update_failure)?;
        unit("entropy_threshold_ratio", self.entropy_threshold_ratio)?;
        unit("core_distress_threshold", self.core_distress_threshold)?;
        Ok(())
    }
}

/// Builder for custom profiles; [`build`](ModeProfileBuilder::build) validates.
#[derive(Debug, Clone)]
pub struct ModeProfileBuilder {
    profile: ModeProfile,
}

impl ModeProfileBuilder {
    pub fn decision_temperature(mut self, beta: f64) -> Self {
        self.profile.decision_temperature = beta;
        self
    }

    pub fn working_memory_capacity(mut self, capacity: usize) -> Self {
        self.profile.working_memory_capacity = capacity;
        self
    }

    pub fn damping(mut self, damping: f64) -> Self {
        self.profile.damping = damping;
        self
    }

    pub fn local_weight_boost(mut self, boost: f64) -> Self {
        self.profile.local_weight_boost = boost;
        self
    }

    pub fn torque_multiplier(mut self, multiplier: f64) -> Self {
        self.profile.torque_multiplier = multiplier;
        self
    }

    pub fn base_gamma(mut self, gamma: f64) -> Self {
        self.profile.base_gamma = gamma;
        self
    }

    pub fn omega(mut self, omega: f64) -> Self {
        self.profile.omega = omega;
        self
    }

    pub fn core_decay_rate(mut self, rate: f64) -> Self {
        self.profile.core_decay_rate = rate;
        self
    }

    pub fn memory_update_failure(mut self, failure: f64) -> Self {
        self.profile.memory_update_failure = failure;
        self
    }

    pub fn entropy_threshold_ratio(mut self, ratio: f64) -> Self {
        self.profile.entropy_threshold_ratio = ratio;
        self
    }

    pub fn core_distress_threshold(mut self, threshold: f64) -> Self {
        self.profile.core_distress_threshold = threshold;
        self
    }

    /// Validate and freeze the profile.
    pub fn build(self) -> Result<ModeProfile> {
        self.profile.validate()?;
        Ok(self.profile)
    }
}
