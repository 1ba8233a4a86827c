//! Dynamics core: entropy, core strength, precession torque, distress

use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::DynamicsConfig;
use super::state::DynamicsState;
use super::{DynamicsError, Result};
use crate::clock::{SharedClock, SystemClock, elapsed_secs};
use crate::memory::MemoryRecord;
use crate::modes::{CognitiveMode, ModeProfile};

/// Message attached to a distress signal
pub const DISTRESS_MESSAGE: &str = "I can't remember...";

/// Outcome of a distress check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistressSignal {
    pub distressed: bool,
    /// [`DISTRESS_MESSAGE`] when distressed, empty otherwise
    pub message: String,
}

impl DistressSignal {
    pub fn calm() -> Self {
        Self {
            distressed: false,
            message: String::new(),
        }
    }

    pub fn distressed() -> Self {
        Self {
            distressed: true,
            message: DISTRESS_MESSAGE.to_string(),
        }
    }
}

/// Compact status summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicsStatus {
    pub mode: CognitiveMode,
    pub entropy: f64,
    pub core_strength: f64,
    pub precession_phi: f64,
    pub cognitive_distress: bool,
    pub persistent_core: Option<f64>,
    pub entropy_history_length: usize,
    pub core_strength_history_length: usize,
}

/// Shannon entropy `-Σ p·ln p` of a validated distribution.
///
/// Zero entries contribute nothing. Each entry must lie in [0, 1] and the
/// total must be 1 within `tolerance`; an invalid distribution is rejected,
/// never renormalized.
pub fn shannon_entropy(probabilities: &[f64], tolerance: f64) -> Result<f64> {
    if probabilities.is_empty() {
        return Err(DynamicsError::InvalidDistribution(
            "distribution is empty".to_string(),
        ));
    }
    for (i, &p) in probabilities.iter().enumerate() {
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(DynamicsError::InvalidDistribution(format!(
                "entry {i} is {p}, expected a value in [0, 1]"
            )));
        }
    }
    let total: f64 = probabilities.iter().sum();
    if (total - 1.0).abs() > tolerance {
        return Err(DynamicsError::InvalidDistribution(format!(
            "entries sum to {total}, expected 1"
        )));
    }
    if probabilities.len() == 1 {
        return Ok(0.0);
    }

    let entropy: f64 = probabilities
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.ln())
        .sum();
    let max = (probabilities.len() as f64).ln();
    Ok(entropy.clamp(0.0, max))
}

/// Undecayed core strength: `clamp01(alpha · Σ importance · (1 - failure) / N)`.
pub fn raw_core_strength(memories: &[MemoryRecord], memory_update_failure: f64, alpha: f64) -> f64 {
    if memories.is_empty() {
        return 0.0;
    }
    let retained: f64 = memories
        .iter()
        .map(|m| m.importance * (1.0 - memory_update_failure))
        .sum();
    (alpha * retained / memories.len() as f64).clamp(0.0, 1.0)
}

/// Owner of all cross-cycle dynamics: persisted core, phase, histories.
///
/// Not safe for concurrent decision cycles; hosts serialize access.
pub struct DynamicsCore {
    config: DynamicsConfig,
    profile: ModeProfile,
    clock: SharedClock,
    state: DynamicsState,
}

impl std::fmt::Debug for DynamicsCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicsCore")
            .field("config", &self.config)
            .field("mode", &self.profile.mode())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for DynamicsCore {
    fn default() -> Self {
        let config = DynamicsConfig::default();
        let state = DynamicsState::new(config.history_size);
        Self {
            config,
            profile: ModeProfile::default(),
            clock: Arc::new(SystemClock),
            state,
        }
    }
}

impl DynamicsCore {
    pub fn new(config: DynamicsConfig, profile: ModeProfile, clock: SharedClock) -> Result<Self> {
        config.validate()?;
        profile.validate()?;
        let state = DynamicsState::new(config.history_size);
        Ok(Self {
            config,
            profile,
            clock,
            state,
        })
    }

    pub fn config(&self) -> &DynamicsConfig {
        &self.config
    }

    pub fn profile(&self) -> &ModeProfile {
        &self.profile
    }

    pub fn state(&self) -> &DynamicsState {
        &self.state
    }

    /// Swap the active profile wholesale. Persisted decay state never
    /// survives a swap.
    pub fn set_profile(&mut self, profile: ModeProfile) -> Result<()> {
        profile.validate()?;
        info!(
            from = self.profile.mode().as_str(),
            to = profile.mode().as_str(),
            "Dynamics profile switched"
        );
        self.profile = profile;
        self.state.clear_persistence();
        Ok(())
    }

    // ========================================================================
    // ENTROPY
    // ========================================================================

    /// Entropy of a distribution; stored as the current entropy.
    pub fn calculate_entropy(&mut self, probabilities: &[f64]) -> Result<f64> {
        let entropy = shannon_entropy(probabilities, self.config.probability_tolerance)?;
        self.state.entropy = entropy;
        Ok(entropy)
    }

    // ========================================================================
    // CORE STRENGTH
    // ========================================================================

    /// Core strength with the active profile's decay applied.
    ///
    /// Without decay the raw core is returned and any persisted value is
    /// discarded. With decay rate λ > 0 the first call seeds the persisted
    /// core from the raw value; later calls only decay it by `exp(-λ·Δt)`.
    pub fn calculate_core_strength(
        &mut self,
        memories: &[MemoryRecord],
        memory_update_failure: f64,
        alpha: f64,
    ) -> Result<f64> {
        check_unit("memory_update_failure", memory_update_failure)?;
        if !(alpha.is_finite() && alpha >= 0.0) {
            return Err(DynamicsError::InvalidParameter {
                name: "alpha",
                value: alpha,
                expected: ">= 0",
            });
        }
        if let Some(bad) = memories.iter().find(|m| !m.importance.is_finite()) {
            return Err(DynamicsError::InvalidParameter {
                name: "importance",
                value: bad.importance,
                expected: "finite",
            });
        }

        let raw = raw_core_strength(memories, memory_update_failure, alpha);
        let core = if !self.profile.decays() {
            self.state.clear_persistence();
            raw
        } else {
            let now = self.clock.now();
            let core = match (self.state.persistent_core, self.state.last_decay_time) {
                (Some(persisted), Some(last)) => {
                    let dt = elapsed_secs(last, now);
                    let decayed = persisted * (-self.profile.core_decay_rate() * dt).exp();
                    debug!(dt, persisted, decayed, "Core strength decayed");
                    decayed
                }
                _ => raw,
            };
            self.state.persistent_core = Some(core);
            self.state.last_decay_time = Some(now);
            core
        };

        self.state.core_strength = core;
        Ok(core)
    }

    /// Core strength using the profile's failure rate and the configured alpha.
    pub fn update_core_strength(&mut self, memories: &[MemoryRecord]) -> Result<f64> {
        let failure = self.profile.memory_update_failure();
        let alpha = self.config.memory_alpha;
        self.calculate_core_strength(memories, failure, alpha)
    }

    /// Undecayed core using the profile's failure rate; persistence untouched.
    pub fn raw_core_strength(&mut self, memories: &[MemoryRecord]) -> f64 {
        let raw = raw_core_strength(
            memories,
            self.profile.memory_update_failure(),
            self.config.memory_alpha,
        );
        self.state.core_strength = raw;
        raw
    }

    // ========================================================================
    // TORQUE
    // ========================================================================

    /// Torque per option from the active profile.
    pub fn generate_torque(
        &mut self,
        options: &[String],
        entropy: f64,
    ) -> Result<BTreeMap<String, f64>> {
        let multiplier = self.profile.torque_multiplier();
        let base_gamma = self.profile.base_gamma();
        let omega = self.profile.omega();
        self.generate_torque_with(options, entropy, multiplier, base_gamma, omega)
    }

    /// Torque using a mode's preset multiplier with explicit gain and speed.
    pub fn generate_torque_for(
        &mut self,
        options: &[String],
        entropy: f64,
        mode: CognitiveMode,
        base_gamma: f64,
        omega: f64,
    ) -> Result<BTreeMap<String, f64>> {
        let multiplier = mode.profile().torque_multiplier();
        self.generate_torque_with(options, entropy, multiplier, base_gamma, omega)
    }

    /// `torque_k = base_gamma · multiplier · (E / ln N) · cos(φ - 2πk/N)`,
    /// then `φ` advances by `omega`. Fewer than two options yield no torque
    /// and leave the phase alone.
    pub fn generate_torque_with(
        &mut self,
        options: &[String],
        entropy: f64,
        multiplier: f64,
        base_gamma: f64,
        omega: f64,
    ) -> Result<BTreeMap<String, f64>> {
        if options.len() <= 1 {
            return Ok(BTreeMap::new());
        }
        if !(entropy.is_finite() && entropy >= 0.0) {
            return Err(DynamicsError::InvalidParameter {
                name: "entropy",
                value: entropy,
                expected: ">= 0",
            });
        }
        let params = [
            ("torque_multiplier", multiplier),
            ("base_gamma", base_gamma),
            ("omega", omega),
        ];
        for (name, value) in params {
            if !value.is_finite() {
                return Err(DynamicsError::InvalidParameter {
                    name,
                    value,
                    expected: "finite",
                });
            }
        }

        let n = options.len() as f64;
        let normalized_entropy = entropy / n.ln();
        let gamma = base_gamma * multiplier;
        let phi = self.state.precession_phi;

        let torque = options
            .iter()
            .enumerate()
            .map(|(k, option)| {
                let psi = TAU * k as f64 / n;
                (option.clone(), gamma * normalized_entropy * (phi - psi).cos())
            })
            .collect();

        self.state.precession_phi = wrap_phase(phi + omega);
        Ok(torque)
    }

    // ========================================================================
    // DISTRESS
    // ========================================================================

    /// High uncertainty combined with a weak core.
    pub fn check_cognitive_distress(
        &mut self,
        entropy: f64,
        core_strength: f64,
        num_options: usize,
    ) -> DistressSignal {
        let signal = if num_options <= 1 {
            DistressSignal::calm()
        } else {
            let entropy_threshold =
                self.profile.entropy_threshold_ratio() * (num_options as f64).ln();
            if entropy > entropy_threshold && core_strength < self.profile.core_distress_threshold() {
                warn!(
                    entropy,
                    core_strength,
                    num_options,
                    mode = self.profile.mode().as_str(),
                    "Cognitive distress"
                );
                DistressSignal::distressed()
            } else {
                DistressSignal::calm()
            }
        };
        self.state.cognitive_distress = signal.distressed;
        signal
    }

    // ========================================================================
    // HISTORY & LIFECYCLE
    // ========================================================================

    pub fn update_history(&mut self, entropy: f64, core_strength: f64) {
        self.state.entropy_history.push(entropy);
        self.state.core_strength_history.push(core_strength);
    }

    /// Clear all state, including persisted core and phase.
    pub fn reset(&mut self) {
        self.state = DynamicsState::new(self.config.history_size);
    }

    pub fn snapshot(&self) -> DynamicsState {
        self.state.clone()
    }

    /// Restore a snapshot. Histories are truncated to the configured size.
    pub fn restore(&mut self, mut state: DynamicsState) -> Result<()> {
        check_unit("core_strength", state.core_strength)?;
        if let Some(core) = state.persistent_core {
            check_unit("persistent_core", core)?;
        }
        if !(state.precession_phi.is_finite()
            && (0.0..TAU).contains(&state.precession_phi))
        {
            return Err(DynamicsError::InvalidParameter {
                name: "precession_phi",
                value: state.precession_phi,
                expected: "[0, 2π)",
            });
        }
        if !(state.entropy.is_finite() && state.entropy >= 0.0) {
            return Err(DynamicsError::InvalidParameter {
                name: "entropy",
                value: state.entropy,
                expected: ">= 0",
            });
        }
        state.entropy_history.set_capacity(self.config.history_size);
        state.core_strength_history.set_capacity(self.config.history_size);
        self.state = state;
        Ok(())
    }

    pub fn status(&self) -> DynamicsStatus {
        DynamicsStatus {
            mode: self.profile.mode(),
            entropy: self.state.entropy,
            core_strength: self.state.core_strength,
            precession_phi: self.state.precession_phi,
            cognitive_distress: self.state.cognitive_distress,
            persistent_core: self.state.persistent_core,
            entropy_history_length: self.state.entropy_history.len(),
            core_strength_history_length: self.state.core_strength_history.len(),
        }
    }
}

/// `rem_euclid` can round a tiny negative sum up to exactly `TAU`.
fn wrap_phase(phi: f64) -> f64 {
    let wrapped = phi.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

fn check_unit(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DynamicsError::InvalidParameter {
            name,
            value,
            expected: "[0, 1]",
        })
    }
}
