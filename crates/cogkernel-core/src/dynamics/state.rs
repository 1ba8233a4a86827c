//! Dynamics state and bounded histories

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed-capacity history; the oldest entry is evicted first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedHistory<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T> BoundedHistory<T> {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: T) {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change capacity, dropping the oldest entries if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl<T: Clone> BoundedHistory<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.values.iter().cloned().collect()
    }
}

/// Everything the dynamics core carries between decision cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicsState {
    /// Entropy of the latest pre-torque distribution
    pub entropy: f64,
    /// Latest core strength (0-1)
    pub core_strength: f64,
    /// Precession phase, kept in [0, 2π)
    pub precession_phi: f64,
    /// Core value carried across cycles while decay is active
    pub persistent_core: Option<f64>,
    /// When `persistent_core` was last decayed
    pub last_decay_time: Option<DateTime<Utc>>,
    pub cognitive_distress: bool,
    pub entropy_history: BoundedHistory<f64>,
    pub core_strength_history: BoundedHistory<f64>,
}

impl DynamicsState {
    pub fn new(history_size: usize) -> Self {
        Self {
            entropy: 0.0,
            core_strength: 0.0,
            precession_phi: 0.0,
            persistent_core: None,
            last_decay_time: None,
            cognitive_distress: false,
            entropy_history: BoundedHistory::new(history_size),
            core_strength_history: BoundedHistory::new(history_size),
        }
    }

    /// Drop persisted decay state.
    pub fn clear_persistence(&mut self) {
        self.persistent_core = None;
        self.last_decay_time = None;
    }
}

impl Default for DynamicsState {
    fn default() -> Self {
        Self::new(super::config::DEFAULT_HISTORY_SIZE)
    }
}
