//! Edge locality classification
//!
//! Edges between "local" memories (same cluster) are scaled by the active
//! mode's `local_weight_boost` before propagation. Clustering is pluggable;
//! the default groups memories into recency buckets.

use crate::memory::MemoryNode;

/// Decides whether an edge connects two memories from the same cluster.
pub trait LocalityClassifier: Send + Sync {
    fn is_local(&self, source: &MemoryNode, target: &MemoryNode) -> bool;
}

/// Memories whose recency falls into the same fixed-width bucket are local.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecencyBuckets {
    width: f64,
}

impl RecencyBuckets {
    /// Default bucket width (four buckets over [0, 1])
    pub const DEFAULT_WIDTH: f64 = 0.25;

    /// Non-positive or non-finite widths fall back to the default.
    pub fn new(width: f64) -> Self {
        let width = if width.is_finite() && width > 0.0 {
            width
        } else {
            Self::DEFAULT_WIDTH
        };
        Self { width }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    fn bucket(&self, recency: f64) -> i64 {
        // recency 1.0 belongs with the top bucket
        let clamped = recency.clamp(0.0, 1.0 - f64::EPSILON);
        (clamped / self.width).floor() as i64
    }
}

impl Default for RecencyBuckets {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH)
    }
}

impl LocalityClassifier for RecencyBuckets {
    fn is_local(&self, source: &MemoryNode, target: &MemoryNode) -> bool {
        self.bucket(source.recency) == self.bucket(target.recency)
    }
}
