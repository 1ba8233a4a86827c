//! Memory records and graph primitives
//!
//! - [`MemoryRecord`]: what the event store hands the kernel (id, importance, content)
//! - [`MemoryNode`]: per-node attributes attached to one ranking pass
//! - [`Edge`]: directed, weighted relation between two memories

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// MEMORY RECORD
// ============================================================================

/// A recalled memory as seen by the decision cycle.
///
/// After ranking, `importance` carries the node's graph score rather than the
/// author-assigned importance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique identifier
    pub id: String,
    /// Importance in [0, 1]
    pub importance: f64,
    /// Free-form content
    #[serde(default)]
    pub content: Map<String, Value>,
}

impl MemoryRecord {
    /// Create a record with empty content
    pub fn new(id: impl Into<String>, importance: f64) -> Self {
        Self {
            id: id.into(),
            importance,
            content: Map::new(),
        }
    }

    /// Attach a content field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.content.insert(key.into(), value.into());
        self
    }

    /// All content values joined into one lower-cased string.
    ///
    /// Strings contribute their raw text; other values their JSON form.
    pub fn content_text(&self) -> String {
        self.content
            .values()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

// ============================================================================
// MEMORY NODE
// ============================================================================

/// Attributes of one memory for a single ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryNode {
    pub id: String,
    /// Author-assigned importance (0-1)
    pub base_importance: f64,
    /// Freshness supplied by the event store (0-1)
    pub recency: f64,
    /// Emotional intensity (0-1)
    pub emotion: f64,
    /// Access frequency (0-1)
    pub frequency: f64,
}

impl MemoryNode {
    /// Node with neutral attributes (recency 0.5, no emotion, frequency 1).
    pub fn new(id: impl Into<String>, base_importance: f64) -> Self {
        Self {
            id: id.into(),
            base_importance,
            recency: 0.5,
            emotion: 0.0,
            frequency: 1.0,
        }
    }

    pub fn with_recency(mut self, recency: f64) -> Self {
        self.recency = recency;
        self
    }

    pub fn with_emotion(mut self, emotion: f64) -> Self {
        self.emotion = emotion;
        self
    }

    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }
}

// ============================================================================
// EDGE
// ============================================================================

/// Directed weighted edge. Parallel edges between the same pair accumulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl<S: Into<String>, T: Into<String>> From<(S, T, f64)> for Edge {
    fn from((source, target, weight): (S, T, f64)) -> Self {
        Edge::new(source, target, weight)
    }
}
