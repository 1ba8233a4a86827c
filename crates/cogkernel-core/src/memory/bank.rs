//! In-memory event bank
//!
//! Minimal stand-in for the event store: keeps recorded events in insertion
//! order, tracks explicit relations between them, and derives the node and
//! edge lists a ranking pass needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::node::{Edge, MemoryNode, MemoryRecord};
use crate::clock::elapsed_secs;

/// Default recency half-life (one hour)
pub const DEFAULT_RECENCY_HALF_LIFE_SECS: f64 = 3600.0;

/// Weight of the implicit chain linking events when no relation was recorded
const CHAIN_EDGE_WEIGHT: f64 = 0.5;

/// Share of the forward weight given to the reverse relation
const BACKLINK_FACTOR: f64 = 0.5;

/// Errors from the memory bank
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MemoryBankError {
    /// A relation points at an event that was never recorded
    #[error("Related memory not found: {0}")]
    UnknownRelated(String),

    /// Importance or emotion outside [0, 1]
    #[error("Invalid {field}: {value} (expected [0, 1])")]
    InvalidScore { field: &'static str, value: f64 },

    /// Relation weight negative or not finite
    #[error("Invalid relation weight: {0}")]
    InvalidWeight(f64),
}

pub type Result<T> = std::result::Result<T, MemoryBankError>;

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: String,
    pub event_type: String,
    pub content: Map<String, Value>,
    pub importance: f64,
    pub emotion: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Inputs for one ranking pass.
#[derive(Debug, Clone, Default)]
pub struct GraphInputs {
    pub nodes: Vec<MemoryNode>,
    pub edges: Vec<Edge>,
}

/// Where a ranking pass gets its nodes, edges and record contents.
pub trait MemorySource: Send {
    fn graph_inputs(&self, now: DateTime<Utc>, half_life_secs: f64) -> GraphInputs;

    /// Record view of a node carrying its ranked importance.
    fn record(&self, id: &str, importance: f64) -> Option<MemoryRecord>;
}

/// Ordered store of events and their relations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryBank {
    events: Vec<StoredEvent>,
    edges: Vec<Edge>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and link it to earlier ones.
    ///
    /// Each related memory gets a forward edge `related -> new` weighted by
    /// `importance` and a weaker backlink `new -> related`.
    pub fn remember(
        &mut self,
        event_type: impl Into<String>,
        content: Map<String, Value>,
        importance: f64,
        emotion: f64,
        related_to: &[String],
        now: DateTime<Utc>,
    ) -> Result<String> {
        check_unit("importance", importance)?;
        check_unit("emotion", emotion)?;
        if let Some(missing) = related_to.iter().find(|id| !self.contains(id)) {
            return Err(MemoryBankError::UnknownRelated(missing.clone()));
        }

        let id = Uuid::new_v4().to_string();
        for related in related_to {
            self.edges
                .push(Edge::new(related.clone(), id.clone(), importance));
            self.edges
                .push(Edge::new(id.clone(), related.clone(), importance * BACKLINK_FACTOR));
        }

        self.events.push(StoredEvent {
            id: id.clone(),
            event_type: event_type.into(),
            content,
            importance,
            emotion,
            recorded_at: now,
        });

        Ok(id)
    }

    /// Add an explicit edge between two recorded events.
    pub fn link(&mut self, source: &str, target: &str, weight: f64) -> Result<()> {
        if !(weight.is_finite() && weight >= 0.0) {
            return Err(MemoryBankError::InvalidWeight(weight));
        }
        for id in [source, target] {
            if !self.contains(id) {
                return Err(MemoryBankError::UnknownRelated(id.to_string()));
            }
        }
        self.edges.push(Edge::new(source, target, weight));
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.events.iter().any(|e| e.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&StoredEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn events(&self) -> &[StoredEvent] {
        &self.events
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.edges.clear();
    }

    /// Record view of an event carrying the given (ranked) importance.
    pub fn record(&self, id: &str, importance: f64) -> Option<MemoryRecord> {
        self.get(id).map(|event| MemoryRecord {
            id: event.id.clone(),
            importance,
            content: event.content.clone(),
        })
    }

    /// Recency of an event: exponential half-life decay from its recording time.
    pub fn recency(&self, event: &StoredEvent, now: DateTime<Utc>, half_life_secs: f64) -> f64 {
        if half_life_secs <= 0.0 {
            return 1.0;
        }
        let age = elapsed_secs(event.recorded_at, now);
        (-std::f64::consts::LN_2 * age / half_life_secs).exp()
    }

    /// Node attributes and edges for a ranking pass.
    ///
    /// Without recorded relations, events are chained in insertion order; a
    /// lone event gets a self-loop so it stays rankable.
    pub fn graph_inputs(&self, now: DateTime<Utc>, half_life_secs: f64) -> GraphInputs {
        let nodes = self
            .events
            .iter()
            .map(|event| MemoryNode {
                id: event.id.clone(),
                base_importance: event.importance,
                recency: self.recency(event, now, half_life_secs),
                emotion: event.emotion,
                frequency: 1.0,
            })
            .collect();

        let edges = if !self.edges.is_empty() {
            self.edges.clone()
        } else if self.events.len() == 1 {
            vec![Edge::new(self.events[0].id.clone(), self.events[0].id.clone(), 1.0)]
        } else {
            self.events
                .windows(2)
                .map(|pair| Edge::new(pair[0].id.clone(), pair[1].id.clone(), CHAIN_EDGE_WEIGHT))
                .collect()
        };

        GraphInputs { nodes, edges }
    }
}

impl MemorySource for MemoryBank {
    fn graph_inputs(&self, now: DateTime<Utc>, half_life_secs: f64) -> GraphInputs {
        MemoryBank::graph_inputs(self, now, half_life_secs)
    }

    fn record(&self, id: &str, importance: f64) -> Option<MemoryRecord> {
        MemoryBank::record(self, id, importance)
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MemoryBankError::InvalidScore { field, value })
    }
}
