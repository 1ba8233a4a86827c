//! # Graph Importance Ranking
//!
//! Ranks memories by damped propagation of importance over a weighted,
//! directed relation graph (PageRank by power iteration):
//!
//! ```text
//! score_i = (1 - d) / N  +  d · Σ_j (w_ji / out_strength(j)) · score_j
//! ```
//!
//! - Edge weights are normalized by the source's total outgoing weight, so
//!   parallel edges accumulate.
//! - Dangling nodes (no outgoing weight) spread their mass evenly over all
//!   nodes, keeping the scores a probability distribution.
//! - Edges whose endpoints a [`LocalityClassifier`] deems local are scaled by
//!   the active mode's `local_weight_boost` before normalization.
//!
//! ## References
//!
//! - Page, L., Brin, S., Motwani, R., & Winograd, T. (1999). The PageRank
//!   citation ranking: Bringing order to the web.

mod locality;

pub use locality::{LocalityClassifier, RecencyBuckets};

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::memory::{Edge, MemoryNode};
use crate::modes::{DEFAULT_DAMPING, ModeProfile};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default iteration cap for power iteration
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Default L1 convergence threshold
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 1e-10;

/// Scores equal to this many decimal places are ranked as ties
const TIE_SCALE: f64 = 1e12;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Errors raised while building or configuring the importance graph
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RankingError {
    /// An edge references a node missing from the node list
    #[error("Unknown node in edge {source_id} -> {target_id}: {missing}")]
    UnknownNode {
        source_id: String,
        target_id: String,
        missing: String,
    },

    /// The same node id appears twice
    #[error("Duplicate node: {0}")]
    DuplicateNode(String),

    /// Edge weight negative or not finite
    #[error("Invalid weight {weight} on edge {source_id} -> {target_id}")]
    InvalidWeight {
        source_id: String,
        target_id: String,
        weight: f64,
    },

    /// More than one node but no edges to propagate along
    #[error("Graph with {0} nodes has no edges")]
    MissingEdges(usize),

    /// Ranking parameters out of range
    #[error("Invalid ranking config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RankingError>;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Power-iteration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Probability of following an edge rather than jumping uniformly
    pub damping: f64,
    /// Multiplier for edges between local memories
    pub local_weight_boost: f64,
    /// Hard cap on iterations
    pub max_iterations: usize,
    /// Stop once the L1 change of the score vector drops below this
    pub convergence_threshold: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            local_weight_boost: 1.0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(RankingError::InvalidConfig(format!(
                "damping must lie in (0, 1), got {}",
                self.damping
            )));
        }
        if !(self.local_weight_boost.is_finite() && self.local_weight_boost > 0.0) {
            return Err(RankingError::InvalidConfig(format!(
                "local_weight_boost must be positive, got {}",
                self.local_weight_boost
            )));
        }
        if self.max_iterations == 0 {
            return Err(RankingError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.convergence_threshold.is_finite() && self.convergence_threshold > 0.0) {
            return Err(RankingError::InvalidConfig(format!(
                "convergence_threshold must be positive, got {}",
                self.convergence_threshold
            )));
        }
        Ok(())
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of one propagation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingRun {
    pub iterations: usize,
    pub converged: bool,
}

/// Persistable view of the graph: node scores plus edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingSnapshot {
    pub scores: BTreeMap<String, f64>,
    pub edges: Vec<Edge>,
}

// ============================================================================
// RANKER
// ============================================================================

/// Holds the current importance graph and its scores.
///
/// Scores start uniform (1/N) when a graph is built and are refined by
/// [`ImportanceRanker::calculate_importance`].
pub struct ImportanceRanker {
    config: RankingConfig,
    classifier: Box<dyn LocalityClassifier>,
    nodes: Vec<MemoryNode>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
    scores: Vec<f64>,
    last_run: Option<RankingRun>,
}

impl std::fmt::Debug for ImportanceRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportanceRanker")
            .field("config", &self.config)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("last_run", &self.last_run)
            .finish_non_exhaustive()
    }
}

impl Default for ImportanceRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportanceRanker {
    pub fn new() -> Self {
        Self {
            config: RankingConfig::default(),
            classifier: Box::new(RecencyBuckets::default()),
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            scores: Vec::new(),
            last_run: None,
        }
    }

    pub fn with_config(config: RankingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Replace the locality hook.
    pub fn with_classifier(mut self, classifier: impl LocalityClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Adopt the damping and local boost of a mode profile.
    pub fn set_profile(&mut self, profile: &ModeProfile) {
        self.config.damping = profile.damping();
        self.config.local_weight_boost = profile.local_weight_boost();
    }

    /// Replace the current graph.
    ///
    /// Every edge endpoint must appear in `nodes`. An empty edge list is only
    /// accepted for graphs with at most one node.
    pub fn build_graph(&mut self, edges: Vec<Edge>, nodes: Vec<MemoryNode>) -> Result<()> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(RankingError::DuplicateNode(node.id.clone()));
            }
        }

        for edge in &edges {
            if !(edge.weight.is_finite() && edge.weight >= 0.0) {
                return Err(RankingError::InvalidWeight {
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                    weight: edge.weight,
                });
            }
            for endpoint in [&edge.source, &edge.target] {
                if !index.contains_key(endpoint) {
                    return Err(RankingError::UnknownNode {
                        source_id: edge.source.clone(),
                        target_id: edge.target.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
        }

        if edges.is_empty() && nodes.len() > 1 {
            return Err(RankingError::MissingEdges(nodes.len()));
        }

        let n = nodes.len();
        self.scores = vec![if n == 0 { 0.0 } else { 1.0 / n as f64 }; n];
        self.nodes = nodes;
        self.index = index;
        self.edges = edges;
        self.last_run = None;

        debug!(nodes = n, edges = self.edges.len(), "Importance graph rebuilt");
        Ok(())
    }

    /// Run damped propagation until convergence or the iteration cap.
    pub fn calculate_importance(&mut self) -> RankingRun {
        let n = self.nodes.len();
        if n == 0 {
            let run = RankingRun {
                iterations: 0,
                converged: true,
            };
            self.last_run = Some(run);
            return run;
        }

        let d = self.config.damping;
        let base = (1.0 - d) / n as f64;

        // (source, target, boosted weight)
        let links: Vec<(usize, usize, f64)> = self
            .edges
            .iter()
            .filter_map(|edge| {
                let s = *self.index.get(&edge.source)?;
                let t = *self.index.get(&edge.target)?;
                let w = if self.classifier.is_local(&self.nodes[s], &self.nodes[t]) {
                    edge.weight * self.config.local_weight_boost
                } else {
                    edge.weight
                };
                Some((s, t, w))
            })
            .collect();

        let mut out_strength = vec![0.0_f64; n];
        for &(s, _, w) in &links {
            out_strength[s] += w;
        }

        let mut scores = vec![1.0 / n as f64; n];
        let mut next = vec![0.0_f64; n];
        let mut run = RankingRun {
            iterations: 0,
            converged: false,
        };

        for _ in 0..self.config.max_iterations {
            run.iterations += 1;

            let dangling: f64 = (0..n)
                .filter(|&j| out_strength[j] <= 0.0)
                .map(|j| scores[j])
                .sum();
            let floor = base + d * dangling / n as f64;
            next.iter_mut().for_each(|v| *v = floor);

            for &(s, t, w) in &links {
                if out_strength[s] > 0.0 {
                    next[t] += d * (w / out_strength[s]) * scores[s];
                }
            }

            let delta: f64 = scores
                .iter()
                .zip(next.iter())
                .map(|(a, b)| (a - b).abs())
                .sum();
            std::mem::swap(&mut scores, &mut next);

            if delta < self.config.convergence_threshold {
                run.converged = true;
                break;
            }
        }

        debug!(
            nodes = n,
            iterations = run.iterations,
            converged = run.converged,
            "Importance propagation finished"
        );

        self.scores = scores;
        self.last_run = Some(run);
        run
    }

    /// Highest-scoring memories, descending.
    ///
    /// Ties are broken by higher recency, then by insertion order.
    pub fn get_top_memories(&self, k: usize) -> Vec<(String, f64)> {
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by(|&a, &b| {
            let qa = (self.scores[a] * TIE_SCALE).round() as i64;
            let qb = (self.scores[b] * TIE_SCALE).round() as i64;
            qb.cmp(&qa)
                .then_with(|| self.nodes[b].recency.total_cmp(&self.nodes[a].recency))
                .then_with(|| a.cmp(&b))
        });
        order
            .into_iter()
            .take(k)
            .map(|i| (self.nodes[i].id.clone(), self.scores[i]))
            .collect()
    }

    pub fn score(&self, id: &str) -> Option<f64> {
        self.index.get(id).map(|&i| self.scores[i])
    }

    pub fn node(&self, id: &str) -> Option<&MemoryNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn last_run(&self) -> Option<RankingRun> {
        self.last_run
    }

    pub fn snapshot(&self) -> RankingSnapshot {
        RankingSnapshot {
            scores: self
                .nodes
                .iter()
                .zip(self.scores.iter())
                .map(|(node, score)| (node.id.clone(), *score))
                .collect(),
            edges: self.edges.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
        self.scores.clear();
        self.last_run = None;
    }
}
