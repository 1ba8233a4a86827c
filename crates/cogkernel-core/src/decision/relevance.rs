//! Keyword relevance and action construction

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::{Action, DecisionError, RelevanceScorer, Result};
use crate::memory::MemoryRecord;

/// Verbs dropped from option names before matching
pub const IGNORED_VERBS: [&str; 6] = ["choose", "select", "do", "pick", "take", "make"];

/// Matches option keywords against memory content.
///
/// `"choose_red"` yields `["red"]`; a memory mentioning "red" with
/// importance 0.6 contributes 0.6. Each memory contributes its importance
/// times the share of keywords found in its content; the sum is capped at 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordRelevance;

impl KeywordRelevance {
    /// Lower-cased name parts split on `_`, `-` and whitespace, minus
    /// [`IGNORED_VERBS`]. Falls back to the whole name.
    pub fn keywords(option: &str) -> Vec<String> {
        let keywords: Vec<String> = option
            .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase)
            .filter(|part| !IGNORED_VERBS.contains(&part.as_str()))
            .collect();
        if keywords.is_empty() {
            vec![option.to_lowercase()]
        } else {
            keywords
        }
    }
}

impl RelevanceScorer for KeywordRelevance {
    fn relevance(&self, option: &str, memories: &[MemoryRecord]) -> f64 {
        if memories.is_empty() {
            return 0.0;
        }
        let keywords = Self::keywords(option);
        let per_keyword = 1.0 / keywords.len() as f64;

        let total: f64 = memories
            .iter()
            .map(|memory| {
                let text = memory.content_text();
                let matched = keywords.iter().filter(|k| text.contains(k.as_str())).count();
                memory.importance * matched as f64 * per_keyword
            })
            .sum();
        total.min(1.0)
    }
}

/// Builds candidate actions: `reward = base_reward + alpha · relevance (+ torque)`.
#[derive(Clone)]
pub struct ActionFactory {
    relevance: Arc<dyn RelevanceScorer>,
    alpha: f64,
    base_reward: f64,
    effort_cost: f64,
    risk: f64,
}

impl std::fmt::Debug for ActionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionFactory")
            .field("alpha", &self.alpha)
            .field("base_reward", &self.base_reward)
            .field("effort_cost", &self.effort_cost)
            .field("risk", &self.risk)
            .finish_non_exhaustive()
    }
}

impl Default for ActionFactory {
    fn default() -> Self {
        Self::new(Arc::new(KeywordRelevance))
    }
}

impl ActionFactory {
    pub const DEFAULT_ALPHA: f64 = 0.5;
    pub const DEFAULT_BASE_REWARD: f64 = 0.5;
    pub const DEFAULT_EFFORT_COST: f64 = 0.2;
    pub const DEFAULT_RISK: f64 = 0.1;

    pub fn new(relevance: Arc<dyn RelevanceScorer>) -> Self {
        Self {
            relevance,
            alpha: Self::DEFAULT_ALPHA,
            base_reward: Self::DEFAULT_BASE_REWARD,
            effort_cost: Self::DEFAULT_EFFORT_COST,
            risk: Self::DEFAULT_RISK,
        }
    }

    /// Override the scoring constants. All must be finite.
    pub fn with_scores(
        mut self,
        alpha: f64,
        base_reward: f64,
        effort_cost: f64,
        risk: f64,
    ) -> Result<Self> {
        for (name, value) in [
            ("alpha", alpha),
            ("base_reward", base_reward),
            ("effort_cost", effort_cost),
            ("risk", risk),
        ] {
            if !value.is_finite() {
                return Err(DecisionError::InvalidParameter { name, value });
            }
        }
        self.alpha = alpha;
        self.base_reward = base_reward;
        self.effort_cost = effort_cost;
        self.risk = risk;
        Ok(self)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// One action per option, in order. Options must be distinct and non-empty.
    pub fn build(
        &self,
        options: &[String],
        memories: &[MemoryRecord],
        torque: Option<&BTreeMap<String, f64>>,
    ) -> Result<Vec<Action>> {
        if options.is_empty() {
            return Err(DecisionError::NoOptions);
        }
        let mut seen = HashSet::with_capacity(options.len());
        for option in options {
            if !seen.insert(option.as_str()) {
                return Err(DecisionError::DuplicateOption(option.clone()));
            }
        }

        Ok(options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let relevance = self.relevance.relevance(option, memories);
                let bias = torque.and_then(|t| t.get(option)).copied().unwrap_or(0.0);
                Action {
                    id: format!("action_{i}"),
                    name: option.clone(),
                    expected_reward: self.base_reward + self.alpha * relevance + bias,
                    effort_cost: self.effort_cost,
                    risk: self.risk,
                }
            })
            .collect())
    }
}
