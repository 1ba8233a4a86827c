//! Scenario files
//!
//! A scenario is a JSON document describing the memories to record, the
//! options to choose between and an optional habit suggestion:
//!
//! ```json
//! {
//!   "memories": [
//!     { "text": "the red door was open", "importance": 0.9 },
//!     { "event_type": "warning", "content": { "note": "blue door is locked" },
//!       "importance": 0.6, "emotion": 0.4, "related_to": [0] }
//!   ],
//!   "options": ["open_red", "open_blue"],
//!   "habit": "open_blue"
//! }
//! ```
//!
//! `related_to` holds indices of earlier memories in the same file.

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use cogkernel_core::{CognitiveKernel, CognitiveMode, KernelConfig};

fn default_event_type() -> String {
    "observation".to_string()
}

/// One memory to record before deciding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMemory {
    #[serde(default = "default_event_type")]
    pub event_type: String,
    /// Shorthand for `content.text`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub content: Map<String, Value>,
    pub importance: f64,
    #[serde(default)]
    pub emotion: f64,
    /// Indices of earlier memories in the scenario
    #[serde(default)]
    pub related_to: Vec<usize>,
}

impl ScenarioMemory {
    fn content(&self) -> Map<String, Value> {
        let mut content = self.content.clone();
        if let Some(text) = &self.text {
            content.insert("text".to_string(), Value::String(text.clone()));
        }
        content
    }
}

/// A complete decision scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub memories: Vec<ScenarioMemory>,
    pub options: Vec<String>,
    #[serde(default)]
    pub habit: Option<String>,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid scenario JSON in {}", path.display()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Relations must point backwards; options must be non-empty.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.options.is_empty() {
            bail!("Scenario has no options");
        }
        for (i, memory) in self.memories.iter().enumerate() {
            if let Some(bad) = memory.related_to.iter().find(|&&r| r >= i) {
                bail!("Memory {i} relates to {bad}, which is not an earlier memory");
            }
        }
        Ok(())
    }

    /// Record every memory into the kernel; returns the generated ids in
    /// scenario order.
    pub fn record_into(&self, kernel: &CognitiveKernel) -> anyhow::Result<Vec<String>> {
        self.validate()?;
        let mut ids: Vec<String> = Vec::with_capacity(self.memories.len());
        for (i, memory) in self.memories.iter().enumerate() {
            let related: Vec<String> = memory.related_to.iter().map(|&r| ids[r].clone()).collect();
            let id = kernel
                .remember(
                    memory.event_type.clone(),
                    memory.content(),
                    memory.importance,
                    memory.emotion,
                    &related,
                )
                .with_context(|| format!("Failed to record memory {i}"))?;
            ids.push(id);
        }
        Ok(ids)
    }
}

/// Kernel config from an optional JSON file, with an optional mode override.
pub fn load_config(path: Option<&Path>, mode: Option<&str>) -> anyhow::Result<KernelConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str::<KernelConfig>(&raw)
                .with_context(|| format!("Invalid config JSON in {}", path.display()))?
        }
        None => KernelConfig::default(),
    };
    if let Some(name) = mode {
        config.mode = CognitiveMode::parse_name(name)?;
    }
    config.validate()?;
    Ok(config)
}
