//! Adversarial Tests
//!
//! Malformed input must be rejected with a typed error and leave state
//! untouched; large inputs must stay well-formed.

use std::sync::Arc;

use cogkernel_core::dynamics::{DEFAULT_PROBABILITY_TOLERANCE, shannon_entropy};
use cogkernel_core::{
    CognitiveMode, DecisionError, DynamicsConfig, DynamicsCore, DynamicsError, Edge,
    ImportanceRanker, KernelConfig, KernelError, ManualClock, MemoryBankError, MemoryNode,
    ModeError, ModeProfile, PipelineError, RankingConfig, RankingError,
};
use cogkernel_e2e_tests::{TestDataFactory, TestKernelManager};
use serde_json::json;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

// ============================================================================
// Malformed Distributions
// ============================================================================

#[test]
fn test_malformed_distributions_rejected() {
    let bad: [&[f64]; 6] = [
        &[],
        &[0.5, f64::NAN],
        &[1.2, -0.2],
        &[0.3, 0.3],
        &[0.6, 0.6],
        &[f64::INFINITY, 0.0],
    ];
    for probabilities in bad {
        assert!(
            matches!(
                shannon_entropy(probabilities, DEFAULT_PROBABILITY_TOLERANCE),
                Err(DynamicsError::InvalidDistribution(_))
            ),
            "{probabilities:?}"
        );
    }
}

#[test]
fn test_rejected_entropy_leaves_state_alone() {
    let clock = ManualClock::at_millis(0);
    let mut core = DynamicsCore::new(
        DynamicsConfig::default(),
        CognitiveMode::Normal.profile(),
        Arc::new(clock),
    )
    .unwrap();
    core.calculate_entropy(&[0.5, 0.5]).unwrap();
    assert!(core.calculate_entropy(&[0.9, 0.9]).is_err());
    assert!(approx_eq(core.state().entropy, 2f64.ln(), 1e-12));
}

// ============================================================================
// Malformed Graphs
// ============================================================================

#[test]
fn test_malformed_graphs_rejected() {
    let nodes = || vec![MemoryNode::new("a", 0.5), MemoryNode::new("b", 0.5)];
    let mut ranker = ImportanceRanker::new();

    assert!(matches!(
        ranker.build_graph(vec![Edge::new("a", "ghost", 1.0)], nodes()),
        Err(RankingError::UnknownNode { .. })
    ));
    assert!(matches!(
        ranker.build_graph(vec![Edge::new("a", "b", f64::NAN)], nodes()),
        Err(RankingError::InvalidWeight { .. })
    ));
    assert!(matches!(
        ranker.build_graph(vec![Edge::new("a", "b", -1.0)], nodes()),
        Err(RankingError::InvalidWeight { .. })
    ));
    assert!(matches!(
        ranker.build_graph(vec![], nodes()),
        Err(RankingError::MissingEdges(2))
    ));
    let mut duplicated = nodes();
    duplicated.push(MemoryNode::new("a", 0.1));
    assert!(matches!(
        ranker.build_graph(vec![Edge::new("a", "b", 1.0)], duplicated),
        Err(RankingError::DuplicateNode(_))
    ));
}

#[test]
fn test_out_of_range_config_rejected() {
    for ranking in [
        RankingConfig {
            damping: 1.5,
            ..Default::default()
        },
        RankingConfig {
            max_iterations: 0,
            ..Default::default()
        },
        RankingConfig {
            convergence_threshold: -1.0,
            ..Default::default()
        },
    ] {
        assert!(matches!(
            ImportanceRanker::with_config(ranking.clone()),
            Err(RankingError::InvalidConfig(_))
        ));
        let config = KernelConfig {
            ranking,
            ..Default::default()
        };
        assert!(matches!(
            cogkernel_core::CognitiveKernel::new(config),
            Err(KernelError::Ranking(_))
        ));
    }
}

#[test]
fn test_invalid_profile_overrides_rejected() {
    let attempts = [
        ModeProfile::builder(CognitiveMode::Normal).damping(1.0).build(),
        ModeProfile::builder(CognitiveMode::Normal).decision_temperature(0.0).build(),
        ModeProfile::builder(CognitiveMode::Normal).working_memory_capacity(0).build(),
        ModeProfile::builder(CognitiveMode::Normal).core_decay_rate(-0.1).build(),
        ModeProfile::builder(CognitiveMode::Normal).omega(f64::NAN).build(),
        ModeProfile::builder(CognitiveMode::Normal).memory_update_failure(1.5).build(),
    ];
    for attempt in attempts {
        assert!(matches!(attempt, Err(ModeError::OutOfRange { .. })));
    }
    assert!(matches!(
        "sleepy".parse::<CognitiveMode>(),
        Err(ModeError::UnknownMode(_))
    ));
}

// ============================================================================
// Kernel Boundaries
// ============================================================================

#[test]
fn test_bad_memories_rejected_without_side_effects() {
    let tk = TestKernelManager::new(CognitiveMode::Normal);
    let id = tk.remember_text("kept", 0.5, &[]);

    let text = TestKernelManager::text;
    assert!(matches!(
        tk.kernel.remember("x", text("too important"), 1.5, 0.0, &[]),
        Err(KernelError::Memory(MemoryBankError::InvalidScore { field: "importance", .. }))
    ));
    assert!(matches!(
        tk.kernel.remember("x", text("nan emotion"), 0.5, f64::NAN, &[]),
        Err(KernelError::Memory(MemoryBankError::InvalidScore { field: "emotion", .. }))
    ));
    assert!(matches!(
        tk.kernel.remember("x", text("orphan"), 0.5, 0.0, &["ghost".to_string()]),
        Err(KernelError::Memory(MemoryBankError::UnknownRelated(_)))
    ));
    assert!(matches!(
        tk.kernel.link(&id, &id, -0.5),
        Err(KernelError::Memory(MemoryBankError::InvalidWeight(_)))
    ));

    let status = tk.kernel.status().unwrap();
    assert_eq!(status.memories, 1);
    assert_eq!(status.relations, 0);
}

#[test]
fn test_bad_option_lists_rejected() {
    let tk = TestKernelManager::new(CognitiveMode::Normal);
    assert!(matches!(
        tk.kernel.decide(&[], None),
        Err(KernelError::Pipeline(PipelineError::Decision(DecisionError::NoOptions)))
    ));
    assert!(matches!(
        tk.kernel.decide(&TestDataFactory::options(&["a", "b", "a"]), None),
        Err(KernelError::Pipeline(PipelineError::Decision(
            DecisionError::DuplicateOption(_)
        )))
    ));
    // Failed cycles record nothing
    assert!(tk.state().entropy_history.is_empty());
    assert_eq!(tk.state().precession_phi, 0.0);
}

#[test]
fn test_corrupt_snapshot_rejected() {
    let tk = TestKernelManager::new(CognitiveMode::Alzheimer);
    tk.decide(&["a", "b"], None);
    let before = tk.state();

    let mut snapshot = tk.kernel.dynamics_snapshot().unwrap();
    snapshot["precession_phi"] = json!(7.0);
    assert!(matches!(
        tk.kernel.restore_dynamics(snapshot),
        Err(KernelError::Dynamics(DynamicsError::InvalidParameter {
            name: "precession_phi",
            ..
        }))
    ));
    assert!(matches!(
        tk.kernel.restore_dynamics(json!({ "entropy": "high" })),
        Err(KernelError::Serialization(_))
    ));
    assert_eq!(tk.state(), before);
}

#[test]
fn test_poisoned_component_surfaces_as_error() {
    let tk = TestKernelManager::new(CognitiveMode::Normal);
    let handle = tk.kernel.dynamics_handle();
    let _ = std::thread::spawn(move || {
        let _guard = handle.lock().unwrap();
        panic!("dynamics holder crashed");
    })
    .join();

    let options = TestDataFactory::options(&["a", "b"]);
    assert!(matches!(
        tk.kernel.decide(&options, None),
        Err(KernelError::Pipeline(PipelineError::LockPoisoned(_)))
    ));
    assert!(matches!(
        tk.kernel.dynamics_state(),
        Err(KernelError::LockPoisoned(_))
    ));
}

// ============================================================================
// Scale
// ============================================================================

#[test]
fn test_many_options_stay_normalized() {
    let tk = TestKernelManager::new(CognitiveMode::Adhd);
    TestDataFactory::create_chain(&tk, &["option_7 looked good", "option_42 was fine"], 0.9);

    let options = TestDataFactory::numbered_options(200);
    let options: Vec<&str> = options.iter().map(String::as_str).collect();
    let result = tk.decide(&options, None);

    let total: f64 = result.probability_distribution.values().sum();
    assert!(approx_eq(total, 1.0, 1e-9));
    assert_eq!(result.probability_distribution.len(), 200);
    assert!(result.entropy <= 200f64.ln() + 1e-12);
}

#[test]
fn test_large_memory_graph_ranks_within_budget() {
    let tk = TestKernelManager::new(CognitiveMode::Ptsd);
    let texts: Vec<String> = (0..300).map(|i| format!("event {i}")).collect();
    let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
    TestDataFactory::create_chain(&tk, &texts, 0.6);

    let top = tk.kernel.recall(10).unwrap();
    assert_eq!(top.len(), 10);
    assert!(top.windows(2).all(|w| w[0].importance >= w[1].importance - 1e-12));
    let snapshot = tk.kernel.ranking_snapshot().unwrap();
    assert_eq!(snapshot.scores.len(), 300);
    let total: f64 = snapshot.scores.values().sum();
    assert!(approx_eq(total, 1.0, 1e-6));
}
