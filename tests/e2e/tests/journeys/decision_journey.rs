//! Decision Journey Tests
//!
//! Complete workflows: record memories, recall them by importance, decide,
//! persist dynamics and pick up again in a fresh kernel.

use cogkernel_core::{CognitiveMode, DynamicsConfig, KernelConfig};
use cogkernel_e2e_tests::{TestDataFactory, TestKernelManager};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

// ============================================================================
// Remember / Recall / Decide
// ============================================================================

#[test]
fn test_remember_recall_decide_journey() {
    let tk = TestKernelManager::new(CognitiveMode::Normal);
    let ids = TestDataFactory::create_chain(
        &tk,
        &["coffee in the morning", "more coffee at noon", "coffee after lunch"],
        0.8,
    );
    assert_eq!(ids.len(), 3);

    let recalled = tk.kernel.recall(3).unwrap();
    assert_eq!(recalled.len(), 3);
    let total: f64 = recalled.iter().map(|r| r.importance).sum();
    assert!(approx_eq(total, 1.0, 1e-6));

    let result = tk.decide(&["drink_coffee", "drink_tea"], None);
    assert_eq!(result.action.as_deref(), Some("drink_coffee"));
    assert!(result.entropy >= 0.0 && result.entropy <= 2f64.ln() + 1e-9);

    let total: f64 = result.probability_distribution.values().sum();
    assert!(approx_eq(total, 1.0, 1e-9));
    assert!(approx_eq(
        result.probability,
        result.probability_distribution["drink_coffee"],
        1e-12
    ));
}

#[test]
fn test_habit_agreement_and_conflict() {
    let tk = TestKernelManager::new(CognitiveMode::Normal);
    tk.remember_text("the red door was open", 0.9, &[]);

    let agrees = tk.decide(&["choose_red", "choose_blue"], Some("choose_red"));
    assert!(!agrees.conflict);
    assert_eq!(agrees.habit_suggestion.as_deref(), Some("choose_red"));

    let conflicts = tk.decide(&["choose_red", "choose_blue"], Some("choose_blue"));
    assert!(conflicts.conflict);
}

#[test]
fn test_hub_memory_recalled_first() {
    let tk = TestKernelManager::new(CognitiveMode::Normal);
    let (hub, leaves) = TestDataFactory::create_hub(&tk, "kitchen", 4);
    assert_eq!(leaves.len(), 4);

    let top = tk.kernel.recall(1).unwrap();
    assert_eq!(top[0].id, hub);
    assert_eq!(tk.kernel.status().unwrap().relations, 8);
}

#[test]
fn test_history_tracks_every_cycle_up_to_capacity() {
    let tk = TestKernelManager::with_config(KernelConfig {
        dynamics: DynamicsConfig {
            history_size: 3,
            ..Default::default()
        },
        ..Default::default()
    });
    tk.remember_text("something", 0.5, &[]);

    for _ in 0..2 {
        tk.decide(&["a", "b"], None);
    }
    assert_eq!(tk.state().entropy_history.len(), 2);

    for _ in 0..3 {
        tk.decide(&["a", "b"], None);
    }
    let state = tk.state();
    assert_eq!(state.entropy_history.len(), 3);
    assert_eq!(state.core_strength_history.len(), 3);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_dynamics_snapshot_survives_restart() {
    let first = TestKernelManager::new(CognitiveMode::Alzheimer);
    first.remember_text("where are my keys", 1.0, &[]);
    first.decide(&["search", "wait"], None);
    first.advance_secs(100.0);
    first.decide(&["search", "wait"], None);

    let persisted = first.state().persistent_core.unwrap();
    let path = first.save_dynamics("dynamics.json");
    assert!(path.starts_with(first.temp_path()));

    // Fresh kernel whose clock starts before the saved decay timestamp
    let second = TestKernelManager::new(CognitiveMode::Alzheimer);
    second.load_dynamics(&path).unwrap();
    assert!(approx_eq(second.state().persistent_core.unwrap(), persisted, 1e-12));

    // Time running backwards counts as no elapsed time
    let held = second.decide(&["search", "wait"], None);
    assert!(approx_eq(held.core_strength, persisted, 1e-12));

    // The held cycle re-anchored the decay timestamp to this kernel's clock
    second.advance_secs(200.0);
    let decayed = second.decide(&["search", "wait"], None);
    assert!(approx_eq(decayed.core_strength, persisted * (-2.0f64).exp(), 1e-9));
}

#[test]
fn test_clear_forgets_everything_but_mode() {
    let tk = TestKernelManager::new(CognitiveMode::Ptsd);
    TestDataFactory::create_chain(&tk, &["loud noise", "ran away"], 0.9);
    tk.decide(&["stay", "leave"], None);

    tk.kernel.clear().unwrap();
    let status = tk.kernel.status().unwrap();
    assert_eq!(status.memories, 0);
    assert_eq!(status.relations, 0);
    assert_eq!(status.mode, CognitiveMode::Ptsd);
    assert_eq!(tk.state().precession_phi, 0.0);
    assert!(tk.kernel.recall(5).unwrap().is_empty());
}

#[test]
fn test_kernel_moves_across_threads() {
    let tk = TestKernelManager::new(CognitiveMode::Normal);
    tk.remember_text("background work", 0.6, &[]);

    let handle = std::thread::spawn(move || tk.decide(&["work", "rest"], None));
    let result = handle.join().unwrap();
    assert!(result.action.is_some());
}
