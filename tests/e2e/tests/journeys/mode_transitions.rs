//! Mode Transition Tests
//!
//! Switching presets mid-session: decay lifecycle, evaluator reconfiguration,
//! and the behavioral contrast between exploration and exploitation.

use cogkernel_core::{CognitiveKernel, CognitiveMode, KernelConfig, ModeProfile};
use cogkernel_e2e_tests::{FixedEvaluator, TestKernelManager};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_decay_starts_fresh_after_switch() {
    let mut tk = TestKernelManager::new(CognitiveMode::Normal);
    tk.remember_text("grocery list", 1.0, &[]);

    tk.decide(&["shop", "cook"], None);
    assert!(tk.state().persistent_core.is_none());

    tk.kernel.set_mode(CognitiveMode::Alzheimer).unwrap();
    let seeded = tk.decide(&["shop", "cook"], None);
    assert_eq!(tk.state().persistent_core, Some(seeded.core_strength));

    tk.advance_secs(60.0);
    let decayed = tk.decide(&["shop", "cook"], None);
    assert!(decayed.core_strength < seeded.core_strength);

    // Back to baseline: persistence gone, time no longer matters
    tk.kernel.set_mode(CognitiveMode::Normal).unwrap();
    let a = tk.decide(&["shop", "cook"], None);
    tk.advance_secs(3600.0 * 24.0);
    let b = tk.decide(&["shop", "cook"], None);
    assert!(tk.state().persistent_core.is_none());
    assert!(b.core_strength > decayed.core_strength);
    assert!(approx_eq(a.core_strength, b.core_strength, 1e-12));
}

#[test]
fn test_mode_switch_reconfigures_evaluator() {
    let evaluator = FixedEvaluator::new(vec![0.5, 0.5]);
    let betas = evaluator.configured_betas.clone();

    let mut kernel = CognitiveKernel::builder(KernelConfig::default())
        .evaluator(evaluator)
        .build()
        .unwrap();
    kernel.set_mode(CognitiveMode::Asd).unwrap();
    kernel.set_mode(CognitiveMode::Adhd).unwrap();

    assert_eq!(*betas.lock().unwrap(), vec![1.0, 5.0, 0.5]);
}

#[test]
fn test_exploitation_is_more_certain_than_exploration() {
    let entropy_in = |mode| {
        let tk = TestKernelManager::new(mode);
        tk.remember_text("the red door was open", 1.0, &[]);
        tk.decide(&["choose_red", "choose_blue"], None).entropy
    };

    let asd = entropy_in(CognitiveMode::Asd);
    let normal = entropy_in(CognitiveMode::Normal);
    let adhd = entropy_in(CognitiveMode::Adhd);
    assert!(asd < normal, "asd {asd} vs normal {normal}");
    assert!(normal < adhd, "normal {normal} vs adhd {adhd}");
}

#[test]
fn test_custom_profile_drives_decay() {
    let mut tk = TestKernelManager::new(CognitiveMode::Normal);
    tk.remember_text("appointment at noon", 1.0, &[]);

    let profile = ModeProfile::builder(CognitiveMode::Normal)
        .core_decay_rate(0.1)
        .build()
        .unwrap();
    tk.kernel.set_profile(profile).unwrap();
    assert_eq!(tk.kernel.mode(), CognitiveMode::Normal);
    assert!(tk.kernel.profile().decays());

    let first = tk.decide(&["go", "stay"], None);
    tk.advance_secs(10.0);
    let second = tk.decide(&["go", "stay"], None);
    assert!(approx_eq(
        second.core_strength,
        first.core_strength * (-1.0f64).exp(),
        1e-9
    ));
}

#[test]
fn test_every_mode_runs_a_cycle() {
    for mode in CognitiveMode::ALL {
        let tk = TestKernelManager::new(mode);
        tk.remember_text("first", 0.4, &[]);
        let result = tk.decide(&["left", "right", "straight"], None);
        let total: f64 = result.probability_distribution.values().sum();
        assert!(approx_eq(total, 1.0, 1e-9), "mode {mode}");
        assert!(result.core_strength >= 0.0 && result.core_strength <= 1.0);
    }
}
