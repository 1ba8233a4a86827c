//! Pipeline Extension Tests
//!
//! Editing the standard cycle: spies, removed steps, replaced steps and
//! custom evaluators.

use cogkernel_core::{
    CognitiveKernel, CognitiveMode, KernelConfig, KernelError, ManualClock, PipelineError,
    RawCoreStrengthStep,
};
use cogkernel_e2e_tests::{FixedEvaluator, SpyStep, TestDataFactory, TestKernelManager};
use std::sync::Arc;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn kernel_with_evaluator(config: KernelConfig, evaluator: FixedEvaluator) -> CognitiveKernel {
    CognitiveKernel::builder(config)
        .clock(Arc::new(ManualClock::at_millis(0)))
        .evaluator(evaluator)
        .build()
        .unwrap()
}

#[test]
fn test_spies_see_context_between_steps() {
    let mut tk = TestKernelManager::new(CognitiveMode::Normal);
    TestDataFactory::create_chain(&tk, &["one", "two"], 0.5);

    let after_decision = SpyStep::new();
    let at_end = SpyStep::new();
    let index = tk
        .kernel
        .pipeline()
        .step_names()
        .iter()
        .position(|name| *name == "Decision")
        .unwrap();
    tk.kernel
        .pipeline_mut()
        .insert_step(index + 1, after_decision.clone())
        .unwrap();
    tk.kernel.pipeline_mut().push_step(at_end.clone());
    assert_eq!(tk.kernel.pipeline().len(), 11);

    tk.decide(&["x", "y", "z"], None);

    let early = after_decision.observations();
    assert_eq!(early.len(), 1);
    assert_eq!(early[0].memories, 2);
    assert_eq!(early[0].actions, vec!["x", "y", "z"]);
    assert_eq!(early[0].entropy, 0.0);
    assert_eq!(early[0].torque, 0);

    let late = at_end.observations();
    assert!(late[0].entropy > 0.0);
    assert_eq!(late[0].torque, 3);
}

#[test]
fn test_without_torque_steps_phase_stays_put() {
    let mut tk = TestKernelManager::new(CognitiveMode::Adhd);
    tk.kernel.pipeline_mut().remove_step("TorqueGeneration").unwrap();
    tk.kernel.pipeline_mut().remove_step("UtilityRecalculation").unwrap();

    for _ in 0..3 {
        tk.decide(&["a", "b"], None);
    }
    assert_eq!(tk.state().precession_phi, 0.0);
}

#[test]
fn test_phase_advances_once_per_cycle() {
    let tk = TestKernelManager::new(CognitiveMode::Normal);
    for _ in 0..4 {
        tk.decide(&["a", "b"], None);
    }
    assert!(approx_eq(tk.state().precession_phi, 4.0 * 0.05, 1e-12));
}

#[test]
fn test_scripted_evaluator_drives_result() {
    let kernel = kernel_with_evaluator(
        KernelConfig::default(),
        FixedEvaluator::new(vec![0.7, 0.2, 0.1]),
    );
    let result = kernel
        .decide(&TestDataFactory::options(&["first", "second", "third"]), None)
        .unwrap();

    assert_eq!(result.action.as_deref(), Some("first"));
    assert!(approx_eq(result.probability, 0.7, 1e-12));
    // -(0.7 ln 0.7 + 0.2 ln 0.2 + 0.1 ln 0.1)
    assert!(approx_eq(result.entropy, 0.8018, 1e-3));
}

#[test]
fn test_working_memory_follows_capacity() {
    let evaluator = FixedEvaluator::new(vec![0.5, 0.5]);
    let working_memory = evaluator.working_memory.clone();
    let kernel = kernel_with_evaluator(
        KernelConfig {
            working_memory_capacity: Some(2),
            ..Default::default()
        },
        evaluator,
    );
    let mut previous: Vec<String> = Vec::new();
    for _ in 0..5 {
        let id = kernel
            .remember("obs", Default::default(), 0.5, 0.0, &previous)
            .unwrap();
        previous = vec![id];
    }

    kernel
        .decide(&TestDataFactory::options(&["a", "b"]), None)
        .unwrap();
    let loaded = working_memory.lock().unwrap().clone();
    assert_eq!(loaded.len(), 2);
    assert!(loaded[0].1 >= loaded[1].1);
}

#[test]
fn test_default_capacity_follows_mode() {
    let evaluator = FixedEvaluator::new(vec![0.5, 0.5]);
    let working_memory = evaluator.working_memory.clone();
    let mut kernel = kernel_with_evaluator(KernelConfig::default(), evaluator);
    for _ in 0..10 {
        kernel
            .remember("obs", Default::default(), 0.5, 0.0, &[])
            .unwrap();
    }
    let options = TestDataFactory::options(&["a", "b"]);

    kernel.decide(&options, None).unwrap();
    assert_eq!(working_memory.lock().unwrap().len(), 7);

    kernel.set_mode(CognitiveMode::Adhd).unwrap();
    kernel.decide(&options, None).unwrap();
    assert_eq!(working_memory.lock().unwrap().len(), 5);
}

#[test]
fn test_raw_core_step_ignores_decay() {
    let mut tk = TestKernelManager::new(CognitiveMode::Alzheimer);
    tk.remember_text("fading", 1.0, &[]);
    let raw = RawCoreStrengthStep::new(tk.kernel.dynamics_handle());
    tk.kernel.pipeline_mut().replace_step("CoreStrength", raw).unwrap();
    assert!(tk.kernel.pipeline().contains("RawCoreStrength"));

    let first = tk.decide(&["a", "b"], None);
    tk.advance_secs(1000.0);
    let later = tk.decide(&["a", "b"], None);
    assert!(approx_eq(first.core_strength, later.core_strength, 1e-12));
    assert!(tk.state().persistent_core.is_none());
}

#[test]
fn test_edit_errors_leave_pipeline_intact() {
    let mut tk = TestKernelManager::new(CognitiveMode::Normal);
    let before = tk.kernel.pipeline().to_string();

    assert_eq!(
        tk.kernel.pipeline_mut().remove_step("Missing").err().unwrap(),
        PipelineError::UnknownStep("Missing".to_string())
    );
    assert!(matches!(
        tk.kernel.pipeline_mut().insert_step(42, SpyStep::new()),
        Err(PipelineError::IndexOutOfRange { index: 42, len: 9 })
    ));
    assert_eq!(tk.kernel.pipeline().to_string(), before);
}

#[test]
fn test_emptied_pipeline_reports_no_result() {
    let mut tk = TestKernelManager::new(CognitiveMode::Normal);
    for name in tk.kernel.pipeline().step_names() {
        tk.kernel.pipeline_mut().remove_step(name).unwrap();
    }
    assert!(tk.kernel.pipeline().is_empty());

    let options = TestDataFactory::options(&["a", "b"]);
    assert!(matches!(
        tk.kernel.decide(&options, None),
        Err(KernelError::NoResult(_))
    ));

    tk.kernel.reset_pipeline();
    assert!(tk.kernel.decide(&options, None).is_ok());
}
