//! Integration tests for the run loop.
//!
//! Validates ordering, the starting offset, per-module failure
//! accounting, and cooperative cancellation at module boundaries.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use scorm_autopilot::models::module::Module;
use scorm_autopilot::orchestrator::advancer::SlideAdvancer;
use scorm_autopilot::orchestrator::entry_gate::ModuleEntryGate;
use scorm_autopilot::orchestrator::runner::SessionOrchestrator;
use scorm_autopilot::AppError;

use super::test_helpers::{FakeDriver, LabelScript};

fn modules() -> Vec<Module> {
    ["A", "B", "C"]
        .iter()
        .map(|name| Module {
            title: format!("Lesson {name}"),
            url: format!("https://moodle.example/mod/scorm/view.php?id={name}"),
        })
        .collect()
}

fn orchestrator(cancel: CancellationToken) -> SessionOrchestrator {
    SessionOrchestrator::new(
        ModuleEntryGate::new(Duration::ZERO, Duration::ZERO),
        SlideAdvancer::new(
            Duration::ZERO,
            Duration::from_millis(10),
            Duration::from_millis(50),
            Duration::ZERO,
            300,
        ),
        Duration::ZERO,
        cancel,
    )
}

/// Driver whose every module completes on the first progress read.
fn completing_driver() -> FakeDriver {
    FakeDriver::new(LabelScript::Sequence(vec!["1/1".to_owned()].into()))
}

#[tokio::test(start_paused = true)]
async fn all_modules_are_processed_in_order() {
    let driver = completing_driver();
    let mods = modules();

    let tally = orchestrator(CancellationToken::new())
        .run(&driver, &mods, 0)
        .await
        .expect("run succeeds");

    assert_eq!(tally.completed, 3);
    assert_eq!(tally.failed, 0);
    assert_eq!(tally.attempted(), 3);
    let navigated: Vec<String> = driver.state().navigations.clone();
    let expected: Vec<String> = mods.iter().map(|module| module.url.clone()).collect();
    assert_eq!(navigated, expected);
}

#[tokio::test(start_paused = true)]
async fn offset_skips_preceding_modules() {
    let driver = completing_driver();
    let mods = modules();

    let tally = orchestrator(CancellationToken::new())
        .run(&driver, &mods, 2)
        .await
        .expect("run succeeds");

    assert_eq!(tally.attempted(), 2);
    let navigated = driver.state().navigations.clone();
    assert_eq!(navigated, vec![mods[1].url.clone(), mods[2].url.clone()]);
}

#[tokio::test(start_paused = true)]
async fn offset_at_the_list_end_processes_one_module() {
    let driver = completing_driver();
    let mods = modules();

    let tally = orchestrator(CancellationToken::new())
        .run(&driver, &mods, 3)
        .await
        .expect("run succeeds");

    assert_eq!(tally.attempted(), 1);
    assert_eq!(driver.state().navigations, vec![mods[2].url.clone()]);
}

#[tokio::test(start_paused = true)]
async fn offset_beyond_the_list_is_a_config_error() {
    let driver = completing_driver();
    let mods = modules();

    let err = orchestrator(CancellationToken::new())
        .run(&driver, &mods, 4)
        .await
        .expect_err("offset past the end must fail");

    assert!(matches!(err, AppError::Config(_)), "got {err:?}");
    assert!(
        driver.state().navigations.is_empty(),
        "no driver interaction before the offset check"
    );
}

#[tokio::test(start_paused = true)]
async fn failed_modules_are_counted_and_the_run_continues() {
    let driver = FakeDriver::no_frames();
    let mods = modules();

    let tally = orchestrator(CancellationToken::new())
        .run(&driver, &mods, 0)
        .await
        .expect("run succeeds");

    assert_eq!(tally.completed, 0);
    assert_eq!(tally.failed, 3);
    assert_eq!(driver.state().navigations.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn cancellation_between_modules_preserves_the_tally() {
    let cancel = CancellationToken::new();
    let driver = completing_driver();
    driver.state().cancel_on_navigation = Some((1, cancel.clone()));
    let mods = modules();

    let tally = orchestrator(cancel)
        .run(&driver, &mods, 0)
        .await
        .expect("run succeeds");

    assert_eq!(tally.completed, 1, "module A finished before the signal took effect");
    assert_eq!(tally.attempted(), 1);
    assert_eq!(driver.state().navigations.len(), 1, "B and C were never attempted");
}
