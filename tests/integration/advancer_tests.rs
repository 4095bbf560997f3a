//! Integration tests for the slide advancement state machine.
//!
//! Validates completion via progress, stall detection, disabled-control
//! completion, mid-tick fault policy, tick exhaustion, missing-player
//! handling, and the parent-focus restore discipline.

use std::collections::VecDeque;
use std::time::Duration;

use scorm_autopilot::models::tally::ModuleResult;
use scorm_autopilot::orchestrator::advancer::SlideAdvancer;

use super::test_helpers::{FakeDriver, LabelScript};

/// Advancer with near-zero waits so scripted runs finish immediately.
fn test_advancer(max_ticks: u32) -> SlideAdvancer {
    SlideAdvancer::new(
        Duration::ZERO,
        Duration::from_millis(10),
        Duration::from_millis(50),
        Duration::ZERO,
        max_ticks,
    )
}

fn sequence(labels: &[&str]) -> LabelScript {
    LabelScript::Sequence(labels.iter().map(|label| (*label).to_owned()).collect::<VecDeque<_>>())
}

#[tokio::test(start_paused = true)]
async fn final_progress_on_first_read_completes() {
    let driver = FakeDriver::new(sequence(&["10/10"]));

    let result = test_advancer(300).advance(&driver).await;

    assert_eq!(result, ModuleResult::Completed);
    let state = driver.state();
    assert_eq!(state.clicks, 0, "no advance click once the end is reached");
    assert_eq!(state.focus_depth, 0);
    assert_eq!(state.parent_restores, 1);
}

#[tokio::test(start_paused = true)]
async fn repeated_reading_after_grace_is_a_stall() {
    // "3/10" twice, and the grace re-check serves "3/10" again.
    let driver = FakeDriver::new(sequence(&["3/10", "3/10"]));

    let result = test_advancer(300).advance(&driver).await;

    assert_eq!(result, ModuleResult::Completed);
    let state = driver.state();
    assert!(state.clicks <= 2, "stall must be declared within two ticks");
    assert_eq!(state.focus_depth, 0);
}

#[tokio::test(start_paused = true)]
async fn unparsable_reading_keeps_the_loop_going() {
    let driver = FakeDriver::new(sequence(&["loading...", "2/10", "10/10"]));

    let result = test_advancer(300).advance(&driver).await;

    assert_eq!(result, ModuleResult::Completed);
    // One click for the unparsable tick, one for 2/10, none for 10/10.
    assert_eq!(driver.state().clicks, 2);
}

#[tokio::test(start_paused = true)]
async fn disabled_control_completes() {
    let driver = FakeDriver::new(LabelScript::Counting { next: 1, total: 100 });
    driver.state().disable_after_clicks = Some(3);

    let result = test_advancer(300).advance(&driver).await;

    assert_eq!(result, ModuleResult::Completed);
    assert_eq!(driver.state().clicks, 3);
}

#[tokio::test(start_paused = true)]
async fn mid_tick_fault_is_treated_as_completion() {
    let driver = FakeDriver::new(LabelScript::Counting { next: 1, total: 100 });
    driver.state().fail_click_at = Some(2);

    let result = test_advancer(300).advance(&driver).await;

    assert_eq!(result, ModuleResult::Completed);
    let state = driver.state();
    assert_eq!(state.clicks, 2);
    assert_eq!(state.focus_depth, 0, "parent focus restored after a fault");
}

#[tokio::test(start_paused = true)]
async fn label_fault_before_any_click_is_treated_as_completion() {
    let driver = FakeDriver::new(LabelScript::Fault);

    let result = test_advancer(300).advance(&driver).await;

    assert_eq!(result, ModuleResult::Completed);
    assert_eq!(driver.state().clicks, 0);
}

#[tokio::test(start_paused = true)]
async fn tick_budget_exhaustion_fails_the_module() {
    let driver = FakeDriver::new(LabelScript::Counting {
        next: 1,
        total: 1_000_000,
    });

    let result = test_advancer(5).advance(&driver).await;

    match result {
        ModuleResult::Failed(reason) => assert_eq!(reason, "advance limit exceeded"),
        other => panic!("expected Failed, got {other:?}"),
    }
    let state = driver.state();
    assert_eq!(state.clicks, 5, "exactly max_ticks advances were issued");
    assert_eq!(state.focus_depth, 0);
}

#[tokio::test(start_paused = true)]
async fn page_without_subdocument_fails() {
    let driver = FakeDriver::no_frames();

    let result = test_advancer(300).advance(&driver).await;

    match result {
        ModuleResult::Failed(reason) => assert_eq!(reason, "no embedded surface"),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(driver.state().parent_restores, 0, "focus never moved");
}

#[tokio::test(start_paused = true)]
async fn missing_controls_count_as_no_player() {
    let driver = FakeDriver::without_player();

    let result = test_advancer(300).advance(&driver).await;

    assert_eq!(result, ModuleResult::NoPlayerFound);
    let state = driver.state();
    assert_eq!(state.focus_depth, 0);
    assert_eq!(state.parent_restores, 1);
}
