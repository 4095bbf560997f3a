//! Integration tests for the entry interstitial gate.

use std::collections::VecDeque;
use std::time::Duration;

use scorm_autopilot::orchestrator::entry_gate::ModuleEntryGate;

use super::test_helpers::{FakeDriver, LabelScript};

const PRIMARY_VARIANT: &str = "input[type='submit'][value='Entra']";
const FALLBACK_VARIANT: &str = "input[type='submit'][value='Enter']";

fn gate() -> ModuleEntryGate {
    ModuleEntryGate::new(Duration::ZERO, Duration::ZERO)
}

fn bare_driver() -> FakeDriver {
    let driver = FakeDriver::new(LabelScript::Sequence(VecDeque::new()));
    driver.state().present.clear();
    driver
}

#[tokio::test(start_paused = true)]
async fn primary_variant_is_clicked_when_present() {
    let driver = bare_driver();
    driver.state().present.insert(PRIMARY_VARIANT.to_owned());

    gate().enter(&driver).await.expect("gate passes");

    assert_eq!(driver.state().clicked, vec![PRIMARY_VARIANT.to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn fallback_variant_is_tried_after_the_primary() {
    let driver = bare_driver();
    driver.state().present.insert(FALLBACK_VARIANT.to_owned());

    gate().enter(&driver).await.expect("gate passes");

    assert_eq!(driver.state().clicked, vec![FALLBACK_VARIANT.to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn missing_interstitial_is_benign() {
    let driver = bare_driver();

    gate().enter(&driver).await.expect("gate passes");

    assert!(driver.state().clicked.is_empty());
}
