//! Per-module slide advancement state machine.
//!
//! Drives one module's embedded player from its current position to
//! completion, or decides that it cannot. Each tick's decision depends
//! only on the current and immediately preceding progress reading;
//! there is no lookahead and no concurrency within a module.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::GlobalConfig;
use crate::driver::PageDriver;
use crate::models::progress::{AdvanceOutcome, ProgressSignal};
use crate::models::tally::ModuleResult;
use crate::Result;

/// CSS selector for the player's advance control.
const ADVANCE_CONTROL: &str = ".next.button";
/// CSS selector for the player's progress label.
const PROGRESS_LABEL: &str = ".slides_label";
/// Grace interval before a repeated reading is declared a stall.
const STALL_GRACE: Duration = Duration::from_millis(500);
/// Poll interval while waiting for the player sub-document.
const SUBDOCUMENT_POLL: Duration = Duration::from_millis(500);
/// Short re-render allowance when checking for the progress label.
const LABEL_WAIT: Duration = Duration::from_secs(1);

/// Per-module advancement state machine.
///
/// One instance is reused across modules; all per-module state lives in
/// the tick loop.
pub struct SlideAdvancer {
    slide_delay: Duration,
    grace: Duration,
    player_wait: Duration,
    control_wait: Duration,
    max_ticks: u32,
}

impl SlideAdvancer {
    /// Construct an advancer with explicit timing bounds.
    #[must_use]
    pub fn new(
        slide_delay: Duration,
        grace: Duration,
        player_wait: Duration,
        control_wait: Duration,
        max_ticks: u32,
    ) -> Self {
        Self {
            slide_delay,
            grace,
            player_wait,
            control_wait,
            max_ticks,
        }
    }

    /// Construct an advancer from the global configuration.
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new(
            config.slide_delay(),
            STALL_GRACE,
            Duration::from_secs(config.timeouts.player_wait_seconds),
            Duration::from_secs(config.timeouts.control_wait_seconds),
            config.max_ticks,
        )
    }

    /// Drive the current module's player to completion.
    ///
    /// The driver must already have navigated to the module page.
    /// Parent-document focus is restored on every exit path before this
    /// returns, so no frame focus leaks into the next module.
    pub async fn advance(&self, driver: &dyn PageDriver) -> ModuleResult {
        match self.enter_player(driver).await {
            Ok(true) => {}
            Ok(false) => return ModuleResult::Failed("no embedded surface".into()),
            Err(err) => return ModuleResult::Failed(err.to_string()),
        }

        let result = self.drive_player(driver).await;

        if let Err(err) = driver.return_to_parent().await {
            warn!(%err, "failed to restore parent document focus");
        }

        result
    }

    /// Wait for the player sub-document and move focus into it.
    ///
    /// The player nests itself last when the page carries several frames.
    async fn enter_player(&self, driver: &dyn PageDriver) -> Result<bool> {
        let deadline = Instant::now() + self.player_wait;
        let count = loop {
            let count = driver.subdocument_count().await?;
            if count > 0 {
                break count;
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(SUBDOCUMENT_POLL).await;
        };
        driver.enter_subdocument(count - 1).await?;
        Ok(true)
    }

    /// Run the tick loop against an entered player.
    async fn drive_player(&self, driver: &dyn PageDriver) -> ModuleResult {
        match self.player_present(driver).await {
            Ok(true) => {}
            Ok(false) => {
                info!("player controls not found, module presumably finished earlier");
                return ModuleResult::NoPlayerFound;
            }
            Err(err) => {
                warn!(%err, "player lookup faulted");
                return ModuleResult::NoPlayerFound;
            }
        }

        let mut last_raw: Option<String> = None;
        let mut signal = ProgressSignal::Unparsed;
        let mut tick: u32 = 0;

        loop {
            let outcome = if tick >= self.max_ticks {
                AdvanceOutcome::Exhausted
            } else {
                self.tick(driver, &mut last_raw, &mut signal).await
            };

            match outcome {
                AdvanceOutcome::Progressed(position) => {
                    debug!(tick, ?position, "advanced");
                    tick += 1;
                }
                AdvanceOutcome::Stalled => {
                    info!(tick, "progress stalled, treating module as complete");
                    return ModuleResult::Completed;
                }
                AdvanceOutcome::Completed => {
                    info!(tick, "module complete");
                    return ModuleResult::Completed;
                }
                AdvanceOutcome::DriverUnavailable => {
                    // Flaky players tear down their own DOM on the
                    // completion transition; a fault here reads as done.
                    info!(tick, "player went away mid-tick, treating module as complete");
                    return ModuleResult::Completed;
                }
                AdvanceOutcome::Exhausted => {
                    warn!(ticks = tick, "advance limit exceeded");
                    return ModuleResult::Failed("advance limit exceeded".into());
                }
            }
        }
    }

    /// Whether both the advance control and the progress label exist.
    async fn player_present(&self, driver: &dyn PageDriver) -> Result<bool> {
        if !driver.locate(ADVANCE_CONTROL, self.control_wait).await? {
            return Ok(false);
        }
        driver.locate(PROGRESS_LABEL, LABEL_WAIT).await
    }

    /// Execute one advance tick and classify what happened.
    async fn tick(
        &self,
        driver: &dyn PageDriver,
        last_raw: &mut Option<String>,
        signal: &mut ProgressSignal,
    ) -> AdvanceOutcome {
        let first = match driver.read_text(PROGRESS_LABEL).await {
            Ok(text) => text,
            Err(err) => {
                debug!(%err, "progress label unreadable");
                return AdvanceOutcome::DriverUnavailable;
            }
        };

        // Same raw text as the previous tick: give the player one grace
        // interval, then re-read. A second identical reading means the
        // player is not advancing further, finished or frozen alike.
        let raw = if last_raw.as_deref() == Some(first.as_str()) {
            sleep(self.grace).await;
            match driver.read_text(PROGRESS_LABEL).await {
                Ok(again) if again == first => return AdvanceOutcome::Stalled,
                Ok(again) => again,
                Err(err) => {
                    debug!(%err, "progress label unreadable on stall re-check");
                    return AdvanceOutcome::DriverUnavailable;
                }
            }
        } else {
            first
        };
        *last_raw = Some(raw.clone());

        // Unparsable text keeps the prior signal without penalty.
        if let position @ ProgressSignal::Position { current, total } = ProgressSignal::parse(&raw)
        {
            *signal = position;
            debug!(current, total, "progress");
            if position.is_final() {
                return AdvanceOutcome::Completed;
            }
        }

        match driver.read_attribute(ADVANCE_CONTROL, "class").await {
            Ok(Some(class)) if class.split_whitespace().any(|token| token == "disabled") => {
                return AdvanceOutcome::Completed;
            }
            Ok(_) => {}
            Err(err) => {
                debug!(%err, "advance control unreadable");
                return AdvanceOutcome::DriverUnavailable;
            }
        }

        if let Err(err) = driver.click(ADVANCE_CONTROL).await {
            debug!(%err, "advance click faulted");
            return AdvanceOutcome::DriverUnavailable;
        }
        sleep(self.slide_delay).await;

        AdvanceOutcome::Progressed(*signal)
    }
}
