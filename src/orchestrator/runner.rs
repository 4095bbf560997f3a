//! Run loop sequencing entry gate and slide advancement across modules.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::config::GlobalConfig;
use crate::driver::PageDriver;
use crate::models::module::Module;
use crate::models::tally::{ModuleResult, RunTally};
use crate::orchestrator::advancer::SlideAdvancer;
use crate::orchestrator::entry_gate::ModuleEntryGate;
use crate::{AppError, Result};

/// Settle delay after navigating to a module page.
const MODULE_NAV_SETTLE: Duration = Duration::from_secs(2);

/// Sequences module processing with partial-failure accounting.
///
/// Modules complete strictly in list order; a failure is local to its
/// module and never aborts the run. Cancellation is cooperative and
/// checked at module boundaries only, so no module is abandoned
/// mid-advancement.
pub struct SessionOrchestrator {
    gate: ModuleEntryGate,
    advancer: SlideAdvancer,
    lesson_delay: Duration,
    cancel: CancellationToken,
}

impl SessionOrchestrator {
    /// Construct an orchestrator from its collaborators.
    #[must_use]
    pub fn new(
        gate: ModuleEntryGate,
        advancer: SlideAdvancer,
        lesson_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            gate,
            advancer,
            lesson_delay,
            cancel,
        }
    }

    /// Construct an orchestrator from the global configuration.
    #[must_use]
    pub fn from_config(config: &GlobalConfig, cancel: CancellationToken) -> Self {
        Self::new(
            ModuleEntryGate::from_config(config),
            SlideAdvancer::from_config(config),
            config.lesson_delay(),
            cancel,
        )
    }

    /// Process `modules` in order, starting from 1-based `start_from`.
    ///
    /// `start_from == 0` starts at the beginning. The tally accumulated
    /// up to a cancellation is preserved and returned. The orchestrator
    /// never retries a failed module; re-invoking with an adjusted
    /// `start_from` is the caller's recourse.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when `start_from` exceeds the module
    /// count, before any driver interaction.
    pub async fn run(
        &self,
        driver: &dyn PageDriver,
        modules: &[Module],
        start_from: u32,
    ) -> Result<RunTally> {
        let start = usize::try_from(start_from)
            .map_err(|_| AppError::Config("start_from_lesson out of range".into()))?;
        if start > modules.len() {
            return Err(AppError::Config(format!(
                "start_from_lesson is {start} but only {} modules were discovered",
                modules.len()
            )));
        }

        let skipped = start.saturating_sub(1);
        if skipped > 0 {
            info!(skipped, "skipping modules before the starting offset");
        }
        let queue = &modules[skipped..];
        let total = modules.len();

        let mut tally = RunTally::default();
        for (position, module) in queue.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(
                    completed = tally.completed,
                    failed = tally.failed,
                    "run cancelled, stopping at module boundary"
                );
                break;
            }

            let number = skipped + position + 1;
            let result = self
                .process_module(driver, module)
                .instrument(info_span!("module", number, total, title = %module.title))
                .await;
            if let ModuleResult::Failed(reason) = &result {
                warn!(number, %reason, "module failed");
            }
            tally.record(&result);

            // Let the platform register completion before navigating away.
            sleep(self.lesson_delay).await;
        }

        Ok(tally)
    }

    /// Navigate to one module, pass its gate, and advance its player.
    async fn process_module(&self, driver: &dyn PageDriver, module: &Module) -> ModuleResult {
        if let Err(err) = driver.navigate(&module.url).await {
            return ModuleResult::Failed(format!("navigation failed: {err}"));
        }
        sleep(MODULE_NAV_SETTLE).await;

        if let Err(err) = self.gate.enter(driver).await {
            return ModuleResult::Failed(format!("entry gate failed: {err}"));
        }

        self.advancer.advance(driver).await
    }
}
