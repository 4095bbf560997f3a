//! Optional interstitial handling between module link and player.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::config::GlobalConfig;
use crate::driver::PageDriver;
use crate::Result;

/// Submit-button label variants used by known platform skins.
const ENTER_VARIANTS: &[&str] = &["Entra", "Enter"];

/// Passes through the optional "enter module" confirmation screen.
///
/// Some module types present an interstitial submit button before the
/// player becomes reachable; others drop the visitor straight into the
/// player. Missing interstitials are the common case, not an error.
pub struct ModuleEntryGate {
    variant_wait: Duration,
    settle: Duration,
}

impl ModuleEntryGate {
    /// Construct a gate with explicit wait and settle durations.
    #[must_use]
    pub fn new(variant_wait: Duration, settle: Duration) -> Self {
        Self {
            variant_wait,
            settle,
        }
    }

    /// Construct a gate from the global configuration.
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new(
            Duration::from_secs(config.timeouts.control_wait_seconds),
            Duration::from_secs(config.timeouts.entry_settle_seconds),
        )
    }

    /// Enter the module, passing the interstitial when one is present.
    ///
    /// The first label variant gets the full bounded wait; the rest are
    /// immediate fallback lookups. When a variant is found it is clicked
    /// and the settle delay lets the player initialize. When none is
    /// found the player is assumed directly present.
    ///
    /// # Errors
    ///
    /// Returns a driver error only for hard faults; absence of the
    /// interstitial is benign.
    pub async fn enter(&self, driver: &dyn PageDriver) -> Result<()> {
        let mut wait = self.variant_wait;
        for variant in ENTER_VARIANTS {
            let selector = format!("input[type='submit'][value='{variant}']");
            if driver.locate(&selector, wait).await? {
                driver.click(&selector).await?;
                sleep(self.settle).await;
                debug!(variant, "entered module through interstitial");
                return Ok(());
            }
            wait = Duration::ZERO;
        }
        debug!("no interstitial, assuming player is directly reachable");
        Ok(())
    }
}
