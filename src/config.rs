//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keychain service name used for stored credentials.
const KEYRING_SERVICE: &str = "scorm-autopilot";

/// Bounded-wait and settle durations (seconds) for driver interactions.
///
/// Remote players vary wildly in rendering latency, so every wait the
/// state machine performs is tunable here.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimeoutConfig {
    /// Wait for the embedded player sub-document to appear.
    #[serde(default = "default_player_wait")]
    pub player_wait_seconds: u64,
    /// Wait for the advance control inside the player.
    #[serde(default = "default_control_wait")]
    pub control_wait_seconds: u64,
    /// Settle delay after passing an entry interstitial.
    #[serde(default = "default_entry_settle")]
    pub entry_settle_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            player_wait_seconds: default_player_wait(),
            control_wait_seconds: default_control_wait(),
            entry_settle_seconds: default_entry_settle(),
        }
    }
}

fn default_player_wait() -> u64 {
    15
}

fn default_control_wait() -> u64 {
    10
}

fn default_entry_settle() -> u64 {
    4
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}

fn default_lesson_keyword() -> String {
    "lesson".into()
}

fn default_slide_delay() -> f64 {
    0.25
}

fn default_lesson_delay() -> u64 {
    2
}

fn default_max_ticks() -> u32 {
    300
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Base URL of the Moodle instance, without a trailing slash.
    pub moodle_url: String,
    /// Course identifier on the platform.
    pub course_id: String,
    /// Login account name.
    pub username: String,
    /// Login password.
    ///
    /// May be omitted from the TOML file; [`load_credentials`](Self::load_credentials)
    /// resolves it from the OS keychain or the `MOODLE_PASSWORD` env var.
    #[serde(default)]
    pub password: String,
    /// `WebDriver` endpoint the browser session is created against.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// 1-based module number to start from; 0 starts at the beginning.
    #[serde(default)]
    pub start_from_lesson: u32,
    /// Case-insensitive keyword a module title must contain.
    #[serde(default = "default_lesson_keyword")]
    pub lesson_keyword: String,
    /// Delay between advance clicks, in seconds.
    #[serde(default = "default_slide_delay")]
    pub slide_delay: f64,
    /// Delay after each module, in seconds.
    #[serde(default = "default_lesson_delay")]
    pub lesson_delay: u64,
    /// Upper bound on advance ticks within one module.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u32,
    /// Bounded-wait and settle durations.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and normalize it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the login password from OS keychain with env-var fallback.
    ///
    /// A password already present in the config file takes precedence.
    /// Otherwise the `scorm-autopilot` keyring service is tried first,
    /// then the `MOODLE_PASSWORD` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no source provides a password.
    pub async fn load_credentials(&mut self) -> Result<()> {
        if !self.password.is_empty() {
            return Ok(());
        }
        self.password = load_credential("moodle_password", "MOODLE_PASSWORD").await?;
        Ok(())
    }

    /// Delay between advance clicks.
    #[must_use]
    pub fn slide_delay(&self) -> Duration {
        Duration::from_secs_f64(self.slide_delay)
    }

    /// Delay applied after each module regardless of outcome.
    #[must_use]
    pub fn lesson_delay(&self) -> Duration {
        Duration::from_secs(self.lesson_delay)
    }

    fn validate(&mut self) -> Result<()> {
        while self.moodle_url.ends_with('/') {
            self.moodle_url.pop();
        }
        if self.moodle_url.is_empty() {
            return Err(AppError::Config("moodle_url must not be empty".into()));
        }
        if self.course_id.trim().is_empty() {
            return Err(AppError::Config("course_id must not be empty".into()));
        }
        if self.username.trim().is_empty() {
            return Err(AppError::Config("username must not be empty".into()));
        }
        if !self.slide_delay.is_finite() || self.slide_delay < 0.0 {
            return Err(AppError::Config(
                "slide_delay must be a non-negative number of seconds".into(),
            ));
        }
        if self.max_ticks == 0 {
            return Err(AppError::Config("max_ticks must be greater than zero".into()));
        }
        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // Try OS keychain first via spawn_blocking (keyring is synchronous I/O).
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    // Fallback to environment variable.
    env::var(env_key).map_err(|_| {
        AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))
    })
}
