//! Moodle login flow.

use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::config::GlobalConfig;
use crate::driver::PageDriver;
use crate::{AppError, Result};

const USERNAME_FIELD: &str = "#username";
const PASSWORD_FIELD: &str = "#password";
const LOGIN_BUTTON: &str = "#loginbtn";

/// Bounded wait for the login form to render.
const FORM_WAIT: Duration = Duration::from_secs(10);
/// Settle delay after submitting the login form.
const LOGIN_SETTLE: Duration = Duration::from_secs(3);

/// Authenticate against the platform's login form.
///
/// # Errors
///
/// Returns `AppError::Auth` when the login form never appears, and
/// driver errors verbatim for transport faults.
pub async fn login(driver: &dyn PageDriver, config: &GlobalConfig) -> Result<()> {
    let login_url = format!("{}/login/index.php", config.moodle_url);
    driver.navigate(&login_url).await?;

    if !driver.locate(USERNAME_FIELD, FORM_WAIT).await? {
        return Err(AppError::Auth("login form did not appear".into()));
    }
    driver.type_text(USERNAME_FIELD, &config.username).await?;
    driver.type_text(PASSWORD_FIELD, &config.password).await?;
    driver.click(LOGIN_BUTTON).await?;
    sleep(LOGIN_SETTLE).await;

    info!(username = %config.username, "logged in");
    Ok(())
}
