//! Course page scan for SCORM modules.

use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::config::GlobalConfig;
use crate::driver::{PageDriver, PageLink};
use crate::models::module::Module;
use crate::{AppError, Result};

/// Anchor selector for activity links on a Moodle course page.
const ACTIVITY_LINKS: &str = "a.aalink";
/// URL marker identifying SCORM activity links.
const SCORM_MARKER: &str = "mod/scorm/view.php";
/// Settle delay after navigating to the course page.
const COURSE_NAV_SETTLE: Duration = Duration::from_secs(3);

/// Discover the ordered SCORM module list for the configured course.
///
/// # Errors
///
/// Returns driver errors for navigation faults and
/// `AppError::Discovery` when the course page cannot be scanned.
pub async fn discover_modules(
    driver: &dyn PageDriver,
    config: &GlobalConfig,
) -> Result<Vec<Module>> {
    let course_url = format!(
        "{}/course/view.php?id={}",
        config.moodle_url, config.course_id
    );
    driver.navigate(&course_url).await?;
    sleep(COURSE_NAV_SETTLE).await;

    let links = driver
        .collect_links(ACTIVITY_LINKS)
        .await
        .map_err(|err| AppError::Discovery(err.to_string()))?;
    let modules = filter_modules(links, &config.lesson_keyword);
    info!(
        count = modules.len(),
        keyword = %config.lesson_keyword,
        "modules discovered"
    );
    Ok(modules)
}

/// Keep links that target the SCORM player and match the title keyword.
///
/// The keyword match is a case-insensitive substring test against the
/// trimmed link text; link order is preserved.
#[must_use]
pub fn filter_modules(links: Vec<PageLink>, keyword: &str) -> Vec<Module> {
    let keyword = keyword.to_lowercase();
    links
        .into_iter()
        .filter(|link| link.href.contains(SCORM_MARKER))
        .map(|link| Module {
            title: link.text.trim().to_owned(),
            url: link.href,
        })
        .filter(|module| module.title.to_lowercase().contains(&keyword))
        .collect()
}
