//! Page-automation driver abstraction.
//!
//! The [`PageDriver`] trait decouples the advancement state machine
//! (entry gate, slide advancer, orchestrator) from the browser wire
//! protocol. Every page interaction routes through this trait, and the
//! browser session it fronts is the only shared mutable resource in the
//! whole run.

pub mod webdriver;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::Result;

/// Raw anchor data scraped from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// Visible link text.
    pub text: String,
    /// Absolute href target.
    pub href: String,
}

/// Protocol-agnostic interface between the state machine and the browser.
///
/// Implementations resolve selectors fresh on every call rather than
/// handing out element handles; remote players replace their DOM nodes
/// between ticks, so a stored handle would go stale immediately.
pub trait PageDriver: Send + Sync {
    /// Navigate the session to `url`.
    fn navigate(&self, url: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Wait up to `timeout` for an element matching `selector`.
    ///
    /// Returns `Ok(false)` when nothing matched within the bound; the
    /// caller decides whether absence is benign. At least one lookup is
    /// attempted even with a zero timeout.
    fn locate(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + '_>>;

    /// Read the visible text of the first element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`](crate::AppError::NotFound) if no
    /// element matches.
    fn read_text(&self, selector: &str) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;

    /// Read attribute `name` of the first element matching `selector`.
    ///
    /// `Ok(None)` means the element exists but carries no such attribute.
    fn read_attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>>;

    /// Click the first element matching `selector`.
    fn click(&self, selector: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Type `text` into the first element matching `selector`.
    fn type_text(
        &self,
        selector: &str,
        text: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Collect text and href of every element matching `selector`.
    fn collect_links(
        &self,
        selector: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PageLink>>> + Send + '_>>;

    /// Number of embedded sub-documents in the current document.
    fn subdocument_count(&self) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + '_>>;

    /// Move focus into the sub-document at `index`.
    fn enter_subdocument(
        &self,
        index: usize,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Restore focus to the parent document.
    fn return_to_parent(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Tear down the browser session.
    fn teardown(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
