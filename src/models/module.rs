//! Course module descriptors produced by discovery.

/// One SCORM-style e-learning unit with an embedded slide player.
///
/// Produced by the discovery scan of the course page and consumed
/// read-only by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Link text shown on the course page.
    pub title: String,
    /// Absolute URL of the module view page.
    pub url: String,
}
