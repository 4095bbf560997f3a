//! Run accounting for completed and failed modules.

/// Terminal outcome of driving one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleResult {
    /// The player reached its final slide or a terminal state.
    Completed,
    /// No recognizable player controls were found.
    ///
    /// A just-finished module often has no controls left to find, so this
    /// counts as completion rather than failure.
    NoPlayerFound,
    /// The module could not be completed.
    Failed(String),
}

/// Aggregate counts for one orchestration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    /// Modules that finished or were already finished.
    pub completed: u32,
    /// Modules that could not be completed.
    pub failed: u32,
}

impl RunTally {
    /// Fold one module outcome into the tally.
    pub fn record(&mut self, result: &ModuleResult) {
        match result {
            ModuleResult::Completed | ModuleResult::NoPlayerFound => self.completed += 1,
            ModuleResult::Failed(_) => self.failed += 1,
        }
    }

    /// Total number of modules attempted so far.
    #[must_use]
    pub fn attempted(&self) -> u32 {
        self.completed + self.failed
    }
}
