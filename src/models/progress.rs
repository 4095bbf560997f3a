//! Progress signal parsing and per-tick advance outcomes.

/// A module's reported position within its slide deck.
///
/// Derived every tick from the raw text of the player's progress label.
/// The total is assumed stable within a module but is re-read each tick
/// in case the player re-renders with different numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSignal {
    /// Parsed `current/total` counter reported by the player.
    Position {
        /// 1-based index of the slide currently shown.
        current: u32,
        /// Total slide count reported by the player.
        total: u32,
    },
    /// Label text did not match the `current/total` shape.
    Unparsed,
}

impl ProgressSignal {
    /// Parse a raw progress label such as `" 3 / 10 "`.
    ///
    /// Two integers separated by `/` with surrounding whitespace trimmed.
    /// Anything else yields [`ProgressSignal::Unparsed`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let Some((lhs, rhs)) = raw.split_once('/') else {
            return Self::Unparsed;
        };
        match (lhs.trim().parse::<u32>(), rhs.trim().parse::<u32>()) {
            (Ok(current), Ok(total)) => Self::Position { current, total },
            _ => Self::Unparsed,
        }
    }

    /// Whether the reported position is at or past the final slide.
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Position { current, total } if current >= total)
    }
}

/// Outcome of a single advance tick within one module.
///
/// Exactly one outcome is produced per tick; the loop is strictly
/// sequential, so no two outcomes are ever in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The advance request was issued; latest known position attached.
    Progressed(ProgressSignal),
    /// Two identical raw readings across the grace interval.
    Stalled,
    /// A completion condition was observed.
    Completed,
    /// The tick budget ran out without a stop condition.
    Exhausted,
    /// A driver interaction faulted mid-tick.
    DriverUnavailable,
}
