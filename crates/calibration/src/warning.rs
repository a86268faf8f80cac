//! One-shot warnings

/// Warning that is reported on its first occurrence only.
///
/// Later occurrences are still counted, so callers can check how often the
/// condition happened without repeating the log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneShotWarning {
    fired: bool,
    occurrences: u64,
}

impl OneShotWarning {
    pub const fn new() -> Self {
        Self {
            fired: false,
            occurrences: 0,
        }
    }

    /// Count one occurrence; `true` only the first time
    pub fn trigger(&mut self) -> bool {
        self.occurrences += 1;
        !std::mem::replace(&mut self.fired, true)
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn occurrences(&self) -> u64 {
        self.occurrences
    }
}
