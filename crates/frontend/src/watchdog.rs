//! Input watchdog
//!
//! Warns when no correlated event arrived for a whole period, which
//! usually means a topic is missing or the stamps never line up.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct InputWatchdog {
    period: Duration,
    /// Last input, or the last warning if that came later
    reference: Instant,
    received_any: bool,
    warnings: u64,
}

impl InputWatchdog {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            reference: now,
            received_any: false,
            warnings: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Record a correlated event
    pub fn feed(&mut self, now: Instant) {
        self.reference = now;
        self.received_any = true;
    }

    /// `true` when a warning is due; warns at most once per period
    pub fn check(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.reference) < self.period {
            return false;
        }
        self.reference = now;
        self.warnings += 1;
        true
    }

    pub fn received_any(&self) -> bool {
        self.received_any
    }

    pub fn warnings(&self) -> u64 {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warns_once_per_period() {
        let start = Instant::now();
        let mut watchdog = InputWatchdog::new(Duration::from_secs(5), start);

        assert!(!watchdog.check(start + Duration::from_secs(4)));
        assert!(watchdog.check(start + Duration::from_secs(5)));
        assert!(!watchdog.check(start + Duration::from_secs(6)));
        assert!(watchdog.check(start + Duration::from_secs(10)));
        assert_eq!(watchdog.warnings(), 2);
        assert!(!watchdog.received_any());
    }

    #[test]
    fn test_feed_postpones_warning() {
        let start = Instant::now();
        let mut watchdog = InputWatchdog::new(Duration::from_secs(1), start);
        watchdog.feed(start + Duration::from_millis(900));
        assert!(!watchdog.check(start + Duration::from_millis(1500)));
        assert!(watchdog.check(start + Duration::from_millis(1900)));
        assert!(watchdog.received_any());
    }
}
