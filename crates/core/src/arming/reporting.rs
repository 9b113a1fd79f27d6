//! Pre-arm failure display rate limiting
//!
//! A sustained failure is shown once per [`DISPLAY_PERIOD_MS`]. A fresh
//! failure (the previous evaluation passed) is shown at once, and the
//! follow-up evaluation is shown again as soon as [`ACCELERATED_WINDOW_MS`]
//! has passed, so the operator gets quick feedback without spam.

/// Display period for a sustained failure
pub const DISPLAY_PERIOD_MS: u64 = 30_000;

/// Minimum gap before the follow-up display after a fresh failure
pub const ACCELERATED_WINDOW_MS: u64 = 4_000;

/// Reporting state carried between pre-arm evaluations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingPolicy {
    last_display_ms: Option<u64>,
    report_immediately: bool,
    last_result: bool,
}

impl ReportingPolicy {
    pub const fn new() -> Self {
        Self {
            last_display_ms: None,
            report_immediately: false,
            last_result: false,
        }
    }

    /// Record the result of an evaluation at `now_ms` and decide whether
    /// its failures should be displayed.
    ///
    /// The state advances whether or not the caller then suppresses the
    /// display.
    pub fn record(&mut self, now_ms: u64, passed: bool) -> bool {
        let fresh_failure = self.last_result && !passed;
        self.last_result = passed;

        let elapsed = self
            .last_display_ms
            .map(|last| now_ms.saturating_sub(last));

        let display = match elapsed {
            None => true,
            Some(_) if fresh_failure => {
                self.last_display_ms = Some(now_ms);
                self.report_immediately = true;
                return true;
            }
            Some(e) => {
                (self.report_immediately && e > ACCELERATED_WINDOW_MS) || e > DISPLAY_PERIOD_MS
            }
        };

        if display {
            self.report_immediately = false;
            self.last_display_ms = Some(now_ms);
        }
        display
    }

    /// A pass-to-fail edge is waiting for its accelerated follow-up
    pub fn report_immediately(&self) -> bool {
        self.report_immediately
    }

    /// Result of the most recent evaluation
    pub fn last_result(&self) -> bool {
        self.last_result
    }

    pub fn last_display_ms(&self) -> Option<u64> {
        self.last_display_ms
    }
}

impl Default for ReportingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_evaluation_displays() {
        let mut policy = ReportingPolicy::new();
        assert!(policy.record(0, false));
        assert_eq!(policy.last_display_ms(), Some(0));
    }

    #[test]
    fn test_sustained_failure_every_period() {
        let mut policy = ReportingPolicy::new();
        assert!(policy.record(0, false));
        for t in (1..=30).map(|s| s * 1_000) {
            assert!(!policy.record(t, false), "displayed at {}", t);
        }
        assert!(policy.record(31_000, false));
        assert!(!policy.record(32_000, false));
    }

    #[test]
    fn test_fresh_failure_displays_immediately() {
        let mut policy = ReportingPolicy::new();
        policy.record(0, false);
        assert!(!policy.record(1_000, true));
        assert!(policy.record(2_000, false));
        assert!(policy.report_immediately());
    }

    #[test]
    fn test_follow_up_after_accelerated_window() {
        let mut policy = ReportingPolicy::new();
        policy.record(0, true);
        policy.record(1_000, true);
        assert!(policy.record(2_000, false));

        assert!(!policy.record(3_000, false));
        assert!(!policy.record(6_000, false));
        assert!(policy.record(7_000, false));
        assert!(!policy.report_immediately());

        // back to the slow period
        assert!(!policy.record(12_000, false));
        assert!(!policy.record(37_000, false));
        assert!(policy.record(37_001, false));
    }

    #[test]
    fn test_fail_to_fail_is_not_an_edge() {
        let mut policy = ReportingPolicy::new();
        policy.record(0, false);
        assert!(!policy.record(1_000, false));
        assert!(!policy.last_result());
        assert!(!policy.record(2_000, true));
        assert!(policy.last_result());
    }
}
