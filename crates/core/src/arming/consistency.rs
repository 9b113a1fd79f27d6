//! Consistency timer (hysteresis for multi-sensor agreement)
//!
//! A condition counts as stable only after it has held continuously for
//! the whole window. A single inconsistent sample clears the anchor; there
//! is no partial credit.

/// Default window used by sensor agreement checks
pub const CONSISTENCY_WINDOW_MS: u64 = 10_000;

/// Hysteresis record for one sensor-agreement condition.
///
/// Invariant: `stable` at time T implies the condition was observed true on
/// every update in `[T - window_ms, T]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsistencyTimer {
    window_ms: u64,
    last_pass_ms: Option<u64>,
}

impl ConsistencyTimer {
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_pass_ms: None,
        }
    }

    /// Feed one observation and return whether the condition is stable.
    ///
    /// `redundant` is false when only one sensor exists; the condition is
    /// then stable as soon as it holds, since nothing can disagree over time.
    pub fn update(&mut self, now_ms: u64, consistent: bool, redundant: bool) -> bool {
        if !consistent {
            self.last_pass_ms = None;
            return false;
        }

        let since = *self.last_pass_ms.get_or_insert(now_ms);

        if redundant && now_ms.saturating_sub(since) < self.window_ms {
            return false;
        }
        true
    }

    /// Start of the current continuous pass, if any
    pub fn last_pass_ms(&self) -> Option<u64> {
        self.last_pass_ms
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn reset(&mut self) {
        self.last_pass_ms = None;
    }
}

impl Default for ConsistencyTimer {
    fn default() -> Self {
        Self::new(CONSISTENCY_WINDOW_MS)
    }
}
