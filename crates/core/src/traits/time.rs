//! Time abstraction for the arming gate.
//!
//! Everything time-dependent in the gate (consistency windows, report
//! pacing, arm timestamps) reads the clock through [`TimeSource`] so that
//! host tests can drive time explicitly.

use core::cell::Cell;

/// Monotonic time source.
///
/// Implementations:
/// - `TokioTime` (in the sitl crate) backed by `tokio::time::Instant`
/// - [`MockTime`] for host testing with controllable time
///
/// # Example
///
/// ```
/// use armgate_core::traits::{MockTime, TimeSource};
///
/// fn due<T: TimeSource>(time: &T, last_ms: u64, period_ms: u64) -> bool {
///     time.now_ms().saturating_sub(last_ms) >= period_ms
/// }
///
/// let time = MockTime::new();
/// time.advance_ms(1000);
/// assert!(due(&time, 0, 1000));
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u64;

    /// Returns current time in microseconds since system start.
    fn now_us(&self) -> u64;

    /// Returns elapsed time in microseconds since a reference point.
    ///
    /// Saturates to zero when the reference lies in the future.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// Mock time source for testing with controllable time advancement.
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

// Safety: MockTime is only used in single-threaded test contexts where Cell
// is sound; the Send + Sync bounds exist for real platform clocks.
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// Advances the current time by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(ms * 1000);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_us.get() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}
