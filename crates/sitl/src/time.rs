//! Tokio-backed time source.
//!
//! Reads `tokio::time::Instant`, so under a paused test runtime the gate
//! sees exactly the virtual time the test advances.

use armgate_core::traits::TimeSource;
use tokio::time::Instant;

/// [`TimeSource`] counting from the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct TokioTime {
    start: Instant,
}

impl TokioTime {
    /// Start the clock at zero now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for TokioTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for TokioTime {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}
