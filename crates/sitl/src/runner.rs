//! Pre-arm loop driver and a tracing-backed status sink.

use std::time::Duration;

use armgate_core::arming::status::QUEUE_CAPACITY;
use armgate_core::arming::{ArmingSystem, Severity, StatusMessage, StatusQueue, StatusSink};
use armgate_core::traits::TimeSource;
use tokio::time::MissedTickBehavior;

use crate::error::SitlError;

/// Default pre-arm evaluation period (1 Hz)
pub const PREARM_PERIOD: Duration = Duration::from_secs(1);

/// Periodic pre-arm evaluation, the way the vehicle's 1 Hz task runs it.
#[derive(Debug, Clone, Copy)]
pub struct PrearmLoop {
    period: Duration,
}

impl PrearmLoop {
    pub fn new() -> Self {
        Self::with_period(PREARM_PERIOD)
    }

    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run [`ArmingSystem::update`] once per period until it passes.
    ///
    /// The first evaluation happens immediately. Returns the 1-based cycle
    /// on which the checks passed, or a timeout after `max_cycles`.
    pub async fn run_until_ready<T: TimeSource>(
        &self,
        gate: &mut ArmingSystem<'_, T>,
        max_cycles: u32,
    ) -> Result<u32, SitlError> {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for cycle in 1..=max_cycles {
            interval.tick().await;
            if gate.update() {
                tracing::info!(cycle, "pre-arm checks passed");
                return Ok(cycle);
            }
            tracing::debug!(cycle, "pre-arm checks failing");
        }
        Err(SitlError::Timeout("pre-arm checks"))
    }
}

impl Default for PrearmLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// [`StatusSink`] that mirrors every line into `tracing` and keeps it for
/// later inspection.
#[derive(Default)]
pub struct TracingSink {
    queue: StatusQueue,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every retained line, oldest first.
    pub fn drain(&self) -> heapless::Vec<StatusMessage, QUEUE_CAPACITY> {
        self.queue.drain()
    }
}

impl StatusSink for TracingSink {
    fn send(&self, severity: Severity, text: &str) {
        match severity {
            Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Error => {
                tracing::error!(%severity, "{}", text)
            }
            Severity::Warning => tracing::warn!(%severity, "{}", text),
            Severity::Notice | Severity::Info => tracing::info!(%severity, "{}", text),
            Severity::Debug => tracing::debug!(%severity, "{}", text),
        }
        self.queue.send(severity, text);
    }
}
