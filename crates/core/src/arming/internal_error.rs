//! Internal error counter
//!
//! Programming invariant violations are not thrown: they are latched here
//! and surface as an always-on system-health check failure.

use bitflags::bitflags;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

bitflags! {
    /// Kinds of internal error
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InternalErrorKind: u32 {
        const FLOW_OF_CONTROL = 1 << 0;
        const CONSTRAINT_NAN = 1 << 1;
        const INVALID_ARG_OR_RESULT = 1 << 2;
        /// Terrain-relative altitude requested without a terrain source
        const TERRAIN_CONTRACT = 1 << 3;
        const BAD_ROTATION = 1 << 4;
        const MEM_GUARD = 1 << 5;
        const STACK_OVERFLOW = 1 << 6;
        const LOGGER_FAILURE = 1 << 7;
        const TIMING_OVERRUN = 1 << 8;
        const IMU_RESET = 1 << 9;
    }
}

const NAMES: &[(InternalErrorKind, &str)] = &[
    (InternalErrorKind::FLOW_OF_CONTROL, "flow_of_ctrl"),
    (InternalErrorKind::CONSTRAINT_NAN, "constrain_nan"),
    (InternalErrorKind::INVALID_ARG_OR_RESULT, "invalid_arg"),
    (InternalErrorKind::TERRAIN_CONTRACT, "terrain_contract"),
    (InternalErrorKind::BAD_ROTATION, "bad_rotation"),
    (InternalErrorKind::MEM_GUARD, "mem_guard"),
    (InternalErrorKind::STACK_OVERFLOW, "stack_ovrflw"),
    (InternalErrorKind::LOGGER_FAILURE, "logger_fail"),
    (InternalErrorKind::TIMING_OVERRUN, "timing_overrun"),
    (InternalErrorKind::IMU_RESET, "imu_reset"),
];

impl fmt::Display for InternalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, name) in NAMES {
            if self.contains(*kind) {
                if !first {
                    f.write_str(",")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Lock-free internal error latch, safe to share as a `static`
#[derive(Debug)]
pub struct InternalErrors {
    errors: AtomicU32,
    count: AtomicU32,
    last_line: AtomicU32,
}

impl InternalErrors {
    pub const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            count: AtomicU32::new(0),
            last_line: AtomicU32::new(0),
        }
    }

    /// Latch an error raised at source `line`
    pub fn record(&self, kind: InternalErrorKind, line: u32) {
        let before = self.errors.fetch_or(kind.bits(), Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.last_line.store(line, Ordering::Relaxed);
        if before & kind.bits() != kind.bits() {
            crate::log_error!("Internal error 0x{:x} at line {}", kind.bits(), line);
        }
    }

    /// Every kind latched so far
    pub fn errors(&self) -> InternalErrorKind {
        InternalErrorKind::from_bits_retain(self.errors.load(Ordering::Relaxed))
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Source line of the most recent error
    pub fn last_line(&self) -> u32 {
        self.last_line.load(Ordering::Relaxed)
    }

    pub fn any(&self) -> bool {
        !self.errors().is_empty()
    }
}

impl Default for InternalErrors {
    fn default() -> Self {
        Self::new()
    }
}
