//! Check registry
//!
//! An ordered list of [`PreArmCheck`] capabilities evaluated together.
//! Every check runs even after an earlier one has failed, so one pass
//! shows the operator every concurrent problem. Failures are gathered in a
//! [`CheckContext`] and flushed to the status sink afterwards, which keeps
//! formatting separate from the severity and display policy.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use super::check::CheckCategory;
use super::status::{format_truncated, FailureText, Severity, StatusSink, StatusText};

/// Maximum failures gathered per evaluation
pub const MAX_FAILURES: usize = 32;

/// Which evaluation is running; selects the status line prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPhase {
    /// Periodic readiness polling
    PreArm,
    /// Checks run as part of an arm request
    Arm,
}

impl CheckPhase {
    pub const fn prefix(self) -> &'static str {
        match self {
            CheckPhase::PreArm => "PreArm: ",
            CheckPhase::Arm => "Arm: ",
        }
    }
}

/// One failed check with its formatted reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    /// Category the failure belongs to; `None` for checks that cannot be disabled
    pub check: Option<CheckCategory>,
    pub severity: Severity,
    pub message: FailureText,
}

/// Evaluation context handed to every check.
///
/// Carries the enable mask and time of this pass and collects failures.
pub struct CheckContext {
    enabled: CheckCategory,
    phase: CheckPhase,
    now_ms: u64,
    failures: heapless::Vec<CheckFailure, MAX_FAILURES>,
    overflow: u16,
}

impl CheckContext {
    pub fn new(enabled: CheckCategory, phase: CheckPhase, now_ms: u64) -> Self {
        Self {
            enabled,
            phase,
            now_ms,
            failures: heapless::Vec::new(),
            overflow: 0,
        }
    }

    /// True if `check` is enabled by the mask (always true under ALL)
    pub fn enabled(&self, check: CheckCategory) -> bool {
        self.enabled.enables(check)
    }

    pub fn enabled_mask(&self) -> CheckCategory {
        self.enabled
    }

    pub fn phase(&self) -> CheckPhase {
        self.phase
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Record a failure of a configurable check and return `false`.
    ///
    /// Severity is `Critical`, or `Debug` when `check` is disabled so that
    /// an informational failure does not read as a blocking one.
    pub fn fail(&mut self, check: CheckCategory, args: fmt::Arguments<'_>) -> bool {
        let severity = if self.enabled(check) {
            Severity::Critical
        } else {
            Severity::Debug
        };
        self.push(Some(check), severity, args);
        false
    }

    /// Record a failure of a check that cannot be disabled and return `false`
    pub fn fail_always(&mut self, args: fmt::Arguments<'_>) -> bool {
        self.push(None, Severity::Critical, args);
        false
    }

    fn push(&mut self, check: Option<CheckCategory>, severity: Severity, args: fmt::Arguments<'_>) {
        let failure = CheckFailure {
            check,
            severity,
            message: format_truncated(args),
        };
        if self.failures.push(failure).is_err() {
            self.overflow = self.overflow.saturating_add(1);
        }
    }

    pub fn failures(&self) -> &[CheckFailure] {
        &self.failures
    }

    /// Failures that did not fit in the context
    pub fn overflow(&self) -> u16 {
        self.overflow
    }

    /// Send every gathered failure to `sink`, prefixed by phase
    pub fn flush(&self, sink: &dyn StatusSink) {
        for failure in &self.failures {
            let line: StatusText =
                format_truncated(format_args!("{}{}", self.phase.prefix(), failure.message));
            sink.send(failure.severity, &line);
        }
        if self.overflow > 0 {
            crate::log_warn!("{} check failures not reported", self.overflow);
        }
    }
}

/// Record a check failure with a format string, evaluating to `false`.
///
/// ```ignore
/// return check_failed!(ctx, CheckCategory::INS, "Gyros not healthy");
/// return check_failed!(ctx, "Disarm Switch on");
/// ```
#[macro_export]
macro_rules! check_failed {
    ($ctx:expr, $check:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $ctx.fail($check, format_args!($fmt $(, $arg)*))
    };
    ($ctx:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $ctx.fail_always(format_args!($fmt $(, $arg)*))
    };
}

/// A readiness check capability.
///
/// Implement this to plug a subsystem into the registry.
///
/// # Example
///
/// ```
/// use armgate_core::arming::{CheckCategory, CheckContext, PreArmCheck};
///
/// struct PayloadLatch {
///     latched: bool,
/// }
///
/// impl PreArmCheck for PayloadLatch {
///     fn name(&self) -> &'static str {
///         "payload latch"
///     }
///
///     fn category(&self) -> Option<CheckCategory> {
///         Some(CheckCategory::SYSTEM)
///     }
///
///     fn check(&mut self, ctx: &mut CheckContext) -> bool {
///         if !ctx.enabled(CheckCategory::SYSTEM) || self.latched {
///             return true;
///         }
///         ctx.fail(CheckCategory::SYSTEM, format_args!("Payload not latched"))
///     }
/// }
/// ```
pub trait PreArmCheck {
    /// Check name for logging
    fn name(&self) -> &'static str;

    /// Category gating the check, `None` if it cannot be disabled
    fn category(&self) -> Option<CheckCategory>;

    /// Mandatory checks also run on forced arms
    fn mandatory(&self) -> bool {
        false
    }

    /// Evaluate. Must not block; a failure is recorded in `ctx`.
    fn check(&mut self, ctx: &mut CheckContext) -> bool;
}

/// Ordered collection of checks
#[derive(Default)]
pub struct CheckRegistry<'a> {
    checks: Vec<Box<dyn PreArmCheck + 'a>>,
}

impl<'a> CheckRegistry<'a> {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Append a check; evaluation follows registration order
    pub fn register(&mut self, check: Box<dyn PreArmCheck + 'a>) {
        crate::log_debug!("Registered check: {}", check.name());
        self.checks.push(check);
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Names in evaluation order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|c| c.name())
    }

    /// Run every check and AND the results without short-circuiting.
    ///
    /// A check whose category is disabled still runs, so its failure is
    /// recorded at reduced severity, but its outcome does not gate.
    pub fn evaluate_all(&mut self, ctx: &mut CheckContext) -> bool {
        let mut passed = true;
        for check in self.checks.iter_mut() {
            let ok = check.check(ctx);
            let gating = check.category().map_or(true, |c| ctx.enabled(c));
            if gating {
                passed &= ok;
            }
        }
        passed
    }

    /// Run only the mandatory subset, again without short-circuiting
    pub fn evaluate_mandatory(&mut self, ctx: &mut CheckContext) -> bool {
        let mut passed = true;
        for check in self.checks.iter_mut().filter(|c| c.mandatory()) {
            passed &= check.check(ctx);
        }
        passed
    }
}
