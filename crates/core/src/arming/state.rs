//! Arming state machine
//!
//! [`ArmingSystem`] is the single owned context for the gate. It is built
//! once at startup from the parameters, a clock, a status sink and the
//! collaborators present on the vehicle, then passed by reference to
//! whatever drives it: the 1 Hz pre-arm loop and the arm/disarm command
//! handlers on that same loop.
//!
//! # Protocol
//!
//! - Pre-arm checks run continuously through [`ArmingSystem::update`],
//!   with display paced by the [`ReportingPolicy`].
//! - An arm request runs the mandatory checks (forced arm) or the full
//!   registry plus the one-shot arm-time checks, then flips state.
//! - A disarm request applies the rudder rules, flips state and decides
//!   log retention from the disarm method.

use alloc::boxed::Box;
use alloc::sync::Arc;

use super::aux_auth::AuxAuthTable;
use super::check::CheckCategory;
use super::checks::{rc_neutral_checks, standard_registry};
use super::collaborators::{ArmEvent, Collaborators};
use super::error::{ArmingError, DisarmError};
use super::internal_error::InternalErrors;
use super::method::ArmMethod;
use super::registry::{CheckContext, CheckPhase, CheckRegistry, PreArmCheck};
use super::reporting::ReportingPolicy;
use super::status::{Severity, StatusSink};
use crate::check_failed;
use crate::parameters::{ArmingParams, ArmingRequired, ArmingRudder};
use crate::traits::TimeSource;

/// Armed flag and bookkeeping, mutated only by arm/disarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArmingState {
    pub armed: bool,
    /// Method of the most recent successful arm
    pub method: Option<ArmMethod>,
    /// True only while an arm request evaluates its checks
    pub running_checks: bool,
    pub last_arm_time_us: Option<u64>,
    pub last_disarm_method: Option<ArmMethod>,
}

/// The arming gate
pub struct ArmingSystem<'a, T: TimeSource> {
    params: ArmingParams,
    time: T,
    sink: &'a dyn StatusSink,
    collaborators: Collaborators<'a>,
    registry: CheckRegistry<'a>,
    aux_auth: Arc<AuxAuthTable>,
    internal_errors: Arc<InternalErrors>,
    state: ArmingState,
    reporting: ReportingPolicy,
}

impl<'a, T: TimeSource> ArmingSystem<'a, T> {
    /// Build the gate and its check registry from the collaborators present
    pub fn new(
        params: ArmingParams,
        time: T,
        sink: &'a dyn StatusSink,
        collaborators: Collaborators<'a>,
    ) -> Self {
        Self::with_aux_auth(params, time, sink, collaborators, AuxAuthTable::new())
    }

    /// Same as [`new`](Self::new) with a caller-sized authorisation table
    pub fn with_aux_auth(
        params: ArmingParams,
        time: T,
        sink: &'a dyn StatusSink,
        collaborators: Collaborators<'a>,
        table: AuxAuthTable,
    ) -> Self {
        let aux_auth = Arc::new(table);
        let internal_errors = Arc::new(InternalErrors::new());
        let registry = standard_registry(&collaborators, &params, &aux_auth, &internal_errors);
        Self {
            params,
            time,
            sink,
            collaborators,
            registry,
            aux_auth,
            internal_errors,
            state: ArmingState::default(),
            reporting: ReportingPolicy::new(),
        }
    }

    /// Append a custom check after the built-in ones
    pub fn register_check(&mut self, check: Box<dyn PreArmCheck + 'a>) {
        self.registry.register(check);
    }

    pub fn params(&self) -> &ArmingParams {
        &self.params
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    pub fn state(&self) -> &ArmingState {
        &self.state
    }

    pub fn enabled_checks(&self) -> CheckCategory {
        self.params.checks
    }

    /// Change the enable mask (ARMING_CHECK) at runtime
    pub fn set_enabled_checks(&mut self, checks: CheckCategory) {
        self.params.checks = checks;
    }

    /// Handle for external authorisers
    pub fn aux_auth(&self) -> Arc<AuxAuthTable> {
        Arc::clone(&self.aux_auth)
    }

    /// Latch shared with subsystems that report internal errors
    pub fn internal_errors(&self) -> Arc<InternalErrors> {
        Arc::clone(&self.internal_errors)
    }

    /// Discard every authoriser slot, e.g. before a fresh arming attempt
    pub fn reset_aux_auth(&self) {
        self.aux_auth.reset();
    }

    /// Requirement policy in force. Remote ID cannot be configured away,
    /// so it upgrades "no requirement" to minimum PWM.
    pub fn arming_required(&self) -> ArmingRequired {
        let remote_id = self.collaborators.remote_id.is_some_and(|r| r.enabled());
        match self.params.require {
            ArmingRequired::No if remote_id => ArmingRequired::YesMinPwm,
            require => require,
        }
    }

    /// Logical armed state; a vehicle without arming requirement is always armed
    pub fn is_armed(&self) -> bool {
        self.state.armed || self.arming_required() == ArmingRequired::No
    }

    pub fn is_armed_and_safety_off(&self) -> bool {
        self.is_armed()
            && !self
                .collaborators
                .safety
                .is_some_and(|s| s.safety_engaged())
    }

    /// Time since the last arm, while armed
    pub fn arm_duration_ms(&self) -> Option<u64> {
        if !self.state.armed {
            return None;
        }
        self.state
            .last_arm_time_us
            .map(|t| self.time.elapsed_since(t) / 1000)
    }

    fn phase(&self) -> CheckPhase {
        if self.state.running_checks {
            CheckPhase::Arm
        } else {
            CheckPhase::PreArm
        }
    }

    fn context(&self) -> CheckContext {
        CheckContext::new(self.params.checks, self.phase(), self.time.now_ms())
    }

    /// Registry pass in force. Without an arming requirement only the
    /// mandatory checks gate.
    fn evaluate(&mut self, ctx: &mut CheckContext) -> bool {
        if self.arming_required() == ArmingRequired::No {
            self.registry.evaluate_mandatory(ctx)
        } else {
            self.registry.evaluate_all(ctx)
        }
    }

    /// Periodic pre-arm evaluation, expected at 1 Hz.
    ///
    /// Failures are displayed as the reporting policy allows unless the
    /// pre-arm display is disabled. Returns the check result.
    pub fn update(&mut self) -> bool {
        if self.state.armed {
            return true;
        }
        let mut ctx = self.context();
        let passed = self.evaluate(&mut ctx);

        let display = self.reporting.record(ctx.now_ms(), passed);
        if display && !self.params.prearm_display_disabled() {
            ctx.flush(self.sink);
        }
        passed
    }

    /// Evaluate the whole registry, reporting every failure when `report`
    pub fn pre_arm_checks(&mut self, report: bool) -> bool {
        if self.state.armed {
            return true;
        }
        let mut ctx = self.context();
        let passed = self.evaluate(&mut ctx);
        if report {
            ctx.flush(self.sink);
        }
        passed
    }

    /// Evaluate only the checks no configuration can bypass
    pub fn mandatory_checks(&mut self, report: bool) -> bool {
        let mut ctx = self.context();
        let passed = self.registry.evaluate_mandatory(&mut ctx);
        if report {
            ctx.flush(self.sink);
        }
        passed
    }

    /// One-shot checks at the arm moment. Always reported.
    pub fn arm_checks(&self, method: ArmMethod) -> bool {
        let mut ctx = self.context();
        let passed = self.run_arm_checks(&mut ctx, method);
        ctx.flush(self.sink);
        passed
    }

    fn run_arm_checks(&self, ctx: &mut CheckContext, method: ArmMethod) -> bool {
        let c = &self.collaborators;

        if ctx.enabled(CheckCategory::RC) {
            if let Some(rc) = c.rc {
                if !rc_neutral_checks(ctx, rc, method.is_rudder()) {
                    return false;
                }
            }
        }

        if ctx.enabled(CheckCategory::GPS_CONFIG) {
            if let Some(gps) = c.gps_driver {
                if !gps.prepare_for_arming() {
                    return check_failed!(ctx, CheckCategory::GPS_CONFIG, "GPS not ready for arming");
                }
            }
        }

        // Logging is prepared even when its check is disabled
        if let Some(logger) = c.logger {
            if logger.logging_present() {
                logger.prepare_for_arming();
                if !logger.logging_started() && ctx.enabled(CheckCategory::LOGGING) {
                    return check_failed!(ctx, CheckCategory::LOGGING, "Logging not started");
                }
            }
        }
        true
    }

    /// Arm the vehicle.
    ///
    /// With `do_checks` false only the mandatory checks must pass (forced
    /// arm); otherwise the full registry and the arm-time checks must pass.
    pub fn arm(&mut self, method: ArmMethod, do_checks: bool) -> Result<(), ArmingError> {
        if self.state.armed {
            return Err(ArmingError::AlreadyArmed);
        }
        if method.is_rudder() && self.params.rudder == ArmingRudder::Disabled {
            return Err(ArmingError::RudderArmingDisabled);
        }

        self.state.running_checks = true;
        let passed = if do_checks {
            self.pre_arm_checks(true) && self.arm_checks(method)
        } else {
            self.mandatory_checks(true)
        };
        self.state.running_checks = false;

        if !passed {
            if let Some(logger) = self.collaborators.logger {
                logger.write_arming_failure();
            }
            crate::log_warn!("Arm request via {} refused", method);
            return Err(ArmingError::ChecksFailed);
        }

        let now_us = self.time.now_us();
        self.state.armed = true;
        self.state.method = Some(method);
        self.state.last_arm_time_us = Some(now_us);

        if let Some(logger) = self.collaborators.logger {
            logger.write_arm_event(&ArmEvent {
                timestamp_us: now_us,
                armed: true,
                enabled_checks: self.params.checks,
                forced: !do_checks,
                method,
            });
        }
        self.send_state_change_text("Arming motors");
        if do_checks && self.params.checks.is_empty() {
            self.sink
                .send(Severity::Warning, "Warning: Arming Checks Disabled");
        }

        if let Some(terrain) = self.collaborators.terrain {
            terrain.set_reference_location();
        }
        if let Some(fence) = self.collaborators.fence {
            fence.auto_enable_on_arming();
        }

        crate::log_info!("Armed via {} (forced: {})", method, !do_checks);
        Ok(())
    }

    /// Disarm the vehicle.
    ///
    /// `do_checks` false marks the disarm as forced in the log.
    pub fn disarm(&mut self, method: ArmMethod, do_checks: bool) -> Result<(), DisarmError> {
        if !self.state.armed {
            return Err(DisarmError::NotArmed);
        }
        if method.is_rudder() {
            let throttle_low = self
                .collaborators
                .rc
                .is_some_and(|rc| rc.throttle_at_minimum());
            if !throttle_low {
                return Err(DisarmError::ThrottleNotLow);
            }
            if self.params.rudder != ArmingRudder::ArmOrDisarm {
                self.sink
                    .send(Severity::Info, "Disarm: rudder disarm disabled");
                return Err(DisarmError::RudderDisarmDisabled);
            }
        }

        self.state.armed = false;
        self.state.last_disarm_method = Some(method);

        if let Some(logger) = self.collaborators.logger {
            logger.write_arm_event(&ArmEvent {
                timestamp_us: self.time.now_us(),
                armed: false,
                enabled_checks: CheckCategory::empty(),
                forced: !do_checks,
                method,
            });
            logger.set_long_log_persist(method.requests_extended_log_retention());
        }

        if self.params.safety_on_disarm {
            if let Some(safety) = self.collaborators.safety {
                safety.force_safety_on();
            }
        }
        if let Some(fence) = self.collaborators.fence {
            fence.auto_disable_on_disarming();
        }
        self.aux_auth.reset();

        self.send_state_change_text("Disarming motors");
        crate::log_info!("Disarmed via {}", method);
        Ok(())
    }

    fn send_state_change_text(&self, text: &str) {
        if !self.params.state_change_text_disabled() {
            self.sink.send(Severity::Info, text);
        }
    }
}
