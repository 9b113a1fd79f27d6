//! Built-in checks
//!
//! Each check wraps one collaborator. [`standard_registry`] assembles them
//! in evaluation order from whichever collaborators are present: hardware
//! interlocks first, then per-subsystem checks, then the cross-cutting
//! checks (authorisation, fence, remote ID, serial, emergency stop).

use alloc::boxed::Box;
use alloc::sync::Arc;

use super::aux_auth::AuxAuthTable;
use super::check::CheckCategory;
use super::collaborators::{
    ArmingLogger, Collaborators, Fence, GpsDriver, HealthCheck, InertialSensors, Mission,
    MissionItems, RallyState, RcInput, RemoteId, SafetyInterlock, StickAxis, Terrain,
};
use super::consistency::{ConsistencyTimer, CONSISTENCY_WINDOW_MS};
use super::internal_error::InternalErrors;
use super::registry::{CheckContext, CheckRegistry, PreArmCheck};
use crate::check_failed;
use crate::parameters::ArmingParams;

/// Gyro agreement tolerance (deg/s)
pub const GYRO_CONSISTENCY_DPS: f32 = 5.0;

/// Hardware safety switch must be disengaged
pub struct SafetySwitchCheck<'a> {
    safety: &'a dyn SafetyInterlock,
}

impl PreArmCheck for SafetySwitchCheck<'_> {
    fn name(&self) -> &'static str {
        "safety switch"
    }

    fn category(&self) -> Option<CheckCategory> {
        Some(CheckCategory::SWITCH)
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        if ctx.enabled(CheckCategory::SWITCH) && self.safety.safety_engaged() {
            return check_failed!(ctx, CheckCategory::SWITCH, "Hardware safety switch");
        }
        true
    }
}

/// Generic wrapper around a leaf [`HealthCheck`]
pub struct LeafCheck<'a> {
    name: &'static str,
    source: &'a dyn HealthCheck,
    category: Option<CheckCategory>,
    prefix: &'static str,
    mandatory: bool,
}

impl<'a> LeafCheck<'a> {
    /// Leaf check skipped while `category` is disabled
    pub fn new(
        name: &'static str,
        source: &'a dyn HealthCheck,
        category: CheckCategory,
        prefix: &'static str,
    ) -> Self {
        Self {
            name,
            source,
            category: Some(category),
            prefix,
            mandatory: false,
        }
    }

    /// Leaf check that no mask bit can disable
    pub fn always(name: &'static str, source: &'a dyn HealthCheck, prefix: &'static str) -> Self {
        Self {
            name,
            source,
            category: None,
            prefix,
            mandatory: false,
        }
    }

    /// Also run on forced arms
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }
}

impl PreArmCheck for LeafCheck<'_> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn category(&self) -> Option<CheckCategory> {
        self.category
    }

    fn mandatory(&self) -> bool {
        self.mandatory
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        if let Some(category) = self.category {
            if !ctx.enabled(category) {
                return true;
            }
        }
        match (self.source.prearm_check(), self.category) {
            (Ok(()), _) => true,
            (Err(reason), Some(category)) => {
                check_failed!(ctx, category, "{}{}", self.prefix, reason)
            }
            (Err(reason), None) => check_failed!(ctx, "{}{}", self.prefix, reason),
        }
    }
}

/// Inertial sensor health, calibration and agreement
pub struct InsCheck<'a> {
    ins: &'a dyn InertialSensors,
    accel_threshold: f32,
    accels: ConsistencyTimer,
    gyros: ConsistencyTimer,
}

impl<'a> InsCheck<'a> {
    pub fn new(ins: &'a dyn InertialSensors, accel_threshold: f32) -> Self {
        Self {
            ins,
            accel_threshold,
            accels: ConsistencyTimer::new(CONSISTENCY_WINDOW_MS),
            gyros: ConsistencyTimer::new(CONSISTENCY_WINDOW_MS),
        }
    }
}

impl PreArmCheck for InsCheck<'_> {
    fn name(&self) -> &'static str {
        "inertial sensors"
    }

    fn category(&self) -> Option<CheckCategory> {
        Some(CheckCategory::INS)
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        const INS: CheckCategory = CheckCategory::INS;
        if !ctx.enabled(INS) {
            return true;
        }
        let ins = self.ins;
        let now = ctx.now_ms();

        // Both agreement windows advance on every evaluation
        let accels_stable = self.accels.update(
            now,
            ins.accels_consistent(self.accel_threshold),
            ins.accel_count() > 1,
        );
        let gyros_stable = self.gyros.update(
            now,
            ins.gyros_consistent(GYRO_CONSISTENCY_DPS),
            ins.gyro_count() > 1,
        );

        if !ins.gyros_healthy() {
            return check_failed!(ctx, INS, "Gyros not healthy");
        }
        if !ins.gyros_calibrated() {
            return check_failed!(ctx, INS, "Gyros not calibrated");
        }
        if !ins.accels_healthy() {
            return check_failed!(ctx, INS, "Accels not healthy");
        }
        if !ins.accels_calibrated() {
            return check_failed!(ctx, INS, "3D Accel calibration needed");
        }
        if ins.accel_cal_requires_reboot() {
            return check_failed!(ctx, INS, "Accels calibrated requires reboot");
        }

        if !accels_stable {
            return check_failed!(ctx, INS, "Accels inconsistent");
        }
        if !gyros_stable {
            return check_failed!(ctx, INS, "Gyros inconsistent");
        }

        if ins.temperature_cal_running() {
            return check_failed!(ctx, INS, "temperature cal running");
        }
        true
    }
}

/// Onboard logging readiness
pub struct LoggingCheck<'a> {
    logger: &'a dyn ArmingLogger,
}

impl PreArmCheck for LoggingCheck<'_> {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn category(&self) -> Option<CheckCategory> {
        Some(CheckCategory::LOGGING)
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        const LOGGING: CheckCategory = CheckCategory::LOGGING;
        if !ctx.enabled(LOGGING) || !self.logger.logging_present() {
            return true;
        }
        if self.logger.logging_failed() {
            return check_failed!(ctx, LOGGING, "Logging failed");
        }
        if !self.logger.card_inserted() {
            return check_failed!(ctx, LOGGING, "No SD card");
        }
        if self.logger.in_log_download() {
            return check_failed!(ctx, LOGGING, "Downloading logs");
        }
        true
    }
}

/// RC failsafe and channel calibration sanity
pub struct RcCheck<'a> {
    rc: &'a dyn RcInput,
}

impl PreArmCheck for RcCheck<'_> {
    fn name(&self) -> &'static str {
        "rc transmitter"
    }

    fn category(&self) -> Option<CheckCategory> {
        Some(CheckCategory::RC)
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        const RC: CheckCategory = CheckCategory::RC;
        if !ctx.enabled(RC) {
            return true;
        }
        if self.rc.in_failsafe() {
            return check_failed!(ctx, RC, "Radio failsafe on");
        }

        let mut passed = true;
        for ch in 1..=self.rc.channel_count() {
            let Some(cal) = self.rc.calibration(ch) else {
                continue;
            };
            if cal.min > cal.trim {
                passed = check_failed!(ctx, RC, "RC{}_MIN is greater than RC{}_TRIM", ch, ch);
            }
            if cal.max < cal.trim {
                passed = check_failed!(ctx, RC, "RC{}_MAX is less than RC{}_TRIM", ch, ch);
            }
        }
        passed
    }
}

/// Stick calibration must not be in progress. Mandatory.
pub struct RcCalibrationCheck<'a> {
    rc: &'a dyn RcInput,
}

impl PreArmCheck for RcCalibrationCheck<'_> {
    fn name(&self) -> &'static str {
        "rc calibration"
    }

    fn category(&self) -> Option<CheckCategory> {
        None
    }

    fn mandatory(&self) -> bool {
        true
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        if self.rc.calibrating() {
            return check_failed!(ctx, CheckCategory::RC, "RC calibrating");
        }
        true
    }
}

/// Required mission items and mission-dependent modes.
///
/// Uncategorised at the registry level: the item checks gate on the
/// MISSION bit themselves, while "Mode requires mission" always blocks.
pub struct MissionCheck<'a> {
    mission: Option<&'a dyn Mission>,
    required: MissionItems,
}

impl PreArmCheck for MissionCheck<'_> {
    fn name(&self) -> &'static str {
        "mission"
    }

    fn category(&self) -> Option<CheckCategory> {
        None
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        const MISSION: CheckCategory = CheckCategory::MISSION;
        if ctx.enabled(MISSION) && !self.required.is_empty() {
            let Some(mission) = self.mission else {
                return check_failed!(ctx, MISSION, "No mission library present");
            };
            for (item, label) in MissionItems::COMMAND_ITEMS {
                if self.required.contains(item) && !mission.contains_item(item) {
                    return check_failed!(ctx, MISSION, "Missing mission item: {}", label);
                }
            }
            if self.required.contains(MissionItems::RALLY) {
                match mission.rally() {
                    RallyState::Reachable => {}
                    RallyState::NoPosition => {
                        return check_failed!(ctx, MISSION, "Can't check rally without position");
                    }
                    RallyState::TooFar => {
                        return check_failed!(
                            ctx,
                            MISSION,
                            "No sufficiently close rally point located"
                        );
                    }
                }
            }
        }

        if let Some(mission) = self.mission {
            if mission.mode_requires_mission() && mission.command_count() == 0 {
                return check_failed!(ctx, MISSION, "Mode requires mission");
            }
        }
        true
    }
}

/// Latched internal errors. Cannot be disabled.
pub struct InternalErrorCheck {
    errors: Arc<InternalErrors>,
}

impl InternalErrorCheck {
    pub fn new(errors: Arc<InternalErrors>) -> Self {
        Self { errors }
    }
}

impl PreArmCheck for InternalErrorCheck {
    fn name(&self) -> &'static str {
        "internal errors"
    }

    fn category(&self) -> Option<CheckCategory> {
        None
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        if !self.errors.any() {
            return true;
        }
        let kinds = self.errors.errors();
        check_failed!(
            ctx,
            "Internal errors 0x{:x} l:{} {}",
            kinds.bits(),
            self.errors.last_line(),
            kinds
        )
    }
}

/// Terrain database, only when the mission flies terrain-relative items
pub struct TerrainCheck<'a> {
    terrain: Option<&'a dyn Terrain>,
    mission: &'a dyn Mission,
}

impl PreArmCheck for TerrainCheck<'_> {
    fn name(&self) -> &'static str {
        "terrain"
    }

    fn category(&self) -> Option<CheckCategory> {
        Some(CheckCategory::PARAMETERS)
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        const PARAMETERS: CheckCategory = CheckCategory::PARAMETERS;
        if !ctx.enabled(PARAMETERS) || !self.mission.has_terrain_relative_items() {
            return true;
        }
        let Some(terrain) = self.terrain else {
            return check_failed!(ctx, PARAMETERS, "terrain required but disabled");
        };
        if !terrain.enabled() {
            return check_failed!(ctx, PARAMETERS, "terrain disabled");
        }
        if let Err(reason) = terrain.prearm_check() {
            return check_failed!(ctx, PARAMETERS, "{}", reason);
        }
        true
    }
}

/// GPS receivers must have finished configuration
pub struct GpsConfigCheck<'a> {
    driver: &'a dyn GpsDriver,
}

impl PreArmCheck for GpsConfigCheck<'_> {
    fn name(&self) -> &'static str {
        "gps config"
    }

    fn category(&self) -> Option<CheckCategory> {
        Some(CheckCategory::GPS_CONFIG)
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        if !ctx.enabled(CheckCategory::GPS_CONFIG) {
            return true;
        }
        if let Some(index) = self.driver.first_unconfigured() {
            return check_failed!(
                ctx,
                CheckCategory::GPS_CONFIG,
                "GPS {} still configuring this GPS",
                index + 1
            );
        }
        true
    }
}

/// Auxiliary authorisation. Mandatory, and not gated by its mask bit.
///
/// A missing approval blocks arming whatever the mask says. The AUX_AUTH
/// bit only picks the severity of the displayed line: `Critical` when set,
/// `Debug` when cleared.
pub struct AuxAuthCheck {
    table: Arc<AuxAuthTable>,
}

impl AuxAuthCheck {
    pub fn new(table: Arc<AuxAuthTable>) -> Self {
        Self { table }
    }
}

impl PreArmCheck for AuxAuthCheck {
    fn name(&self) -> &'static str {
        "auxiliary authorisation"
    }

    fn category(&self) -> Option<CheckCategory> {
        None
    }

    fn mandatory(&self) -> bool {
        true
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        let status = self.table.evaluate();
        if status.is_authorised() {
            return true;
        }
        check_failed!(ctx, CheckCategory::AUX_AUTH, "{}", status.message())
    }
}

/// RC disarm switch must be off
pub struct DisarmSwitchCheck<'a> {
    rc: &'a dyn RcInput,
}

impl PreArmCheck for DisarmSwitchCheck<'_> {
    fn name(&self) -> &'static str {
        "disarm switch"
    }

    fn category(&self) -> Option<CheckCategory> {
        None
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        if self.rc.disarm_switch_active() {
            return check_failed!(ctx, "Disarm Switch on");
        }
        true
    }
}

/// Geofence readiness. Cannot be disabled.
pub struct FenceCheck<'a> {
    fence: &'a dyn Fence,
}

impl PreArmCheck for FenceCheck<'_> {
    fn name(&self) -> &'static str {
        "fence"
    }

    fn category(&self) -> Option<CheckCategory> {
        None
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        if let Err(reason) = self.fence.prearm_check() {
            return check_failed!(ctx, "{}", reason);
        }
        true
    }
}

/// Remote ID compliance. Mandatory.
pub struct RemoteIdCheck<'a> {
    remote_id: &'a dyn RemoteId,
}

impl PreArmCheck for RemoteIdCheck<'_> {
    fn name(&self) -> &'static str {
        "remote id"
    }

    fn category(&self) -> Option<CheckCategory> {
        None
    }

    fn mandatory(&self) -> bool {
        true
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        if !self.remote_id.enabled() {
            return true;
        }
        if let Err(reason) = self.remote_id.prearm_check() {
            return check_failed!(ctx, "OpenDroneID: {}", reason);
        }
        true
    }
}

/// Emergency stop, unless an RC stop switch explains it
pub struct EstopCheck<'a> {
    safety: &'a dyn SafetyInterlock,
}

impl PreArmCheck for EstopCheck<'_> {
    fn name(&self) -> &'static str {
        "emergency stop"
    }

    fn category(&self) -> Option<CheckCategory> {
        None
    }

    fn check(&mut self, ctx: &mut CheckContext) -> bool {
        if self.safety.emergency_stopped() && !self.safety.estop_switch_active() {
            return check_failed!(ctx, "Motors Emergency Stopped");
        }
        true
    }
}

/// Build the registry from the collaborators present, in evaluation order
pub fn standard_registry<'a>(
    c: &Collaborators<'a>,
    params: &ArmingParams,
    aux_auth: &Arc<AuxAuthTable>,
    internal_errors: &Arc<InternalErrors>,
) -> CheckRegistry<'a> {
    use CheckCategory as Cat;

    let mut registry = CheckRegistry::new();

    if let Some(safety) = c.safety {
        registry.register(Box::new(SafetySwitchCheck { safety }));
    }
    if let Some(baro) = c.baro {
        registry.register(Box::new(LeafCheck::new("baro", baro, Cat::BARO, "Baro: ")));
    }
    if let Some(airspeed) = c.airspeed {
        registry.register(Box::new(LeafCheck::new(
            "airspeed",
            airspeed,
            Cat::AIRSPEED,
            "Airspeed: ",
        )));
    }
    if let Some(ins) = c.ins {
        registry.register(Box::new(InsCheck::new(ins, params.accel_threshold)));
    }
    if let Some(compass) = c.compass {
        registry.register(Box::new(LeafCheck::new("compass", compass, Cat::COMPASS, "")));
    }
    if let Some(gps) = c.gps {
        registry.register(Box::new(LeafCheck::new("gps", gps, Cat::GPS, "")));
    }
    if let Some(driver) = c.gps_driver {
        registry.register(Box::new(GpsConfigCheck { driver }));
    }
    if let Some(battery) = c.battery {
        registry.register(Box::new(LeafCheck::new("battery", battery, Cat::BATTERY, "")));
    }
    if let Some(logger) = c.logger {
        registry.register(Box::new(LoggingCheck { logger }));
    }
    if let Some(rc) = c.rc {
        registry.register(Box::new(RcCheck { rc }));
        registry.register(Box::new(RcCalibrationCheck { rc }));
    }
    if c.mission.is_some() || !params.mission_items.is_empty() {
        registry.register(Box::new(MissionCheck {
            mission: c.mission,
            required: params.mission_items,
        }));
    }
    if let Some(rangefinder) = c.rangefinder {
        registry.register(Box::new(LeafCheck::new(
            "rangefinder",
            rangefinder,
            Cat::RANGEFINDER,
            "",
        )));
    }
    if let Some(board) = c.board_voltage {
        registry.register(Box::new(LeafCheck::new("board voltage", board, Cat::VOLTAGE, "")));
    }
    if let Some(system) = c.system {
        registry.register(Box::new(LeafCheck::new("system", system, Cat::SYSTEM, "")));
    }
    registry.register(Box::new(InternalErrorCheck::new(Arc::clone(internal_errors))));
    if let Some(mission) = c.mission {
        registry.register(Box::new(TerrainCheck {
            terrain: c.terrain,
            mission,
        }));
    }
    if let Some(can) = c.can {
        registry.register(Box::new(LeafCheck::new("can", can, Cat::SYSTEM, "CAN: ")));
    }
    if let Some(proximity) = c.proximity {
        registry.register(Box::new(LeafCheck::always("proximity", proximity, "")));
    }
    if let Some(camera) = c.camera {
        registry.register(Box::new(LeafCheck::new("camera", camera, Cat::CAMERA, "")));
    }
    if let Some(visodom) = c.visual_odometry {
        registry.register(Box::new(LeafCheck::new(
            "visual odometry",
            visodom,
            Cat::VISION,
            "VisOdom: ",
        )));
    }
    registry.register(Box::new(AuxAuthCheck::new(Arc::clone(aux_auth))));
    if let Some(rc) = c.rc {
        registry.register(Box::new(DisarmSwitchCheck { rc }));
    }
    if let Some(fence) = c.fence {
        registry.register(Box::new(FenceCheck { fence }));
    }
    if let Some(remote_id) = c.remote_id {
        registry.register(Box::new(RemoteIdCheck { remote_id }));
    }
    if let Some(serial) = c.serial_protocol {
        registry.register(Box::new(LeafCheck::always("serial protocol", serial, "").mandatory()));
    }
    if let Some(safety) = c.safety {
        registry.register(Box::new(EstopCheck { safety }));
    }

    crate::log_info!("Check registry built with {} checks", registry.len());
    registry
}

/// Arm-time RC neutrality. Returns false after recording each off-centre stick.
pub(crate) fn rc_neutral_checks(
    ctx: &mut CheckContext,
    rc: &dyn RcInput,
    rudder_arming: bool,
) -> bool {
    const RC: CheckCategory = CheckCategory::RC;
    const RC_INPUT_STALE_MS: u64 = 1000;

    if !rc.has_valid_input() {
        return true;
    }
    let last = rc.last_input_ms();
    if last == 0 || ctx.now_ms().saturating_sub(last) > RC_INPUT_STALE_MS {
        return true;
    }

    let mut passed = true;
    for axis in [StickAxis::Roll, StickAxis::Pitch, StickAxis::Yaw] {
        if rudder_arming && axis == rc.arming_axis() {
            continue;
        }
        if !rc.centred(axis) {
            passed = check_failed!(
                ctx,
                RC,
                "{} (RC{}) is not neutral",
                axis.name(),
                rc.channel_for(axis)
            );
        }
    }
    if rc.throttle_check_required() && !rc.throttle_at_minimum() {
        passed = check_failed!(
            ctx,
            RC,
            "{} (RC{}) is not neutral",
            StickAxis::Throttle.name(),
            rc.channel_for(StickAxis::Throttle)
        );
    }
    passed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arming::internal_error::InternalErrorKind;
    use crate::arming::mock::{MockHealth, MockIns, MockLogger, MockMission, MockRc, MockSafety};
    use crate::arming::registry::CheckPhase;
    use crate::arming::status::Severity;
    use alloc::vec::Vec;

    fn ctx(mask: CheckCategory, now_ms: u64) -> CheckContext {
        CheckContext::new(mask, CheckPhase::PreArm, now_ms)
    }

    fn messages(ctx: &CheckContext) -> Vec<&str> {
        ctx.failures().iter().map(|f| f.message.as_str()).collect()
    }

    #[test]
    fn test_leaf_check_prefixes_reason() {
        let baro = MockHealth::failing("not healthy");
        let mut check = LeafCheck::new("baro", &baro, CheckCategory::BARO, "Baro: ");
        let mut c = ctx(CheckCategory::ALL, 0);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Baro: not healthy"]);
    }

    #[test]
    fn test_leaf_check_skipped_when_disabled() {
        let baro = MockHealth::failing("not healthy");
        let mut check = LeafCheck::new("baro", &baro, CheckCategory::BARO, "Baro: ");
        let mut c = ctx(CheckCategory::GPS, 0);
        assert!(check.check(&mut c));
        assert_eq!(baro.calls(), 0);
    }

    #[test]
    fn test_always_leaf_ignores_mask() {
        let fence = MockHealth::failing("Fence requires position");
        let mut check = LeafCheck::always("fence", &fence, "");
        let mut c = ctx(CheckCategory::empty(), 0);
        assert!(!check.check(&mut c));
        assert_eq!(c.failures()[0].severity, Severity::Critical);
    }

    #[test]
    fn test_ins_consistency_needs_full_window() {
        let ins = MockIns::healthy(2);
        let mut check = InsCheck::new(&ins, 0.75);

        let mut c = ctx(CheckCategory::ALL, 1_000);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Accels inconsistent"]);

        let mut c = ctx(CheckCategory::ALL, 11_000);
        assert!(check.check(&mut c));
    }

    #[test]
    fn test_ins_glitch_restarts_window() {
        let ins = MockIns::healthy(2);
        let mut check = InsCheck::new(&ins, 0.75);
        assert!(!check.check(&mut ctx(CheckCategory::ALL, 0)));

        ins.gyros_consistent.set(false);
        let mut c = ctx(CheckCategory::ALL, 9_900);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Accels inconsistent"]);

        // accels settled on schedule, gyros restart from the glitch
        ins.gyros_consistent.set(true);
        let mut c = ctx(CheckCategory::ALL, 10_000);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Gyros inconsistent"]);
        assert!(!check.check(&mut ctx(CheckCategory::ALL, 19_999)));
        assert!(check.check(&mut ctx(CheckCategory::ALL, 20_000)));
    }

    #[test]
    fn test_ins_windows_run_while_unhealthy() {
        let ins = MockIns::healthy(2);
        ins.gyros_healthy.set(false);
        let mut check = InsCheck::new(&ins, 0.75);
        let mut c = ctx(CheckCategory::ALL, 0);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Gyros not healthy"]);

        ins.gyros_healthy.set(true);
        assert!(check.check(&mut ctx(CheckCategory::ALL, 10_000)));
    }

    #[test]
    fn test_ins_single_sensor_vacuously_consistent() {
        let ins = MockIns::healthy(1);
        let mut check = InsCheck::new(&ins, 0.75);
        assert!(check.check(&mut ctx(CheckCategory::ALL, 0)));
    }

    #[test]
    fn test_ins_reports_first_problem_only() {
        let ins = MockIns::healthy(1);
        ins.gyros_healthy.set(false);
        ins.accels_calibrated.set(false);
        let mut check = InsCheck::new(&ins, 0.75);
        let mut c = ctx(CheckCategory::INS, 0);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Gyros not healthy"]);
    }

    #[test]
    fn test_logging_absent_passes() {
        let logger = MockLogger::new();
        logger.present.set(false);
        logger.failed.set(true);
        let mut check = LoggingCheck { logger: &logger };
        assert!(check.check(&mut ctx(CheckCategory::ALL, 0)));

        logger.present.set(true);
        let mut c = ctx(CheckCategory::ALL, 0);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Logging failed"]);
    }

    #[test]
    fn test_rc_calibration_sanity_reports_every_channel() {
        let rc = MockRc::new();
        rc.set_calibration(1, 1500, 1400, 1900);
        rc.set_calibration(3, 1100, 1500, 1400);
        let mut check = RcCheck { rc: &rc };
        let mut c = ctx(CheckCategory::RC, 0);
        assert!(!check.check(&mut c));
        assert_eq!(
            messages(&c),
            ["RC1_MIN is greater than RC1_TRIM", "RC3_MAX is less than RC3_TRIM"]
        );
    }

    #[test]
    fn test_rc_calibrating_blocks_even_when_rc_disabled() {
        let rc = MockRc::new();
        rc.calibrating.set(true);
        let mut check = RcCalibrationCheck { rc: &rc };
        let mut c = ctx(CheckCategory::empty(), 0);
        assert!(!check.check(&mut c));
        assert_eq!(c.failures()[0].severity, Severity::Debug);
        assert!(check.mandatory());
    }

    #[test]
    fn test_mission_items_required() {
        let mission = MockMission::new();
        mission.items.set(MissionItems::TAKEOFF);
        let mut check = MissionCheck {
            mission: Some(&mission),
            required: MissionItems::TAKEOFF | MissionItems::LAND,
        };
        let mut c = ctx(CheckCategory::ALL, 0);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Missing mission item: land"]);

        mission.items.set(MissionItems::TAKEOFF | MissionItems::LAND);
        assert!(check.check(&mut ctx(CheckCategory::ALL, 0)));
    }

    #[test]
    fn test_mission_rally_requirement() {
        let mission = MockMission::new();
        mission.rally.set(RallyState::NoPosition);
        let mut check = MissionCheck {
            mission: Some(&mission),
            required: MissionItems::RALLY,
        };
        let mut c = ctx(CheckCategory::ALL, 0);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Can't check rally without position"]);
    }

    #[test]
    fn test_mode_requires_mission() {
        let mission = MockMission::new();
        mission.mode_requires_mission.set(true);
        let mut check = MissionCheck {
            mission: Some(&mission),
            required: MissionItems::empty(),
        };
        let mut c = ctx(CheckCategory::empty(), 0);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Mode requires mission"]);

        // Still blocks through the registry with every bit cleared
        let mut registry = CheckRegistry::new();
        registry.register(Box::new(check));
        assert!(!registry.evaluate_all(&mut ctx(CheckCategory::empty(), 0)));
    }

    #[test]
    fn test_aux_auth_blocks_with_bit_cleared() {
        let table = Arc::new(AuxAuthTable::new());
        table.acquire_slot().unwrap();
        let mut registry = CheckRegistry::new();
        registry.register(Box::new(AuxAuthCheck::new(Arc::clone(&table))));

        let mut c = ctx(CheckCategory::BARO, 0);
        assert!(!registry.evaluate_all(&mut c));
        assert_eq!(messages(&c), ["Waiting for auxiliary authorisation"]);
        assert_eq!(c.failures()[0].severity, Severity::Debug);

        let mut c = ctx(CheckCategory::AUX_AUTH, 0);
        assert!(!registry.evaluate_all(&mut c));
        assert_eq!(c.failures()[0].severity, Severity::Critical);
    }

    #[test]
    fn test_standard_registry_always_watches_internal_errors() {
        let table = Arc::new(AuxAuthTable::new());
        let errors = Arc::new(InternalErrors::new());
        let collaborators = Collaborators::default();
        let mut registry =
            standard_registry(&collaborators, &ArmingParams::default(), &table, &errors);
        assert!(registry.names().any(|n| n == "internal errors"));
        assert!(registry.evaluate_all(&mut ctx(CheckCategory::empty(), 0)));

        errors.record(InternalErrorKind::TERRAIN_CONTRACT, 7);
        assert!(!registry.evaluate_all(&mut ctx(CheckCategory::empty(), 0)));
    }

    #[test]
    fn test_internal_errors_always_on() {
        let errors = Arc::new(InternalErrors::new());
        let mut check = InternalErrorCheck::new(Arc::clone(&errors));
        assert!(check.check(&mut ctx(CheckCategory::empty(), 0)));

        errors.record(InternalErrorKind::TERRAIN_CONTRACT, 42);
        let mut c = ctx(CheckCategory::empty(), 0);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Internal errors 0x8 l:42 terrain_contract"]);
        assert_eq!(c.failures()[0].severity, Severity::Critical);
    }

    #[test]
    fn test_terrain_only_when_mission_needs_it() {
        let mission = MockMission::new();
        let mut check = TerrainCheck {
            terrain: None,
            mission: &mission,
        };
        assert!(check.check(&mut ctx(CheckCategory::ALL, 0)));

        mission.terrain_items.set(true);
        let mut c = ctx(CheckCategory::ALL, 0);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["terrain required but disabled"]);
    }

    #[test]
    fn test_estop_explained_by_switch() {
        let safety = MockSafety::new();
        safety.estopped.set(true);
        let mut check = EstopCheck { safety: &safety };
        let mut c = ctx(CheckCategory::empty(), 0);
        assert!(!check.check(&mut c));
        assert_eq!(messages(&c), ["Motors Emergency Stopped"]);

        safety.estop_switch.set(true);
        assert!(check.check(&mut ctx(CheckCategory::empty(), 0)));
    }

    #[test]
    fn test_safety_switch_gated() {
        let safety = MockSafety::new();
        safety.engaged.set(true);
        let mut check = SafetySwitchCheck { safety: &safety };
        assert!(!check.check(&mut ctx(CheckCategory::SWITCH, 0)));
        assert!(check.check(&mut ctx(CheckCategory::BARO, 0)));
    }

    #[test]
    fn test_rc_neutral_ignores_arming_stick_for_rudder() {
        let rc = MockRc::new();
        rc.last_input_ms.set(900);
        rc.yaw_centred.set(false);

        let mut c = CheckContext::new(CheckCategory::ALL, CheckPhase::Arm, 1_000);
        assert!(rc_neutral_checks(&mut c, &rc, true));

        let mut c = CheckContext::new(CheckCategory::ALL, CheckPhase::Arm, 1_000);
        assert!(!rc_neutral_checks(&mut c, &rc, false));
        assert_eq!(messages(&c), ["Yaw (RC4) is not neutral"]);
    }

    #[test]
    fn test_rc_neutral_skipped_on_stale_input() {
        let rc = MockRc::new();
        rc.last_input_ms.set(100);
        rc.throttle_at_minimum.set(false);
        let mut c = CheckContext::new(CheckCategory::ALL, CheckPhase::Arm, 5_000);
        assert!(rc_neutral_checks(&mut c, &rc, false));
    }

    #[test]
    fn test_standard_registry_order() {
        let safety = MockSafety::new();
        let baro = MockHealth::healthy();
        let ins = MockIns::healthy(1);
        let rc = MockRc::new();
        let serial = MockHealth::healthy();
        let collaborators = Collaborators {
            safety: Some(&safety),
            baro: Some(&baro),
            ins: Some(&ins),
            rc: Some(&rc),
            serial_protocol: Some(&serial),
            ..Default::default()
        };
        let table = Arc::new(AuxAuthTable::new());
        let errors = Arc::new(InternalErrors::new());
        let registry =
            standard_registry(&collaborators, &ArmingParams::default(), &table, &errors);

        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            [
                "safety switch",
                "baro",
                "inertial sensors",
                "rc transmitter",
                "rc calibration",
                "internal errors",
                "auxiliary authorisation",
                "disarm switch",
                "serial protocol",
                "emergency stop",
            ]
        );
    }
}
