//! Mock collaborators for host testing
//!
//! Cell-based, single-threaded stand-ins for every collaborator trait.
//! Always compiled so downstream crates can use them in their own tests.

use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use super::collaborators::{
    ArmEvent, ArmingLogger, ChannelCalibration, Fence, GpsDriver, HealthCheck, InertialSensors,
    Mission, MissionItems, RallyState, RcInput, RemoteId, SafetyInterlock, StickAxis, Terrain,
};
use super::status::{format_truncated, FailureText};

/// Leaf health check with a settable failure reason
#[derive(Default)]
pub struct MockHealth {
    failure: RefCell<Option<FailureText>>,
    calls: Cell<u32>,
}

impl MockHealth {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn failing(reason: &str) -> Self {
        let mock = Self::default();
        mock.set_failure(Some(reason));
        mock
    }

    pub fn set_failure(&self, reason: Option<&str>) {
        *self.failure.borrow_mut() = reason.map(|r| format_truncated(format_args!("{}", r)));
    }

    /// Number of times the check was consulted
    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl HealthCheck for MockHealth {
    fn prearm_check(&self) -> Result<(), FailureText> {
        self.calls.set(self.calls.get() + 1);
        match self.failure.borrow().as_ref() {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }
}

/// Safety switch and emergency stop
#[derive(Default)]
pub struct MockSafety {
    pub engaged: Cell<bool>,
    pub estopped: Cell<bool>,
    pub estop_switch: Cell<bool>,
    pub forced_on: Cell<u32>,
}

impl MockSafety {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SafetyInterlock for MockSafety {
    fn safety_engaged(&self) -> bool {
        self.engaged.get()
    }

    fn emergency_stopped(&self) -> bool {
        self.estopped.get()
    }

    fn estop_switch_active(&self) -> bool {
        self.estop_switch.get()
    }

    fn force_safety_on(&self) {
        self.engaged.set(true);
        self.forced_on.set(self.forced_on.get() + 1);
    }
}

/// Inertial sensors, healthy and calibrated unless told otherwise
pub struct MockIns {
    pub gyros_healthy: Cell<bool>,
    pub gyros_calibrated: Cell<bool>,
    pub accels_healthy: Cell<bool>,
    pub accels_calibrated: Cell<bool>,
    pub requires_reboot: Cell<bool>,
    pub accels_consistent: Cell<bool>,
    pub gyros_consistent: Cell<bool>,
    pub temperature_cal: Cell<bool>,
    pub sensor_count: Cell<u8>,
}

impl MockIns {
    pub fn healthy(sensor_count: u8) -> Self {
        Self {
            gyros_healthy: Cell::new(true),
            gyros_calibrated: Cell::new(true),
            accels_healthy: Cell::new(true),
            accels_calibrated: Cell::new(true),
            requires_reboot: Cell::new(false),
            accels_consistent: Cell::new(true),
            gyros_consistent: Cell::new(true),
            temperature_cal: Cell::new(false),
            sensor_count: Cell::new(sensor_count),
        }
    }
}

impl InertialSensors for MockIns {
    fn gyros_healthy(&self) -> bool {
        self.gyros_healthy.get()
    }

    fn gyros_calibrated(&self) -> bool {
        self.gyros_calibrated.get()
    }

    fn accels_healthy(&self) -> bool {
        self.accels_healthy.get()
    }

    fn accels_calibrated(&self) -> bool {
        self.accels_calibrated.get()
    }

    fn accel_cal_requires_reboot(&self) -> bool {
        self.requires_reboot.get()
    }

    fn gyro_count(&self) -> u8 {
        self.sensor_count.get()
    }

    fn accel_count(&self) -> u8 {
        self.sensor_count.get()
    }

    fn accels_consistent(&self, _threshold: f32) -> bool {
        self.accels_consistent.get()
    }

    fn gyros_consistent(&self, _threshold_dps: f32) -> bool {
        self.gyros_consistent.get()
    }

    fn temperature_cal_running(&self) -> bool {
        self.temperature_cal.get()
    }
}

/// Four-channel RC input (AETR: roll 1, pitch 2, throttle 3, yaw 4),
/// sticks centred and throttle low
pub struct MockRc {
    pub valid: Cell<bool>,
    pub last_input_ms: Cell<u64>,
    pub calibrating: Cell<bool>,
    pub failsafe: Cell<bool>,
    pub roll_centred: Cell<bool>,
    pub pitch_centred: Cell<bool>,
    pub yaw_centred: Cell<bool>,
    pub throttle_at_minimum: Cell<bool>,
    pub disarm_switch: Cell<bool>,
    calibrations: RefCell<[Option<ChannelCalibration>; 4]>,
}

impl MockRc {
    pub fn new() -> Self {
        Self {
            valid: Cell::new(true),
            last_input_ms: Cell::new(0),
            calibrating: Cell::new(false),
            failsafe: Cell::new(false),
            roll_centred: Cell::new(true),
            pitch_centred: Cell::new(true),
            yaw_centred: Cell::new(true),
            throttle_at_minimum: Cell::new(true),
            disarm_switch: Cell::new(false),
            calibrations: RefCell::new([None; 4]),
        }
    }

    /// Set calibration of 1-based `channel`
    pub fn set_calibration(&self, channel: u8, min: u16, trim: u16, max: u16) {
        if let Some(slot) = self
            .calibrations
            .borrow_mut()
            .get_mut(usize::from(channel).wrapping_sub(1))
        {
            *slot = Some(ChannelCalibration { min, trim, max });
        }
    }
}

impl Default for MockRc {
    fn default() -> Self {
        Self::new()
    }
}

impl RcInput for MockRc {
    fn has_valid_input(&self) -> bool {
        self.valid.get()
    }

    fn last_input_ms(&self) -> u64 {
        self.last_input_ms.get()
    }

    fn calibrating(&self) -> bool {
        self.calibrating.get()
    }

    fn in_failsafe(&self) -> bool {
        self.failsafe.get()
    }

    fn channel_count(&self) -> u8 {
        4
    }

    fn calibration(&self, channel: u8) -> Option<ChannelCalibration> {
        self.calibrations
            .borrow()
            .get(usize::from(channel).wrapping_sub(1))
            .copied()
            .flatten()
    }

    fn channel_for(&self, axis: StickAxis) -> u8 {
        match axis {
            StickAxis::Roll => 1,
            StickAxis::Pitch => 2,
            StickAxis::Throttle => 3,
            StickAxis::Yaw => 4,
        }
    }

    fn centred(&self, axis: StickAxis) -> bool {
        match axis {
            StickAxis::Roll => self.roll_centred.get(),
            StickAxis::Pitch => self.pitch_centred.get(),
            StickAxis::Yaw => self.yaw_centred.get(),
            StickAxis::Throttle => self.throttle_at_minimum.get(),
        }
    }

    fn throttle_at_minimum(&self) -> bool {
        self.throttle_at_minimum.get()
    }

    fn disarm_switch_active(&self) -> bool {
        self.disarm_switch.get()
    }
}

/// Logger recording every arm event it is given
pub struct MockLogger {
    pub present: Cell<bool>,
    pub failed: Cell<bool>,
    pub card: Cell<bool>,
    pub downloading: Cell<bool>,
    /// Whether a start request actually starts logging
    pub starts_on_request: Cell<bool>,
    pub started: Cell<bool>,
    pub events: RefCell<Vec<ArmEvent>>,
    pub arming_failures: Cell<u32>,
    pub long_log_persist: Cell<Option<bool>>,
}

impl MockLogger {
    pub fn new() -> Self {
        Self {
            present: Cell::new(true),
            failed: Cell::new(false),
            card: Cell::new(true),
            downloading: Cell::new(false),
            starts_on_request: Cell::new(true),
            started: Cell::new(false),
            events: RefCell::new(Vec::new()),
            arming_failures: Cell::new(0),
            long_log_persist: Cell::new(None),
        }
    }

    pub fn last_event(&self) -> Option<ArmEvent> {
        self.events.borrow().last().copied()
    }
}

impl Default for MockLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ArmingLogger for MockLogger {
    fn logging_present(&self) -> bool {
        self.present.get()
    }

    fn logging_failed(&self) -> bool {
        self.failed.get()
    }

    fn card_inserted(&self) -> bool {
        self.card.get()
    }

    fn in_log_download(&self) -> bool {
        self.downloading.get()
    }

    fn prepare_for_arming(&self) {
        if self.starts_on_request.get() {
            self.started.set(true);
        }
    }

    fn logging_started(&self) -> bool {
        self.started.get()
    }

    fn write_arm_event(&self, event: &ArmEvent) {
        self.events.borrow_mut().push(*event);
    }

    fn write_arming_failure(&self) {
        self.arming_failures.set(self.arming_failures.get() + 1);
    }

    fn set_long_log_persist(&self, persist: bool) {
        self.long_log_persist.set(Some(persist));
    }
}

/// Mission with settable contents
pub struct MockMission {
    pub items: Cell<MissionItems>,
    pub rally: Cell<RallyState>,
    pub mode_requires_mission: Cell<bool>,
    pub command_count: Cell<u16>,
    pub terrain_items: Cell<bool>,
}

impl MockMission {
    pub fn new() -> Self {
        Self {
            items: Cell::new(MissionItems::empty()),
            rally: Cell::new(RallyState::Reachable),
            mode_requires_mission: Cell::new(false),
            command_count: Cell::new(0),
            terrain_items: Cell::new(false),
        }
    }
}

impl Default for MockMission {
    fn default() -> Self {
        Self::new()
    }
}

impl Mission for MockMission {
    fn contains_item(&self, item: MissionItems) -> bool {
        self.items.get().contains(item)
    }

    fn rally(&self) -> RallyState {
        self.rally.get()
    }

    fn mode_requires_mission(&self) -> bool {
        self.mode_requires_mission.get()
    }

    fn command_count(&self) -> u16 {
        self.command_count.get()
    }

    fn has_terrain_relative_items(&self) -> bool {
        self.terrain_items.get()
    }
}

/// GPS driver that is configured and ready unless told otherwise
#[derive(Default)]
pub struct MockGpsDriver {
    pub unconfigured: Cell<Option<u8>>,
    pub not_ready: Cell<bool>,
}

impl GpsDriver for MockGpsDriver {
    fn first_unconfigured(&self) -> Option<u8> {
        self.unconfigured.get()
    }

    fn prepare_for_arming(&self) -> bool {
        !self.not_ready.get()
    }
}

/// Terrain database
#[derive(Default)]
pub struct MockTerrain {
    pub enabled: Cell<bool>,
    pub health: MockHealth,
    pub reference_captures: Cell<u32>,
}

impl HealthCheck for MockTerrain {
    fn prearm_check(&self) -> Result<(), FailureText> {
        self.health.prearm_check()
    }
}

impl Terrain for MockTerrain {
    fn enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_reference_location(&self) {
        self.reference_captures.set(self.reference_captures.get() + 1);
    }
}

/// Geofence tracking auto enable/disable
#[derive(Default)]
pub struct MockFence {
    pub health: MockHealth,
    pub auto_enabled: Cell<bool>,
}

impl HealthCheck for MockFence {
    fn prearm_check(&self) -> Result<(), FailureText> {
        self.health.prearm_check()
    }
}

impl Fence for MockFence {
    fn auto_enable_on_arming(&self) {
        self.auto_enabled.set(true);
    }

    fn auto_disable_on_disarming(&self) {
        self.auto_enabled.set(false);
    }
}

/// Remote ID broadcaster
#[derive(Default)]
pub struct MockRemoteId {
    pub enabled: Cell<bool>,
    pub health: MockHealth,
}

impl HealthCheck for MockRemoteId {
    fn prearm_check(&self) -> Result<(), FailureText> {
        self.health.prearm_check()
    }
}

impl RemoteId for MockRemoteId {
    fn enabled(&self) -> bool {
        self.enabled.get()
    }
}
