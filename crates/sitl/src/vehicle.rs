//! Simulated leaf collaborators.
//!
//! Each subsystem is a set of atomics (or a mutex-guarded reason) that a
//! test or the demo binary flips while the gate is running.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

use armgate_core::arming::collaborators::{
    ArmEvent, ArmingLogger, ChannelCalibration, Collaborators, GpsDriver, HealthCheck,
    InertialSensors, RcInput, SafetyInterlock, StickAxis,
};
use armgate_core::arming::status::{format_truncated, FailureText};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // State stays usable after a panicking test thread
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Generic leaf health with a settable failure reason.
#[derive(Debug, Default)]
pub struct SimHealth {
    reason: Mutex<Option<String>>,
}

impl SimHealth {
    pub fn set_failure(&self, reason: impl Into<String>) {
        *lock(&self.reason) = Some(reason.into());
    }

    pub fn clear(&self) {
        *lock(&self.reason) = None;
    }
}

impl HealthCheck for SimHealth {
    fn prearm_check(&self) -> Result<(), FailureText> {
        match lock(&self.reason).as_deref() {
            Some(reason) => Err(format_truncated(format_args!("{}", reason))),
            None => Ok(()),
        }
    }
}

/// Hardware safety switch and emergency stop.
#[derive(Debug, Default)]
pub struct SimSafety {
    pub engaged: AtomicBool,
    pub estopped: AtomicBool,
}

impl SafetyInterlock for SimSafety {
    fn safety_engaged(&self) -> bool {
        self.engaged.load(Ordering::Relaxed)
    }

    fn emergency_stopped(&self) -> bool {
        self.estopped.load(Ordering::Relaxed)
    }

    fn force_safety_on(&self) {
        self.engaged.store(true, Ordering::Relaxed);
    }
}

/// Inertial sensors.
#[derive(Debug)]
pub struct SimIns {
    pub healthy: AtomicBool,
    pub calibrated: AtomicBool,
    pub consistent: AtomicBool,
    pub sensor_count: AtomicU8,
}

impl SimIns {
    pub fn new(sensor_count: u8) -> Self {
        Self {
            healthy: AtomicBool::new(true),
            calibrated: AtomicBool::new(true),
            consistent: AtomicBool::new(true),
            sensor_count: AtomicU8::new(sensor_count),
        }
    }
}

impl InertialSensors for SimIns {
    fn gyros_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    fn gyros_calibrated(&self) -> bool {
        self.calibrated.load(Ordering::Relaxed)
    }

    fn accels_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    fn accels_calibrated(&self) -> bool {
        self.calibrated.load(Ordering::Relaxed)
    }

    fn accel_cal_requires_reboot(&self) -> bool {
        false
    }

    fn gyro_count(&self) -> u8 {
        self.sensor_count.load(Ordering::Relaxed)
    }

    fn accel_count(&self) -> u8 {
        self.sensor_count.load(Ordering::Relaxed)
    }

    fn accels_consistent(&self, _threshold: f32) -> bool {
        self.consistent.load(Ordering::Relaxed)
    }

    fn gyros_consistent(&self, _threshold_dps: f32) -> bool {
        self.consistent.load(Ordering::Relaxed)
    }

    fn temperature_cal_running(&self) -> bool {
        false
    }
}

/// Four-channel transmitter with sticks centred and throttle low.
#[derive(Debug)]
pub struct SimRc {
    pub valid: AtomicBool,
    pub last_input_ms: AtomicU64,
    pub calibrating: AtomicBool,
    pub failsafe: AtomicBool,
    pub sticks_centred: AtomicBool,
    pub throttle_low: AtomicBool,
}

impl Default for SimRc {
    fn default() -> Self {
        Self {
            valid: AtomicBool::new(true),
            last_input_ms: AtomicU64::new(0),
            calibrating: AtomicBool::new(false),
            failsafe: AtomicBool::new(false),
            sticks_centred: AtomicBool::new(true),
            throttle_low: AtomicBool::new(true),
        }
    }
}

impl RcInput for SimRc {
    fn has_valid_input(&self) -> bool {
        self.valid.load(Ordering::Relaxed)
    }

    fn last_input_ms(&self) -> u64 {
        self.last_input_ms.load(Ordering::Relaxed)
    }

    fn calibrating(&self) -> bool {
        self.calibrating.load(Ordering::Relaxed)
    }

    fn in_failsafe(&self) -> bool {
        self.failsafe.load(Ordering::Relaxed)
    }

    fn channel_count(&self) -> u8 {
        4
    }

    fn calibration(&self, _channel: u8) -> Option<ChannelCalibration> {
        Some(ChannelCalibration {
            min: 1000,
            trim: 1500,
            max: 2000,
        })
    }

    fn channel_for(&self, axis: StickAxis) -> u8 {
        match axis {
            StickAxis::Roll => 1,
            StickAxis::Pitch => 2,
            StickAxis::Throttle => 3,
            StickAxis::Yaw => 4,
        }
    }

    fn centred(&self, _axis: StickAxis) -> bool {
        self.sticks_centred.load(Ordering::Relaxed)
    }

    fn throttle_at_minimum(&self) -> bool {
        self.throttle_low.load(Ordering::Relaxed)
    }
}

/// Onboard logger keeping every arm/disarm record.
#[derive(Debug)]
pub struct SimLogger {
    pub present: AtomicBool,
    pub started: AtomicBool,
    pub arming_failures: AtomicU32,
    pub long_log_persist: AtomicBool,
    events: Mutex<Vec<ArmEvent>>,
}

impl SimLogger {
    pub fn events(&self) -> Vec<ArmEvent> {
        lock(&self.events).clone()
    }
}

impl Default for SimLogger {
    fn default() -> Self {
        Self {
            present: AtomicBool::new(true),
            started: AtomicBool::new(false),
            arming_failures: AtomicU32::new(0),
            long_log_persist: AtomicBool::new(false),
            events: Mutex::new(Vec::new()),
        }
    }
}

impl ArmingLogger for SimLogger {
    fn logging_present(&self) -> bool {
        self.present.load(Ordering::Relaxed)
    }

    fn logging_failed(&self) -> bool {
        false
    }

    fn card_inserted(&self) -> bool {
        true
    }

    fn in_log_download(&self) -> bool {
        false
    }

    fn prepare_for_arming(&self) {
        self.started.store(true, Ordering::Relaxed);
    }

    fn logging_started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    fn write_arm_event(&self, event: &ArmEvent) {
        tracing::debug!(?event, "arm event");
        lock(&self.events).push(*event);
    }

    fn write_arming_failure(&self) {
        self.arming_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn set_long_log_persist(&self, persist: bool) {
        self.long_log_persist.store(persist, Ordering::Relaxed);
    }
}

/// GPS driver whose receivers are configured and ready.
#[derive(Debug)]
pub struct SimGps {
    pub configured: AtomicBool,
    pub ready: AtomicBool,
}

impl Default for SimGps {
    fn default() -> Self {
        Self {
            configured: AtomicBool::new(true),
            ready: AtomicBool::new(true),
        }
    }
}

impl GpsDriver for SimGps {
    fn first_unconfigured(&self) -> Option<u8> {
        (!self.configured.load(Ordering::Relaxed)).then_some(0)
    }

    fn prepare_for_arming(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}

/// A simulated vehicle: every collaborator the gate consults.
#[derive(Debug)]
pub struct SimVehicle {
    pub safety: SimSafety,
    pub baro: SimHealth,
    pub ins: SimIns,
    pub compass: SimHealth,
    pub gps: SimHealth,
    pub gps_driver: SimGps,
    pub battery: SimHealth,
    pub logger: SimLogger,
    pub rc: SimRc,
}

impl SimVehicle {
    /// Healthy vehicle with `imu_count` inertial sensors
    pub fn new(imu_count: u8) -> Self {
        Self {
            safety: SimSafety::default(),
            baro: SimHealth::default(),
            ins: SimIns::new(imu_count),
            compass: SimHealth::default(),
            gps: SimHealth::default(),
            gps_driver: SimGps::default(),
            battery: SimHealth::default(),
            logger: SimLogger::default(),
            rc: SimRc::default(),
        }
    }

    /// Collaborator set for [`armgate_core::arming::ArmingSystem::new`]
    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            safety: Some(&self.safety),
            baro: Some(&self.baro),
            ins: Some(&self.ins),
            compass: Some(&self.compass),
            gps: Some(&self.gps),
            gps_driver: Some(&self.gps_driver),
            battery: Some(&self.battery),
            logger: Some(&self.logger),
            rc: Some(&self.rc),
            ..Default::default()
        }
    }
}

impl Default for SimVehicle {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_reason_round_trip() {
        let health = SimHealth::default();
        assert!(health.prearm_check().is_ok());

        health.set_failure("Bad fix");
        assert_eq!(health.prearm_check().unwrap_err().as_str(), "Bad fix");

        health.clear();
        assert!(health.prearm_check().is_ok());
    }

    #[test]
    fn test_logger_starts_on_prepare() {
        let logger = SimLogger::default();
        assert!(!logger.logging_started());
        logger.prepare_for_arming();
        assert!(logger.logging_started());
    }

    #[test]
    fn test_gps_reports_first_unconfigured() {
        let gps = SimGps::default();
        assert_eq!(gps.first_unconfigured(), None);
        gps.configured.store(false, Ordering::Relaxed);
        assert_eq!(gps.first_unconfigured(), Some(0));
    }
}
