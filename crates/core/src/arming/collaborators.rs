//! Collaborator interfaces
//!
//! The gate does not know how a GPS judges its fix or how a battery monitor
//! estimates charge. Each subsystem is reached through one of the traits
//! below; an absent collaborator is an automatic pass.

use bitflags::bitflags;

use super::check::CheckCategory;
use super::method::ArmMethod;
use super::status::FailureText;

/// Uniform leaf health check
pub trait HealthCheck {
    /// `Err` carries the human-readable reason for the failure
    fn prearm_check(&self) -> Result<(), FailureText>;
}

/// Hardware safety switch and emergency stop
pub trait SafetyInterlock {
    /// True while the safety switch holds outputs disabled
    fn safety_engaged(&self) -> bool;

    fn emergency_stopped(&self) -> bool;

    /// True if an RC switch assigned to emergency stop is in the stop
    /// position, which explains an emergency stop
    fn estop_switch_active(&self) -> bool {
        false
    }

    /// Re-engage the safety switch
    fn force_safety_on(&self);
}

/// Inertial sensor set
pub trait InertialSensors {
    fn gyros_healthy(&self) -> bool;
    fn gyros_calibrated(&self) -> bool;
    fn accels_healthy(&self) -> bool;
    fn accels_calibrated(&self) -> bool;
    fn accel_cal_requires_reboot(&self) -> bool;
    fn gyro_count(&self) -> u8;
    fn accel_count(&self) -> u8;
    /// All accelerometers agree within `threshold` m/s/s
    fn accels_consistent(&self, threshold: f32) -> bool;
    /// All gyros agree within `threshold_dps` deg/s
    fn gyros_consistent(&self, threshold_dps: f32) -> bool;
    fn temperature_cal_running(&self) -> bool;
}

/// Primary stick axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickAxis {
    Roll,
    Pitch,
    Throttle,
    Yaw,
}

impl StickAxis {
    pub const fn name(self) -> &'static str {
        match self {
            StickAxis::Roll => "Roll",
            StickAxis::Pitch => "Pitch",
            StickAxis::Throttle => "Throttle",
            StickAxis::Yaw => "Yaw",
        }
    }
}

/// Channel calibration (PWM microseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCalibration {
    pub min: u16,
    pub trim: u16,
    pub max: u16,
}

/// RC receiver input
pub trait RcInput {
    /// Any valid frame received since boot
    fn has_valid_input(&self) -> bool;
    fn last_input_ms(&self) -> u64;
    /// Stick calibration in progress
    fn calibrating(&self) -> bool;
    fn in_failsafe(&self) -> bool;
    fn channel_count(&self) -> u8;
    /// Calibration of 1-based `channel`
    fn calibration(&self, channel: u8) -> Option<ChannelCalibration>;
    /// 1-based channel assigned to `axis`
    fn channel_for(&self, axis: StickAxis) -> u8;
    /// Roll, pitch or yaw stick inside its dead zone
    fn centred(&self, axis: StickAxis) -> bool;
    fn throttle_at_minimum(&self) -> bool;
    /// Whether arming requires zero throttle
    fn throttle_check_required(&self) -> bool {
        true
    }
    /// Stick used for rudder arming, ignored by the neutral check
    fn arming_axis(&self) -> StickAxis {
        StickAxis::Yaw
    }
    /// An RC switch configured to hold the vehicle disarmed is on
    fn disarm_switch_active(&self) -> bool {
        false
    }
}

bitflags! {
    /// Mission items that must be present (ARMING_MIS_ITEMS)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MissionItems: u32 {
        const LAND = 1 << 0;
        const VTOL_LAND = 1 << 1;
        const DO_LAND_START = 1 << 2;
        const TAKEOFF = 1 << 3;
        const VTOL_TAKEOFF = 1 << 4;
        const RALLY = 1 << 5;
        const RTL = 1 << 6;
    }
}

impl MissionItems {
    /// Items checked against the mission itself, with their display names
    pub const COMMAND_ITEMS: [(MissionItems, &'static str); 6] = [
        (MissionItems::LAND, "land"),
        (MissionItems::VTOL_LAND, "vtol land"),
        (MissionItems::DO_LAND_START, "do land start"),
        (MissionItems::TAKEOFF, "takeoff"),
        (MissionItems::VTOL_TAKEOFF, "vtol takeoff"),
        (MissionItems::RTL, "RTL"),
    ];
}

/// Rally point state relative to the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RallyState {
    /// A rally point is close enough
    Reachable,
    /// No rally point within range
    TooFar,
    /// Vehicle position unknown
    NoPosition,
}

/// Stored mission
pub trait Mission {
    fn contains_item(&self, item: MissionItems) -> bool;
    fn rally(&self) -> RallyState;
    /// Current mode cannot run without a mission
    fn mode_requires_mission(&self) -> bool {
        false
    }
    fn command_count(&self) -> u16;
    /// Any item altitude is terrain relative
    fn has_terrain_relative_items(&self) -> bool {
        false
    }
}

/// GPS driver configuration state
pub trait GpsDriver {
    /// 0-based index of the first receiver still being configured
    fn first_unconfigured(&self) -> Option<u8>;
    /// Final preparation at the arm moment
    fn prepare_for_arming(&self) -> bool;
}

/// Structured arm/disarm log record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmEvent {
    pub timestamp_us: u64,
    pub armed: bool,
    pub enabled_checks: CheckCategory,
    pub forced: bool,
    pub method: ArmMethod,
}

/// Onboard logger
pub trait ArmingLogger {
    /// Logging is configured on this vehicle
    fn logging_present(&self) -> bool;
    fn logging_failed(&self) -> bool;
    fn card_inserted(&self) -> bool;
    fn in_log_download(&self) -> bool;
    /// Request that logging starts for the coming flight
    fn prepare_for_arming(&self);
    fn logging_started(&self) -> bool;
    fn write_arm_event(&self, event: &ArmEvent);
    fn write_arming_failure(&self);
    /// Keep logging after disarm
    fn set_long_log_persist(&self, persist: bool);
}

/// Terrain database
pub trait Terrain: HealthCheck {
    fn enabled(&self) -> bool;
    /// Capture the arming location as terrain reference
    fn set_reference_location(&self);
}

/// Geofence
pub trait Fence: HealthCheck {
    fn auto_enable_on_arming(&self);
    fn auto_disable_on_disarming(&self);
}

/// Remote identification broadcaster
pub trait RemoteId: HealthCheck {
    /// Remote ID is mandated on this vehicle
    fn enabled(&self) -> bool;
}

/// The collaborators present on this vehicle.
///
/// The registry is built from whichever fields are `Some`.
#[derive(Default, Clone, Copy)]
pub struct Collaborators<'a> {
    pub safety: Option<&'a dyn SafetyInterlock>,
    pub baro: Option<&'a dyn HealthCheck>,
    pub airspeed: Option<&'a dyn HealthCheck>,
    pub ins: Option<&'a dyn InertialSensors>,
    pub compass: Option<&'a dyn HealthCheck>,
    pub gps: Option<&'a dyn HealthCheck>,
    pub gps_driver: Option<&'a dyn GpsDriver>,
    pub battery: Option<&'a dyn HealthCheck>,
    pub logger: Option<&'a dyn ArmingLogger>,
    pub rc: Option<&'a dyn RcInput>,
    pub mission: Option<&'a dyn Mission>,
    pub rangefinder: Option<&'a dyn HealthCheck>,
    pub board_voltage: Option<&'a dyn HealthCheck>,
    pub system: Option<&'a dyn HealthCheck>,
    pub terrain: Option<&'a dyn Terrain>,
    pub can: Option<&'a dyn HealthCheck>,
    pub proximity: Option<&'a dyn HealthCheck>,
    pub camera: Option<&'a dyn HealthCheck>,
    pub visual_odometry: Option<&'a dyn HealthCheck>,
    pub fence: Option<&'a dyn Fence>,
    pub remote_id: Option<&'a dyn RemoteId>,
    pub serial_protocol: Option<&'a dyn HealthCheck>,
}
