//! Arm and disarm methods
//!
//! Every arm or disarm request names the method that triggered it. The
//! method selects rudder-specific rules and, on disarm, decides whether the
//! logger keeps recording after the flight.

use core::fmt;

/// What triggered an arm or disarm request (values as logged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ArmMethod {
    Rudder = 0,
    Mavlink = 1,
    AuxSwitch = 2,
    MotorTest = 3,
    Scripting = 4,
    Termination = 5,
    CpuFailsafe = 6,
    BatteryFailsafe = 7,
    SoloPauseWhenLanded = 8,
    Afs = 9,
    AdsbCollisionAction = 10,
    ParachuteRelease = 11,
    Crash = 12,
    Landed = 13,
    MissionExit = 14,
    FenceBreach = 15,
    RadioFailsafe = 16,
    DisarmDelay = 17,
    GcsFailsafe = 18,
    FailsafeActionTerminate = 20,
    TerrainFailsafe = 21,
    MotorDetectDone = 22,
    BadFlowOfControl = 23,
    EkfFailsafe = 24,
    GcsFailsafeSurfaceFailed = 25,
    GcsFailsafeHoldFailed = 26,
    TakeoffTimeout = 27,
    AutoLanded = 28,
    PilotInputFailsafe = 29,
    ToyModeLandThrottle = 30,
    ToyModeLandForce = 31,
    Landing = 32,
    DeadReckonFailsafe = 33,
    Blackbox = 34,
    Dds = 35,
    AutoArmOnce = 36,
    TurtleMode = 37,
    ToyMode = 38,
    Unknown = 100,
}

impl ArmMethod {
    pub fn is_rudder(self) -> bool {
        self == ArmMethod::Rudder
    }

    /// True for failsafe, crash and termination class disarms, after which
    /// the logger should keep recording.
    ///
    /// Pilot, mission and script initiated disarms return false.
    pub fn requests_extended_log_retention(self) -> bool {
        use ArmMethod::*;
        match self {
            Termination
            | CpuFailsafe
            | BatteryFailsafe
            | Afs
            | AdsbCollisionAction
            | ParachuteRelease
            | Crash
            | FenceBreach
            | RadioFailsafe
            | GcsFailsafe
            | FailsafeActionTerminate
            | TerrainFailsafe
            | BadFlowOfControl
            | EkfFailsafe
            | GcsFailsafeSurfaceFailed
            | GcsFailsafeHoldFailed
            | PilotInputFailsafe
            | DeadReckonFailsafe
            | Blackbox => true,

            Rudder
            | ToyMode
            | Mavlink
            | AuxSwitch
            | MotorTest
            | Scripting
            | SoloPauseWhenLanded
            | Landed
            | MissionExit
            | DisarmDelay
            | MotorDetectDone
            | TakeoffTimeout
            | AutoLanded
            | ToyModeLandThrottle
            | ToyModeLandForce
            | Landing
            | Dds
            | AutoArmOnce
            | TurtleMode
            | Unknown => false,
        }
    }
}

impl fmt::Display for ArmMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
