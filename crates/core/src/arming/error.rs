//! Arming System Error Types
//!
//! Defines error types for arming and disarming requests.

use core::fmt;

/// Reasons an arm request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmingError {
    /// Vehicle is already armed
    AlreadyArmed,
    /// Rudder arming requested while ARMING_RUDDER disallows it
    RudderArmingDisabled,
    /// Mandatory, pre-arm or arm-time checks failed
    ChecksFailed,
}

impl fmt::Display for ArmingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmingError::AlreadyArmed => write!(f, "Vehicle is already armed"),
            ArmingError::RudderArmingDisabled => write!(f, "Rudder arming disabled"),
            ArmingError::ChecksFailed => write!(f, "Arming checks failed"),
        }
    }
}

impl core::error::Error for ArmingError {}

/// Reasons a disarm request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisarmError {
    /// Vehicle is not armed
    NotArmed,
    /// Rudder disarm requested while throttle is above minimum
    ThrottleNotLow,
    /// Rudder disarm requested while ARMING_RUDDER only allows arming
    RudderDisarmDisabled,
}

impl fmt::Display for DisarmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisarmError::NotArmed => write!(f, "Vehicle is not armed"),
            DisarmError::ThrottleNotLow => write!(f, "Cannot disarm: throttle not at minimum"),
            DisarmError::RudderDisarmDisabled => write!(f, "Disarm: rudder disarm disabled"),
        }
    }
}

impl core::error::Error for DisarmError {}
