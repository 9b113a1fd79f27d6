//! Arming Parameter Definitions
//!
//! # Parameters
//!
//! - `ARMING_CHECK` - Enabled check categories, bit 0 enables all (u32)
//! - `ARMING_REQUIRE` - Arming requirement policy (0 none, 1 min PWM, 2 zero PWM)
//! - `ARMING_RUDDER` - Rudder stick arming (0 disabled, 1 arm only, 2 arm or disarm)
//! - `ARMING_MIS_ITEMS` - Mission items required to arm (bitmask)
//! - `ARMING_OPTIONS` - Display options (bitmask)
//! - `ARMING_ACCTHRESH` - Accelerometer agreement threshold (m/s/s)
//! - `BRD_SAFETY_DISARM` - Re-engage the safety switch on disarm (0/1)
//!
//! # Example
//!
//! ```
//! use armgate_core::parameters::{ArmingParams, ParameterStore};
//!
//! let mut store = ParameterStore::new();
//! ArmingParams::register_defaults(&mut store).unwrap();
//! let params = ArmingParams::from_store(&store);
//! assert!(params.checks.contains_all());
//! ```

use bitflags::bitflags;

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::arming::check::CheckCategory;
use crate::arming::collaborators::MissionItems;

/// Default accelerometer agreement threshold (m/s/s)
pub const DEFAULT_ACCEL_THRESHOLD: f32 = 0.75;

/// ARMING_REQUIRE values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmingRequired {
    /// Vehicle behaves as permanently armed
    No = 0,
    /// Outputs held at minimum PWM while disarmed
    #[default]
    YesMinPwm = 1,
    /// Outputs held at zero PWM while disarmed
    YesZeroPwm = 2,
}

impl ArmingRequired {
    /// Decode a stored value, falling back to the default variant
    pub fn from_param(value: i32) -> Self {
        match value {
            0 => ArmingRequired::No,
            2 => ArmingRequired::YesZeroPwm,
            _ => ArmingRequired::YesMinPwm,
        }
    }
}

/// ARMING_RUDDER values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmingRudder {
    /// Disabled
    Disabled = 0,
    /// ArmOnly - only arm
    ArmOnly = 1,
    /// ArmOrDisarm - arm or disarm
    #[default]
    ArmOrDisarm = 2,
}

impl ArmingRudder {
    pub fn from_param(value: i32) -> Self {
        match value {
            0 => ArmingRudder::Disabled,
            1 => ArmingRudder::ArmOnly,
            _ => ArmingRudder::ArmOrDisarm,
        }
    }
}

bitflags! {
    /// ARMING_OPTIONS bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ArmingOptions: u32 {
        /// Do not display pre-arm failures; gating is unaffected
        const DISABLE_PREARM_DISPLAY = 1 << 0;
        /// No status text on arm/disarm transitions
        const DISABLE_STATUSTEXT_ON_STATE_CHANGE = 1 << 1;
    }
}

/// Arming parameters loaded from parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct ArmingParams {
    /// Enabled check categories (ARMING_CHECK)
    pub checks: CheckCategory,
    /// Requirement policy (ARMING_REQUIRE)
    pub require: ArmingRequired,
    /// Rudder stick arming (ARMING_RUDDER)
    pub rudder: ArmingRudder,
    /// Required mission items (ARMING_MIS_ITEMS)
    pub mission_items: MissionItems,
    /// Display options (ARMING_OPTIONS)
    pub options: ArmingOptions,
    /// Accelerometer agreement threshold (ARMING_ACCTHRESH)
    pub accel_threshold: f32,
    /// Force safety on after disarm (BRD_SAFETY_DISARM)
    pub safety_on_disarm: bool,
}

impl Default for ArmingParams {
    fn default() -> Self {
        Self {
            checks: CheckCategory::ALL,
            require: ArmingRequired::default(),
            rudder: ArmingRudder::default(),
            mission_items: MissionItems::empty(),
            options: ArmingOptions::empty(),
            accel_threshold: DEFAULT_ACCEL_THRESHOLD,
            safety_on_disarm: false,
        }
    }
}

impl ArmingParams {
    /// Register arming parameters with default values
    ///
    /// Parameters already present keep their stored values.
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let defaults = Self::default();

        store.register(
            "ARMING_CHECK",
            ParamValue::Int(defaults.checks.bits() as i32),
            ParamFlags::empty(),
        )?;
        store.register(
            "ARMING_REQUIRE",
            ParamValue::Int(defaults.require as i32),
            ParamFlags::empty(),
        )?;
        store.register(
            "ARMING_RUDDER",
            ParamValue::Int(defaults.rudder as i32),
            ParamFlags::empty(),
        )?;
        store.register("ARMING_MIS_ITEMS", ParamValue::Int(0), ParamFlags::empty())?;
        store.register("ARMING_OPTIONS", ParamValue::Int(0), ParamFlags::empty())?;
        store.register(
            "ARMING_ACCTHRESH",
            ParamValue::Float(defaults.accel_threshold),
            ParamFlags::empty(),
        )?;
        store.register("BRD_SAFETY_DISARM", ParamValue::Bool(false), ParamFlags::empty())?;

        Ok(())
    }

    /// Load arming parameters from parameter store
    ///
    /// Missing or ill-typed values fall back to defaults.
    pub fn from_store(store: &ParameterStore) -> Self {
        let defaults = Self::default();

        let checks = read_int(store, "ARMING_CHECK")
            .map(|v| CheckCategory::from_param(v as u32))
            .unwrap_or(defaults.checks);

        let require = read_int(store, "ARMING_REQUIRE")
            .map(ArmingRequired::from_param)
            .unwrap_or(defaults.require);

        let rudder = read_int(store, "ARMING_RUDDER")
            .map(ArmingRudder::from_param)
            .unwrap_or(defaults.rudder);

        let mission_items = read_int(store, "ARMING_MIS_ITEMS")
            .map(|v| MissionItems::from_bits_truncate(v as u32))
            .unwrap_or(defaults.mission_items);

        let options = read_int(store, "ARMING_OPTIONS")
            .map(|v| ArmingOptions::from_bits_truncate(v as u32))
            .unwrap_or(defaults.options);

        let accel_threshold = match store.get("ARMING_ACCTHRESH") {
            Some(ParamValue::Float(v)) => *v,
            Some(ParamValue::Int(v)) => *v as f32,
            _ => defaults.accel_threshold,
        };

        let safety_on_disarm = match store.get("BRD_SAFETY_DISARM") {
            Some(ParamValue::Bool(v)) => *v,
            Some(ParamValue::Int(v)) => *v != 0,
            _ => defaults.safety_on_disarm,
        };

        Self {
            checks,
            require,
            rudder,
            mission_items,
            options,
            accel_threshold,
            safety_on_disarm,
        }
    }

    pub fn prearm_display_disabled(&self) -> bool {
        self.options.contains(ArmingOptions::DISABLE_PREARM_DISPLAY)
    }

    pub fn state_change_text_disabled(&self) -> bool {
        self.options
            .contains(ArmingOptions::DISABLE_STATUSTEXT_ON_STATE_CHANGE)
    }
}

fn read_int(store: &ParameterStore, name: &str) -> Option<i32> {
    match store.get(name) {
        Some(ParamValue::Int(v)) => Some(*v),
        Some(ParamValue::Float(v)) => Some(*v as i32),
        Some(ParamValue::Bool(v)) => Some(i32::from(*v)),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_store() {
        let mut store = ParameterStore::new();
        ArmingParams::register_defaults(&mut store).unwrap();
        assert_eq!(ArmingParams::from_store(&store), ArmingParams::default());
        assert_eq!(store.len(), 7);
    }

    #[test]
    fn test_empty_store_gives_defaults() {
        let params = ArmingParams::from_store(&ParameterStore::new());
        assert!(params.checks.contains_all());
        assert_eq!(params.require, ArmingRequired::YesMinPwm);
        assert_eq!(params.rudder, ArmingRudder::ArmOrDisarm);
        assert!(!params.safety_on_disarm);
    }

    #[test]
    fn test_stored_values_loaded() {
        let mut store = ParameterStore::new();
        ArmingParams::register_defaults(&mut store).unwrap();
        store.set("ARMING_CHECK", ParamValue::Int(1 << 3)).unwrap();
        store.set("ARMING_REQUIRE", ParamValue::Int(0)).unwrap();
        store.set("ARMING_RUDDER", ParamValue::Int(1)).unwrap();
        store.set("ARMING_MIS_ITEMS", ParamValue::Int(0b1001)).unwrap();
        store.set("ARMING_OPTIONS", ParamValue::Int(0b11)).unwrap();
        store.set("BRD_SAFETY_DISARM", ParamValue::Int(1)).unwrap();

        let params = ArmingParams::from_store(&store);
        assert_eq!(params.checks, CheckCategory::GPS);
        assert_eq!(params.require, ArmingRequired::No);
        assert_eq!(params.rudder, ArmingRudder::ArmOnly);
        assert_eq!(
            params.mission_items,
            MissionItems::LAND | MissionItems::TAKEOFF
        );
        assert!(params.prearm_display_disabled());
        assert!(params.state_change_text_disabled());
        assert!(params.safety_on_disarm);
    }

    #[test]
    fn test_invalid_enum_values_fall_back() {
        assert_eq!(ArmingRequired::from_param(7), ArmingRequired::YesMinPwm);
        assert_eq!(ArmingRudder::from_param(-1), ArmingRudder::ArmOrDisarm);
    }

    #[test]
    fn test_ill_typed_value_falls_back() {
        let mut store = ParameterStore::new();
        store
            .register(
                "ARMING_ACCTHRESH",
                ParamValue::Bool(true),
                ParamFlags::empty(),
            )
            .unwrap();
        let params = ArmingParams::from_store(&store);
        assert_eq!(params.accel_threshold, DEFAULT_ACCEL_THRESHOLD);
    }
}
