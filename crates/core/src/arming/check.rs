//! Check categories (ARMING_CHECK bitmask)
//!
//! Every optional check is identified by one bit of the enable mask. Bit 0
//! is the ALL override: when set, every category evaluates as enabled
//! regardless of its own bit.

use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// Pre-arm check categories, ArduPilot ARMING_CHECK bit layout
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CheckCategory: u32 {
        /// Override: every category enabled
        const ALL = 1 << 0;
        const BARO = 1 << 1;
        const COMPASS = 1 << 2;
        const GPS = 1 << 3;
        const INS = 1 << 4;
        const PARAMETERS = 1 << 5;
        const RC = 1 << 6;
        /// Board voltage
        const VOLTAGE = 1 << 7;
        const BATTERY = 1 << 8;
        const AIRSPEED = 1 << 9;
        const LOGGING = 1 << 10;
        /// Hardware safety switch
        const SWITCH = 1 << 11;
        const GPS_CONFIG = 1 << 12;
        const SYSTEM = 1 << 13;
        const MISSION = 1 << 14;
        const RANGEFINDER = 1 << 15;
        const CAMERA = 1 << 16;
        const AUX_AUTH = 1 << 17;
        /// Visual odometry
        const VISION = 1 << 18;
        const FFT = 1 << 19;
        const OSD = 1 << 20;
    }
}

const LABELS: &[(CheckCategory, &str)] = &[
    (CheckCategory::ALL, "All"),
    (CheckCategory::BARO, "Baro"),
    (CheckCategory::COMPASS, "Compass"),
    (CheckCategory::GPS, "GPS"),
    (CheckCategory::INS, "INS"),
    (CheckCategory::PARAMETERS, "Parameters"),
    (CheckCategory::RC, "RC"),
    (CheckCategory::VOLTAGE, "Voltage"),
    (CheckCategory::BATTERY, "Battery"),
    (CheckCategory::AIRSPEED, "Airspeed"),
    (CheckCategory::LOGGING, "Logging"),
    (CheckCategory::SWITCH, "Safety Switch"),
    (CheckCategory::GPS_CONFIG, "GPS Config"),
    (CheckCategory::SYSTEM, "System"),
    (CheckCategory::MISSION, "Mission"),
    (CheckCategory::RANGEFINDER, "Rangefinder"),
    (CheckCategory::CAMERA, "Camera"),
    (CheckCategory::AUX_AUTH, "AuxAuth"),
    (CheckCategory::VISION, "Vision"),
    (CheckCategory::FFT, "FFT"),
    (CheckCategory::OSD, "OSD"),
];

impl CheckCategory {
    /// Mask as stored in the ARMING_CHECK parameter; unknown bits are dropped
    pub fn from_param(raw: u32) -> Self {
        Self::from_bits_truncate(raw)
    }

    /// True if the ALL override bit is set
    pub fn contains_all(self) -> bool {
        self.contains(Self::ALL)
    }

    /// True if `check` evaluates as enabled under this mask.
    ///
    /// An empty `check` (uncategorised) is always enabled.
    pub fn enables(self, check: CheckCategory) -> bool {
        self.contains_all() || self.contains(check)
    }

    /// Human-readable label of a single category
    pub fn label(self) -> Option<&'static str> {
        LABELS
            .iter()
            .find(|(category, _)| *category == self)
            .map(|(_, label)| *label)
    }
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "None");
        }
        let mut first = true;
        for (category, label) in LABELS {
            if self.contains(*category) {
                if !first {
                    write!(f, ",")?;
                }
                write!(f, "{}", label)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn test_individual_bits_enable_only_themselves() {
        let mask = CheckCategory::BATTERY | CheckCategory::INS | CheckCategory::RC;

        assert!(mask.enables(CheckCategory::BATTERY));
        assert!(mask.enables(CheckCategory::INS));
        assert!(mask.enables(CheckCategory::RC));

        assert!(!mask.enables(CheckCategory::GPS));
        assert!(!mask.enables(CheckCategory::COMPASS));
    }

    #[test]
    fn test_all_bit_enables_everything() {
        let mask = CheckCategory::ALL;
        assert!(mask.contains_all());
        for (category, _) in LABELS {
            assert!(mask.enables(*category));
        }
    }

    #[test]
    fn test_empty_mask_enables_only_uncategorised() {
        let mask = CheckCategory::empty();
        assert!(!mask.enables(CheckCategory::BATTERY));
        assert!(!mask.enables(CheckCategory::AUX_AUTH));
        assert!(mask.enables(CheckCategory::empty()));
    }

    #[test]
    fn test_from_param_drops_unknown_bits() {
        let mask = CheckCategory::from_param(0x8000_0002);
        assert_eq!(mask, CheckCategory::BARO);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CheckCategory::empty()), "None");
        assert_eq!(
            format!("{}", CheckCategory::GPS | CheckCategory::SWITCH),
            "GPS,Safety Switch"
        );
        assert_eq!(CheckCategory::AUX_AUTH.label(), Some("AuxAuth"));
        assert_eq!((CheckCategory::GPS | CheckCategory::BARO).label(), None);
    }
}
