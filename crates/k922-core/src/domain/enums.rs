//! Static value lists for the K922 COM1 configuration.
//!
//! These lists populate the panel's select boxes and checkbox groups, and are
//! the reference domains used by [`Configuration::validate`] when strict
//! import is enabled.  The order of each list is the display order.
//!
//! [`Configuration::validate`]: crate::domain::config::Configuration::validate

/// GNSS constellations the receiver can track.
pub const CONSTELLATIONS: &[&str] = &["GPS", "BDS-2", "BDS-3", "GLONASS", "GALILEO", "QZSS", "SBAS"];

/// Baud rates supported on COM1.
pub const SERIAL_BAUDRATES: &[u32] = &[9600, 19200, 38400, 57600, 115200, 230400];

/// Position / NMEA output rates in Hz.
pub const RATES_POSITION: &[u32] = &[1, 2, 5, 10, 20];

/// IMU output rates in Hz.
pub const RATES_IMU: &[u32] = &[1, 2, 5, 10, 20, 50];

/// NMEA talker prefixes.
pub const NMEA_TALKERS: &[&str] = &["GN", "GP"];

/// NMEA sentence types that can be enabled on COM1.
pub const NMEA_MESSAGES: &[&str] = &["GGA", "GSA", "GSV", "GLL", "GST", "HDT", "RMC", "VTG", "ZDA"];

/// RTCM message IDs emitted in base mode.
pub const RTCM_MESSAGES: &[&str] = &[
    "1004", "1005", "1006", "1012", "1033", "1074", "1084", "1094", "1124", "1230", "4078",
];

/// How the backend reaches the receiver.
pub const TRANSPORT_TYPES: &[&str] = &["serial", "tcp"];

/// Roles COM1 can be assigned.
pub const COM1_ROLES: &[&str] = &["nmea_out", "rtcm_in", "rtcm_out", "nmea_rtcm_out"];

/// Positioning modes.
pub const RTK_MODES: &[&str] = &["standalone", "rover", "base"];

/// Where correction data enters the receiver.
pub const CORRECTION_SOURCES: &[&str] = &["none", "com1", "ntrip"];

/// Correction data formats.
pub const CORRECTION_FORMATS: &[&str] = &["RTCM3", "RTCM2", "CMR"];

/// INS fusion priority policies.
pub const INS_PRIORITIES: &[&str] = &["prefer_gnss", "prefer_ins", "gnss_only"];

/// One entry of a select box: the submitted value and the text shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    /// An option whose label is its value.
    pub fn plain(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }

    /// An option whose label is the value followed by a unit, e.g. `"5 Hz"`.
    pub fn with_unit(value: u32, unit: &str) -> Self {
        Self {
            value: value.to_string(),
            label: format!("{value} {unit}"),
        }
    }
}

/// Builds plain options from a string list.
pub fn plain_options(values: &[&str]) -> Vec<SelectOption> {
    values.iter().map(|v| SelectOption::plain(v)).collect()
}

/// Builds unit-labelled options from a numeric list.
pub fn unit_options(values: &[u32], unit: &str) -> Vec<SelectOption> {
    values.iter().map(|v| SelectOption::with_unit(*v, unit)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_sizes_match_receiver_capabilities() {
        assert_eq!(CONSTELLATIONS.len(), 7);
        assert_eq!(RTCM_MESSAGES.len(), 11);
        assert_eq!(NMEA_MESSAGES.len(), 9);
        assert_eq!(SERIAL_BAUDRATES.len(), 6);
    }

    #[test]
    fn test_imu_rates_extend_position_rates_with_50hz() {
        assert!(RATES_POSITION.iter().all(|r| RATES_IMU.contains(r)));
        assert_eq!(RATES_IMU.last(), Some(&50));
    }

    #[test]
    fn test_unit_options_label_baud_rates() {
        // Act
        let opts = unit_options(SERIAL_BAUDRATES, "bps");

        // Assert
        assert_eq!(opts.len(), SERIAL_BAUDRATES.len());
        assert_eq!(opts[4].value, "115200");
        assert_eq!(opts[4].label, "115200 bps");
    }

    #[test]
    fn test_plain_options_use_value_as_label() {
        let opts = plain_options(NMEA_TALKERS);
        assert_eq!(opts[0], SelectOption::plain("GN"));
        assert_eq!(opts[1].label, "GP");
    }
}
