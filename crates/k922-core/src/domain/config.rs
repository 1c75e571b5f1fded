//! The K922 COM1 configuration aggregate.
//!
//! [`Configuration`] is the document the panel sends to the backend in an
//! `applyK922Config` message and writes to `k922_com1_config.json`.  It is
//! rebuilt from the form on every export or apply; nothing diffs or merges
//! configurations, each apply replaces the backend's configuration.
//!
//! # JSON shape
//!
//! Field names are camelCase on the wire and keys appear in declaration order:
//!
//! ```json
//! {
//!   "device": "K922",
//!   "version": 1,
//!   "com": { "singlePort": "COM1", "com1": { "role": "nmea_out" } },
//!   "connection": { "backendUrl": "", "transportType": "serial", ... },
//!   "gnss": { ... },
//!   "nmea": { ... },
//!   "imu": { ... }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enums::{
    COM1_ROLES, CONSTELLATIONS, CORRECTION_FORMATS, CORRECTION_SOURCES, INS_PRIORITIES,
    NMEA_MESSAGES, NMEA_TALKERS, RATES_IMU, RATES_POSITION, RTCM_MESSAGES, RTK_MODES,
    SERIAL_BAUDRATES, TRANSPORT_TYPES,
};

/// Device identifier written into every configuration.
pub const DEVICE: &str = "K922";

/// Current configuration schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// The receiver's only physical port.
pub const SINGLE_PORT: &str = "COM1";

/// A field of an imported configuration that lies outside its enumeration.
///
/// Only produced by [`Configuration::validate`]; the default import path
/// applies values verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {value} is not an accepted value")]
pub struct InvalidField {
    /// Dotted JSON path of the offending field, e.g. `"gnss.rateHz"`.
    pub field: &'static str,
    /// The rejected value as it would appear in the document.
    pub value: String,
}

/// Top-level K922 configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Always [`DEVICE`].
    pub device: String,
    /// Always [`SCHEMA_VERSION`] for documents built by this crate.
    pub version: u32,
    pub com: ComSettings,
    pub connection: ConnectionSettings,
    pub gnss: GnssSettings,
    pub nmea: NmeaSettings,
    pub imu: ImuSettings,
}

/// Port assignment.  The K922 has exactly one port, multiplexed by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComSettings {
    /// Always [`SINGLE_PORT`].
    pub single_port: String,
    pub com1: Com1Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Com1Settings {
    /// One of [`COM1_ROLES`].
    pub role: String,
}

/// How the backend reaches the receiver, and where the backend lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSettings {
    pub backend_url: String,
    /// One of [`TRANSPORT_TYPES`].
    pub transport_type: String,
    /// Serial device path on the backend host, e.g. `/dev/ttyS0`.
    pub serial_port: String,
    /// One of [`SERIAL_BAUDRATES`].
    pub serial_baud: i64,
    pub tcp_port: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GnssSettings {
    /// Subset of [`CONSTELLATIONS`], in display order.
    pub constellations_enabled: Vec<String>,
    /// One of [`RTK_MODES`].
    pub mode: String,
    /// One of [`RATES_POSITION`].
    pub rate_hz: i64,
    pub baseline_km: f64,
    pub corr_in: CorrectionInput,
    /// Subset of [`RTCM_MESSAGES`], in display order.
    pub rtcm_base_messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionInput {
    /// One of [`CORRECTION_SOURCES`].
    pub source: String,
    /// One of [`CORRECTION_FORMATS`].
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NmeaSettings {
    /// One of [`NMEA_TALKERS`].
    pub talker: String,
    /// One of [`RATES_POSITION`].
    pub base_rate_hz: i64,
    /// Subset of [`NMEA_MESSAGES`], in display order.
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImuSettings {
    pub enabled: bool,
    /// One of [`RATES_IMU`].
    pub rate_hz: i64,
    pub ins_fusion: InsFusion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsFusion {
    /// One of [`INS_PRIORITIES`].
    pub priority: String,
    /// Longest GNSS outage, in seconds, the INS solution bridges on its own.
    pub max_gap_no_gnss_sec: f64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Values used when the corresponding form input is empty or missing.
pub mod defaults {
    pub const BACKEND_URL: &str = "";
    pub const TRANSPORT_TYPE: &str = "serial";
    pub const SERIAL_PORT: &str = "/dev/ttyS0";
    pub const SERIAL_BAUD: i64 = 115200;
    pub const TCP_PORT: i64 = 7001;
    pub const COM1_ROLE: &str = "nmea_out";
    pub const RTK_MODE: &str = "standalone";
    pub const RTK_RATE_HZ: i64 = 5;
    pub const RTK_BASELINE_KM: f64 = 10.0;
    pub const CORR_IN_SOURCE: &str = "none";
    pub const CORR_IN_FORMAT: &str = "RTCM3";
    pub const NMEA_TALKER: &str = "GN";
    pub const NMEA_RATE_HZ: i64 = 1;
    pub const IMU_ENABLED: bool = true;
    pub const IMU_RATE_HZ: i64 = 5;
    pub const INS_PRIORITY: &str = "prefer_gnss";
    pub const INS_MAX_GAP_SEC: f64 = 30.0;
}

impl Default for Configuration {
    /// The configuration an empty form collects to: every documented default
    /// and no constellations, RTCM or NMEA messages selected.
    fn default() -> Self {
        Self {
            device: DEVICE.to_string(),
            version: SCHEMA_VERSION,
            com: ComSettings {
                single_port: SINGLE_PORT.to_string(),
                com1: Com1Settings {
                    role: defaults::COM1_ROLE.to_string(),
                },
            },
            connection: ConnectionSettings {
                backend_url: defaults::BACKEND_URL.to_string(),
                transport_type: defaults::TRANSPORT_TYPE.to_string(),
                serial_port: defaults::SERIAL_PORT.to_string(),
                serial_baud: defaults::SERIAL_BAUD,
                tcp_port: defaults::TCP_PORT,
            },
            gnss: GnssSettings {
                constellations_enabled: Vec::new(),
                mode: defaults::RTK_MODE.to_string(),
                rate_hz: defaults::RTK_RATE_HZ,
                baseline_km: defaults::RTK_BASELINE_KM,
                corr_in: CorrectionInput {
                    source: defaults::CORR_IN_SOURCE.to_string(),
                    format: defaults::CORR_IN_FORMAT.to_string(),
                },
                rtcm_base_messages: Vec::new(),
            },
            nmea: NmeaSettings {
                talker: defaults::NMEA_TALKER.to_string(),
                base_rate_hz: defaults::NMEA_RATE_HZ,
                messages: Vec::new(),
            },
            imu: ImuSettings {
                enabled: defaults::IMU_ENABLED,
                rate_hz: defaults::IMU_RATE_HZ,
                ins_fusion: InsFusion {
                    priority: defaults::INS_PRIORITY.to_string(),
                    max_gap_no_gnss_sec: defaults::INS_MAX_GAP_SEC,
                },
            },
        }
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

impl Configuration {
    /// Checks every enum-valued field against its enumeration, and `tcpPort`
    /// against the TCP port range.
    ///
    /// The other free-form fields (`backendUrl`, `serialPort`, `baselineKm`,
    /// `maxGapNoGnssSec`) are not checked.
    ///
    /// # Errors
    ///
    /// Returns the first field, in declaration order, whose value is not a
    /// member of its enumeration.
    pub fn validate(&self) -> Result<(), InvalidField> {
        check_str("device", &self.device, &[DEVICE])?;
        if self.version != SCHEMA_VERSION {
            return Err(InvalidField {
                field: "version",
                value: self.version.to_string(),
            });
        }
        check_str("com.singlePort", &self.com.single_port, &[SINGLE_PORT])?;
        check_str("com.com1.role", &self.com.com1.role, COM1_ROLES)?;

        let c = &self.connection;
        check_str("connection.transportType", &c.transport_type, TRANSPORT_TYPES)?;
        check_num("connection.serialBaud", c.serial_baud, SERIAL_BAUDRATES)?;
        if !(1..=i64::from(u16::MAX)).contains(&c.tcp_port) {
            return Err(InvalidField {
                field: "connection.tcpPort",
                value: c.tcp_port.to_string(),
            });
        }

        let g = &self.gnss;
        check_set("gnss.constellationsEnabled", &g.constellations_enabled, CONSTELLATIONS)?;
        check_str("gnss.mode", &g.mode, RTK_MODES)?;
        check_num("gnss.rateHz", g.rate_hz, RATES_POSITION)?;
        check_str("gnss.corrIn.source", &g.corr_in.source, CORRECTION_SOURCES)?;
        check_str("gnss.corrIn.format", &g.corr_in.format, CORRECTION_FORMATS)?;
        check_set("gnss.rtcmBaseMessages", &g.rtcm_base_messages, RTCM_MESSAGES)?;

        let n = &self.nmea;
        check_str("nmea.talker", &n.talker, NMEA_TALKERS)?;
        check_num("nmea.baseRateHz", n.base_rate_hz, RATES_POSITION)?;
        check_set("nmea.messages", &n.messages, NMEA_MESSAGES)?;

        let i = &self.imu;
        check_num("imu.rateHz", i.rate_hz, RATES_IMU)?;
        check_str("imu.insFusion.priority", &i.ins_fusion.priority, INS_PRIORITIES)?;

        Ok(())
    }
}

fn check_str(field: &'static str, value: &str, allowed: &[&str]) -> Result<(), InvalidField> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(InvalidField {
            field,
            value: format!("{value:?}"),
        })
    }
}

fn check_num(field: &'static str, value: i64, allowed: &[u32]) -> Result<(), InvalidField> {
    if allowed.iter().any(|&a| i64::from(a) == value) {
        Ok(())
    } else {
        Err(InvalidField {
            field,
            value: value.to_string(),
        })
    }
}

fn check_set(field: &'static str, values: &[String], allowed: &[&str]) -> Result<(), InvalidField> {
    values
        .iter()
        .try_for_each(|v| check_str(field, v, allowed))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identifies_k922_com1_schema_v1() {
        // Arrange / Act
        let cfg = Configuration::default();

        // Assert
        assert_eq!(cfg.device, "K922");
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.com.single_port, "COM1");
    }

    #[test]
    fn test_default_uses_documented_numeric_defaults() {
        let cfg = Configuration::default();
        assert_eq!(cfg.connection.serial_baud, 115200);
        assert_eq!(cfg.connection.tcp_port, 7001);
        assert_eq!(cfg.gnss.rate_hz, 5);
        assert_eq!(cfg.gnss.baseline_km, 10.0);
        assert_eq!(cfg.nmea.base_rate_hz, 1);
        assert_eq!(cfg.imu.rate_hz, 5);
        assert_eq!(cfg.imu.ins_fusion.max_gap_no_gnss_sec, 30.0);
    }

    #[test]
    fn test_serializes_with_camel_case_keys_in_declaration_order() {
        // Act
        let json = serde_json::to_string(&Configuration::default()).unwrap();

        // Assert: top-level keys appear in declaration order
        let order = ["\"device\"", "\"version\"", "\"com\"", "\"connection\"", "\"gnss\"", "\"nmea\"", "\"imu\""];
        let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "keys out of order: {json}");

        // Assert: nested names are camelCase
        assert!(json.contains("\"singlePort\":\"COM1\""));
        assert!(json.contains("\"maxGapNoGnssSec\":30.0"));
        assert!(json.contains("\"rtcmBaseMessages\":[]"));
    }

    #[test]
    fn test_default_configuration_validates() {
        assert_eq!(Configuration::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_unknown_baud_rate() {
        // Arrange
        let mut cfg = Configuration::default();
        cfg.connection.serial_baud = 4800;

        // Act
        let err = cfg.validate().unwrap_err();

        // Assert
        assert_eq!(err.field, "connection.serialBaud");
        assert_eq!(err.value, "4800");
    }

    #[test]
    fn test_validate_rejects_tcp_port_outside_u16() {
        let mut cfg = Configuration::default();
        cfg.connection.tcp_port = 70000;
        assert_eq!(cfg.validate().unwrap_err().field, "connection.tcpPort");

        cfg.connection.tcp_port = 0;
        assert_eq!(cfg.validate().unwrap_err().value, "0");

        cfg.connection.tcp_port = 65535;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_constellation() {
        let mut cfg = Configuration::default();
        cfg.gnss.constellations_enabled = vec!["GPS".to_string(), "NAVIC".to_string()];
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.field, "gnss.constellationsEnabled");
        assert_eq!(err.value, "\"NAVIC\"");
    }

    #[test]
    fn test_validate_accepts_50hz_imu_but_not_50hz_position() {
        let mut cfg = Configuration::default();
        cfg.imu.rate_hz = 50;
        assert!(cfg.validate().is_ok());

        cfg.gnss.rate_hz = 50;
        assert_eq!(cfg.validate().unwrap_err().field, "gnss.rateHz");
    }

    #[test]
    fn test_validate_rejects_foreign_device() {
        let mut cfg = Configuration::default();
        cfg.device = "K902".to_string();
        assert_eq!(cfg.validate().unwrap_err().field, "device");
    }
}
