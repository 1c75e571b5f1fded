//! Binding between the form controls and the configuration document.
//!
//! - [`collect`] reads every control and builds a fresh [`Configuration`],
//!   substituting the documented default for any empty or missing control.
//! - [`apply`] writes a (possibly partial, possibly foreign) JSON document back
//!   into the controls.  Only the values present in the document are touched;
//!   nothing is validated.
//!
//! # Numeric coercion
//!
//! Numeric controls hold text.  An empty control takes its default.  A
//! non-empty control that does not hold a number (whitespace only included)
//! collapses to `0` and a warning is logged naming the control.  Integer
//! controls keep any whole number, negative or out of range, as written.

use serde_json::Value;
use tracing::{debug, warn};

use super::{Field, Form, Group};
use crate::domain::config::{
    defaults, Com1Settings, ComSettings, Configuration, ConnectionSettings, CorrectionInput,
    GnssSettings, ImuSettings, InsFusion, NmeaSettings, DEVICE, SCHEMA_VERSION, SINGLE_PORT,
};
use crate::domain::status::scalar_text;

// ── Form → Configuration ──────────────────────────────────────────────────────

/// Builds a configuration from the current state of the form.
pub fn collect(form: &Form) -> Configuration {
    Configuration {
        device: DEVICE.to_string(),
        version: SCHEMA_VERSION,
        com: ComSettings {
            single_port: SINGLE_PORT.to_string(),
            com1: Com1Settings {
                role: text_or(form, Field::Com1Role, defaults::COM1_ROLE),
            },
        },
        connection: ConnectionSettings {
            backend_url: trimmed_or(form, Field::BackendUrl, defaults::BACKEND_URL),
            transport_type: text_or(form, Field::TransportType, defaults::TRANSPORT_TYPE),
            serial_port: trimmed_or(form, Field::SerialPort, defaults::SERIAL_PORT),
            serial_baud: number_or(form, Field::SerialBaud, defaults::SERIAL_BAUD),
            tcp_port: number_or(form, Field::TcpPort, defaults::TCP_PORT),
        },
        gnss: GnssSettings {
            constellations_enabled: form.checked(Group::GnssConstellations),
            mode: text_or(form, Field::RtkMode, defaults::RTK_MODE),
            rate_hz: number_or(form, Field::RtkRate, defaults::RTK_RATE_HZ),
            baseline_km: number_or(form, Field::RtkBaseline, defaults::RTK_BASELINE_KM),
            corr_in: CorrectionInput {
                source: text_or(form, Field::CorrInSource, defaults::CORR_IN_SOURCE),
                format: text_or(form, Field::CorrInFormat, defaults::CORR_IN_FORMAT),
            },
            rtcm_base_messages: form.checked(Group::RtcmMessages),
        },
        nmea: NmeaSettings {
            talker: text_or(form, Field::NmeaTalker, defaults::NMEA_TALKER),
            base_rate_hz: number_or(form, Field::NmeaRate, defaults::NMEA_RATE_HZ),
            messages: form.checked(Group::NmeaMessages),
        },
        imu: ImuSettings {
            enabled: form.imu_enabled().unwrap_or(defaults::IMU_ENABLED),
            rate_hz: number_or(form, Field::ImuRate, defaults::IMU_RATE_HZ),
            ins_fusion: InsFusion {
                priority: text_or(form, Field::InsPriority, defaults::INS_PRIORITY),
                max_gap_no_gnss_sec: number_or(form, Field::InsMaxGap, defaults::INS_MAX_GAP_SEC),
            },
        },
    }
}

fn text_or(form: &Form, field: Field, default: &str) -> String {
    match form.value(field) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

fn trimmed_or(form: &Form, field: Field, default: &str) -> String {
    match form.value(field).map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// A number type a form control can be read as.
trait FormNumber: Copy + Default {
    fn parse_text(text: &str) -> Option<Self>;
}

impl FormNumber for f64 {
    fn parse_text(text: &str) -> Option<Self> {
        text.parse::<f64>().ok().filter(|f| f.is_finite())
    }
}

impl FormNumber for i64 {
    fn parse_text(text: &str) -> Option<Self> {
        text.parse::<i64>().ok().or_else(|| {
            // "5.0" is still five
            f64::parse_text(text)
                .filter(|f| f.fract() == 0.0 && f.abs() <= 2f64.powi(53))
                .map(|f| f as i64)
        })
    }
}

/// Reads a numeric control.
///
/// Only a missing or empty control takes `default`.  Whitespace around a
/// number is ignored, but a control holding only whitespace is not empty: it
/// reads as `0` like any other non-number.  No range is enforced here;
/// out-of-range values are carried through for [`Configuration::validate`].
fn number_or<T: FormNumber>(form: &Form, field: Field, default: T) -> T {
    let text = match form.value(field) {
        Some(v) if !v.is_empty() => v.trim(),
        _ => return default,
    };
    T::parse_text(text).unwrap_or_else(|| {
        warn!("{field}: {text:?} is not a number; using 0");
        T::default()
    })
}

// ── Configuration → Form ──────────────────────────────────────────────────────

/// Writes the values present in `doc` into the form.
///
/// `doc` is any JSON value; it is expected to look like a [`Configuration`]
/// but nothing is checked:
///
/// - A missing section or field leaves its controls as they are.
/// - Scalars (strings, numbers, booleans) are written verbatim, even when they
///   are not one of the control's options.  `null` and nested values are
///   skipped.
/// - A checkbox group given as an array is set to exactly the string members
///   of that array, so `[]` unchecks the whole group.  A non-array leaves the
///   group as it is.
/// - `imu.enabled` is applied only when it is a boolean.
/// - Controls missing from the form are skipped.
pub fn apply(form: &mut Form, doc: &Value) {
    if let Some(c) = section(doc, "connection") {
        put(form, Field::BackendUrl, c.get("backendUrl"));
        put(form, Field::TransportType, c.get("transportType"));
        put(form, Field::SerialPort, c.get("serialPort"));
        put(form, Field::SerialBaud, c.get("serialBaud"));
        put(form, Field::TcpPort, c.get("tcpPort"));
    }

    if let Some(com1) = section(doc, "com").and_then(|com| section(com, "com1")) {
        put(form, Field::Com1Role, com1.get("role"));
    }

    if let Some(g) = section(doc, "gnss") {
        put(form, Field::RtkMode, g.get("mode"));
        put(form, Field::RtkRate, g.get("rateHz"));
        put(form, Field::RtkBaseline, g.get("baselineKm"));
        if let Some(corr) = section(g, "corrIn") {
            put(form, Field::CorrInSource, corr.get("source"));
            put(form, Field::CorrInFormat, corr.get("format"));
        }
        check_group(form, Group::GnssConstellations, g.get("constellationsEnabled"));
        check_group(form, Group::RtcmMessages, g.get("rtcmBaseMessages"));
    }

    if let Some(n) = section(doc, "nmea") {
        put(form, Field::NmeaTalker, n.get("talker"));
        put(form, Field::NmeaRate, n.get("baseRateHz"));
        check_group(form, Group::NmeaMessages, n.get("messages"));
    }

    if let Some(i) = section(doc, "imu") {
        if let (Some(Value::Bool(enabled)), Some(_)) = (i.get("enabled"), form.imu_enabled()) {
            form.set_imu_enabled(*enabled);
        }
        put(form, Field::ImuRate, i.get("rateHz"));
        if let Some(ins) = section(i, "insFusion") {
            put(form, Field::InsPriority, ins.get("priority"));
            put(form, Field::InsMaxGap, ins.get("maxGapNoGnssSec"));
        }
    }

    debug!("configuration applied to form");
}

/// Writes a typed configuration into the form.
pub fn apply_config(form: &mut Form, cfg: &Configuration) {
    match serde_json::to_value(cfg) {
        Ok(doc) => apply(form, &doc),
        Err(e) => warn!("configuration could not be converted for the form: {e}"),
    }
}

fn section<'a>(doc: &'a Value, key: &str) -> Option<&'a Value> {
    doc.get(key).filter(|v| !v.is_null())
}

fn put(form: &mut Form, field: Field, value: Option<&Value>) {
    let Some(value) = value else { return };
    if form.value(field).is_none() {
        return;
    }
    match value {
        Value::Null => {}
        Value::String(_) | Value::Number(_) | Value::Bool(_) => form.set(field, scalar_text(value)),
        Value::Array(_) | Value::Object(_) => {
            debug!("{field}: nested value ignored");
        }
    }
}

fn check_group(form: &mut Form, group: Group, value: Option<&Value>) {
    if let Some(Value::Array(items)) = value {
        let selected: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
        form.check_exactly(group, &selected);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
