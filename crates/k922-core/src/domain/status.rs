//! Receiver status snapshots and their display projection.
//!
//! The backend answers `getK922Status` (and may push unsolicited updates)
//! with a `k922Status` message whose payload is a [`Status`].  Every field is
//! optional and loosely typed: a field the backend omits, or sends as `null`,
//! is shown as [`PLACEHOLDER`]; a field sent with an unexpected type is shown
//! verbatim rather than rejected.
//!
//! A new status replaces the whole display; nothing is carried over from the
//! previous snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text shown for a field the latest status did not provide.
pub const PLACEHOLDER: &str = "—";

/// A status snapshot as sent by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Positioning mode, e.g. `"RTK_FIXED"`.
    pub mode: Option<Value>,
    /// Satellites used in the solution.
    pub sats_used: Option<Value>,
    /// RTK solution type.
    pub solution: Option<Value>,
    /// Latitude in degrees.
    pub lat: Option<Value>,
    /// Longitude in degrees.
    pub lon: Option<Value>,
    /// Ellipsoidal height in metres.
    pub h_ellipsoidal: Option<Value>,
    /// Speed over ground in m/s.
    pub velocity: Option<Value>,
    /// Heading in degrees.
    pub heading: Option<Value>,
    /// Pitch in degrees.
    pub pitch: Option<Value>,
    /// Roll in degrees.
    pub roll: Option<Value>,
}

impl Status {
    /// Reads a status from a `k922Status` payload.
    ///
    /// Returns `None` for a missing payload or a falsy one (`null`, `false`,
    /// `0`, `""`), which leaves the current display untouched.  Any other
    /// non-object payload yields an empty status (every field shows the
    /// placeholder).
    pub fn from_payload(payload: Option<&Value>) -> Option<Self> {
        match payload {
            None => None,
            Some(v) if is_falsy(v) => None,
            Some(v) if v.is_object() => Some(serde_json::from_value(v.clone()).unwrap_or_default()),
            Some(_) => Some(Self::default()),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// The display fields of the status panel, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDisplay {
    pub mode: String,
    pub sats: String,
    pub rtk: String,
    pub lat: String,
    pub lon: String,
    pub height: String,
    pub velocity: String,
    pub heading: String,
    pub pitch_roll: String,
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self {
            mode: PLACEHOLDER.to_string(),
            sats: PLACEHOLDER.to_string(),
            rtk: PLACEHOLDER.to_string(),
            lat: PLACEHOLDER.to_string(),
            lon: PLACEHOLDER.to_string(),
            height: PLACEHOLDER.to_string(),
            velocity: PLACEHOLDER.to_string(),
            heading: PLACEHOLDER.to_string(),
            pitch_roll: PLACEHOLDER.to_string(),
        }
    }
}

impl fmt::Display for StatusDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mode         {}", self.mode)?;
        writeln!(f, "Satellites   {}", self.sats)?;
        writeln!(f, "RTK          {}", self.rtk)?;
        writeln!(f, "Latitude     {}", self.lat)?;
        writeln!(f, "Longitude    {}", self.lon)?;
        writeln!(f, "Height (ell) {}", self.height)?;
        writeln!(f, "Velocity     {}", self.velocity)?;
        writeln!(f, "Heading      {}", self.heading)?;
        write!(f, "Pitch / Roll {}", self.pitch_roll)
    }
}

/// Projects a status snapshot onto the display fields.
///
/// | field      | format                     |
/// |------------|----------------------------|
/// | lat, lon   | 8 decimals                 |
/// | height     | 3 decimals + `" m"`        |
/// | velocity   | 3 decimals + `" m/s"`      |
/// | heading    | 2 decimals + `" °"`        |
/// | pitch/roll | `"P° / R°"`, 2 decimals, only when both are numbers |
pub fn project(status: &Status) -> StatusDisplay {
    let pitch_roll = match (
        status.pitch.as_ref().and_then(Value::as_f64),
        status.roll.as_ref().and_then(Value::as_f64),
    ) {
        (Some(p), Some(r)) => format!("{p:.2}° / {r:.2}°"),
        _ => PLACEHOLDER.to_string(),
    };

    StatusDisplay {
        mode: text(status.mode.as_ref()),
        sats: text(status.sats_used.as_ref()),
        rtk: text(status.solution.as_ref()),
        lat: fixed(status.lat.as_ref(), 8, ""),
        lon: fixed(status.lon.as_ref(), 8, ""),
        height: fixed(status.h_ellipsoidal.as_ref(), 3, " m"),
        velocity: fixed(status.velocity.as_ref(), 3, " m/s"),
        heading: fixed(status.heading.as_ref(), 2, " °"),
        pitch_roll,
    }
}

/// Numbers with fixed precision and a unit; anything else verbatim.
fn fixed(value: Option<&Value>, decimals: usize, unit: &str) -> String {
    match value {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => format!("{f:.decimals$}{unit}"),
            None => n.to_string(),
        },
        other => text(other),
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => PLACEHOLDER.to_string(),
        Some(v) => scalar_text(v),
    }
}

/// Renders a JSON value the way it reads in a form field: strings without
/// quotes, integral numbers without a decimal point.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                // f64 Display drops a zero fraction: 10.0 -> "10"
                n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
