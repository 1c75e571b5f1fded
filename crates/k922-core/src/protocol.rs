//! JSON messages exchanged with the K922 backend over the WebSocket.
//!
//! # Message flow
//!
//! ```text
//! Panel   → Backend: PanelToBackendMsg  →  JSON text frame
//! Backend → Panel:   text frame         →  classify_frame()  →  Inbound
//! ```
//!
//! Every outbound message is a JSON object with a `"type"` field naming it:
//!
//! ```json
//! {"type":"hello","source":"gnssai-k922-com1-panel"}
//! {"type":"getK922Status"}
//! {"type":"applyK922Config","payload":{"device":"K922", ...}}
//! ```
//!
//! Inbound frames are not required to be JSON.  The backend may relay raw
//! receiver output (NMEA sentences and the like) on the same socket, so a
//! frame that fails to parse is an expected case, not an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::config::Configuration;
use crate::domain::status::Status;

/// Identifies this panel in the `hello` greeting.
pub const PANEL_SOURCE: &str = "gnssai-k922-com1-panel";

/// `type` of the inbound status message.
pub const STATUS_MESSAGE_TYPE: &str = "k922Status";

/// Messages the panel sends to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PanelToBackendMsg {
    /// Greeting sent as soon as the connection opens.
    #[serde(rename = "hello")]
    Hello { source: String },

    /// Asks the backend for a status snapshot.
    #[serde(rename = "getK922Status")]
    GetStatus,

    /// Replaces the backend's receiver configuration.
    #[serde(rename = "applyK922Config")]
    ApplyConfig { payload: Configuration },
}

impl PanelToBackendMsg {
    /// The greeting carrying [`PANEL_SOURCE`].
    pub fn hello() -> Self {
        PanelToBackendMsg::Hello {
            source: PANEL_SOURCE.to_string(),
        }
    }

    /// The wire `type` of this message, for logging without the payload.
    pub fn type_name(&self) -> &'static str {
        match self {
            PanelToBackendMsg::Hello { .. } => "hello",
            PanelToBackendMsg::GetStatus => "getK922Status",
            PanelToBackendMsg::ApplyConfig { .. } => "applyK922Config",
        }
    }
}

/// What an inbound text frame turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Not JSON: raw telemetry text, only worth logging.
    Raw,
    /// A `k922Status` message.  `None` when the payload was missing or null.
    Status(Option<Status>),
    /// Any other JSON.  `kind` is the `type` field when it is a string.
    Other { kind: Option<String> },
}

/// Classifies an inbound text frame.
pub fn classify_frame(text: &str) -> Inbound {
    let msg: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => return Inbound::Raw,
    };
    match msg.get("type").and_then(Value::as_str) {
        Some(STATUS_MESSAGE_TYPE) => Inbound::Status(Status::from_payload(msg.get("payload"))),
        kind => Inbound::Other {
            kind: kind.map(str::to_string),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
