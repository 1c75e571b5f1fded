//! Domain layer for k922-core.
//!
//! Pure types with no I/O: the static value lists the receiver accepts, the
//! configuration aggregate sent to the backend, and the status snapshot the
//! backend sends back.

pub mod config;
pub mod enums;
pub mod status;

pub use config::{
    Com1Settings, ComSettings, ConnectionSettings, CorrectionInput, GnssSettings, ImuSettings,
    InsFusion, NmeaSettings,
};
pub use enums::SelectOption;
