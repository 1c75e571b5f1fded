//! Domain layer for k922-panel.
//!
//! Pure types with no sockets and no async: the panel's runtime settings.
//! The configuration model itself lives in `k922-core`.

pub mod settings;

pub use settings::{load_settings, PanelSettings, SettingsError};
