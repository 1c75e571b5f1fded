//! # k922-core
//!
//! Shared library for the GNSS.AI K922 COM1 control panel: the configuration
//! model, the form binding layer that builds it, its JSON marshalling, the
//! backend message shapes, and the status projector.
//!
//! This crate has no dependencies on sockets, terminals, or async runtimes.
//! The only I/O it performs is reading and writing configuration files in
//! [`serializer`].
//!
//! # Architecture overview
//!
//! The K922 receiver exposes a single physical serial port (COM1).  The panel
//! does not talk to the receiver directly: it builds a JSON configuration
//! document and hands it to a backend over a WebSocket, and the backend
//! translates it into real receiver commands.
//!
//! - **`domain`** – Static enumerations, the [`Configuration`] aggregate, and
//!   the [`Status`] snapshot with its display projection.
//! - **`form`** – A headless model of the panel's inputs and the
//!   `collect` / `apply` binding between inputs and configuration.
//! - **`serializer`** – Pretty JSON text, file export and import.
//! - **`protocol`** – Messages exchanged with the backend.

pub mod domain;
pub mod form;
pub mod protocol;
pub mod serializer;

// Re-export the most-used types at the crate root so callers can write
// `k922_core::Configuration` instead of `k922_core::domain::config::Configuration`.
pub use domain::config::Configuration;
pub use domain::status::{project, Status, StatusDisplay, PLACEHOLDER};
pub use form::{apply, apply_config, collect, Field, Form, Group};
pub use protocol::{classify_frame, Inbound, PanelToBackendMsg};
pub use serializer::{from_json, to_json, ConfigError, DEFAULT_EXPORT_FILE_NAME};
