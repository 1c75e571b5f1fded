//! k922-panel library crate.
//!
//! A terminal control panel for the GNSS.AI K922 receiver's single serial
//! port (COM1).  The panel edits a configuration form, sends the resulting
//! configuration to a backend over one WebSocket, and shows the receiver
//! status the backend reports.
//!
//! # Architecture
//!
//! ```text
//! Operator (console lines)
//!         ↕
//! [k922-panel]
//!   ├── domain/           PanelSettings (TOML file + defaults)
//!   ├── application/      Panel actions, transport state machine, commands
//!   └── infrastructure/
//!         ├── ws_link/    tokio-tungstenite link task
//!         └── console/    stdin/stdout event loop
//!         ↕
//! Backend  (JSON over WebSocket)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O beyond reading its settings file.
//! - `application` talks to links only through the `Connector` / `Link`
//!   traits, so every state transition is testable without a socket.
//! - `infrastructure` depends on all other layers plus `tokio-tungstenite`.

/// Domain layer: settings.
pub mod domain;

/// Application layer: panel actions and the transport state machine.
pub mod application;

/// Infrastructure layer: WebSocket link and console.
pub mod infrastructure;
