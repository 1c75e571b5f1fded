//! Application layer for k922-panel.
//!
//! Knows *what* the panel does: the transport state machine, the operator
//! actions built on it, and the console command language.  Opening sockets
//! and reading the terminal are left to the infrastructure layer.
//!
//! # Responsibilities
//!
//! - Owning the single backend link and its connection state
//! - Turning link events into display updates
//! - Building, previewing, exporting, importing and sending configurations
//! - Parsing console lines into commands

pub mod commands;
pub mod panel;
pub mod transport;

pub use commands::{parse_command, Command, CommandError};
pub use panel::{Panel, PanelError, PanelUpdate};
pub use transport::{
    ConnectionState, Connector, Link, LinkEvent, TaggedEvent, TransportClient, TransportError,
};
