//! Infrastructure layer for k922-panel.
//!
//! All I/O lives here: the WebSocket link to the backend and the interactive
//! console on stdin/stdout.
//!
//! # What does NOT belong here?
//!
//! - Connection state decisions (the transport client makes them)
//! - Configuration building or parsing (that is `k922-core`)

pub mod console;
pub mod mock_link;
pub mod ws_link;

pub use console::run_console;
pub use ws_link::WsConnector;
