//! K922 COM1 control panel: entry point.
//!
//! An interactive terminal panel for the GNSS.AI K922 receiver.  The operator
//! edits the COM1 configuration form, exports or imports it as JSON, sends it
//! to the backend over a WebSocket, and watches the receiver status the
//! backend reports.
//!
//! # Usage
//!
//! ```text
//! k922-panel [OPTIONS]
//!
//! Options:
//!   --backend-url   <URL>   Pre-fills the backend URL field
//!   --settings      <PATH>  Optional TOML settings file
//!   --import        <PATH>  JSON configuration loaded into the form at start
//!   --export-path   <PATH>  Default export file [default: k922_com1_config.json]
//!   --strict-import         Reject imports that are not a valid configuration
//!   --connect               Connect right after start
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable             | Description                          |
//! |----------------------|--------------------------------------|
//! | `K922_BACKEND_URL`   | Backend WebSocket URL                |
//! | `K922_SETTINGS`      | Settings file path                   |
//! | `K922_EXPORT_PATH`   | Default export file                  |
//! | `K922_STRICT_IMPORT` | Strict import (`true` / `false`)     |
//! | `RUST_LOG`           | Log filter; overrides `log_level`    |
//!
//! Command-line values override the settings file, which overrides the
//! built-in defaults.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use k922_panel::application::{Command, Panel};
use k922_panel::domain::{load_settings, PanelSettings};
use k922_panel::infrastructure::console::execute;
use k922_panel::infrastructure::{run_console, WsConnector};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// GNSS.AI K922 COM1 control panel.
#[derive(Debug, Parser)]
#[command(
    name = "k922-panel",
    about = "Terminal control panel for the K922 receiver's COM1 port",
    version
)]
struct Cli {
    /// Backend WebSocket URL, e.g. `ws://192.168.4.1:8765`.
    #[arg(long, env = "K922_BACKEND_URL")]
    backend_url: Option<String>,

    /// TOML settings file.  A missing file is the same as an empty one.
    #[arg(long, env = "K922_SETTINGS")]
    settings: Option<PathBuf>,

    /// JSON configuration file applied to the form at start-up.
    #[arg(long)]
    import: Option<PathBuf>,

    /// File `export` writes when no path is given
    /// [default: k922_com1_config.json].
    #[arg(long, env = "K922_EXPORT_PATH")]
    export_path: Option<PathBuf>,

    /// Only import complete configurations whose values are all valid.
    #[arg(long, env = "K922_STRICT_IMPORT")]
    strict_import: bool,

    /// Connect to the backend right after start-up.
    #[arg(long)]
    connect: bool,
}

/// What `main` needs after argument parsing.
#[derive(Debug)]
struct Startup {
    settings: PanelSettings,
    import: Option<PathBuf>,
    connect: bool,
}

impl Cli {
    /// Loads the settings file (if any) and layers the CLI values on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be read or
    /// parsed.
    fn into_startup(self) -> anyhow::Result<Startup> {
        let mut settings = match &self.settings {
            Some(path) => load_settings(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => PanelSettings::default(),
        };

        if let Some(url) = self.backend_url {
            settings.backend_url = Some(url);
        }
        if let Some(path) = self.export_path {
            settings.export_path = path;
        }
        settings.strict_import |= self.strict_import;

        Ok(Startup {
            settings,
            import: self.import,
            connect: self.connect,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let startup = Cli::parse().into_startup()?;

    // Logs go to stderr so they never interleave with command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&startup.settings.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    info!(
        "K922 COM1 panel starting, export={}, strict_import={}",
        startup.settings.export_path.display(),
        startup.settings.strict_import
    );

    let (mut panel, events) = Panel::new(WsConnector, startup.settings);

    let mut stdout = io::stdout();
    if let Some(path) = startup.import {
        execute(&mut panel, Command::Import { path }, &mut stdout)?;
    }
    if startup.connect {
        execute(&mut panel, Command::Connect { url: None }, &mut stdout)?;
    }

    run_console(panel, events).await?;

    info!("K922 COM1 panel stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
