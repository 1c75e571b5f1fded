//! Interactive console: the panel's front end on stdin/stdout.
//!
//! One `tokio::select!` loop waits on two sources:
//!
//! - **stdin lines** → [`parse_command`] → [`execute`]
//! - **link events** → [`Panel::handle_event`] → [`render_update`]
//!
//! Neither branch blocks; link I/O happens in the link tasks.  Errors the
//! operator must react to (bad URL, unparseable file, apply while
//! disconnected) are printed as `ALERT: ...`; the rest go to the log.

use std::io::{self, Write};

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use k922_core::serializer::to_json;
use k922_core::{collect, Field, Group};

use crate::application::commands::USAGE;
use crate::application::{
    parse_command, Command, Connector, Panel, PanelError, PanelUpdate, TaggedEvent, TransportError,
};

/// Whether the console keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs the console until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or stdout cannot be written.
pub async fn run_console<C: Connector>(
    mut panel: Panel<C>,
    mut events: UnboundedReceiver<TaggedEvent>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();
    writeln!(stdout, "K922 COM1 panel. Type `help` for commands.")?;
    writeln!(stdout, "Connection: {}", panel.connection_indicator())?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(command)) => {
                        if execute(&mut panel, command, &mut stdout)? == Flow::Quit {
                            break;
                        }
                    }
                    Err(e) => writeln!(stdout, "{e}")?,
                }
                stdout.flush()?;
            }

            Some(event) = events.recv() => {
                if let Some(update) = panel.handle_event(event) {
                    render_update(&panel, update, &mut stdout)?;
                    stdout.flush()?;
                }
            }
        }
    }

    panel.disconnect();
    info!("panel closed");
    Ok(())
}

/// Runs one command against the panel, writing its output to `out`.
pub fn execute<C: Connector, W: Write>(
    panel: &mut Panel<C>,
    command: Command,
    out: &mut W,
) -> io::Result<Flow> {
    match command {
        Command::Connect { url } => {
            if let Err(e) = panel.connect(url.as_deref()) {
                report(out, &e)?;
            }
        }
        Command::Disconnect => {
            panel.disconnect();
            writeln!(out, "Connection: {}", panel.connection_indicator())?;
        }
        Command::Status => {
            if let Err(e) = panel.request_status() {
                report(out, &e)?;
            }
        }
        Command::Apply => {
            let result = panel.apply_config();
            writeln!(out, "{}", panel.preview())?;
            match result {
                Ok(()) => {}
                Err(PanelError::Transport(TransportError::NotConnected)) => {
                    writeln!(out, "ALERT: backend not connected; run `connect` first")?;
                }
                Err(e) => report(out, &e)?,
            }
        }
        Command::Export { path } => match panel.export(path.as_deref()) {
            Ok(path) => {
                writeln!(out, "{}", panel.preview())?;
                writeln!(out, "configuration exported to {}", path.display())?;
            }
            Err(e) => report(out, &e)?,
        },
        Command::Import { path } => match panel.import(&path) {
            Ok(()) => writeln!(out, "{}", panel.preview())?,
            Err(e) => report(out, &e)?,
        },
        Command::Set { field, value } => {
            if let Err(e) = panel.set_field(&field, &value) {
                report(out, &e)?;
            }
        }
        Command::Unset { field } => {
            if let Err(e) = panel.clear_field(&field) {
                report(out, &e)?;
            }
        }
        Command::Check { group, value } => {
            if let Err(e) = panel.set_checked(&group, &value, true) {
                report(out, &e)?;
            }
        }
        Command::Uncheck { group, value } => {
            if let Err(e) = panel.set_checked(&group, &value, false) {
                report(out, &e)?;
            }
        }
        Command::Imu { enabled } => panel.set_imu_enabled(enabled),
        Command::Show => match to_json(&collect(panel.form())) {
            Ok(json) => writeln!(out, "{json}")?,
            Err(e) => report(out, &PanelError::Config(e))?,
        },
        Command::Display => {
            writeln!(out, "Connection: {}", panel.connection_indicator())?;
            writeln!(out, "{}", panel.display())?;
        }
        Command::Options { field } => list_options(out, &field)?,
        Command::Fields => list_fields(panel, out)?,
        Command::Help => {
            for line in USAGE {
                writeln!(out, "  {line}")?;
            }
        }
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Prints what a link event changed.
pub fn render_update<C: Connector, W: Write>(
    panel: &Panel<C>,
    update: PanelUpdate,
    out: &mut W,
) -> io::Result<()> {
    match update {
        PanelUpdate::Connection(_) => {
            writeln!(out, "Connection: {}", panel.connection_indicator())
        }
        PanelUpdate::Status => writeln!(out, "{}", panel.display()),
    }
}

fn report<W: Write>(out: &mut W, err: &PanelError) -> io::Result<()> {
    if err.is_alert() {
        writeln!(out, "ALERT: {err}")
    } else {
        warn!("{err}");
        Ok(())
    }
}

fn list_options<W: Write>(out: &mut W, id: &str) -> io::Result<()> {
    let Some(field) = Field::from_id(id) else {
        return report(out, &PanelError::UnknownField(id.to_string()));
    };
    let options = field.options();
    if options.is_empty() {
        return writeln!(out, "{field} is free text");
    }
    for opt in options {
        writeln!(out, "  {:<12} {}", opt.value, opt.label)?;
    }
    Ok(())
}

fn list_fields<C: Connector, W: Write>(panel: &Panel<C>, out: &mut W) -> io::Result<()> {
    let form = panel.form();
    for field in Field::ALL {
        match form.value(field) {
            Some(value) => writeln!(out, "  {:<14} {value:?}", field.id())?,
            None => writeln!(out, "  {:<14} (missing)", field.id())?,
        }
    }
    let imu = match form.imu_enabled() {
        Some(true) => "on",
        Some(false) => "off",
        None => "(missing)",
    };
    writeln!(out, "  {:<14} {imu}", "imuEnabled")?;
    for group in Group::ALL {
        writeln!(out, "  {:<14} [{}]", group.id(), form.checked(group).join(", "))?;
        writeln!(out, "  {:<14} of: {}", "", group.values().join(" "))?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
