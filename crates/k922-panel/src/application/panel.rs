//! The panel: every operator action, against one form and one transport.
//!
//! [`Panel`] owns the [`Form`], the [`TransportClient`], the status display
//! and the configuration preview.  Front ends (the console, tests) call its
//! methods and feed it link events; they never touch the transport directly.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use k922_core::serializer::{self, export_to_file, import_from_file};
use k922_core::{collect, project, ConfigError, Field, Form, Group, Inbound, StatusDisplay};

use crate::application::transport::{
    ConnectionState, Connector, TaggedEvent, TransportClient, TransportError,
};
use crate::domain::PanelSettings;

/// Errors from panel actions.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown field {0:?}; `fields` lists them")]
    UnknownField(String),

    #[error("unknown checkbox group {0:?}; `fields` lists them")]
    UnknownGroup(String),

    #[error("{group} has no item {value:?}")]
    UnknownGroupValue { group: Group, value: String },
}

impl PanelError {
    /// True for errors the operator must see, not just the log: bad input and
    /// files that could not be parsed.
    pub fn is_alert(&self) -> bool {
        match self {
            PanelError::Transport(e) => e.is_input_error(),
            PanelError::Config(e) => matches!(
                e,
                ConfigError::Parse(_) | ConfigError::Schema(_) | ConfigError::Invalid(_)
            ),
            PanelError::UnknownField(_)
            | PanelError::UnknownGroup(_)
            | PanelError::UnknownGroupValue { .. } => true,
        }
    }
}

/// What a link event changed, for the front end to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelUpdate {
    /// The connection indicator changed.
    Connection(ConnectionState),
    /// A status snapshot replaced the display.
    Status,
}

/// The K922 COM1 control panel.
pub struct Panel<C: Connector> {
    form: Form,
    transport: TransportClient<C>,
    display: StatusDisplay,
    preview: String,
    settings: PanelSettings,
}

impl<C: Connector> Panel<C> {
    /// Creates a panel with a fresh form and no connection.
    ///
    /// The backend URL field is pre-filled from `settings`.  Link events
    /// arrive on the returned receiver and must be passed to
    /// [`Panel::handle_event`].
    pub fn new(connector: C, settings: PanelSettings) -> (Self, UnboundedReceiver<TaggedEvent>) {
        let (transport, events) = TransportClient::new(connector);
        let mut form = Form::new();
        if let Some(url) = &settings.backend_url {
            form.set(Field::BackendUrl, url.clone());
        }
        info!("panel initialised (K922, single port COM1)");
        let panel = Self {
            form,
            transport,
            display: StatusDisplay::default(),
            preview: String::new(),
            settings,
        };
        (panel, events)
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    pub fn display(&self) -> &StatusDisplay {
        &self.display
    }

    /// The last exported, imported or applied configuration text.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// `"Connected"` or `"Disconnected"`.
    pub fn connection_indicator(&self) -> &'static str {
        self.transport.state().indicator()
    }

    /// Connects to the backend URL field, after writing `url` into it when
    /// one is given.
    ///
    /// # Errors
    ///
    /// `MissingUrl` for a blank field, `InvalidUrl` for a malformed one.
    pub fn connect(&mut self, url: Option<&str>) -> Result<(), PanelError> {
        if let Some(url) = url {
            self.form.set(Field::BackendUrl, url);
        }
        let url = self.form.value(Field::BackendUrl).unwrap_or_default().to_string();
        self.transport.connect(&url)?;
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.transport.close();
    }

    /// # Errors
    ///
    /// `NotConnected` unless connected.
    pub fn request_status(&mut self) -> Result<(), PanelError> {
        self.transport.request_status()?;
        Ok(())
    }

    /// Collects the form, shows it in the preview, and sends it.
    ///
    /// The preview is refreshed even when nothing can be sent.
    ///
    /// # Errors
    ///
    /// `NotConnected` unless connected.
    pub fn apply_config(&mut self) -> Result<(), PanelError> {
        let cfg = collect(&self.form);
        self.preview = serializer::to_json(&cfg)?;
        match self.transport.apply_config(&cfg) {
            Ok(()) => Ok(()),
            Err(TransportError::NotConnected) => {
                info!("backend not connected; configuration only previewed");
                Err(TransportError::NotConnected.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the collected configuration to `path`, or to the configured
    /// export path.  Returns the path written.
    pub fn export(&mut self, path: Option<&Path>) -> Result<PathBuf, PanelError> {
        let path = path.map_or_else(|| self.settings.export_path.clone(), Path::to_path_buf);
        self.preview = export_to_file(&self.form, &path)?;
        Ok(path)
    }

    /// Loads a configuration file into the form.
    ///
    /// With `strict_import` set the file must be a complete, valid
    /// configuration.  The form is untouched on any error.
    pub fn import(&mut self, path: &Path) -> Result<(), PanelError> {
        self.preview = import_from_file(&mut self.form, path, self.settings.strict_import)?;
        info!("configuration loaded into the form");
        Ok(())
    }

    /// Writes `value` into the field with element id `id`.
    pub fn set_field(&mut self, id: &str, value: &str) -> Result<Field, PanelError> {
        let field = Field::from_id(id).ok_or_else(|| PanelError::UnknownField(id.to_string()))?;
        self.form.set(field, value);
        Ok(field)
    }

    /// Empties a field so the default applies on the next collect.
    pub fn clear_field(&mut self, id: &str) -> Result<Field, PanelError> {
        self.set_field(id, "")
    }

    /// Checks or unchecks one item of the checkbox group with element id
    /// `group_id`.
    pub fn set_checked(&mut self, group_id: &str, value: &str, checked: bool) -> Result<(), PanelError> {
        let group =
            Group::from_id(group_id).ok_or_else(|| PanelError::UnknownGroup(group_id.to_string()))?;
        if !self.form.set_checked(group, value, checked) {
            return Err(PanelError::UnknownGroupValue {
                group,
                value: value.to_string(),
            });
        }
        Ok(())
    }

    pub fn set_imu_enabled(&mut self, enabled: bool) {
        self.form.set_imu_enabled(enabled);
    }

    /// Feeds a link event through the transport and, for status frames, the
    /// projector.
    pub fn handle_event(&mut self, event: TaggedEvent) -> Option<PanelUpdate> {
        let before = self.transport.state();
        let inbound = self.transport.handle_event(event);

        if let Some(Inbound::Status(Some(status))) = inbound {
            self.display = project(&status);
            return Some(PanelUpdate::Status);
        }

        let after = self.transport.state();
        if after == before {
            return None;
        }
        if after == ConnectionState::Disconnected && before == ConnectionState::Connecting {
            warn!("connection attempt failed");
        }
        Some(PanelUpdate::Connection(after))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
