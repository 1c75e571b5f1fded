//! Transport client: the single backend link and its state machine.
//!
//! ```text
//!              connect(url)           LinkEvent::Opened
//! Disconnected ────────────► Connecting ────────────────► Connected
//!      ▲                          │                           │
//!      └──────────────────────────┴───── LinkEvent::Closed ───┘
//!                                        or close()
//! ```
//!
//! The client owns at most one [`Link`].  Links are built by a [`Connector`]
//! and report back through one event channel shared by every link the client
//! ever opens.  Each link gets a fresh generation number and tags its events
//! with it; [`TransportClient::handle_event`] drops events whose generation is
//! not the current one, so a link that was replaced can never move the state
//! machine again.
//!
//! Nothing is retried.  Sends are fire-and-forget.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use k922_core::{classify_frame, Configuration, Inbound, PanelToBackendMsg};

/// Errors from the transport client.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// `connect` was called with an empty URL.
    #[error("enter the backend WebSocket URL")]
    MissingUrl,

    /// The URL could not be turned into a WebSocket request.
    #[error("could not create the WebSocket for {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A message was sent while no connection is open.
    #[error("backend not connected")]
    NotConnected,

    /// The link refused the message.
    #[error("send failed: {0}")]
    SendFailed(String),
}

impl TransportError {
    /// True for errors caused by what the operator typed.
    pub fn is_input_error(&self) -> bool {
        matches!(self, TransportError::MissingUrl | TransportError::InvalidUrl { .. })
    }
}

/// Connection state as shown by the panel's indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    /// The indicator text.  A connection still being opened reads as
    /// disconnected.
    pub fn indicator(self) -> &'static str {
        match self {
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnected | ConnectionState::Connecting => "Disconnected",
        }
    }
}

/// Something that happened on a link.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// The WebSocket handshake completed.
    Opened,
    /// A text frame arrived.
    Frame(String),
    /// The link reported a fault.  A `Closed` follows when the link is gone.
    Error(String),
    /// The link is closed.
    Closed,
}

/// A [`LinkEvent`] tagged with the generation of the link that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEvent {
    pub generation: u64,
    pub event: LinkEvent,
}

/// An open (or opening) connection to the backend.
pub trait Link: Send {
    /// Queues one text frame.
    fn send(&mut self, text: String) -> Result<(), TransportError>;
    /// Closes the link immediately, dropping anything still queued.
    fn close(&mut self);
}

/// Builds links.
pub trait Connector {
    /// Starts opening a link to `url`.
    ///
    /// Must return without waiting for the handshake; progress is reported
    /// through `events`, every event tagged with `generation`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] if no link can be built for
    /// `url`.
    fn open(
        &self,
        url: &str,
        generation: u64,
        events: UnboundedSender<TaggedEvent>,
    ) -> Result<Box<dyn Link>, TransportError>;
}

/// Owns the backend link and drives it from link events.
pub struct TransportClient<C: Connector> {
    connector: C,
    link: Option<Box<dyn Link>>,
    state: ConnectionState,
    generation: u64,
    events: UnboundedSender<TaggedEvent>,
}

impl<C: Connector> TransportClient<C> {
    /// Creates a disconnected client and the receiver its links report to.
    pub fn new(connector: C) -> (Self, UnboundedReceiver<TaggedEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let client = Self {
            connector,
            link: None,
            state: ConnectionState::Disconnected,
            generation: 0,
            events,
        };
        (client, rx)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Generation of the current (or most recent) link.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Opens a new link to `url`, closing any existing one first.
    ///
    /// # Errors
    ///
    /// - [`TransportError::MissingUrl`] if `url` is blank; nothing changes.
    /// - [`TransportError::InvalidUrl`] if the connector cannot build a link;
    ///   the client is left disconnected.
    pub fn connect(&mut self, url: &str) -> Result<(), TransportError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(TransportError::MissingUrl);
        }

        self.close();

        let generation = self.generation + 1;
        let link = self.connector.open(url, generation, self.events.clone())?;
        self.generation = generation;
        self.link = Some(link);
        self.state = ConnectionState::Connecting;
        info!("connecting to {url} ...");
        Ok(())
    }

    /// Closes the current link, if any.
    pub fn close(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.close();
            debug!("link {} closed", self.generation);
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Asks the backend for a status snapshot.
    ///
    /// # Errors
    ///
    /// [`TransportError::NotConnected`] unless connected; nothing is sent.
    pub fn request_status(&mut self) -> Result<(), TransportError> {
        if !self.is_connected() {
            info!("not connected; status request skipped");
            return Err(TransportError::NotConnected);
        }
        self.send(&PanelToBackendMsg::GetStatus)
    }

    /// Sends `cfg` to the backend as `applyK922Config`.
    ///
    /// # Errors
    ///
    /// [`TransportError::NotConnected`] unless connected; nothing is sent.
    pub fn apply_config(&mut self, cfg: &Configuration) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.send(&PanelToBackendMsg::ApplyConfig {
            payload: cfg.clone(),
        })
    }

    /// Feeds one link event into the state machine.
    ///
    /// Returns the classified frame for `Frame` events of the current link.
    pub fn handle_event(&mut self, tagged: TaggedEvent) -> Option<Inbound> {
        if tagged.generation != self.generation || self.link.is_none() {
            debug!(
                "dropping {:?} from stale link {} (current {})",
                tagged.event, tagged.generation, self.generation
            );
            return None;
        }

        match tagged.event {
            LinkEvent::Opened => {
                self.state = ConnectionState::Connected;
                info!("WebSocket connected");
                if let Err(e) = self.send(&PanelToBackendMsg::hello()) {
                    warn!("hello not sent: {e}");
                }
                None
            }
            LinkEvent::Frame(text) => {
                info!("RX: {text}");
                let inbound = classify_frame(&text);
                if let Inbound::Other { kind } = &inbound {
                    debug!("ignoring message of type {kind:?}");
                }
                Some(inbound)
            }
            LinkEvent::Error(e) => {
                warn!("WebSocket error: {e}");
                None
            }
            LinkEvent::Closed => {
                info!("WebSocket closed");
                self.link = None;
                self.state = ConnectionState::Disconnected;
                None
            }
        }
    }

    fn send(&mut self, msg: &PanelToBackendMsg) -> Result<(), TransportError> {
        let link = self.link.as_mut().ok_or(TransportError::NotConnected)?;
        let text =
            serde_json::to_string(msg).map_err(|e| TransportError::SendFailed(e.to_string()))?;
        match msg {
            PanelToBackendMsg::ApplyConfig { .. } => info!("TX {}: {text}", msg.type_name()),
            _ => info!("TX: {}", msg.type_name()),
        }
        link.send(text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock_link::MockConnector;
    use serde_json::Value;

    fn event(client: &TransportClient<MockConnector>, event: LinkEvent) -> TaggedEvent {
        TaggedEvent {
            generation: client.generation(),
            event,
        }
    }

    fn connected_client() -> (TransportClient<MockConnector>, MockConnector) {
        let connector = MockConnector::new();
        let (mut client, _rx) = TransportClient::new(connector.clone());
        client.connect("ws://backend.local:8765").unwrap();
        let opened = event(&client, LinkEvent::Opened);
        client.handle_event(opened);
        (client, connector)
    }

    #[test]
    fn test_new_client_is_disconnected() {
        let (client, _rx) = TransportClient::new(MockConnector::new());
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert_eq!(client.state().indicator(), "Disconnected");
    }

    #[test]
    fn test_connect_blank_url_is_missing_url() {
        // Arrange
        let connector = MockConnector::new();
        let (mut client, _rx) = TransportClient::new(connector.clone());

        // Act
        let result = client.connect("   ");

        // Assert
        assert!(matches!(result, Err(TransportError::MissingUrl)));
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(connector.opened_urls().is_empty());
    }

    #[test]
    fn test_connect_rejected_url_stays_disconnected() {
        let connector = MockConnector::rejecting();
        let (mut client, _rx) = TransportClient::new(connector);

        let result = client.connect("not a url");

        assert!(matches!(result, Err(TransportError::InvalidUrl { .. })));
        assert!(result.unwrap_err().is_input_error());
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_connect_trims_url_and_enters_connecting() {
        let connector = MockConnector::new();
        let (mut client, _rx) = TransportClient::new(connector.clone());

        client.connect("  ws://backend.local:8765  ").unwrap();

        assert_eq!(client.state(), ConnectionState::Connecting);
        assert_eq!(client.state().indicator(), "Disconnected");
        assert_eq!(connector.opened_urls(), vec!["ws://backend.local:8765"]);
    }

    #[test]
    fn test_opened_connects_and_sends_hello() {
        // Arrange / Act
        let (client, connector) = connected_client();

        // Assert
        assert!(client.is_connected());
        let sent = connector.sent();
        assert_eq!(sent.len(), 1);
        let hello: Value = serde_json::from_str(&sent[0].1).unwrap();
        assert_eq!(hello["type"], "hello");
        assert_eq!(hello["source"], "gnssai-k922-com1-panel");
    }

    #[test]
    fn test_reconnect_closes_previous_link_first() {
        // Arrange
        let (mut client, connector) = connected_client();
        let first = client.generation();

        // Act
        client.connect("ws://backend.local:9999").unwrap();

        // Assert
        assert_eq!(connector.closed(), vec![first]);
        assert_eq!(connector.open_links(), 1);
        assert_eq!(client.state(), ConnectionState::Connecting);
        assert!(client.generation() > first);
    }

    #[test]
    fn test_events_from_replaced_link_are_ignored() {
        // Arrange
        let (mut client, _connector) = connected_client();
        let stale = client.generation();
        client.connect("ws://backend.local:9999").unwrap();

        // Act: the old link reports its close and a late frame
        let frame = client.handle_event(TaggedEvent {
            generation: stale,
            event: LinkEvent::Frame(r#"{"type":"k922Status","payload":{}}"#.to_string()),
        });
        client.handle_event(TaggedEvent {
            generation: stale,
            event: LinkEvent::Closed,
        });

        // Assert
        assert!(frame.is_none());
        assert_eq!(client.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_request_status_while_disconnected_sends_nothing() {
        let connector = MockConnector::new();
        let (mut client, _rx) = TransportClient::new(connector.clone());

        let result = client.request_status();

        assert!(matches!(result, Err(TransportError::NotConnected)));
        assert!(connector.sent().is_empty());
    }

    #[test]
    fn test_apply_while_connecting_sends_nothing() {
        let connector = MockConnector::new();
        let (mut client, _rx) = TransportClient::new(connector.clone());
        client.connect("ws://backend.local:8765").unwrap();

        let result = client.apply_config(&Configuration::default());

        assert!(matches!(result, Err(TransportError::NotConnected)));
        assert!(connector.sent().is_empty());
    }

    #[test]
    fn test_request_status_sends_get_status() {
        let (mut client, connector) = connected_client();

        client.request_status().unwrap();

        let sent = connector.sent();
        assert_eq!(sent.last().unwrap().1, r#"{"type":"getK922Status"}"#);
    }

    #[test]
    fn test_apply_config_sends_payload() {
        // Arrange
        let (mut client, connector) = connected_client();
        let mut cfg = Configuration::default();
        cfg.nmea.talker = "GP".to_string();

        // Act
        client.apply_config(&cfg).unwrap();

        // Assert
        let sent: Value = serde_json::from_str(&connector.sent().last().unwrap().1).unwrap();
        assert_eq!(sent["type"], "applyK922Config");
        assert_eq!(sent["payload"]["nmea"]["talker"], "GP");
    }

    #[test]
    fn test_frame_is_classified() {
        let (mut client, _connector) = connected_client();

        let raw = client.handle_event(event(&client, LinkEvent::Frame("$GNGGA,...".to_string())));
        let status = client.handle_event(event(
            &client,
            LinkEvent::Frame(r#"{"type":"k922Status","payload":{"mode":"RTK_FIXED"}}"#.to_string()),
        ));

        assert_eq!(raw, Some(Inbound::Raw));
        assert!(matches!(status, Some(Inbound::Status(Some(_)))));
    }

    #[test]
    fn test_error_does_not_change_state() {
        let (mut client, _connector) = connected_client();

        client.handle_event(event(&client, LinkEvent::Error("reset by peer".to_string())));

        assert!(client.is_connected());
    }

    #[test]
    fn test_closed_event_disconnects() {
        let (mut client, connector) = connected_client();

        client.handle_event(event(&client, LinkEvent::Closed));

        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(matches!(client.request_status(), Err(TransportError::NotConnected)));
        assert_eq!(connector.sent().len(), 1, "only the hello");
    }

    #[test]
    fn test_close_disconnects_and_closes_link() {
        let (mut client, connector) = connected_client();
        let generation = client.generation();

        client.close();

        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert_eq!(connector.closed(), vec![generation]);
        assert_eq!(connector.open_links(), 0);
    }

    #[test]
    fn test_send_failure_is_reported() {
        let (mut client, connector) = connected_client();
        connector.fail_sends(true);

        let result = client.request_status();

        assert!(matches!(result, Err(TransportError::SendFailed(_))));
    }
}
