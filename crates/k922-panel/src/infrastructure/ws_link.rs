//! WebSocket links built with tokio-tungstenite.
//!
//! Each link is one Tokio task:
//!
//! 1. `connect_async` performs the handshake, then reports
//!    [`LinkEvent::Opened`] (or [`LinkEvent::Error`] + [`LinkEvent::Closed`]).
//! 2. The socket is split.  One `select!` loop drains the outbound queue into
//!    the sink and forwards inbound text frames as [`LinkEvent::Frame`].
//! 3. Whatever ends the loop, the task reports [`LinkEvent::Closed`] last.
//!
//! [`WsLink::close`] aborts the task outright.  Anything still queued is
//! dropped, and no `Closed` event is reported for an aborted link; the
//! transport has already forgotten it.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest, handshake::client::Request, Error as WsError,
        Message as WsMessage,
    },
};
use tracing::{debug, warn};

use crate::application::transport::{Connector, Link, LinkEvent, TaggedEvent, TransportError};

/// Builds [`WsLink`]s.  Must be used from inside a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn open(
        &self,
        url: &str,
        generation: u64,
        events: UnboundedSender<TaggedEvent>,
    ) -> Result<Box<dyn Link>, TransportError> {
        let request = build_request(url)?;
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_link(request, generation, events, outbound_rx));
        Ok(Box::new(WsLink { outbound, task }))
    }
}

/// Validates `url` and turns it into a handshake request.
fn build_request(url: &str) -> Result<Request, TransportError> {
    let invalid = |reason: String| TransportError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let request = url.into_client_request().map_err(|e| invalid(e.to_string()))?;
    match request.uri().scheme_str() {
        Some("ws") | Some("wss") => Ok(request),
        other => Err(invalid(format!(
            "unsupported scheme {:?}; expected ws or wss",
            other.unwrap_or("")
        ))),
    }
}

/// A WebSocket link backed by a Tokio task.
pub struct WsLink {
    outbound: UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl Link for WsLink {
    fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.outbound
            .send(text)
            .map_err(|_| TransportError::SendFailed("link task has stopped".to_string()))
    }

    fn close(&mut self) {
        self.task.abort();
    }
}

impl Drop for WsLink {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_link(
    request: Request,
    generation: u64,
    events: UnboundedSender<TaggedEvent>,
    mut outbound: UnboundedReceiver<String>,
) {
    let emit = |event: LinkEvent| {
        // The receiver only goes away when the panel shuts down.
        let _ = events.send(TaggedEvent { generation, event });
    };

    let ws_stream = match connect_async(request).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!("link {generation}: handshake failed: {e}");
            emit(LinkEvent::Error(e.to_string()));
            emit(LinkEvent::Closed);
            return;
        }
    };
    emit(LinkEvent::Opened);

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    loop {
        tokio::select! {
            queued = outbound.recv() => match queued {
                Some(text) => {
                    if let Err(e) = ws_tx.send(WsMessage::Text(text)).await {
                        emit(LinkEvent::Error(e.to_string()));
                        break;
                    }
                }
                None => {
                    // Link handle dropped without abort.
                    let _ = ws_tx.close().await;
                    break;
                }
            },

            frame = ws_rx.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => emit(LinkEvent::Frame(text)),
                Some(Ok(WsMessage::Binary(data))) => {
                    debug!("link {generation}: binary frame ({} bytes)", data.len());
                    emit(LinkEvent::Frame(String::from_utf8_lossy(&data).into_owned()));
                }
                Some(Ok(WsMessage::Ping(data))) => {
                    debug!("link {generation}: WebSocket ping ({} bytes)", data.len());
                }
                Some(Ok(WsMessage::Pong(_))) => {
                    debug!("link {generation}: WebSocket pong received");
                }
                Some(Ok(WsMessage::Close(_))) => {
                    debug!("link {generation}: WebSocket Close frame received");
                    break;
                }
                Some(Ok(WsMessage::Frame(_))) => {
                    debug!("link {generation}: raw frame (ignored)");
                }
                Some(Err(WsError::ConnectionClosed)) | None => {
                    debug!("link {generation}: stream ended");
                    break;
                }
                Some(Err(e)) => {
                    emit(LinkEvent::Error(e.to_string()));
                    break;
                }
            },
        }
    }

    emit(LinkEvent::Closed);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
