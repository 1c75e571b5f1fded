//! Recording connector for unit testing.
//!
//! [`MockConnector`] builds links that never touch the network.  Every link
//! it hands out writes into one shared record, so a test can keep a clone of
//! the connector and inspect what the transport opened, sent and closed.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;

use crate::application::transport::{Connector, Link, TaggedEvent, TransportError};

#[derive(Debug, Default)]
struct Record {
    opened: Vec<String>,
    sent: Vec<(u64, String)>,
    closed: Vec<u64>,
    reject_urls: bool,
    fail_sends: bool,
}

/// A [`Connector`] whose links only record what happens to them.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    record: Arc<Mutex<Record>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector that refuses every URL with [`TransportError::InvalidUrl`].
    pub fn rejecting() -> Self {
        let connector = Self::new();
        connector.record.lock().expect("lock poisoned").reject_urls = true;
        connector
    }

    /// Makes every subsequent `send` fail.
    pub fn fail_sends(&self, fail: bool) {
        self.record.lock().expect("lock poisoned").fail_sends = fail;
    }

    /// URLs of every link opened so far.
    pub fn opened_urls(&self) -> Vec<String> {
        self.record.lock().expect("lock poisoned").opened.clone()
    }

    /// `(generation, text)` of every frame sent so far.
    pub fn sent(&self) -> Vec<(u64, String)> {
        self.record.lock().expect("lock poisoned").sent.clone()
    }

    /// Generations of the links closed so far.
    pub fn closed(&self) -> Vec<u64> {
        self.record.lock().expect("lock poisoned").closed.clone()
    }

    /// Links opened and not yet closed.
    pub fn open_links(&self) -> usize {
        let record = self.record.lock().expect("lock poisoned");
        record.opened.len() - record.closed.len()
    }
}

impl Connector for MockConnector {
    fn open(
        &self,
        url: &str,
        generation: u64,
        _events: UnboundedSender<TaggedEvent>,
    ) -> Result<Box<dyn Link>, TransportError> {
        let mut record = self.record.lock().expect("lock poisoned");
        if record.reject_urls {
            return Err(TransportError::InvalidUrl {
                url: url.to_string(),
                reason: "rejected by mock".to_string(),
            });
        }
        record.opened.push(url.to_string());
        Ok(Box::new(MockLink {
            generation,
            record: Arc::clone(&self.record),
            closed: false,
        }))
    }
}

struct MockLink {
    generation: u64,
    record: Arc<Mutex<Record>>,
    closed: bool,
}

impl Link for MockLink {
    fn send(&mut self, text: String) -> Result<(), TransportError> {
        let mut record = self.record.lock().expect("lock poisoned");
        if record.fail_sends || self.closed {
            return Err(TransportError::SendFailed("mock link refused the frame".to_string()));
        }
        record.sent.push((self.generation, text));
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.record.lock().expect("lock poisoned").closed.push(self.generation);
        }
    }
}
