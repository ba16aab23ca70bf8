//! Message channel to the remote peer
//!
//! [`MessageChannel`] is the single send capability shared by both emission
//! policies. Delivery is best-effort: a frame is serialized and handed to the
//! transport only while the transport reports itself open, and is otherwise
//! dropped on the floor. Nothing is queued for later and nothing is retried;
//! the next sample supersedes a lost one within tens of milliseconds.

pub mod dry_run;
pub mod ws;

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::protocol::{Envelope, OutgoingMessage};

pub use dry_run::DryRunTransport;
pub use ws::WsTransport;

/// Duplex connection seen from the sending side
///
/// Note: methods take &self so one transport can sit behind `Arc<dyn Transport>`.
pub trait Transport: Send + Sync {
    /// Whether the connection is open and ready to accept frames
    fn is_open(&self) -> bool;

    /// Hand one text frame to the connection (never blocks)
    fn send_text(&self, text: String) -> Result<()>;
}

/// Best-effort sender stamping every frame with the player's pseudo
#[derive(Clone)]
pub struct MessageChannel {
    transport: Arc<dyn Transport>,
    pseudo: String,
}

impl MessageChannel {
    pub fn new(transport: Arc<dyn Transport>, pseudo: impl Into<String>) -> Self {
        Self {
            transport,
            pseudo: pseudo.into(),
        }
    }

    pub fn pseudo(&self) -> &str {
        &self.pseudo
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Serialize and transmit `message` if the connection is open.
    ///
    /// Returns `true` when the frame was handed to the transport. A closed
    /// channel is not an error; transport faults are logged and swallowed.
    pub fn send_if_open(&self, message: OutgoingMessage) -> bool {
        if !self.transport.is_open() {
            return false;
        }

        let envelope = Envelope::new(self.pseudo.clone(), message);
        let text = match envelope.to_json() {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to encode {} frame: {}", message.command(), e);
                return false;
            }
        };

        match self.transport.send_text(text) {
            Ok(()) => {
                debug!("📤 {:?}", message);
                true
            }
            Err(e) => {
                warn!("Failed to send {} frame: {:#}", message.command(), e);
                false
            }
        }
    }
}

/// In-memory transport recording every frame it accepts
///
/// Used by tests to observe exactly what would have gone on the wire.
#[derive(Default)]
pub struct MemoryTransport {
    open: AtomicBool,
    frames: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn open() -> Arc<Self> {
        let transport = Self::default();
        transport.set_open(true);
        Arc::new(transport)
    }

    pub fn closed() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }

    /// Raw text frames accepted so far
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().clone()
    }

    /// Decoded frames accepted so far, draining the buffer
    pub fn take_envelopes(&self) -> Vec<Envelope> {
        self.frames
            .lock()
            .drain(..)
            .filter_map(|frame| serde_json::from_str(&frame).ok())
            .collect()
    }
}

impl Transport for MemoryTransport {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn send_text(&self, text: String) -> Result<()> {
        self.frames.lock().push(text);
        Ok(())
    }
}
