//! WebSocket transport
//!
//! Connects in the background and splits the socket into a writer task fed by
//! an unbounded queue and a reader task forwarding text frames to the caller.
//! Sends return immediately. Faults (close frames, read/write errors) are
//! logged, flip the transport to `Closed`, and are reported once on the event
//! stream. There is no reconnection.

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use super::Transport;

/// Ready state of the socket, mirroring the browser WebSocket states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closing => write!(f, "closing"),
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

/// Events surfaced by the reader side of the socket
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Handshake completed
    Opened,
    /// Text frame received from the peer
    Text(String),
    /// Connection ended (close frame, end of stream, or failed handshake)
    Closed { reason: String },
}

/// Client-side WebSocket connection
pub struct WsTransport {
    url: String,
    state: Arc<RwLock<ConnectionState>>,
    outbound: mpsc::UnboundedSender<Message>,
}

impl WsTransport {
    /// Start connecting to `url`.
    ///
    /// Returns immediately in the `Connecting` state; frames offered before the
    /// handshake completes are rejected by [`Transport::is_open`].
    pub fn spawn(url: impl Into<String>) -> (Arc<Self>, mpsc::UnboundedReceiver<ChannelEvent>) {
        let url = url.into();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<Message>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<ChannelEvent>();
        let state = Arc::new(RwLock::new(ConnectionState::Connecting));

        let transport = Arc::new(Self {
            url: url.clone(),
            state: Arc::clone(&state),
            outbound: outbound_tx,
        });

        tokio::spawn(run_socket(url, state, outbound_rx, event_tx));

        (transport, event_rx)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Send a close frame; further sends are dropped
    pub fn close(&self) {
        let mut state = self.state.write();
        if matches!(*state, ConnectionState::Open | ConnectionState::Connecting) {
            *state = ConnectionState::Closing;
            let _ = self.outbound.send(Message::Close(None));
            debug!("WebSocket close requested");
        }
    }
}

impl Transport for WsTransport {
    fn is_open(&self) -> bool {
        *self.state.read() == ConnectionState::Open
    }

    fn send_text(&self, text: String) -> Result<()> {
        self.outbound
            .send(Message::Text(text))
            .context("WebSocket writer task has stopped")
    }
}

async fn run_socket(
    url: String,
    state: Arc<RwLock<ConnectionState>>,
    mut outbound_rx: mpsc::UnboundedReceiver<Message>,
    event_tx: mpsc::UnboundedSender<ChannelEvent>,
) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            warn!("🔌 WebSocket connection to {} failed: {}", url, e);
            mark_closed(&state, &event_tx, e.to_string());
            return;
        }
    };

    {
        let mut guard = state.write();
        if *guard == ConnectionState::Connecting {
            *guard = ConnectionState::Open;
        }
    }
    info!("✅ WebSocket connected to {}", url);
    let _ = event_tx.send(ChannelEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    let writer_state = Arc::clone(&state);
    let writer_events = event_tx.clone();
    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if let Err(e) = write.send(msg).await {
                warn!("WebSocket write error: {}", e);
                mark_closed(&writer_state, &writer_events, format!("write failed: {}", e));
                break;
            }
            if closing {
                break;
            }
        }
    });

    let reason = loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => {
                debug!("📥 {}", text);
                if event_tx.send(ChannelEvent::Text(text)).is_err() {
                    break "event receiver dropped".to_string();
                }
            }
            Some(Ok(Message::Close(frame))) => {
                let reason = match frame {
                    Some(frame) => format!("closed by peer ({}: {})", frame.code, frame.reason),
                    None => "closed by peer".to_string(),
                };
                break reason;
            }
            Some(Ok(_)) => {
                // Binary, ping and pong frames carry nothing for us
            }
            Some(Err(e)) => {
                warn!("WebSocket read error: {}", e);
                break e.to_string();
            }
            None => break "stream ended".to_string(),
        }
    };

    mark_closed(&state, &event_tx, reason);
    writer.abort();
}

/// Move to `Closed` and emit `ChannelEvent::Closed`, once per connection.
///
/// Returns `false` when another side of the socket already reported it.
fn mark_closed(
    state: &RwLock<ConnectionState>,
    event_tx: &mpsc::UnboundedSender<ChannelEvent>,
    reason: String,
) -> bool {
    {
        let mut guard = state.write();
        if *guard == ConnectionState::Closed {
            return false;
        }
        *guard = ConnectionState::Closed;
    }

    info!("WebSocket closed: {}", reason);
    let _ = event_tx.send(ChannelEvent::Closed { reason });
    true
}
