//! Player identity and the greeting label
//!
//! The pseudo is chosen once at startup and stamped on every outgoing frame.
//! The peer may later assign a player token; it is stored and shown on the
//! label but does not change what the client sends.

use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};

use crate::protocol::{IncomingMessage, PlayerToken};

/// Callback redrawing the greeting label
pub type LabelCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Pseudo used when none is configured: `Player` + 0..999
pub fn generate_pseudo() -> String {
    format!("Player{}", rand::thread_rng().gen_range(0..1000))
}

pub struct Session {
    pseudo: String,
    assigned: Option<PlayerToken>,
    label: String,
    on_label: Option<LabelCallback>,
}

impl Session {
    pub fn new(pseudo: impl Into<String>) -> Self {
        let pseudo = pseudo.into();
        let label = format!("Hello {}", pseudo);
        Self {
            pseudo,
            assigned: None,
            label,
            on_label: None,
        }
    }

    /// Attach the label side effect and draw the initial greeting
    pub fn with_label(mut self, on_label: LabelCallback) -> Self {
        on_label(&self.label);
        self.on_label = Some(on_label);
        self
    }

    pub fn pseudo(&self) -> &str {
        &self.pseudo
    }

    /// Token assigned by the peer, if any
    pub fn assigned(&self) -> Option<&PlayerToken> {
        self.assigned.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Handle a text frame from the peer.
    ///
    /// Returns `true` if the frame was consumed.
    pub fn on_text(&mut self, text: &str) -> bool {
        match IncomingMessage::parse(text) {
            Some(IncomingMessage::AssignId { player_id }) => {
                info!("🎮 Assigned player id {}", player_id);
                self.set_label(format!("Hello Player {}", player_id));
                self.assigned = Some(player_id);
                true
            }
            None => {
                debug!("Ignoring inbound frame: {}", text);
                false
            }
        }
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
        if let Some(on_label) = &self.on_label {
            on_label(&self.label);
        }
    }
}
