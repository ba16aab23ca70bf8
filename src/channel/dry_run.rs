//! Offline transport that logs frames instead of sending them

use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use super::Transport;

/// Always-open transport printing every frame through `tracing`
#[derive(Default)]
pub struct DryRunTransport {
    sent: AtomicU64,
}

impl DryRunTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames accepted so far
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

impl Transport for DryRunTransport {
    fn is_open(&self) -> bool {
        true
    }

    fn send_text(&self, text: String) -> Result<()> {
        let n = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        info!(frame = n, "[dry-run] {}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_frames() {
        let transport = DryRunTransport::new();
        transport.send_text("{}".to_string()).unwrap();
        transport.send_text("{}".to_string()).unwrap();
        assert_eq!(transport.sent(), 2);
        assert!(transport.is_open());
    }
}
