//! Configuration management for Twinstick Pad
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.
//! Every section is optional; a missing file section falls back to defaults.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::input::vector::Vector2;

pub use watcher::{ConfigChange, ConfigWatcher};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub tuning: TuningConfig,
}

/// Remote peer connection
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Complete WebSocket URL, e.g. `ws://192.168.1.20:8081/ws`
    #[serde(default = "default_server_url")]
    pub url: String,
}

/// Player identity sent with every message
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pseudo: Option<String>,
}

/// On-screen placement of both joystick widgets
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayoutConfig {
    /// Knob radius subtracted from each widget half-width
    #[serde(default = "default_knob_inset")]
    pub knob_inset: f64,
    #[serde(rename = "move", default = "default_move_widget")]
    pub move_stick: WidgetConfig,
    #[serde(rename = "aim", default = "default_aim_widget")]
    pub aim_stick: WidgetConfig,
}

/// One joystick widget
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct WidgetConfig {
    /// Absolute center in screen pixels
    pub center: Vector2,
    /// Rendered width in screen pixels
    pub width: f64,
}

/// Emission thresholds and timing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TuningConfig {
    /// Move sampler period
    #[serde(default = "default_move_interval_ms")]
    pub move_interval_ms: u64,
    /// Move-stick deadzone radius in pixels
    #[serde(default = "default_move_deadzone")]
    pub move_deadzone: f64,
    /// Aim release distance above which a shot is fired
    #[serde(default = "default_shoot_threshold")]
    pub shoot_threshold: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            knob_inset: default_knob_inset(),
            move_stick: default_move_widget(),
            aim_stick: default_aim_widget(),
        }
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            move_interval_ms: default_move_interval_ms(),
            move_deadzone: default_move_deadzone(),
            shoot_threshold: default_shoot_threshold(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn parse(contents: &str) -> Result<Self> {
        // An empty file deserializes to `null`; treat it as all defaults
        let config: AppConfig = if contents.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(contents)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            anyhow::bail!("server.url cannot be empty");
        }

        if let Some(pseudo) = &self.player.pseudo {
            if pseudo.trim().is_empty() {
                anyhow::bail!("player.pseudo cannot be blank (omit it to get a generated one)");
            }
        }

        if !self.layout.knob_inset.is_finite() || self.layout.knob_inset < 0.0 {
            anyhow::bail!(
                "layout.knob_inset must be a non-negative number (got {})",
                self.layout.knob_inset
            );
        }

        for (name, widget) in [("move", &self.layout.move_stick), ("aim", &self.layout.aim_stick)] {
            if !widget.width.is_finite() || widget.width <= 0.0 {
                anyhow::bail!("layout.{}.width must be positive (got {})", name, widget.width);
            }
            if !widget.center.x.is_finite() || !widget.center.y.is_finite() {
                anyhow::bail!("layout.{}.center must be finite", name);
            }
        }

        if self.tuning.move_interval_ms == 0 {
            anyhow::bail!("tuning.move_interval_ms must be at least 1");
        }
        if !self.tuning.move_deadzone.is_finite() || self.tuning.move_deadzone < 0.0 {
            anyhow::bail!(
                "tuning.move_deadzone must be a non-negative number (got {})",
                self.tuning.move_deadzone
            );
        }
        if !self.tuning.shoot_threshold.is_finite() || self.tuning.shoot_threshold < 0.0 {
            anyhow::bail!(
                "tuning.shoot_threshold must be a non-negative number (got {})",
                self.tuning.shoot_threshold
            );
        }

        Ok(())
    }
}

// Default value functions
fn default_server_url() -> String { "ws://127.0.0.1:8081/ws".to_string() }
fn default_knob_inset() -> f64 { crate::input::geometry::KNOB_INSET }
fn default_move_widget() -> WidgetConfig {
    WidgetConfig { center: Vector2::new(150.0, 300.0), width: 200.0 }
}
fn default_aim_widget() -> WidgetConfig {
    WidgetConfig { center: Vector2::new(650.0, 300.0), width: 200.0 }
}
fn default_move_interval_ms() -> u64 { 50 }
fn default_move_deadzone() -> f64 { crate::input::joystick::MOVE_DEADZONE }
fn default_shoot_threshold() -> f64 { crate::emission::SHOOT_THRESHOLD }

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.tuning.move_interval_ms, 50);
        assert_eq!(config.tuning.move_deadzone, 10.0);
        assert_eq!(config.tuning.shoot_threshold, 20.0);
        assert_eq!(config.layout.knob_inset, 25.0);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let yaml = r#"
server:
  url: "ws://10.0.0.5:8081/ws"
player:
  pseudo: "Alice"
layout:
  aim:
    center: { x: 900, y: 420 }
    width: 260
"#;
        let config = AppConfig::parse(yaml).unwrap();

        assert_eq!(config.server.url, "ws://10.0.0.5:8081/ws");
        assert_eq!(config.player.pseudo.as_deref(), Some("Alice"));
        assert_eq!(config.layout.aim_stick.center, Vector2::new(900.0, 420.0));
        assert_eq!(config.layout.aim_stick.width, 260.0);
        assert_eq!(config.layout.move_stick, default_move_widget());
        assert_eq!(config.tuning, TuningConfig::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(AppConfig::parse("server:\n  url: \"\"\n").is_err());
        assert!(AppConfig::parse("player:\n  pseudo: \"  \"\n").is_err());
        assert!(AppConfig::parse("tuning:\n  move_interval_ms: 0\n").is_err());
        assert!(AppConfig::parse("tuning:\n  shoot_threshold: -1\n").is_err());
        assert!(AppConfig::parse(
            "layout:\n  move:\n    center: { x: 0, y: 0 }\n    width: 0\n"
        )
        .is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("pad.yaml");
        std::fs::write(&path, "tuning:\n  move_interval_ms: 20\n")?;

        let config = AppConfig::load(&path.to_string_lossy()).await?;
        assert_eq!(config.tuning.move_interval_ms, 20);

        assert!(AppConfig::load("/definitely/not/here.yaml").await.is_err());
        Ok(())
    }
}
