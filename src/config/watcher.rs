//! Hot reload of the pad configuration file
//!
//! The parent directory is watched rather than the file itself so that editors
//! which save by writing a temp file and renaming it are still picked up.
//! Events for other files in that directory are ignored.
//!
//! Each reload is diffed against the last good config. Only the layout is
//! applied live; other sections are reported as needing a restart.

use anyhow::{anyhow, Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{AppConfig, LayoutConfig};

/// Delay between a file event and re-reading the file
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Difference between two successive loads of the config file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigChange {
    /// New joystick layout, when it changed
    pub layout: Option<LayoutConfig>,
    /// Sections that changed but only take effect after a restart
    pub restart_required: Vec<&'static str>,
}

impl ConfigChange {
    pub fn between(old: &AppConfig, new: &AppConfig) -> Self {
        let mut restart_required = Vec::new();
        if old.server != new.server {
            restart_required.push("server");
        }
        if old.player != new.player {
            restart_required.push("player");
        }
        if old.tuning != new.tuning {
            restart_required.push("tuning");
        }

        Self {
            layout: (old.layout != new.layout).then(|| new.layout.clone()),
            restart_required,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_none() && self.restart_required.is_empty()
    }
}

/// Watches the config file and yields a [`ConfigChange`] per effective edit
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<ConfigChange>,
}

impl ConfigWatcher {
    /// Load `config_path` and start watching it
    pub async fn new(config_path: String) -> Result<(Self, Arc<AppConfig>)> {
        let (tx, rx) = mpsc::channel(10);

        let initial_config = AppConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;
        let initial_config = Arc::new(initial_config);

        let path = PathBuf::from(&config_path);
        let file_name = path
            .file_name()
            .map(OsStr::to_os_string)
            .ok_or_else(|| anyhow!("Config path has no file name: {}", config_path))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let last_good = Arc::new(Mutex::new((*initial_config).clone()));

        // notify callbacks run on their own OS thread, not in Tokio context
        let runtime_handle = tokio::runtime::Handle::current();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    error!("Watch error: {}", e);
                    return;
                }
            };

            if !is_config_write(&event, &file_name) {
                return;
            }
            debug!("Config file event: {:?} {:?}", event.kind, event.paths);

            let config_path = config_path.clone();
            let last_good = Arc::clone(&last_good);
            let tx = tx.clone();

            runtime_handle.spawn(async move {
                tokio::time::sleep(DEBOUNCE).await;

                let new_config = match AppConfig::load(&config_path).await {
                    Ok(config) => config,
                    Err(e) => {
                        warn!("Failed to reload config (keeping old config): {:#}", e);
                        return;
                    }
                };

                let change = {
                    let mut last = last_good.lock();
                    let change = ConfigChange::between(&last, &new_config);
                    *last = new_config;
                    change
                };

                if change.is_empty() {
                    debug!("Config rewritten without changes");
                    return;
                }

                if let Err(e) = tx.send(change).await {
                    error!("Failed to send config update: {}", e);
                }
            });
        })?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config directory: {}", dir.display()))?;

        info!("Config file watcher started for: {}", path.display());

        Ok((
            Self {
                _watcher: watcher,
                rx,
            },
            initial_config,
        ))
    }

    /// Wait for the next effective change; `None` once the watcher is gone
    pub async fn next_change(&mut self) -> Option<ConfigChange> {
        self.rx.recv().await
    }
}

/// Content write or rename landing on the watched file name
fn is_config_write(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::fs;
    use tempfile::TempDir;

    const BASE: &str = r#"
layout:
  knob_inset: 25
  move:
    center: { x: 100, y: 100 }
    width: 200
"#;

    #[test]
    fn test_change_splits_live_and_restart_sections() {
        let old = AppConfig::default();

        let mut new = old.clone();
        new.layout.aim_stick.width = 300.0;
        new.tuning.shoot_threshold = 35.0;
        new.player.pseudo = Some("Alice".to_string());

        let change = ConfigChange::between(&old, &new);
        assert_eq!(change.layout, Some(new.layout.clone()));
        assert_eq!(change.restart_required, vec!["player", "tuning"]);

        assert!(ConfigChange::between(&new, &new).is_empty());
    }

    #[test]
    fn test_only_events_for_the_config_file_count() {
        let name = OsString::from("pad.yaml");
        let ours = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/srv/pad/pad.yaml"));
        let sibling = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/srv/pad/notes.txt"));
        let renamed_in =
            Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/srv/pad/pad.yaml"));
        let removed =
            Event::new(EventKind::Remove(RemoveKind::File)).add_path(PathBuf::from("/srv/pad/pad.yaml"));

        assert!(is_config_write(&ours, &name));
        assert!(is_config_write(&renamed_in, &name));
        assert!(!is_config_write(&sibling, &name));
        assert!(!is_config_write(&removed, &name));
    }

    #[tokio::test]
    async fn test_layout_edit_is_delivered() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("pad.yaml");
        fs::write(&config_path, BASE)?;

        let (mut watcher, config) =
            ConfigWatcher::new(config_path.to_string_lossy().to_string()).await?;
        assert_eq!(config.layout.move_stick.width, 200.0);

        let modified_config = r#"
layout:
  knob_inset: 30
  move:
    center: { x: 100, y: 100 }
    width: 320
"#;

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(&config_path, modified_config)?;

        let change = tokio::time::timeout(Duration::from_secs(2), watcher.next_change())
            .await?
            .expect("watcher stopped before reporting the edit");

        let layout = change.layout.expect("layout change not reported");
        assert_eq!(layout.knob_inset, 30.0);
        assert_eq!(layout.move_stick.width, 320.0);
        assert!(change.restart_required.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_tuning_edit_needs_restart() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("pad.yaml");
        fs::write(&config_path, BASE)?;

        let (mut watcher, _) =
            ConfigWatcher::new(config_path.to_string_lossy().to_string()).await?;

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(
            &config_path,
            format!("{}tuning:\n  shoot_threshold: 40\n", BASE),
        )?;

        let change = tokio::time::timeout(Duration::from_secs(2), watcher.next_change())
            .await?
            .expect("watcher stopped before reporting the edit");

        assert_eq!(change.layout, None);
        assert_eq!(change.restart_required, vec!["tuning"]);

        Ok(())
    }
}
