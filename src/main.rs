//! Twinstick Pad - dual joystick remote control client
//!
//! Reads pointer events for the move and aim joysticks, turns them into
//! MOVE_VECTOR / AIM_VECTOR / SHOOT_ANGLE frames, and streams them to the game
//! server over WebSocket.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use twinstick_pad::channel::ws::{ChannelEvent, WsTransport};
use twinstick_pad::channel::{DryRunTransport, MessageChannel, Transport};
use twinstick_pad::config::{AppConfig, ConfigChange, ConfigWatcher};
use twinstick_pad::input::script::spawn_reader;
use twinstick_pad::input::{KnobOffset, LiveLayout, StickRole};
use twinstick_pad::session::{generate_pseudo, Session};
use twinstick_pad::TwinStickPad;

/// Twinstick Pad - stream twin-stick joystick input to a game server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "pad.yaml")]
    config: String,

    /// WebSocket URL of the game server (overrides server.url)
    #[arg(short, long, env = "PAD_URL")]
    url: Option<String>,

    /// Display name sent with every frame (overrides player.pseudo)
    #[arg(short, long, env = "PAD_PSEUDO")]
    pseudo: Option<String>,

    /// Pointer script to replay (JSON lines); reads stdin when absent
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Log frames instead of connecting
    #[arg(long)]
    dry_run: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write daily-rotated JSON logs into this directory
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let _log_guard = init_logging(&args.log_level, args.log_file.as_deref())?;

    info!("Starting Twinstick Pad...");

    let (mut config, mut config_watcher) = load_config(&args.config).await?;

    if let Some(url) = &args.url {
        config.server.url = url.clone();
    }
    if let Some(pseudo) = &args.pseudo {
        config.player.pseudo = Some(pseudo.clone());
    }
    config.validate().context("Invalid configuration")?;

    let pseudo = config.player.pseudo.clone().unwrap_or_else(generate_pseudo);
    info!("Playing as {}", pseudo);

    // Channel: real socket or dry-run logger
    let (transport, mut channel_events, ws) = if args.dry_run {
        info!("Dry run: frames are logged, not sent");
        (Arc::new(DryRunTransport::new()) as Arc<dyn Transport>, None, None)
    } else {
        info!("Connecting to {}", config.server.url);
        let (ws, events) = WsTransport::spawn(config.server.url.clone());
        (ws.clone() as Arc<dyn Transport>, Some(events), Some(ws))
    };
    let channel = MessageChannel::new(transport, pseudo.clone());

    let session = Session::new(pseudo).with_label(Arc::new(|label: &str| {
        println!("{}", label.bold().green());
    }));

    let layout = LiveLayout::new(config.layout.clone());
    let mut pad = TwinStickPad::new(
        &config.tuning,
        layout.widget(StickRole::Move),
        layout.widget(StickRole::Aim),
        channel,
        session,
    )
    .with_knob(Arc::new(|role: StickRole, offset: KnobOffset| match offset {
        KnobOffset::Resting => trace!("{} knob at rest", role),
        KnobOffset::Displaced(d) => trace!("{} knob at ({:.1}, {:.1})", role, d.x, d.y),
    }));

    let mut pointer_rx = match &args.script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open pointer script: {}", path.display()))?;
            info!("Replaying pointer script {}", path.display());
            spawn_reader(file)
        }
        None => {
            info!("Reading pointer events from stdin");
            spawn_reader(tokio::io::stdin())
        }
    };

    let mut ticker = pad.sampler().ticker();
    info!(
        "Sampling move stick every {}ms",
        pad.sampler().period().as_millis()
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    // One loop, one handler at a time
    loop {
        tokio::select! {
            Some(event) = pointer_rx.recv() => {
                pad.dispatch(event);
            }

            _ = ticker.tick() => {
                pad.sample_move();
            }

            Some(event) = next_channel_event(&mut channel_events) => {
                match event {
                    ChannelEvent::Opened => {
                        info!("Channel open, streaming as {}", pad.session().pseudo());
                    }
                    ChannelEvent::Text(text) => pad.on_channel_text(&text),
                    ChannelEvent::Closed { reason } => {
                        warn!("🔌 Channel closed ({}); frames will be dropped", reason);
                    }
                }
            }

            Some(change) = next_config_change(&mut config_watcher) => {
                apply_reload(&layout, change);
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    info!("Shutting down...");
    if let Some(ws) = ws {
        ws.close();
        // Give the writer a moment to flush the close frame
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    info!("Twinstick Pad shutdown complete");

    Ok(())
}

/// Load the config file with hot reload, or fall back to defaults if it is absent
async fn load_config(path: &str) -> Result<(AppConfig, Option<ConfigWatcher>)> {
    if !Path::new(path).exists() {
        info!("No configuration file at {}, using defaults", path);
        return Ok((AppConfig::default(), None));
    }

    let (watcher, initial_config) = ConfigWatcher::new(path.to_string()).await?;
    info!("Configuration loaded from {} with hot-reload enabled", path);
    Ok(((*initial_config).clone(), Some(watcher)))
}

/// Layout changes apply live; everything else needs a restart
fn apply_reload(layout: &LiveLayout, change: ConfigChange) {
    info!("📝 Configuration file changed, reloading...");

    if let Some(new_layout) = change.layout {
        layout.update(new_layout);
        info!("✅ Joystick layout updated");
    } else {
        debug!("Layout unchanged");
    }

    if !change.restart_required.is_empty() {
        warn!(
            "⚠️  Changes to {} take effect after restart",
            change.restart_required.join(", ")
        );
    }
}

async fn next_channel_event(
    events: &mut Option<mpsc::UnboundedReceiver<ChannelEvent>>,
) -> Option<ChannelEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_config_change(watcher: &mut Option<ConfigWatcher>) -> Option<ConfigChange> {
    match watcher {
        Some(w) => w.next_change().await,
        None => std::future::pending().await,
    }
}

fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // stdout carries the label; logs go to stderr
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "twinstick-pad.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
