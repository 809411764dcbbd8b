//! Session replay (tonearm-session) - Main entry point
//!
//! Drives a `SessionController` from a JSON-lines script. Engine events are
//! fired through the callback adapter from a dedicated OS thread, the same
//! way a native engine would deliver them, and every session notification
//! is printed to stdout as one JSON line. Logs go to stderr.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tonearm_common::config::{self, TomlConfig};
use tonearm_common::events::SessionNotification;
use tonearm_session::replay::{self, ReplayEngine, ScriptLine, SessionCommand};
use tonearm_session::{CallbackAdapter, SessionController};

/// Command-line arguments for tonearm-session
#[derive(Parser, Debug)]
#[command(name = "tonearm-session")]
#[command(about = "Replay engine scripts through the Tonearm session controller")]
#[command(version)]
struct Args {
    /// JSON-lines replay script (reads stdin when omitted)
    script: Option<PathBuf>,

    /// Configuration file (TONEARM_CONFIG is consulted when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep processing position ticks this long after the script ends
    #[arg(long, default_value = "0")]
    linger_ms: u64,
}

/// What the main loop woke up for
enum Next {
    Command(Option<SessionCommand>),
    Stepped(bool),
    Interrupted,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = config::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&config);

    let device_id = config::resolve_device_id(
        config.engine.device_id.as_deref(),
        &config::default_config_dir(),
    )
    .context("Failed to resolve device id")?;

    let script = replay::load_script(args.script.as_deref()).context("Failed to load replay script")?;
    info!("Loaded replay script with {} entries", script.len());

    let device_name = config.engine.device_name.clone();
    let mut controller = SessionController::new(&config.session, |callbacks| {
        ReplayEngine::new(device_id, device_name, callbacks)
    });

    let printer = tokio::spawn(print_notifications(BroadcastStream::new(
        controller.subscribe(),
    )));

    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    let reader = spawn_script_thread(script, controller.engine().callbacks(), command_tx)?;

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut interrupted = false;
    loop {
        let next = tokio::select! {
            command = command_rx.recv() => Next::Command(command),
            alive = controller.step() => Next::Stepped(alive),
            _ = &mut shutdown => Next::Interrupted,
        };

        match next {
            Next::Command(Some(command)) => command.issue(&mut controller),
            Next::Command(None) => break,
            Next::Stepped(true) => {}
            Next::Stepped(false) => break,
            Next::Interrupted => {
                info!("Received Ctrl+C, shutting down");
                interrupted = true;
                break;
            }
        }
    }

    if !interrupted {
        reader
            .join()
            .map_err(|_| anyhow!("Script reader thread panicked"))?;
        let applied = controller.drain_pending();
        info!("Script finished, applied {} trailing events", applied);

        if args.linger_ms > 0 {
            linger(&mut controller, Duration::from_millis(args.linger_ms)).await;
        }
    }

    info!(
        "Final session: connection={} media={} playback={} track={:?} position={}ms",
        controller.connection_status(),
        controller.media_status(),
        controller.playback_state(),
        controller.track_id(),
        controller.current_position_ms()
    );

    drop(controller);
    printer.await.context("Notification printer failed")?;

    Ok(())
}

/// Tracing from RUST_LOG, falling back to the configured level
fn init_tracing(config: &TomlConfig) {
    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tonearm_session={level},tonearm_common={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Play the script from its own OS thread
///
/// Events go straight through the callback adapter, commands are handed
/// back to the owning task. The command channel closes when the script ends.
fn spawn_script_thread(
    script: Vec<ScriptLine>,
    callbacks: CallbackAdapter,
    commands: mpsc::UnboundedSender<SessionCommand>,
) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("script-reader".to_string())
        .spawn(move || {
            for line in script {
                match line {
                    ScriptLine::Event { event } => event.dispatch(&callbacks),
                    ScriptLine::Command { command } => {
                        if commands.send(command).is_err() {
                            return;
                        }
                    }
                    ScriptLine::Sleep { ms } => thread::sleep(Duration::from_millis(ms)),
                }
            }
        })
        .context("Failed to spawn script reader thread")
}

/// Keep applying events and position ticks for a fixed time
async fn linger(controller: &mut SessionController<ReplayEngine>, period: Duration) {
    let deadline = tokio::time::sleep(period);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            alive = controller.step() => {
                if !alive {
                    break;
                }
            }
            _ = &mut deadline => break,
        }
    }
}

/// Print each notification as a JSON line until the controller is gone
async fn print_notifications(mut notifications: BroadcastStream<SessionNotification>) {
    while let Some(item) = notifications.next().await {
        match item {
            Ok(notification) => match serde_json::to_string(&notification) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize notification: {}", e),
            },
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                warn!("Notification output lagged, {} notifications dropped", missed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tonearm_common::config::CONFIG_ENV_VAR;

    #[test]
    #[serial]
    fn test_config_env_var_not_bound_to_flag() {
        std::env::set_var(CONFIG_ENV_VAR, "/nonexistent/tonearm.toml");
        let args = Args::try_parse_from(["tonearm-session", "script.jsonl"]);
        std::env::remove_var(CONFIG_ENV_VAR);

        let args = args.unwrap();
        assert!(args.config.is_none());
        assert_eq!(args.script, Some(PathBuf::from("script.jsonl")));
    }

    #[test]
    #[serial]
    fn test_explicit_config_flag() {
        let args = Args::try_parse_from(["tonearm-session", "--config", "/etc/tonearm.toml"]).unwrap();

        assert_eq!(args.config, Some(PathBuf::from("/etc/tonearm.toml")));
        assert_eq!(args.linger_ms, 0);
    }
}
