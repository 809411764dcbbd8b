//! Scripted engine replay
//!
//! A replay script is a JSON-lines file. Each line is one of:
//!
//! ```text
//! {"kind":"event","event":{"type":"playing","play_request_id":1,"track_id":"t1","position_ms":0,"duration_ms":180000}}
//! {"kind":"command","command":{"name":"play"}}
//! {"kind":"sleep","ms":1500}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Events are fired
//! through the engine callback interface, commands are issued on the
//! controller, and the [`ReplayEngine`] records what it was asked to do.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::callback::CallbackAdapter;
use crate::controller::SessionController;
use crate::engine::PlaybackEngine;
use crate::events::EngineEvent;
use crate::{Error, Result};

/// One line of a replay script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptLine {
    /// Engine report to fire through the callbacks
    Event { event: EngineEvent },
    /// Consumer command to issue on the controller
    Command { command: SessionCommand },
    /// Pause the script
    Sleep { ms: u64 },
}

/// Consumer command as written in a script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum SessionCommand {
    SetUsername { value: String },
    SetPassword { value: String },
    Start,
    Stop,
    Logout,
    Play,
    Pause,
    Next,
    Previous,
    RefreshAccessToken,
}

impl SessionCommand {
    /// Issue this command on a controller
    pub fn issue<E: PlaybackEngine>(&self, controller: &mut SessionController<E>) {
        match self {
            SessionCommand::SetUsername { value } => controller.set_username(value),
            SessionCommand::SetPassword { value } => controller.set_password(value),
            SessionCommand::Start => controller.start(),
            SessionCommand::Stop => controller.stop(),
            SessionCommand::Logout => controller.logout(),
            SessionCommand::Play => controller.play(),
            SessionCommand::Pause => controller.pause(),
            SessionCommand::Next => controller.next(),
            SessionCommand::Previous => controller.previous(),
            SessionCommand::RefreshAccessToken => controller.refresh_access_token(),
        }
    }
}

/// Parse a whole script, reporting the 1-based line of the first bad entry
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| Error::Script {
                line: index + 1,
                source,
            })
        })
        .collect()
}

/// Read and parse a script from a file, or from stdin when `path` is `None`
pub fn load_script(path: Option<&Path>) -> Result<Vec<ScriptLine>> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    parse_script(&text)
}

/// Engine stand-in that logs commands and tracks activity
///
/// Reports come from the script rather than from the engine itself, so the
/// engine only hands out its callback adapter to whoever plays the script.
#[derive(Debug)]
pub struct ReplayEngine {
    device_id: String,
    device_name: String,
    active: bool,
    callbacks: CallbackAdapter,
}

impl ReplayEngine {
    pub fn new(device_id: String, device_name: String, callbacks: CallbackAdapter) -> Self {
        Self {
            device_id,
            device_name,
            active: false,
            callbacks,
        }
    }

    /// Adapter to fire scripted events through
    pub fn callbacks(&self) -> CallbackAdapter {
        self.callbacks.clone()
    }
}

impl PlaybackEngine for ReplayEngine {
    fn set_username(&mut self, username: &str) {
        info!("[replay engine] set_username({})", username);
    }

    fn set_password(&mut self, _password: &str) {
        info!("[replay engine] set_password(<redacted>)");
    }

    fn start(&mut self) {
        info!("[replay engine] start");
        self.active = true;
    }

    fn stop(&mut self) {
        info!("[replay engine] stop");
    }

    fn logout(&mut self) {
        info!("[replay engine] logout");
        self.active = false;
    }

    fn play(&mut self) {
        info!("[replay engine] play");
    }

    fn pause(&mut self) {
        info!("[replay engine] pause");
    }

    fn next(&mut self) {
        info!("[replay engine] next");
    }

    fn previous(&mut self) {
        info!("[replay engine] previous");
    }

    fn refresh_access_token(&mut self) {
        info!("[replay engine] refresh_access_token");
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn device_name(&self) -> &str {
        &self.device_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonearm_common::config::SessionSettings;
    use tonearm_common::events::PlaybackState;

    const SCRIPT: &str = r#"
# login and play one track
{"kind":"command","command":{"name":"set_username","value":"alice"}}
{"kind":"command","command":{"name":"start"}}
{"kind":"event","event":{"type":"connected"}}

{"kind":"sleep","ms":250}
{"kind":"event","event":{"type":"playing","play_request_id":1,"track_id":"t1","position_ms":0,"duration_ms":1000}}
"#;

    #[test]
    fn test_parse_script_skips_comments_and_blanks() {
        let lines = parse_script(SCRIPT).unwrap();

        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            ScriptLine::Command {
                command: SessionCommand::SetUsername {
                    value: "alice".to_string()
                }
            }
        );
        assert_eq!(
            lines[2],
            ScriptLine::Event {
                event: EngineEvent::Connected
            }
        );
        assert_eq!(lines[3], ScriptLine::Sleep { ms: 250 });
    }

    #[test]
    fn test_parse_script_reports_line_number() {
        let text = "{\"kind\":\"sleep\",\"ms\":1}\n\n{\"kind\":\"bogus\"}\n";

        let err = parse_script(text).unwrap_err();

        match err {
            Error::Script { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_script_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("session.jsonl");
        std::fs::write(&path, SCRIPT).unwrap();

        let lines = load_script(Some(&path)).unwrap();

        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_load_script_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();

        let err = load_script(Some(&dir.path().join("missing.jsonl"))).unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_commands_and_events_reach_controller() {
        let mut controller = SessionController::new(&SessionSettings::default(), |callbacks| {
            ReplayEngine::new("dev".to_string(), "Replay".to_string(), callbacks)
        });
        let callbacks = controller.engine().callbacks();

        for line in parse_script(SCRIPT).unwrap() {
            match line {
                ScriptLine::Event { event } => event.dispatch(&callbacks),
                ScriptLine::Command { command } => command.issue(&mut controller),
                ScriptLine::Sleep { .. } => {}
            }
        }
        controller.drain_pending();

        assert!(controller.is_active());
        assert_eq!(controller.username(), "alice");
        assert_eq!(controller.playback_state(), PlaybackState::Playing);
        assert_eq!(controller.track_id(), "t1");
        assert_eq!(controller.device_name(), "Replay");
    }
}
