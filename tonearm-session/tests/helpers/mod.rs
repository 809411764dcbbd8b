//! Test helpers for tonearm-session integration tests
//!
//! Provides a `FakeEngine` that records every command it receives and an
//! engine handle that lets tests fire engine callbacks and inspect commands.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tonearm_common::config::SessionSettings;
use tonearm_common::events::SessionNotification;
use tonearm_session::{CallbackAdapter, PlaybackEngine, SessionController};

/// Command as received by the fake engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetUsername(String),
    SetPassword(String),
    Start,
    Stop,
    Logout,
    Play,
    Pause,
    Next,
    Previous,
    RefreshAccessToken,
}

/// Engine double recording commands
pub struct FakeEngine {
    commands: Arc<Mutex<Vec<Command>>>,
    released: Arc<AtomicBool>,
    _callbacks: CallbackAdapter,
}

impl FakeEngine {
    fn record(&self, command: Command) {
        self.commands.lock().unwrap().push(command);
    }
}

impl PlaybackEngine for FakeEngine {
    fn set_username(&mut self, username: &str) {
        self.record(Command::SetUsername(username.to_string()));
    }
    fn set_password(&mut self, password: &str) {
        self.record(Command::SetPassword(password.to_string()));
    }
    fn start(&mut self) {
        self.record(Command::Start);
    }
    fn stop(&mut self) {
        self.record(Command::Stop);
    }
    fn logout(&mut self) {
        self.record(Command::Logout);
    }
    fn play(&mut self) {
        self.record(Command::Play);
    }
    fn pause(&mut self) {
        self.record(Command::Pause);
    }
    fn next(&mut self) {
        self.record(Command::Next);
    }
    fn previous(&mut self) {
        self.record(Command::Previous);
    }
    fn refresh_access_token(&mut self) {
        self.record(Command::RefreshAccessToken);
    }
    fn is_active(&self) -> bool {
        true
    }
    fn device_id(&self) -> &str {
        "0123456789abcdef0123456789abcdef"
    }
    fn device_name(&self) -> &str {
        "Test Device"
    }
}

impl Drop for FakeEngine {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Test-side view of the fake engine
pub struct EngineHandle {
    pub callbacks: CallbackAdapter,
    commands: Arc<Mutex<Vec<Command>>>,
    released: Arc<AtomicBool>,
}

impl EngineHandle {
    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    /// True once the controller dropped the engine
    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Controller over a fake engine with default settings
pub fn controller() -> (SessionController<FakeEngine>, EngineHandle) {
    controller_with(SessionSettings::default())
}

pub fn controller_with(settings: SessionSettings) -> (SessionController<FakeEngine>, EngineHandle) {
    let commands = Arc::new(Mutex::new(Vec::new()));
    let released = Arc::new(AtomicBool::new(false));
    let mut engine_callbacks = None;

    let controller = SessionController::new(&settings, |callbacks| {
        engine_callbacks = Some(callbacks.clone());
        FakeEngine {
            commands: Arc::clone(&commands),
            released: Arc::clone(&released),
            _callbacks: callbacks,
        }
    });

    let engine = EngineHandle {
        callbacks: engine_callbacks.expect("engine factory not called"),
        commands,
        released,
    };
    (controller, engine)
}

/// Collect every notification currently buffered for a subscriber
pub fn drain_notifications(
    rx: &mut broadcast::Receiver<SessionNotification>,
) -> Vec<SessionNotification> {
    let mut notifications = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        notifications.push(notification);
    }
    notifications
}
