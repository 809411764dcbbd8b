//! Playback engine boundary
//!
//! The engine is an independently implemented component. The controller
//! drives it through [`PlaybackEngine`] and hears back from it through
//! [`EngineCallbacks`]. Nothing about the engine's internals leaks past
//! these two traits.

use serde::{Deserialize, Serialize};
use tonearm_common::events::ErrorKind;

/// Error categories reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineErrorKind {
    MissingCredentials,
    IllegalConfig,
    Io,
    Connection,
    Panic,
    /// Access token renewal failed
    Token,
}

impl EngineErrorKind {
    /// Session-facing error kind
    ///
    /// `Token` has no counterpart: token failures are surfaced through their
    /// own notification and never replace the last session error.
    pub fn session_kind(self) -> Option<ErrorKind> {
        match self {
            EngineErrorKind::MissingCredentials => Some(ErrorKind::MissingCredentials),
            EngineErrorKind::IllegalConfig => Some(ErrorKind::IllegalConfig),
            EngineErrorKind::Io => Some(ErrorKind::IoError),
            EngineErrorKind::Connection => Some(ErrorKind::ConnectionError),
            EngineErrorKind::Panic => Some(ErrorKind::Panic),
            EngineErrorKind::Token => None,
        }
    }
}

/// Command interface of the playback engine
///
/// Every command is a non-blocking dispatch. The engine acknowledges (or
/// silently declines) through later callbacks, never through a return value
/// and never synchronously from inside the command.
pub trait PlaybackEngine: Send {
    fn set_username(&mut self, username: &str);
    fn set_password(&mut self, password: &str);

    /// Begin operating (connect) with the credentials set so far
    fn start(&mut self);
    /// Stop playback; connectivity is left alone
    fn stop(&mut self);
    /// Invalidate stored credentials and the session
    fn logout(&mut self);

    fn play(&mut self);
    fn pause(&mut self);
    fn next(&mut self);
    fn previous(&mut self);

    /// Ask for a fresh access token ahead of expiry
    fn refresh_access_token(&mut self);

    fn is_active(&self) -> bool;

    /// Immutable for the engine's lifetime
    fn device_id(&self) -> &str;

    /// Immutable for the engine's lifetime
    fn device_name(&self) -> &str;
}

/// Callback interface the engine reports through
///
/// May be invoked from any thread. String arguments are only borrowed for
/// the duration of the call; implementations must copy what they keep.
pub trait EngineCallbacks: Send + Sync {
    fn stopped(&self, play_request_id: u64, track_id: &str);
    fn changed(&self, new_track_id: &str);
    fn loading(&self, play_request_id: u64, track_id: &str, position_ms: u32);
    fn playing(&self, play_request_id: u64, track_id: &str, position_ms: u32, duration_ms: u32);
    fn paused(&self, play_request_id: u64, track_id: &str, position_ms: u32, duration_ms: u32);
    fn unavailable(&self, play_request_id: u64, track_id: &str);
    fn volume_changed(&self, volume: u16);
    fn connecting(&self);
    fn connected(&self);
    fn shutdown(&self);
    fn start_reconnect(&self);
    fn token_changed(&self, access_token: &str, expires_in_secs: u32);
    fn token_refresh_failed(&self, message: &str);
    fn error(&self, kind: EngineErrorKind, message: &str);
}
