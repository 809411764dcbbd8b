//! Notification types for the Tonearm event system
//!
//! Provides the change notifications raised by the session controller and
//! the `EventBus` that fans them out to consumers.

mod session_types;

pub use session_types::{ConnectionStatus, ErrorKind, MediaStatus, PlaybackState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Session change notifications
///
/// One variant per observable session field. State-change variants are only
/// raised when the value actually differs from the previous one; the token
/// and error variants are raised on every engine report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionNotification {
    /// Username stored for the next `start`
    UsernameChanged { username: String },

    /// Password stored for the next `start` (value deliberately omitted)
    PasswordChanged,

    /// Engine connection lifecycle moved
    ConnectionStatusChanged {
        old_status: ConnectionStatus,
        new_status: ConnectionStatus,
    },

    /// Media status of the current track changed
    MediaStatusChanged {
        old_status: MediaStatus,
        new_status: MediaStatus,
    },

    /// Playback state changed (Playing / Paused / Stopped)
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
    },

    /// Current track identifier changed (empty when none)
    TrackChanged { track_id: String },

    /// Displayed position changed (-1 when unknown)
    ///
    /// Raised for engine-reported positions and for the periodic
    /// extrapolation while playing.
    PositionChanged { position_ms: i64 },

    /// Track duration changed (-1 when unknown)
    DurationChanged { duration_ms: i64 },

    /// Engine volume changed
    VolumeChanged { volume: u16 },

    /// New access token delivered by the engine
    AccessTokenChanged {
        access_token: String,
        expires_at: DateTime<Utc>,
    },

    /// Engine failed to renew the access token
    AccessTokenRefreshFailed { message: String },

    /// Engine reported an error
    ErrorOccurred { kind: ErrorKind, message: String },
}

/// Broadcast bus for session notifications
///
/// Thin wrapper over `tokio::sync::broadcast`. Slow subscribers lag and lose
/// the oldest notifications rather than blocking the controller.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<SessionNotification>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero (tokio broadcast requirement). The
    /// session controller clamps a zero capacity before it gets here.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future notifications
    ///
    /// Notifications emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotification> {
        self.tx.subscribe()
    }

    /// Emit a notification, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, notification: SessionNotification) {
        let _ = self.tx.send(notification);
    }
}
