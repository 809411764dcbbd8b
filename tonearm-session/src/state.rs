//! Session state
//!
//! Authoritative projection of the latest engine-reported truth. Owned and
//! mutated only by the `SessionController` on its own task; consumers read
//! it through `&SessionState`, never through a lock.
//!
//! Every setter appends the notifications it causes to an output buffer so
//! the controller can publish one batch per engine event.

use chrono::{DateTime, Utc};
use tonearm_common::events::{
    ConnectionStatus, ErrorKind, MediaStatus, PlaybackState, SessionNotification,
};

/// Position and duration value meaning "unknown"
pub const UNKNOWN_MS: i64 = -1;

/// Stored credentials, handed to the engine on `start`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Most recent engine error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Media-related fields reported together by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlayerStatus {
    pub track_id: String,
    pub position_ms: i64,
    pub duration_ms: i64,
    pub media_status: MediaStatus,
    pub playback_state: PlaybackState,
}

/// Complete session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    credentials: Credentials,
    connection_status: ConnectionStatus,
    media_status: MediaStatus,
    playback_state: PlaybackState,
    track_id: String,
    position_ms: i64,
    duration_ms: i64,
    volume: u16,
    access_token: String,
    access_token_expires_at: Option<DateTime<Utc>>,
    last_error: LastError,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            credentials: Credentials::default(),
            connection_status: ConnectionStatus::Disconnected,
            media_status: MediaStatus::NoMedia,
            playback_state: PlaybackState::Stopped,
            track_id: String::new(),
            position_ms: UNKNOWN_MS,
            duration_ms: UNKNOWN_MS,
            volume: 0,
            access_token: String::new(),
            access_token_expires_at: None,
            last_error: LastError::default(),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection_status
    }

    pub fn media_status(&self) -> MediaStatus {
        self.media_status
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback_state
    }

    /// Current track id, empty when none
    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    /// Last reported or extrapolated position (-1 when unknown)
    pub fn position_ms(&self) -> i64 {
        self.position_ms
    }

    /// Track duration (-1 when unknown)
    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn volume(&self) -> u16 {
        self.volume
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Absolute expiry of the current token, `None` before the first token
    pub fn access_token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.access_token_expires_at
    }

    pub fn last_error(&self) -> &LastError {
        &self.last_error
    }

    pub(crate) fn set_username(&mut self, username: &str, out: &mut Vec<SessionNotification>) {
        if self.credentials.username != username {
            self.credentials.username = username.to_owned();
            out.push(SessionNotification::UsernameChanged {
                username: username.to_owned(),
            });
        }
    }

    pub(crate) fn set_password(&mut self, password: &str, out: &mut Vec<SessionNotification>) {
        if self.credentials.password != password {
            self.credentials.password = password.to_owned();
            out.push(SessionNotification::PasswordChanged);
        }
    }

    pub(crate) fn set_connection_status(
        &mut self,
        status: ConnectionStatus,
        out: &mut Vec<SessionNotification>,
    ) {
        if self.connection_status != status {
            let old_status = std::mem::replace(&mut self.connection_status, status);
            out.push(SessionNotification::ConnectionStatusChanged {
                old_status,
                new_status: status,
            });
        }
    }

    /// Apply a combined media report
    ///
    /// Notifications are raised in a fixed order: media status, playback
    /// state, track, position, duration. All fields are assigned before
    /// any notification is queued.
    pub(crate) fn set_player_status(
        &mut self,
        status: PlayerStatus,
        out: &mut Vec<SessionNotification>,
    ) {
        let media_changed = self.media_status != status.media_status;
        let playback_changed = self.playback_state != status.playback_state;
        let track_changed = self.track_id != status.track_id;
        let position_changed = self.position_ms != status.position_ms;
        let duration_changed = self.duration_ms != status.duration_ms;

        let old_media = std::mem::replace(&mut self.media_status, status.media_status);
        let old_playback = std::mem::replace(&mut self.playback_state, status.playback_state);
        self.track_id = status.track_id;
        self.position_ms = status.position_ms;
        self.duration_ms = status.duration_ms;

        if media_changed {
            out.push(SessionNotification::MediaStatusChanged {
                old_status: old_media,
                new_status: self.media_status,
            });
        }
        if playback_changed {
            out.push(SessionNotification::PlaybackStateChanged {
                old_state: old_playback,
                new_state: self.playback_state,
            });
        }
        if track_changed {
            out.push(SessionNotification::TrackChanged {
                track_id: self.track_id.clone(),
            });
        }
        if position_changed {
            out.push(SessionNotification::PositionChanged {
                position_ms: self.position_ms,
            });
        }
        if duration_changed {
            out.push(SessionNotification::DurationChanged {
                duration_ms: self.duration_ms,
            });
        }
    }

    pub(crate) fn set_track_id(&mut self, track_id: &str, out: &mut Vec<SessionNotification>) {
        if self.track_id != track_id {
            self.track_id = track_id.to_owned();
            out.push(SessionNotification::TrackChanged {
                track_id: self.track_id.clone(),
            });
        }
    }

    pub(crate) fn set_position(&mut self, position_ms: i64, out: &mut Vec<SessionNotification>) {
        if self.position_ms != position_ms {
            self.position_ms = position_ms;
            out.push(SessionNotification::PositionChanged { position_ms });
        }
    }

    pub(crate) fn set_volume(&mut self, volume: u16, out: &mut Vec<SessionNotification>) {
        if self.volume != volume {
            self.volume = volume;
            out.push(SessionNotification::VolumeChanged { volume });
        }
    }

    /// Store a token; always notifies, even for an identical token
    pub(crate) fn set_access_token(
        &mut self,
        access_token: &str,
        expires_at: DateTime<Utc>,
        out: &mut Vec<SessionNotification>,
    ) {
        self.access_token = access_token.to_owned();
        self.access_token_expires_at = Some(expires_at);
        out.push(SessionNotification::AccessTokenChanged {
            access_token: self.access_token.clone(),
            expires_at,
        });
    }

    /// Record an engine error; always notifies
    pub(crate) fn set_error(
        &mut self,
        kind: ErrorKind,
        message: &str,
        out: &mut Vec<SessionNotification>,
    ) {
        self.last_error = LastError {
            kind,
            message: message.to_owned(),
        };
        out.push(SessionNotification::ErrorOccurred {
            kind,
            message: message.to_owned(),
        });
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
