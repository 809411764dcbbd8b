//! Internal engine events
//!
//! Owned copies of engine callbacks, queued by the callback adapter and
//! applied by the controller on its own context. These events are NOT
//! exposed to consumers; consumers see `SessionNotification`s instead.

use serde::{Deserialize, Serialize};

use crate::engine::{EngineCallbacks, EngineErrorKind};

/// One engine report, owned and ready to cross threads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    Stopped {
        play_request_id: u64,
        track_id: String,
    },
    Changed {
        new_track_id: String,
    },
    Loading {
        play_request_id: u64,
        track_id: String,
        position_ms: u32,
    },
    Playing {
        play_request_id: u64,
        track_id: String,
        position_ms: u32,
        duration_ms: u32,
    },
    Paused {
        play_request_id: u64,
        track_id: String,
        position_ms: u32,
        duration_ms: u32,
    },
    Unavailable {
        play_request_id: u64,
        track_id: String,
    },
    VolumeChanged {
        volume: u16,
    },
    Connecting,
    Connected,
    Shutdown,
    StartReconnect,
    TokenChanged {
        access_token: String,
        expires_in_secs: u32,
    },
    TokenRefreshFailed {
        message: String,
    },
    Error {
        kind: EngineErrorKind,
        message: String,
    },
}

impl EngineEvent {
    /// Re-emit this event through a callback interface
    ///
    /// Used by engines that record or script their reports and need to
    /// deliver them the same way a live engine would.
    pub fn dispatch(&self, callbacks: &dyn EngineCallbacks) {
        match self {
            EngineEvent::Stopped {
                play_request_id,
                track_id,
            } => callbacks.stopped(*play_request_id, track_id),
            EngineEvent::Changed { new_track_id } => callbacks.changed(new_track_id),
            EngineEvent::Loading {
                play_request_id,
                track_id,
                position_ms,
            } => callbacks.loading(*play_request_id, track_id, *position_ms),
            EngineEvent::Playing {
                play_request_id,
                track_id,
                position_ms,
                duration_ms,
            } => callbacks.playing(*play_request_id, track_id, *position_ms, *duration_ms),
            EngineEvent::Paused {
                play_request_id,
                track_id,
                position_ms,
                duration_ms,
            } => callbacks.paused(*play_request_id, track_id, *position_ms, *duration_ms),
            EngineEvent::Unavailable {
                play_request_id,
                track_id,
            } => callbacks.unavailable(*play_request_id, track_id),
            EngineEvent::VolumeChanged { volume } => callbacks.volume_changed(*volume),
            EngineEvent::Connecting => callbacks.connecting(),
            EngineEvent::Connected => callbacks.connected(),
            EngineEvent::Shutdown => callbacks.shutdown(),
            EngineEvent::StartReconnect => callbacks.start_reconnect(),
            EngineEvent::TokenChanged {
                access_token,
                expires_in_secs,
            } => callbacks.token_changed(access_token, *expires_in_secs),
            EngineEvent::TokenRefreshFailed { message } => callbacks.token_refresh_failed(message),
            EngineEvent::Error { kind, message } => callbacks.error(*kind, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_playing() {
        let event: EngineEvent = serde_json::from_str(
            r#"{"type":"playing","play_request_id":7,"track_id":"t1","position_ms":5000,"duration_ms":200000}"#,
        )
        .unwrap();

        assert_eq!(
            event,
            EngineEvent::Playing {
                play_request_id: 7,
                track_id: "t1".to_string(),
                position_ms: 5000,
                duration_ms: 200_000,
            }
        );
    }

    #[test]
    fn test_deserialize_unit_and_error_variants() {
        let event: EngineEvent = serde_json::from_str(r#"{"type":"start_reconnect"}"#).unwrap();
        assert_eq!(event, EngineEvent::StartReconnect);

        let event: EngineEvent =
            serde_json::from_str(r#"{"type":"error","kind":"panic","message":"boom"}"#).unwrap();
        assert_eq!(
            event,
            EngineEvent::Error {
                kind: EngineErrorKind::Panic,
                message: "boom".to_string(),
            }
        );
    }

    #[test]
    fn test_event_debug() {
        let event = EngineEvent::VolumeChanged { volume: 42 };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("VolumeChanged"));
        assert!(debug_str.contains("42"));
    }
}
