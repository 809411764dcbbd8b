//! Engine callback adapter
//!
//! Receives engine callbacks on whatever thread the engine uses, copies the
//! borrowed arguments into an owned [`EngineEvent`] and queues it for the
//! controller. Never touches session state directly.
//!
//! The queue is an unbounded mpsc channel: callbacks must never block the
//! engine, and per-sender FIFO order is what keeps events from one engine
//! thread applied in the order they were fired.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{EngineCallbacks, EngineErrorKind};
use crate::events::EngineEvent;

/// Thread-safe callback sink handed to the engine
#[derive(Debug, Clone)]
pub struct CallbackAdapter {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl CallbackAdapter {
    /// Create an adapter and the receiving end owned by the controller
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: EngineEvent) {
        if let Err(e) = self.tx.send(event) {
            // Controller already torn down; nothing left to inform
            debug!("Dropping engine event after controller shutdown: {:?}", e.0);
        }
    }
}

impl EngineCallbacks for CallbackAdapter {
    fn stopped(&self, play_request_id: u64, track_id: &str) {
        self.forward(EngineEvent::Stopped {
            play_request_id,
            track_id: track_id.to_owned(),
        });
    }

    fn changed(&self, new_track_id: &str) {
        self.forward(EngineEvent::Changed {
            new_track_id: new_track_id.to_owned(),
        });
    }

    fn loading(&self, play_request_id: u64, track_id: &str, position_ms: u32) {
        self.forward(EngineEvent::Loading {
            play_request_id,
            track_id: track_id.to_owned(),
            position_ms,
        });
    }

    fn playing(&self, play_request_id: u64, track_id: &str, position_ms: u32, duration_ms: u32) {
        self.forward(EngineEvent::Playing {
            play_request_id,
            track_id: track_id.to_owned(),
            position_ms,
            duration_ms,
        });
    }

    fn paused(&self, play_request_id: u64, track_id: &str, position_ms: u32, duration_ms: u32) {
        self.forward(EngineEvent::Paused {
            play_request_id,
            track_id: track_id.to_owned(),
            position_ms,
            duration_ms,
        });
    }

    fn unavailable(&self, play_request_id: u64, track_id: &str) {
        self.forward(EngineEvent::Unavailable {
            play_request_id,
            track_id: track_id.to_owned(),
        });
    }

    fn volume_changed(&self, volume: u16) {
        self.forward(EngineEvent::VolumeChanged { volume });
    }

    fn connecting(&self) {
        self.forward(EngineEvent::Connecting);
    }

    fn connected(&self) {
        self.forward(EngineEvent::Connected);
    }

    fn shutdown(&self) {
        self.forward(EngineEvent::Shutdown);
    }

    fn start_reconnect(&self) {
        self.forward(EngineEvent::StartReconnect);
    }

    fn token_changed(&self, access_token: &str, expires_in_secs: u32) {
        self.forward(EngineEvent::TokenChanged {
            access_token: access_token.to_owned(),
            expires_in_secs,
        });
    }

    fn token_refresh_failed(&self, message: &str) {
        self.forward(EngineEvent::TokenRefreshFailed {
            message: message.to_owned(),
        });
    }

    fn error(&self, kind: EngineErrorKind, message: &str) {
        let event = match kind {
            EngineErrorKind::Token => {
                warn!("Engine reported token error, routing to refresh failure");
                EngineEvent::TokenRefreshFailed {
                    message: message.to_owned(),
                }
            }
            kind => EngineEvent::Error {
                kind,
                message: message.to_owned(),
            },
        };
        self.forward(event);
    }
}
