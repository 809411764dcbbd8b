//! Session controller
//!
//! Single owner of the session state. Engine callbacks are queued by the
//! [`CallbackAdapter`] from whatever thread the engine uses; the controller
//! drains that queue on its own task, applies each event strictly in arrival
//! order and publishes the resulting notifications as one batch per event.
//!
//! Commands are forwarded to the engine and never touch state themselves:
//! the engine is the sole arbiter, and its later callbacks are the only
//! source of truth.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use tonearm_common::config::SessionSettings;
use tonearm_common::events::{
    ConnectionStatus, EventBus, MediaStatus, PlaybackState, SessionNotification,
};
use tonearm_common::time;

use crate::callback::CallbackAdapter;
use crate::engine::{EngineErrorKind, PlaybackEngine};
use crate::events::EngineEvent;
use crate::position::PositionTracker;
use crate::state::{LastError, PlayerStatus, SessionState, UNKNOWN_MS};

/// Shortest accepted position refresh period
const MIN_POSITION_INTERVAL: Duration = Duration::from_millis(1);

/// Wall-clock source used for the position anchor and token expiry
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// What woke `step()` up
enum Wake {
    Event(Option<EngineEvent>),
    Tick,
}

/// Playback session state machine
pub struct SessionController<E: PlaybackEngine> {
    engine: E,
    state: SessionState,
    events_rx: mpsc::UnboundedReceiver<EngineEvent>,
    position: PositionTracker,
    bus: EventBus,
    clock: Clock,
}

impl<E: PlaybackEngine> SessionController<E> {
    /// Create the controller and acquire the engine
    ///
    /// `connect` receives the callback adapter the engine must report
    /// through; the adapter lives as long as the engine keeps it.
    pub fn new<F>(settings: &SessionSettings, connect: F) -> Self
    where
        F: FnOnce(CallbackAdapter) -> E,
    {
        if let Err(e) = settings.validate() {
            warn!("{}, falling back to the minimum", e);
        }
        let position_interval = settings.position_interval().max(MIN_POSITION_INTERVAL);
        let notification_capacity = settings.notification_capacity.max(1);

        let (callbacks, events_rx) = CallbackAdapter::channel();
        let engine = connect(callbacks);

        info!(
            "Session controller created (device {} \"{}\", position interval {}ms)",
            engine.device_id(),
            engine.device_name(),
            position_interval.as_millis()
        );

        Self {
            engine,
            state: SessionState::new(),
            events_rx,
            position: PositionTracker::new(position_interval),
            bus: EventBus::new(notification_capacity),
            clock: Arc::new(time::now),
        }
    }

    /// Replace the wall-clock source
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Subscribe to session notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotification> {
        self.bus.subscribe()
    }

    /// Full state snapshot by reference
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn username(&self) -> &str {
        &self.state.credentials().username
    }

    pub fn password(&self) -> &str {
        &self.state.credentials().password
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.state.connection_status()
    }

    pub fn media_status(&self) -> MediaStatus {
        self.state.media_status()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.state.playback_state()
    }

    pub fn track_id(&self) -> &str {
        self.state.track_id()
    }

    /// Position as of the last report or refresh tick
    pub fn position_ms(&self) -> i64 {
        self.state.position_ms()
    }

    /// Position extrapolated to this instant
    ///
    /// Same as `position_ms()` unless playing; -1 while the media has no
    /// timing.
    pub fn current_position_ms(&self) -> i64 {
        if !self.state.media_status().has_timing() {
            return UNKNOWN_MS;
        }
        self.position
            .extrapolate(self.state.duration_ms())
            .unwrap_or_else(|| self.state.position_ms())
    }

    pub fn duration_ms(&self) -> i64 {
        self.state.duration_ms()
    }

    /// Wall-clock instant of the last authoritative position (playing only)
    pub fn position_anchor(&self) -> Option<DateTime<Utc>> {
        self.position.anchor_timestamp()
    }

    pub fn is_position_timer_running(&self) -> bool {
        self.position.is_running()
    }

    pub fn volume(&self) -> u16 {
        self.state.volume()
    }

    pub fn access_token(&self) -> &str {
        self.state.access_token()
    }

    pub fn access_token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.access_token_expires_at()
    }

    pub fn last_error(&self) -> &LastError {
        self.state.last_error()
    }

    pub fn is_active(&self) -> bool {
        self.engine.is_active()
    }

    pub fn device_id(&self) -> &str {
        self.engine.device_id()
    }

    pub fn device_name(&self) -> &str {
        self.engine.device_name()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    pub fn set_username(&mut self, username: &str) {
        info!("Requested set_username");
        let mut out = Vec::new();
        self.state.set_username(username, &mut out);
        self.publish(out);
        self.engine.set_username(username);
    }

    pub fn set_password(&mut self, password: &str) {
        info!("Requested set_password");
        let mut out = Vec::new();
        self.state.set_password(password, &mut out);
        self.publish(out);
        self.engine.set_password(password);
    }

    pub fn start(&mut self) {
        info!("Requested start");
        self.engine.start();
    }

    pub fn stop(&mut self) {
        info!("Requested stop");
        self.engine.stop();
    }

    pub fn logout(&mut self) {
        info!("Requested logout");
        self.engine.logout();
    }

    pub fn play(&mut self) {
        info!("Requested play");
        self.engine.play();
    }

    pub fn pause(&mut self) {
        info!("Requested pause");
        self.engine.pause();
    }

    pub fn next(&mut self) {
        info!("Requested next");
        self.engine.next();
    }

    pub fn previous(&mut self) {
        info!("Requested previous");
        self.engine.previous();
    }

    pub fn refresh_access_token(&mut self) {
        info!("Requested refresh_access_token");
        self.engine.refresh_access_token();
    }

    // ------------------------------------------------------------------
    // Event processing
    // ------------------------------------------------------------------

    /// Wait for the next engine event or position tick and apply it
    ///
    /// Returns `false` once every callback adapter has been dropped and the
    /// queue is empty. Cancel safe: an event is either fully applied or
    /// still queued.
    pub async fn step(&mut self) -> bool {
        let wake = tokio::select! {
            biased;
            event = self.events_rx.recv() => Wake::Event(event),
            _ = self.position.tick() => Wake::Tick,
        };

        match wake {
            Wake::Event(Some(event)) => {
                self.apply(event);
                true
            }
            Wake::Event(None) => {
                info!("Engine callback queue closed");
                self.position.stop();
                false
            }
            Wake::Tick => {
                self.refresh_position();
                true
            }
        }
    }

    /// Apply every event already queued, without waiting
    ///
    /// Returns the number of events applied.
    pub fn drain_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Apply one engine event to the session state
    pub fn apply(&mut self, event: EngineEvent) {
        let mut out = Vec::new();

        match event {
            EngineEvent::Stopped {
                play_request_id,
                track_id,
            } => {
                info!("Stopped: {} (request {})", track_id, play_request_id);
                self.set_player_status(
                    PlayerStatus {
                        track_id,
                        position_ms: UNKNOWN_MS,
                        duration_ms: UNKNOWN_MS,
                        media_status: MediaStatus::NoMedia,
                        playback_state: PlaybackState::Stopped,
                    },
                    &mut out,
                );
            }
            EngineEvent::Changed { new_track_id } => {
                info!("Track changed: {}", new_track_id);
                self.state.set_track_id(&new_track_id, &mut out);
            }
            EngineEvent::Loading {
                play_request_id,
                track_id,
                position_ms,
            } => {
                info!(
                    "Loading: {} at {}ms (request {})",
                    track_id, position_ms, play_request_id
                );
                self.set_player_status(
                    PlayerStatus {
                        track_id,
                        position_ms: i64::from(position_ms),
                        duration_ms: UNKNOWN_MS,
                        media_status: MediaStatus::Loading,
                        playback_state: PlaybackState::Stopped,
                    },
                    &mut out,
                );
            }
            EngineEvent::Playing {
                play_request_id,
                track_id,
                position_ms,
                duration_ms,
            } => {
                info!(
                    "Playing: {} at {}ms / {}ms (request {})",
                    track_id, position_ms, duration_ms, play_request_id
                );
                self.set_player_status(
                    PlayerStatus {
                        track_id,
                        position_ms: i64::from(position_ms),
                        duration_ms: i64::from(duration_ms),
                        media_status: MediaStatus::Loaded,
                        playback_state: PlaybackState::Playing,
                    },
                    &mut out,
                );
            }
            EngineEvent::Paused {
                play_request_id,
                track_id,
                position_ms,
                duration_ms,
            } => {
                info!(
                    "Paused: {} at {}ms / {}ms (request {})",
                    track_id, position_ms, duration_ms, play_request_id
                );
                self.set_player_status(
                    PlayerStatus {
                        track_id,
                        position_ms: i64::from(position_ms),
                        duration_ms: i64::from(duration_ms),
                        media_status: MediaStatus::Loaded,
                        playback_state: PlaybackState::Paused,
                    },
                    &mut out,
                );
            }
            EngineEvent::Unavailable {
                play_request_id,
                track_id,
            } => {
                warn!("Unavailable: {} (request {})", track_id, play_request_id);
                self.set_player_status(
                    PlayerStatus {
                        track_id,
                        position_ms: UNKNOWN_MS,
                        duration_ms: UNKNOWN_MS,
                        media_status: MediaStatus::InvalidMedia,
                        playback_state: PlaybackState::Stopped,
                    },
                    &mut out,
                );
            }
            EngineEvent::VolumeChanged { volume } => {
                debug!("Volume changed: {}", volume);
                self.state.set_volume(volume, &mut out);
            }
            EngineEvent::Connecting => {
                info!("Connecting");
                self.state
                    .set_connection_status(ConnectionStatus::Connecting, &mut out);
            }
            EngineEvent::StartReconnect => {
                info!("Reconnecting");
                self.state
                    .set_connection_status(ConnectionStatus::Connecting, &mut out);
            }
            EngineEvent::Connected => {
                info!("Connected");
                self.set_connection_unless_crashed(ConnectionStatus::Connected, &mut out);
            }
            EngineEvent::Shutdown => {
                info!("Shutdown");
                self.set_connection_unless_crashed(ConnectionStatus::Disconnected, &mut out);
            }
            EngineEvent::TokenChanged {
                access_token,
                expires_in_secs,
            } => {
                let expires_at = time::expiry_after((self.clock)(), expires_in_secs);
                info!("Access token changed - expires in {}s", expires_in_secs);
                self.state
                    .set_access_token(&access_token, expires_at, &mut out);
            }
            EngineEvent::TokenRefreshFailed { message } => {
                self.token_refresh_failed(message, &mut out);
            }
            EngineEvent::Error { kind, message } => match kind.session_kind() {
                Some(session_kind) => {
                    error!("Engine error ({:?}): {}", kind, message);
                    if kind == EngineErrorKind::Panic {
                        self.state
                            .set_connection_status(ConnectionStatus::Crashed, &mut out);
                    }
                    self.state.set_error(session_kind, &message, &mut out);
                }
                None => self.token_refresh_failed(message, &mut out),
            },
        }

        self.publish(out);
    }

    /// Assign a media report and keep the position timer in step with it
    fn set_player_status(&mut self, status: PlayerStatus, out: &mut Vec<SessionNotification>) {
        self.state.set_player_status(status, out);

        let position_ms = self.state.position_ms();
        if self.state.playback_state() == PlaybackState::Playing && position_ms >= 0 {
            self.position.start(position_ms, (self.clock)());
        } else if self.position.is_running() {
            self.position.stop();
        }
    }

    /// Crashed only gives way to a new connection attempt
    fn set_connection_unless_crashed(
        &mut self,
        status: ConnectionStatus,
        out: &mut Vec<SessionNotification>,
    ) {
        if self.state.connection_status() == ConnectionStatus::Crashed {
            warn!("Ignoring {} while crashed", status);
            return;
        }
        self.state.set_connection_status(status, out);
    }

    fn token_refresh_failed(&mut self, message: String, out: &mut Vec<SessionNotification>) {
        error!("Access token refresh error: {}", message);
        out.push(SessionNotification::AccessTokenRefreshFailed { message });
    }

    /// Timer tick: publish the extrapolated position
    fn refresh_position(&mut self) {
        let Some(position_ms) = self.position.extrapolate(self.state.duration_ms()) else {
            return;
        };

        let mut out = Vec::new();
        self.state.set_position(position_ms, &mut out);
        if !out.is_empty() {
            debug!("Position refreshed: {}ms", position_ms);
        }
        self.publish(out);
    }

    fn publish(&self, notifications: Vec<SessionNotification>) {
        for notification in notifications {
            self.bus.emit_lossy(notification);
        }
    }
}

impl<E: PlaybackEngine> Drop for SessionController<E> {
    fn drop(&mut self) {
        self.position.stop();
        info!("Session controller torn down, releasing engine");
    }
}
