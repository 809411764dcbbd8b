//! # Tonearm Session Controller (tonearm-session)
//!
//! Playback-session state machine sitting between an external streaming
//! engine and its consumers.
//!
//! **Purpose:** Turn asynchronous engine callbacks (fired from arbitrary
//! threads) into one consistent session state owned by a single async task,
//! raise change notifications, forward user commands to the engine, and
//! extrapolate the playback position between engine reports.
//!
//! **Architecture:** engine callbacks -> `CallbackAdapter` (owned copy) ->
//! mpsc queue -> `SessionController` (single owner) -> `EventBus`

pub mod callback;
pub mod controller;
pub mod engine;
pub mod error;
pub mod events;
pub mod position;
pub mod replay;
pub mod state;

pub use callback::CallbackAdapter;
pub use controller::SessionController;
pub use engine::{EngineCallbacks, EngineErrorKind, PlaybackEngine};
pub use error::{Error, Result};
pub use events::EngineEvent;
pub use state::SessionState;
