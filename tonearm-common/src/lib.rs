//! # Tonearm Common Library
//!
//! Shared code for the Tonearm session controller and its tools:
//! - Session status enums and change notifications (`SessionNotification`)
//! - Notification broadcasting (`EventBus`)
//! - TOML configuration loading and device identity
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
