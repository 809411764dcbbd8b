//! Session status type definitions
//!
//! Status enums shared by the session controller and its consumers.

use serde::{Deserialize, Serialize};

/// Connection status of the playback engine
///
/// `Crashed` is only entered through a panic reported by the engine and is
/// left again as soon as the engine starts a new connection attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Crashed,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Crashed => write!(f, "crashed"),
        }
    }
}

/// Status of the current media
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    #[default]
    NoMedia,
    Loading,
    Loaded,
    Buffering,
    Stalled,
    Buffered,
    EndOfMedia,
    InvalidMedia,
    Unknown,
}

impl MediaStatus {
    /// Whether position and duration carry meaning in this status
    pub fn has_timing(&self) -> bool {
        !matches!(self, MediaStatus::NoMedia | MediaStatus::InvalidMedia)
    }
}

impl std::fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaStatus::NoMedia => write!(f, "no_media"),
            MediaStatus::Loading => write!(f, "loading"),
            MediaStatus::Loaded => write!(f, "loaded"),
            MediaStatus::Buffering => write!(f, "buffering"),
            MediaStatus::Stalled => write!(f, "stalled"),
            MediaStatus::Buffered => write!(f, "buffered"),
            MediaStatus::EndOfMedia => write!(f, "end_of_media"),
            MediaStatus::InvalidMedia => write!(f, "invalid_media"),
            MediaStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Playback state enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Kind of the last error reported by the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    #[default]
    None,
    MissingCredentials,
    IllegalConfig,
    IoError,
    ConnectionError,
    Panic,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::None => write!(f, "none"),
            ErrorKind::MissingCredentials => write!(f, "missing_credentials"),
            ErrorKind::IllegalConfig => write!(f, "illegal_config"),
            ErrorKind::IoError => write!(f, "io_error"),
            ErrorKind::ConnectionError => write!(f, "connection_error"),
            ErrorKind::Panic => write!(f, "panic"),
        }
    }
}
