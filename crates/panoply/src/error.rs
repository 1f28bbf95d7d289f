//! Session errors.

use panoply_networking::ProtocolError;
use panoply_shared::{PlayerId, SharedError};
use thiserror::Error;

/// Errors surfaced to the host by a session.
///
/// None of these are fatal; the session stays usable.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The player already has a watcher.
    #[error("player already joined: {0}")]
    AlreadyJoined(PlayerId),

    /// The player has no watcher.
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),

    /// A config could not be encoded.
    #[error("config encoding failed: {0}")]
    Config(#[from] SharedError),

    /// The channel refused a packet.
    #[error("channel error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
