//! Error types for the equipment channel.

use thiserror::Error;

use panoply_shared::SharedError;

use crate::transport::PeerId;

/// Channel and framing errors.
///
/// None of these are fatal: receive-side errors drop the packet, send-side
/// errors drop the message. The next snapshot heals either.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Packet type byte is not one we know.
    #[error("Unknown packet type: {0}")]
    UnknownPacketType(u8),

    /// Slot index outside the five body slots.
    #[error("Invalid slot index: {0}")]
    InvalidSlot(u8),

    /// Same slot listed twice in one snapshot.
    #[error("Duplicate slot index: {0}")]
    DuplicateSlot(u8),

    /// More slot entries than slots exist.
    #[error("Too many slot entries: {0}")]
    TooManySlots(u8),

    /// Backpack discriminant out of range.
    #[error("Invalid backpack state: {0}")]
    InvalidBackpack(u8),

    /// Config payload is not UTF-8.
    #[error("Config payload is not valid UTF-8")]
    InvalidConfigText,

    /// Packet exceeds the configured size limit.
    #[error("Packet too large: {size} bytes (limit {limit})")]
    PacketTooLarge {
        /// Actual size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Send to a peer that is not connected.
    #[error("Peer {0} is not connected")]
    PeerNotConnected(PeerId),

    /// Remote end of the transport is gone.
    #[error("Transport disconnected")]
    Disconnected,

    /// Underlying field codec failure.
    #[error("Codec error: {0}")]
    Codec(#[from] SharedError),
}

/// Result type for channel operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
