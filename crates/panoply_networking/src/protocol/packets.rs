//! # Packet Definitions
//!
//! Every packet on the equipment channel. Payloads are the shared messages;
//! this module only adds the type tag.

use panoply_shared::{ConfigUpdateMessage, RequestMessage, UpdateMessage};

/// Types of packets in the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    /// Authority -> observers: full slot snapshot.
    Update = 1,
    /// Observer -> authority: send me the current snapshot.
    Request = 2,
    /// Owner -> authority: my render config.
    ConfigUpdate = 3,
}

impl PacketType {
    /// Converts from the wire tag.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Update),
            2 => Some(Self::Request),
            3 => Some(Self::ConfigUpdate),
            _ => None,
        }
    }
}

/// A decoded packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Packet {
    /// Slot snapshot.
    Update(UpdateMessage),
    /// Pull request.
    Request(RequestMessage),
    /// Owner config push.
    ConfigUpdate(ConfigUpdateMessage),
}

impl Packet {
    /// Wire tag for this packet.
    #[inline]
    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        match self {
            Self::Update(_) => PacketType::Update,
            Self::Request(_) => PacketType::Request,
            Self::ConfigUpdate(_) => PacketType::ConfigUpdate,
        }
    }
}
