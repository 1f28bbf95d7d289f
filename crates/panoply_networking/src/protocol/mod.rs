//! # Network Protocol
//!
//! Three packet types on one channel.
//!
//! ## Packet Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Type (1 byte)                                                │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Payload (variable, bounded by [network] max_packet_size)     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Philosophy
//!
//! - Every update is a full snapshot; losing one is harmless
//! - Empty slots are omitted, never sent as nulls
//! - Anything malformed is dropped whole

mod packets;
mod serialization;

pub use packets::{Packet, PacketType};
pub use serialization::{PacketDeserializer, PacketSerializer};
