//! # PANOPLY Networking - Equipment Sync Channel
//!
//! Carries slot snapshots from the authority to every observer.
//!
//! ## Architecture
//!
//! - **Protocol**: three packet types, length-prefixed fields
//! - **Transport**: pluggable; a crossbeam loopback ships in-crate
//! - **Push**: every watcher recomputation is broadcast to all peers
//! - **Pull**: an observer that starts watching a player asks for the
//!   current snapshot and gets it in one round trip
//!
//! ## Delivery Model
//!
//! ```text
//! AUTHORITY                         OBSERVER
//!   |                                  |
//!   |<-- Request(player) --------------|   start of interest
//!   |--- Update(seq, player, slots) -->|
//!   |                                  |
//!   |--- Update(seq+n, ...) ---------->|   every inventory change
//!   |                                  |
//! ```
//!
//! No acks, no retries. A lost snapshot is healed by the next one; a stale
//! one is recognised by its sequence number and dropped.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod transport;

pub use client::{ClientChannel, SequenceFilter};
pub use error::{ProtocolError, ProtocolResult};
pub use protocol::{Packet, PacketDeserializer, PacketSerializer, PacketType};
pub use server::{ServerChannel, ServerEvent};
pub use transport::{
    ClientTransport, LoopbackClient, LoopbackHub, LoopbackServer, PeerId, ServerTransport,
    TransportStats,
};
