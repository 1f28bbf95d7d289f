//! # Transport Layer
//!
//! The channel only needs unordered, at-most-once delivery of byte packets
//! between one authority and N observers. Hosts plug their own network in
//! through [`ServerTransport`] and [`ClientTransport`].
//!
//! [`LoopbackHub`] is the in-process implementation: crossbeam channels,
//! one per peer, with packet statistics.

mod loopback;

pub use loopback::{LoopbackClient, LoopbackHub, LoopbackServer};

use std::fmt;

use crate::error::ProtocolResult;

/// Identifies one connected observer on the authoritative side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u32);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

/// Transport statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Packets sent.
    pub packets_sent: u64,
    /// Packets received.
    pub packets_received: u64,
    /// Bytes sent.
    pub bytes_sent: u64,
    /// Bytes received.
    pub bytes_received: u64,
    /// Send errors.
    pub send_errors: u64,
    /// Packets that failed to decode.
    pub decode_errors: u64,
}

impl TransportStats {
    /// Records a successful send.
    #[inline]
    pub fn record_send(&mut self, len: usize) {
        self.packets_sent += 1;
        self.bytes_sent += len as u64;
    }

    /// Records a received packet.
    #[inline]
    pub fn record_recv(&mut self, len: usize) {
        self.packets_received += 1;
        self.bytes_received += len as u64;
    }
}

/// Authoritative end of a transport.
pub trait ServerTransport {
    /// Sends one packet to one peer.
    ///
    /// # Errors
    ///
    /// Fails when the peer is not connected.
    fn send_to(&mut self, peer: PeerId, packet: &[u8]) -> ProtocolResult<()>;

    /// Currently connected peers.
    fn peers(&self) -> Vec<PeerId>;

    /// Next received packet, if any. Never blocks.
    fn recv(&mut self) -> Option<(PeerId, Vec<u8>)>;

    /// Statistics.
    fn stats(&self) -> &TransportStats;

    /// Mutable statistics, for decode failures counted by the channel.
    fn stats_mut(&mut self) -> &mut TransportStats;
}

/// Observing end of a transport.
pub trait ClientTransport {
    /// Sends one packet to the authority.
    ///
    /// # Errors
    ///
    /// Fails when the authority is gone.
    fn send(&mut self, packet: &[u8]) -> ProtocolResult<()>;

    /// Next received packet, if any. Never blocks.
    fn recv(&mut self) -> Option<Vec<u8>>;

    /// Statistics.
    fn stats(&self) -> &TransportStats;

    /// Mutable statistics, for decode failures counted by the channel.
    fn stats_mut(&mut self) -> &mut TransportStats;
}
