//! # Client Channel
//!
//! The observing end of the equipment channel.
//!
//! Snapshots are full state, so the only ordering concern is an older one
//! overtaking a newer one. [`SequenceFilter`] drops anything not newer than
//! what was already accepted for a tracked player. Players that are not
//! tracked pass through and leave no ordering state behind, so a snapshot
//! seen while a player is out of view never shadows the answer to a later
//! request.

use std::collections::HashMap;

use panoply_shared::{ConfigUpdateMessage, NetworkSettings, PlayerId, RequestMessage, UpdateMessage};

use crate::error::ProtocolResult;
use crate::protocol::{Packet, PacketDeserializer, PacketSerializer};
use crate::transport::{ClientTransport, TransportStats};

/// Highest accepted sequence per tracked player.
#[derive(Clone, Debug, Default)]
pub struct SequenceFilter {
    latest: HashMap<PlayerId, Option<u64>>,
}

impl SequenceFilter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts ordering snapshots for `player` from scratch. Whatever was
    /// accepted before is forgotten.
    pub fn track(&mut self, player: &PlayerId) {
        self.latest.insert(player.clone(), None);
    }

    /// Accepts `sequence` if `player` is untracked or the snapshot is newer
    /// than anything accepted since tracking began.
    pub fn accept(&mut self, player: &PlayerId, sequence: u64) -> bool {
        match self.latest.get_mut(player) {
            None => true,
            Some(Some(latest)) if sequence <= *latest => false,
            Some(slot) => {
                *slot = Some(sequence);
                true
            }
        }
    }

    /// Stops tracking a player.
    pub fn forget(&mut self, player: &PlayerId) {
        self.latest.remove(player);
    }

    /// Whether a player is tracked.
    #[must_use]
    pub fn is_tracked(&self, player: &PlayerId) -> bool {
        self.latest.contains_key(player)
    }

    /// Last accepted sequence for a tracked player.
    #[must_use]
    pub fn latest(&self, player: &PlayerId) -> Option<u64> {
        self.latest.get(player).copied().flatten()
    }
}

/// Observing end of the equipment channel.
pub struct ClientChannel<T: ClientTransport> {
    transport: T,
    serializer: PacketSerializer,
    max_packet_size: usize,
    filter: SequenceFilter,
}

impl<T: ClientTransport> ClientChannel<T> {
    /// Wraps a transport.
    #[must_use]
    pub fn new(transport: T, settings: &NetworkSettings) -> Self {
        Self {
            transport,
            serializer: PacketSerializer::new(settings.max_packet_size),
            max_packet_size: settings.max_packet_size,
            filter: SequenceFilter::new(),
        }
    }

    /// Asks the authority for a player's current snapshot.
    ///
    /// # Errors
    ///
    /// Fails when the authority is unreachable.
    pub fn request(&mut self, player: &PlayerId) -> ProtocolResult<()> {
        let packet = Packet::Request(RequestMessage {
            player_id: player.clone(),
        });
        let bytes = self.serializer.serialize(&packet)?;
        self.transport.send(bytes)
    }

    /// Sends the local player's render config to the authority.
    ///
    /// # Errors
    ///
    /// Fails when the packet is too large or the authority is unreachable.
    pub fn push_config(&mut self, message: &ConfigUpdateMessage) -> ProtocolResult<()> {
        let packet = Packet::ConfigUpdate(message.clone());
        let bytes = self.serializer.serialize(&packet)?;
        self.transport.send(bytes)
    }

    /// Drains received snapshots that pass the sequence filter.
    pub fn poll(&mut self) -> Vec<UpdateMessage> {
        let mut accepted = Vec::new();

        while let Some(bytes) = self.transport.recv() {
            if bytes.len() > self.max_packet_size {
                tracing::warn!(size = bytes.len(), "oversized packet dropped");
                self.transport.stats_mut().decode_errors += 1;
                continue;
            }

            match PacketDeserializer::new(&bytes).deserialize() {
                Ok(Packet::Update(update)) => {
                    if self.filter.accept(&update.player_id, update.sequence) {
                        accepted.push(update);
                    } else {
                        tracing::debug!(
                            player = %update.player_id,
                            sequence = update.sequence,
                            "stale snapshot discarded"
                        );
                    }
                }
                Ok(other) => {
                    tracing::warn!(packet = ?other.packet_type(), "unexpected packet from authority");
                }
                Err(error) => {
                    tracing::warn!(%error, "malformed packet dropped");
                    self.transport.stats_mut().decode_errors += 1;
                }
            }
        }

        accepted
    }

    /// Orders snapshots for a player coming into view, starting fresh.
    pub fn track(&mut self, player: &PlayerId) {
        self.filter.track(player);
    }

    /// Drops ordering state for a player who left view.
    pub fn forget(&mut self, player: &PlayerId) {
        self.filter.forget(player);
    }

    /// Sequence filter state.
    #[must_use]
    pub fn filter(&self) -> &SequenceFilter {
        &self.filter
    }

    /// Transport statistics.
    #[must_use]
    pub fn stats(&self) -> &TransportStats {
        self.transport.stats()
    }

    /// Underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Underlying transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
