//! # Server Channel
//!
//! The authoritative end of the equipment channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SERVER CHANNEL                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  watcher outbox ──► broadcast() ──► every connected peer    │
//! │                                                             │
//! │  peer ──► poll() ──► Request       (answer with send_to)    │
//! │                  └─► ConfigUpdate  (owner only)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Observers filter snapshots for players they do not render themselves,
//! so broadcast does not track interest.

use std::collections::HashMap;

use panoply_shared::constants::CHANNEL_NAME;
use panoply_shared::{ConfigUpdateMessage, NetworkSettings, PlayerId, RequestMessage, UpdateMessage};

use crate::error::ProtocolResult;
use crate::protocol::{Packet, PacketDeserializer, PacketSerializer};
use crate::transport::{PeerId, ServerTransport, TransportStats};

/// Something an observer asked of the authority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    /// Observer wants the current snapshot of a player.
    Request {
        /// Who asked.
        peer: PeerId,
        /// The request.
        message: RequestMessage,
    },
    /// Owner pushed its render config.
    ConfigUpdate {
        /// Sending peer, already verified to own `message.player_id`.
        peer: PeerId,
        /// The config push.
        message: ConfigUpdateMessage,
    },
}

/// Authoritative end of the equipment channel.
pub struct ServerChannel<T: ServerTransport> {
    transport: T,
    serializer: PacketSerializer,
    max_packet_size: usize,
    owners: HashMap<PeerId, PlayerId>,
}

impl<T: ServerTransport> ServerChannel<T> {
    /// Wraps a transport.
    #[must_use]
    pub fn new(transport: T, settings: &NetworkSettings) -> Self {
        tracing::info!(
            channel = CHANNEL_NAME,
            max_packet_size = settings.max_packet_size,
            "equipment channel open"
        );
        Self {
            transport,
            serializer: PacketSerializer::new(settings.max_packet_size),
            max_packet_size: settings.max_packet_size,
            owners: HashMap::new(),
        }
    }

    /// Records that `peer` is the client of `player`. Only the owner's peer
    /// may push that player's config.
    pub fn bind_owner(&mut self, peer: PeerId, player: PlayerId) {
        tracing::debug!(%peer, %player, "peer bound to player");
        self.owners.insert(peer, player);
    }

    /// Forgets every peer bound to `player`. Returns how many were removed.
    pub fn unbind_player(&mut self, player: &PlayerId) -> usize {
        let before = self.owners.len();
        self.owners.retain(|_, owned| owned != player);
        before - self.owners.len()
    }

    /// Peer allowed to push `player`'s config, if any.
    #[must_use]
    pub fn owner_of(&self, player: &PlayerId) -> Option<PeerId> {
        self.owners
            .iter()
            .find_map(|(peer, owned)| (owned == player).then_some(*peer))
    }

    /// Pushes a snapshot to every connected peer.
    ///
    /// Returns how many peers it reached. Per-peer failures are logged and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Fails only if the snapshot cannot be encoded at all.
    pub fn broadcast(&mut self, update: &UpdateMessage) -> ProtocolResult<usize> {
        let packet = Packet::Update(update.clone());
        let bytes = self.serializer.serialize(&packet)?;

        let mut reached = 0;
        for peer in self.transport.peers() {
            match self.transport.send_to(peer, bytes) {
                Ok(()) => reached += 1,
                Err(error) => tracing::debug!(%peer, %error, "broadcast skipped peer"),
            }
        }
        tracing::trace!(
            player = %update.player_id,
            sequence = update.sequence,
            reached,
            "snapshot broadcast"
        );
        Ok(reached)
    }

    /// Sends a snapshot to one peer, as the answer to a request.
    ///
    /// # Errors
    ///
    /// Fails when encoding fails or the peer is gone.
    pub fn send_to(&mut self, peer: PeerId, update: &UpdateMessage) -> ProtocolResult<()> {
        let packet = Packet::Update(update.clone());
        let bytes = self.serializer.serialize(&packet)?;
        self.transport.send_to(peer, bytes)
    }

    /// Drains received packets.
    ///
    /// Malformed packets, snapshots sent by observers and config pushes from
    /// non-owners are dropped with a warning.
    pub fn poll(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();

        while let Some((peer, bytes)) = self.transport.recv() {
            if bytes.len() > self.max_packet_size {
                tracing::warn!(%peer, size = bytes.len(), "oversized packet dropped");
                self.transport.stats_mut().decode_errors += 1;
                continue;
            }

            match PacketDeserializer::new(&bytes).deserialize() {
                Ok(Packet::Request(message)) => events.push(ServerEvent::Request { peer, message }),
                Ok(Packet::ConfigUpdate(message)) => {
                    if self.owners.get(&peer) == Some(&message.player_id) {
                        events.push(ServerEvent::ConfigUpdate { peer, message });
                    } else {
                        tracing::warn!(
                            %peer,
                            player = %message.player_id,
                            "config push from non-owner ignored"
                        );
                    }
                }
                Ok(Packet::Update(update)) => {
                    tracing::warn!(%peer, player = %update.player_id, "observer sent a snapshot, ignored");
                }
                Err(error) => {
                    tracing::warn!(%peer, %error, "malformed packet dropped");
                    self.transport.stats_mut().decode_errors += 1;
                }
            }
        }

        events
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
}
