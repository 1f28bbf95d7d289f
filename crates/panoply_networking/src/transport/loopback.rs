//! In-process transport over crossbeam channels.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;

use super::{ClientTransport, PeerId, ServerTransport, TransportStats};
use crate::error::{ProtocolError, ProtocolResult};

#[derive(Debug)]
struct HubInner {
    to_server_tx: Sender<(PeerId, Vec<u8>)>,
    to_server_rx: Receiver<(PeerId, Vec<u8>)>,
    peers: RwLock<BTreeMap<PeerId, Sender<Vec<u8>>>>,
    next_peer: AtomicU32,
}

/// Connects one authority with any number of observers in one process.
#[derive(Clone, Debug)]
pub struct LoopbackHub {
    inner: Arc<HubInner>,
}

impl LoopbackHub {
    /// Creates a hub with no peers.
    #[must_use]
    pub fn new() -> Self {
        let (to_server_tx, to_server_rx) = unbounded();
        Self {
            inner: Arc::new(HubInner {
                to_server_tx,
                to_server_rx,
                peers: RwLock::new(BTreeMap::new()),
                next_peer: AtomicU32::new(0),
            }),
        }
    }

    /// Authoritative end. Create one per hub.
    #[must_use]
    pub fn server(&self) -> LoopbackServer {
        LoopbackServer {
            hub: Arc::clone(&self.inner),
            stats: TransportStats::default(),
        }
    }

    /// Connects a new observer.
    #[must_use]
    pub fn connect(&self) -> LoopbackClient {
        let peer = PeerId(self.inner.next_peer.fetch_add(1, Ordering::Relaxed));
        let (tx, inbox) = unbounded();
        self.inner.peers.write().insert(peer, tx);
        tracing::debug!(%peer, "loopback peer connected");
        LoopbackClient {
            peer,
            hub: Arc::clone(&self.inner),
            inbox,
            stats: TransportStats::default(),
        }
    }

    /// Connected observer count.
    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.inner.peers.read().len()
    }
}

impl Default for LoopbackHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Authoritative end of a [`LoopbackHub`].
#[derive(Debug)]
pub struct LoopbackServer {
    hub: Arc<HubInner>,
    stats: TransportStats,
}

impl ServerTransport for LoopbackServer {
    fn send_to(&mut self, peer: PeerId, packet: &[u8]) -> ProtocolResult<()> {
        let peers = self.hub.peers.read();
        let delivered = peers
            .get(&peer)
            .is_some_and(|tx| tx.send(packet.to_vec()).is_ok());
        drop(peers);

        if delivered {
            self.stats.record_send(packet.len());
            Ok(())
        } else {
            self.stats.send_errors += 1;
            Err(ProtocolError::PeerNotConnected(peer))
        }
    }

    fn peers(&self) -> Vec<PeerId> {
        self.hub.peers.read().keys().copied().collect()
    }

    fn recv(&mut self) -> Option<(PeerId, Vec<u8>)> {
        let (peer, packet) = self.hub.to_server_rx.try_recv().ok()?;
        self.stats.record_recv(packet.len());
        Some((peer, packet))
    }

    fn stats(&self) -> &TransportStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut TransportStats {
        &mut self.stats
    }
}

/// Observing end of a [`LoopbackHub`]. Disconnects on drop.
#[derive(Debug)]
pub struct LoopbackClient {
    peer: PeerId,
    hub: Arc<HubInner>,
    inbox: Receiver<Vec<u8>>,
    stats: TransportStats,
}

impl LoopbackClient {
    /// This observer's id on the authoritative side.
    #[inline]
    #[must_use]
    pub const fn peer_id(&self) -> PeerId {
        self.peer
    }

    /// Throws away everything queued for this observer, as a lossy network
    /// would. Returns the number of packets lost.
    pub fn discard_inbound(&mut self) -> usize {
        self.inbox.try_iter().count()
    }
}

impl ClientTransport for LoopbackClient {
    fn send(&mut self, packet: &[u8]) -> ProtocolResult<()> {
        match self.hub.to_server_tx.send((self.peer, packet.to_vec())) {
            Ok(()) => {
                self.stats.record_send(packet.len());
                Ok(())
            }
            Err(_) => {
                self.stats.send_errors += 1;
                Err(ProtocolError::Disconnected)
            }
        }
    }

    fn recv(&mut self) -> Option<Vec<u8>> {
        let packet = self.inbox.try_recv().ok()?;
        self.stats.record_recv(packet.len());
        Some(packet)
    }

    fn stats(&self) -> &TransportStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut TransportStats {
        &mut self.stats
    }
}

impl Drop for LoopbackClient {
    fn drop(&mut self) {
        self.hub.peers.write().remove(&self.peer);
        tracing::debug!(peer = %self.peer, "loopback peer disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_stats() {
        let hub = LoopbackHub::new();
        let mut server = hub.server();
        let mut client = hub.connect();

        client.send(b"ping").unwrap();
        assert_eq!(server.recv(), Some((client.peer_id(), b"ping".to_vec())));

        server.send_to(client.peer_id(), b"pong!").unwrap();
        assert_eq!(client.recv(), Some(b"pong!".to_vec()));

        assert_eq!(client.stats().bytes_sent, 4);
        assert_eq!(client.stats().bytes_received, 5);
        assert_eq!(server.stats().packets_sent, 1);
        assert_eq!(server.stats().packets_received, 1);
    }

    #[test]
    fn test_drop_disconnects_peer() {
        let hub = LoopbackHub::new();
        let mut server = hub.server();
        let client = hub.connect();
        let peer = client.peer_id();
        assert_eq!(server.peers(), vec![peer]);

        drop(client);
        assert_eq!(hub.peer_count(), 0);
        assert!(matches!(
            server.send_to(peer, b"x"),
            Err(ProtocolError::PeerNotConnected(p)) if p == peer
        ));
        assert_eq!(server.stats().send_errors, 1);
    }

    #[test]
    fn test_discard_inbound() {
        let hub = LoopbackHub::new();
        let mut server = hub.server();
        let mut client = hub.connect();
        server.send_to(client.peer_id(), b"a").unwrap();
        server.send_to(client.peer_id(), b"b").unwrap();

        assert_eq!(client.discard_inbound(), 2);
        assert_eq!(client.recv(), None);
    }
}
