//! # Client Session
//!
//! Observing side. Owns one [`AttachmentRenderer`] per player in view, the
//! shared mesh cache and the client end of the equipment channel.

use std::collections::HashMap;
use std::sync::Arc;

use panoply_networking::{ClientChannel, ClientTransport, TransportStats};
use panoply_rendering::{
    AssetBackend, AttachmentRenderer, DrawSink, MeshCache, RenderStage, SkeletonView,
};
use panoply_shared::{ConfigUpdateMessage, PanoplySettings, PlayerId, RenderConfig, RenderSettings};

use crate::error::SessionResult;

/// Observer per-session context.
pub struct ClientSession<T: ClientTransport> {
    local_player: PlayerId,
    channel: ClientChannel<T>,
    renderers: HashMap<PlayerId, AttachmentRenderer>,
    cache: Arc<MeshCache>,
    assets: Arc<dyn AssetBackend>,
    settings: RenderSettings,
}

impl<T: ClientTransport> ClientSession<T> {
    /// Opens a session for the local player.
    #[must_use]
    pub fn new(
        local_player: PlayerId,
        transport: T,
        assets: Arc<dyn AssetBackend>,
        settings: &PanoplySettings,
    ) -> Self {
        Self {
            local_player,
            channel: ClientChannel::new(transport, &settings.network),
            renderers: HashMap::new(),
            cache: Arc::new(MeshCache::new()),
            assets,
            settings: settings.rendering.clone(),
        }
    }

    /// A player came into view: create its renderer and ask for its state.
    ///
    /// Returns false if the player was already in view. A failed request is
    /// logged; the next broadcast still reaches the renderer. Ordering starts
    /// fresh, so the answer is accepted even if its sequence was already seen
    /// while the player was out of view.
    pub fn player_spawned(&mut self, player: PlayerId) -> bool {
        if self.renderers.contains_key(&player) {
            return false;
        }

        self.channel.track(&player);
        if let Err(error) = self.channel.request(&player) {
            tracing::warn!(%player, %error, "snapshot request not sent");
        }
        let renderer = AttachmentRenderer::new(
            player.clone(),
            Arc::clone(&self.cache),
            Arc::clone(&self.assets),
            self.settings.clone(),
        );
        self.renderers.insert(player, renderer);
        true
    }

    /// A player left view. Returns false if it was not in view.
    pub fn player_despawned(&mut self, player: &PlayerId) -> bool {
        self.channel.forget(player);
        match self.renderers.remove(player) {
            Some(mut renderer) => {
                renderer.dispose();
                true
            }
            None => false,
        }
    }

    /// Sends the local player's config to the authority.
    ///
    /// # Errors
    ///
    /// Fails when the config cannot be encoded or the packet cannot be sent.
    pub fn push_config(&mut self, config: &RenderConfig) -> SessionResult<()> {
        let message = ConfigUpdateMessage {
            player_id: self.local_player.clone(),
            config_toml: config.to_toml_string()?,
        };
        self.channel.push_config(&message)?;
        tracing::debug!(player = %self.local_player, "render config pushed");
        Ok(())
    }

    /// Applies every received snapshot. Returns how many reached a renderer.
    pub fn poll_network(&mut self) -> usize {
        let mut applied = 0;
        for update in self.channel.poll() {
            match self.renderers.get_mut(&update.player_id) {
                Some(renderer) => {
                    renderer.apply_update(&update);
                    applied += 1;
                }
                None => {
                    tracing::trace!(player = %update.player_id, "snapshot for player out of view");
                }
            }
        }
        applied
    }

    /// Draws one player's equipment for a pass. Returns the number of draw
    /// calls.
    pub fn render_frame(
        &self,
        player: &PlayerId,
        stage: RenderStage,
        skeleton: &dyn SkeletonView,
        sink: &mut dyn DrawSink,
    ) -> usize {
        self.renderers
            .get(player)
            .map_or(0, |renderer| renderer.render_frame(stage, skeleton, sink))
    }

    /// Host reloaded its assets: drop every cached mesh and rebuild.
    pub fn assets_reloaded(&mut self) {
        self.cache.clear();
        for renderer in self.renderers.values_mut() {
            renderer.reload_meshes();
        }
    }

    /// Renderer of a player in view.
    #[must_use]
    pub fn renderer(&self, player: &PlayerId) -> Option<&AttachmentRenderer> {
        self.renderers.get(player)
    }

    /// Players in view.
    #[must_use]
    pub fn players_in_view(&self) -> usize {
        self.renderers.len()
    }

    /// Shared mesh cache.
    #[must_use]
    pub fn cache(&self) -> &MeshCache {
        &self.cache
    }

    /// Local player.
    #[must_use]
    pub fn local_player(&self) -> &PlayerId {
        &self.local_player
    }

    /// Underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        self.channel.transport()
    }

    /// Channel statistics.
    #[must_use]
    pub fn stats(&self) -> &TransportStats {
        self.channel.stats()
    }
}

impl<T: ClientTransport> Drop for ClientSession<T> {
    fn drop(&mut self) {
        for renderer in self.renderers.values_mut() {
            renderer.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panoply_networking::{LoopbackClient, LoopbackHub};
    use panoply_rendering::{MockAssetBackend, MockSkeleton, RecordingDrawSink};

    fn session(hub: &LoopbackHub) -> ClientSession<LoopbackClient> {
        ClientSession::new(
            PlayerId::new("bob"),
            hub.connect(),
            Arc::new(MockAssetBackend::new()),
            &PanoplySettings::default(),
        )
    }

    #[test]
    fn test_spawn_sends_one_request() {
        let hub = LoopbackHub::new();
        let mut client = session(&hub);
        let alice = PlayerId::new("alice");

        assert!(client.player_spawned(alice.clone()));
        assert!(!client.player_spawned(alice));
        assert_eq!(client.stats().packets_sent, 1);
        assert_eq!(client.players_in_view(), 1);
    }

    #[test]
    fn test_despawn_disposes_renderer() {
        let hub = LoopbackHub::new();
        let mut client = session(&hub);
        let alice = PlayerId::new("alice");

        client.player_spawned(alice.clone());
        assert!(client.player_despawned(&alice));
        assert!(!client.player_despawned(&alice));
        assert!(client.renderer(&alice).is_none());
    }

    #[test]
    fn test_only_players_in_view_are_ordered() {
        let hub = LoopbackHub::new();
        let mut client = session(&hub);
        let alice = PlayerId::new("alice");

        client.player_spawned(alice.clone());
        assert!(client.channel.filter().is_tracked(&alice));

        client.player_despawned(&alice);
        assert!(!client.channel.filter().is_tracked(&alice));
    }

    #[test]
    fn test_unknown_player_renders_nothing() {
        let hub = LoopbackHub::new();
        let client = session(&hub);
        let mut sink = RecordingDrawSink::new();
        let drawn = client.render_frame(
            &PlayerId::new("alice"),
            RenderStage::Opaque,
            &MockSkeleton::humanoid(),
            &mut sink,
        );
        assert_eq!(drawn, 0);
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_push_config_uses_local_player() {
        let hub = LoopbackHub::new();
        let mut client = session(&hub);
        client.push_config(&RenderConfig::default()).unwrap();
        assert_eq!(client.stats().packets_sent, 1);
    }
}
