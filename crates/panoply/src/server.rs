//! # Server Session
//!
//! Authoritative side. Owns one [`EquipmentWatcher`] per joined player and
//! the server end of the equipment channel.
//!
//! ```text
//! tick():
//! ┌────────────────────────────────────────────────────────────┐
//! │ 1. pump watchers        inventory events → recompute       │
//! │ 2. poll channel         requests → current snapshot        │
//! │                         config pushes → set_config         │
//! │ 3. flush outbox         every new snapshot → broadcast     │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crossbeam_channel::{unbounded, Receiver, Sender};
use panoply_equipment::{EquipmentWatcher, PlayerInventories, SequenceSource};
use panoply_networking::{PeerId, ServerChannel, ServerEvent, ServerTransport};
use panoply_shared::{PanoplySettings, PlayerId, RenderConfig, UpdateMessage};

use crate::error::{SessionError, SessionResult};

/// What one [`ServerSession::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Inventory notifications handled.
    pub inventory_events: usize,
    /// Requests answered with a snapshot.
    pub requests_answered: usize,
    /// Config pushes applied.
    pub configs_applied: usize,
    /// Snapshots broadcast.
    pub broadcasts: usize,
}

/// Authoritative per-session context.
pub struct ServerSession<T: ServerTransport> {
    channel: ServerChannel<T>,
    watchers: HashMap<PlayerId, EquipmentWatcher>,
    outbox_tx: Sender<UpdateMessage>,
    outbox: Receiver<UpdateMessage>,
    sequence: SequenceSource,
    settings: PanoplySettings,
}

impl<T: ServerTransport> ServerSession<T> {
    /// Opens a session on a transport.
    #[must_use]
    pub fn new(transport: T, settings: PanoplySettings) -> Self {
        let (outbox_tx, outbox) = unbounded();
        Self {
            channel: ServerChannel::new(transport, &settings.network),
            watchers: HashMap::new(),
            outbox_tx,
            outbox,
            sequence: SequenceSource::new(),
            settings,
        }
    }

    /// Starts watching a player.
    ///
    /// `config` is whatever the owner last sent, if anything. `owner` is the
    /// peer of the player's own client; only that peer may push configs.
    /// The first snapshot goes out on the next tick.
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyJoined`] if the player is already watched.
    pub fn player_joined(
        &mut self,
        player: PlayerId,
        inventories: PlayerInventories,
        config: Option<RenderConfig>,
        owner: Option<PeerId>,
    ) -> SessionResult<()> {
        if self.watchers.contains_key(&player) {
            return Err(SessionError::AlreadyJoined(player));
        }

        if let Some(peer) = owner {
            self.channel.bind_owner(peer, player.clone());
        }

        let watcher = EquipmentWatcher::new(
            player.clone(),
            inventories,
            config,
            self.settings.policy.clone(),
            self.sequence.clone(),
            self.outbox_tx.clone(),
        );
        self.watchers.insert(player, watcher);
        Ok(())
    }

    /// Stops watching a player. Returns false if it was not watched.
    pub fn player_left(&mut self, player: &PlayerId) -> bool {
        self.channel.unbind_player(player);
        match self.watchers.remove(player) {
            Some(mut watcher) => {
                watcher.dispose();
                true
            }
            None => false,
        }
    }

    /// Replaces a player's config and re-resolves at once.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownPlayer`] if the player is not watched.
    pub fn update_config(&mut self, player: &PlayerId, config: RenderConfig) -> SessionResult<()> {
        let watcher = self
            .watchers
            .get_mut(player)
            .ok_or_else(|| SessionError::UnknownPlayer(player.clone()))?;
        watcher.set_config(config);
        Ok(())
    }

    /// Runs one update of the authoritative loop.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        for watcher in self.watchers.values_mut() {
            report.inventory_events += watcher.pump();
        }

        for event in self.channel.poll() {
            match event {
                ServerEvent::Request { peer, message } => {
                    let Some(watcher) = self.watchers.get(&message.player_id) else {
                        tracing::debug!(%peer, player = %message.player_id, "request for unknown player");
                        continue;
                    };
                    match self.channel.send_to(peer, watcher.current_message()) {
                        Ok(()) => report.requests_answered += 1,
                        Err(error) => tracing::debug!(%peer, %error, "request answer not delivered"),
                    }
                }
                ServerEvent::ConfigUpdate { peer, message } => {
                    let Some(watcher) = self.watchers.get_mut(&message.player_id) else {
                        tracing::debug!(%peer, player = %message.player_id, "config for unknown player");
                        continue;
                    };
                    watcher.set_config(RenderConfig::from_toml_lenient(&message.config_toml));
                    report.configs_applied += 1;
                }
            }
        }

        while let Ok(update) = self.outbox.try_recv() {
            if !self.watchers.contains_key(&update.player_id) {
                continue;
            }
            match self.channel.broadcast(&update) {
                Ok(_) => report.broadcasts += 1,
                Err(error) => {
                    tracing::warn!(player = %update.player_id, %error, "snapshot not broadcast");
                }
            }
        }

        if report != TickReport::default() {
            tracing::trace!(?report, "server tick");
        }
        report
    }

    /// Watcher of a player.
    #[must_use]
    pub fn watcher(&self, player: &PlayerId) -> Option<&EquipmentWatcher> {
        self.watchers.get(player)
    }

    /// Number of watched players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.watchers.len()
    }

    /// The channel, for statistics.
    #[must_use]
    pub fn channel(&self) -> &ServerChannel<T> {
        &self.channel
    }
}

impl<T: ServerTransport> Drop for ServerSession<T> {
    fn drop(&mut self) {
        for watcher in self.watchers.values_mut() {
            watcher.dispose();
        }
    }
}
