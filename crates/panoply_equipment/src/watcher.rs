//! # Equipment Watcher
//!
//! Owns one player's live [`SlotAssignment`] on the authoritative side.
//!
//! ```text
//! Uninitialized --new()--> Active --dispose()--> Disposed
//! ```
//!
//! Inventories push [`SlotModified`] into the watcher's channels. The host
//! calls [`EquipmentWatcher::pump`] from its update loop; every notification
//! recomputes the whole assignment and emits a fresh [`UpdateMessage`] into
//! the outbox. No diffing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use panoply_shared::{
    BackpackState, PlayerId, PolicySettings, RenderConfig, SlotAssignment, UpdateMessage,
};

use crate::backpack::classify_backpack;
use crate::inventory::{PlayerInventories, SlotModified, Subscription};
use crate::policy::resolve_assignment;

/// Lifecycle of a watcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatcherState {
    /// Constructed, first resolution not done yet.
    Uninitialized,
    /// Listening and broadcasting.
    Active,
    /// Unsubscribed. Never broadcasts again.
    Disposed,
}

/// Session-wide snapshot counter.
///
/// Shared by every watcher of one authoritative session so sequence numbers
/// keep rising when a player's watcher is recreated.
#[derive(Clone, Debug, Default)]
pub struct SequenceSource(Arc<AtomicU64>);

impl SequenceSource {
    /// Starts at zero; the first issued number is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next number.
    #[inline]
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Last issued number.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Live slot assignment for one player.
pub struct EquipmentWatcher {
    player_id: PlayerId,
    inventories: PlayerInventories,
    config: RenderConfig,
    settings: PolicySettings,
    sequence: SequenceSource,
    outbox: Sender<UpdateMessage>,
    tool_events: Receiver<SlotModified>,
    pack_events: Receiver<SlotModified>,
    subscriptions: Vec<Subscription>,
    assignment: SlotAssignment,
    backpack: BackpackState,
    current: UpdateMessage,
    state: WatcherState,
}

impl EquipmentWatcher {
    /// Subscribes to the player's inventories and performs the first
    /// resolution, which is broadcast like any other.
    ///
    /// `config` of `None` means the owner never sent one: defaults apply.
    #[must_use]
    pub fn new(
        player_id: PlayerId,
        inventories: PlayerInventories,
        config: Option<RenderConfig>,
        settings: PolicySettings,
        sequence: SequenceSource,
        outbox: Sender<UpdateMessage>,
    ) -> Self {
        let (tool_tx, tool_events) = unbounded();
        let (pack_tx, pack_events) = unbounded();

        let mut subscriptions: Vec<Subscription> = inventories
            .tools()
            .iter()
            .map(|inventory| inventory.subscribe(tool_tx.clone()))
            .collect();
        if let Some(pack) = inventories.pack() {
            subscriptions.push(pack.subscribe(pack_tx));
        }

        let current = UpdateMessage::from_assignment(
            0,
            player_id.clone(),
            BackpackState::None,
            &SlotAssignment::empty(),
        );

        let mut watcher = Self {
            player_id,
            inventories,
            config: config.unwrap_or_default(),
            settings,
            sequence,
            outbox,
            tool_events,
            pack_events,
            subscriptions,
            assignment: SlotAssignment::empty(),
            backpack: BackpackState::None,
            current,
            state: WatcherState::Uninitialized,
        };

        tracing::info!(
            player = %watcher.player_id,
            inventories = ?watcher.inventories,
            "equipment watcher created"
        );
        watcher.refresh();
        watcher
    }

    /// Handles every queued inventory notification.
    ///
    /// Returns how many notifications were handled. Each one recomputes and
    /// broadcasts. Does nothing once disposed.
    pub fn pump(&mut self) -> usize {
        if self.state != WatcherState::Active {
            return 0;
        }

        let mut handled = 0;
        while let Ok(event) = self.pack_events.try_recv() {
            tracing::trace!(player = %self.player_id, ?event, "pack changed");
            self.backpack = self.scan_backpack();
            self.recompute();
            handled += 1;
        }
        while let Ok(event) = self.tool_events.try_recv() {
            tracing::trace!(player = %self.player_id, ?event, "inventory changed");
            self.recompute();
            handled += 1;
        }
        handled
    }

    /// Full re-scan of pack and tools, then broadcast.
    pub fn refresh(&mut self) {
        if self.state == WatcherState::Disposed {
            return;
        }
        self.backpack = self.scan_backpack();
        self.recompute();
        self.state = WatcherState::Active;
    }

    /// Replaces the owner's config and re-resolves immediately.
    pub fn set_config(&mut self, config: RenderConfig) {
        if self.state == WatcherState::Disposed {
            return;
        }
        tracing::debug!(player = %self.player_id, ?config, "render config replaced");
        self.config = config;
        self.refresh();
    }

    /// Last broadcast snapshot. Answering a request must not recompute.
    #[must_use]
    pub fn current_message(&self) -> &UpdateMessage {
        &self.current
    }

    /// Live assignment.
    #[must_use]
    pub fn assignment(&self) -> &SlotAssignment {
        &self.assignment
    }

    /// Worn pack as last classified.
    #[must_use]
    pub const fn backpack(&self) -> BackpackState {
        self.backpack
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> WatcherState {
        self.state
    }

    /// Active config.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Player this watcher tracks.
    #[must_use]
    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    /// Unsubscribes everything. Calling it again is a no-op.
    pub fn dispose(&mut self) {
        if self.state == WatcherState::Disposed {
            return;
        }
        for subscription in &mut self.subscriptions {
            subscription.unsubscribe();
        }
        self.subscriptions.clear();
        while self.tool_events.try_recv().is_ok() {}
        while self.pack_events.try_recv().is_ok() {}
        self.state = WatcherState::Disposed;
        tracing::info!(player = %self.player_id, "equipment watcher disposed");
    }

    fn scan_backpack(&self) -> BackpackState {
        self.inventories
            .pack()
            .map_or(BackpackState::None, |pack| classify_backpack(&pack.entries()))
    }

    fn recompute(&mut self) {
        let snapshots: Vec<_> = self
            .inventories
            .tools()
            .iter()
            .map(|inventory| inventory.entries())
            .collect();
        let entries = snapshots
            .iter()
            .flatten()
            .filter_map(|entry| entry.stack.as_ref().map(|stack| (entry.index, stack)));

        self.assignment = resolve_assignment(entries, &self.config, &self.settings);
        self.current = UpdateMessage::from_assignment(
            self.sequence.advance(),
            self.player_id.clone(),
            self.backpack,
            &self.assignment,
        );

        tracing::debug!(
            player = %self.player_id,
            sequence = self.current.sequence,
            occupied = self.assignment.occupied_count(),
            backpack = ?self.backpack,
            "assignment recomputed"
        );

        if self.outbox.send(self.current.clone()).is_err() {
            tracing::debug!(player = %self.player_id, "outbox closed, snapshot dropped");
        }
    }
}

impl std::fmt::Debug for EquipmentWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquipmentWatcher")
            .field("player_id", &self.player_id)
            .field("state", &self.state)
            .field("backpack", &self.backpack)
            .field("sequence", &self.current.sequence)
            .finish_non_exhaustive()
    }
}
