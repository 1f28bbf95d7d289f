//! # Inventory Collaborator
//!
//! The host game owns the actual inventories. This module defines the narrow
//! surface the watcher needs from them:
//!
//! - enumerate slots ([`InventorySource::entries`])
//! - get told when a slot changes ([`InventorySource::subscribe`])
//!
//! Subscriptions are handles. Dropping or unsubscribing one removes the
//! listener; doing it twice is a no-op.
//!
//! [`MemoryInventory`] is an in-process implementation used by tests and by
//! hosts that mirror their inventories into PANOPLY.

use std::sync::{Arc, Weak};

use crossbeam_channel::Sender;
use parking_lot::{Mutex, RwLock};
use panoply_shared::ItemStack;

/// What kind of slot an entry sits in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotKind {
    /// Regular item slot.
    #[default]
    Item,
    /// Slot that holds a worn pack (only meaningful in the pack inventory).
    PackMount,
}

/// One slot of an inventory, as seen at enumeration time.
#[derive(Clone, Debug, PartialEq)]
pub struct InventoryEntry {
    /// Index inside its own inventory.
    pub index: usize,
    /// Slot kind.
    pub kind: SlotKind,
    /// Contents, `None` when empty.
    pub stack: Option<ItemStack>,
}

/// Notification that one slot of an inventory changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotModified {
    /// Inventory that changed.
    pub inventory: String,
    /// Slot index inside that inventory.
    pub index: usize,
}

/// An inventory the watcher can scan and listen to.
pub trait InventorySource: Send + Sync {
    /// Stable inventory identifier (e.g. `"hotbar"`).
    fn id(&self) -> &str;

    /// Every slot in index order, empty ones included.
    fn entries(&self) -> Vec<InventoryEntry>;

    /// Registers `listener` for slot-modified notifications.
    ///
    /// The listener stays registered until the returned handle is
    /// unsubscribed or dropped.
    fn subscribe(&self, listener: Sender<SlotModified>) -> Subscription;
}

/// Listener table behind an inventory.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    listeners: Vec<(u64, Sender<SlotModified>)>,
}

impl ListenerRegistry {
    /// Creates an empty, shareable registry.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds a listener and returns its handle.
    #[must_use]
    pub fn subscribe(self: &Arc<Self>, listener: Sender<SlotModified>) -> Subscription {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, listener));
        Subscription {
            registry: Arc::downgrade(self),
            id,
            active: true,
        }
    }

    /// Delivers `event` to every listener.
    ///
    /// Listeners whose receiving end is gone are dropped from the table.
    pub fn notify(&self, event: &SlotModified) {
        let mut inner = self.inner.lock();
        inner
            .listeners
            .retain(|(_, listener)| listener.send(event.clone()).is_ok());
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    fn remove(&self, id: u64) {
        self.inner.lock().listeners.retain(|(lid, _)| *lid != id);
    }
}

/// Handle to a registered listener.
///
/// Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<ListenerRegistry>,
    id: u64,
    active: bool,
}

impl Subscription {
    /// Removes the listener. Safe to call any number of times.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }

    /// True until the first [`Subscription::unsubscribe`].
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// In-memory inventory.
#[derive(Debug)]
pub struct MemoryInventory {
    id: String,
    slots: RwLock<Vec<InventoryEntry>>,
    listeners: Arc<ListenerRegistry>,
}

impl MemoryInventory {
    /// Creates an inventory of `size` empty item slots.
    #[must_use]
    pub fn new(id: impl Into<String>, size: usize) -> Self {
        Self::with_pack_slots(id, 0, size)
    }

    /// Creates a pack inventory: `pack_slots` mounts followed by
    /// `content_slots` regular slots.
    #[must_use]
    pub fn with_pack_slots(id: impl Into<String>, pack_slots: usize, content_slots: usize) -> Self {
        let slots = (0..pack_slots + content_slots)
            .map(|index| InventoryEntry {
                index,
                kind: if index < pack_slots {
                    SlotKind::PackMount
                } else {
                    SlotKind::Item
                },
                stack: None,
            })
            .collect();
        Self {
            id: id.into(),
            slots: RwLock::new(slots),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// True when the inventory has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Replaces a slot's contents and notifies listeners.
    ///
    /// Out-of-range indices are ignored.
    pub fn set(&self, index: usize, stack: Option<ItemStack>) {
        {
            let mut slots = self.slots.write();
            let Some(entry) = slots.get_mut(index) else {
                tracing::debug!(inventory = %self.id, index, "set on missing slot ignored");
                return;
            };
            entry.stack = stack;
        }
        self.listeners.notify(&SlotModified {
            inventory: self.id.clone(),
            index,
        });
    }

    /// Empties a slot and notifies listeners.
    pub fn clear_slot(&self, index: usize) {
        self.set(index, None);
    }

    /// Contents of one slot.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ItemStack> {
        self.slots.read().get(index).and_then(|entry| entry.stack.clone())
    }

    /// Registered listener count.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.listener_count()
    }
}

impl InventorySource for MemoryInventory {
    fn id(&self) -> &str {
        &self.id
    }

    fn entries(&self) -> Vec<InventoryEntry> {
        self.slots.read().clone()
    }

    fn subscribe(&self, listener: Sender<SlotModified>) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

/// The inventories one player contributes to the watcher.
///
/// Tool inventories are scanned in registration order. Any of them may be
/// absent; the watcher then simply sees fewer items.
#[derive(Clone, Default)]
pub struct PlayerInventories {
    tools: Vec<Arc<dyn InventorySource>>,
    pack: Option<Arc<dyn InventorySource>>,
}

impl PlayerInventories {
    /// No inventories at all.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tool inventory (hotbar first, then secondary ones).
    #[must_use]
    pub fn with_tools(mut self, inventory: Arc<dyn InventorySource>) -> Self {
        self.tools.push(inventory);
        self
    }

    /// Sets the pack inventory.
    #[must_use]
    pub fn with_pack(mut self, inventory: Arc<dyn InventorySource>) -> Self {
        self.pack = Some(inventory);
        self
    }

    /// Tool inventories in scan order.
    #[must_use]
    pub fn tools(&self) -> &[Arc<dyn InventorySource>] {
        &self.tools
    }

    /// Pack inventory, if the player has one.
    #[must_use]
    pub fn pack(&self) -> Option<&Arc<dyn InventorySource>> {
        self.pack.as_ref()
    }
}

impl std::fmt::Debug for PlayerInventories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerInventories")
            .field(
                "tools",
                &self.tools.iter().map(|inv| inv.id()).collect::<Vec<_>>(),
            )
            .field("pack", &self.pack.as_ref().map(|inv| inv.id()))
            .finish()
    }
}
