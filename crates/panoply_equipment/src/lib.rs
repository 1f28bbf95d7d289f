//! # PANOPLY Equipment
//!
//! Decides which carried items hang where on a player's body, and keeps that
//! decision current as inventories change.
//!
//! ## Design Principles
//!
//! 1. **Full recomputation** - every change rebuilds all five slots
//! 2. **First found, first served** - scan order is the only priority
//! 3. **Nothing is fatal** - missing inventories or bad configs render less
//!
//! ## Thread Safety
//!
//! Watchers live on the authoritative side's update loop. Inventories may
//! notify from any thread; notifications are queued until
//! [`EquipmentWatcher::pump`].
//!
//! ## Example
//!
//! ```rust,ignore
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let mut watcher = EquipmentWatcher::new(
//!     player_id,
//!     PlayerInventories::new().with_tools(hotbar).with_pack(pack),
//!     None,
//!     settings.policy.clone(),
//!     sequence.clone(),
//!     tx,
//! );
//!
//! // every frame
//! watcher.pump();
//! for update in rx.try_iter() {
//!     channel.broadcast(&update);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod backpack;
pub mod inventory;
pub mod policy;
pub mod watcher;

pub use backpack::classify_backpack;
pub use inventory::{
    InventoryEntry, InventorySource, ListenerRegistry, MemoryInventory, PlayerInventories,
    SlotKind, SlotModified, Subscription,
};
pub use policy::{classify, resolve_assignment, SlotCategory};
pub use watcher::{EquipmentWatcher, SequenceSource, WatcherState};
