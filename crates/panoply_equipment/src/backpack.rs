//! Worn pack classification.
//!
//! Only pack-mount slots count; the pack's contents never do. Families are
//! checked in a fixed order and the first family with any match wins.

use panoply_shared::BackpackState;

use crate::inventory::{InventoryEntry, SlotKind};

/// Code paths recognised as packs, in check order.
const PACK_FAMILIES: [(&str, BackpackState); 2] = [
    ("backpack", BackpackState::Leather),
    ("hunterbackpack", BackpackState::Hunter),
];

/// Derives the worn pack from the pack inventory.
#[must_use]
pub fn classify_backpack(entries: &[InventoryEntry]) -> BackpackState {
    let mounted = || {
        entries
            .iter()
            .filter(|entry| entry.kind == SlotKind::PackMount)
            .filter_map(|entry| entry.stack.as_ref())
    };

    PACK_FAMILIES
        .iter()
        .find(|(path, _)| mounted().any(|stack| stack.code.path() == *path))
        .map_or(BackpackState::None, |(_, state)| *state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{InventorySource, MemoryInventory};
    use panoply_shared::ItemStack;

    #[test]
    fn test_empty_pack_inventory() {
        let pack = MemoryInventory::with_pack_slots("backpack", 4, 4);
        assert_eq!(classify_backpack(&pack.entries()), BackpackState::None);
        assert_eq!(classify_backpack(&[]), BackpackState::None);
    }

    #[test]
    fn test_hunter_pack() {
        let pack = MemoryInventory::with_pack_slots("backpack", 4, 4);
        pack.set(2, Some(ItemStack::other("game:hunterbackpack")));
        assert_eq!(classify_backpack(&pack.entries()), BackpackState::Hunter);
    }

    #[test]
    fn test_leather_checked_first() {
        let pack = MemoryInventory::with_pack_slots("backpack", 4, 4);
        pack.set(0, Some(ItemStack::other("game:hunterbackpack")));
        pack.set(3, Some(ItemStack::other("game:backpack")));
        assert_eq!(classify_backpack(&pack.entries()), BackpackState::Leather);
    }

    #[test]
    fn test_pack_contents_ignored() {
        let pack = MemoryInventory::with_pack_slots("backpack", 4, 4);
        pack.set(6, Some(ItemStack::other("game:backpack")));
        assert_eq!(classify_backpack(&pack.entries()), BackpackState::None);
    }

    #[test]
    fn test_unknown_pack_is_none() {
        let pack = MemoryInventory::with_pack_slots("backpack", 4, 0);
        pack.set(0, Some(ItemStack::other("game:linensack")));
        assert_eq!(classify_backpack(&pack.entries()), BackpackState::None);
    }
}
