//! Body attachment slots and the per-player assignment.

use crate::item::ItemRef;

/// Number of body slots. Fixed for the lifetime of the program.
pub const SLOT_COUNT: usize = 5;

/// One of the fixed body mount positions.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EquipmentSlot {
    /// Left forearm sheath.
    LeftForearm = 0,
    /// Right forearm sheath.
    RightForearm = 1,
    /// First diagonal back sheath.
    BackPrimary = 2,
    /// Second diagonal back sheath.
    BackSecondary = 3,
    /// Shield mount. Only shield-class items go here.
    Shield = 4,
}

impl EquipmentSlot {
    /// All slots in index order.
    pub const ALL: [Self; SLOT_COUNT] = [
        Self::LeftForearm,
        Self::RightForearm,
        Self::BackPrimary,
        Self::BackSecondary,
        Self::Shield,
    ];

    /// Slot index (0..5).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Converts from a slot index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::LeftForearm),
            1 => Some(Self::RightForearm),
            2 => Some(Self::BackPrimary),
            3 => Some(Self::BackSecondary),
            4 => Some(Self::Shield),
            _ => None,
        }
    }

    /// True for the two back sheaths.
    #[inline]
    #[must_use]
    pub const fn is_back(self) -> bool {
        matches!(self, Self::BackPrimary | Self::BackSecondary)
    }
}

/// Worn pack classification. Only moves the shield mount.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackpackState {
    /// No recognised pack.
    #[default]
    None = 0,
    /// Leather backpack.
    Leather = 1,
    /// Hunter backpack.
    Hunter = 2,
}

impl BackpackState {
    /// Converts from the wire discriminant.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Leather),
            2 => Some(Self::Hunter),
            _ => None,
        }
    }
}

/// Fixed-size slot table, one optional item per slot.
///
/// Always rebuilt from scratch; never patched in place by callers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotAssignment {
    slots: [Option<ItemRef>; SLOT_COUNT],
}

impl SlotAssignment {
    /// Creates an assignment with every slot empty.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Item in a slot.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: EquipmentSlot) -> Option<&ItemRef> {
        self.slots[slot.index()].as_ref()
    }

    /// True if the slot holds nothing.
    #[inline]
    #[must_use]
    pub fn is_free(&self, slot: EquipmentSlot) -> bool {
        self.slots[slot.index()].is_none()
    }

    /// Places `item` into the first free slot of `candidates`.
    ///
    /// Returns the slot taken, or `None` if all candidates are occupied.
    pub fn occupy_first_free(
        &mut self,
        candidates: &[EquipmentSlot],
        item: ItemRef,
    ) -> Option<EquipmentSlot> {
        let slot = candidates.iter().copied().find(|slot| self.is_free(*slot))?;
        self.slots[slot.index()] = Some(item);
        Some(slot)
    }

    /// Occupied slots in index order.
    pub fn occupied(&self) -> impl Iterator<Item = (EquipmentSlot, &ItemRef)> {
        EquipmentSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|item| (slot, item)))
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Always [`SLOT_COUNT`].
    #[must_use]
    pub const fn len(&self) -> usize {
        SLOT_COUNT
    }

    /// True when nothing is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }
}
