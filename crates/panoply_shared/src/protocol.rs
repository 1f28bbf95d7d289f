//! Wire messages shared between the authoritative side and observers.
//!
//! Both sides must agree on these definitions. Framing and byte layout
//! live in `panoply_networking::protocol`.

use std::collections::BTreeMap;
use std::fmt;

use crate::item::ItemRef;
use crate::slots::{BackpackState, EquipmentSlot, SlotAssignment};

/// Stable player identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a player id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// String form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Full-state snapshot of one player's slots (authority → observers).
///
/// Empty slots are absent from `slots`; absence and "empty" are the same.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateMessage {
    /// Monotonic per authoritative session. Observers drop anything not newer
    /// than what they already hold.
    pub sequence: u64,
    /// Player the snapshot describes.
    pub player_id: PlayerId,
    /// Worn pack.
    pub backpack: BackpackState,
    /// Occupied slots only.
    pub slots: BTreeMap<EquipmentSlot, ItemRef>,
}

impl UpdateMessage {
    /// Builds a snapshot from an assignment.
    #[must_use]
    pub fn from_assignment(
        sequence: u64,
        player_id: PlayerId,
        backpack: BackpackState,
        assignment: &SlotAssignment,
    ) -> Self {
        let slots = assignment
            .occupied()
            .map(|(slot, item)| (slot, item.clone()))
            .collect();
        Self {
            sequence,
            player_id,
            backpack,
            slots,
        }
    }

    /// Rebuilds the dense assignment.
    #[must_use]
    pub fn to_assignment(&self) -> SlotAssignment {
        let mut assignment = SlotAssignment::empty();
        for (slot, item) in &self.slots {
            assignment.occupy_first_free(&[*slot], item.clone());
        }
        assignment
    }

    /// True when the shield mount is occupied.
    #[must_use]
    pub fn has_shield(&self) -> bool {
        self.slots.contains_key(&EquipmentSlot::Shield)
    }
}

/// Observer asks for a player's current snapshot (observer → authority).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestMessage {
    /// Player the observer started watching.
    pub player_id: PlayerId,
}

/// Owner pushes its render config (owner client → authority).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigUpdateMessage {
    /// Player whose config this is.
    pub player_id: PlayerId,
    /// [`crate::RenderConfig`] as TOML.
    pub config_toml: String,
}
