//! # Slot Assignment Policy
//!
//! Pure function from inventory contents to a [`SlotAssignment`].
//!
//! ## Rules
//!
//! 1. Start from five empty slots.
//! 2. Walk entries in scan order (hotbar, then secondary tool inventories).
//! 3. With favorites on, only favorited inventory indices are considered.
//! 4. Classify, check the category's feature flag, take the first free
//!    eligible slot. No free slot means the item is not shown.
//!
//! First found, first served. Nothing overrides an occupied slot.

use panoply_shared::{
    EquipmentSlot, Feature, ItemClass, ItemRef, ItemStack, PolicySettings, RenderConfig,
    SlotAssignment,
};

const SHIELD_SLOTS: [EquipmentSlot; 1] = [EquipmentSlot::Shield];
const FOREARM_SLOTS: [EquipmentSlot; 2] = [EquipmentSlot::LeftForearm, EquipmentSlot::RightForearm];
const BACK_SLOTS: [EquipmentSlot; 2] = [EquipmentSlot::BackPrimary, EquipmentSlot::BackSecondary];

/// Where an item may be mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotCategory {
    /// Shield mount only.
    Shield,
    /// Left then right forearm.
    Forearm,
    /// Primary then secondary back sheath.
    Back,
    /// Never mounted.
    Ineligible,
}

impl SlotCategory {
    /// Candidate slots in preference order.
    #[must_use]
    pub const fn candidates(self) -> &'static [EquipmentSlot] {
        match self {
            Self::Shield => &SHIELD_SLOTS,
            Self::Forearm => &FOREARM_SLOTS,
            Self::Back => &BACK_SLOTS,
            Self::Ineligible => &[],
        }
    }

    /// Toggle gating this category.
    #[must_use]
    pub const fn feature(self) -> Option<Feature> {
        match self {
            Self::Shield => Some(Feature::Shield),
            Self::Forearm => Some(Feature::Forearm),
            Self::Back => Some(Feature::Back),
            Self::Ineligible => None,
        }
    }
}

/// Classifies a stack. Ignores feature flags.
#[must_use]
pub fn classify(stack: &ItemStack, settings: &PolicySettings) -> SlotCategory {
    match stack.class {
        ItemClass::Shield => SlotCategory::Shield,
        ItemClass::Tool(kind) if kind.is_small() => SlotCategory::Forearm,
        ItemClass::Tool(_) => SlotCategory::Back,
        ItemClass::Other => {
            let domain = stack.code.domain();
            if settings.back_only_domains.iter().any(|d| d == domain) {
                SlotCategory::Back
            } else {
                SlotCategory::Ineligible
            }
        }
    }
}

/// Builds the assignment for one player.
///
/// `entries` yields `(inventory_index, stack)` in scan order; the index is
/// the slot's position inside its own inventory, which is what the favorites
/// list refers to.
pub fn resolve_assignment<'a, I>(
    entries: I,
    config: &RenderConfig,
    settings: &PolicySettings,
) -> SlotAssignment
where
    I: IntoIterator<Item = (usize, &'a ItemStack)>,
{
    let mut assignment = SlotAssignment::empty();

    for (index, stack) in entries {
        if config.favorites_enabled && !config.is_favorite(index) {
            continue;
        }

        let category = classify(stack, settings);
        let Some(feature) = category.feature() else {
            continue;
        };
        if !config.is_enabled(feature) {
            continue;
        }

        let candidates = category.candidates();
        if !candidates.iter().any(|slot| assignment.is_free(*slot)) {
            continue;
        }

        let item = match ItemRef::capture(stack) {
            Ok(item) => item,
            Err(error) => {
                tracing::warn!(code = %stack.code, %error, "cannot capture stack, skipping");
                continue;
            }
        };
        if let Some(slot) = assignment.occupy_first_free(candidates, item) {
            tracing::trace!(code = %stack.code, index, ?slot, "slot assigned");
        }
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use panoply_shared::ToolKind;

    fn knife(n: u32) -> ItemStack {
        ItemStack::tool(format!("game:knife-{n}"), ToolKind::Knife)
    }

    fn code_in(assignment: &SlotAssignment, slot: EquipmentSlot) -> Option<&str> {
        assignment.get(slot).map(|item| item.item_code.as_str())
    }

    fn resolve(items: &[(usize, ItemStack)], config: &RenderConfig) -> SlotAssignment {
        resolve_assignment(
            items.iter().map(|(i, s)| (*i, s)),
            config,
            &PolicySettings::default(),
        )
    }

    #[test]
    fn test_classification() {
        let settings = PolicySettings::default();
        assert_eq!(
            classify(&ItemStack::shield("game:shield-wood"), &settings),
            SlotCategory::Shield
        );
        assert_eq!(
            classify(&ItemStack::tool("game:chisel-copper", ToolKind::Chisel), &settings),
            SlotCategory::Forearm
        );
        assert_eq!(
            classify(&ItemStack::tool("game:axe-iron", ToolKind::Axe), &settings),
            SlotCategory::Back
        );
        assert_eq!(
            classify(&ItemStack::other("spearexpantion:spear-bone"), &settings),
            SlotCategory::Back
        );
        assert_eq!(
            classify(&ItemStack::other("game:bread-rye"), &settings),
            SlotCategory::Ineligible
        );
    }

    #[test]
    fn test_first_found_first_served() {
        let items = [(1, knife(1)), (3, knife(3))];
        let assignment = resolve(&items, &RenderConfig::default());

        assert_eq!(code_in(&assignment, EquipmentSlot::LeftForearm), Some("game:knife-1"));
        assert_eq!(code_in(&assignment, EquipmentSlot::RightForearm), Some("game:knife-3"));
    }

    #[test]
    fn test_third_small_tool_dropped() {
        let items = [(0, knife(0)), (1, knife(1)), (2, knife(2))];
        let assignment = resolve(&items, &RenderConfig::default());

        assert_eq!(assignment.occupied_count(), 2);
        assert!(assignment
            .occupied()
            .all(|(_, item)| item.item_code != "game:knife-2"));
    }

    #[test]
    fn test_favorites_filter_by_index() {
        let mut config = RenderConfig::default();
        config.set_feature(Feature::Favorites, true);
        config.set_favorites(&[2]);

        let items = [
            (0, ItemStack::shield("game:shield-wood")),
            (1, knife(1)),
            (2, ItemStack::tool("game:pickaxe-iron", ToolKind::Pickaxe)),
            (3, ItemStack::tool("game:axe-iron", ToolKind::Axe)),
        ];
        let assignment = resolve(&items, &config);

        assert_eq!(assignment.occupied_count(), 1);
        assert_eq!(code_in(&assignment, EquipmentSlot::BackPrimary), Some("game:pickaxe-iron"));
    }

    #[test]
    fn test_disabled_feature_excludes_category() {
        let mut config = RenderConfig::default();
        config.set_feature(Feature::Back, false);

        let items = [
            (0, ItemStack::tool("game:axe-iron", ToolKind::Axe)),
            (1, knife(1)),
            (2, ItemStack::shield("game:shield-wood")),
        ];
        let assignment = resolve(&items, &config);

        assert!(assignment.is_free(EquipmentSlot::BackPrimary));
        assert!(assignment.is_free(EquipmentSlot::BackSecondary));
        assert!(!assignment.is_free(EquipmentSlot::LeftForearm));
        assert!(!assignment.is_free(EquipmentSlot::Shield));
    }

    #[test]
    fn test_shield_slot_is_shield_only() {
        let items = [
            (0, ItemStack::tool("game:axe-a", ToolKind::Axe)),
            (1, ItemStack::tool("game:axe-b", ToolKind::Axe)),
            (2, ItemStack::tool("game:axe-c", ToolKind::Axe)),
        ];
        let assignment = resolve(&items, &RenderConfig::default());

        assert!(assignment.is_free(EquipmentSlot::Shield));
        assert_eq!(assignment.occupied_count(), 2);
    }

    #[test]
    fn test_all_disabled_assigns_nothing() {
        let items = [(0, knife(0)), (1, ItemStack::shield("game:shield-wood"))];
        let assignment = resolve(&items, &RenderConfig::disabled());
        assert!(assignment.is_empty());
        assert_eq!(assignment.len(), 5);
    }

    #[test]
    fn test_captured_stack_decodes() {
        let stack = ItemStack::tool("game:saw-iron", ToolKind::Saw)
            .with_durability(120)
            .with_attribute("variant", "rusty");
        let items = [(0, stack.clone())];
        let assignment = resolve(&items, &RenderConfig::default());

        let item = assignment.get(EquipmentSlot::BackPrimary).unwrap();
        assert_eq!(item.decode_stack().unwrap(), stack);
    }
}
