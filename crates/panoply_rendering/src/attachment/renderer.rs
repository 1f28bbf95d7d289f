//! Per-player attachment renderer.
//!
//! Holds the latest snapshot for one observed player, already resolved to
//! meshes, and turns it into draw calls every frame.

use std::sync::Arc;

use panoply_shared::{
    BackpackState, EquipmentSlot, ItemStack, PlayerId, RenderSettings, UpdateMessage, SLOT_COUNT,
};

use super::transforms::{attachment_point_name, compose_model_matrix, slot_transform};
use crate::assets::{CachedMesh, MeshCache};
use crate::integration::{AssetBackend, DrawCall, DrawSink, RenderStage, SkeletonView};

/// An item hanging in one slot.
#[derive(Clone, Debug)]
struct MountedItem {
    code: String,
    stack: ItemStack,
    mesh: Option<CachedMesh>,
}

/// Draws one observed player's carried equipment.
///
/// ## Usage
///
/// ```ignore
/// let mut renderer = AttachmentRenderer::new(player, cache, assets, settings);
/// renderer.apply_update(&message);
/// for stage in RenderStage::ALL {
///     renderer.render_frame(stage, &skeleton, &mut sink);
/// }
/// ```
pub struct AttachmentRenderer {
    player_id: PlayerId,
    cache: Arc<MeshCache>,
    assets: Arc<dyn AssetBackend>,
    settings: RenderSettings,
    slots: [Option<MountedItem>; SLOT_COUNT],
    backpack: BackpackState,
    back_offset: f32,
    last_sequence: Option<u64>,
    disposed: bool,
}

impl AttachmentRenderer {
    /// Creates a renderer with every slot empty.
    #[must_use]
    pub fn new(
        player_id: PlayerId,
        cache: Arc<MeshCache>,
        assets: Arc<dyn AssetBackend>,
        settings: RenderSettings,
    ) -> Self {
        Self {
            player_id,
            cache,
            assets,
            settings,
            slots: Default::default(),
            backpack: BackpackState::None,
            back_offset: 0.0,
            last_sequence: None,
            disposed: false,
        }
    }

    /// Replaces the displayed state with a snapshot.
    ///
    /// Every slot is cleared first; slots missing from the snapshot end up
    /// empty. Stacks that cannot be decoded are dropped with a warning.
    pub fn apply_update(&mut self, message: &UpdateMessage) {
        if self.disposed {
            return;
        }
        if message.player_id != self.player_id {
            tracing::warn!(
                player = %self.player_id,
                other = %message.player_id,
                "update for another player ignored"
            );
            return;
        }

        self.slots = Default::default();
        for (slot, item) in &message.slots {
            let stack = match item.decode_stack() {
                Ok(stack) => stack,
                Err(error) => {
                    tracing::warn!(player = %self.player_id, ?slot, %error, "undecodable stack");
                    continue;
                }
            };
            let mesh = self.cache.resolve(&stack, self.assets.as_ref());
            self.slots[slot.index()] = Some(MountedItem {
                code: item.item_code.clone(),
                stack,
                mesh,
            });
        }

        self.backpack = message.backpack;
        self.last_sequence = Some(message.sequence);
        self.update_back_offset();

        tracing::debug!(
            player = %self.player_id,
            sequence = message.sequence,
            occupied = self.occupied_count(),
            backpack = ?self.backpack,
            "attachments updated"
        );
    }

    /// Resolves every mounted item again. Call after the mesh cache was
    /// cleared.
    pub fn reload_meshes(&mut self) {
        if self.disposed {
            return;
        }
        for mounted in self.slots.iter_mut().flatten() {
            mounted.mesh = self.cache.resolve(&mounted.stack, self.assets.as_ref());
        }
        self.update_back_offset();
    }

    fn update_back_offset(&mut self) {
        let shield_drawn = self.slots[EquipmentSlot::Shield.index()]
            .as_ref()
            .is_some_and(|mounted| mounted.mesh.is_some());
        self.back_offset = if self.backpack == BackpackState::None && shield_drawn {
            self.settings.shield_back_offset
        } else {
            0.0
        };
    }

    /// Emits draw calls for this frame's pass. Returns how many were
    /// submitted.
    ///
    /// Nothing is drawn for the local player in first person. A slot whose
    /// item is also held in a hand is skipped, once per hand.
    pub fn render_frame(
        &self,
        stage: RenderStage,
        skeleton: &dyn SkeletonView,
        sink: &mut dyn DrawSink,
    ) -> usize {
        if self.disposed || skeleton.is_local_first_person() {
            return 0;
        }

        let main_hand = skeleton.main_hand_code();
        let off_hand = skeleton.off_hand_code();
        let mut skipped_main = false;
        let mut skipped_off = false;
        let entity = skeleton.model_matrix();
        let mut drawn = 0;

        for slot in EquipmentSlot::ALL {
            let Some(mounted) = &self.slots[slot.index()] else {
                continue;
            };
            let Some(mesh) = mounted.mesh else {
                continue;
            };

            if !skipped_main && main_hand == Some(mounted.code.as_str()) {
                skipped_main = true;
                continue;
            }
            if !skipped_off && off_hand == Some(mounted.code.as_str()) {
                skipped_off = true;
                continue;
            }

            let Some(transform) =
                slot_transform(slot, &mounted.code, self.backpack, &self.settings)
            else {
                continue;
            };
            let Some(pose) = skeleton.attachment_point(attachment_point_name(slot)) else {
                tracing::trace!(player = %self.player_id, ?slot, "no attachment point");
                continue;
            };

            let offset_x = if slot.is_back() { self.back_offset } else { 0.0 };
            sink.submit(DrawCall {
                player_id: self.player_id.clone(),
                slot,
                stage,
                texture: mesh.texture,
                mesh: mesh.mesh,
                model: compose_model_matrix(entity, &pose, &transform, offset_x),
            });
            drawn += 1;
        }
        drawn
    }

    /// Stops drawing for good. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.slots = Default::default();
        tracing::debug!(player = %self.player_id, "renderer disposed");
    }

    /// Observed player.
    #[must_use]
    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    /// Pack state from the last snapshot.
    #[must_use]
    pub fn backpack(&self) -> BackpackState {
        self.backpack
    }

    /// Lateral back-sheath shift currently applied.
    #[must_use]
    pub fn back_offset(&self) -> f32 {
        self.back_offset
    }

    /// Sequence of the last applied snapshot.
    #[must_use]
    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    /// Code mounted in a slot, if any.
    #[must_use]
    pub fn mounted_code(&self, slot: EquipmentSlot) -> Option<&str> {
        self.slots[slot.index()]
            .as_ref()
            .map(|mounted| mounted.code.as_str())
    }

    /// Number of mounted items, drawable or not.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// True once disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl std::fmt::Debug for AttachmentRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentRenderer")
            .field("player_id", &self.player_id)
            .field("occupied", &self.occupied_count())
            .field("backpack", &self.backpack)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
