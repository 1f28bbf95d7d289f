//! # Integration Traits
//!
//! What the host game implements so PANOPLY can draw.
//!
//! ```text
//! PANOPLY defines:     Host implements:
//! ┌──────────────┐     ┌──────────────┐
//! │ AssetBackend │ ←── │ asset system │
//! │ SkeletonView │ ←── │ animator     │
//! │ DrawSink     │ ←── │ render API   │
//! └──────────────┘     └──────────────┘
//! ```

use glam::{Mat4, Vec3};
use panoply_shared::{EquipmentSlot, ItemCode, ItemStack, PlayerId};

use crate::assets::{CachedMesh, MeshHandle, ShapeDefinition, ShapeLocation, TextureHandle};
use crate::error::AssetResult;

// ============================================================================
// ASSETS
// ============================================================================

/// Item shapes and GPU upload.
pub trait AssetBackend: Send + Sync {
    /// Base shape path of an item, e.g. `game:item/tool/knife`.
    ///
    /// # Errors
    ///
    /// [`crate::AssetError::UnknownItem`] when the code is not registered.
    fn shape_base(&self, code: &ItemCode) -> AssetResult<String>;

    /// Loads a shape file.
    ///
    /// # Errors
    ///
    /// [`crate::AssetError::MissingShape`] when the file does not exist.
    fn load_shape(&self, location: &ShapeLocation) -> AssetResult<ShapeDefinition>;

    /// Tessellates the shape for this exact stack and uploads it.
    ///
    /// Called while the mesh cache holds its write lock. Implementations
    /// must not resolve through the same cache, and slow uploads stall every
    /// other lookup until they return.
    ///
    /// # Errors
    ///
    /// [`crate::AssetError::UploadFailed`] when nothing could be produced.
    fn upload_mesh(&self, shape: &ShapeDefinition, stack: &ItemStack) -> AssetResult<CachedMesh>;
}

// ============================================================================
// SKELETON
// ============================================================================

/// Animated pose of one named attachment point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttachmentPose {
    /// Current animation matrix of the point's joint.
    pub anim_model_matrix: Mat4,
    /// Point position in model voxels.
    pub position: Vec3,
    /// Point rotation in degrees.
    pub rotation_deg: Vec3,
}

impl AttachmentPose {
    /// Pose at the model origin with no rotation.
    pub const IDENTITY: Self = Self {
        anim_model_matrix: Mat4::IDENTITY,
        position: Vec3::ZERO,
        rotation_deg: Vec3::ZERO,
    };
}

/// The rendered player's body, this frame.
pub trait SkeletonView {
    /// Entity model matrix.
    fn model_matrix(&self) -> Mat4;

    /// Looks up an attachment point by name.
    fn attachment_point(&self, name: &str) -> Option<AttachmentPose>;

    /// Code of the item in the main hand.
    fn main_hand_code(&self) -> Option<&str>;

    /// Code of the item in the off hand.
    fn off_hand_code(&self) -> Option<&str>;

    /// True when this is the local player seen in first person.
    fn is_local_first_person(&self) -> bool;
}

// ============================================================================
// DRAW SUBMISSION
// ============================================================================

/// Render pass a draw call belongs to. The host picks the shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderStage {
    /// Main lit pass.
    Opaque,
    /// Near shadow cascade.
    ShadowNear,
    /// Far shadow cascade.
    ShadowFar,
}

impl RenderStage {
    /// Every stage the renderer draws in.
    pub const ALL: [Self; 3] = [Self::Opaque, Self::ShadowNear, Self::ShadowFar];

    /// True for the shadow passes.
    #[inline]
    #[must_use]
    pub const fn is_shadow(self) -> bool {
        !matches!(self, Self::Opaque)
    }
}

/// One mesh to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    /// Player the item hangs on.
    pub player_id: PlayerId,
    /// Slot the item occupies.
    pub slot: EquipmentSlot,
    /// Pass.
    pub stage: RenderStage,
    /// Texture to bind.
    pub texture: TextureHandle,
    /// Mesh to draw.
    pub mesh: MeshHandle,
    /// Model matrix (world from item).
    pub model: Mat4,
}

/// Receives draw calls.
pub trait DrawSink {
    /// Queues one draw.
    fn submit(&mut self, call: DrawCall);
}
