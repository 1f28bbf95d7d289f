//! # Slot Transforms
//!
//! Where each slot hangs relative to its skeleton attachment point.
//!
//! ```text
//!        Back (slots 2, 3, 4)
//!     ┌──────────────────────┐
//!     │  2 ╲            ╱ 3  │   diagonal sheaths
//!     │      [ shield 4 ]    │   moves with the worn pack
//!     └──────────────────────┘
//!  LeftHand (0)        RightHand (1)   forearm sheaths
//! ```
//!
//! Translations are in blocks, rotations in degrees, origins in blocks.

use glam::{Mat4, Vec3};
use panoply_shared::constants::{
    ATTACH_BACK, ATTACH_LEFT_HAND, ATTACH_RIGHT_HAND, VOXELS_PER_BLOCK,
};
use panoply_shared::{BackpackState, EquipmentSlot, RenderSettings};

use crate::integration::AttachmentPose;

/// Placement of an item relative to its attachment point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotTransform {
    /// Offset in blocks.
    pub translation: Vec3,
    /// Euler angles in degrees, applied X then Y then Z.
    pub rotation_deg: Vec3,
    /// Uniform scale.
    pub scale: f32,
    /// Pivot for scale and rotation.
    pub origin: Vec3,
}

impl SlotTransform {
    /// Pivot used unless a transform says otherwise: the item's centre.
    pub const DEFAULT_ORIGIN: Vec3 = Vec3::splat(0.5);

    const fn new(translation: Vec3, rotation_deg: Vec3, scale: f32) -> Self {
        Self {
            translation,
            rotation_deg,
            scale,
            origin: Self::DEFAULT_ORIGIN,
        }
    }

    const fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }
}

/// Per-slot defaults. The shield slot has none; it always uses a
/// [`CustomTransform`].
const SLOT_DEFAULTS: [SlotTransform; 4] = [
    SlotTransform::new(
        Vec3::new(-1.3, -0.52, -0.695),
        Vec3::new(180.0, 180.0, 90.0),
        0.65,
    ),
    SlotTransform::new(
        Vec3::new(-1.25, -0.46, -0.875),
        Vec3::new(180.0, 180.0, 90.0),
        0.65,
    ),
    SlotTransform::new(
        Vec3::new(-0.05, -0.69, -0.54),
        Vec3::new(45.0, 0.0, -90.0),
        0.85,
    ),
    SlotTransform::new(
        Vec3::new(-0.975, -0.69, -0.54),
        Vec3::new(-45.0, 180.0, -90.0),
        0.85,
    ),
];

/// Special-case placements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CustomTransform {
    /// Shield strapped to a bare back.
    ShieldDefault,
    /// Shield hung on a leather backpack.
    ShieldOnBackpack,
    /// Shield hung on a hunter backpack.
    ShieldOnHunterPack,
    /// Large tool, first back sheath.
    HammerLeft,
    /// Large tool, second back sheath.
    HammerRight,
}

impl CustomTransform {
    /// Shield mount for a pack state.
    #[must_use]
    pub const fn for_backpack(backpack: BackpackState) -> Self {
        match backpack {
            BackpackState::None => Self::ShieldDefault,
            BackpackState::Leather => Self::ShieldOnBackpack,
            BackpackState::Hunter => Self::ShieldOnHunterPack,
        }
    }

    /// The placement itself.
    #[must_use]
    pub const fn transform(self) -> SlotTransform {
        match self {
            Self::ShieldDefault => SlotTransform::new(
                Vec3::new(-0.2, -0.22, -0.96),
                Vec3::new(0.0, 90.0, 0.0),
                0.9,
            ),
            Self::ShieldOnBackpack => SlotTransform::new(
                Vec3::new(0.3, -0.41, 0.06),
                Vec3::new(45.0, 90.0, 0.0),
                0.8,
            )
            .with_origin(Vec3::ZERO),
            Self::ShieldOnHunterPack => SlotTransform::new(
                Vec3::new(0.2, -0.3, 0.066),
                Vec3::new(45.0, 90.0, 0.0),
                0.8,
            )
            .with_origin(Vec3::ZERO),
            Self::HammerLeft => SlotTransform::new(
                Vec3::new(-0.41, -0.68, -0.50),
                Vec3::new(45.0, 0.0, -90.0),
                0.95,
            ),
            Self::HammerRight => SlotTransform::new(
                Vec3::new(-0.43, -0.68, -0.50),
                Vec3::new(-45.0, 180.0, -90.0),
                0.95,
            ),
        }
    }
}

/// Picks the placement for an item in a slot.
///
/// Returns `None` when the slot has no placement for this item, e.g. a
/// non-shield code in the shield slot.
#[must_use]
pub fn slot_transform(
    slot: EquipmentSlot,
    code: &str,
    backpack: BackpackState,
    settings: &RenderSettings,
) -> Option<SlotTransform> {
    if slot.is_back() && is_large_tool(code, settings) {
        let custom = if slot == EquipmentSlot::BackPrimary {
            CustomTransform::HammerLeft
        } else {
            CustomTransform::HammerRight
        };
        return Some(custom.transform());
    }

    if slot == EquipmentSlot::Shield {
        return code
            .contains("shield")
            .then(|| CustomTransform::for_backpack(backpack).transform());
    }

    SLOT_DEFAULTS.get(slot.index()).copied()
}

fn is_large_tool(code: &str, settings: &RenderSettings) -> bool {
    settings
        .large_tool_keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && code.contains(keyword.as_str()))
}

/// Skeleton attachment point a slot hangs from.
#[inline]
#[must_use]
pub const fn attachment_point_name(slot: EquipmentSlot) -> &'static str {
    match slot {
        EquipmentSlot::LeftForearm => ATTACH_LEFT_HAND,
        EquipmentSlot::RightForearm => ATTACH_RIGHT_HAND,
        EquipmentSlot::BackPrimary | EquipmentSlot::BackSecondary | EquipmentSlot::Shield => {
            ATTACH_BACK
        }
    }
}

/// Builds the item's model matrix.
///
/// `entity × anim × T(origin) × S × T(point + translation) × Rx × Ry × Rz × T(-origin)`
///
/// The attachment point's rotation is added to the slot's before rotating.
/// `offset_x` shifts along the model's x axis.
#[must_use]
pub fn compose_model_matrix(
    entity: Mat4,
    pose: &AttachmentPose,
    transform: &SlotTransform,
    offset_x: f32,
) -> Mat4 {
    let translation = pose.position / VOXELS_PER_BLOCK
        + transform.translation
        + Vec3::new(offset_x, 0.0, 0.0);
    let rotation = (pose.rotation_deg + transform.rotation_deg) * std::f32::consts::PI / 180.0;

    entity
        * pose.anim_model_matrix
        * Mat4::from_translation(transform.origin)
        * Mat4::from_scale(Vec3::splat(transform.scale))
        * Mat4::from_translation(translation)
        * Mat4::from_rotation_x(rotation.x)
        * Mat4::from_rotation_y(rotation.y)
        * Mat4::from_rotation_z(rotation.z)
        * Mat4::from_translation(-transform.origin)
}
