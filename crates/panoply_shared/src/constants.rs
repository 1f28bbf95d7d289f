//! # Channel & Attachment Constants
//!
//! Values both sides must agree on. Changes require rebuilding every client.

/// Name of the network channel carrying equipment messages.
pub const CHANNEL_NAME: &str = "panoply:equipment";

/// Skeleton attachment point for the left forearm sheath.
pub const ATTACH_LEFT_HAND: &str = "LeftHand";

/// Skeleton attachment point for the right forearm sheath.
pub const ATTACH_RIGHT_HAND: &str = "RightHand";

/// Skeleton attachment point for back sheaths and the shield mount.
pub const ATTACH_BACK: &str = "Back";

/// Attachment point offsets are authored in model voxels; 16 per block.
pub const VOXELS_PER_BLOCK: f32 = 16.0;

/// Inventory holding worn packs.
pub const BACKPACK_INVENTORY: &str = "backpack";

/// Primary hotbar inventory.
pub const HOTBAR_INVENTORY: &str = "hotbar";
