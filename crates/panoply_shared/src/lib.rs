//! # PANOPLY Shared
//!
//! Common types used by both the authoritative side and observers.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - any GPU or window crate
//! - any transport
//!
//! If you need graphics types, put them in `panoply_rendering`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod item;
pub mod protocol;
pub mod slots;

pub use codec::{ByteReader, ByteWriter};
pub use config::{
    favorite_slot_for_key, Feature, NetworkSettings, PanoplySettings, PolicySettings,
    RenderConfig, RenderSettings, MAX_FAVORITES,
};
pub use error::{SharedError, SharedResult};
pub use item::{ItemClass, ItemCode, ItemRef, ItemStack, ToolKind};
pub use protocol::{ConfigUpdateMessage, PlayerId, RequestMessage, UpdateMessage};
pub use slots::{BackpackState, EquipmentSlot, SlotAssignment, SLOT_COUNT};
