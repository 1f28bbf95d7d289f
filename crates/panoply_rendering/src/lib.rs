//! # PANOPLY Rendering
//!
//! Observer-side drawing of another player's carried equipment.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    OBSERVER PIPELINE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  UpdateMessage → decode stacks → MeshCache → mounted slots  │
//! │                                                   ↓         │
//! │  SkeletonView → slot_transform → compose → DrawSink         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## MANDATE
//!
//! - A frame never fails. Slots that cannot draw are skipped.
//! - Meshes are built once per item look and shared.
//! - The host owns the GPU; this crate only emits draw calls.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod assets;
pub mod attachment;
pub mod error;
pub mod integration;

pub use assets::{
    CacheKey, CachedMesh, MeshCache, MeshCacheStats, MeshHandle, ShapeDefinition, ShapeLocation,
    TextureHandle,
};
pub use attachment::{
    attachment_point_name, compose_model_matrix, slot_transform, AttachmentRenderer,
    CustomTransform, SlotTransform,
};
pub use error::{AssetError, AssetResult};

// === HOST INTEGRATION ===
pub use integration::{
    AssetBackend, AttachmentPose, DrawCall, DrawSink, MockAssetBackend, MockSkeleton,
    RecordingDrawSink, RenderStage, SkeletonView,
};
