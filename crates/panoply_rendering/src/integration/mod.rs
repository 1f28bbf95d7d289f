//! # Integration
//!
//! Host-facing traits and their mock implementations.

mod mocks;
mod traits;

pub use mocks::{MockAssetBackend, MockSkeleton, RecordingDrawSink};
pub use traits::{AssetBackend, AttachmentPose, DrawCall, DrawSink, RenderStage, SkeletonView};
