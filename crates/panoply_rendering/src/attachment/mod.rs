//! # Attachment
//!
//! Slot placement tables and the per-player renderer.

mod renderer;
mod transforms;

pub use renderer::AttachmentRenderer;
pub use transforms::{
    attachment_point_name, compose_model_matrix, slot_transform, CustomTransform, SlotTransform,
};
