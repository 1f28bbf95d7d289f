//! Mock collaborators for tests and headless hosts.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use glam::Mat4;
use panoply_shared::constants::{ATTACH_BACK, ATTACH_LEFT_HAND, ATTACH_RIGHT_HAND};
use panoply_shared::{ItemCode, ItemStack};

use super::traits::{AssetBackend, AttachmentPose, DrawCall, DrawSink, SkeletonView};
use crate::assets::{CachedMesh, MeshHandle, ShapeDefinition, ShapeLocation, TextureHandle};
use crate::error::{AssetError, AssetResult};

/// Mock implementation of [`AssetBackend`].
///
/// Every registered item has a shape unless removed. Each upload hands out
/// a fresh mesh handle.
#[derive(Debug, Default)]
pub struct MockAssetBackend {
    items: HashMap<String, String>,
    missing_shapes: HashSet<String>,
    failing_uploads: HashSet<String>,
    next_mesh: AtomicU32,
    shape_lookups: AtomicUsize,
    uploads: AtomicUsize,
}

impl MockAssetBackend {
    /// Creates a backend with no items.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an item and its base shape path.
    pub fn register(&mut self, code: &str, shape_base: &str) {
        self.items.insert(code.to_owned(), shape_base.to_owned());
    }

    /// Makes a shape location unloadable.
    pub fn remove_shape(&mut self, location: &str) {
        self.missing_shapes.insert(location.to_owned());
    }

    /// Makes uploads for an item code fail.
    pub fn fail_upload(&mut self, code: &str) {
        self.failing_uploads.insert(code.to_owned());
    }

    /// Shape loads performed.
    #[must_use]
    pub fn shape_lookups(&self) -> usize {
        self.shape_lookups.load(Ordering::Relaxed)
    }

    /// Meshes uploaded.
    #[must_use]
    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::Relaxed)
    }
}

impl AssetBackend for MockAssetBackend {
    fn shape_base(&self, code: &ItemCode) -> AssetResult<String> {
        self.items
            .get(code.as_str())
            .cloned()
            .ok_or_else(|| AssetError::UnknownItem(code.to_string()))
    }

    fn load_shape(&self, location: &ShapeLocation) -> AssetResult<ShapeDefinition> {
        self.shape_lookups.fetch_add(1, Ordering::Relaxed);
        if self.missing_shapes.contains(location.as_str()) {
            return Err(AssetError::MissingShape(location.to_string()));
        }
        Ok(ShapeDefinition {
            location: location.clone(),
            elements: vec!["root".to_owned()],
        })
    }

    fn upload_mesh(&self, _shape: &ShapeDefinition, stack: &ItemStack) -> AssetResult<CachedMesh> {
        if self.failing_uploads.contains(stack.code.as_str()) {
            return Err(AssetError::UploadFailed {
                code: stack.code.to_string(),
                reason: "mock failure".to_owned(),
            });
        }
        self.uploads.fetch_add(1, Ordering::Relaxed);
        let id = self.next_mesh.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(CachedMesh {
            texture: TextureHandle(0),
            mesh: MeshHandle(id),
        })
    }
}

/// Mock implementation of [`SkeletonView`].
#[derive(Clone, Debug)]
pub struct MockSkeleton {
    /// Entity model matrix.
    pub model: Mat4,
    /// Attachment points by name.
    pub points: HashMap<String, AttachmentPose>,
    /// Main-hand item code.
    pub main_hand: Option<String>,
    /// Off-hand item code.
    pub off_hand: Option<String>,
    /// Local player in first person.
    pub local_first_person: bool,
}

impl MockSkeleton {
    /// Skeleton with no attachment points.
    #[must_use]
    pub fn bare() -> Self {
        Self {
            model: Mat4::IDENTITY,
            points: HashMap::new(),
            main_hand: None,
            off_hand: None,
            local_first_person: false,
        }
    }

    /// Skeleton with both hands and the back at the origin.
    #[must_use]
    pub fn humanoid() -> Self {
        let mut skeleton = Self::bare();
        for name in [ATTACH_LEFT_HAND, ATTACH_RIGHT_HAND, ATTACH_BACK] {
            skeleton
                .points
                .insert(name.to_owned(), AttachmentPose::IDENTITY);
        }
        skeleton
    }
}

impl Default for MockSkeleton {
    fn default() -> Self {
        Self::humanoid()
    }
}

impl SkeletonView for MockSkeleton {
    fn model_matrix(&self) -> Mat4 {
        self.model
    }

    fn attachment_point(&self, name: &str) -> Option<AttachmentPose> {
        self.points.get(name).copied()
    }

    fn main_hand_code(&self) -> Option<&str> {
        self.main_hand.as_deref()
    }

    fn off_hand_code(&self) -> Option<&str> {
        self.off_hand.as_deref()
    }

    fn is_local_first_person(&self) -> bool {
        self.local_first_person
    }
}

/// [`DrawSink`] that keeps every call.
#[derive(Clone, Debug, Default)]
pub struct RecordingDrawSink {
    /// Calls in submission order.
    pub calls: Vec<DrawCall>,
}

impl RecordingDrawSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets recorded calls.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DrawSink for RecordingDrawSink {
    fn submit(&mut self, call: DrawCall) {
        self.calls.push(call);
    }
}
