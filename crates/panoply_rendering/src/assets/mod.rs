//! # Asset Handles
//!
//! Identifiers the renderer passes around. The host's asset system owns the
//! actual textures and meshes; PANOPLY only holds their handles.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ItemCode → shape base → ShapeLocation → ShapeDefinition    │
//! │                                              ↓              │
//! │                     (texture, mesh) ← tessellate + upload   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod mesh_cache;

pub use mesh_cache::{CacheKey, MeshCache, MeshCacheStats};

use std::fmt;

/// Host texture identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Host mesh identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Renderable representation of one item look.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CachedMesh {
    /// Texture to bind.
    pub texture: TextureHandle,
    /// Uploaded mesh.
    pub mesh: MeshHandle,
}

/// Normalized shape file location: `domain:shapes/<path>.json`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShapeLocation(String);

impl ShapeLocation {
    const PREFIX: &'static str = "shapes/";
    const SUFFIX: &'static str = ".json";

    /// Normalizes an item's base shape path.
    ///
    /// The `shapes/` prefix and `.json` suffix are added once; a path that
    /// already carries them is left alone. A missing domain stays missing.
    #[must_use]
    pub fn from_base(base: &str) -> Self {
        let (domain, path) = match base.split_once(':') {
            Some((domain, path)) => (Some(domain), path),
            None => (None, base),
        };

        let mut normalized = String::with_capacity(base.len() + Self::PREFIX.len() + Self::SUFFIX.len());
        if let Some(domain) = domain {
            normalized.push_str(domain);
            normalized.push(':');
        }
        if !path.starts_with(Self::PREFIX) {
            normalized.push_str(Self::PREFIX);
        }
        normalized.push_str(path);
        if !path.ends_with(Self::SUFFIX) {
            normalized.push_str(Self::SUFFIX);
        }
        Self(normalized)
    }

    /// String form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loaded shape, ready for tessellation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeDefinition {
    /// Where it was loaded from.
    pub location: ShapeLocation,
    /// Element names, if the backend exposes them. Only used for logging.
    pub elements: Vec<String>,
}
