//! Asset collaborator errors.

use thiserror::Error;

/// Failures reported by an [`crate::AssetBackend`].
///
/// Every one of these means "no representation": the slot is drawn empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// The game has no item with this code.
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// The item's shape file does not exist.
    #[error("Missing shape: {0}")]
    MissingShape(String),

    /// Tessellation or GPU upload failed.
    #[error("Mesh upload failed for {code}: {reason}")]
    UploadFailed {
        /// Item code.
        code: String,
        /// Backend-specific reason.
        reason: String,
    },
}

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;
