//! # Shared Error Types
//!
//! Failures that can occur while decoding shared data or loading configs.

use thiserror::Error;

/// Errors raised by the shared codec and config loaders.
#[derive(Error, Debug)]
pub enum SharedError {
    /// Buffer ended before a complete value was read.
    #[error("unexpected end of buffer: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes the reader asked for.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A string field was not valid UTF-8.
    #[error("invalid utf-8 in string field")]
    InvalidUtf8,

    /// A length prefix does not fit the field it describes.
    #[error("field too long: {len} bytes, limit {limit}")]
    FieldTooLong {
        /// Actual length.
        len: usize,
        /// Maximum encodable length.
        limit: usize,
    },

    /// An enum discriminant on the wire is unknown.
    #[error("invalid {what} discriminant: {value}")]
    InvalidDiscriminant {
        /// Which field was being decoded.
        what: &'static str,
        /// The offending value.
        value: u8,
    },

    /// Encoded stack uses a format version this build does not know.
    #[error("unsupported item stack version: {0}")]
    UnsupportedStackVersion(u8),

    /// Trailing bytes after a complete value.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// Config document could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    /// Config could not be written out.
    #[error("could not serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config file could not be read.
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for shared operations.
pub type SharedResult<T> = Result<T, SharedError>;
