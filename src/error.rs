//! Error types for lexipub operations.

use thiserror::Error;

/// Errors surfaced by the loading and rendering pipeline.
///
/// `MalformedPackage` and `EmptySpine` are whole-document failures raised
/// while loading. The remaining variants are local to a single unit or
/// resource request and leave the loaded document usable.
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed package: {0}")]
    MalformedPackage(String),

    #[error("package has no readable content in its spine")]
    EmptySpine,

    #[error("unit {position} is unreadable: {reason}")]
    ContentUnreadable { position: usize, reason: String },

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("unit {position} is out of range (document has {len} units)")]
    UnitOutOfRange { position: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error invalidates the whole document rather than one request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::MalformedPackage(_) | Error::EmptySpine | Error::Io(_)
        )
    }

    pub(crate) fn malformed(msg: impl std::fmt::Display) -> Self {
        Error::MalformedPackage(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
