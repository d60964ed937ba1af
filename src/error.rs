//! Error types for the structure-to-HTML derivation.
//!
//! Only document-level failures surface from [`crate::converters::render`]; everything
//! below the document level is logged and recovered where it happens.

use crate::object::ObjectRef;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while deriving HTML from a tagged PDF.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// The document has no structure tree, so there is nothing to derive from
    #[error("Document is not tagged: no structure tree root")]
    NotTagged,

    /// A structure dictionary is malformed beyond recovery
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// Referenced object not found by the object-model provider
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Circular reference detected while following a destination chain
    #[error("Circular reference detected: object {0}")]
    CircularReference(ObjectRef),

    /// Image data could not be decoded or re-encoded
    #[error("Image error: {0}")]
    Image(String),

    /// Vector graphics could not be emitted
    #[error("Graphics error: {0}")]
    Graphics(String),

    /// The object-model provider failed to produce requested content
    #[error("Provider error: {0}")]
    Provider(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
