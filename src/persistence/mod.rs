//! Save/load persistence
//!
//! Features:
//! - Versioned JSON documents, one section per stateful entity
//! - Validate-then-commit loading (a bad document leaves the game untouched)
//! - Atomic file writes (tmp → rename)

pub mod entities;
pub mod store;

use uuid::Uuid;

pub use store::{FileStore, MemoryStore, SaveStore, read_document, write_document};

/// A save document
pub type Document = serde_json::Value;

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("save storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed save document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save document is missing '{0}'")]
    MissingKey(&'static str),
    #[error("invalid block GUID '{0}'")]
    InvalidGuid(String),
    #[error("block {0} does not exist in level {1}")]
    UnknownBlock(Uuid, u32),
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u64),
    #[error("save value '{0}' is out of range")]
    InvalidValue(&'static str),
}

/// A stateful entity that can be written to and restored from a document
pub trait Persist {
    fn save(&self) -> Document;

    /// Restore from `doc`. On error the entity is left unchanged.
    fn load(&mut self, doc: &Document) -> Result<(), PersistError>;
}

/// Look up a required key
pub(crate) fn field<'a>(doc: &'a Document, key: &'static str) -> Result<&'a Document, PersistError> {
    doc.get(key).ok_or(PersistError::MissingKey(key))
}
