//! Payload passed across the transport boundary.

use std::collections::BTreeMap;

/// Metadata key carrying the file name of a payload.
pub const METADATA_FILENAME: &str = "filename";
/// Metadata key linking a transmission to its attachment group.
pub const METADATA_TID: &str = "TID";

/// Immutable payload with an opaque id, bytes, and string metadata.
///
/// File transports use the absolute path as id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Object {
    id: String,
    content: Vec<u8>,
    metadata: BTreeMap<String, String>,
}

impl Object {
    /// Create an object without metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Create an object carrying `metadata`.
    #[must_use]
    pub fn with_metadata(
        id: impl Into<String>,
        content: impl Into<Vec<u8>>,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
        }
    }

    /// Opaque identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Payload bytes.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Metadata entries.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// The `filename` metadata entry, falling back to the id.
    #[must_use]
    pub fn filename(&self) -> &str {
        self.metadata
            .get(METADATA_FILENAME)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.id)
    }
}
