//! Wire types exchanged with the platform.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Metadata key linking a transmission to its attachment group.
pub const METADATA_TID: &str = "TID";
/// Metadata key carrying the file name of a payload.
pub const METADATA_FILENAME: &str = "filename";

/// One inbound unit listed by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transmission {
    /// Platform identifier.
    pub id: String,
    /// Pre-signed download URL.
    pub url: String,
    /// Advisory content hash; carried but never verified.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hash: Hash,
    /// Whether the platform flagged this as test traffic.
    #[serde(default, deserialize_with = "null_as_default")]
    pub test: bool,
    /// Metadata echoed by the platform (may contain `TID` and `filename`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: BTreeMap<String, String>,
}

impl Transmission {
    /// Message id used to look up attachments, when present.
    #[must_use]
    pub fn tid(&self) -> Option<&str> {
        self.metadata
            .get(METADATA_TID)
            .map(String::as_str)
            .filter(|tid| !tid.is_empty())
    }
}

/// Content hash advertised for a transmission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hash {
    /// Hash algorithm name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,
    /// Hex digest.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sum: String,
}

/// Attachment reference returned for a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttachment {
    /// Download URL.
    pub url: String,
    /// Platform identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_id: String,
}

/// Downloaded attachment bytes and the name announced by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentPayload {
    /// Attachment bytes.
    pub content: Vec<u8>,
    /// File name from `Content-Disposition`; empty when absent or unparseable.
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransmissionList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) transmissions: Vec<Transmission>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Confirmation {
    pub(crate) error: bool,
    pub(crate) message: String,
}

impl Confirmation {
    pub(crate) fn processed(id: &str) -> Self {
        Self {
            error: false,
            message: format!("processed transmission {id}"),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
