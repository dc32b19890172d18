//! `Content-Disposition` encoding and decoding.

use reqwest::header::HeaderValue;

use crate::error::{PlatformError, PlatformResult};

/// Extract the `filename` parameter from a `Content-Disposition` header.
///
/// Absent, non-UTF-8, or parameterless headers yield an empty string.
#[must_use]
pub fn filename_from_header(header: Option<&HeaderValue>) -> String {
    header
        .and_then(|value| value.to_str().ok())
        .map(filename_from_disposition)
        .unwrap_or_default()
}

/// Extract the `filename` parameter from a raw `Content-Disposition` value.
#[must_use]
pub fn filename_from_disposition(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let parsed = mailparse::parse_content_disposition(raw);
    parsed
        .params
        .get("filename")
        .map(|name| name.trim().to_string())
        .unwrap_or_default()
}

/// Build `attachment; filename="<name>"` for an upload.
///
/// # Errors
///
/// Returns [`PlatformError::InvalidFilename`] when the name contains control
/// characters that cannot appear in a header.
pub fn attachment_header(filename: &str) -> PlatformResult<HeaderValue> {
    let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
    HeaderValue::from_str(&format!("attachment; filename=\"{escaped}\"")).map_err(|_| {
        PlatformError::InvalidFilename {
            filename: filename.to_string(),
        }
    })
}
