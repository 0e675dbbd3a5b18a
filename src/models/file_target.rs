//! A validated file-write request.

use crate::{
    errors::ApiError,
    validators::{validate_content, validate_file_name},
};
use serde_json::Value;

/// Destination file name plus the text to write there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileTarget {
    /// Bare file name such as `report.csv`; never contains a separator.
    pub name: String,

    /// Text payload, written as-is.
    pub content: String,
}

impl FileTarget {
    /// Build a target from the `path` query argument and the raw body.
    ///
    /// The name is checked before the body is even parsed, so a request
    /// failing both rules reports the name.
    pub fn from_request(path: Option<&str>, body: &[u8]) -> Result<Self, ApiError> {
        let name = validate_file_name(path)?;
        let payload = parse_body(body)?;
        let content = validate_content(payload.as_ref())?;
        Ok(Self { name, content })
    }
}

/// An empty body is "no payload"; anything else must be JSON.
fn parse_body(body: &[u8]) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|_| ApiError::validation("Invalid JSON in body of request"))
}
