//! `Upload-Metadata` header codec.
//!
//! Each entry is `key base64(value)`; entries are joined with `,`. Servers
//! treat the entry list as an unordered set, but encoding here is
//! deterministic (keys sorted) so identical metadata always yields an
//! identical header.

use std::borrow::Cow;
use std::collections::BTreeMap;

use base64::{Engine, engine::general_purpose::STANDARD};

/// Metadata attached to an upload at creation time.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Text(String),
    /// Rendered in decimal before encoding.
    Integer(i64),
    /// Encoded byte-for-byte.
    Binary(Vec<u8>),
}

impl MetadataValue {
    /// Returns the bytes that go through base64.
    pub fn as_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            MetadataValue::Text(s) => Cow::Borrowed(s.as_bytes()),
            MetadataValue::Integer(n) => Cow::Owned(n.to_string().into_bytes()),
            MetadataValue::Binary(b) => Cow::Borrowed(b),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Text(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::Integer(n)
    }
}

impl From<i32> for MetadataValue {
    fn from(n: i32) -> Self {
        MetadataValue::Integer(n.into())
    }
}

impl From<u32> for MetadataValue {
    fn from(n: u32) -> Self {
        MetadataValue::Integer(n.into())
    }
}

impl From<Vec<u8>> for MetadataValue {
    fn from(b: Vec<u8>) -> Self {
        MetadataValue::Binary(b)
    }
}

/// Errors from metadata encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("invalid metadata key {0:?}: keys must be non-empty and contain no spaces or commas")]
    InvalidKey(String),

    #[error("invalid base64 value for metadata key {key:?}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Checks that `key` can be carried in the header.
pub fn validate_key(key: &str) -> Result<(), MetadataError> {
    if key.is_empty() || key.contains(' ') || key.contains(',') {
        return Err(MetadataError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Encodes metadata into the `Upload-Metadata` header value.
///
/// Returns an empty string for empty metadata.
pub fn encode_metadata(metadata: &Metadata) -> Result<String, MetadataError> {
    let mut entries = Vec::with_capacity(metadata.len());
    for (key, value) in metadata {
        validate_key(key)?;
        entries.push(format!("{key} {}", STANDARD.encode(value.as_bytes())));
    }
    Ok(entries.join(","))
}

/// Decodes an `Upload-Metadata` header value into raw key/value pairs.
///
/// Entries without a value (a bare key) decode to an empty byte vector.
pub fn decode_metadata(header: &str) -> Result<Vec<(String, Vec<u8>)>, MetadataError> {
    let mut pairs = Vec::new();
    for entry in header.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (key, encoded) = match entry.split_once(' ') {
            Some((k, v)) => (k, v.trim()),
            None => (entry, ""),
        };
        validate_key(key)?;
        let value = STANDARD
            .decode(encoded)
            .map_err(|e| MetadataError::InvalidValue {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        pairs.push((key.to_string(), value));
    }
    Ok(pairs)
}
