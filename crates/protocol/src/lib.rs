//! Wire-level pieces of the tus 1.0.0 resumable upload protocol.
//!
//! Nothing in this crate performs I/O. It holds header names, the
//! `Upload-Metadata` codec, status classification, and a small
//! case-insensitive header list shared by requests and responses.

pub mod constants;
pub mod headers;
pub mod metadata;
pub mod types;

// Re-export primary types for convenience.
pub use constants::TUS_VERSION;
pub use headers::Headers;
pub use metadata::{Metadata, MetadataError, MetadataValue, decode_metadata, encode_metadata};
pub use types::{Method, StatusClass};
