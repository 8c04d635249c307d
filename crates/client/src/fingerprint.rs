//! Fingerprints identify a logical upload across attempts.

use tusk_transfer::SourceInfo;

use crate::options::UploadOptions;

/// Default fingerprint: `tus-<size>-<name>-<mtime millis>-<endpoint>`.
///
/// Missing name or modification time render as empty segments.
pub fn default_fingerprint(info: &SourceInfo, options: &UploadOptions) -> String {
    let name = info.name.as_deref().unwrap_or("");
    let modified = info
        .last_modified
        .map(|t| t.timestamp_millis().to_string())
        .unwrap_or_default();
    format!("tus-{}-{name}-{modified}-{}", info.size, options.endpoint)
}

/// Computes the fingerprint with the custom strategy if one is set.
pub(crate) fn fingerprint_for(info: &SourceInfo, options: &UploadOptions) -> String {
    match &options.fingerprint {
        Some(f) => f(info, options),
        None => default_fingerprint(info, options),
    }
}
