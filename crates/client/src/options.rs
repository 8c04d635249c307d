//! Caller-supplied upload configuration.

use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use tusk_protocol::metadata::validate_key;
use tusk_protocol::{Headers, Metadata, MetadataValue};
use tusk_transfer::{ChunkSize, SourceInfo};

use crate::error::UploadError;

/// Invoked after every acknowledged chunk with `(bytes_sent, bytes_total)`.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Invoked after every acknowledged chunk with
/// `(chunk_size, bytes_accepted, bytes_total)`.
pub type ChunkCompleteCallback = Arc<dyn Fn(u64, u64, u64) + Send + Sync>;

/// Invoked once when the upload completes.
pub type SuccessCallback = Arc<dyn Fn() + Send + Sync>;

/// Invoked once when an attempt fails.
pub type ErrorCallback = Arc<dyn Fn(&UploadError) + Send + Sync>;

/// Custom fingerprint strategy.
pub type FingerprintFn = Arc<dyn Fn(&SourceInfo, &UploadOptions) -> String + Send + Sync>;

/// Upload configuration.
///
/// Built with [`UploadOptions::new`] and the `with_*` methods. Every
/// recognized option is a field here; there is no free-form bag.
#[derive(Clone)]
pub struct UploadOptions {
    /// Creation endpoint. Relative `Location` headers resolve against it.
    pub endpoint: String,
    pub chunk_size: ChunkSize,
    pub metadata: Metadata,
    /// Extra headers sent with every request.
    pub headers: Headers,
    /// Look up and record upload URLs in the store (default `true`).
    pub resume: bool,
    /// Forget the stored URL once the upload completes (default `false`).
    pub remove_fingerprint_on_success: bool,
    /// Resume this URL directly instead of looking up the fingerprint.
    pub upload_url: Option<String>,
    /// Declared upload length; defaults to the source size.
    pub upload_size: Option<u64>,
    /// Create with `Upload-Defer-Length: 1` and declare the length on the
    /// first PATCH.
    pub upload_length_deferred: bool,
    /// Send chunks as POST with `X-HTTP-Method-Override: PATCH`.
    pub override_patch_method: bool,
    pub fingerprint: Option<FingerprintFn>,
    pub on_progress: Option<ProgressCallback>,
    pub on_chunk_complete: Option<ChunkCompleteCallback>,
    pub on_success: Option<SuccessCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl UploadOptions {
    /// Creates options with defaults for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            chunk_size: ChunkSize::Unbounded,
            metadata: Metadata::new(),
            headers: Headers::new(),
            resume: true,
            remove_fingerprint_on_success: false,
            upload_url: None,
            upload_size: None,
            upload_length_deferred: false,
            override_patch_method: false,
            fingerprint: None,
            on_progress: None,
            on_chunk_complete: None,
            on_success: None,
            on_error: None,
        }
    }

    pub fn with_chunk_size(mut self, bytes: u64) -> Self {
        self.chunk_size = ChunkSize::Bounded(bytes);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn with_remove_fingerprint_on_success(mut self, remove: bool) -> Self {
        self.remove_fingerprint_on_success = remove;
        self
    }

    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = Some(url.into());
        self
    }

    pub fn with_upload_size(mut self, size: u64) -> Self {
        self.upload_size = Some(size);
        self
    }

    pub fn with_upload_length_deferred(mut self, deferred: bool) -> Self {
        self.upload_length_deferred = deferred;
        self
    }

    pub fn with_override_patch_method(mut self, enabled: bool) -> Self {
        self.override_patch_method = enabled;
        self
    }

    pub fn with_fingerprint(
        mut self,
        f: impl Fn(&SourceInfo, &UploadOptions) -> String + Send + Sync + 'static,
    ) -> Self {
        self.fingerprint = Some(Arc::new(f));
        self
    }

    pub fn on_progress(mut self, f: impl Fn(u64, u64) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(f));
        self
    }

    pub fn on_chunk_complete(mut self, f: impl Fn(u64, u64, u64) + Send + Sync + 'static) -> Self {
        self.on_chunk_complete = Some(Arc::new(f));
        self
    }

    pub fn on_success(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&UploadError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Checks the configuration and returns the parsed endpoint.
    ///
    /// The endpoint may be empty only when `upload_url` is set.
    pub(crate) fn validate(&self) -> Result<Option<Url>, UploadError> {
        if !self.chunk_size.is_valid() {
            return Err(UploadError::InvalidConfig(
                "chunk size must be a positive number of bytes".into(),
            ));
        }
        for key in self.metadata.keys() {
            validate_key(key).map_err(|e| UploadError::InvalidConfig(e.to_string()))?;
        }
        if let Some(url) = &self.upload_url {
            Url::parse(url)
                .map_err(|e| UploadError::InvalidConfig(format!("invalid upload URL {url:?}: {e}")))?;
        }

        if self.endpoint.is_empty() {
            if self.upload_url.is_none() {
                return Err(UploadError::InvalidConfig(
                    "neither an endpoint nor an upload URL was provided".into(),
                ));
            }
            return Ok(None);
        }
        let endpoint = Url::parse(&self.endpoint).map_err(|e| {
            UploadError::InvalidConfig(format!("invalid endpoint {:?}: {e}", self.endpoint))
        })?;
        Ok(Some(endpoint))
    }
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("endpoint", &self.endpoint)
            .field("chunk_size", &self.chunk_size)
            .field("metadata", &self.metadata)
            .field("headers", &self.headers)
            .field("resume", &self.resume)
            .field(
                "remove_fingerprint_on_success",
                &self.remove_fingerprint_on_success,
            )
            .field("upload_url", &self.upload_url)
            .field("upload_size", &self.upload_size)
            .field("upload_length_deferred", &self.upload_length_deferred)
            .field("override_patch_method", &self.override_patch_method)
            .field("fingerprint", &self.fingerprint.is_some())
            .finish_non_exhaustive()
    }
}
