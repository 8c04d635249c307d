//! Resumable upload controller for the tus 1.0.0 protocol.
//!
//! This crate implements the **upload state machine**. Transport and
//! persistence are trait seams: the caller supplies an [`HttpTransport`]
//! and a [`UrlStore`](tusk_store::UrlStore), and the controller drives
//! them strictly sequentially.
//!
//! # Pipeline
//!
//! 1. **Fingerprint**: derive the lookup key for the source
//! 2. **Resume**: HEAD a stored upload URL and adopt the server offset
//! 3. **Create**: otherwise POST a new upload and persist its URL
//! 4. **Patch**: send chunks until the server offset reaches the length
//! 5. **Complete**: optionally forget the stored URL, report success

pub mod error;
pub mod fingerprint;
pub mod options;
pub mod state;
pub mod transport;
pub mod upload;

mod reqwest_transport;

// Re-export primary types for convenience.
pub use error::{RequestInfo, RequestPhase, UploadError};
pub use fingerprint::default_fingerprint;
pub use options::UploadOptions;
pub use state::{State, UploadState};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, TransportError, TransportFuture};
pub use reqwest_transport::ReqwestTransport;
pub use upload::Upload;
