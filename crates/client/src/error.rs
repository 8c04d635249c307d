//! Upload error types.

use std::fmt;

use tusk_protocol::{Headers, Method};

use crate::transport::HttpRequest;

/// The protocol step a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    /// HEAD against a previously created upload.
    Resume,
    /// POST to the creation endpoint.
    Create,
    /// PATCH of one chunk.
    Patch,
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestPhase::Resume => "resuming upload",
            RequestPhase::Create => "creating upload",
            RequestPhase::Patch => "uploading chunk",
        })
    }
}

/// Snapshot of the request that produced an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    /// Size of the request body in bytes.
    pub body_len: usize,
}

impl From<&HttpRequest> for RequestInfo {
    fn from(req: &HttpRequest) -> Self {
        Self {
            method: req.method,
            url: req.url.clone(),
            headers: req.headers.clone(),
            body_len: req.body.as_ref().map_or(0, Vec::len),
        }
    }
}

impl fmt::Display for RequestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Errors produced by an upload attempt.
///
/// Every variant except [`Aborted`](UploadError::Aborted) is reported to
/// the `on_error` callback exactly once.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UploadError {
    #[error("tus: invalid configuration: {0}")]
    InvalidConfig(String),

    /// No response was received.
    #[error(
        "tus: failed to send request while {phase}, originated from request (error: {reason})"
    )]
    TransportFailure {
        phase: RequestPhase,
        request: RequestInfo,
        reason: String,
    },

    /// A response arrived but does not have the success shape for `phase`.
    #[error(
        "tus: {reason} while {phase}, originated from request (response code: {status}, response text: {body})"
    )]
    UnexpectedStatus {
        phase: RequestPhase,
        request: RequestInfo,
        reason: String,
        status: u16,
        body: String,
    },

    /// The server does not speak the protocol version this client sends.
    #[error(
        "tus: server does not support protocol version {expected} while {phase}, originated from request (response code: {status}, server version: {})",
        .server_version.as_deref().unwrap_or("unknown")
    )]
    ProtocolMismatch {
        phase: RequestPhase,
        request: RequestInfo,
        status: u16,
        expected: &'static str,
        server_version: Option<String>,
    },

    /// The server answered the resume check with a 4xx status.
    ///
    /// The stored URL has been forgotten, so the next `start` creates a
    /// fresh upload.
    #[error(
        "tus: server rejected resumption of upload, originated from request (response code: {status}, response text: {body})"
    )]
    ResumeRejected {
        request: RequestInfo,
        status: u16,
        body: String,
    },

    #[error("tus: failed to read source: {0}")]
    Source(String),

    /// The attempt was cancelled by the caller.
    #[error("tus: upload aborted")]
    Aborted,
}

impl UploadError {
    pub(crate) fn unexpected(
        phase: RequestPhase,
        request: RequestInfo,
        reason: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        UploadError::UnexpectedStatus {
            phase,
            request,
            reason: reason.into(),
            status,
            body: body.into(),
        }
    }

    /// The request that originated this error, if one was sent.
    pub fn request(&self) -> Option<&RequestInfo> {
        match self {
            UploadError::TransportFailure { request, .. }
            | UploadError::UnexpectedStatus { request, .. }
            | UploadError::ProtocolMismatch { request, .. }
            | UploadError::ResumeRejected { request, .. } => Some(request),
            _ => None,
        }
    }

    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::UnexpectedStatus { status, .. }
            | UploadError::ProtocolMismatch { status, .. }
            | UploadError::ResumeRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body text, when one was received.
    pub fn response_text(&self) -> Option<&str> {
        match self {
            UploadError::UnexpectedStatus { body, .. } | UploadError::ResumeRejected { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }

    /// The protocol step that failed.
    pub fn phase(&self) -> Option<RequestPhase> {
        match self {
            UploadError::TransportFailure { phase, .. }
            | UploadError::UnexpectedStatus { phase, .. }
            | UploadError::ProtocolMismatch { phase, .. } => Some(*phase),
            UploadError::ResumeRejected { .. } => Some(RequestPhase::Resume),
            _ => None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, UploadError::Aborted)
    }
}
