//! HTTP transport seam.
//!
//! The controller never talks to an HTTP library directly. It builds an
//! [`HttpRequest`], hands it to an [`HttpTransport`] and inspects the
//! returned [`HttpResponse`]. Using a trait keeps the state machine
//! decoupled from the network and testable with scripted mocks.

use std::future::Future;
use std::pin::Pin;

use tusk_protocol::{Headers, Method};

/// A single request issued by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    /// Chunk bytes for PATCH; `None` for HEAD and POST.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }
}

/// A response as seen by the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    /// Response body decoded as text (empty when there is none).
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Adds a header (builder style).
    pub fn with_header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.insert(name, value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// No response was received (DNS, connect, TLS, reset, timeout...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>>;

/// Performs one HTTP request.
///
/// Implementations must not follow redirects on behalf of the caller and
/// must report any received status (including 4xx/5xx) as `Ok`. Dropping
/// the returned future aborts the request.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}
