//! [`HttpTransport`] backed by `reqwest`.

use std::time::Duration;

use reqwest::redirect::Policy;
use tracing::warn;
use tusk_protocol::{Headers, Method};

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError, TransportFuture};

/// Sends requests with a `reqwest::Client` that never follows redirects.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport without timeouts.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeouts(None, None)
    }

    /// Creates a transport with an optional connect timeout and an
    /// optional whole-request timeout.
    ///
    /// The request timeout covers sending the body, so it bounds how large
    /// a single chunk can be on a slow link.
    pub fn with_timeouts(
        connect: Option<Duration>,
        request: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().redirect(Policy::none());
        if let Some(connect) = connect {
            builder = builder.connect_timeout(connect);
        }
        if let Some(request) = request {
            builder = builder.timeout(request);
        }
        let http = builder
            .build()
            .map_err(|e| TransportError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Wraps an existing client. The caller is responsible for its
    /// redirect policy.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let mut builder = self
                .http
                .request(to_reqwest_method(request.method), &request.url);
            for (name, value) in request.headers.iter() {
                builder = builder.header(name, value);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let resp = builder
                .send()
                .await
                .map_err(|e| TransportError(e.to_string()))?;

            let status = resp.status().as_u16();
            let headers: Headers = resp
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(status, error = %e, "failed to read response body");
                    String::new()
                }
            };

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}
