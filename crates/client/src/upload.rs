//! The upload controller.
//!
//! One [`Upload`] drives one logical upload through
//! `Idle → ResolvingResume | Creating → PatchingChunk → Complete`, with
//! `Failed` reachable from any step. Requests are issued strictly one at
//! a time and every store call is awaited before the next request.
//!
//! The offset is always taken from the server's response, never computed
//! from the number of bytes sent.

use std::sync::Arc;

use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tusk_protocol::constants::{
    CONTENT_TYPE, LOCATION, OFFSET_OCTET_STREAM, STATUS_PRECONDITION_FAILED, TUS_RESUMABLE,
    TUS_VERSION_HEADER, UPLOAD_DEFER_LENGTH, UPLOAD_LENGTH, UPLOAD_METADATA, UPLOAD_OFFSET,
    X_HTTP_METHOD_OVERRIDE,
};
use tusk_protocol::{Method, StatusClass, TUS_VERSION, encode_metadata};
use tusk_store::UrlStore;
use tusk_transfer::{ByteSource, next_chunk_end};

use crate::error::{RequestInfo, RequestPhase, UploadError};
use crate::fingerprint::fingerprint_for;
use crate::options::UploadOptions;
use crate::state::{State, UploadState};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Resumable upload of one byte source.
pub struct Upload {
    source: Arc<dyn ByteSource>,
    options: UploadOptions,
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn UrlStore>,
    cancel: CancellationToken,
    state: State,
    progress: Option<UploadState>,
}

impl Upload {
    /// Creates an idle upload. Nothing is sent until [`start`](Self::start).
    pub fn new(
        source: Arc<dyn ByteSource>,
        options: UploadOptions,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn UrlStore>,
    ) -> Self {
        Self {
            source,
            options,
            transport,
            store,
            cancel: CancellationToken::new(),
            state: State::Idle,
            progress: None,
        }
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    /// Current (or final) controller state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Progress of the current or most recent attempt.
    pub fn progress(&self) -> Option<&UploadState> {
        self.progress.as_ref()
    }

    /// Upload URL of the most recent attempt, once created or resumed.
    pub fn url(&self) -> Option<&str> {
        self.progress.as_ref().and_then(|p| p.url.as_deref())
    }

    /// Last offset acknowledged by the server.
    pub fn offset(&self) -> u64 {
        self.progress.as_ref().map_or(0, |p| p.offset)
    }

    /// Returns a token that aborts the running attempt when cancelled.
    ///
    /// An aborted attempt installs a fresh token, so fetch a new one
    /// before each `start`.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Aborts the running attempt (best effort).
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    /// Runs one upload attempt to completion or failure.
    ///
    /// `on_success` or `on_error` fires exactly once per attempt, except
    /// for an aborted attempt, which fires neither and returns
    /// [`UploadError::Aborted`].
    pub async fn start(&mut self) -> Result<(), UploadError> {
        self.state = State::Idle;
        let fingerprint = fingerprint_for(self.source.info(), &self.options);
        let mut progress = UploadState::new(fingerprint);

        let result = self.run(&mut progress).await;
        self.progress = Some(progress);

        match &result {
            Ok(()) => {
                if let Some(cb) = &self.options.on_success {
                    cb();
                }
            }
            Err(UploadError::Aborted) => {
                debug!("upload aborted");
                self.cancel = CancellationToken::new();
            }
            Err(e) => {
                self.state = State::Failed;
                warn!(error = %e, "upload failed");
                if let Some(cb) = &self.options.on_error {
                    cb(e);
                }
            }
        }
        result
    }

    /// Drives the state machine until `Complete` or an error.
    async fn run(&mut self, progress: &mut UploadState) -> Result<(), UploadError> {
        let endpoint = self.options.validate()?;
        self.check_cancelled()?;

        self.state = self.resolve_start(progress).await?;
        loop {
            self.check_cancelled()?;
            let next = match self.state.clone() {
                State::ResolvingResume { url } => self.resolve_resume(progress, url).await?,
                State::Creating => self.create(progress, endpoint.as_ref()).await?,
                State::PatchingChunk => self.patch_chunk(progress).await?,
                State::Complete => return self.complete(progress).await,
                State::Idle | State::Failed => {
                    return Err(UploadError::InvalidConfig(
                        "upload state machine entered an invalid state".into(),
                    ));
                }
            };
            self.state = next;
        }
    }

    /// `Idle`: choose between resuming and creating.
    async fn resolve_start(&self, progress: &UploadState) -> Result<State, UploadError> {
        if let Some(url) = &self.options.upload_url {
            debug!(url = %url, "resuming explicit upload url");
            return Ok(State::ResolvingResume { url: url.clone() });
        }

        if self.options.resume {
            let stored = self.cancellable(self.store.get(&progress.fingerprint)).await?;
            match stored {
                Ok(Some(url)) => {
                    debug!(url = %url, fingerprint = %progress.fingerprint, "found stored upload url");
                    return Ok(State::ResolvingResume { url });
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "failed to read upload url store, creating a new upload");
                }
            }
        }
        Ok(State::Creating)
    }

    /// `ResolvingResume`: HEAD the upload and adopt the server's offset.
    async fn resolve_resume(
        &self,
        progress: &mut UploadState,
        url: String,
    ) -> Result<State, UploadError> {
        let request = self.request(Method::Head, &url);
        let (info, response) = match self.send(RequestPhase::Resume, request).await {
            Ok(sent) => sent,
            // A 4xx on the resume check retires the stored URL even when
            // the server also declines the protocol version.
            Err(e @ UploadError::ProtocolMismatch { status, .. })
                if StatusClass::of(status) == StatusClass::ClientError =>
            {
                self.forget(&progress.fingerprint).await?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        match StatusClass::of(response.status) {
            StatusClass::Success => {}
            StatusClass::ClientError => {
                self.forget(&progress.fingerprint).await?;
                return Err(UploadError::ResumeRejected {
                    request: info,
                    status: response.status,
                    body: response.body,
                });
            }
            StatusClass::Other => {
                return Err(UploadError::unexpected(
                    RequestPhase::Resume,
                    info,
                    "unexpected response",
                    response.status,
                    response.body,
                ));
            }
        }

        let Some(offset) = response.headers.get_u64(UPLOAD_OFFSET) else {
            return Err(UploadError::unexpected(
                RequestPhase::Resume,
                info,
                "invalid or missing offset value",
                response.status,
                response.body,
            ));
        };

        let (length, declared) = match response.headers.get_u64(UPLOAD_LENGTH) {
            Some(length) => (length, true),
            None if self.options.upload_length_deferred => (self.declared_size(), false),
            None => {
                return Err(UploadError::unexpected(
                    RequestPhase::Resume,
                    info,
                    "invalid or missing length value",
                    response.status,
                    response.body,
                ));
            }
        };

        if offset > length {
            return Err(UploadError::unexpected(
                RequestPhase::Resume,
                info,
                "offset beyond upload length",
                response.status,
                response.body,
            ));
        }

        info!(url = %url, offset, length, "resuming upload");
        progress.url = Some(url);
        progress.offset = offset;
        progress.length = Some(length);
        progress.length_declared = declared;
        Ok(State::PatchingChunk)
    }

    /// `Creating`: POST a new upload and persist its URL.
    async fn create(
        &self,
        progress: &mut UploadState,
        endpoint: Option<&Url>,
    ) -> Result<State, UploadError> {
        let Some(endpoint) = endpoint else {
            return Err(UploadError::InvalidConfig(
                "cannot create an upload without an endpoint".into(),
            ));
        };

        let length = self.declared_size();
        let mut request = self.request(Method::Post, endpoint.as_str());
        if self.options.upload_length_deferred {
            request.headers.insert(UPLOAD_DEFER_LENGTH, "1");
        } else {
            request.headers.insert(UPLOAD_LENGTH, length.to_string());
        }
        let metadata = encode_metadata(&self.options.metadata)
            .map_err(|e| UploadError::InvalidConfig(e.to_string()))?;
        if !metadata.is_empty() {
            request.headers.insert(UPLOAD_METADATA, metadata);
        }

        let (info, response) = self.send(RequestPhase::Create, request).await?;
        if StatusClass::of(response.status) != StatusClass::Success {
            return Err(UploadError::unexpected(
                RequestPhase::Create,
                info,
                "unexpected response",
                response.status,
                response.body,
            ));
        }

        let resolved = response
            .headers
            .get(LOCATION)
            .filter(|l| !l.trim().is_empty())
            .and_then(|l| endpoint.join(l.trim()).ok());
        let Some(url) = resolved else {
            return Err(UploadError::unexpected(
                RequestPhase::Create,
                info,
                "invalid or missing Location header",
                response.status,
                response.body,
            ));
        };
        let url = url.to_string();
        info!(url = %url, length, "upload created");

        if self.options.resume {
            let stored = self
                .cancellable(self.store.set(&progress.fingerprint, &url))
                .await?;
            if let Err(e) = stored {
                warn!(error = %e, "failed to persist upload url, upload will not be resumable");
            }
        }

        progress.url = Some(url);
        progress.offset = 0;
        progress.length = Some(length);
        progress.length_declared = !self.options.upload_length_deferred;
        Ok(State::PatchingChunk)
    }

    /// `PatchingChunk`: send one chunk and adopt the acknowledged offset.
    async fn patch_chunk(&self, progress: &mut UploadState) -> Result<State, UploadError> {
        if progress.is_finished() {
            return Ok(State::Complete);
        }
        let (Some(url), Some(length)) = (progress.url.clone(), progress.length) else {
            return Err(UploadError::InvalidConfig(
                "chunk transfer started before the upload was created".into(),
            ));
        };

        let start = progress.offset;
        let end = next_chunk_end(start, length, self.options.chunk_size);
        let chunk = self
            .source
            .slice(start, end)
            .await
            .map_err(|e| UploadError::Source(e.to_string()))?;
        self.check_cancelled()?;

        let mut request = if self.options.override_patch_method {
            let mut r = self.request(Method::Post, &url);
            r.headers.insert(X_HTTP_METHOD_OVERRIDE, "PATCH");
            r
        } else {
            self.request(Method::Patch, &url)
        };
        request.headers.insert(UPLOAD_OFFSET, start.to_string());
        request.headers.insert(CONTENT_TYPE, OFFSET_OCTET_STREAM);
        if !progress.length_declared {
            request.headers.insert(UPLOAD_LENGTH, length.to_string());
        }
        request.body = Some(chunk);

        let (info, response) = self.send(RequestPhase::Patch, request).await?;
        if StatusClass::of(response.status) != StatusClass::Success {
            return Err(UploadError::unexpected(
                RequestPhase::Patch,
                info,
                "unexpected response",
                response.status,
                response.body,
            ));
        }

        let Some(offset) = response.headers.get_u64(UPLOAD_OFFSET) else {
            return Err(UploadError::unexpected(
                RequestPhase::Patch,
                info,
                "invalid or missing offset value",
                response.status,
                response.body,
            ));
        };
        let sent_bytes = end > start;
        if offset > length || offset < start || (sent_bytes && offset == start) {
            return Err(UploadError::unexpected(
                RequestPhase::Patch,
                info,
                format!("server acknowledged invalid offset {offset} for chunk {start}..{end}"),
                response.status,
                response.body,
            ));
        }

        progress.offset = offset;
        progress.length_declared = true;
        debug!(offset, length, "chunk acknowledged");

        if let Some(cb) = &self.options.on_chunk_complete {
            cb(offset - start, offset, length);
        }
        if let Some(cb) = &self.options.on_progress {
            cb(offset, length);
        }
        Ok(State::PatchingChunk)
    }

    /// `Complete`: optionally forget the stored URL.
    async fn complete(&self, progress: &UploadState) -> Result<(), UploadError> {
        info!(url = ?progress.url, length = ?progress.length, "upload complete");
        if self.options.remove_fingerprint_on_success {
            self.forget(&progress.fingerprint).await?;
        }
        Ok(())
    }

    /// Removes the stored URL for `fingerprint`, logging store failures.
    async fn forget(&self, fingerprint: &str) -> Result<(), UploadError> {
        let removed = self.cancellable(self.store.remove(fingerprint)).await?;
        if let Err(e) = removed {
            warn!(error = %e, fingerprint = %fingerprint, "failed to remove stored upload url");
        }
        Ok(())
    }

    /// Builds a request carrying the caller's headers and the protocol
    /// version header.
    fn request(&self, method: Method, url: &str) -> HttpRequest {
        let mut request = HttpRequest::new(method, url);
        for (name, value) in self.options.headers.iter() {
            request.headers.insert(name, value);
        }
        request.headers.insert(TUS_RESUMABLE, TUS_VERSION);
        request
    }

    /// Sends one request, racing it against cancellation, and rejects
    /// responses that decline the protocol version.
    async fn send(
        &self,
        phase: RequestPhase,
        request: HttpRequest,
    ) -> Result<(RequestInfo, HttpResponse), UploadError> {
        let info = RequestInfo::from(&request);
        debug!(method = %info.method, url = %info.url, "sending request");

        let response = self
            .cancellable(self.transport.send(request))
            .await?
            .map_err(|e| UploadError::TransportFailure {
                phase,
                request: info.clone(),
                reason: e.to_string(),
            })?;

        let server_version = response.headers.get(TUS_RESUMABLE);
        if response.status == STATUS_PRECONDITION_FAILED
            || server_version.is_some_and(|v| v.trim() != TUS_VERSION)
        {
            let server_version = response
                .headers
                .get(TUS_VERSION_HEADER)
                .or(server_version.filter(|v| v.trim() != TUS_VERSION))
                .map(str::to_string);
            return Err(UploadError::ProtocolMismatch {
                phase,
                request: info,
                status: response.status,
                expected: TUS_VERSION,
                server_version,
            });
        }
        Ok((info, response))
    }

    /// Awaits `fut` unless the attempt is cancelled first.
    async fn cancellable<T>(&self, fut: impl Future<Output = T>) -> Result<T, UploadError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(UploadError::Aborted),
            out = fut => Ok(out),
        }
    }

    fn check_cancelled(&self) -> Result<(), UploadError> {
        if self.cancel.is_cancelled() {
            return Err(UploadError::Aborted);
        }
        Ok(())
    }

    fn declared_size(&self) -> u64 {
        self.options.upload_size.unwrap_or_else(|| self.source.size())
    }
}
