//! Scripted transport and store doubles for upload tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tusk_client::{HttpRequest, HttpResponse, HttpTransport, TransportError, TransportFuture};
use tusk_protocol::Method;
use tusk_store::{StoreError, StoreFuture, UrlStore};

/// What the mock does with the next request.
pub enum Reply {
    Response(HttpResponse),
    Fail(String),
    /// Never answers, so only cancellation can end the request.
    Hang,
}

type Observer = Box<dyn Fn(&HttpRequest) + Send + Sync>;

/// Transport that records every request and answers from a queue.
///
/// A request arriving with an empty queue fails with a transport error.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
    observer: Mutex<Option<Observer>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, response: HttpResponse) -> &Self {
        self.replies.lock().unwrap().push_back(Reply::Response(response));
        self
    }

    pub fn fail(&self, reason: &str) -> &Self {
        self.replies.lock().unwrap().push_back(Reply::Fail(reason.into()));
        self
    }

    pub fn hang(&self) -> &Self {
        self.replies.lock().unwrap().push_back(Reply::Hang);
        self
    }

    /// Runs `f` on every request before it is answered.
    pub fn observe(&self, f: impl Fn(&HttpRequest) + Send + Sync + 'static) {
        *self.observer.lock().unwrap() = Some(Box::new(f));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<Method> {
        self.requests().iter().map(|r| r.method).collect()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
        if let Some(f) = self.observer.lock().unwrap().as_ref() {
            f(&request);
        }
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();

        Box::pin(async move {
            match reply {
                Some(Reply::Response(resp)) => Ok(resp),
                Some(Reply::Fail(reason)) => Err(TransportError(reason)),
                Some(Reply::Hang) => std::future::pending().await,
                None => Err(TransportError("no scripted reply".into())),
            }
        })
    }
}

/// A response carrying `Tus-Resumable: 1.0.0`.
pub fn tus(status: u16) -> HttpResponse {
    HttpResponse::new(status).with_header("Tus-Resumable", "1.0.0")
}

/// Store whose every operation fails.
pub struct BrokenStore;

impl UrlStore for BrokenStore {
    fn get<'a>(&'a self, _key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async { Err(StoreError::Poisoned) })
    }

    fn set<'a>(&'a self, _key: &'a str, _url: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async { Err(StoreError::Poisoned) })
    }

    fn remove<'a>(&'a self, _key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async { Err(StoreError::Poisoned) })
    }
}

/// Counts callback invocations.
#[derive(Default, Clone)]
pub struct Calls {
    pub progress: Arc<Mutex<Vec<(u64, u64)>>>,
    pub chunks: Arc<Mutex<Vec<(u64, u64, u64)>>>,
    pub successes: Arc<Mutex<u32>>,
    pub errors: Arc<Mutex<Vec<String>>>,
}

impl Calls {
    /// Wires every callback of `options` to this recorder.
    pub fn attach(&self, options: tusk_client::UploadOptions) -> tusk_client::UploadOptions {
        let progress = self.progress.clone();
        let chunks = self.chunks.clone();
        let successes = self.successes.clone();
        let errors = self.errors.clone();
        options
            .on_progress(move |sent, total| progress.lock().unwrap().push((sent, total)))
            .on_chunk_complete(move |size, accepted, total| {
                chunks.lock().unwrap().push((size, accepted, total))
            })
            .on_success(move || *successes.lock().unwrap() += 1)
            .on_error(move |e| errors.lock().unwrap().push(e.to_string()))
    }

    pub fn successes(&self) -> u32 {
        *self.successes.lock().unwrap()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<(u64, u64)> {
        self.progress.lock().unwrap().clone()
    }

    pub fn chunks(&self) -> Vec<(u64, u64, u64)> {
        self.chunks.lock().unwrap().clone()
    }
}
