//! Scripted fetcher for exercising strategies without a network.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::fetch::{FetchError, Fetcher, Request, Response, ResponseSource};

#[derive(Clone)]
pub enum Scripted {
    Respond { status: StatusCode, content_type: &'static str, body: String },
    Fail(FetchError),
    Hang,
}

impl Scripted {
    pub fn ok(content_type: &'static str, body: &str) -> Self {
        Scripted::Respond { status: StatusCode::OK, content_type, body: body.to_string() }
    }

    pub fn status(status: StatusCode) -> Self {
        Scripted::Respond { status, content_type: "text/plain", body: String::new() }
    }
}

/// Answers by exact URL; unknown URLs fail with a network error.
#[derive(Default)]
pub struct StubFetcher {
    routes: Mutex<HashMap<String, Scripted>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, scripted: Scripted) -> Self {
        self.set(url, scripted);
        self
    }

    pub fn set(&self, url: &str, scripted: Scripted) {
        self.routes.lock().unwrap().insert(url.to_string(), scripted);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.routes.lock().unwrap().get(request.url.as_str()).cloned();
        match scripted {
            Some(Scripted::Respond { status, content_type, body }) => {
                let mut response = Response::synthetic(status, content_type, body);
                response.source = ResponseSource::Network;
                Ok(response)
            }
            Some(Scripted::Fail(err)) => Err(err),
            Some(Scripted::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(FetchError::Timeout)
            }
            None => Err(FetchError::Network(format!("no route to {}", request.url))),
        }
    }
}

/// Poll until `check` holds, yielding to background tasks in between.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
