//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::time::Instant;

use crate::error::AppError;
use crate::traits::{Fetcher, LinkReceiver, Notifier, PlayerLauncher};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum FallbackResponse {
    Body(String),
    Error,
}

/// Mock fetcher with per-URL responses and a fallback.
///
/// Responses configured per URL are consumed on first fetch (each lookup
/// task fetches its URL once). Every call is recorded for assertions.
#[derive(Clone)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, Result<String, AppError>>>>,
    fallback: FallbackResponse,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    /// Every URL returns the same body.
    pub fn new(body: &str) -> Self {
        Self {
            pages: Arc::new(Mutex::new(HashMap::new())),
            fallback: FallbackResponse::Body(body.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every fetch fails with a network error.
    pub fn failing() -> Self {
        Self {
            pages: Arc::new(Mutex::new(HashMap::new())),
            fallback: FallbackResponse::Error,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure one response per URL; unconfigured URLs fail.
    pub fn with_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = (S, Result<String, AppError>)>,
        S: Into<String>,
    {
        let map = pages.into_iter().map(|(u, r)| (u.into(), r)).collect();
        Self {
            pages: Arc::new(Mutex::new(map)),
            fallback: FallbackResponse::Error,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// URLs fetched so far, in call order.
    pub fn fetched_urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(response) = self.pages.lock().unwrap().remove(url) {
            return response;
        }
        match &self.fallback {
            FallbackResponse::Body(body) => Ok(body.clone()),
            FallbackResponse::Error => Err(AppError::NetworkError(format!(
                "no mock response for {url}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// MockReceiver
// ---------------------------------------------------------------------------

/// Mock link source backed by an unbounded channel.
///
/// `recv` yields queued links in order and `None` once every sender is
/// dropped, which lets tests drive the daemon's flush-and-exit path
/// deterministically.
pub struct MockReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

impl MockReceiver {
    /// A receiver pre-loaded with links whose source then closes.
    pub fn queued(links: Vec<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        for link in links {
            tx.send(link).expect("receiver alive");
        }
        Self { rx }
    }

    /// A receiver plus a live sender for tests that feed links over time.
    pub fn channel() -> (UnboundedSender<String>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

impl LinkReceiver for MockReceiver {
    async fn recv(&mut self) -> Option<(String, Instant)> {
        self.rx.recv().await.map(|text| (text, Instant::now()))
    }
}

// ---------------------------------------------------------------------------
// MockLauncher
// ---------------------------------------------------------------------------

/// Mock player launcher that records every dispatched playlist.
#[derive(Clone)]
pub struct MockLauncher {
    launches: Arc<Mutex<Vec<Vec<String>>>>,
    attempts: Arc<Mutex<usize>>,
    fail: bool,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self {
            launches: Arc::new(Mutex::new(Vec::new())),
            attempts: Arc::new(Mutex::new(0)),
            fail: false,
        }
    }

    /// Every launch attempt fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Successfully dispatched playlists, in dispatch order.
    pub fn launches(&self) -> Vec<Vec<String>> {
        self.launches.lock().unwrap().clone()
    }

    /// Launch attempts, successful or not.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl Default for MockLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerLauncher for MockLauncher {
    async fn launch(&self, links: &[String]) -> Result<(), AppError> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail {
            return Err(AppError::LaunchError("mock launch failure".into()));
        }
        self.launches.lock().unwrap().push(links.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockNotifier
// ---------------------------------------------------------------------------

/// Mock notifier that records every message.
#[derive(Clone, Default)]
pub struct MockNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
