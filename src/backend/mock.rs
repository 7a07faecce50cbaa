//! Mock backend for testing
//!
//! Plays back a script of canned responses, one per call, then repeats a
//! default response. Records every request it sees and when it saw it.

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;

use crate::error::{Error, Result};

use super::{AgentRequest, ModelBackend};

// ─────────────────────────────────────────────────────────────────
// Scripted Responses
// ─────────────────────────────────────────────────────────────────

/// What the mock does for one call
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this raw content
    Content(String),

    /// Answer with no content
    Empty,

    /// Fail with a retryable transient error
    Transient(String),

    /// Fail with a non-retryable backend rejection
    Rejected(String),

    /// Never answer
    Hang,

    /// Wait, then return this raw content
    Delayed(Duration, String),
}

impl MockResponse {
    pub fn content(raw: impl Into<String>) -> Self {
        MockResponse::Content(raw.into())
    }
}

// ─────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────

/// Scripted implementation of ModelBackend
pub struct MockBackend {
    script: RwLock<VecDeque<MockResponse>>,
    default_response: MockResponse,
    calls: RwLock<Vec<RecordedCall>>,
}

#[derive(Debug, Clone)]
struct RecordedCall {
    request: AgentRequest,
    at: Instant,
}

impl MockBackend {
    /// Create a mock that answers with no content once its script runs out
    pub fn new() -> Self {
        Self::with_default(MockResponse::Empty)
    }

    /// Create a mock that repeats `response` once its script runs out
    pub fn with_default(response: MockResponse) -> Self {
        Self {
            script: RwLock::new(VecDeque::new()),
            default_response: response,
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the contents of a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::with_default(MockResponse::Content(raw.trim().to_string())))
    }

    /// Queue a response for the next unscripted call
    pub fn push(self, response: MockResponse) -> Self {
        self.script.write().push_back(response);
        self
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    /// Requests received, in order
    pub fn requests(&self) -> Vec<AgentRequest> {
        self.calls.read().iter().map(|c| c.request.clone()).collect()
    }

    /// Instants at which each call arrived
    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.read().iter().map(|c| c.at).collect()
    }

    fn next_response(&self) -> MockResponse {
        self.script
            .write()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, request: &AgentRequest) -> Result<Option<String>> {
        self.calls.write().push(RecordedCall {
            request: request.clone(),
            at: Instant::now(),
        });

        match self.next_response() {
            MockResponse::Content(raw) => Ok(Some(raw)),
            MockResponse::Empty => Ok(None),
            MockResponse::Transient(message) => Err(Error::transient(message, Some(503))),
            MockResponse::Rejected(message) => Err(Error::backend(message, Some(400))),
            MockResponse::Hang => {
                std::future::pending::<()>().await;
                Ok(None)
            }
            MockResponse::Delayed(delay, raw) => {
                tokio::time::sleep(delay).await;
                Ok(Some(raw))
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
