#![allow(dead_code)]

use parking_lot::Mutex;
use reqmux::{Reply, ReplyFn, RequestDetails, WebRequest, testing::MockHost};
use std::sync::Arc;

// ============================================================================
// Fixtures
// ============================================================================

pub fn engine() -> (WebRequest<MockHost>, MockHost) {
    let host = MockHost::new();
    (WebRequest::new(host.clone()), host)
}

pub fn details(url: &str) -> RequestDetails {
    RequestDetails::new(url)
}

/// The `result` field listeners in these tests reply with.
pub fn result_of(reply: &Reply) -> Option<&str> {
    reply.get("result").and_then(|v| v.as_str())
}

pub fn tagged(result: &str) -> Reply {
    Reply::neutral().with("result", result)
}

// ============================================================================
// Reply Capture
// ============================================================================

/// A reply sink for calling `dispatch` directly.
#[derive(Clone, Default)]
pub struct Capture {
    replies: Arc<Mutex<Vec<Reply>>>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> Option<ReplyFn> {
        let replies = self.replies.clone();
        Some(Box::new(move |reply: Reply| replies.lock().push(reply)))
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().clone()
    }
}
