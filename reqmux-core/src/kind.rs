//! Request lifecycle points.

use std::{fmt, str::FromStr};
use thiserror::Error;

/// One interceptable point in the life of a request.
///
/// The first three kinds are *reply-bearing*: the host waits for a single
/// decision before the request proceeds. The rest are fire-and-forget
/// notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// The request is about to be sent.
    BeforeRequest,
    /// Request headers are about to be sent.
    BeforeSendHeaders,
    /// Response headers have been received.
    HeadersReceived,
    /// Request headers were sent.
    SendHeaders,
    /// The first byte of the response body arrived.
    ResponseStarted,
    /// A server-initiated redirect is about to happen.
    BeforeRedirect,
    /// The request completed.
    Completed,
    /// The request failed.
    ErrorOccurred,
}

impl EventKind {
    /// Every kind, in lifecycle order.
    pub const ALL: [EventKind; 8] = [
        EventKind::BeforeRequest,
        EventKind::BeforeSendHeaders,
        EventKind::HeadersReceived,
        EventKind::SendHeaders,
        EventKind::ResponseStarted,
        EventKind::BeforeRedirect,
        EventKind::Completed,
        EventKind::ErrorOccurred,
    ];

    /// Whether the host expects exactly one reply for this kind.
    pub const fn has_callback(self) -> bool {
        matches!(
            self,
            EventKind::BeforeRequest | EventKind::BeforeSendHeaders | EventKind::HeadersReceived
        )
    }

    /// The host's name for this hook.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::BeforeRequest => "onBeforeRequest",
            EventKind::BeforeSendHeaders => "onBeforeSendHeaders",
            EventKind::HeadersReceived => "onHeadersReceived",
            EventKind::SendHeaders => "onSendHeaders",
            EventKind::ResponseStarted => "onResponseStarted",
            EventKind::BeforeRedirect => "onBeforeRedirect",
            EventKind::Completed => "onCompleted",
            EventKind::ErrorOccurred => "onErrorOccurred",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a name that is not a known lifecycle point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind: {0}")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}
