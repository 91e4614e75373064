//! Transport boundary between the order workflow and the provider's wire format.
//!
//! The order aggregate never formats a query or parses a reply itself. It hands
//! an [`OutboundRequest`] snapshot to a [`Transport`], which:
//!
//! 1. `build_request`: serializes the snapshot into a [`WireRequest`]
//! 2. `send`:          performs exactly one blocking network exchange
//! 3. `parse_reply`:   turns the raw body into a typed [`Reply`] or a [`RemoteError`]
//!
//! Implementations hold their own endpoint and credentials (passed in at
//! construction). Credentials appear only in [`WireRequest::target`]; the
//! canonical form used for cache fingerprints and logs never carries them.

use std::fmt;

use thiserror::Error;

use crate::cache::Fingerprint;
use crate::order::ProductLine;
use crate::party::{Customer, Destination};
use crate::response::{OrderId, OrderStatus, SubmitConfirmation};
use crate::shipping::ShippingOption;

// ---------------------------------------------------------------------------
// Request kinds and snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    ShippingOptions,
    Order,
    OrderStatus,
}

impl RequestKind {
    /// Value of the `RequestType` wire field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::ShippingOptions => "ShippingOptions",
            RequestKind::Order => "Order",
            RequestKind::OrderStatus => "OrderStatus",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Submission mode. `Test` orders are validated by the provider but never shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Test,
    Live,
}

impl Mode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            Mode::Test
        } else {
            Mode::Live
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Test => "Test",
            Mode::Live => "Live",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub destination: Destination,
    /// Sorted by product id.
    pub products: Vec<ProductLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub mode: Mode,
    pub customer: Customer,
    pub destination: Destination,
    /// Name of the selected shipping option.
    pub shipping_description: String,
    /// Sorted by product id.
    pub products: Vec<ProductLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRequest {
    pub order_id: OrderId,
}

/// Snapshot of the order state a single wire request needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundRequest {
    Quote(QuoteRequest),
    Submit(SubmitRequest),
    Status(StatusRequest),
}

impl OutboundRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            OutboundRequest::Quote(_) => RequestKind::ShippingOptions,
            OutboundRequest::Submit(_) => RequestKind::Order,
            OutboundRequest::Status(_) => RequestKind::OrderStatus,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire request / reply
// ---------------------------------------------------------------------------

/// A serialized request, ready for [`Transport::send`].
///
/// `target` is what goes on the wire and may embed credentials. `canonical`
/// is the same request with credentials left out; it is the only form that
/// may be logged or fingerprinted. `Debug` prints `canonical` only.
#[derive(Clone, PartialEq, Eq)]
pub struct WireRequest {
    kind: RequestKind,
    target: String,
    canonical: String,
}

impl WireRequest {
    pub fn new(kind: RequestKind, target: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            canonical: canonical.into(),
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Full wire form. Never log this.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self.canonical.as_bytes())
    }
}

impl fmt::Debug for WireRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireRequest")
            .field("kind", &self.kind)
            .field("target", &"<REDACTED>")
            .field("canonical", &self.canonical)
            .finish()
    }
}

/// Unparsed reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    body: String,
}

impl RawReply {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// A parsed, successful reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Quote(Vec<ShippingOption>),
    Submitted(SubmitConfirmation),
    Status(OrderStatus),
}

impl Reply {
    pub fn describe(&self) -> &'static str {
        match self {
            Reply::Quote(_) => "shipping quote",
            Reply::Submitted(_) => "order confirmation",
            Reply::Status(_) => "order status",
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The provider answered, but with a failure or with something unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Non-zero `ErrorCode`; `message` is the provider's `ErrorText` verbatim.
    #[error("provider error code={code}: {message}")]
    Api { code: i64, message: String },
    #[error("malformed provider reply: {0}")]
    Malformed(String),
}

/// The exchange itself failed. Messages never contain the request URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport error: request timed out")]
    Timeout,
    #[error("transport error: connect failed: {0}")]
    Connect(String),
    #[error("transport error: http status {0}")]
    Status(u16),
    #[error("transport error: request is {len} characters, limit is {limit}")]
    RequestTooLong { len: usize, limit: usize },
    #[error("transport error: {0}")]
    Unavailable(String),
    #[error("transport error: {0}")]
    Io(String),
}

/// Either failure surface of a full build/send/parse exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// Wire-format strategy for talking to the provider.
///
/// Object-safe so an order can hold `Arc<dyn Transport>`; `Send + Sync` so one
/// transport can serve orders on several threads.
pub trait Transport: Send + Sync {
    /// Short identifier for logs (e.g. `"http-query"`).
    fn name(&self) -> &'static str;

    fn build_request(&self, req: &OutboundRequest) -> Result<WireRequest, TransportError>;

    /// One blocking exchange, bounded by the transport's timeouts.
    fn send(&self, req: &WireRequest) -> Result<RawReply, TransportError>;

    fn parse_reply(&self, kind: RequestKind, raw: &RawReply) -> Result<Reply, RemoteError>;

    /// `send` then `parse_reply`.
    fn exchange(&self, req: &WireRequest) -> Result<Reply, WireError> {
        tracing::debug!(
            transport = self.name(),
            kind = %req.kind(),
            request = req.canonical(),
            "sending provider request"
        );
        let raw = self.send(req)?;
        Ok(self.parse_reply(req.kind(), &raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_request_debug_redacts_target() {
        let req = WireRequest::new(
            RequestKind::OrderStatus,
            "https://x/?UserId=a%40b&Password=hunter2",
            "https://x/?RequestType=OrderStatus&OrderId=1",
        );
        let dbg = format!("{req:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<REDACTED>"));
        assert!(dbg.contains("OrderId=1"));
    }

    #[test]
    fn fingerprint_ignores_target() {
        let a = WireRequest::new(RequestKind::OrderStatus, "secret-a", "same");
        let b = WireRequest::new(RequestKind::OrderStatus, "secret-b", "same");
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn mode_from_dry_run() {
        assert_eq!(Mode::from_dry_run(true), Mode::Test);
        assert_eq!(Mode::from_dry_run(false).as_str(), "Live");
    }

    #[test]
    fn remote_error_display() {
        let err = RemoteError::Api {
            code: 500,
            message: "Invalid ProductId".into(),
        };
        assert_eq!(err.to_string(), "provider error code=500: Invalid ProductId");
    }
}
