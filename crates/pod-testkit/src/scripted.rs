use std::collections::VecDeque;
use std::sync::Mutex;

use pod_http::{Credentials, HttpQueryTransport, HttpSettings};
use pod_order::{
    OutboundRequest, RawReply, RemoteError, Reply, RequestKind, Transport, TransportError,
    WireRequest,
};

use crate::fixtures::{TEST_PASSWORD, TEST_USER_ID};

/// Transport used ONLY by tests.
///
/// Requests are encoded and replies parsed by the production
/// `HttpQueryTransport`; `send` answers from a scripted queue instead of the
/// network and records every request it was given.
pub struct ScriptedTransport {
    codec: HttpQueryTransport,
    script: Mutex<VecDeque<Result<String, TransportError>>>,
    sent: Mutex<Vec<WireRequest>>,
}

impl ScriptedTransport {
    pub fn new(credentials: Option<Credentials>) -> Result<Self, TransportError> {
        Ok(Self {
            codec: HttpQueryTransport::new(HttpSettings::default(), credentials)?,
            script: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// With the fixture account, so orders and status queries can be built.
    pub fn with_test_account() -> Result<Self, TransportError> {
        Self::new(Some(Credentials::new(TEST_USER_ID, TEST_PASSWORD)))
    }

    /// Queues a reply body for the next `send`.
    pub fn push_reply(&self, body: impl Into<String>) -> &Self {
        self.lock_script().push_back(Ok(body.into()));
        self
    }

    /// Queues a transport failure for the next `send`.
    pub fn push_failure(&self, err: TransportError) -> &Self {
        self.lock_script().push_back(Err(err));
        self
    }

    pub fn sent_count(&self) -> usize {
        self.lock_sent().len()
    }

    pub fn sent(&self) -> Vec<WireRequest> {
        self.lock_sent().clone()
    }

    pub fn sent_kinds(&self) -> Vec<RequestKind> {
        self.lock_sent().iter().map(WireRequest::kind).collect()
    }

    pub fn last_sent(&self) -> Option<WireRequest> {
        self.lock_sent().last().cloned()
    }

    /// Replies queued but never consumed.
    pub fn pending(&self) -> usize {
        self.lock_script().len()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, TransportError>>> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_sent(&self) -> std::sync::MutexGuard<'_, Vec<WireRequest>> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Transport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn build_request(&self, req: &OutboundRequest) -> Result<WireRequest, TransportError> {
        self.codec.build_request(req)
    }

    fn send(&self, req: &WireRequest) -> Result<RawReply, TransportError> {
        self.lock_sent().push(req.clone());
        let next = self.lock_script().pop_front();
        match next {
            Some(Ok(body)) => Ok(RawReply::new(body)),
            Some(Err(err)) => Err(err),
            None => Err(TransportError::Unavailable(format!(
                "no scripted reply for {} request",
                req.kind()
            ))),
        }
    }

    fn parse_reply(&self, kind: RequestKind, raw: &RawReply) -> Result<Reply, RemoteError> {
        self.codec.parse_reply(kind, raw)
    }
}
