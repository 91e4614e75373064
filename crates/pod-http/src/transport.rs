use std::fmt;
use std::time::Duration;

use url::Url;

use pod_order::{
    OutboundRequest, RawReply, RemoteError, Reply, RequestKind, Transport, TransportError,
    WireRequest,
};

use crate::blocking::run_blocking;
use crate::query::{self, Credentials};
use crate::reply;

pub const DEFAULT_ENDPOINT: &str = "https://kunaki.com/HTTPService.ASP";
pub const DEFAULT_MAX_QUERY_LEN: usize = 1024;

/// URL scheme used for the query-string transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub endpoint: String,
    pub scheme: Scheme,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
    pub max_query_len: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            scheme: Scheme::Https,
            connect_timeout: Duration::from_secs(5),
            total_timeout: Duration::from_secs(8),
            max_query_len: DEFAULT_MAX_QUERY_LEN,
        }
    }
}

/// Query-string-over-HTTP(S) transport.
///
/// Every call is a single blocking GET bounded by the configured connect and
/// total timeouts. Nothing is retried here.
pub struct HttpQueryTransport {
    endpoint: String,
    credentials: Option<Credentials>,
    max_query_len: usize,
    client: reqwest::blocking::Client,
}

impl HttpQueryTransport {
    /// `credentials` may be `None` for a quote-only client; orders and status
    /// queries then fail at build time.
    pub fn new(settings: HttpSettings, credentials: Option<Credentials>) -> Result<Self, TransportError> {
        let endpoint = endpoint_url(&settings.endpoint, settings.scheme)?;
        let client = run_blocking(|| {
            reqwest::blocking::Client::builder()
                .connect_timeout(settings.connect_timeout)
                .timeout(settings.total_timeout)
                .build()
        })?
        .map_err(|e| TransportError::Unavailable(format!("http client init failed: {e}")))?;

        Ok(Self {
            endpoint,
            credentials,
            max_query_len: settings.max_query_len,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }
}

impl fmt::Debug for HttpQueryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpQueryTransport")
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .field("max_query_len", &self.max_query_len)
            .finish()
    }
}

/// Applies `scheme` to `raw` and drops any query or fragment.
pub(crate) fn endpoint_url(raw: &str, scheme: Scheme) -> Result<String, TransportError> {
    let mut url = Url::parse(raw)
        .map_err(|e| TransportError::Unavailable(format!("invalid endpoint '{raw}': {e}")))?;
    url.set_scheme(scheme.as_str()).map_err(|()| {
        TransportError::Unavailable(format!("endpoint '{raw}' cannot use scheme {}", scheme.as_str()))
    })?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

/// Maps a reqwest failure without ever carrying the request URL along.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    let err = err.without_url();
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if let Some(status) = err.status() {
        TransportError::Status(status.as_u16())
    } else {
        TransportError::Io(err.to_string())
    }
}

/// One blocking GET of `target`; non-2xx is an error.
pub(crate) fn get_text(client: &reqwest::blocking::Client, target: &str) -> Result<String, TransportError> {
    run_blocking(|| {
        let resp = client.get(target).send().map_err(map_reqwest_error)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        resp.text().map_err(map_reqwest_error)
    })?
}

impl Transport for HttpQueryTransport {
    fn name(&self) -> &'static str {
        "http-query"
    }

    fn build_request(&self, req: &OutboundRequest) -> Result<WireRequest, TransportError> {
        query::encode(
            &self.endpoint,
            req,
            self.credentials.as_ref(),
            self.max_query_len,
        )
    }

    fn send(&self, req: &WireRequest) -> Result<RawReply, TransportError> {
        let body = get_text(&self.client, req.target())?;
        tracing::debug!(kind = %req.kind(), bytes = body.len(), "provider reply received");
        Ok(RawReply::new(body))
    }

    fn parse_reply(&self, kind: RequestKind, raw: &RawReply) -> Result<Reply, RemoteError> {
        reply::parse(kind, raw.body())
    }
}
