//! Query-string encoding of outbound requests.
//!
//! Field order is fixed per request kind; the provider matches parameters by
//! position for repeated `ProductId`/`Quantity` pairs. Every value is
//! form-encoded, so spaces become `+`.
//!
//! Two strings are produced side by side: the wire query (with credentials)
//! and the canonical query (without). Only the canonical one is ever hashed
//! or logged. In place of the credentials the canonical query carries an
//! `Account` digest, so replies cached for one account never serve another.

use url::form_urlencoded::Serializer;

use pod_order::{
    Customer, Destination, Fingerprint, OutboundRequest, ProductLine, QuoteRequest, StatusRequest,
    SubmitRequest, TransportError, WireRequest,
};

/// Account identity sent with orders and status queries.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user_id: String,
    password: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
        }
    }

    /// One-way digest of the account. Safe to hash, log and key caches by.
    pub fn account_tag(&self) -> Fingerprint {
        let mut material = String::with_capacity(self.user_id.len() + self.password.len() + 13);
        material.push_str("pod-account\0");
        material.push_str(&self.user_id);
        material.push('\0');
        material.push_str(&self.password);
        Fingerprint::of(material.as_bytes())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &"<REDACTED>")
            .field("password", &"<REDACTED>")
            .finish()
    }
}

struct QueryBuilder {
    wire: Serializer<'static, String>,
    canonical: Serializer<'static, String>,
}

impl QueryBuilder {
    fn new(request_type: &str) -> Self {
        let mut b = Self {
            wire: Serializer::new(String::new()),
            canonical: Serializer::new(String::new()),
        };
        b.param("RequestType", request_type);
        b
    }

    fn param(&mut self, key: &str, value: &str) -> &mut Self {
        self.wire.append_pair(key, value);
        self.canonical.append_pair(key, value);
        self
    }

    /// Goes on the wire only.
    fn secret(&mut self, key: &str, value: &str) -> &mut Self {
        self.wire.append_pair(key, value);
        self
    }

    /// Goes into the canonical form only.
    fn canonical_only(&mut self, key: &str, value: &str) -> &mut Self {
        self.canonical.append_pair(key, value);
        self
    }

    fn destination(&mut self, d: &Destination) -> &mut Self {
        self.param("State_Province", d.state_province())
            .param("PostalCode", d.postal_code())
            .param("Country", d.country())
    }

    fn products(&mut self, lines: &[ProductLine]) -> &mut Self {
        for line in lines {
            self.param("ProductId", line.product_id().as_str())
                .param("Quantity", &line.quantity().to_string());
        }
        self
    }

    fn credentials(&mut self, creds: &Credentials) -> &mut Self {
        self.secret("UserId", &creds.user_id)
            .secret("Password", &creds.password)
            .canonical_only("Account", creds.account_tag().as_str())
    }

    fn customer(&mut self, c: &Customer) -> &mut Self {
        self.param("Name", c.name())
            .param("Company", c.company().unwrap_or(""));
        // The provider takes two address lines; a third is dropped.
        for (i, line) in c.address().iter().take(2).enumerate() {
            if i > 0 && line.is_empty() {
                continue;
            }
            self.param(&format!("Address{}", i + 1), line);
        }
        self.param("City", c.city())
    }

    fn finish(mut self, endpoint: &str) -> (String, String) {
        self.param("ResponseType", "xml");
        (
            format!("{endpoint}?{}", self.wire.finish()),
            format!("{endpoint}?{}", self.canonical.finish()),
        )
    }
}

/// Encodes `req` against `endpoint`, refusing anything longer than `max_len`.
pub(crate) fn encode(
    endpoint: &str,
    req: &OutboundRequest,
    credentials: Option<&Credentials>,
    max_len: usize,
) -> Result<WireRequest, TransportError> {
    let builder = match req {
        OutboundRequest::Quote(q) => quote_query(q),
        OutboundRequest::Submit(s) => submit_query(s, require(credentials)?),
        OutboundRequest::Status(s) => status_query(s, require(credentials)?),
    };
    let (target, canonical) = builder.finish(endpoint);

    if target.len() > max_len {
        return Err(TransportError::RequestTooLong {
            len: target.len(),
            limit: max_len,
        });
    }
    Ok(WireRequest::new(req.kind(), target, canonical))
}

fn require(credentials: Option<&Credentials>) -> Result<&Credentials, TransportError> {
    credentials.ok_or_else(|| {
        TransportError::Unavailable("provider credentials are not configured".to_string())
    })
}

fn quote_query(q: &QuoteRequest) -> QueryBuilder {
    let mut b = QueryBuilder::new("ShippingOptions");
    b.destination(&q.destination).products(&q.products);
    b
}

fn submit_query(s: &SubmitRequest, creds: &Credentials) -> QueryBuilder {
    let mut b = QueryBuilder::new("Order");
    b.credentials(creds)
        .param("Mode", s.mode.as_str())
        .customer(&s.customer)
        .destination(&s.destination)
        .param("ShippingDescription", &s.shipping_description)
        .products(&s.products);
    b
}

fn status_query(s: &StatusRequest, creds: &Credentials) -> QueryBuilder {
    let mut b = QueryBuilder::new("OrderStatus");
    b.credentials(creds).param("OrderId", s.order_id.as_str());
    b
}
