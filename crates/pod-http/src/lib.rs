//! pod-http
//!
//! Query-string-over-HTTP(S) implementation of `pod_order::Transport`,
//! plus the best-effort postal code geocoder.
//!
//! Blocking reqwest throughout; calls made from a multi-thread tokio runtime
//! are moved off the async worker with `block_in_place`.

mod blocking;
mod geocode;
mod query;
mod reply;
mod transport;

pub use geocode::{GeocodeResolver, GeocodeSettings, DEFAULT_GEOCODE_ENDPOINT};
pub use query::Credentials;
pub use reply::parse as parse_reply;
pub use transport::{
    HttpQueryTransport, HttpSettings, Scheme, DEFAULT_ENDPOINT, DEFAULT_MAX_QUERY_LEN,
};
