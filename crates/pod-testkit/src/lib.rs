//! Test support for the order workflow: a scripted transport, canned
//! provider replies, and client builders with a controllable clock.

use std::sync::Arc;

use pod_order::{CacheTtls, ManualClock, OrderClient, ReplyCache, Transport};

pub mod fixtures;
mod scripted;

pub use scripted::ScriptedTransport;

/// Client over `transport` whose cache runs on `clock`.
pub fn client_with_clock(transport: Arc<dyn Transport>, clock: Arc<ManualClock>) -> OrderClient {
    OrderClient::new(transport)
        .with_cache(Arc::new(ReplyCache::with_clock(clock)))
        .with_ttls(CacheTtls::default())
}

/// Scripted transport with the fixture account, plus a client and clock over it.
pub fn scripted_client() -> (Arc<ScriptedTransport>, OrderClient, Arc<ManualClock>) {
    let transport = Arc::new(
        ScriptedTransport::with_test_account().expect("scripted transport builds without network"),
    );
    let clock = Arc::new(ManualClock::new());
    let client = client_with_clock(transport.clone(), clock.clone());
    (transport, client, clock)
}
