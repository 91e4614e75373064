//! pod-order
//!
//! Client-side order workflow for a print-on-demand provider:
//! - `Order` aggregate: products, destination, customer, live shipping quote,
//!   selection, one-way submission
//! - value objects (`Destination`, `Customer`, `ShippingOption`, `OrderId`,
//!   `OrderStatus`) validated on construction
//! - `Transport` trait: the only path to the provider; wire formats live in
//!   other crates
//! - `TtlCache` keyed by credential-free request fingerprints
//!
//! No network code lives here. `pod-http` supplies the production transport.

mod cache;
mod error;
mod order;
mod party;
mod response;
mod shipping;
mod transport;

pub use cache::{
    CacheTtls, CachedReply, Clock, Fingerprint, ManualClock, ReplyCache, SystemClock, TtlCache,
};
pub use error::{OrderError, Party, PreconditionError, SelectionError, ValidationError};
pub use order::{Order, OrderClient, ProductId, ProductLine, SubmissionState};
pub use party::{Customer, Destination, MAX_ADDRESS_LINES, MAX_ADDRESS_LINE_LEN};
pub use response::{OrderId, OrderStatus, SubmitConfirmation};
pub use shipping::{ShippingOption, MAX_OPTION_NAME_LEN};
pub use transport::{
    Mode, OutboundRequest, QuoteRequest, RawReply, RemoteError, Reply, RequestKind,
    StatusRequest, SubmitRequest, Transport, TransportError, WireError, WireRequest,
};
