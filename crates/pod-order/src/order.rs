//! The order aggregate.
//!
//! State machine:
//!
//! ```text
//!            add/remove/set_destination (clears quote + selection)
//!               ┌──────────────┐
//!               v              │
//!  Open ──quote──> Open+Quote ─┘ ──select──> Open+Quote+Selection ──submit──> Submitted
//! ```
//!
//! `Submitted` is terminal for submission: a second `submit` fails with
//! `AlreadySubmitted` and the stored order id never changes. A failed submit
//! (remote or transport) leaves the order `Open` with its quote and selection
//! intact, so the caller can decide whether to retry.
//!
//! An `Order` is single-owner. The only shared state is the reply cache, which
//! is reached through the owning [`OrderClient`].

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::cache::{CacheTtls, CachedReply, ReplyCache};
use crate::error::{OrderError, Party, PreconditionError, SelectionError, ValidationError};
use crate::party::{Customer, Destination};
use crate::response::{OrderId, OrderStatus};
use crate::shipping::{QuoteToken, ShippingOption};
use crate::transport::{
    Mode, OutboundRequest, QuoteRequest, RemoteError, Reply, StatusRequest, SubmitRequest,
    Transport,
};

static PRODUCT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("invalid product id regex pattern"));

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Provider catalogue id, e.g. `PX00ZOV6J0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::new("product_id", "is required"));
        }
        if !PRODUCT_ID_PATTERN.is_match(&raw) {
            return Err(ValidationError::new(
                "product_id",
                "must contain only letters, digits and underscores",
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One product and how many copies of it. Quantity is always >= 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLine {
    product_id: ProductId,
    quantity: u32,
}

impl ProductLine {
    pub fn new(product_id: ProductId, quantity: u32) -> Result<Self, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::new("quantity", "must be a positive integer"));
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Factory for orders that share one transport and one reply cache.
#[derive(Clone)]
pub struct OrderClient {
    transport: Arc<dyn Transport>,
    cache: Arc<ReplyCache>,
    ttls: CacheTtls,
}

impl OrderClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: Arc::new(ReplyCache::new()),
            ttls: CacheTtls::default(),
        }
    }

    /// Share `cache` with other clients in the process.
    pub fn with_cache(mut self, cache: Arc<ReplyCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_ttls(mut self, ttls: CacheTtls) -> Self {
        self.ttls = ttls;
        self
    }

    pub fn cache(&self) -> &Arc<ReplyCache> {
        &self.cache
    }

    pub fn ttls(&self) -> CacheTtls {
        self.ttls
    }

    pub fn new_order(&self) -> Order {
        Order {
            transport: Arc::clone(&self.transport),
            cache: Arc::clone(&self.cache),
            ttls: self.ttls,
            destination: None,
            customer: None,
            products: Vec::new(),
            shipping_options: None,
            selected: None,
            state: SubmissionState::Open,
        }
    }
}

impl fmt::Debug for OrderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderClient")
            .field("transport", &self.transport.name())
            .field("cache", &self.cache)
            .field("ttls", &self.ttls)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Open,
    Submitted { order_id: OrderId },
}

pub struct Order {
    transport: Arc<dyn Transport>,
    cache: Arc<ReplyCache>,
    ttls: CacheTtls,

    destination: Option<Destination>,
    customer: Option<Customer>,
    /// Unique by product id, in first-added order.
    products: Vec<ProductLine>,
    /// `Some` only after a successful quote for the current destination + products.
    shipping_options: Option<Vec<ShippingOption>>,
    /// Index into `shipping_options`.
    selected: Option<usize>,
    state: SubmissionState,
}

impl Order {
    // -- builders ------------------------------------------------------------

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.set_destination(destination);
        self
    }

    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.set_customer(customer);
        self
    }

    // -- mutators ------------------------------------------------------------

    /// Adds `quantity` copies of `product_id`, merging into an existing line.
    pub fn add_product(&mut self, product_id: &str, quantity: u32) -> Result<&mut Self, OrderError> {
        let id = ProductId::new(product_id)?;
        if quantity == 0 {
            return Err(ValidationError::new("quantity", "must be a positive integer").into());
        }

        match self.products.iter_mut().find(|l| l.product_id == id) {
            Some(line) => {
                line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                    ValidationError::new("quantity", format!("too many copies of {id}"))
                })?;
            }
            None => self.products.push(ProductLine::new(id, quantity)?),
        }

        self.invalidate_quote();
        Ok(self)
    }

    /// Removes `quantity` copies of `product_id`; `None` removes the whole line.
    /// Unknown ids are ignored.
    pub fn remove_product(&mut self, product_id: &str, quantity: Option<u32>) -> &mut Self {
        if let Some(pos) = self.products.iter().position(|l| l.product_id.as_str() == product_id) {
            let line = &mut self.products[pos];
            match quantity {
                Some(n) if n < line.quantity => line.quantity -= n,
                _ => {
                    self.products.remove(pos);
                }
            }
        }
        self.invalidate_quote();
        self
    }

    pub fn set_destination(&mut self, destination: Destination) -> &mut Self {
        self.destination = Some(destination);
        self.invalidate_quote();
        self
    }

    /// The customer is not part of a quote, so the live quote survives.
    pub fn set_customer(&mut self, customer: Customer) -> &mut Self {
        self.customer = Some(customer);
        self
    }

    fn invalidate_quote(&mut self) {
        self.shipping_options = None;
        self.selected = None;
    }

    // -- quoting -------------------------------------------------------------

    /// Fetches (or reads from cache) the shipping options for the current
    /// destination and products, and makes them the live quote.
    ///
    /// With `dry_run` the request is built and checked, then an empty list is
    /// returned without touching the network, the cache, or the live quote.
    pub fn quote_shipping_options(&mut self, dry_run: bool) -> Result<Vec<ShippingOption>, OrderError> {
        let destination = self
            .destination
            .clone()
            .ok_or(PreconditionError::NoDestination)?;
        if self.product_count() == 0 {
            return Err(PreconditionError::NoProducts.into());
        }

        let request = OutboundRequest::Quote(QuoteRequest {
            destination,
            products: self.sorted_products(),
        });
        let wire = self.transport.build_request(&request)?;

        if dry_run {
            tracing::debug!(request = wire.canonical(), "dry run: shipping quote not sent");
            return Ok(Vec::new());
        }

        let key = wire.fingerprint();
        let options = match self.cache.get(&key) {
            Some(CachedReply::Quote(options)) => {
                tracing::debug!(key = key.short(), options = options.len(), "shipping quote cache hit");
                options
            }
            _ => {
                tracing::debug!(key = key.short(), "shipping quote cache miss");
                let options = match self.transport.exchange(&wire)? {
                    Reply::Quote(options) => options,
                    other => return Err(unexpected_reply("shipping quote", &other).into()),
                };
                self.cache.put(
                    key,
                    CachedReply::Quote(options.clone()),
                    self.ttls.shipping_quote,
                );
                tracing::info!(options = options.len(), "shipping quote received");
                options
            }
        };

        let token = QuoteToken::next();
        let live: Vec<ShippingOption> = options.iter().map(|o| o.stamped(token)).collect();
        self.shipping_options = Some(live.clone());
        self.selected = None;
        Ok(live)
    }

    /// Picks `option`, which must be one of the options returned by the most
    /// recent quote on this order.
    pub fn select_shipping_option(&mut self, option: &ShippingOption) -> Result<(), OrderError> {
        let live = match &self.shipping_options {
            Some(live) if !live.is_empty() => live,
            _ => return Err(SelectionError::NoLiveQuote.into()),
        };
        let idx = live.iter().position(|o| o == option).ok_or_else(|| {
            SelectionError::NotFromLiveQuote {
                name: option.name().to_string(),
            }
        })?;
        self.selected = Some(idx);
        Ok(())
    }

    // -- submission ----------------------------------------------------------

    /// Sends the order. `dry_run` submits in the provider's test mode.
    ///
    /// Not retried on failure: the provider does not deduplicate orders.
    pub fn submit(&mut self, dry_run: bool) -> Result<OrderId, OrderError> {
        if let SubmissionState::Submitted { .. } = self.state {
            return Err(PreconditionError::AlreadySubmitted.into());
        }
        let destination = self
            .destination
            .clone()
            .ok_or(PreconditionError::MissingParty(Party::Destination))?;
        let customer = self
            .customer
            .clone()
            .ok_or(PreconditionError::MissingParty(Party::Customer))?;
        let option = self
            .selected_shipping_option()
            .ok_or(PreconditionError::NoShippingOptionSelected)?;
        if self.product_count() == 0 {
            return Err(PreconditionError::NoProducts.into());
        }

        let mode = Mode::from_dry_run(dry_run);
        let request = OutboundRequest::Submit(SubmitRequest {
            mode,
            customer,
            destination,
            shipping_description: option.name().to_string(),
            products: self.sorted_products(),
        });
        let wire = self.transport.build_request(&request)?;

        let order_id = match self.transport.exchange(&wire)? {
            Reply::Submitted(confirmation) => confirmation.into_order_id(),
            other => return Err(unexpected_reply("order confirmation", &other).into()),
        };

        tracing::info!(order_id = %order_id, mode = mode.as_str(), "order submitted");
        self.state = SubmissionState::Submitted {
            order_id: order_id.clone(),
        };
        Ok(order_id)
    }

    /// Current provider status. Cached per order id for the status TTL.
    pub fn order_status(&self) -> Result<OrderStatus, OrderError> {
        let order_id = self.order_id()?.clone();
        let wire = self
            .transport
            .build_request(&OutboundRequest::Status(StatusRequest { order_id }))?;

        let key = wire.fingerprint();
        if let Some(CachedReply::Status(status)) = self.cache.get(&key) {
            tracing::debug!(key = key.short(), "order status cache hit");
            return Ok(status);
        }

        let status = match self.transport.exchange(&wire)? {
            Reply::Status(status) => status,
            other => return Err(unexpected_reply("order status", &other).into()),
        };
        self.cache.put(
            key,
            CachedReply::Status(status.clone()),
            self.ttls.order_status,
        );
        Ok(status)
    }

    // -- accessors -----------------------------------------------------------

    pub fn product_count(&self) -> u64 {
        self.products.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn products(&self) -> &[ProductLine] {
        &self.products
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    /// The live quote, if any.
    pub fn shipping_options(&self) -> Option<&[ShippingOption]> {
        self.shipping_options.as_deref()
    }

    pub fn selected_shipping_option(&self) -> Option<&ShippingOption> {
        let idx = self.selected?;
        self.shipping_options.as_ref()?.get(idx)
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.state, SubmissionState::Submitted { .. })
    }

    pub fn order_id(&self) -> Result<&OrderId, OrderError> {
        match &self.state {
            SubmissionState::Submitted { order_id } => Ok(order_id),
            SubmissionState::Open => Err(PreconditionError::NotYetSubmitted.into()),
        }
    }

    fn sorted_products(&self) -> Vec<ProductLine> {
        let mut lines = self.products.clone();
        lines.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        lines
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("transport", &self.transport.name())
            .field("destination", &self.destination)
            .field("customer", &self.customer)
            .field("products", &self.products)
            .field("shipping_options", &self.shipping_options)
            .field("selected", &self.selected)
            .field("state", &self.state)
            .finish()
    }
}

fn unexpected_reply(expected: &str, got: &Reply) -> RemoteError {
    RemoteError::Malformed(format!("expected {expected}, got {}", got.describe()))
}
