//! Quoted shipping methods.
//!
//! A [`ShippingOption`] is built from a provider reply (or a test fixture) and
//! never changes afterwards. Input comes from a third party, so it is validated
//! as strictly as user input.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ValidationError;

pub const MAX_OPTION_NAME_LEN: usize = 128;

/// Identifies the quote an option was handed out with.
///
/// Every time an [`crate::Order`] installs a quote (fresh from the network or
/// from the cache) its options are restamped with a new token. Equality
/// includes the token, so an option kept from an earlier quote no longer
/// matches the live list even when its fields are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct QuoteToken(u64);

impl QuoteToken {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        QuoteToken(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One shipping method from a quote.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingOption {
    name: String,
    delivery_estimate: String,
    price: f64,
    origin_index: usize,
    quote: QuoteToken,
}

impl ShippingOption {
    /// `origin_index` is the option's position in the reply it came from.
    pub fn new(
        name: impl Into<String>,
        delivery_estimate: impl Into<String>,
        price: f64,
        origin_index: usize,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let delivery_estimate = delivery_estimate.into();

        if name.trim().is_empty() {
            return Err(ValidationError::new("name", "is required"));
        }
        if name.chars().count() > MAX_OPTION_NAME_LEN {
            return Err(ValidationError::new(
                "name",
                format!("must be at most {MAX_OPTION_NAME_LEN} characters"),
            ));
        }
        if delivery_estimate.trim().is_empty() {
            return Err(ValidationError::new("delivery_estimate", "is required"));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(ValidationError::new(
                "price",
                format!("must be a non-negative number, got {price}"),
            ));
        }

        Ok(Self {
            name,
            delivery_estimate,
            price,
            origin_index,
            quote: QuoteToken::default(),
        })
    }

    /// Carrier / method description, e.g. `"USPS First Class Mail"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-text estimate, e.g. `"2-5 business days"`.
    pub fn delivery_estimate(&self) -> &str {
        &self.delivery_estimate
    }

    /// Price in USD.
    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn origin_index(&self) -> usize {
        self.origin_index
    }

    pub(crate) fn stamped(&self, quote: QuoteToken) -> Self {
        Self {
            quote,
            ..self.clone()
        }
    }
}
