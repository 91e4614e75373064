//! Postal code -> `Destination` lookup against a Google-Maps-compatible
//! geocoding endpoint.
//!
//! Best effort: any failure (network, unexpected JSON, values that do not
//! validate) yields `None`. Raw reply bodies are cached by the fingerprint of
//! the lookup URL.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use url::form_urlencoded;

use pod_order::{Destination, Fingerprint, TransportError, TtlCache};

use crate::blocking::run_blocking;
use crate::transport::get_text;

pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeSettings {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for GeocodeSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODE_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(5),
            total_timeout: Duration::from_secs(8),
            cache_ttl: Duration::from_secs(1440 * 60),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeDoc {
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    short_name: String,
    types: Vec<String>,
}

impl AddressComponent {
    fn is(&self, ty: &str) -> bool {
        self.types.iter().any(|t| t == ty)
    }
}

pub struct GeocodeResolver {
    endpoint: String,
    ttl: Duration,
    cache: Arc<TtlCache<String>>,
    client: reqwest::blocking::Client,
}

impl GeocodeResolver {
    pub fn new(settings: GeocodeSettings) -> Result<Self, TransportError> {
        let client = run_blocking(|| {
            reqwest::blocking::Client::builder()
                .connect_timeout(settings.connect_timeout)
                .timeout(settings.total_timeout)
                .build()
        })?
        .map_err(|e| TransportError::Unavailable(format!("http client init failed: {e}")))?;

        Ok(Self {
            endpoint: settings.endpoint,
            ttl: settings.cache_ttl,
            cache: Arc::new(TtlCache::new()),
            client,
        })
    }

    pub fn with_cache(mut self, cache: Arc<TtlCache<String>>) -> Self {
        self.cache = cache;
        self
    }

    /// Resolves country and state/province for `postal_code`.
    pub fn resolve(&self, postal_code: &str) -> Option<Destination> {
        let postal_code = postal_code.trim();
        if postal_code.is_empty() {
            return None;
        }

        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("address", postal_code)
            .finish();
        let target = format!("{}?{query}", self.endpoint);
        let key = Fingerprint::of(target.as_bytes());

        let body = match self.cache.get(&key) {
            Some(body) => body,
            None => match get_text(&self.client, &target) {
                Ok(body) => {
                    self.cache.put(key, body.clone(), self.ttl);
                    body
                }
                Err(err) => {
                    tracing::warn!(error = %err, "geocode lookup failed");
                    return None;
                }
            },
        };

        let destination = destination_from_reply(&body, postal_code);
        if destination.is_none() {
            tracing::warn!(postal_code, "geocode reply did not resolve to a destination");
        }
        destination
    }
}

fn destination_from_reply(body: &str, postal_code: &str) -> Option<Destination> {
    let doc: GeocodeDoc = serde_json::from_str(body).ok()?;
    let components = &doc.results.first()?.address_components;

    let country = components.iter().find(|c| c.is("country"))?.long_name.clone();
    let region = components
        .iter()
        .find(|c| c.is("administrative_area_level_1"))?;
    // Canadian provinces are spelled out; elsewhere the short code is used.
    let state_province = if country == "Canada" {
        region.long_name.clone()
    } else {
        region.short_name.clone()
    };

    Destination::new(country, state_province, postal_code).ok()
}
