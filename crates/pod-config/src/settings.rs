//! Typed client settings read from the merged config JSON.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value;

pub const DEFAULT_ENDPOINT: &str = "https://kunaki.com/HTTPService.ASP";
pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Wire protocol selected by `/provider/protocol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
    /// XML document posted over HTTPS. Accepted in config, not implemented.
    Xml,
}

impl Protocol {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            "xml" => Ok(Protocol::Xml),
            other => bail!(
                "CONFIG_INVALID /provider/protocol: '{}' (expected http | https | xml)",
                other
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
            Protocol::Xml => "xml",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: String,
    pub protocol: Protocol,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
    pub max_query_len: usize,
    pub shipping_quote_ttl: Duration,
    pub order_status_ttl: Duration,
    pub geocode_endpoint: String,
    pub geocode_ttl: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            protocol: Protocol::Https,
            connect_timeout: Duration::from_secs(5),
            total_timeout: Duration::from_secs(8),
            max_query_len: 1024,
            shipping_quote_ttl: minutes(1440),
            order_status_ttl: minutes(30),
            geocode_endpoint: DEFAULT_GEOCODE_ENDPOINT.to_string(),
            geocode_ttl: minutes(1440),
        }
    }
}

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m.saturating_mul(60))
}

fn opt_str(cfg: &Value, pointer: &str) -> Result<Option<String>> {
    match cfg.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => bail!("CONFIG_INVALID {}: expected string, got {}", pointer, other),
    }
}

fn opt_u64(cfg: &Value, pointer: &str) -> Result<Option<u64>> {
    match cfg.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .with_context(|| format!("CONFIG_INVALID {pointer}: expected non-negative integer, got {v}")),
    }
}

impl ClientSettings {
    /// Reads every setting, falling back to defaults for absent keys.
    pub fn from_config_json(cfg: &Value) -> Result<Self> {
        let d = Self::default();

        let protocol = match opt_str(cfg, "/provider/protocol")? {
            Some(raw) => Protocol::parse(&raw)?,
            None => d.protocol,
        };

        let connect_timeout = opt_u64(cfg, "/provider/timeouts/connect_secs")?
            .map(Duration::from_secs)
            .unwrap_or(d.connect_timeout);
        let total_timeout = opt_u64(cfg, "/provider/timeouts/total_secs")?
            .map(Duration::from_secs)
            .unwrap_or(d.total_timeout);
        if connect_timeout.is_zero() || total_timeout.is_zero() {
            bail!("CONFIG_INVALID /provider/timeouts: timeouts must be at least 1 second");
        }
        if connect_timeout > total_timeout {
            bail!(
                "CONFIG_INVALID /provider/timeouts: connect_secs ({}) exceeds total_secs ({})",
                connect_timeout.as_secs(),
                total_timeout.as_secs()
            );
        }

        let max_query_len = match opt_u64(cfg, "/provider/max_query_len")? {
            Some(0) => bail!("CONFIG_INVALID /provider/max_query_len: must be positive"),
            Some(n) => usize::try_from(n).context("CONFIG_INVALID /provider/max_query_len: too large")?,
            None => d.max_query_len,
        };

        Ok(Self {
            endpoint: opt_str(cfg, "/provider/endpoint")?.unwrap_or(d.endpoint),
            protocol,
            connect_timeout,
            total_timeout,
            max_query_len,
            shipping_quote_ttl: opt_u64(cfg, "/cache/ttl_minutes/shipping_options")?
                .map(minutes)
                .unwrap_or(d.shipping_quote_ttl),
            order_status_ttl: opt_u64(cfg, "/cache/ttl_minutes/order_status")?
                .map(minutes)
                .unwrap_or(d.order_status_ttl),
            geocode_endpoint: opt_str(cfg, "/geocode/endpoint")?.unwrap_or(d.geocode_endpoint),
            geocode_ttl: opt_u64(cfg, "/geocode/ttl_minutes")?
                .map(minutes)
                .unwrap_or(d.geocode_ttl),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_parse() {
        assert_eq!(Protocol::parse(" HTTPS ").unwrap(), Protocol::Https);
        assert_eq!(Protocol::parse("xml").unwrap(), Protocol::Xml);
        let err = Protocol::parse("ftp").unwrap_err().to_string();
        assert!(err.contains("CONFIG_INVALID"), "{err}");
    }

    #[test]
    fn empty_config_yields_defaults() {
        let s = ClientSettings::from_config_json(&serde_json::json!({})).unwrap();
        assert_eq!(s, ClientSettings::default());
    }
}
