//! Shared wiring for CLI commands: config → settings → transport/client.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use pod_config::secrets::ResolvedCredentials;
use pod_config::{ClientSettings, LoadedConfig, Protocol, UnusedKeyPolicy};
use pod_http::{Credentials, GeocodeResolver, GeocodeSettings, HttpQueryTransport, HttpSettings, Scheme};
use pod_order::{CacheTtls, Customer, Destination, OrderClient};

pub use pod_config::secrets::Usage;

pub mod locate;
pub mod order;

// ---------------------------------------------------------------------------
// Argument groups
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct DestinationArgs {
    /// Full country name, e.g. "United States"
    #[arg(long, default_value = "United States")]
    pub country: String,

    /// State or province
    #[arg(long = "state")]
    pub state_province: String,

    #[arg(long = "postal")]
    pub postal_code: String,
}

impl DestinationArgs {
    pub fn build(&self) -> Result<Destination> {
        Destination::new(&self.country, &self.state_province, &self.postal_code)
            .context("invalid destination")
    }
}

#[derive(Args, Debug)]
pub struct CustomerArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub company: Option<String>,

    /// Address line (repeat for up to 3 lines)
    #[arg(long = "address", required = true)]
    pub address: Vec<String>,

    #[arg(long)]
    pub city: String,
}

impl CustomerArgs {
    pub fn build(&self) -> Result<Customer> {
        Customer::new(&self.name, self.company.as_deref(), &self.address, &self.city)
            .context("invalid customer")
    }
}

/// `PX00ZOV6J0` or `PX00ZOV6J0:3`.
pub fn parse_product(raw: &str) -> Result<(String, u32), String> {
    match raw.split_once(':') {
        None => Ok((raw.to_string(), 1)),
        Some((id, qty)) => {
            let qty: u32 = qty
                .parse()
                .map_err(|_| format!("invalid quantity '{qty}' in '{raw}'"))?;
            Ok((id.to_string(), qty))
        }
    }
}

// ---------------------------------------------------------------------------
// Client context
// ---------------------------------------------------------------------------

/// Everything a command needs, resolved once from layered config + env.
pub struct ClientContext {
    pub loaded: LoadedConfig,
    pub settings: ClientSettings,
    credentials: ResolvedCredentials,
}

impl ClientContext {
    pub fn load(config_paths: &[String], usage: Usage) -> Result<Self> {
        let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
        let loaded = pod_config::load_layered_yaml(&path_refs)?;

        let report = pod_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
        for pointer in &report.unused_leaf_pointers {
            tracing::warn!(pointer = %pointer, "unused config key");
        }

        let settings = ClientSettings::from_config_json(&loaded.config_json)?;
        let credentials = pod_config::secrets::resolve_credentials(&loaded.config_json, usage)?;

        tracing::debug!(
            config_hash = %loaded.config_hash,
            usage = usage.as_str(),
            protocol = settings.protocol.as_str(),
            "config loaded"
        );

        Ok(Self {
            loaded,
            settings,
            credentials,
        })
    }

    pub fn http_settings(&self) -> Result<HttpSettings> {
        let scheme = match self.settings.protocol {
            Protocol::Http => Scheme::Http,
            Protocol::Https => Scheme::Https,
            Protocol::Xml => bail!(
                "CONFIG_INVALID /provider/protocol: xml is not supported by this client \
                 (use http or https)"
            ),
        };
        Ok(HttpSettings {
            endpoint: self.settings.endpoint.clone(),
            scheme,
            connect_timeout: self.settings.connect_timeout,
            total_timeout: self.settings.total_timeout,
            max_query_len: self.settings.max_query_len,
        })
    }

    pub fn transport(&self) -> Result<HttpQueryTransport> {
        let credentials = self
            .credentials
            .pair()
            .map(|(user_id, password)| Credentials::new(user_id, password));
        HttpQueryTransport::new(self.http_settings()?, credentials)
            .context("failed to build provider transport")
    }

    pub fn client(&self) -> Result<OrderClient> {
        Ok(OrderClient::new(Arc::new(self.transport()?)).with_ttls(CacheTtls {
            shipping_quote: self.settings.shipping_quote_ttl,
            order_status: self.settings.order_status_ttl,
        }))
    }

    pub fn geocoder(&self) -> Result<GeocodeResolver> {
        GeocodeResolver::new(GeocodeSettings {
            endpoint: self.settings.geocode_endpoint.clone(),
            connect_timeout: self.settings.connect_timeout,
            total_timeout: self.settings.total_timeout,
            cache_ttl: self.settings.geocode_ttl,
        })
        .context("failed to build geocode client")
    }
}
