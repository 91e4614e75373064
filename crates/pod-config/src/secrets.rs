//! Provider credential resolution.
//!
//! # Contract
//! - Config YAML stores only env var NAMES under `/provider/credentials_env`.
//! - Callers invoke [`resolve_credentials`] once at startup and hand the result
//!   to the transport constructor. No other code reads these env vars.
//! - `Debug` redacts values. Errors name the env var, never its value.
//!
//! | Usage       | user_id + password |
//! |-------------|--------------------|
//! | `QuoteOnly` | optional           |
//! | `Ordering`  | required           |
//!
//! Shipping quotes need no account; orders and status queries do.

use anyhow::{bail, Result};
use serde_json::Value;

pub const DEFAULT_USER_ID_ENV: &str = "POD_PROVIDER_USER_ID";
pub const DEFAULT_PASSWORD_ENV: &str = "POD_PROVIDER_PASSWORD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    QuoteOnly,
    Ordering,
}

impl Usage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Usage::QuoteOnly => "QUOTE_ONLY",
            Usage::Ordering => "ORDERING",
        }
    }
}

/// Provider account credentials resolved from the environment.
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub user_id: Option<String>,
    pub password: Option<String>,
}

impl ResolvedCredentials {
    /// Both values, if both are present.
    pub fn pair(&self) -> Option<(&str, &str)> {
        Some((self.user_id.as_deref()?, self.password.as_deref()?))
    }
}

impl std::fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("user_id", &self.user_id.as_ref().map(|_| "<REDACTED>"))
            .field("password", &self.password.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

fn read_str_at(config: &Value, pointer: &str) -> Option<String> {
    let s = config.pointer(pointer)?.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

pub fn resolve_credentials(config_json: &Value, usage: Usage) -> Result<ResolvedCredentials> {
    let user_id_var = read_str_at(config_json, "/provider/credentials_env/user_id")
        .unwrap_or_else(|| DEFAULT_USER_ID_ENV.to_string());
    let password_var = read_str_at(config_json, "/provider/credentials_env/password")
        .unwrap_or_else(|| DEFAULT_PASSWORD_ENV.to_string());

    let user_id = resolve_env(&user_id_var);
    let password = resolve_env(&password_var);

    if usage == Usage::Ordering {
        if user_id.is_none() {
            bail!(
                "CREDENTIALS_MISSING usage={}: required env var '{}' (provider user id) \
                 is not set or empty",
                usage.as_str(),
                user_id_var,
            );
        }
        if password.is_none() {
            bail!(
                "CREDENTIALS_MISSING usage={}: required env var '{}' (provider password) \
                 is not set or empty",
                usage.as_str(),
                password_var,
            );
        }
    }

    Ok(ResolvedCredentials { user_id, password })
}
