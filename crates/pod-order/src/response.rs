//! Parsed provider confirmations.

use std::fmt;

use crate::error::ValidationError;

/// Provider-assigned order identifier (the test mode returns `"00000"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new("order_id", "is required"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::new("order_id", "must not contain whitespace"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitConfirmation {
    order_id: OrderId,
}

impl SubmitConfirmation {
    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn into_order_id(self) -> OrderId {
        self.order_id
    }
}

/// Post-submission status. The provider fills in whichever fields it knows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderStatus {
    pub status: Option<String>,
    pub tracking_type: Option<String>,
    pub tracking_id: Option<String>,
}

impl OrderStatus {
    /// Names of the populated fields, in a fixed order.
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.status.is_some() {
            out.push("status");
        }
        if self.tracking_type.is_some() {
            out.push("tracking_type");
        }
        if self.tracking_id.is_some() {
            out.push("tracking_id");
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_is_trimmed() {
        let id = OrderId::new(" 00000\n").unwrap();
        assert_eq!(id.as_str(), "00000");
        assert_eq!(id.to_string(), "00000");
    }

    #[test]
    fn order_id_rejects_blank_and_embedded_whitespace() {
        assert!(OrderId::new("  ").is_err());
        assert!(OrderId::new("12 34").is_err());
    }

    #[test]
    fn present_fields_follow_population() {
        let s = OrderStatus {
            status: Some("Shipped".into()),
            tracking_type: None,
            tracking_id: Some("1Z999".into()),
        };
        assert_eq!(s.present_fields(), vec!["status", "tracking_id"]);
        assert!(OrderStatus::default().is_empty());
    }
}
