//! Canned provider replies and sample parties.

use pod_order::{Customer, Destination};

/// Product id the provider documents for integration testing.
pub const TEST_PRODUCT_ID: &str = "PX00ZOV6J0";
/// Order id the provider returns for every `Mode=Test` submission.
pub const TEST_ORDER_ID: &str = "00000";

pub const TEST_USER_ID: &str = "fixture-shop@example.com";
pub const TEST_PASSWORD: &str = "fixture-password";

pub fn sample_destination() -> Destination {
    Destination::new("United States", "TX", "78755").expect("fixture destination is valid")
}

pub fn sample_customer() -> Customer {
    Customer::new("Austin Shop", None, &["123 Main St", "Suite 4"], "Austin")
        .expect("fixture customer is valid")
}

/// `(description, delivery time, price)` rows as the provider sends them.
pub fn quote_reply_xml(options: &[(&str, &str, &str)]) -> String {
    let mut body = String::from(
        "<?xml version=\"1.0\"?>\n<Response>\n  <ErrorCode>0</ErrorCode>\n  <ErrorText>success</ErrorText>\n",
    );
    for (description, delivery, price) in options {
        body.push_str(&format!(
            "  <Option>\n    <Description>{description}</Description>\n    \
             <DeliveryTime>{delivery}</DeliveryTime>\n    <Price>{price}</Price>\n  </Option>\n"
        ));
    }
    body.push_str("</Response>\n");
    body
}

/// A typical two-option domestic quote.
pub fn standard_quote_xml() -> String {
    quote_reply_xml(&[
        ("USPS First Class Mail", "2-5 business days", "0.00"),
        ("UPS Ground", "1-5 business days", "7.50"),
    ])
}

pub fn order_reply_xml(order_id: &str) -> String {
    format!(
        "<Response><ErrorCode>0</ErrorCode><ErrorText>success</ErrorText>\
         <OrderId>{order_id}</OrderId></Response>"
    )
}

pub fn status_reply_xml(
    status: Option<&str>,
    tracking_type: Option<&str>,
    tracking_id: Option<&str>,
) -> String {
    let mut body = String::from("<Response><ErrorCode>0</ErrorCode><ErrorText>success</ErrorText>");
    for (tag, value) in [
        ("OrderStatus", status),
        ("TrackingType", tracking_type),
        ("TrackingId", tracking_id),
    ] {
        if let Some(v) = value {
            body.push_str(&format!("<{tag}>{v}</{tag}>"));
        }
    }
    body.push_str("</Response>");
    body
}

pub fn error_reply_xml(code: i64, text: &str) -> String {
    format!("<Response><ErrorCode>{code}</ErrorCode><ErrorText>{text}</ErrorText></Response>")
}
