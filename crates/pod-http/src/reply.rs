//! XML reply parsing.
//!
//! Every provider reply is one flat document:
//!
//! ```xml
//! <Response>
//!   <ErrorCode>0</ErrorCode>
//!   <ErrorText>success</ErrorText>
//!   <Option><Description>..</Description><DeliveryTime>..</DeliveryTime><Price>..</Price></Option>
//!   <OrderId>..</OrderId>
//!   <OrderStatus>..</OrderStatus><TrackingType>..</TrackingType><TrackingId>..</TrackingId>
//! </Response>
//! ```
//!
//! Which success fields are present depends on the request kind. Empty
//! elements count as absent.

use serde::Deserialize;

use pod_order::{
    OrderId, OrderStatus, RemoteError, Reply, RequestKind, ShippingOption, SubmitConfirmation,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ReplyDoc {
    error_code: Option<String>,
    error_text: Option<String>,
    #[serde(rename = "Option", default)]
    options: Vec<OptionDoc>,
    order_id: Option<String>,
    order_status: Option<String>,
    tracking_type: Option<String>,
    tracking_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OptionDoc {
    description: Option<String>,
    delivery_time: Option<String>,
    price: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn malformed(msg: impl Into<String>) -> RemoteError {
    RemoteError::Malformed(msg.into())
}

/// Parses `body` as the reply to a `kind` request.
pub fn parse(kind: RequestKind, body: &str) -> Result<Reply, RemoteError> {
    let doc: ReplyDoc = quick_xml::de::from_str(body)
        .map_err(|e| malformed(format!("reply is not a readable XML document: {e}")))?;

    let code_text = present(doc.error_code).ok_or_else(|| malformed("missing ErrorCode"))?;
    let code: i64 = code_text
        .parse()
        .map_err(|_| malformed(format!("non-numeric ErrorCode '{code_text}'")))?;
    if code != 0 {
        return Err(RemoteError::Api {
            code,
            message: doc.error_text.unwrap_or_default().trim().to_string(),
        });
    }

    match kind {
        RequestKind::ShippingOptions => parse_options(doc.options).map(Reply::Quote),
        RequestKind::Order => {
            let raw = present(doc.order_id).ok_or_else(|| malformed("missing OrderId"))?;
            let order_id = OrderId::new(raw).map_err(|e| malformed(format!("bad OrderId: {e}")))?;
            Ok(Reply::Submitted(SubmitConfirmation::new(order_id)))
        }
        RequestKind::OrderStatus => Ok(Reply::Status(OrderStatus {
            status: present(doc.order_status),
            tracking_type: present(doc.tracking_type),
            tracking_id: present(doc.tracking_id),
        })),
    }
}

fn parse_options(docs: Vec<OptionDoc>) -> Result<Vec<ShippingOption>, RemoteError> {
    docs.into_iter()
        .enumerate()
        .map(|(i, o)| {
            let (Some(name), Some(estimate), Some(price)) =
                (present(o.description), present(o.delivery_time), present(o.price))
            else {
                return Err(malformed(format!(
                    "option {i} is missing Description, DeliveryTime or Price"
                )));
            };
            let price: f64 = price
                .parse()
                .map_err(|_| malformed(format!("option {i} has non-numeric Price '{price}'")))?;
            ShippingOption::new(name, estimate, price, i)
                .map_err(|e| malformed(format!("option {i}: {e}")))
        })
        .collect()
}
