//! Scenario: polling the status of a submitted order.
//!
//! # Invariants under test
//!
//! 1. Status is only available once the order is `Submitted`.
//! 2. Only the fields present in the reply are populated.
//! 3. Repeated polls inside the status TTL cost one provider call; after it
//!    the provider is asked again.
//! 4. A provider error is surfaced and not cached.

use std::time::Duration;

use pod_order::{
    CacheTtls, OrderError, OrderStatus, PreconditionError, RemoteError, RequestKind,
};
use pod_testkit::fixtures::{
    error_reply_xml, order_reply_xml, sample_customer, sample_destination, standard_quote_xml,
    status_reply_xml, TEST_ORDER_ID, TEST_PRODUCT_ID,
};
use pod_testkit::scripted_client;

#[test]
fn status_polling_is_cached_until_ttl() {
    let (transport, client, clock) = scripted_client();
    transport
        .push_reply(standard_quote_xml())
        .push_reply(order_reply_xml(TEST_ORDER_ID))
        .push_reply(status_reply_xml(Some("Pending"), None, None))
        .push_reply(status_reply_xml(Some("Shipped"), Some("UPS"), Some("1Z999AA10123456784")));

    let mut order = client
        .new_order()
        .with_destination(sample_destination())
        .with_customer(sample_customer());

    assert_eq!(
        order.order_status().unwrap_err(),
        OrderError::Precondition(PreconditionError::NotYetSubmitted)
    );

    order.add_product(TEST_PRODUCT_ID, 1).unwrap();
    let options = order.quote_shipping_options(false).unwrap();
    order.select_shipping_option(&options[0]).unwrap();
    order.submit(true).unwrap();

    let first = order.order_status().unwrap();
    assert_eq!(first.status.as_deref(), Some("Pending"));
    assert_eq!(first.present_fields(), vec!["status"]);

    clock.advance(Duration::from_secs(60));
    assert_eq!(order.order_status().unwrap(), first);
    assert_eq!(transport.sent_count(), 3);

    clock.advance(CacheTtls::default().order_status);
    let later = order.order_status().unwrap();
    assert_eq!(
        later,
        OrderStatus {
            status: Some("Shipped".into()),
            tracking_type: Some("UPS".into()),
            tracking_id: Some("1Z999AA10123456784".into()),
        }
    );
    assert_eq!(
        transport.sent_kinds(),
        vec![
            RequestKind::ShippingOptions,
            RequestKind::Order,
            RequestKind::OrderStatus,
            RequestKind::OrderStatus,
        ]
    );
    let wire = transport.last_sent().unwrap();
    assert!(wire.canonical().contains("?RequestType=OrderStatus&Account="));
    assert!(wire.canonical().ends_with("&OrderId=00000&ResponseType=xml"));
}

#[test]
fn status_error_is_surfaced_and_not_cached() {
    let (transport, client, _clock) = scripted_client();
    transport
        .push_reply(standard_quote_xml())
        .push_reply(order_reply_xml("7654321"))
        .push_reply(error_reply_xml(3, "Order not found"))
        .push_reply(status_reply_xml(None, None, None));

    let mut order = client
        .new_order()
        .with_destination(sample_destination())
        .with_customer(sample_customer());
    order.add_product(TEST_PRODUCT_ID, 1).unwrap();
    let options = order.quote_shipping_options(false).unwrap();
    order.select_shipping_option(&options[1]).unwrap();
    order.submit(false).unwrap();

    assert_eq!(
        order.order_status().unwrap_err(),
        OrderError::Remote(RemoteError::Api {
            code: 3,
            message: "Order not found".into()
        })
    );

    let status = order.order_status().unwrap();
    assert!(status.is_empty());
    assert_eq!(transport.sent_count(), 4);
}
