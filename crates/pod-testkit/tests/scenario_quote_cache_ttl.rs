//! Scenario: shipping quotes and order status are cached by request fingerprint.
//!
//! # Invariants under test
//!
//! 1. Two orders with the same destination + products cost one provider call.
//! 2. Product insertion order does not change the fingerprint.
//! 3. A different destination is a different key.
//! 4. Entries expire after their TTL (driven by a manual clock, no sleeping).
//! 5. Failed exchanges are never cached.

use std::time::Duration;

use pod_order::{CacheTtls, Destination, OrderError, TransportError};
use pod_testkit::fixtures::{quote_reply_xml, sample_destination, standard_quote_xml};
use pod_testkit::scripted_client;

#[test]
fn identical_quotes_share_one_provider_call() {
    let (transport, client, _clock) = scripted_client();
    transport.push_reply(standard_quote_xml());

    let mut first = client.new_order().with_destination(sample_destination());
    first.add_product("PX00ZOV6J0", 1).unwrap();
    first.add_product("PX00ZOV6J1", 2).unwrap();

    let mut second = client.new_order().with_destination(sample_destination());
    second.add_product("PX00ZOV6J1", 2).unwrap();
    second.add_product("PX00ZOV6J0", 1).unwrap();

    let a = first.quote_shipping_options(false).unwrap();
    let b = second.quote_shipping_options(false).unwrap();

    assert_eq!(transport.sent_count(), 1);
    assert_eq!(client.cache().len(), 1);
    let names = |opts: &[pod_order::ShippingOption]| {
        opts.iter().map(|o| o.name().to_string()).collect::<Vec<_>>()
    };
    assert_eq!(names(&a), names(&b));
    // Each order gets its own live quote.
    assert_ne!(a[0], b[0]);
}

#[test]
fn different_destination_is_a_separate_entry() {
    let (transport, client, _clock) = scripted_client();
    transport
        .push_reply(standard_quote_xml())
        .push_reply(quote_reply_xml(&[("Canada Post", "5-10 business days", "12.00")]));

    let mut us = client.new_order().with_destination(sample_destination());
    us.add_product("PX00ZOV6J0", 1).unwrap();
    us.quote_shipping_options(false).unwrap();

    let mut ca = client
        .new_order()
        .with_destination(Destination::new("Canada", "Ontario", "K1A 0B1").unwrap());
    ca.add_product("PX00ZOV6J0", 1).unwrap();
    let options = ca.quote_shipping_options(false).unwrap();

    assert_eq!(transport.sent_count(), 2);
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].name(), "Canada Post");
    assert_eq!(client.cache().len(), 2);
}

#[test]
fn quote_entry_expires_after_ttl() {
    let (transport, client, clock) = scripted_client();
    transport
        .push_reply(standard_quote_xml())
        .push_reply(standard_quote_xml());
    let mut order = client.new_order().with_destination(sample_destination());
    order.add_product("PX00ZOV6J0", 1).unwrap();

    order.quote_shipping_options(false).unwrap();
    clock.advance(CacheTtls::default().shipping_quote - Duration::from_secs(1));
    order.quote_shipping_options(false).unwrap();
    assert_eq!(transport.sent_count(), 1, "hit just before expiry");

    clock.advance(Duration::from_secs(1));
    order.quote_shipping_options(false).unwrap();
    assert_eq!(transport.sent_count(), 2, "miss at expiry");
}

#[test]
fn zero_ttl_disables_caching() {
    let (transport, client, _clock) = scripted_client();
    let client = client.with_ttls(CacheTtls {
        shipping_quote: Duration::ZERO,
        order_status: Duration::ZERO,
    });
    transport
        .push_reply(standard_quote_xml())
        .push_reply(standard_quote_xml());
    let mut order = client.new_order().with_destination(sample_destination());
    order.add_product("PX00ZOV6J0", 1).unwrap();

    order.quote_shipping_options(false).unwrap();
    order.quote_shipping_options(false).unwrap();

    assert_eq!(transport.sent_count(), 2);
    assert!(client.cache().is_empty());
}

#[test]
fn failed_quote_is_not_cached() {
    let (transport, client, _clock) = scripted_client();
    transport
        .push_failure(TransportError::Timeout)
        .push_reply(standard_quote_xml());
    let mut order = client.new_order().with_destination(sample_destination());
    order.add_product("PX00ZOV6J0", 1).unwrap();

    assert_eq!(
        order.quote_shipping_options(false).unwrap_err(),
        OrderError::Transport(TransportError::Timeout)
    );
    assert!(client.cache().is_empty());
    assert!(order.shipping_options().is_none());

    let options = order.quote_shipping_options(false).unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(transport.sent_count(), 2);
}
