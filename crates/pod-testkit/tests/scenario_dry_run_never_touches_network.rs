//! Scenario: a dry-run quote is a local check only.
//!
//! # Invariants under test
//!
//! 1. `quote_shipping_options(true)` returns an empty list and sends nothing.
//! 2. It neither reads nor writes the reply cache.
//! 3. It leaves an existing live quote and selection untouched.
//! 4. It still fails on missing preconditions and on an over-long request.

use pod_order::{OrderError, PreconditionError, TransportError};
use pod_testkit::fixtures::{sample_destination, standard_quote_xml, TEST_PRODUCT_ID};
use pod_testkit::scripted_client;

#[test]
fn dry_run_quote_sends_nothing_and_caches_nothing() {
    let (transport, client, _clock) = scripted_client();
    let mut order = client.new_order().with_destination(sample_destination());
    order.add_product(TEST_PRODUCT_ID, 1).unwrap();

    let options = order.quote_shipping_options(true).unwrap();

    assert!(options.is_empty());
    assert_eq!(transport.sent_count(), 0);
    assert!(client.cache().is_empty());
    assert!(order.shipping_options().is_none());
}

#[test]
fn dry_run_quote_does_not_disturb_live_quote() {
    let (transport, client, _clock) = scripted_client();
    transport.push_reply(standard_quote_xml());
    let mut order = client.new_order().with_destination(sample_destination());
    order.add_product(TEST_PRODUCT_ID, 1).unwrap();
    let live = order.quote_shipping_options(false).unwrap();
    order.select_shipping_option(&live[1]).unwrap();

    assert!(order.quote_shipping_options(true).unwrap().is_empty());

    assert_eq!(transport.sent_count(), 1);
    assert_eq!(order.shipping_options().unwrap(), live.as_slice());
    assert_eq!(order.selected_shipping_option(), Some(&live[1]));
}

#[test]
fn dry_run_quote_still_checks_preconditions() {
    let (transport, client, _clock) = scripted_client();

    let mut no_destination = client.new_order();
    no_destination.add_product(TEST_PRODUCT_ID, 1).unwrap();
    assert_eq!(
        no_destination.quote_shipping_options(true).unwrap_err(),
        OrderError::Precondition(PreconditionError::NoDestination)
    );

    let mut no_products = client.new_order().with_destination(sample_destination());
    assert_eq!(
        no_products.quote_shipping_options(true).unwrap_err(),
        OrderError::Precondition(PreconditionError::NoProducts)
    );

    assert_eq!(transport.sent_count(), 0);
}

#[test]
fn dry_run_quote_rejects_overlong_request() {
    let (transport, client, _clock) = scripted_client();
    let mut order = client.new_order().with_destination(sample_destination());
    // 32 chars per product pair; 40 distinct ids exceed the 1024 limit.
    for i in 0..40 {
        order.add_product(&format!("PX00ZOV{i:03}"), 1).unwrap();
    }

    let err = order.quote_shipping_options(true).unwrap_err();
    assert!(
        matches!(
            err,
            OrderError::Transport(TransportError::RequestTooLong { limit: 1024, .. })
        ),
        "{err:?}"
    );
    assert_eq!(transport.sent_count(), 0);
}
