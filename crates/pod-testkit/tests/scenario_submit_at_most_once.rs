//! Scenario: an order reaches the provider at most once.
//!
//! # Invariants under test
//!
//! 1. A successful submit moves the order to `Submitted` with the returned id.
//! 2. A second submit fails with `AlreadySubmitted` and sends nothing.
//! 3. `dry_run` selects `Mode=Test` on the wire; otherwise `Mode=Live`.
//! 4. Preconditions are checked in a fixed order before anything is built.
//! 5. Any failure (remote, transport, unexpected reply) leaves the order
//!    `Open` and retryable, and nothing is retried automatically.

use pod_order::{
    Order, OrderClient, OrderError, Party, PreconditionError, RemoteError, RequestKind,
    SubmissionState, TransportError,
};
use pod_testkit::fixtures::{
    error_reply_xml, order_reply_xml, sample_customer, sample_destination, standard_quote_xml,
    TEST_ORDER_ID, TEST_PRODUCT_ID,
};
use pod_testkit::{scripted_client, ScriptedTransport};

fn ready_order() -> (std::sync::Arc<ScriptedTransport>, OrderClient, Order) {
    let (transport, client, _clock) = scripted_client();
    transport.push_reply(standard_quote_xml());
    let mut order = client
        .new_order()
        .with_destination(sample_destination())
        .with_customer(sample_customer());
    order.add_product(TEST_PRODUCT_ID, 1).unwrap();
    let options = order.quote_shipping_options(false).unwrap();
    order.select_shipping_option(&options[0]).unwrap();
    (transport, client, order)
}

// ---------------------------------------------------------------------------
// 1 + 2 + 3
// ---------------------------------------------------------------------------

#[test]
fn test_mode_submit_then_second_submit_is_refused() {
    let (transport, _client, mut order) = ready_order();
    transport.push_reply(order_reply_xml(TEST_ORDER_ID));

    let id = order.submit(true).unwrap();
    assert_eq!(id.as_str(), TEST_ORDER_ID);
    assert!(order.is_submitted());
    assert_eq!(order.order_id().unwrap(), &id);

    let wire = transport.last_sent().unwrap();
    assert_eq!(wire.kind(), RequestKind::Order);
    assert!(wire.canonical().contains("&Mode=Test&"), "{}", wire.canonical());
    assert!(wire
        .canonical()
        .contains("ShippingDescription=USPS+First+Class+Mail"));

    assert_eq!(
        order.submit(true).unwrap_err(),
        OrderError::Precondition(PreconditionError::AlreadySubmitted)
    );
    let live_retry = order.submit(false).unwrap_err();
    assert_eq!(
        live_retry.precondition(),
        Some(&PreconditionError::AlreadySubmitted)
    );
    assert_eq!(
        transport.sent_kinds(),
        vec![RequestKind::ShippingOptions, RequestKind::Order]
    );
}

#[test]
fn live_submit_sends_live_mode() {
    let (transport, _client, mut order) = ready_order();
    transport.push_reply(order_reply_xml("1234567"));

    let id = order.submit(false).unwrap();

    assert_eq!(id.as_str(), "1234567");
    assert!(transport.last_sent().unwrap().canonical().contains("&Mode=Live&"));
}

// ---------------------------------------------------------------------------
// 4: precondition order
// ---------------------------------------------------------------------------

#[test]
fn submit_preconditions_are_checked_in_order() {
    let (transport, client, _clock) = scripted_client();

    let mut order = client.new_order();
    assert_eq!(
        order.submit(true).unwrap_err(),
        OrderError::Precondition(PreconditionError::MissingParty(Party::Destination))
    );

    order.set_destination(sample_destination());
    assert_eq!(
        order.submit(true).unwrap_err(),
        OrderError::Precondition(PreconditionError::MissingParty(Party::Customer))
    );

    order.set_customer(sample_customer());
    assert_eq!(
        order.submit(true).unwrap_err(),
        OrderError::Precondition(PreconditionError::NoShippingOptionSelected)
    );

    assert_eq!(transport.sent_count(), 0);
}

#[test]
fn quoted_but_unselected_order_cannot_submit() {
    let (transport, _client, mut order) = ready_order();
    // Mutation drops the selection along with the quote.
    order.add_product("PX00ZOV6J1", 1).unwrap();

    assert_eq!(
        order.submit(true).unwrap_err(),
        OrderError::Precondition(PreconditionError::NoShippingOptionSelected)
    );
    assert_eq!(transport.sent_count(), 1);
}

// ---------------------------------------------------------------------------
// 5: failures leave the order open
// ---------------------------------------------------------------------------

#[test]
fn remote_rejection_leaves_order_open_and_retryable() {
    let (transport, _client, mut order) = ready_order();
    transport
        .push_reply(error_reply_xml(1, "Invalid Customer Address"))
        .push_reply(order_reply_xml(TEST_ORDER_ID));

    let err = order.submit(true).unwrap_err();
    assert_eq!(
        err,
        OrderError::Remote(RemoteError::Api {
            code: 1,
            message: "Invalid Customer Address".into()
        })
    );
    assert_eq!(order.state(), &SubmissionState::Open);
    assert!(order.selected_shipping_option().is_some());
    // One attempt per call, no automatic retry.
    assert_eq!(transport.pending(), 1);

    order.submit(true).unwrap();
    assert!(order.is_submitted());
}

#[test]
fn transport_failure_leaves_order_open() {
    let (transport, _client, mut order) = ready_order();
    transport.push_failure(TransportError::Status(503));

    assert_eq!(
        order.submit(false).unwrap_err(),
        OrderError::Transport(TransportError::Status(503))
    );
    assert!(!order.is_submitted());
    assert_eq!(
        order.order_id().unwrap_err(),
        OrderError::Precondition(PreconditionError::NotYetSubmitted)
    );
}

#[test]
fn reply_without_order_id_is_malformed() {
    let (transport, _client, mut order) = ready_order();
    transport.push_reply(
        "<Response><ErrorCode>0</ErrorCode><ErrorText>success</ErrorText></Response>",
    );

    let err = order.submit(true).unwrap_err();
    assert!(matches!(err, OrderError::Remote(RemoteError::Malformed(_))), "{err:?}");
    assert!(!order.is_submitted());
}

#[test]
fn submit_without_account_fails_before_sending() {
    let transport = std::sync::Arc::new(ScriptedTransport::new(None).unwrap());
    let client = OrderClient::new(transport.clone());
    transport.push_reply(standard_quote_xml());
    let mut order = client
        .new_order()
        .with_destination(sample_destination())
        .with_customer(sample_customer());
    order.add_product(TEST_PRODUCT_ID, 1).unwrap();
    // Quotes need no account.
    let options = order.quote_shipping_options(false).unwrap();
    order.select_shipping_option(&options[0]).unwrap();

    let err = order.submit(true).unwrap_err();
    assert!(matches!(err, OrderError::Transport(TransportError::Unavailable(_))), "{err:?}");
    assert_eq!(transport.sent_kinds(), vec![RequestKind::ShippingOptions]);
}
