use std::io::Write;
use std::process::Command;

use assert_cmd::prelude::*;
use httpmock::prelude::*;
use predicates::prelude::*;
use pod_testkit::fixtures::{order_reply_xml, standard_quote_xml, status_reply_xml, TEST_ORDER_ID};

fn base_config() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/defaults/base.yaml").to_string()
}

/// Override layer pointing the provider at `endpoint`.
fn override_config(endpoint: &str, protocol: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(
        f,
        "provider:\n  endpoint: \"{endpoint}\"\n  protocol: \"{protocol}\"\n  timeouts:\n    connect_secs: 1\n    total_secs: 2\n"
    )
    .expect("write override");
    f
}

fn submit_cmd(overlay: &tempfile::NamedTempFile) -> Command {
    let mut cmd = Command::cargo_bin("pod").expect("binary built");
    cmd.env("POD_PROVIDER_USER_ID", "cli-shop@example.com")
        .env("POD_PROVIDER_PASSWORD", "cli-secret-pw")
        .args(["submit", "--config", &base_config(), "--config"])
        .arg(overlay.path());
    cmd
}

#[test]
fn cli_dry_run_quote_sends_nothing() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.path("/HTTPService.ASP");
        then.status(500);
    });
    let overlay = override_config(&server.url("/HTTPService.ASP"), "http");

    Command::cargo_bin("pod")
        .expect("binary built")
        .args(["quote", "--config", &base_config(), "--config"])
        .arg(overlay.path())
        .args(["--state", "TX", "--postal", "78755", "--product", "PX00ZOV6J0:2"])
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("dry_run=true"))
        .stdout(predicate::str::contains("product_count=2"))
        .stdout(predicate::str::contains("options=0"));

    any.assert_hits(0);
}

#[test]
fn cli_quote_prints_options() {
    let server = MockServer::start();
    let quote = server.mock(|when, then| {
        when.method(GET)
            .path("/HTTPService.ASP")
            .query_param("RequestType", "ShippingOptions");
        then.status(200).body(standard_quote_xml());
    });
    let overlay = override_config(&server.url("/HTTPService.ASP"), "http");

    Command::cargo_bin("pod")
        .expect("binary built")
        .args(["quote", "--config", &base_config(), "--config"])
        .arg(overlay.path())
        .args(["--state", "TX", "--postal", "78755", "--product", "PX00ZOV6J0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("options=2"))
        .stdout(predicate::str::contains(
            "option index=1 name=\"UPS Ground\" delivery=\"1-5 business days\" price=7.50",
        ));

    quote.assert_hits(1);
}

#[test]
fn cli_test_mode_submit_with_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/HTTPService.ASP")
            .query_param("RequestType", "ShippingOptions");
        then.status(200).body(standard_quote_xml());
    });
    let submit = server.mock(|when, then| {
        when.method(GET)
            .path("/HTTPService.ASP")
            .query_param("RequestType", "Order")
            .query_param("Mode", "Test")
            .query_param("UserId", "cli-shop@example.com");
        then.status(200).body(order_reply_xml(TEST_ORDER_ID));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/HTTPService.ASP")
            .query_param("RequestType", "OrderStatus");
        then.status(200)
            .body(status_reply_xml(Some("Pending"), None, None));
    });
    let overlay = override_config(&server.url("/HTTPService.ASP"), "http");

    submit_cmd(&overlay)
        .args(["--state", "TX", "--postal", "78755"])
        .args(["--name", "Austin Shop", "--address", "123 Main St", "--city", "Austin"])
        .args(["--product", "PX00ZOV6J0", "--shipping", "UPS Ground", "--status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode=Test"))
        .stdout(predicate::str::contains("shipping=\"UPS Ground\""))
        .stdout(predicate::str::contains("order_id=00000"))
        .stdout(predicate::str::contains("status=Pending"))
        .stdout(predicate::str::contains("cli-secret-pw").not())
        .stderr(predicate::str::contains("cli-secret-pw").not());

    submit.assert_hits(1);
}

#[test]
fn cli_refuses_xml_protocol() {
    let overlay = override_config("https://kunaki.com/XMLService.ASP", "xml");

    Command::cargo_bin("pod")
        .expect("binary built")
        .args(["quote", "--config", &base_config(), "--config"])
        .arg(overlay.path())
        .args(["--state", "TX", "--postal", "78755", "--product", "PX00ZOV6J0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xml is not supported"));
}
