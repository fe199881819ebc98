//! Trace context still crosses a hop when logging is turned down.

use reqwest::StatusCode;

use telephone::config::ObservabilityConfig;
use telephone::observability::init_telemetry;
use telephone::Envelope;

mod common;

use common::{base_config, bind, host, spawn_node, CaptureServer};

const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";

#[tokio::test]
async fn test_warn_level_still_propagates_context() {
    init_telemetry(&ObservabilityConfig {
        log_level: "warn".into(),
        ..ObservabilityConfig::default()
    })
    .unwrap();

    let next = CaptureServer::start().await;
    let (listener, addr) = bind().await;
    let config = base_config(vec![host("tele0", addr), next.host("tele1")]);
    let node = spawn_node(listener, &config, "tele0").await;

    let res = common::client()
        .post(node.message_url())
        .header("traceparent", format!("00-{TRACE_ID}-00f067aa0ba902b7-01"))
        .header("baggage", "chain=quotes")
        .json(&Envelope::first_hop("hello"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let received = next.wait_for(1).await;
    let headers = &received[0].headers;

    let traceparent = headers
        .get("traceparent")
        .expect("forward carried no traceparent")
        .to_str()
        .unwrap();
    assert!(traceparent.starts_with(&format!("00-{TRACE_ID}-")));
    assert_eq!(headers.get("baggage").unwrap(), "chain=quotes");
}
