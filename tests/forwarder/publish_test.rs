use axum::http::StatusCode;
use pihole_influx_forwarder::modules::pihole::StatusSnapshot;
use pihole_influx_forwarder::services::forwarder::{ForwardError, Forwarder};
use pihole_influx_forwarder::services::influx::{InfluxError, InfluxWriter, WritePrecision};
use pihole_influx_forwarder::services::pihole::PiHoleClient;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{closed_url, Influx, Upstream, SUMMARY_JSON};

// =============================================================================
// INTEGRATION TESTS - WRITE AND FLUSH
// =============================================================================

fn forwarder(upstream_url: String, influx_url: &str) -> Forwarder {
    let sink = InfluxWriter::new(influx_url, "test-token", "home", "pihole", WritePrecision::Seconds);
    Forwarder::new(
        PiHoleClient::new(upstream_url),
        Arc::new(sink),
        "pihole",
        Duration::from_secs(60),
    )
}

#[tokio::test]
async fn test_run_once_writes_both_points() {
    let upstream = Upstream::start(0, SUMMARY_JSON).await;
    let influx = Influx::start(StatusCode::NO_CONTENT).await;
    let forwarder = forwarder(upstream.url.clone(), &influx.url);

    forwarder.run_once().await.unwrap();

    let writes = influx.writes();
    assert_eq!(writes.len(), 1, "both points go out in one flush");

    let write = &writes[0];
    assert_eq!(write.authorization.as_deref(), Some("Token test-token"));
    assert!(write.query.contains("org=home"));
    assert!(write.query.contains("bucket=pihole"));
    assert!(write.query.contains("precision=s"));

    let lines: Vec<&str> = write.body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("pihole domains_being_blocked=1000,dns_queries_today=5000,"));
    assert!(lines[0].contains("queries_cached=1500"));
    assert!(lines[0].ends_with(",status=1"));
    assert_eq!(lines[1], "pihole gravity_last_updated=1i 1700000000");
}

#[tokio::test]
async fn test_disabled_status_written_as_zero() {
    let influx = Influx::start(StatusCode::NO_CONTENT).await;
    let forwarder = forwarder(closed_url(), &influx.url);

    let snapshot = StatusSnapshot {
        status: "disabled".to_string(),
        ..Default::default()
    };
    forwarder.handle_snapshot(&snapshot).await.unwrap();

    let writes = influx.writes();
    assert_eq!(writes.len(), 1);
    assert!(writes[0].body.lines().next().unwrap().ends_with(",status=0"));
}

#[tokio::test]
async fn test_gravity_timestamp_follows_write_precision() {
    let influx = Influx::start(StatusCode::NO_CONTENT).await;
    let sink = InfluxWriter::new(&influx.url, "t", "o", "b", WritePrecision::Milliseconds);
    let forwarder = Forwarder::new(
        PiHoleClient::new(closed_url()),
        Arc::new(sink),
        "pihole",
        Duration::from_secs(60),
    );

    let mut snapshot = StatusSnapshot::default();
    snapshot.gravity_last_updated.absolute = 1_700_000_000;
    forwarder.handle_snapshot(&snapshot).await.unwrap();

    let writes = influx.writes();
    assert_eq!(writes.len(), 1);
    assert!(writes[0].query.contains("precision=ms"));
    assert_eq!(
        writes[0].body.lines().nth(1),
        Some("pihole gravity_last_updated=1i 1700000000000")
    );
}

#[tokio::test]
async fn test_rejected_write_reports_status() {
    let influx = Influx::start(StatusCode::UNAUTHORIZED).await;
    let forwarder = forwarder(closed_url(), &influx.url);

    let err = forwarder
        .handle_snapshot(&StatusSnapshot::default())
        .await
        .unwrap_err();

    match err {
        InfluxError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("unauthorized"));
        }
        other => panic!("expected status error, got {other}"),
    }
}

#[tokio::test]
async fn test_failed_batch_is_not_resent() {
    let influx = Influx::start(StatusCode::INTERNAL_SERVER_ERROR).await;
    let forwarder = forwarder(closed_url(), &influx.url);

    assert!(forwarder.handle_snapshot(&StatusSnapshot::default()).await.is_err());
    assert!(forwarder.handle_snapshot(&StatusSnapshot::default()).await.is_err());

    let writes = influx.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[1].body.lines().count(), 2);
}

#[tokio::test]
async fn test_unreachable_sink_is_error() {
    let upstream = Upstream::start(0, SUMMARY_JSON).await;
    let forwarder = forwarder(upstream.url.clone(), &closed_url());

    let err = forwarder.run_once().await.unwrap_err();
    assert!(matches!(err, ForwardError::Sink(InfluxError::Http(_))), "got {err}");
}

#[tokio::test]
async fn test_fetch_failure_skips_write() {
    let upstream = Upstream::start(1, SUMMARY_JSON).await;
    let influx = Influx::start(StatusCode::NO_CONTENT).await;
    let forwarder = forwarder(upstream.url.clone(), &influx.url);

    let err = forwarder.run_once().await.unwrap_err();
    assert!(matches!(err, ForwardError::Fetch(_)));
    assert!(influx.writes().is_empty());
}
