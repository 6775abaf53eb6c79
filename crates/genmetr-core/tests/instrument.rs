#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use genmetr_core::instrument::status_label;
use genmetr_core::{HttpMetrics, HttpMetricsOptions, Registry};

fn setup() -> (Registry, HttpMetrics) {
    let reg = Registry::new();
    let m = HttpMetrics::register(&reg, &HttpMetricsOptions::default()).unwrap();
    (reg, m)
}

#[test]
fn status_labels_use_reason_phrase() {
    assert_eq!(status_label(200), "OK");
    assert_eq!(status_label(404), "Not Found");
    assert_eq!(status_label(503), "Service Unavailable");
    assert_eq!(status_label(599), "599");
}

#[test]
fn registering_twice_is_idempotent() {
    let (reg, _m) = setup();
    HttpMetrics::register(&reg, &HttpMetricsOptions::default()).expect("idempotent");

    let other = HttpMetricsOptions {
        duration_buckets: vec![1.0, 2.0],
        ..Default::default()
    };
    let err = HttpMetrics::register(&reg, &other).err().expect("bucket clash");
    assert_eq!(err.code(), "ALREADY_REGISTERED");
}

#[test]
fn not_found_counts_as_error_and_success_does_not() {
    let (reg, m) = setup();

    let out = m.instrument("GET", "/health", || 200u16);
    assert_eq!(out, 200);
    let out = m.instrument("GET", "/users/:id", || 404u16);
    assert_eq!(out, 404);

    let text = reg.encode();
    assert!(text.contains(
        "http_requests_total{method=\"GET\",route=\"/users/:id\",status=\"Not Found\"} 1\n"
    ));
    assert!(text.contains(
        "http_errors_total{method=\"GET\",route=\"/users/:id\",status=\"Not Found\"} 1\n"
    ));
    assert!(text.contains(
        "http_requests_total{method=\"GET\",route=\"/health\",status=\"OK\"} 1\n"
    ));
    assert!(!text.contains("http_errors_total{method=\"GET\",route=\"/health\""));
}

#[test]
fn panicking_handler_is_recorded_and_propagates() {
    let (reg, m) = setup();

    let caught = catch_unwind(AssertUnwindSafe(|| {
        m.instrument("POST", "/boom", || -> u16 { panic!("handler fault") })
    }));
    assert!(caught.is_err());

    let text = reg.encode();
    assert!(text.contains("http_request_duration_seconds_count{method=\"POST\",route=\"/boom\"} 1\n"));
    assert!(text.contains(
        "http_requests_total{method=\"POST\",route=\"/boom\",status=\"Internal Server Error\"} 1\n"
    ));
    assert!(text.contains(
        "http_errors_total{method=\"POST\",route=\"/boom\",status=\"Internal Server Error\"} 1\n"
    ));
}

#[test]
fn error_result_is_returned_unchanged_and_counted_as_500() {
    let (reg, m) = setup();
    let out: Result<u16, &str> = m.instrument("GET", "/x", || Err("nope"));
    assert_eq!(out, Err("nope"));
    assert!(reg.encode().contains(
        "http_errors_total{method=\"GET\",route=\"/x\",status=\"Internal Server Error\"} 1\n"
    ));
}

#[test]
fn guard_records_once() {
    let (reg, m) = setup();
    let guard = m.start("GET", "/once");
    guard.finish(201);

    let text = reg.encode();
    assert!(text.contains("http_requests_total{method=\"GET\",route=\"/once\",status=\"Created\"} 1\n"));
    assert!(text.contains("http_request_duration_seconds_count{method=\"GET\",route=\"/once\"} 1\n"));
    assert!(!text.contains("Internal Server Error"));
}

#[test]
fn empty_route_uses_unmatched_label() {
    let (reg, m) = setup();
    let guard = m.start("GET", "");
    assert_eq!(guard.route(), "unmatched");
    guard.finish(404);
    assert!(reg.encode().contains(
        "http_requests_total{method=\"GET\",route=\"unmatched\",status=\"Not Found\"} 1\n"
    ));
}

#[test]
fn record_observes_elapsed_seconds() {
    let (reg, m) = setup();
    m.record("GET", "/x", 200, Duration::from_millis(50)).unwrap();
    let text = reg.encode();
    assert!(text.contains("http_request_duration_seconds_sum{method=\"GET\",route=\"/x\"} 0.05\n"));
    assert!(text.contains("http_request_duration_seconds_bucket{method=\"GET\",route=\"/x\",le=\"0.025\"} 0\n"));
    assert!(text.contains("http_request_duration_seconds_bucket{method=\"GET\",route=\"/x\",le=\"0.05\"} 1\n"));
}

#[tokio::test]
async fn async_result_is_returned_unchanged() {
    let (reg, m) = setup();
    let out: Result<u16, &str> = m.instrument_async("GET", "/health", async { Ok(200) }).await;
    assert_eq!(out, Ok(200));
    assert!(reg.encode().contains(
        "http_requests_total{method=\"GET\",route=\"/health\",status=\"OK\"} 1\n"
    ));
}

#[tokio::test]
async fn async_not_found_counts_as_error() {
    let (reg, m) = setup();
    let out = m.instrument_async("GET", "/users/:id", async { 404u16 }).await;
    assert_eq!(out, 404);

    let text = reg.encode();
    assert!(text.contains(
        "http_errors_total{method=\"GET\",route=\"/users/:id\",status=\"Not Found\"} 1\n"
    ));
    assert!(text.contains("http_request_duration_seconds_count{method=\"GET\",route=\"/users/:id\"} 1\n"));
}

#[tokio::test]
async fn async_cancelled_mid_flight_records_fallback() {
    let (reg, m) = setup();
    let slow = m.instrument_async("GET", "/slow", async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        200u16
    });
    let res = tokio::time::timeout(Duration::from_millis(10), slow).await;
    assert!(res.is_err(), "request should have timed out");

    let text = reg.encode();
    assert!(text.contains(
        "http_requests_total{method=\"GET\",route=\"/slow\",status=\"Internal Server Error\"} 1\n"
    ));
    assert!(text.contains("http_request_duration_seconds_count{method=\"GET\",route=\"/slow\"} 1\n"));
}

#[test]
fn async_dropped_before_poll_is_still_recorded() {
    let (reg, m) = setup();
    let never = m.instrument_async("GET", "/never", async { 200u16 });
    drop(never);

    let text = reg.encode();
    assert!(text.contains(
        "http_requests_total{method=\"GET\",route=\"/never\",status=\"Internal Server Error\"} 1\n"
    ));
    assert!(!text.contains("route=\"/never\",status=\"OK\""));
}
