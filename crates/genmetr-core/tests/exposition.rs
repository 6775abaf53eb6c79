#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use genmetr_core::Registry;

#[test]
fn renders_counter_and_histogram() {
    let reg = Registry::new();
    let c = reg
        .register_counter("http_requests_total", "Total number of HTTP requests", &["method", "route", "status"])
        .unwrap();
    c.inc(&["GET", "/x", "OK"]).unwrap();
    c.inc(&["GET", "/x", "OK"]).unwrap();

    let h = reg.register_histogram("job_seconds", "Job time", &[], &[0.1, 1.0]).unwrap();
    h.observe(&[], 0.05).unwrap();

    let text = reg.encode();
    assert!(text.contains("http_requests_total{method=\"GET\",route=\"/x\",status=\"OK\"} 2\n"));
    assert!(text.contains("job_seconds_count 1\n"));
    assert!(text.contains("job_seconds_sum 0.05\n"));

    let expected = "\
# HELP http_requests_total Total number of HTTP requests
# TYPE http_requests_total counter
http_requests_total{method=\"GET\",route=\"/x\",status=\"OK\"} 2
# HELP job_seconds Job time
# TYPE job_seconds histogram
job_seconds_bucket{le=\"0.1\"} 1
job_seconds_bucket{le=\"1\"} 1
job_seconds_bucket{le=\"+Inf\"} 1
job_seconds_sum 0.05
job_seconds_count 1
";
    assert_eq!(text, expected);
}

#[test]
fn labelled_histogram_puts_le_last() {
    let reg = Registry::new();
    let h = reg
        .register_histogram("http_request_duration_seconds", "d", &["method", "route"], &[0.25, 2.5])
        .unwrap();
    h.observe(&["GET", "/x"], 0.05).unwrap();

    let text = reg.encode();
    assert!(text.contains(
        "http_request_duration_seconds_bucket{method=\"GET\",route=\"/x\",le=\"0.25\"} 1\n"
    ));
    assert!(text.contains(
        "http_request_duration_seconds_bucket{method=\"GET\",route=\"/x\",le=\"2.5\"} 1\n"
    ));
    assert!(text.contains("http_request_duration_seconds_sum{method=\"GET\",route=\"/x\"} 0.05\n"));
    assert!(text.contains("http_request_duration_seconds_count{method=\"GET\",route=\"/x\"} 1\n"));
}

#[test]
fn output_is_sorted_and_stable() {
    let build = |order: &[&str]| {
        let reg = Registry::new();
        let b = reg.register_counter("b_total", "b", &["k"]).unwrap();
        let a = reg.register_counter("a_total", "a", &["k"]).unwrap();
        for k in order {
            b.inc(&[*k]).unwrap();
            a.inc(&[*k]).unwrap();
        }
        reg.encode()
    };

    let first = build(&["z", "m", "a"]);
    let second = build(&["a", "z", "m"]);
    assert_eq!(first, second);

    let a_pos = first.find("# HELP a_total").unwrap();
    let b_pos = first.find("# HELP b_total").unwrap();
    assert!(a_pos < b_pos);

    let lines: Vec<&str> = first.lines().filter(|l| l.starts_with("a_total{")).collect();
    assert_eq!(
        lines,
        vec!["a_total{k=\"a\"} 1", "a_total{k=\"m\"} 1", "a_total{k=\"z\"} 1"]
    );
}

#[test]
fn family_without_series_still_has_header() {
    let reg = Registry::new();
    reg.register_counter("idle_total", "Nothing yet", &["k"]).unwrap();
    assert_eq!(
        reg.encode(),
        "# HELP idle_total Nothing yet\n# TYPE idle_total counter\n"
    );
}

#[test]
fn escapes_help_and_label_values() {
    let reg = Registry::new();
    let c = reg
        .register_counter("esc_total", "line one\nback\\slash", &["v"])
        .unwrap();
    c.inc(&["say \"hi\"\n\\"]).unwrap();

    let text = reg.encode();
    assert!(text.contains("# HELP esc_total line one\\nback\\\\slash\n"));
    assert!(text.contains("esc_total{v=\"say \\\"hi\\\"\\n\\\\\"} 1\n"));
}

#[test]
fn fractional_counter_values() {
    let reg = Registry::new();
    let c = reg.register_counter("bytes_total", "b", &[]).unwrap();
    c.add(&[], 1.5).unwrap();
    assert!(reg.encode().contains("bytes_total 1.5\n"));
}
