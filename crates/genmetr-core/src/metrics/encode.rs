//! Prometheus text exposition (format 0.0.4).
//!
//! Output depends only on the snapshot: families arrive sorted by name and
//! series by label tuple, so identical state always renders identical bytes.

use std::fmt::Write;

use crate::metrics::descriptor::{MetricDescriptor, BUCKET_LABEL};
use crate::metrics::labels::LabelValues;
use crate::metrics::registry::FamilySnapshot;
use crate::metrics::series::StateSnapshot;

/// `Content-Type` for the scrape response.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub fn encode(families: &[FamilySnapshot]) -> String {
    let mut out = String::new();
    for family in families {
        let d = &family.descriptor;
        let _ = writeln!(out, "# HELP {} {}", d.name, escape_help(&d.help));
        let _ = writeln!(out, "# TYPE {} {}", d.name, d.kind.as_str());

        for series in &family.series {
            match &series.state {
                StateSnapshot::Counter(value) => {
                    write_sample(&mut out, &d.name, "", d, &series.labels, None, *value);
                }
                StateSnapshot::Histogram {
                    buckets,
                    count,
                    sum,
                } => {
                    for (bound, cumulative) in buckets {
                        let le = format_value(*bound);
                        write_sample(
                            &mut out,
                            &d.name,
                            "_bucket",
                            d,
                            &series.labels,
                            Some(&le),
                            *cumulative as f64,
                        );
                    }
                    write_sample(&mut out, &d.name, "_sum", d, &series.labels, None, *sum);
                    write_sample(
                        &mut out,
                        &d.name,
                        "_count",
                        d,
                        &series.labels,
                        None,
                        *count as f64,
                    );
                }
            }
        }
    }
    out
}

fn write_sample(
    out: &mut String,
    name: &str,
    suffix: &str,
    descriptor: &MetricDescriptor,
    labels: &LabelValues,
    le: Option<&str>,
    value: f64,
) {
    out.push_str(name);
    out.push_str(suffix);

    let mut pairs = labels.pairs(descriptor).chain(le.map(|b| (BUCKET_LABEL, b)));
    if let Some((k, v)) = pairs.next() {
        let _ = write!(out, "{{{k}=\"{}\"", escape_label(v));
        for (k, v) in pairs {
            let _ = write!(out, ",{k}=\"{}\"", escape_label(v));
        }
        out.push('}');
    }

    let _ = writeln!(out, " {}", format_value(value));
}

/// Finite values use the shortest round-trip form (`2`, `0.05`).
fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}
