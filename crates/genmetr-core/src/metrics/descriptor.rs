//! Metric identity: name, kind, help text and declared label names.

use crate::error::{GenMetrError, Result};

/// Default duration buckets, in seconds.
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Reserved label carrying a histogram bucket's upper bound.
pub(crate) const BUCKET_LABEL: &str = "le";

#[derive(Debug, Clone, PartialEq)]
pub enum MetricKind {
    Counter,
    /// Finite, strictly increasing upper bounds. `+Inf` is implicit.
    Histogram { buckets: Vec<f64> },
}

impl MetricKind {
    /// Token used on the `# TYPE` line.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Histogram { .. } => "histogram",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
}

impl MetricDescriptor {
    pub fn counter(name: &str, help: &str, label_names: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            kind: MetricKind::Counter,
            label_names: label_names.iter().map(|l| (*l).to_string()).collect(),
        }
    }

    /// A trailing `+Inf` bound is dropped here; it is always rendered anyway.
    pub fn histogram(name: &str, help: &str, label_names: &[&str], buckets: &[f64]) -> Self {
        let mut buckets = buckets.to_vec();
        if buckets.last().is_some_and(|b| *b == f64::INFINITY) {
            buckets.pop();
        }
        Self {
            name: name.to_string(),
            help: help.to_string(),
            kind: MetricKind::Histogram { buckets },
            label_names: label_names.iter().map(|l| (*l).to_string()).collect(),
        }
    }

    pub fn buckets(&self) -> &[f64] {
        match &self.kind {
            MetricKind::Histogram { buckets } => buckets,
            MetricKind::Counter => &[],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_metric_name(&self.name) {
            return Err(GenMetrError::InvalidDescriptor(format!(
                "metric name {:?} must match [a-zA-Z_:][a-zA-Z0-9_:]*",
                self.name
            )));
        }

        for (i, label) in self.label_names.iter().enumerate() {
            if !is_label_name(label) || label.starts_with("__") {
                return Err(GenMetrError::InvalidDescriptor(format!(
                    "{}: label name {:?} is not allowed",
                    self.name, label
                )));
            }
            if self.label_names[..i].contains(label) {
                return Err(GenMetrError::InvalidDescriptor(format!(
                    "{}: duplicate label name {:?}",
                    self.name, label
                )));
            }
        }

        if let MetricKind::Histogram { buckets } = &self.kind {
            if self.label_names.iter().any(|l| l == BUCKET_LABEL) {
                return Err(GenMetrError::InvalidDescriptor(format!(
                    "{}: histograms may not declare an {BUCKET_LABEL:?} label",
                    self.name
                )));
            }
            validate_buckets(buckets)
                .map_err(|e| GenMetrError::InvalidDescriptor(format!("{}: {e}", self.name)))?;
        }

        Ok(())
    }
}

/// Checks a bucket list: non-empty, finite, strictly increasing.
pub fn validate_buckets(buckets: &[f64]) -> std::result::Result<(), String> {
    if buckets.is_empty() {
        return Err("histogram needs at least one bucket".into());
    }
    if let Some(b) = buckets.iter().find(|b| !b.is_finite()) {
        return Err(format!("bucket bound {b} is not finite"));
    }
    if buckets.windows(2).any(|w| w[0] >= w[1]) {
        return Err("bucket bounds must be strictly increasing".into());
    }
    Ok(())
}

fn is_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
