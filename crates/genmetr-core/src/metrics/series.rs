//! Per-series accumulators.
//!
//! Counters are a single `f64` kept in an `AtomicU64` and updated with a CAS
//! loop. Histograms keep their cumulative buckets, count and sum behind one
//! short-lived mutex per series, so a reader never sees a bucket that
//! disagrees with the count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::{GenMetrError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum StateSnapshot {
    Counter(f64),
    /// `buckets` holds cumulative counts per bound and ends with `+Inf`.
    Histogram {
        buckets: Vec<(f64, u64)>,
        count: u64,
        sum: f64,
    },
}

#[derive(Debug)]
pub(crate) enum SeriesState {
    Counter(CounterState),
    Histogram(HistogramState),
}

impl SeriesState {
    pub(crate) fn snapshot(&self) -> StateSnapshot {
        match self {
            SeriesState::Counter(c) => StateSnapshot::Counter(c.get()),
            SeriesState::Histogram(h) => h.snapshot(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CounterState {
    bits: AtomicU64,
}

impl CounterState {
    fn add(&self, amount: f64) {
        // fetch_update only errs when the closure returns None.
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + amount).to_bits())
            });
    }

    fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

#[derive(Debug)]
pub(crate) struct HistogramState {
    bounds: Arc<[f64]>,
    cells: Mutex<HistogramCells>,
}

#[derive(Debug)]
struct HistogramCells {
    /// Cumulative: `buckets[i]` counts every observation `<= bounds[i]`.
    buckets: Vec<u64>,
    count: u64,
    sum: f64,
}

impl HistogramState {
    pub(crate) fn new(bounds: Arc<[f64]>) -> Self {
        let cells = HistogramCells {
            buckets: vec![0; bounds.len()],
            count: 0,
            sum: 0.0,
        };
        Self {
            bounds,
            cells: Mutex::new(cells),
        }
    }

    fn observe(&self, value: f64) {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.count += 1;
        cells.sum += value;
        for (bound, bucket) in self.bounds.iter().zip(cells.buckets.iter_mut()) {
            if value <= *bound {
                *bucket += 1;
            }
        }
    }

    fn snapshot(&self) -> StateSnapshot {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        let mut buckets: Vec<(f64, u64)> = self
            .bounds
            .iter()
            .copied()
            .zip(cells.buckets.iter().copied())
            .collect();
        buckets.push((f64::INFINITY, cells.count));
        StateSnapshot::Histogram {
            buckets,
            count: cells.count,
            sum: cells.sum,
        }
    }
}

/// Resolved handle to one series. Cloning is cheap; keep it around to skip
/// the label lookup on hot paths.
#[derive(Debug, Clone)]
pub struct SeriesRef {
    metric: Arc<str>,
    state: Arc<SeriesState>,
}

impl SeriesRef {
    pub(crate) fn new(metric: Arc<str>, state: Arc<SeriesState>) -> Self {
        Self { metric, state }
    }

    pub fn inc(&self) -> Result<()> {
        self.increment(1.0)
    }

    /// Add a non-negative, finite amount to a counter series.
    pub fn increment(&self, amount: f64) -> Result<()> {
        let SeriesState::Counter(counter) = self.state.as_ref() else {
            return Err(self.kind_mismatch());
        };
        if !amount.is_finite() || amount < 0.0 {
            return Err(GenMetrError::InvalidValue(format!(
                "{}: counter increment must be a non-negative finite number, got {amount}",
                self.metric
            )));
        }
        counter.add(amount);
        Ok(())
    }

    /// Record one observation on a histogram series.
    pub fn observe(&self, value: f64) -> Result<()> {
        let SeriesState::Histogram(histogram) = self.state.as_ref() else {
            return Err(self.kind_mismatch());
        };
        if value.is_nan() {
            return Err(GenMetrError::InvalidValue(format!(
                "{}: cannot observe NaN",
                self.metric
            )));
        }
        histogram.observe(value);
        Ok(())
    }

    pub fn observe_duration(&self, elapsed: Duration) -> Result<()> {
        self.observe(elapsed.as_secs_f64())
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    fn kind_mismatch(&self) -> GenMetrError {
        GenMetrError::KindMismatch {
            metric: self.metric.to_string(),
        }
    }
}
