//! Metric family registry.
//!
//! Families are keyed by name in a `DashMap`; each family keeps its own
//! `DashMap` of series. Writers only touch the shard that holds their series
//! while resolving it, then update the series state directly.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{GenMetrError, Result};
use crate::metrics::descriptor::{MetricDescriptor, MetricKind};
use crate::metrics::encode::encode;
use crate::metrics::labels::LabelValues;
use crate::metrics::series::{CounterState, HistogramState, SeriesRef, SeriesState, StateSnapshot};

#[derive(Debug)]
struct MetricFamily {
    descriptor: MetricDescriptor,
    name: Arc<str>,
    bounds: Arc<[f64]>,
    series: DashMap<LabelValues, Arc<SeriesState>>,
}

impl MetricFamily {
    fn new(descriptor: MetricDescriptor) -> Self {
        Self {
            name: Arc::from(descriptor.name.as_str()),
            bounds: Arc::from(descriptor.buckets()),
            descriptor,
            series: DashMap::new(),
        }
    }

    fn series(&self, key: LabelValues) -> SeriesRef {
        if let Some(existing) = self.series.get(&key) {
            return SeriesRef::new(Arc::clone(&self.name), Arc::clone(existing.value()));
        }

        let state = self
            .series
            .entry(key)
            .or_insert_with(|| {
                Arc::new(match self.descriptor.kind {
                    MetricKind::Counter => SeriesState::Counter(CounterState::default()),
                    MetricKind::Histogram { .. } => {
                        SeriesState::Histogram(HistogramState::new(Arc::clone(&self.bounds)))
                    }
                })
            })
            .value()
            .clone();
        SeriesRef::new(Arc::clone(&self.name), state)
    }
}

/// Handle to a registered metric family. Re-registering an identical
/// descriptor returns a handle that compares equal to the first one.
#[derive(Debug, Clone)]
pub struct MetricHandle {
    family: Arc<MetricFamily>,
}

impl PartialEq for MetricHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.family, &other.family)
    }
}

impl Eq for MetricHandle {}

impl MetricHandle {
    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.family.descriptor
    }

    /// Resolve a series from positional label values.
    pub fn series(&self, values: &[&str]) -> Result<SeriesRef> {
        let key = LabelValues::from_values(&self.family.descriptor, values)?;
        Ok(self.family.series(key))
    }

    /// Resolve a series from name/value pairs in any order.
    pub fn series_with(&self, pairs: &[(&str, &str)]) -> Result<SeriesRef> {
        let key = LabelValues::from_pairs(&self.family.descriptor, pairs)?;
        Ok(self.family.series(key))
    }

    fn require_counter(&self) -> Result<()> {
        if matches!(self.family.descriptor.kind, MetricKind::Counter) {
            Ok(())
        } else {
            Err(self.kind_mismatch())
        }
    }

    fn require_histogram(&self) -> Result<()> {
        if matches!(self.family.descriptor.kind, MetricKind::Histogram { .. }) {
            Ok(())
        } else {
            Err(self.kind_mismatch())
        }
    }

    fn kind_mismatch(&self) -> GenMetrError {
        GenMetrError::KindMismatch {
            metric: self.family.descriptor.name.clone(),
        }
    }
}

/// Point-in-time view of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub labels: LabelValues,
    pub state: StateSnapshot,
}

/// Point-in-time view of one family, series sorted by label tuple.
#[derive(Debug, Clone)]
pub struct FamilySnapshot {
    pub descriptor: MetricDescriptor,
    pub series: Vec<SeriesSnapshot>,
}

/// Process-wide metric store. Create one at startup and share it by `Arc`.
#[derive(Debug, Default)]
pub struct Registry {
    families: DashMap<String, Arc<MetricFamily>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. Identical re-registration is a no-op that
    /// returns the existing handle; any other clash on the name is an error.
    pub fn register(&self, descriptor: MetricDescriptor) -> Result<MetricHandle> {
        descriptor.validate()?;

        match self.families.entry(descriptor.name.clone()) {
            Entry::Occupied(existing) => {
                if existing.get().descriptor == descriptor {
                    Ok(MetricHandle {
                        family: Arc::clone(existing.get()),
                    })
                } else {
                    Err(GenMetrError::AlreadyRegistered {
                        name: descriptor.name,
                    })
                }
            }
            Entry::Vacant(slot) => {
                tracing::debug!(
                    metric = %descriptor.name,
                    kind = descriptor.kind.as_str(),
                    labels = ?descriptor.label_names,
                    "metric registered"
                );
                let family = Arc::new(MetricFamily::new(descriptor));
                slot.insert(Arc::clone(&family));
                Ok(MetricHandle { family })
            }
        }
    }

    pub fn register_counter(&self, name: &str, help: &str, labels: &[&str]) -> Result<CounterVec> {
        let handle = self.register(MetricDescriptor::counter(name, help, labels))?;
        Ok(CounterVec { handle })
    }

    pub fn register_histogram(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
        buckets: &[f64],
    ) -> Result<HistogramVec> {
        let handle = self.register(MetricDescriptor::histogram(name, help, labels, buckets))?;
        Ok(HistogramVec { handle })
    }

    /// Resolve a series of a family registered on this registry.
    pub fn get_or_create_series(&self, handle: &MetricHandle, values: &[&str]) -> Result<SeriesRef> {
        self.owns(handle)?;
        handle.series(values)
    }

    pub fn get_or_create_series_with(
        &self,
        handle: &MetricHandle,
        pairs: &[(&str, &str)],
    ) -> Result<SeriesRef> {
        self.owns(handle)?;
        handle.series_with(pairs)
    }

    /// Families sorted by name, series sorted by label tuple. Each series is
    /// read atomically; the view across series is not one atomic cut.
    pub fn snapshot(&self) -> Vec<FamilySnapshot> {
        let mut families: Vec<Arc<MetricFamily>> =
            self.families.iter().map(|f| Arc::clone(f.value())).collect();
        families.sort_by(|a, b| a.descriptor.name.cmp(&b.descriptor.name));

        families
            .into_iter()
            .map(|family| {
                let mut live: Vec<(LabelValues, Arc<SeriesState>)> = family
                    .series
                    .iter()
                    .map(|s| (s.key().clone(), Arc::clone(s.value())))
                    .collect();
                live.sort_by(|a, b| a.0.cmp(&b.0));

                FamilySnapshot {
                    descriptor: family.descriptor.clone(),
                    series: live
                        .into_iter()
                        .map(|(labels, state)| SeriesSnapshot {
                            labels,
                            state: state.snapshot(),
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Render the current state in text exposition format.
    pub fn encode(&self) -> String {
        encode(&self.snapshot())
    }

    fn owns(&self, handle: &MetricHandle) -> Result<()> {
        match self.families.get(&handle.family.descriptor.name) {
            Some(f) if Arc::ptr_eq(f.value(), &handle.family) => Ok(()),
            _ => Err(GenMetrError::ForeignHandle {
                metric: handle.family.descriptor.name.clone(),
            }),
        }
    }
}

/// Counter family with positional label values.
#[derive(Debug, Clone)]
pub struct CounterVec {
    handle: MetricHandle,
}

impl CounterVec {
    pub fn from_handle(handle: MetricHandle) -> Result<Self> {
        handle.require_counter()?;
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &MetricHandle {
        &self.handle
    }

    pub fn with_label_values(&self, values: &[&str]) -> Result<SeriesRef> {
        self.handle.series(values)
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[&str]) -> Result<()> {
        self.add(values, 1.0)
    }

    pub fn add(&self, values: &[&str], amount: f64) -> Result<()> {
        self.handle.series(values)?.increment(amount)
    }
}

/// Histogram family with positional label values.
#[derive(Debug, Clone)]
pub struct HistogramVec {
    handle: MetricHandle,
}

impl HistogramVec {
    pub fn from_handle(handle: MetricHandle) -> Result<Self> {
        handle.require_histogram()?;
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &MetricHandle {
        &self.handle
    }

    pub fn with_label_values(&self, values: &[&str]) -> Result<SeriesRef> {
        self.handle.series(values)
    }

    pub fn observe(&self, values: &[&str], value: f64) -> Result<()> {
        self.handle.series(values)?.observe(value)
    }

    /// Observe a duration in seconds.
    pub fn observe_duration(&self, values: &[&str], elapsed: Duration) -> Result<()> {
        self.observe(values, elapsed.as_secs_f64())
    }
}
