//! Label-keyed metric store.
//!
//! A [`Registry`] owns metric families; each family owns its series, created
//! lazily per label tuple and kept for the life of the process. Series state
//! is synchronised per series, so updates to unrelated series never contend.

pub mod descriptor;
pub mod encode;
pub mod labels;
pub mod registry;
pub mod series;

pub use descriptor::{MetricDescriptor, MetricKind, DEFAULT_BUCKETS};
pub use encode::{encode, CONTENT_TYPE};
pub use labels::LabelValues;
pub use registry::{CounterVec, FamilySnapshot, HistogramVec, MetricHandle, Registry, SeriesSnapshot};
pub use series::{SeriesRef, StateSnapshot};
