//! Label tuples.
//!
//! Label values are stored positionally, in the order the descriptor declared
//! its label names. Validation happens once, when a series is resolved.

use crate::error::{GenMetrError, Result};
use crate::metrics::descriptor::MetricDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelValues(Box<[String]>);

impl LabelValues {
    /// Build from positional values; the count must match the declaration.
    pub fn from_values(descriptor: &MetricDescriptor, values: &[&str]) -> Result<Self> {
        let expected = descriptor.label_names.len();
        if values.len() != expected {
            return Err(GenMetrError::LabelMismatch {
                metric: descriptor.name.clone(),
                expected,
                got: values.len(),
            });
        }
        Ok(Self(values.iter().map(|v| (*v).to_string()).collect()))
    }

    /// Build from name/value pairs in any order. Every declared name must be
    /// given exactly once and no undeclared name may appear.
    pub fn from_pairs(descriptor: &MetricDescriptor, pairs: &[(&str, &str)]) -> Result<Self> {
        let expected = descriptor.label_names.len();
        if pairs.len() != expected {
            return Err(GenMetrError::LabelMismatch {
                metric: descriptor.name.clone(),
                expected,
                got: pairs.len(),
            });
        }

        let mut values: Vec<Option<&str>> = vec![None; expected];
        for (name, value) in pairs {
            let slot = descriptor
                .label_names
                .iter()
                .position(|declared| declared == name)
                .and_then(|i| values.get_mut(i))
                .filter(|slot| slot.is_none())
                .ok_or_else(|| GenMetrError::UnknownLabel {
                    metric: descriptor.name.clone(),
                    label: (*name).to_string(),
                })?;
            *slot = Some(*value);
        }

        // Lengths match and no slot was filled twice, so every slot is set.
        Ok(Self(
            values
                .into_iter()
                .map(|v| v.unwrap_or_default().to_string())
                .collect(),
        ))
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Zip with the declared names, for rendering.
    pub fn pairs<'a>(
        &'a self,
        descriptor: &'a MetricDescriptor,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        descriptor
            .label_names
            .iter()
            .zip(self.0.iter())
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }
}
