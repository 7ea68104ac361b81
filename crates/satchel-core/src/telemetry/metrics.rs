// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Abstract definitions for loader metrics.

use std::fmt::{self, Display};
use std::time::Instant;

/// A unique identifier for a metric, made of a namespace and a name
/// (e.g. `bundles:cache_hits`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricId {
    /// The subsystem reporting the metric (e.g. "bundles", "assets").
    pub namespace: String,
    /// The metric's name within its namespace.
    pub name: String,
}

impl MetricId {
    /// Creates a new `MetricId`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// The fundamental type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// Monotonic count of events (e.g. disk reads).
    Counter,
    /// A value that can go up or down (e.g. resident bundles).
    Gauge,
    /// The distribution of a measurement (e.g. load time).
    Histogram,
}

/// The current value of a metric.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Value of a counter.
    Counter(u64),
    /// Value of a gauge.
    Gauge(f64),
    /// Aggregated histogram. Raw samples are not kept.
    Histogram {
        /// Number of recorded samples.
        count: u64,
        /// Sum of every recorded sample.
        sum: f64,
        /// Inclusive upper bounds of the buckets.
        bucket_bounds: Vec<f64>,
        /// Samples per bucket; samples above the last bound are only counted in `count`.
        bucket_counts: Vec<u64>,
    },
}

impl MetricValue {
    /// Returns the [`MetricType`] corresponding to this value.
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricValue::Counter(_) => MetricType::Counter,
            MetricValue::Gauge(_) => MetricType::Gauge,
            MetricValue::Histogram { .. } => MetricType::Histogram,
        }
    }

    /// Returns the value if this is a counter.
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            MetricValue::Counter(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value if this is a gauge.
    pub fn as_gauge(&self) -> Option<f64> {
        match self {
            MetricValue::Gauge(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the number of samples if this is a histogram.
    pub fn sample_count(&self) -> Option<u64> {
        match self {
            MetricValue::Histogram { count, .. } => Some(*count),
            _ => None,
        }
    }
}

/// A registered metric: its identity, description and current value.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric's identifier.
    pub id: MetricId,
    /// What the metric measures.
    pub description: String,
    /// Unit of measurement ("count", "ms", "bundles").
    pub unit: String,
    /// When the metric was last written.
    pub last_updated: Instant,
    /// The current value.
    pub value: MetricValue,
}

impl Metric {
    /// Creates a counter starting at zero.
    pub fn counter(id: MetricId, description: impl Into<String>) -> Self {
        Self::with_value(id, description, "count", MetricValue::Counter(0))
    }

    /// Creates a gauge starting at zero.
    pub fn gauge(id: MetricId, description: impl Into<String>, unit: impl Into<String>) -> Self {
        Self::with_value(id, description, unit, MetricValue::Gauge(0.0))
    }

    /// Creates an empty histogram with the given bucket bounds.
    pub fn histogram(
        id: MetricId,
        description: impl Into<String>,
        unit: impl Into<String>,
        bucket_bounds: Vec<f64>,
    ) -> Self {
        let bucket_counts = vec![0; bucket_bounds.len()];
        Self::with_value(
            id,
            description,
            unit,
            MetricValue::Histogram {
                count: 0,
                sum: 0.0,
                bucket_bounds,
                bucket_counts,
            },
        )
    }

    fn with_value(
        id: MetricId,
        description: impl Into<String>,
        unit: impl Into<String>,
        value: MetricValue,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            unit: unit.into(),
            last_updated: Instant::now(),
            value,
        }
    }

    /// Marks the metric as written now.
    pub fn touch(&mut self) {
        self.last_updated = Instant::now();
    }
}

/// A specialized `Result` type for metric operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// An error that can occur within the metrics system.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// The requested metric was never registered.
    MetricNotFound(MetricId),
    /// A metric with this identifier is already registered with another type.
    AlreadyRegistered(MetricId),
    /// The operation does not apply to the metric's type.
    TypeMismatch {
        /// The type the operation needs.
        expected: MetricType,
        /// The type the metric actually has.
        found: MetricType,
    },
    /// The storage layer failed (e.g. a poisoned lock).
    StorageError(String),
}

impl Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsError::MetricNotFound(id) => write!(f, "Metric not found: {id}"),
            MetricsError::AlreadyRegistered(id) => {
                write!(f, "Metric already registered with another type: {id}")
            }
            MetricsError::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {expected:?}, found {found:?}")
            }
            MetricsError::StorageError(msg) => write!(f, "Storage error: {msg}"),
        }
    }
}

impl std::error::Error for MetricsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_id_formatting() {
        let id = MetricId::new("bundles", "cache_hits");
        assert_eq!(id.to_string(), "bundles:cache_hits");
    }

    #[test]
    fn test_metric_constructors() {
        let counter = Metric::counter(MetricId::new("bundles", "reads"), "Disk reads");
        assert_eq!(counter.value.as_counter(), Some(0));
        assert_eq!(counter.unit, "count");

        let gauge = Metric::gauge(MetricId::new("bundles", "resident"), "Loaded", "bundles");
        assert_eq!(gauge.value.metric_type(), MetricType::Gauge);
        assert_eq!(gauge.value.as_counter(), None);

        let histogram = Metric::histogram(
            MetricId::new("bundles", "load_time"),
            "Load time",
            "ms",
            vec![1.0, 10.0],
        );
        assert_eq!(histogram.value.sample_count(), Some(0));
    }
}
