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

use satchel_core::telemetry::{Metric, MetricId, MetricType, MetricValue, MetricsError, MetricsResult};
use std::fmt::Debug;

/// Interface of a metrics storage backend.
///
/// Writes go through [`MetricsBackend::update`], which must apply the closure
/// atomically with respect to other writers of the same metric. Concurrent
/// bundle loads bump the same counters, so read-modify-write outside the
/// backend's lock would lose increments.
pub trait MetricsBackend: Send + Sync + Debug + 'static {
    /// Get a reference to this object as Any for downcasting
    fn as_any(&self) -> &dyn std::any::Any;

    /// Stores `metric` unless one with the same id exists.
    ///
    /// Registering an existing id with the same type is a no-op that keeps the
    /// current value; a different type yields [`MetricsError::AlreadyRegistered`].
    fn register(&self, metric: Metric) -> MetricsResult<()>;

    /// Returns a snapshot of a metric.
    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric>;

    /// Applies `apply` to the stored value of `id` under the backend's lock.
    fn update(
        &self,
        id: &MetricId,
        apply: &mut dyn FnMut(&mut MetricValue) -> MetricsResult<()>,
    ) -> MetricsResult<()>;

    /// Returns a snapshot of every stored metric.
    fn list_all_metrics(&self) -> Vec<Metric>;

    /// Removes every metric.
    fn clear_all(&self) -> MetricsResult<()>;

    /// Number of stored metrics.
    fn metric_count(&self) -> usize;

    /// Adds `delta` to a counter and returns the new value.
    fn increment_counter(&self, id: &MetricId, delta: u64) -> MetricsResult<u64> {
        let mut result = 0;
        self.update(id, &mut |value| match value {
            MetricValue::Counter(count) => {
                *count = count.saturating_add(delta);
                result = *count;
                Ok(())
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: other.metric_type(),
            }),
        })?;
        Ok(result)
    }

    /// Adds `delta` (possibly negative) to a gauge and returns the new value.
    fn add_to_gauge(&self, id: &MetricId, delta: f64) -> MetricsResult<f64> {
        let mut result = 0.0;
        self.update(id, &mut |value| match value {
            MetricValue::Gauge(current) => {
                *current += delta;
                result = *current;
                Ok(())
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: other.metric_type(),
            }),
        })?;
        Ok(result)
    }

    /// Overwrites a gauge.
    fn set_gauge(&self, id: &MetricId, new_value: f64) -> MetricsResult<()> {
        self.update(id, &mut |value| match value {
            MetricValue::Gauge(current) => {
                *current = new_value;
                Ok(())
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: other.metric_type(),
            }),
        })
    }

    /// Records one sample in a histogram.
    fn record_histogram_sample(&self, id: &MetricId, sample: f64) -> MetricsResult<()> {
        self.update(id, &mut |value| match value {
            MetricValue::Histogram {
                count,
                sum,
                bucket_bounds,
                bucket_counts,
            } => {
                *count += 1;
                *sum += sample;
                if let Some(bucket) = bucket_bounds.iter().position(|&bound| sample <= bound) {
                    bucket_counts[bucket] += 1;
                }
                Ok(())
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Histogram,
                found: other.metric_type(),
            }),
        })
    }
}
