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

//! Registry for managing metrics.

use crate::storage::{backend::MetricsBackend, memory_backend::InMemoryBackend};
use satchel_core::telemetry::{Metric, MetricId, MetricType, MetricsError, MetricsResult};
use std::sync::Arc;

/// Central registry for loader metrics.
///
/// Components register their metrics once and keep the returned handles;
/// hosts read values back through the registry. Registering the same id twice
/// returns a handle to the existing metric, so several caches can share one
/// registry.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    backend: Arc<dyn MetricsBackend>,
}

impl MetricsRegistry {
    /// Create a new metrics registry with the default in-memory backend
    pub fn new() -> Self {
        Self {
            backend: Arc::new(InMemoryBackend::new()),
        }
    }

    /// Create a new metrics registry with a custom backend
    pub fn with_backend(backend: Arc<dyn MetricsBackend>) -> Self {
        Self { backend }
    }

    /// Register a counter metric
    pub fn register_counter(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> MetricsResult<CounterHandle> {
        let id = MetricId::new(namespace, name);
        self.backend.register(Metric::counter(id.clone(), description))?;
        Ok(CounterHandle::new(id, self.backend.clone()))
    }

    /// Register a gauge metric
    pub fn register_gauge(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
    ) -> MetricsResult<GaugeHandle> {
        let id = MetricId::new(namespace, name);
        self.backend
            .register(Metric::gauge(id.clone(), description, unit))?;
        Ok(GaugeHandle::new(id, self.backend.clone()))
    }

    /// Register a histogram metric
    pub fn register_histogram(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        buckets: Vec<f64>,
    ) -> MetricsResult<HistogramHandle> {
        let id = MetricId::new(namespace, name);
        self.backend
            .register(Metric::histogram(id.clone(), description, unit, buckets))?;
        Ok(HistogramHandle::new(id, self.backend.clone()))
    }

    /// Get a metric by ID
    pub fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        self.backend.get_metric(id)
    }

    /// Current value of the counter `namespace:name`.
    pub fn counter_value(&self, namespace: &str, name: &str) -> MetricsResult<u64> {
        let metric = self.get_metric(&MetricId::new(namespace, name))?;
        metric
            .value
            .as_counter()
            .ok_or_else(|| MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: metric.value.metric_type(),
            })
    }

    /// Current value of the gauge `namespace:name`.
    pub fn gauge_value(&self, namespace: &str, name: &str) -> MetricsResult<f64> {
        let metric = self.get_metric(&MetricId::new(namespace, name))?;
        metric
            .value
            .as_gauge()
            .ok_or_else(|| MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: metric.value.metric_type(),
            })
    }

    /// Get all metrics in a namespace
    pub fn get_namespace_metrics(&self, namespace: &str) -> Vec<Metric> {
        if let Some(memory_backend) = self
            .backend
            .as_ref()
            .as_any()
            .downcast_ref::<InMemoryBackend>()
        {
            memory_backend.get_metrics_by_namespace(namespace)
        } else {
            self.backend
                .list_all_metrics()
                .into_iter()
                .filter(|m| m.id.namespace == namespace)
                .collect()
        }
    }

    /// Logs every metric of `namespace` at info level, sorted by name.
    pub fn log_namespace(&self, namespace: &str) {
        let mut metrics = self.get_namespace_metrics(namespace);
        metrics.sort_by(|a, b| a.id.name.cmp(&b.id.name));
        log::info!("--- Metrics [{namespace}] ---");
        for metric in metrics {
            log::info!("  {}: {:?} ({})", metric.id.name, metric.value, metric.unit);
        }
    }

    /// Get the total number of metrics
    pub fn metric_count(&self) -> usize {
        self.backend.metric_count()
    }

    /// Clear all metrics
    pub fn clear_all(&self) -> MetricsResult<()> {
        self.backend.clear_all()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for counter operations
#[derive(Debug, Clone)]
pub struct CounterHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl CounterHandle {
    fn new(id: MetricId, backend: Arc<dyn MetricsBackend>) -> Self {
        Self { id, backend }
    }

    /// Increment the counter by 1
    pub fn increment(&self) -> MetricsResult<u64> {
        self.backend.increment_counter(&self.id, 1)
    }

    /// Increment the counter by a specific amount
    pub fn increment_by(&self, amount: u64) -> MetricsResult<u64> {
        self.backend.increment_counter(&self.id, amount)
    }

    /// Get the current counter value
    pub fn get(&self) -> MetricsResult<u64> {
        let metric = self.backend.get_metric(&self.id)?;
        metric
            .value
            .as_counter()
            .ok_or_else(|| MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: metric.value.metric_type(),
            })
    }

    /// Get the metric ID
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle for gauge operations
#[derive(Debug, Clone)]
pub struct GaugeHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl GaugeHandle {
    fn new(id: MetricId, backend: Arc<dyn MetricsBackend>) -> Self {
        Self { id, backend }
    }

    /// Set the gauge to a specific value
    pub fn set(&self, value: f64) -> MetricsResult<()> {
        self.backend.set_gauge(&self.id, value)
    }

    /// Add `delta` (possibly negative) to the gauge
    pub fn add(&self, delta: f64) -> MetricsResult<f64> {
        self.backend.add_to_gauge(&self.id, delta)
    }

    /// Get the current gauge value
    pub fn get(&self) -> MetricsResult<f64> {
        let metric = self.backend.get_metric(&self.id)?;
        metric
            .value
            .as_gauge()
            .ok_or_else(|| MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: metric.value.metric_type(),
            })
    }

    /// Get the metric ID
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle for histogram operations
#[derive(Debug, Clone)]
pub struct HistogramHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl HistogramHandle {
    fn new(id: MetricId, backend: Arc<dyn MetricsBackend>) -> Self {
        Self { id, backend }
    }

    /// Record a sample in the histogram
    pub fn observe(&self, value: f64) -> MetricsResult<()> {
        self.backend.record_histogram_sample(&self.id, value)
    }

    /// Get the full histogram metric
    pub fn get_metric(&self) -> MetricsResult<Metric> {
        self.backend.get_metric(&self.id)
    }

    /// Get the metric ID
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.metric_count(), 0);
    }

    #[test]
    fn test_counter_registration_and_operations() {
        let registry = MetricsRegistry::new();

        let reads = registry
            .register_counter("bundles", "reads", "Bundle files read from disk")
            .unwrap();

        assert_eq!(reads.increment().unwrap(), 1);
        assert_eq!(reads.increment_by(4).unwrap(), 5);
        assert_eq!(reads.get().unwrap(), 5);
        assert_eq!(registry.counter_value("bundles", "reads").unwrap(), 5);
    }

    #[test]
    fn test_registries_over_one_backend_see_the_same_metrics() {
        let backend = Arc::new(InMemoryBackend::new());
        let writer = MetricsRegistry::with_backend(backend.clone());
        let reader = MetricsRegistry::with_backend(backend.clone());

        let loads = writer
            .register_counter("bundles", "loads", "Bundles loaded")
            .unwrap();
        loads.increment_by(2).unwrap();

        assert_eq!(reader.counter_value("bundles", "loads").unwrap(), 2);
        assert_eq!(backend.get_metrics_by_namespace("bundles").len(), 1);
    }

    #[test]
    fn test_re_registration_shares_the_metric() {
        let registry = MetricsRegistry::new();

        let first = registry
            .register_counter("bundles", "evictions", "Bundles evicted")
            .unwrap();
        first.increment().unwrap();
        let second = registry
            .register_counter("bundles", "evictions", "Bundles evicted")
            .unwrap();
        second.increment().unwrap();

        assert_eq!(first.get().unwrap(), 2);
        assert_eq!(registry.metric_count(), 1);
    }

    #[test]
    fn test_gauge_registration_and_operations() {
        let registry = MetricsRegistry::new();

        let resident = registry
            .register_gauge("bundles", "resident", "Bundles currently cached", "bundles")
            .unwrap();

        resident.set(3.0).unwrap();
        assert_eq!(resident.add(1.0).unwrap(), 4.0);
        assert_eq!(resident.add(-4.0).unwrap(), 0.0);
        assert_eq!(registry.gauge_value("bundles", "resident").unwrap(), 0.0);
    }

    #[test]
    fn test_histogram_registration_and_operations() {
        let registry = MetricsRegistry::new();

        let load_time = registry
            .register_histogram(
                "bundles",
                "load_time",
                "Bundle load time",
                "ms",
                vec![1.0, 10.0, 100.0],
            )
            .unwrap();

        load_time.observe(2.5).unwrap();
        load_time.observe(75.0).unwrap();

        assert_eq!(load_time.get_metric().unwrap().value.sample_count(), Some(2));
    }

    #[test]
    fn test_namespace_filtering() {
        let registry = MetricsRegistry::new();

        registry.register_counter("bundles", "reads", "Reads").unwrap();
        registry.register_counter("bundles", "decodes", "Decodes").unwrap();
        registry
            .register_counter("assets", "loaded_total", "Assets decoded")
            .unwrap();

        assert_eq!(registry.get_namespace_metrics("bundles").len(), 2);
        assert_eq!(registry.get_namespace_metrics("assets").len(), 1);
        assert!(registry.get_namespace_metrics("renderer").is_empty());
    }

    #[test]
    fn test_counter_value_of_unknown_metric() {
        let registry = MetricsRegistry::new();
        assert!(matches!(
            registry.counter_value("bundles", "missing"),
            Err(MetricsError::MetricNotFound(_))
        ));
    }
}
