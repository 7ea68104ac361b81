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

//! In-memory metrics backend.

use super::backend::MetricsBackend;
use satchel_core::telemetry::{Metric, MetricId, MetricValue, MetricsError, MetricsResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// Keeps every metric in a `HashMap` behind a `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    storage: RwLock<HashMap<MetricId, Metric>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every metric in `namespace`.
    pub fn get_metrics_by_namespace(&self, namespace: &str) -> Vec<Metric> {
        match self.storage.read() {
            Ok(storage) => storage
                .values()
                .filter(|metric| metric.id.namespace == namespace)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn poisoned(_: impl std::fmt::Debug) -> MetricsError {
    MetricsError::StorageError("metrics storage lock poisoned".to_string())
}

impl MetricsBackend for InMemoryBackend {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn register(&self, metric: Metric) -> MetricsResult<()> {
        let mut storage = self.storage.write().map_err(poisoned)?;

        match storage.get(&metric.id) {
            Some(existing) if existing.value.metric_type() == metric.value.metric_type() => Ok(()),
            Some(_) => Err(MetricsError::AlreadyRegistered(metric.id)),
            None => {
                storage.insert(metric.id.clone(), metric);
                Ok(())
            }
        }
    }

    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        let storage = self.storage.read().map_err(poisoned)?;
        storage
            .get(id)
            .cloned()
            .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))
    }

    fn update(
        &self,
        id: &MetricId,
        apply: &mut dyn FnMut(&mut MetricValue) -> MetricsResult<()>,
    ) -> MetricsResult<()> {
        let mut storage = self.storage.write().map_err(poisoned)?;
        let metric = storage
            .get_mut(id)
            .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))?;
        apply(&mut metric.value)?;
        metric.touch();
        Ok(())
    }

    fn list_all_metrics(&self) -> Vec<Metric> {
        match self.storage.read() {
            Ok(storage) => storage.values().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn clear_all(&self) -> MetricsResult<()> {
        self.storage.write().map_err(poisoned)?.clear();
        Ok(())
    }

    fn metric_count(&self) -> usize {
        self.storage.read().map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::telemetry::MetricType;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_register_is_idempotent_per_type() {
        let backend = InMemoryBackend::new();
        let id = MetricId::new("bundles", "reads");

        backend.register(Metric::counter(id.clone(), "Disk reads")).unwrap();
        backend.increment_counter(&id, 2).unwrap();
        backend.register(Metric::counter(id.clone(), "Disk reads")).unwrap();

        assert_eq!(backend.get_metric(&id).unwrap().value.as_counter(), Some(2));
        assert_eq!(
            backend.register(Metric::gauge(id.clone(), "Disk reads", "count")),
            Err(MetricsError::AlreadyRegistered(id))
        );
    }

    #[test]
    fn test_type_mismatch() {
        let backend = InMemoryBackend::new();
        let id = MetricId::new("bundles", "resident");
        backend
            .register(Metric::gauge(id.clone(), "Resident bundles", "bundles"))
            .unwrap();

        assert_eq!(
            backend.increment_counter(&id, 1),
            Err(MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: MetricType::Gauge,
            })
        );
    }

    #[test]
    fn test_histogram_buckets() {
        let backend = InMemoryBackend::new();
        let id = MetricId::new("bundles", "load_time");
        backend
            .register(Metric::histogram(id.clone(), "Load time", "ms", vec![1.0, 10.0]))
            .unwrap();

        for sample in [0.5, 5.0, 50.0] {
            backend.record_histogram_sample(&id, sample).unwrap();
        }

        match backend.get_metric(&id).unwrap().value {
            MetricValue::Histogram {
                count,
                sum,
                bucket_counts,
                ..
            } => {
                assert_eq!(count, 3);
                assert_eq!(sum, 55.5);
                assert_eq!(bucket_counts, vec![1, 1]);
            }
            other => panic!("Expected histogram, got {other:?}"),
        }
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let backend = Arc::new(InMemoryBackend::new());
        let id = MetricId::new("bundles", "cache_hits");
        backend.register(Metric::counter(id.clone(), "Hits")).unwrap();

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let backend = backend.clone();
                let id = id.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        backend.increment_counter(&id, 1).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(backend.get_metric(&id).unwrap().value.as_counter(), Some(800));
    }

    #[test]
    fn test_namespace_filter_and_clear() {
        let backend = InMemoryBackend::new();
        backend
            .register(Metric::counter(MetricId::new("bundles", "reads"), "Reads"))
            .unwrap();
        backend
            .register(Metric::counter(MetricId::new("assets", "loaded_total"), "Loaded"))
            .unwrap();

        assert_eq!(backend.get_metrics_by_namespace("bundles").len(), 1);
        assert_eq!(backend.metric_count(), 2);

        backend.clear_all().unwrap();
        assert_eq!(backend.metric_count(), 0);
    }
}
