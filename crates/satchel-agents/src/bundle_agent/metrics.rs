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

use satchel_core::telemetry::MetricsResult;
use satchel_telemetry::{CounterHandle, GaugeHandle, HistogramHandle, MetricsRegistry};

const NAMESPACE: &str = "bundles";

/// Metric handles owned by a [`BundleCache`](super::BundleCache).
pub(crate) struct CacheMetrics {
    pub(crate) cache_hits: CounterHandle,
    pub(crate) cache_misses: CounterHandle,
    pub(crate) coalesced_waits: CounterHandle,
    pub(crate) reads: CounterHandle,
    pub(crate) decodes: CounterHandle,
    pub(crate) load_failures: CounterHandle,
    pub(crate) evictions: CounterHandle,
    pub(crate) empty_extractions: CounterHandle,
    pub(crate) resident: GaugeHandle,
    pub(crate) load_time_ms: HistogramHandle,
}

impl CacheMetrics {
    pub(crate) fn new(registry: &MetricsRegistry) -> MetricsResult<Self> {
        let counter = |name: &str, description: &str| {
            registry.register_counter(NAMESPACE, name, description)
        };

        Ok(Self {
            cache_hits: counter("cache_hits", "Requests served from a resident bundle")?,
            cache_misses: counter("cache_misses", "Requests that started a load")?,
            coalesced_waits: counter(
                "coalesced_waits",
                "Requests that joined a load already in flight",
            )?,
            reads: counter("reads", "Bundle files read from disk")?,
            decodes: counter("decodes", "Bundle files handed to the decoder")?,
            load_failures: counter("load_failures", "Loads that ended in an error")?,
            evictions: counter("evictions", "Bundles released by unload or teardown")?,
            empty_extractions: counter(
                "empty_extractions",
                "Type queries that matched no asset in a loaded bundle",
            )?,
            resident: registry.register_gauge(
                NAMESPACE,
                "resident",
                "Bundles currently held by the cache",
                "bundles",
            )?,
            load_time_ms: registry.register_histogram(
                NAMESPACE,
                "load_time",
                "Time from cache miss to decoded bundle",
                "ms",
                vec![1.0, 5.0, 16.0, 50.0, 100.0, 500.0, 2000.0],
            )?,
        })
    }

    pub(crate) fn bump(counter: &CounterHandle) {
        if let Err(e) = counter.increment() {
            log::warn!("Failed to update metric {}: {e}", counter.id());
        }
    }

    pub(crate) fn set_resident(&self, count: usize) {
        if let Err(e) = self.resident.set(count as f64) {
            log::warn!("Failed to update metric {}: {e}", self.resident.id());
        }
    }
}
