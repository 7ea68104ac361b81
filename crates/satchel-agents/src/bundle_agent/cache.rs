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

//! The bundle cache: load coalescing, residency and eviction.

use super::metrics::CacheMetrics;
use satchel_core::{
    bundle::{ArchiveDecoder, BundleArchive, BundleHandle, BundleId, BundleLoadError},
    io::FileReader,
    platform::PathResolver,
    telemetry::MetricsResult,
};
use satchel_io::{BundleSettings, TokioFileReader};
use satchel_telemetry::{MetricsRegistry, ScopedMetricTimer};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::watch;

type LoadOutcome<B> = Result<BundleHandle<B>, BundleLoadError>;

/// Published once by the load task; `None` until then.
type LoadSlot<B> = watch::Receiver<Option<LoadOutcome<B>>>;

struct CacheEntry<B: BundleArchive> {
    id: BundleId,
    handle: BundleHandle<B>,
}

/// Everything guarded by the cache mutex.
///
/// An identifier is never both in `entries` and in `in_flight`.
struct Registry<B: BundleArchive> {
    /// Resident bundles, in the order they finished loading.
    entries: Vec<CacheEntry<B>>,
    in_flight: HashMap<BundleId, LoadSlot<B>>,
    /// Set on teardown; late loads release instead of registering.
    closed: bool,
}

impl<B: BundleArchive> Registry<B> {
    fn find(&self, id: &str) -> Option<&CacheEntry<B>> {
        self.entries.iter().find(|entry| entry.id.as_str() == id)
    }
}

/// State shared between the cache and its load tasks.
struct Shared<D: ArchiveDecoder> {
    registry: Mutex<Registry<D::Bundle>>,
    reader: Box<dyn FileReader>,
    resolver: Box<dyn PathResolver>,
    decoder: D,
    metrics: CacheMetrics,
}

enum Begin<B: BundleArchive> {
    Hit(BundleHandle<B>),
    Wait(LoadSlot<B>),
}

/// Holds the registry of loaded bundles and deduplicates their loads.
///
/// A bundle is read from disk and decoded at most once while it is resident,
/// however many callers ask for it and however concurrently they do. Loads
/// run on spawned tasks: a caller that stops waiting does not cancel the load
/// and the bundle is registered when it completes.
///
/// Dropping the cache releases every resident bundle.
pub struct BundleCache<D: ArchiveDecoder> {
    shared: Arc<Shared<D>>,
}

impl<D: ArchiveDecoder> BundleCache<D> {
    /// Creates a cache reading through `reader` the paths `resolver` maps
    /// bundle ids to.
    pub fn new(
        decoder: D,
        resolver: impl PathResolver,
        reader: impl FileReader,
        metrics: &MetricsRegistry,
    ) -> MetricsResult<Self> {
        Ok(Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry {
                    entries: Vec::new(),
                    in_flight: HashMap::new(),
                    closed: false,
                }),
                reader: Box::new(reader),
                resolver: Box::new(resolver),
                decoder,
                metrics: CacheMetrics::new(metrics)?,
            }),
        })
    }

    /// Creates a cache reading `<root_dir>/<platform>/<id>` from the local
    /// filesystem.
    pub fn from_settings(
        settings: &BundleSettings,
        decoder: D,
        metrics: &MetricsRegistry,
    ) -> MetricsResult<Self> {
        Self::new(decoder, settings.resolver(), TokioFileReader::new(), metrics)
    }

    /// Returns the bundle `id`, loading it if it is not resident.
    ///
    /// Concurrent calls for the same id share a single read and decode, and
    /// all observe the same outcome. A failed load registers nothing; the next
    /// call tries again.
    ///
    /// # Panics
    ///
    /// Loads are spawned with `tokio::spawn`, so a miss panics when called
    /// outside a Tokio runtime.
    pub async fn ensure_loaded(
        &self,
        id: impl Into<BundleId>,
    ) -> Result<BundleHandle<D::Bundle>, BundleLoadError> {
        let id = id.into();
        let mut slot = match self.begin(&id) {
            Begin::Hit(handle) => return Ok(handle),
            Begin::Wait(slot) => slot,
        };

        let outcome = match slot.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            // The load task went away without publishing.
            Err(_) => None,
        };
        outcome.unwrap_or(Err(BundleLoadError::Aborted { id }))
    }

    /// Evicts the bundle `id`, releasing its resources.
    ///
    /// Returns `false` if it was not resident. A load of `id` in flight is not
    /// cancelled.
    pub fn unload(&self, id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        let evicted = {
            let mut registry = self.shared.lock();
            let position = registry.entries.iter().position(|e| e.id.as_str() == id);
            let evicted = position.map(|position| registry.entries.remove(position));
            self.shared.metrics.set_resident(registry.entries.len());
            evicted
        };

        match evicted {
            Some(entry) => {
                self.shared.release(entry);
                true
            }
            None => {
                log::trace!("Unload of '{id}' ignored: not resident");
                false
            }
        }
    }

    /// Evicts every resident bundle in the order they were loaded.
    ///
    /// Returns how many bundles were released.
    pub fn unload_all(&self) -> usize {
        let evicted = {
            let mut registry = self.shared.lock();
            self.shared.metrics.set_resident(0);
            std::mem::take(&mut registry.entries)
        };

        let count = evicted.len();
        for entry in evicted {
            self.shared.release(entry);
        }
        if count > 0 {
            log::info!("Unloaded {count} bundles");
        }
        count
    }

    /// Returns `true` if `id` is resident.
    pub fn is_loaded(&self, id: impl AsRef<str>) -> bool {
        self.shared.lock().find(id.as_ref()).is_some()
    }

    /// Returns `true` if a load of `id` is in flight.
    pub fn is_loading(&self, id: impl AsRef<str>) -> bool {
        self.shared.lock().in_flight.contains_key(id.as_ref())
    }

    /// Resident bundle ids, in the order they were loaded.
    pub fn loaded_ids(&self) -> Vec<BundleId> {
        self.shared
            .lock()
            .entries
            .iter()
            .map(|entry| entry.id.clone())
            .collect()
    }

    /// Number of resident bundles.
    pub fn len(&self) -> usize {
        self.shared.lock().entries.len()
    }

    /// Returns `true` if no bundle is resident.
    pub fn is_empty(&self) -> bool {
        self.shared.lock().entries.is_empty()
    }

    /// The file `id` is loaded from.
    pub fn path_of(&self, id: &BundleId) -> PathBuf {
        self.shared.resolver.resolve(id)
    }

    pub(crate) fn record_empty_extraction(&self) {
        CacheMetrics::bump(&self.shared.metrics.empty_extractions);
    }

    /// Atomically serves a hit, joins a load in flight, or starts one.
    fn begin(&self, id: &BundleId) -> Begin<D::Bundle> {
        let mut registry = self.shared.lock();

        if let Some(entry) = registry.find(id.as_str()) {
            CacheMetrics::bump(&self.shared.metrics.cache_hits);
            return Begin::Hit(entry.handle.clone());
        }

        if let Some(slot) = registry.in_flight.get(id) {
            CacheMetrics::bump(&self.shared.metrics.coalesced_waits);
            log::trace!("Joining the load of bundle '{id}' in flight");
            return Begin::Wait(slot.clone());
        }

        CacheMetrics::bump(&self.shared.metrics.cache_misses);
        let (tx, rx) = watch::channel(None);
        registry.in_flight.insert(id.clone(), rx.clone());
        drop(registry);

        let shared = self.shared.clone();
        let id = id.clone();
        tokio::spawn(async move {
            let mut guard = InFlightGuard {
                shared: shared.clone(),
                id: id.clone(),
                armed: true,
            };
            let result = shared.load(&id).await;
            guard.armed = false;
            shared.finish(id, result, tx);
        });

        Begin::Wait(rx)
    }
}

impl<D: ArchiveDecoder> Drop for BundleCache<D> {
    fn drop(&mut self) {
        self.shared.lock().closed = true;
        self.unload_all();
    }
}

impl<D: ArchiveDecoder> Shared<D> {
    fn lock(&self) -> MutexGuard<'_, Registry<D::Bundle>> {
        // Every mutation completes before user code runs, so a poisoned
        // registry is still consistent.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolves, reads and decodes `id`. Suspends at the read and the decode.
    async fn load(&self, id: &BundleId) -> Result<D::Bundle, BundleLoadError> {
        let _timer = ScopedMetricTimer::new(&self.metrics.load_time_ms);

        let path = self.resolver.resolve(id);
        log::debug!("Loading bundle '{id}' from '{}'", path.display());

        CacheMetrics::bump(&self.metrics.reads);
        let bytes = self
            .reader
            .read_all(&path)
            .await
            .map_err(|e| BundleLoadError::from_io(id.clone(), path.clone(), &e))?;

        CacheMetrics::bump(&self.metrics.decodes);
        self.decoder
            .decode(id, bytes)
            .await
            .ok_or_else(|| BundleLoadError::DecodeFailed { id: id.clone() })
    }

    /// Registers the outcome of a load and publishes it to every waiter.
    fn finish(
        &self,
        id: BundleId,
        result: Result<D::Bundle, BundleLoadError>,
        tx: watch::Sender<Option<LoadOutcome<D::Bundle>>>,
    ) {
        let mut late = None;
        let outcome = {
            let mut registry = self.lock();
            registry.in_flight.remove(&id);

            match result {
                Ok(bundle) => {
                    let handle = BundleHandle::new(id.clone(), bundle);
                    if registry.closed {
                        late = Some(CacheEntry {
                            id: id.clone(),
                            handle,
                        });
                        Err(BundleLoadError::Aborted { id })
                    } else {
                        registry.entries.push(CacheEntry {
                            id: id.clone(),
                            handle: handle.clone(),
                        });
                        self.metrics.set_resident(registry.entries.len());
                        log::info!("Bundle '{id}' loaded");
                        Ok(handle)
                    }
                }
                Err(e) => {
                    CacheMetrics::bump(&self.metrics.load_failures);
                    log::warn!("{e}");
                    Err(e)
                }
            }
        };

        if let Some(entry) = late {
            log::debug!("Bundle '{}' finished loading after teardown", entry.id);
            self.release(entry);
        }
        tx.send_replace(Some(outcome));
    }

    fn release(&self, entry: CacheEntry<D::Bundle>) {
        entry.handle.release();
        CacheMetrics::bump(&self.metrics.evictions);
        log::debug!("Bundle '{}' unloaded", entry.id);
    }
}

/// Clears the in-flight slot of a load task that ends without finishing,
/// e.g. when the decoder panics or the runtime shuts down.
struct InFlightGuard<D: ArchiveDecoder> {
    shared: Arc<Shared<D>>,
    id: BundleId,
    armed: bool,
}

impl<D: ArchiveDecoder> Drop for InFlightGuard<D> {
    fn drop(&mut self) {
        if self.armed {
            log::error!("Load of bundle '{}' ended without an outcome", self.id);
            self.shared.lock().in_flight.remove(&self.id);
        }
    }
}
