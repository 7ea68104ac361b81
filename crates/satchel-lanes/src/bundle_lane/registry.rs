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

//! A registry of asset loaders, keyed by the type name stored in pack entries.

use super::AssetLoader;
use satchel_core::{asset::Asset, telemetry::MetricsResult};
use satchel_telemetry::{CounterHandle, HistogramHandle, MetricsRegistry, ScopedMetricTimer};
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    error::Error,
    marker::PhantomData,
};
use thiserror::Error;

/// Errors raised while turning an entry payload into a typed asset.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// No loader is registered for the entry's type name.
    #[error("no loader registered for asset type '{type_name}'")]
    NoLoader {
        /// The type name stored in the pack entry.
        type_name: String,
    },
    /// A loader exists for the type name but produces another asset type.
    #[error("loader for '{type_name}' does not produce {requested}")]
    WrongAssetType {
        /// The type name stored in the pack entry.
        type_name: String,
        /// The Rust type the caller asked for.
        requested: &'static str,
    },
    /// The loader rejected the payload.
    #[error("failed to decode '{type_name}' asset: {source}")]
    Decode {
        /// The type name stored in the pack entry.
        type_name: String,
        /// The loader's error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// Internal trait for loading any asset type.
trait AnyAssetLoader: Send + Sync {
    fn asset_type(&self) -> TypeId;
    fn load_any(
        &self,
        bytes: &[u8],
        metrics: &LoaderMetrics,
    ) -> Result<Box<dyn Any + Send>, Box<dyn Error + Send + Sync>>;
}

/// Adapts a typed `AssetLoader<A>` to `AnyAssetLoader`.
struct AssetLoaderWrapper<A: Asset, L: AssetLoader<A>>(L, PhantomData<fn() -> A>);

impl<A: Asset, L: AssetLoader<A> + Send + Sync> AnyAssetLoader for AssetLoaderWrapper<A, L> {
    fn asset_type(&self) -> TypeId {
        TypeId::of::<A>()
    }

    fn load_any(
        &self,
        bytes: &[u8],
        metrics: &LoaderMetrics,
    ) -> Result<Box<dyn Any + Send>, Box<dyn Error + Send + Sync>> {
        let _timer = ScopedMetricTimer::new(&metrics.load_time_ms);

        let asset: A = self.0.load(bytes)?;

        if let Err(e) = metrics.assets_loaded_total.increment() {
            log::warn!("Failed to record asset load: {e}");
        }

        Ok(Box::new(asset))
    }
}

/// Metric handles used by the loader registry.
struct LoaderMetrics {
    /// Asset decoding time in milliseconds.
    load_time_ms: HistogramHandle,
    /// Total number of assets decoded.
    assets_loaded_total: CounterHandle,
}

impl LoaderMetrics {
    fn new(registry: &MetricsRegistry) -> MetricsResult<Self> {
        Ok(Self {
            load_time_ms: registry.register_histogram(
                "assets",
                "load_time",
                "Asset decoding time",
                "ms",
                vec![1.0, 5.0, 16.0, 33.0, 100.0, 500.0],
            )?,
            assets_loaded_total: registry.register_counter(
                "assets",
                "loaded_total",
                "Total number of assets decoded from bundles",
            )?,
        })
    }
}

/// Maps the type names found in pack entries to the loaders that decode them.
///
/// A type name maps to exactly one loader. Several type names may map to the
/// same asset type, e.g. `"png"` and `"jpg"` both producing an image.
pub struct AssetLoaderRegistry {
    metrics: LoaderMetrics,
    loaders: HashMap<String, Box<dyn AnyAssetLoader>>,
}

impl AssetLoaderRegistry {
    /// Creates an empty registry reporting into `metrics_registry`.
    pub fn new(metrics_registry: &MetricsRegistry) -> MetricsResult<Self> {
        Ok(Self {
            metrics: LoaderMetrics::new(metrics_registry)?,
            loaders: HashMap::new(),
        })
    }

    /// Registers `loader` for entries stored under `type_name`.
    ///
    /// Replaces any loader previously registered for that name.
    pub fn register<A: Asset>(
        &mut self,
        type_name: &str,
        loader: impl AssetLoader<A> + Send + Sync + 'static,
    ) -> &mut Self {
        let wrapped = AssetLoaderWrapper(loader, PhantomData);
        if self
            .loaders
            .insert(type_name.to_string(), Box::new(wrapped))
            .is_some()
        {
            log::warn!("Replaced the loader registered for asset type '{type_name}'");
        }
        self
    }

    /// Returns `true` if entries stored under `type_name` decode into an `A`.
    pub fn accepts<A: Asset>(&self, type_name: &str) -> bool {
        self.loaders
            .get(type_name)
            .is_some_and(|loader| loader.asset_type() == TypeId::of::<A>())
    }

    /// Decodes `bytes`, stored under `type_name`, into an `A`.
    pub fn load<A: Asset>(&self, type_name: &str, bytes: &[u8]) -> Result<A, LoaderError> {
        let loader = self
            .loaders
            .get(type_name)
            .ok_or_else(|| LoaderError::NoLoader {
                type_name: type_name.to_string(),
            })?;

        let wrong_type = || LoaderError::WrongAssetType {
            type_name: type_name.to_string(),
            requested: std::any::type_name::<A>(),
        };
        if loader.asset_type() != TypeId::of::<A>() {
            return Err(wrong_type());
        }

        let asset_any = loader
            .load_any(bytes, &self.metrics)
            .map_err(|source| LoaderError::Decode {
                type_name: type_name.to_string(),
                source,
            })?;

        asset_any
            .downcast::<A>()
            .map(|asset| *asset)
            .map_err(|_| wrong_type())
    }

    /// Number of registered type names.
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Returns `true` if no loader is registered.
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Text(String);
    impl Asset for Text {}

    struct Mesh;
    impl Asset for Mesh {}

    struct TextLoader;
    impl AssetLoader<Text> for TextLoader {
        fn load(&self, bytes: &[u8]) -> Result<Text, Box<dyn Error + Send + Sync>> {
            Ok(Text(String::from_utf8(bytes.to_vec())?))
        }
    }

    fn registry() -> (AssetLoaderRegistry, MetricsRegistry) {
        let metrics = MetricsRegistry::new();
        let mut loaders = AssetLoaderRegistry::new(&metrics).unwrap();
        loaders.register::<Text>("txt", TextLoader);
        loaders.register::<Text>("md", TextLoader);
        (loaders, metrics)
    }

    #[test]
    fn accepts_only_the_produced_type() {
        let (loaders, _) = registry();

        assert!(loaders.accepts::<Text>("txt"));
        assert!(loaders.accepts::<Text>("md"));
        assert!(!loaders.accepts::<Mesh>("txt"));
        assert!(!loaders.accepts::<Text>("png"));
        assert_eq!(loaders.len(), 2);
    }

    #[test]
    fn load_decodes_and_counts() {
        let (loaders, metrics) = registry();

        let text: Text = loaders.load("txt", b"hello").unwrap();
        assert_eq!(text, Text("hello".into()));
        assert_eq!(metrics.counter_value("assets", "loaded_total").unwrap(), 1);
    }

    #[test]
    fn load_reports_each_failure_kind() {
        let (loaders, metrics) = registry();

        assert!(matches!(
            loaders.load::<Text>("png", b""),
            Err(LoaderError::NoLoader { .. })
        ));
        assert!(matches!(
            loaders.load::<Mesh>("txt", b"hello"),
            Err(LoaderError::WrongAssetType { .. })
        ));
        assert!(matches!(
            loaders.load::<Text>("txt", &[0xff, 0xfe]),
            Err(LoaderError::Decode { .. })
        ));
        assert_eq!(metrics.counter_value("assets", "loaded_total").unwrap(), 0);
    }
}
