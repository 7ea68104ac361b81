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

use super::BundleCache;
use satchel_core::{
    asset::{Asset, AssetHandle},
    bundle::{ArchiveDecoder, BundleArchive, BundleId},
};
use std::any::type_name;

/// Fetches assets out of bundles, loading the bundles on demand.
///
/// Fetching never evicts and never forces a reload; eviction goes through
/// [`AssetFetcher::cache`].
pub struct AssetFetcher<D: ArchiveDecoder> {
    cache: BundleCache<D>,
}

impl<D: ArchiveDecoder> AssetFetcher<D> {
    /// Creates a fetcher over `cache`.
    pub fn new(cache: BundleCache<D>) -> Self {
        Self { cache }
    }

    /// The underlying cache.
    pub fn cache(&self) -> &BundleCache<D> {
        &self.cache
    }

    /// Fetches the asset called `asset_name` from bundle `id` as an `A`.
    ///
    /// Returns `None` if the bundle cannot be loaded or holds no such asset.
    pub async fn fetch_one<A: Asset>(
        &self,
        id: impl Into<BundleId>,
        asset_name: &str,
    ) -> Option<AssetHandle<A>> {
        let id = id.into();
        let bundle = match self.cache.ensure_loaded(&id).await {
            Ok(bundle) => bundle,
            Err(e) => {
                log::warn!("Cannot fetch '{asset_name}': {e}");
                return None;
            }
        };

        let asset = bundle.extract_one::<A>(asset_name).await;
        if asset.is_none() {
            log::debug!(
                "Bundle '{id}' has no asset '{asset_name}' of type {}",
                type_name::<A>()
            );
        }
        asset
    }

    /// Fetches every asset of type `A` from bundle `id`, in bundle order.
    ///
    /// Returns an empty vector if the bundle cannot be loaded or holds no
    /// asset of that type.
    pub async fn fetch_all_of_type<A: Asset>(
        &self,
        id: impl Into<BundleId>,
    ) -> Vec<AssetHandle<A>> {
        let id = id.into();
        let bundle = match self.cache.ensure_loaded(&id).await {
            Ok(bundle) => bundle,
            Err(e) => {
                log::warn!("Cannot fetch assets of type {}: {e}", type_name::<A>());
                return Vec::new();
            }
        };

        let assets = bundle.extract_all::<A>().await;
        if assets.is_empty() {
            self.cache.record_empty_extraction();
            log::error!(
                "Bundle '{id}' yielded no assets of type {}",
                type_name::<A>()
            );
        }
        assets
    }
}
