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

//! Contracts between the bundle cache and the archive format.
//!
//! The cache knows nothing about how a bundle file is laid out. It hands the
//! raw bytes of a file to an [`ArchiveDecoder`], keeps the resulting
//! [`BundleArchive`] alive, and asks it for assets on behalf of callers.

mod error;
mod id;

pub use error::*;
pub use id::*;

use crate::asset::{Asset, AssetHandle};
use async_trait::async_trait;
use std::{fmt, ops::Deref, sync::Arc};

/// A decoded bundle that can be queried for assets.
///
/// Extraction may suspend (decompression, decoding of the payload), hence the
/// async methods. Implementations are shared between the cache and every
/// caller holding a [`BundleHandle`], so all methods take `&self`.
#[async_trait]
pub trait BundleArchive: Send + Sync + 'static {
    /// Extracts the single asset called `name` as an `A`.
    ///
    /// Returns `None` if no asset with that name is assignable to `A`.
    async fn extract_one<A: Asset>(&self, name: &str) -> Option<AssetHandle<A>>;

    /// Extracts every asset assignable to `A`, in the order the archive stores them.
    async fn extract_all<A: Asset>(&self) -> Vec<AssetHandle<A>>;

    /// Releases the resources held by the bundle.
    ///
    /// Called exactly once by the cache when the bundle is evicted. Assets that
    /// were already extracted remain valid; later extraction yields nothing.
    fn release(&self) {}
}

/// Turns the raw bytes of a bundle file into a queryable [`BundleArchive`].
#[async_trait]
pub trait ArchiveDecoder: Send + Sync + 'static {
    /// The bundle type this decoder produces.
    type Bundle: BundleArchive;

    /// Decodes `bytes`, read from the file backing `id`.
    ///
    /// Returns `None` on malformed or unsupported input.
    async fn decode(&self, id: &BundleId, bytes: Vec<u8>) -> Option<Self::Bundle>;
}

/// A shared reference to a bundle held by the cache.
///
/// The handle carries the identifier the bundle was loaded under. Cloning it is
/// cheap and never duplicates the bundle itself.
pub struct BundleHandle<B: BundleArchive> {
    id: BundleId,
    bundle: Arc<B>,
}

impl<B: BundleArchive> BundleHandle<B> {
    /// Wraps a freshly decoded bundle.
    pub fn new(id: BundleId, bundle: B) -> Self {
        Self {
            id,
            bundle: Arc::new(bundle),
        }
    }

    /// The identifier this bundle was loaded under.
    pub fn id(&self) -> &BundleId {
        &self.id
    }

    /// Returns `true` if both handles refer to the same loaded bundle.
    pub fn same_bundle(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bundle, &other.bundle)
    }
}

impl<B: BundleArchive> Clone for BundleHandle<B> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            bundle: self.bundle.clone(),
        }
    }
}

impl<B: BundleArchive> Deref for BundleHandle<B> {
    type Target = B;

    fn deref(&self) -> &Self::Target {
        &self.bundle
    }
}

impl<B: BundleArchive> fmt::Debug for BundleHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
