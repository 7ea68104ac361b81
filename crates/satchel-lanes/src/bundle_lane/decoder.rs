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

//! The pack-backed [`ArchiveDecoder`].

use super::AssetLoaderRegistry;
use async_trait::async_trait;
use satchel_core::{
    asset::{Asset, AssetHandle},
    bundle::{ArchiveDecoder, BundleArchive, BundleId},
};
use satchel_io::pack::{PackReader, PackedAsset};
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, RwLock},
};

/// Decodes pack files into [`PackBundle`]s.
///
/// Parsing runs on the blocking pool so a large manifest never stalls the
/// async workers.
#[derive(Clone)]
pub struct PackBundleDecoder {
    loaders: Arc<AssetLoaderRegistry>,
}

impl PackBundleDecoder {
    /// Creates a decoder whose bundles extract assets through `loaders`.
    pub fn new(loaders: Arc<AssetLoaderRegistry>) -> Self {
        Self { loaders }
    }

    /// The loaders shared with every decoded bundle.
    pub fn loaders(&self) -> &Arc<AssetLoaderRegistry> {
        &self.loaders
    }
}

#[async_trait]
impl ArchiveDecoder for PackBundleDecoder {
    type Bundle = PackBundle;

    async fn decode(&self, id: &BundleId, bytes: Vec<u8>) -> Option<PackBundle> {
        match tokio::task::spawn_blocking(move || PackReader::parse(&bytes)).await {
            Ok(Ok(contents)) => {
                let entries = contents.into_entries();
                log::debug!("Decoded bundle '{id}' with {} entries", entries.len());
                Some(PackBundle::new(id.clone(), entries, self.loaders.clone()))
            }
            Ok(Err(e)) => {
                log::warn!("Bundle '{id}' is not a valid pack: {e}");
                None
            }
            Err(e) => {
                log::error!("Decoding task for bundle '{id}' failed: {e}");
                None
            }
        }
    }
}

/// The live contents of a pack until it is released.
struct PackState {
    entries: Vec<Arc<PackedAsset>>,
    /// Extracted handles, keyed by entry index and requested asset type.
    decoded: HashMap<(usize, TypeId), Box<dyn Any + Send + Sync>>,
}

/// A decoded pack file.
///
/// Payloads stay compressed until first extracted. An extracted asset is
/// memoized, so asking twice for the same entry as the same type returns the
/// same [`AssetHandle`].
pub struct PackBundle {
    id: BundleId,
    loaders: Arc<AssetLoaderRegistry>,
    state: RwLock<Option<PackState>>,
}

enum Lookup<A: Asset> {
    Ready(AssetHandle<A>),
    Decode(Arc<PackedAsset>),
}

impl PackBundle {
    /// Wraps parsed entries, in file order.
    pub fn new(id: BundleId, entries: Vec<PackedAsset>, loaders: Arc<AssetLoaderRegistry>) -> Self {
        Self {
            id,
            loaders,
            state: RwLock::new(Some(PackState {
                entries: entries.into_iter().map(Arc::new).collect(),
                decoded: HashMap::new(),
            })),
        }
    }

    /// The identifier this pack was decoded under.
    pub fn id(&self) -> &BundleId {
        &self.id
    }

    /// Number of entries in the pack; zero once released.
    pub fn entry_count(&self) -> usize {
        self.read(|state| state.entries.len()).unwrap_or(0)
    }

    /// Returns `true` once [`BundleArchive::release`] has run.
    pub fn is_released(&self) -> bool {
        self.read(|_| ()).is_none()
    }

    fn read<R>(&self, f: impl FnOnce(&PackState) -> R) -> Option<R> {
        let guard = self.state.read().ok()?;
        guard.as_ref().map(f)
    }

    fn write<R>(&self, f: impl FnOnce(&mut PackState) -> R) -> Option<R> {
        let mut guard = self.state.write().ok()?;
        guard.as_mut().map(f)
    }

    async fn extract_at<A: Asset>(&self, index: usize) -> Option<AssetHandle<A>> {
        let key = (index, TypeId::of::<A>());

        let lookup = self.read(|state| {
            match state
                .decoded
                .get(&key)
                .and_then(|any| any.downcast_ref::<AssetHandle<A>>())
            {
                Some(handle) => Some(Lookup::Ready(handle.clone())),
                None => state.entries.get(index).cloned().map(Lookup::Decode),
            }
        })??;

        let entry = match lookup {
            Lookup::Ready(handle) => return Some(handle),
            Lookup::Decode(entry) => entry,
        };

        let loaders = self.loaders.clone();
        let job_entry = entry.clone();
        let decoded = tokio::task::spawn_blocking(move || -> anyhow::Result<A> {
            let bytes = job_entry.decompress()?;
            Ok(loaders.load::<A>(&job_entry.type_name, &bytes)?)
        })
        .await;

        let asset = match decoded {
            Ok(Ok(asset)) => asset,
            Ok(Err(e)) => {
                log::warn!(
                    "Skipping asset '{}' in bundle '{}': {e:#}",
                    entry.name,
                    self.id
                );
                return None;
            }
            Err(e) => {
                log::error!(
                    "Extraction task for '{}' in bundle '{}' failed: {e}",
                    entry.name,
                    self.id
                );
                return None;
            }
        };

        // A concurrent extraction may have won the race; keep the first handle.
        let handle = AssetHandle::new(asset);
        let stored = self.write(|state| {
            state
                .decoded
                .entry(key)
                .or_insert_with(|| Box::new(handle))
                .downcast_ref::<AssetHandle<A>>()
                .cloned()
        });

        if stored.is_none() {
            log::debug!(
                "Bundle '{}' was released while extracting '{}'",
                self.id,
                entry.name
            );
        }
        stored.flatten()
    }
}

#[async_trait]
impl BundleArchive for PackBundle {
    async fn extract_one<A: Asset>(&self, name: &str) -> Option<AssetHandle<A>> {
        let index = self.read(|state| {
            state
                .entries
                .iter()
                .position(|e| e.name == name && self.loaders.accepts::<A>(&e.type_name))
        })??;

        self.extract_at(index).await
    }

    async fn extract_all<A: Asset>(&self) -> Vec<AssetHandle<A>> {
        let indices: Vec<usize> = self
            .read(|state| {
                state
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| self.loaders.accepts::<A>(&e.type_name))
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default();

        let mut assets = Vec::with_capacity(indices.len());
        for index in indices {
            if let Some(handle) = self.extract_at(index).await {
                assets.push(handle);
            }
        }
        assets
    }

    fn release(&self) {
        let released = match self.state.write() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(state) = released {
            log::debug!(
                "Released bundle '{}' ({} entries, {} decoded)",
                self.id,
                state.entries.len(),
                state.decoded.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle_lane::AssetLoader;
    use satchel_io::pack::PackWriter;
    use satchel_telemetry::MetricsRegistry;
    use std::error::Error;

    #[derive(Debug, PartialEq)]
    struct Text(String);
    impl Asset for Text {}

    #[derive(Debug)]
    struct Blob(usize);
    impl Asset for Blob {}

    struct TextLoader;
    impl AssetLoader<Text> for TextLoader {
        fn load(&self, bytes: &[u8]) -> Result<Text, Box<dyn Error + Send + Sync>> {
            Ok(Text(String::from_utf8(bytes.to_vec())?))
        }
    }

    struct BlobLoader;
    impl AssetLoader<Blob> for BlobLoader {
        fn load(&self, bytes: &[u8]) -> Result<Blob, Box<dyn Error + Send + Sync>> {
            Ok(Blob(bytes.len()))
        }
    }

    fn decoder() -> PackBundleDecoder {
        let mut loaders = AssetLoaderRegistry::new(&MetricsRegistry::new()).unwrap();
        loaders
            .register::<Text>("txt", TextLoader)
            .register::<Blob>("bin", BlobLoader);
        PackBundleDecoder::new(Arc::new(loaders))
    }

    async fn decode(entries: &[(&str, &str, &[u8])]) -> PackBundle {
        let mut writer = PackWriter::new();
        for (name, type_name, bytes) in entries {
            writer.add(*name, *type_name, bytes).unwrap();
        }
        decoder()
            .decode(&BundleId::from("test.bundle"), writer.finish().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn rejects_malformed_bytes() {
        let id = BundleId::from("broken.bundle");
        assert!(decoder().decode(&id, b"garbage".to_vec()).await.is_none());
    }

    #[tokio::test]
    async fn extract_one_matches_name_and_type() {
        let bundle = decode(&[
            ("Hero", "bin", &b"1234"[..]),
            ("Hero", "txt", &b"hi"[..]),
        ])
        .await;

        let text = bundle.extract_one::<Text>("Hero").await.unwrap();
        assert_eq!(*text, Text("hi".into()));
        let blob = bundle.extract_one::<Blob>("Hero").await.unwrap();
        assert_eq!(blob.0, 4);

        assert!(bundle.extract_one::<Text>("Villain").await.is_none());
    }

    #[tokio::test]
    async fn repeated_extraction_is_memoized() {
        let bundle = decode(&[("Intro", "txt", &b"once upon a time"[..])]).await;

        let a = bundle.extract_one::<Text>("Intro").await.unwrap();
        let b = bundle.extract_one::<Text>("Intro").await.unwrap();
        assert!(a.ptr_eq(&b));
    }

    #[tokio::test]
    async fn extract_all_keeps_file_order_and_skips_bad_entries() {
        let bundle = decode(&[
            ("B", "txt", &b"second"[..]),
            ("skip", "bin", &b"x"[..]),
            ("Broken", "txt", &[0xff, 0xfe][..]),
            ("A", "txt", &b"first"[..]),
        ])
        .await;

        let texts = bundle.extract_all::<Text>().await;
        let values: Vec<_> = texts.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(values, ["second", "first"]);
    }

    #[tokio::test]
    async fn release_empties_the_bundle() {
        let bundle = decode(&[("Intro", "txt", &b"hello"[..])]).await;
        let kept = bundle.extract_one::<Text>("Intro").await.unwrap();
        assert_eq!(bundle.entry_count(), 1);

        bundle.release();

        assert!(bundle.is_released());
        assert_eq!(bundle.entry_count(), 0);
        assert!(bundle.extract_one::<Text>("Intro").await.is_none());
        assert!(bundle.extract_all::<Text>().await.is_empty());
        // Handles extracted before the release stay usable.
        assert_eq!(kept.0, "hello");
    }
}
