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

use anyhow::Result;
use async_trait::async_trait;
use satchel_agents::bundle_agent::{AssetFetcher, BundleCache};
use satchel_core::asset::Asset;
use satchel_core::io::FileReader;
use satchel_core::platform::Platform;
use satchel_io::pack::PackWriter;
use satchel_io::{BundleSettings, TokioFileReader};
use satchel_lanes::bundle_lane::{AssetLoader, AssetLoaderRegistry, PackBundleDecoder};
use satchel_telemetry::MetricsRegistry;
use std::error::Error;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

// --- Test Setup: a texture asset and a reader that counts disk reads ---
#[derive(Debug, PartialEq)]
struct Texture {
    id: u32,
}
impl Asset for Texture {}

struct TextureLoader;
impl AssetLoader<Texture> for TextureLoader {
    fn load(&self, bytes: &[u8]) -> Result<Texture, Box<dyn Error + Send + Sync>> {
        let id = u32::from_le_bytes(bytes.try_into()?);
        Ok(Texture { id })
    }
}

struct CountingReader {
    inner: TokioFileReader,
    reads: Arc<AtomicUsize>,
}

#[async_trait]
impl FileReader for CountingReader {
    async fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_all(path).await
    }
}
// ---

#[tokio::test]
async fn test_fetch_from_pack_on_disk() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    // --- 1. Setup: AssetBundles/<platform>/demo.bundle on disk ---
    let dir = tempdir()?;
    let settings = BundleSettings::default()
        .with_root_dir(dir.path().join("AssetBundles"))
        .with_platform(Platform::Android);
    let resolver = settings.resolver();
    std::fs::create_dir_all(resolver.platform_dir())?;

    let mut writer = PackWriter::new();
    writer
        .add("Hero", "texture", &7u32.to_le_bytes())?
        .add("Sidekick", "texture", &8u32.to_le_bytes())?
        .add("Notes", "txt", b"unused")?;
    std::fs::write(
        resolver.platform_dir().join("demo.bundle"),
        writer.finish()?,
    )?;

    let metrics = MetricsRegistry::new();
    let mut loaders = AssetLoaderRegistry::new(&metrics)?;
    loaders.register::<Texture>("texture", TextureLoader);

    let reads = Arc::new(AtomicUsize::new(0));
    let cache = BundleCache::new(
        PackBundleDecoder::new(Arc::new(loaders)),
        resolver,
        CountingReader {
            inner: TokioFileReader::new(),
            reads: reads.clone(),
        },
        &metrics,
    )?;
    let fetcher = AssetFetcher::new(cache);

    // --- 2. First fetch loads the bundle ---
    let hero = fetcher
        .fetch_one::<Texture>("demo.bundle", "Hero")
        .await
        .expect("Hero should be in demo.bundle");
    assert_eq!(*hero, Texture { id: 7 });
    assert_eq!(reads.load(Ordering::SeqCst), 1);

    // --- 3. Later fetches are served from memory ---
    let again = fetcher
        .fetch_one::<Texture>("demo.bundle", "Hero")
        .await
        .expect("Hero");
    assert!(hero.ptr_eq(&again));
    let all = fetcher.fetch_all_of_type::<Texture>("demo.bundle").await;
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].id, 8);
    assert_eq!(reads.load(Ordering::SeqCst), 1);

    // --- 4. Unload forces exactly one more read ---
    assert!(fetcher.cache().unload("demo.bundle"));
    assert!(fetcher
        .fetch_one::<Texture>("demo.bundle", "Hero")
        .await
        .is_some());
    assert_eq!(reads.load(Ordering::SeqCst), 2);

    assert_eq!(metrics.counter_value("bundles", "reads")?, 2);
    assert_eq!(metrics.counter_value("assets", "loaded_total")?, 3);
    metrics.log_namespace("bundles");
    Ok(())
}

#[tokio::test]
async fn test_from_settings_reports_missing_bundle() -> Result<()> {
    let dir = tempdir()?;
    let settings = BundleSettings::default().with_root_dir(dir.path());

    let metrics = MetricsRegistry::new();
    let loaders = AssetLoaderRegistry::new(&metrics)?;
    let cache = BundleCache::from_settings(
        &settings,
        PackBundleDecoder::new(Arc::new(loaders)),
        &metrics,
    )?;

    let expected = dir.path().join("Windows").join("absent.bundle");
    assert_eq!(cache.path_of(&"absent.bundle".into()), expected);

    let fetcher = AssetFetcher::new(cache);
    assert!(fetcher
        .fetch_one::<Texture>("absent.bundle", "Hero")
        .await
        .is_none());
    assert_eq!(metrics.counter_value("bundles", "load_failures")?, 1);
    Ok(())
}
