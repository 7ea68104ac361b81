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
use image::{ImageFormat, Rgba, RgbaImage};
use satchel_core::bundle::{ArchiveDecoder, BundleArchive, BundleId};
use satchel_core::io::FileReader;
use satchel_io::pack::PackWriter;
use satchel_io::TokioFileReader;
use satchel_lanes::bundle_lane::{AssetLoaderRegistry, Image, ImageLoader, PackBundleDecoder};
use satchel_telemetry::MetricsRegistry;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::tempdir;

fn png(width: u32, height: u32, color: [u8; 4]) -> Result<Vec<u8>> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[tokio::test]
async fn test_images_extracted_from_pack_on_disk() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    // --- 1. Setup: a pack with two images and a file nobody can load ---
    let dir = tempdir()?;
    let path = dir.path().join("ui.bundle");

    let mut writer = PackWriter::new();
    writer
        .add("Button", "png", &png(4, 2, [10, 20, 30, 255])?)?
        .add("Readme", "txt", b"not an image")?
        .add("Icon", "png", &png(1, 1, [0, 0, 0, 0])?)?;
    std::fs::write(&path, writer.finish()?)?;

    let metrics = MetricsRegistry::new();
    let mut loaders = AssetLoaderRegistry::new(&metrics)?;
    loaders.register::<Image>("png", ImageLoader);
    let decoder = PackBundleDecoder::new(Arc::new(loaders));

    // --- 2. Read and decode ---
    let bytes = TokioFileReader::new().read_all(&path).await?;
    let bundle = decoder
        .decode(&BundleId::from("ui.bundle"), bytes)
        .await
        .expect("a freshly written pack decodes");
    assert_eq!(bundle.entry_count(), 3);

    // --- 3. Extract ---
    let button = bundle.extract_one::<Image>("Button").await.expect("Button");
    assert_eq!((button.width, button.height), (4, 2));
    assert_eq!(&button.pixels[..4], &[10, 20, 30, 255]);

    let all = bundle.extract_all::<Image>().await;
    assert_eq!(all.len(), 2);
    assert!(all[0].ptr_eq(&button));
    assert!(bundle.extract_one::<Image>("Readme").await.is_none());

    // Button was decoded once and memoized, Icon once.
    assert_eq!(metrics.counter_value("assets", "loaded_total")?, 2);
    Ok(())
}
