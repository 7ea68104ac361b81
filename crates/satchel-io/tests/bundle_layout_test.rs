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
use satchel_core::bundle::BundleId;
use satchel_core::io::FileReader;
use satchel_core::platform::{PathResolver, Platform};
use satchel_io::pack::{PackReader, PackWriter};
use satchel_io::{BundleSettings, TokioFileReader};
use tempfile::tempdir;

#[tokio::test]
async fn test_pack_written_to_platform_dir_is_readable() -> Result<()> {
    // --- 1. Setup: a settings file and a pack under <root>/<platform>/ ---
    let dir = tempdir()?;
    let settings_path = dir.path().join("Bundles.toml");
    std::fs::write(
        &settings_path,
        format!(
            "root_dir = {:?}\nplatform = \"Android\"\n",
            dir.path().join("AssetBundles")
        ),
    )?;
    let settings = BundleSettings::load(&settings_path)?;
    assert_eq!(settings.platform, Platform::Android);

    let resolver = settings.resolver();
    let id = BundleId::from("demo.bundle");
    let path = resolver.resolve(&id);
    std::fs::create_dir_all(resolver.platform_dir())?;

    let mut writer = PackWriter::new();
    writer
        .add("Hero", "texture", &[0xAB; 256])?
        .add("Theme", "audio", b"not really ogg")?;
    std::fs::write(&path, writer.finish()?)?;

    // --- 2. Read it back through the same path the cache uses ---
    let bytes = TokioFileReader::new().read_all(&path).await?;
    let contents = PackReader::parse(&bytes)?;

    // --- 3. Assert ---
    let names: Vec<_> = contents.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Hero", "Theme"]);
    assert_eq!(contents.entries()[0].decompress()?, vec![0xAB; 256]);
    Ok(())
}
