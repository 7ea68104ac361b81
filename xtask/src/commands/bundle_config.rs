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

use anyhow::{Context, Result};
use satchel_io::BundleSettings;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

/// Represents the structure of the `Bundles.toml` manifest.
///
/// ```toml
/// root_dir = "AssetBundles"
/// platform = "Android"
///
/// [[bundle]]
/// name = "demo.bundle"
/// source = "assets/demo"
/// ```
#[derive(Deserialize, Debug, Default)]
pub struct BundleManifest {
    /// Where packs are written; the same settings the runtime reads.
    #[serde(flatten)]
    pub settings: BundleSettings,
    /// The bundles to build.
    #[serde(default, rename = "bundle")]
    pub bundles: Vec<BundleSource>,
}

/// One bundle to build.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BundleSource {
    /// File name of the pack, also its bundle id at runtime.
    pub name: String,
    /// Directory whose files become the bundle's assets.
    pub source: PathBuf,
}

impl BundleManifest {
    /// Loads the manifest at `path`.
    /// If the file does not exist, it returns the default configuration.
    pub fn load(path: &Path) -> Result<(Self, bool)> {
        if !path.exists() {
            return Ok((Self::default(), false));
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file at '{}'", path.display()))?;
        let manifest = toml::from_str(&text)
            .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))?;
        Ok((manifest, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::platform::Platform;

    #[test]
    fn parses_settings_and_bundles() {
        let manifest: BundleManifest = toml::from_str(
            r#"
            platform = "osx"

            [[bundle]]
            name = "demo.bundle"
            source = "assets/demo"

            [[bundle]]
            name = "ui.bundle"
            source = "assets/ui"
            "#,
        )
        .unwrap();

        assert_eq!(manifest.settings.platform, Platform::MacOs);
        assert_eq!(manifest.settings.root_dir, PathBuf::from("AssetBundles"));
        assert_eq!(manifest.bundles.len(), 2);
        assert_eq!(
            manifest.bundles[1],
            BundleSource {
                name: "ui.bundle".into(),
                source: "assets/ui".into(),
            }
        );
    }

    #[test]
    fn missing_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (manifest, found) = BundleManifest::load(&dir.path().join("Bundles.toml")).unwrap();

        assert!(!found);
        assert!(manifest.bundles.is_empty());
        assert_eq!(manifest.settings, BundleSettings::default());
    }
}
