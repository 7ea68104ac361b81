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

use crate::StreamingAssetsResolver;
use satchel_core::platform::Platform;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Directory bundles are stored under when no setting overrides it.
pub const DEFAULT_ROOT_DIR: &str = "AssetBundles";

/// Conventional name of the settings file.
pub const SETTINGS_FILE_NAME: &str = "Bundles.toml";

/// Errors raised while loading [`BundleSettings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("failed to read settings file '{}': {source}", .path.display())]
    Read {
        /// The settings file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The settings file is not valid TOML for [`BundleSettings`].
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Host configuration of the bundle loader.
///
/// Represents the structure of `Bundles.toml`. Every field is optional:
///
/// ```toml
/// root_dir = "StreamingAssets/AssetBundles"
/// platform = "Android"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleSettings {
    /// Directory holding one sub-directory per platform.
    pub root_dir: PathBuf,
    /// Platform whose bundles are loaded.
    pub platform: Platform,
}

impl Default for BundleSettings {
    /// Bundles under `AssetBundles`, built for Windows.
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            platform: Platform::default(),
        }
    }
}

impl BundleSettings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads settings from `path`.
    /// If the file does not exist, it returns the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Found '{}'. Loading bundle settings.", path.display());
                Self::from_toml_str(&text)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "No '{}' found. Using default bundle settings.",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(source) => Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Replaces the root directory.
    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    /// Replaces the platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Builds the path resolver these settings describe.
    pub fn resolver(&self) -> StreamingAssetsResolver {
        StreamingAssetsResolver::from_settings(self)
    }
}
