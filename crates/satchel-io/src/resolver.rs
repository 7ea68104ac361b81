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

use crate::BundleSettings;
use satchel_core::bundle::BundleId;
use satchel_core::platform::{PathResolver, Platform};
use std::path::{Path, PathBuf};

/// Resolves bundles laid out as `<root>/<platform>/<bundle id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingAssetsResolver {
    root: PathBuf,
    platform: Platform,
}

impl StreamingAssetsResolver {
    /// Creates a resolver rooted at `root` for `platform`.
    pub fn new(root: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            root: root.into(),
            platform,
        }
    }

    /// Creates a resolver from the host settings.
    pub fn from_settings(settings: &BundleSettings) -> Self {
        Self::new(settings.root_dir.clone(), settings.platform)
    }

    /// The directory holding every platform directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The platform whose bundles are resolved.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The directory holding this platform's bundles.
    pub fn platform_dir(&self) -> PathBuf {
        self.root.join(self.platform.dir_name())
    }
}

impl PathResolver for StreamingAssetsResolver {
    fn resolve(&self, id: &BundleId) -> PathBuf {
        self.platform_dir().join(id.as_str())
    }
}
