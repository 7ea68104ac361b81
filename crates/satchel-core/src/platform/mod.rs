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

//! Provides abstractions over the target platform of a bundle build.
//!
//! Bundles are built per platform and stored under a directory named after
//! it. The platform is a runtime setting chosen by the host, never a
//! compile-time branch in the cache.

use crate::bundle::BundleId;
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

/// The platform a set of bundles was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Platform {
    /// Standalone Windows builds. Also the fallback for unknown targets.
    #[default]
    #[serde(alias = "windows")]
    Windows,
    /// Standalone macOS builds, stored under `OSX`.
    #[serde(rename = "OSX", alias = "osx", alias = "macos", alias = "MacOs")]
    MacOs,
    /// Android builds.
    #[serde(alias = "android")]
    Android,
}

impl Platform {
    /// The platform matching the compilation target, falling back to Windows.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else {
            Platform::Windows
        }
    }

    /// The name of the directory holding this platform's bundles.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "OSX",
            Platform::Android => "Android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Error returned when a platform tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown platform tag '{}'", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(Platform::Windows),
            "osx" | "macos" | "mac" => Ok(Platform::MacOs),
            "android" => Ok(Platform::Android),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// Maps a logical bundle identifier to the file that stores it.
///
/// Resolution is pure and synchronous; whether the file exists is only
/// discovered when it is read.
pub trait PathResolver: Send + Sync + 'static {
    /// Returns the path of the file backing `id`.
    fn resolve(&self, id: &BundleId) -> PathBuf;
}
