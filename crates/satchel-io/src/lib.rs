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

//! I/O services for the bundle loader.
//!
//! - [`TokioFileReader`]: the default [`FileReader`](satchel_core::io::FileReader).
//! - [`StreamingAssetsResolver`]: maps bundle ids to `<root>/<platform>/<id>`.
//! - [`BundleSettings`]: the host configuration, read from `Bundles.toml`.
//! - [`pack`]: the on-disk bundle container.

mod file_reader;
pub mod pack;
mod resolver;
mod settings;

pub use file_reader::TokioFileReader;
pub use resolver::StreamingAssetsResolver;
pub use settings::{BundleSettings, SettingsError, DEFAULT_ROOT_DIR, SETTINGS_FILE_NAME};
