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

//! Abstract file access used by the load pipeline.

use async_trait::async_trait;
use std::{io, path::Path};

/// Reads whole files into memory without blocking the caller's executor.
///
/// The cache only ever needs the complete contents of a bundle file, so the
/// contract is a single call. A missing file must be reported with
/// [`io::ErrorKind::NotFound`] so the cache can tell it apart from other
/// failures.
#[async_trait]
pub trait FileReader: Send + Sync + 'static {
    /// Reads the entire file at `path`.
    async fn read_all(&self, path: &Path) -> io::Result<Vec<u8>>;
}
