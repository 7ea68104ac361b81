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

use async_trait::async_trait;
use satchel_core::io::FileReader;
use std::{io, path::Path};

/// Reads bundle files with `tokio::fs`, off the async worker threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioFileReader;

impl TokioFileReader {
    /// Creates a new reader.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileReader for TokioFileReader {
    async fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        let bytes = tokio::fs::read(path).await?;
        log::trace!("Read {} bytes from '{}'", bytes.len(), path.display());
        Ok(bytes)
    }
}
