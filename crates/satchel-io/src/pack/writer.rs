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

use super::{PackError, PackManifest, PackedAsset, PACK_MAGIC, PACK_VERSION};

/// Builds a pack file in memory.
///
/// ```
/// use satchel_io::pack::{PackReader, PackWriter};
///
/// let mut writer = PackWriter::new();
/// writer.add("Hero", "texture", b"pixels").unwrap();
/// let bytes = writer.finish().unwrap();
///
/// let contents = PackReader::parse(&bytes).unwrap();
/// assert_eq!(contents.entries()[0].name, "Hero");
/// ```
#[derive(Debug, Default)]
pub struct PackWriter {
    manifest: PackManifest,
}

impl PackWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compresses and appends an asset.
    ///
    /// Fails if an asset with the same name and type name was already added.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        bytes: &[u8],
    ) -> Result<&mut Self, PackError> {
        let name = name.into();
        let type_name = type_name.into();

        if self
            .manifest
            .entries
            .iter()
            .any(|e| e.name == name && e.type_name == type_name)
        {
            return Err(PackError::DuplicateEntry { name, type_name });
        }

        self.manifest.entries.push(PackedAsset {
            name,
            type_name,
            hash: *blake3::hash(bytes).as_bytes(),
            payload: lz4_flex::compress_prepend_size(bytes),
        });
        Ok(self)
    }

    /// Number of assets added so far.
    pub fn len(&self) -> usize {
        self.manifest.entries.len()
    }

    /// Returns `true` if no asset was added.
    pub fn is_empty(&self) -> bool {
        self.manifest.entries.is_empty()
    }

    /// Serializes the pack.
    pub fn finish(self) -> Result<Vec<u8>, PackError> {
        let body = bincode::serde::encode_to_vec(&self.manifest, bincode::config::standard())?;

        let mut bytes = Vec::with_capacity(super::HEADER_LEN + body.len());
        bytes.extend_from_slice(&PACK_MAGIC);
        bytes.extend_from_slice(&PACK_VERSION.to_le_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }
}
