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

use super::{PackError, PackManifest, PackedAsset, HEADER_LEN, PACK_MAGIC, PACK_VERSION};

/// Parses pack files.
pub struct PackReader;

impl PackReader {
    /// Validates the header and decodes the manifest.
    ///
    /// Payloads stay compressed; they are only inflated when an asset is
    /// extracted.
    pub fn parse(bytes: &[u8]) -> Result<PackContents, PackError> {
        if bytes.len() < HEADER_LEN || bytes[..PACK_MAGIC.len()] != PACK_MAGIC {
            return Err(PackError::BadMagic);
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != PACK_VERSION {
            return Err(PackError::UnsupportedVersion(version));
        }

        let (manifest, _): (PackManifest, _) =
            bincode::serde::decode_from_slice(&bytes[HEADER_LEN..], bincode::config::standard())?;

        Ok(PackContents {
            entries: manifest.entries,
        })
    }
}

/// The decoded manifest of a pack.
#[derive(Debug, Clone, Default)]
pub struct PackContents {
    entries: Vec<PackedAsset>,
}

impl PackContents {
    /// Every entry, in file order.
    pub fn entries(&self) -> &[PackedAsset] {
        &self.entries
    }

    /// Consumes the contents, returning the entries in file order.
    pub fn into_entries(self) -> Vec<PackedAsset> {
        self.entries
    }
}
