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

//! The on-disk bundle container ("pack").
//!
//! Layout of a pack file:
//!
//! | bytes | content                                             |
//! |-------|-----------------------------------------------------|
//! | 0..4  | magic `SPAK`                                        |
//! | 4..6  | format version, `u16` little-endian                 |
//! | 6..   | bincode (standard config) encoded [`PackManifest`]  |
//!
//! Every entry stores its payload LZ4-compressed together with the BLAKE3
//! digest of the uncompressed bytes, checked on [`PackedAsset::decompress`].

mod error;
mod reader;
mod writer;

pub use error::PackError;
pub use reader::{PackContents, PackReader};
pub use writer::PackWriter;

use serde::{Deserialize, Serialize};

/// Magic bytes opening every pack file.
pub const PACK_MAGIC: [u8; 4] = *b"SPAK";

/// Current format version.
pub const PACK_VERSION: u16 = 2;

pub(crate) const HEADER_LEN: usize = PACK_MAGIC.len() + std::mem::size_of::<u16>();

/// The serialized body of a pack file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackManifest {
    /// Entries in the order they were added.
    pub entries: Vec<PackedAsset>,
}

/// One named, typed asset stored in a pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackedAsset {
    /// Name the asset is looked up by (e.g. "Hero").
    pub name: String,
    /// Type name used to pick a loader (e.g. "texture").
    pub type_name: String,
    /// BLAKE3 digest of the uncompressed payload.
    pub hash: [u8; 32],
    /// LZ4 block with the uncompressed size prepended.
    pub payload: Vec<u8>,
}

impl PackedAsset {
    /// Decompresses the payload and verifies its digest.
    pub fn decompress(&self) -> Result<Vec<u8>, PackError> {
        let bytes = lz4_flex::decompress_size_prepended(&self.payload).map_err(|source| {
            PackError::Decompress {
                name: self.name.clone(),
                source,
            }
        })?;

        if blake3::hash(&bytes).as_bytes() != &self.hash {
            return Err(PackError::HashMismatch {
                name: self.name.clone(),
            });
        }

        Ok(bytes)
    }
}
