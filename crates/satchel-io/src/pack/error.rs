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

use thiserror::Error;

/// Errors raised while reading or writing a pack.
#[derive(Debug, Error)]
pub enum PackError {
    /// The bytes do not start with the pack magic.
    #[error("not a bundle pack: bad magic")]
    BadMagic,
    /// The pack was written by an incompatible version of the format.
    #[error("unsupported pack format version {0}")]
    UnsupportedVersion(u16),
    /// The manifest could not be decoded.
    #[error("corrupt pack manifest: {0}")]
    Manifest(#[from] bincode::error::DecodeError),
    /// The manifest could not be encoded.
    #[error("failed to encode pack manifest: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    /// An entry's payload is not a valid LZ4 block.
    #[error("failed to decompress entry '{name}': {source}")]
    Decompress {
        /// The entry name.
        name: String,
        /// The LZ4 error.
        #[source]
        source: lz4_flex::block::DecompressError,
    },
    /// An entry's payload does not match its recorded digest.
    #[error("entry '{name}' failed its integrity check")]
    HashMismatch {
        /// The entry name.
        name: String,
    },
    /// Two entries share a name and a type name.
    #[error("duplicate entry '{name}' of type '{type_name}'")]
    DuplicateEntry {
        /// The entry name.
        name: String,
        /// The entry type name.
        type_name: String,
    },
}
