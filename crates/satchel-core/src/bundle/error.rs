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

//! Defines the errors a bundle load can end with.

use super::BundleId;
use std::{fmt, io, path::PathBuf};

/// Why a bundle could not be loaded.
///
/// A load outcome is shared with every caller waiting on the same bundle, so
/// the error is `Clone` and keeps I/O failures as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleLoadError {
    /// The resolved bundle file does not exist.
    NotFound {
        /// The bundle that was requested.
        id: BundleId,
        /// The path the identifier resolved to.
        path: PathBuf,
    },
    /// The bundle file exists but could not be read.
    Unreadable {
        /// The bundle that was requested.
        id: BundleId,
        /// The path the identifier resolved to.
        path: PathBuf,
        /// The underlying I/O error message.
        reason: String,
    },
    /// The file was read but the decoder produced no usable bundle.
    DecodeFailed {
        /// The bundle that was requested.
        id: BundleId,
    },
    /// The load ended without producing an outcome, or the cache was torn
    /// down while it was in flight.
    Aborted {
        /// The bundle that was requested.
        id: BundleId,
    },
}

impl BundleLoadError {
    /// Classifies an I/O error raised while reading `path`.
    pub fn from_io(id: BundleId, path: PathBuf, error: &io::Error) -> Self {
        if error.kind() == io::ErrorKind::NotFound {
            BundleLoadError::NotFound { id, path }
        } else {
            BundleLoadError::Unreadable {
                id,
                path,
                reason: error.to_string(),
            }
        }
    }

    /// The bundle the failed load was for.
    pub fn bundle_id(&self) -> &BundleId {
        match self {
            BundleLoadError::NotFound { id, .. }
            | BundleLoadError::Unreadable { id, .. }
            | BundleLoadError::DecodeFailed { id }
            | BundleLoadError::Aborted { id } => id,
        }
    }
}

impl fmt::Display for BundleLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleLoadError::NotFound { id, path } => {
                write!(f, "Bundle '{id}' not found at '{}'", path.display())
            }
            BundleLoadError::Unreadable { id, path, reason } => {
                write!(
                    f,
                    "Bundle '{id}' could not be read from '{}': {reason}",
                    path.display()
                )
            }
            BundleLoadError::DecodeFailed { id } => {
                write!(f, "Bundle '{id}' could not be decoded")
            }
            BundleLoadError::Aborted { id } => {
                write!(f, "Loading of bundle '{id}' was aborted")
            }
        }
    }
}

impl std::error::Error for BundleLoadError {}
