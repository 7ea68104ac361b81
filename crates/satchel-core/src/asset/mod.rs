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

//! Provides the primitive types for assets extracted from bundles.
//!
//! An asset is an opaque, typed payload. The cache never looks inside one; it
//! only moves [`AssetHandle`]s from the archive decoder to the caller.

mod handle;

pub use handle::*;

/// A marker trait for types that can be extracted from a bundle.
///
/// The supertraits enforce the guarantees needed by background loading:
/// - `Send` + `Sync`: the asset can be shared between the load task and callers.
/// - `'static`: the asset owns its data and can outlive the bundle it came from.
///
/// # Examples
///
/// ```
/// use satchel_core::asset::Asset;
///
/// struct Texture {
///     width: u32,
///     height: u32,
/// }
///
/// impl Asset for Texture {}
/// ```
pub trait Asset: Send + Sync + 'static {}
