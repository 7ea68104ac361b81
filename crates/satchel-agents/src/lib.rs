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

//! Control-plane agents of the bundle loader.
//!
//! [`bundle_agent::BundleCache`] owns every loaded bundle and guarantees that
//! a bundle file is read and decoded at most once while it stays resident.
//! [`bundle_agent::AssetFetcher`] is the front door hosts use to pull assets
//! out of bundles by name or by type.

#![warn(missing_docs)]

pub mod bundle_agent;
