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

use super::bundle_config::{BundleManifest, BundleSource};
use crate::helpers::*;
use anyhow::{bail, Context, Result};
use clap::Args;
use satchel_core::platform::Platform;
use satchel_io::pack::PackWriter;
use satchel_io::SETTINGS_FILE_NAME;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct BundleArgs {
    /// Manifest listing the bundles to build.
    #[arg(long, default_value = SETTINGS_FILE_NAME)]
    manifest: PathBuf,
    /// Overrides the platform set in the manifest (windows, osx, android).
    #[arg(long)]
    platform: Option<Platform>,
    /// Overrides the output root set in the manifest.
    #[arg(long)]
    root_dir: Option<PathBuf>,
}

pub fn run(args: &BundleArgs) -> Result<()> {
    print_task_start("Packing Bundles", PACKAGE, MAGENTA);

    let (manifest, found) = BundleManifest::load(&args.manifest)?;
    if found {
        print_info(&format!(
            "Found '{}'. Loading configuration.",
            args.manifest.display()
        ));
    } else {
        print_info(&format!(
            "No '{}' found. Using default configuration.",
            args.manifest.display()
        ));
    }

    if manifest.bundles.is_empty() {
        print_warning("No bundles declared. Nothing to pack.");
        return Ok(());
    }

    let mut settings = manifest.settings;
    if let Some(platform) = args.platform {
        settings = settings.with_platform(platform);
    }
    if let Some(root_dir) = &args.root_dir {
        settings = settings.with_root_dir(root_dir);
    }

    let out_dir = settings.resolver().platform_dir();
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create '{}'", out_dir.display()))?;

    for bundle in &manifest.bundles {
        let (count, size) = pack_bundle(bundle, &out_dir)?;
        print_success(&format!(
            "{} ({} assets, {:.2} KB)",
            out_dir.join(&bundle.name).display(),
            count,
            size as f64 / 1024.0
        ));
    }

    print_success(&format!(
        "Packed {} bundles for {}",
        manifest.bundles.len(),
        settings.platform
    ));
    Ok(())
}

/// Packs every file under `bundle.source` into `<out_dir>/<bundle.name>`.
///
/// Returns the number of assets and the size of the written pack.
fn pack_bundle(bundle: &BundleSource, out_dir: &Path) -> Result<(usize, usize)> {
    if !bundle.source.is_dir() {
        bail!(
            "Source directory '{}' of bundle '{}' does not exist",
            bundle.source.display(),
            bundle.name
        );
    }

    let mut writer = PackWriter::new();
    for path in find_asset_files(&bundle.source)? {
        let Some((name, type_name)) = asset_key(&path) else {
            print_warning(&format!("Skipping '{}': no extension", path.display()));
            continue;
        };
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read asset file '{}'", path.display()))?;
        writer
            .add(name, type_name, &bytes)
            .with_context(|| format!("Cannot add '{}' to '{}'", path.display(), bundle.name))?;
    }

    let count = writer.len();
    let bytes = writer.finish()?;
    let out_path = out_dir.join(&bundle.name);
    fs::write(&out_path, &bytes)
        .with_context(|| format!("Failed to write bundle to '{}'", out_path.display()))?;
    Ok((count, bytes.len()))
}

/// Recursively finds all files under `dir`, sorted by path.
fn find_asset_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk '{}'", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// The asset name (file stem) and type name (lowercase extension) of `path`.
fn asset_key(path: &Path) -> Option<(String, String)> {
    let name = path.file_stem()?.to_str()?;
    let type_name = path.extension()?.to_str()?;
    Some((name.to_string(), type_name.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_io::pack::PackReader;

    #[test]
    fn asset_key_uses_stem_and_lowercase_extension() {
        assert_eq!(
            asset_key(Path::new("assets/demo/Hero.PNG")),
            Some(("Hero".into(), "png".into()))
        );
        assert_eq!(asset_key(Path::new("assets/demo/README")), None);
    }

    #[test]
    fn packs_source_tree_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("demo");
        fs::create_dir_all(source.join("sfx")).unwrap();
        fs::write(source.join("Hero.texture"), b"hero").unwrap();
        fs::write(source.join("sfx").join("Jump.wav"), b"jump").unwrap();
        fs::write(source.join("LICENSE"), b"skipped").unwrap();

        let out_dir = dir.path().join("out");
        fs::create_dir_all(&out_dir).unwrap();
        let bundle = BundleSource {
            name: "demo.bundle".into(),
            source,
        };

        let (count, _) = pack_bundle(&bundle, &out_dir).unwrap();
        assert_eq!(count, 2);

        let bytes = fs::read(out_dir.join("demo.bundle")).unwrap();
        let contents = PackReader::parse(&bytes).unwrap();
        let keys: Vec<_> = contents
            .entries()
            .iter()
            .map(|e| (e.name.as_str(), e.type_name.as_str()))
            .collect();
        assert_eq!(keys, [("Hero", "texture"), ("Jump", "wav")]);
        assert_eq!(contents.entries()[1].decompress().unwrap(), b"jump");
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = BundleSource {
            name: "ghost.bundle".into(),
            source: dir.path().join("nope"),
        };
        assert!(pack_bundle(&bundle, dir.path()).is_err());
    }
}
