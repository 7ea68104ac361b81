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

//! Image decoding.

use super::AssetLoader;
use anyhow::Context;
use satchel_core::asset::Asset;

/// A decoded image in RGBA8, sRGB, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl Asset for Image {}

/// Decodes any format the `image` crate recognizes (PNG, JPEG, BMP, ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLoader;

impl AssetLoader<Image> for ImageLoader {
    fn load(&self, bytes: &[u8]) -> Result<Image, Box<dyn std::error::Error + Send + Sync>> {
        let img = image::load_from_memory(bytes).context("Failed to decode image from memory")?;

        // Keep sRGB, only normalize the channel layout.
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Image {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn decodes_png_to_rgba() {
        let mut source = RgbaImage::new(2, 1);
        source.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        source.put_pixel(1, 0, Rgba([0, 0, 255, 128]));
        let mut png = Vec::new();
        source
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let image = ImageLoader.load(&png).unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.pixels, [255, 0, 0, 255, 0, 0, 255, 128]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(ImageLoader.load(b"definitely not an image").is_err());
    }
}
