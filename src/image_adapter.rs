// Copyright 2025 Niclas Hedam
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

//! Loads a carrier PNG into a raw RGBA pixel array and writes one back.
//!
//! This is the one module in the crate that talks to an actual PNG codec
//! (the `image` crate); everything above it works on plain `&[u8]`/`&mut
//! [u8]` pixel buffers so the rest of the pipeline stays testable without
//! real image files.

use crate::error::{PixVeilError, Result};
use image::{ImageBuffer, Rgba};
use std::path::Path;

/// A decoded carrier: raster-order RGBA bytes plus dimensions.
///
/// `rgba` is always `width * height * 4` bytes long; alpha is preserved
/// verbatim through encode/decode and is never used to carry payload bits.
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RawImage {
    /// Number of usable RGB channels in this image's flattened channel
    /// stream (alpha excluded), per §3/§9's normalization rule.
    pub fn rgb_channel_count(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Reads the channel value at a position in the flattened, alpha-free
    /// RGB channel stream (raster order: pixel 0's R,G,B, then pixel 1's...).
    pub fn get_channel(&self, channel_pos: usize) -> u8 {
        let pixel_idx = channel_pos / 3;
        let channel_idx = channel_pos % 3;
        self.rgba[pixel_idx * 4 + channel_idx]
    }

    /// Writes the channel value at a position in the flattened RGB stream.
    pub fn set_channel(&mut self, channel_pos: usize, value: u8) {
        let pixel_idx = channel_pos / 3;
        let channel_idx = channel_pos % 3;
        self.rgba[pixel_idx * 4 + channel_idx] = value;
    }

    /// Overwrites an 8x8 block starting at the pixel owning `channel_pos`
    /// with a solid color. Diagnostic only (§4.7's debug-visuals flag).
    pub fn paint_debug_block(&mut self, channel_pos: usize, color: [u8; 3]) {
        let pixel_idx = (channel_pos / 3) as u32;
        let origin_x = pixel_idx % self.width;
        let origin_y = pixel_idx / self.width;
        for dy in 0..8u32 {
            let y = origin_y + dy;
            if y >= self.height {
                break;
            }
            for dx in 0..8u32 {
                let x = origin_x + dx;
                if x >= self.width {
                    break;
                }
                let idx = ((y * self.width + x) * 4) as usize;
                self.rgba[idx] = color[0];
                self.rgba[idx + 1] = color[1];
                self.rgba[idx + 2] = color[2];
            }
        }
    }
}

/// Loads a PNG from disk into a raw RGBA buffer.
pub fn load_png(path: &Path) -> Result<RawImage> {
    let img = image::open(path)
        .map_err(|source| PixVeilError::PngDecode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(RawImage {
        width,
        height,
        rgba: img.into_raw(),
    })
}

/// Writes a raw RGBA buffer back out as a PNG.
pub fn save_png(path: &Path, image: &RawImage) -> Result<()> {
    let buffer: ImageBuffer<Rgba<u8>, _> =
        ImageBuffer::from_raw(image.width, image.height, image.rgba.clone()).ok_or_else(|| {
            PixVeilError::PngEncode {
                path: path.to_path_buf(),
                source: image::ImageError::Parameter(image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                )),
            }
        })?;
    buffer
        .save(path)
        .map_err(|source| PixVeilError::PngEncode {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn synthetic_raw(width: u32, height: u32) -> RawImage {
        let mut rgba = vec![0u8; (width * height * 4) as usize];
        for (i, px) in rgba.chunks_mut(4).enumerate() {
            px[0] = (i % 256) as u8;
            px[1] = ((i * 3) % 256) as u8;
            px[2] = ((i * 7) % 256) as u8;
            px[3] = 255;
        }
        RawImage {
            width,
            height,
            rgba,
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carrier.png");
        let image = synthetic_raw(16, 16);

        // Act
        save_png(&path, &image).unwrap();
        let loaded = load_png(&path).unwrap();

        // Assert
        assert_eq!(loaded.width, 16);
        assert_eq!(loaded.height, 16);
        assert_eq!(loaded.rgba, image.rgba);
    }

    #[test]
    fn test_channel_get_set_skips_alpha() {
        // Arrange
        let mut image = synthetic_raw(4, 4);
        let rgb_count = image.rgb_channel_count();

        // Act
        image.set_channel(0, 111);
        image.set_channel(1, 222);

        // Assert
        assert_eq!(rgb_count, 4 * 4 * 3);
        assert_eq!(image.get_channel(0), 111);
        assert_eq!(image.get_channel(1), 222);
        // alpha untouched
        assert_eq!(image.rgba[3], 255);
    }

    #[test]
    fn test_load_missing_file_is_io_error_wrapped_as_png_decode() {
        let result = load_png(Path::new("/nonexistent/path/to/file.png"));
        assert!(matches!(result, Err(PixVeilError::PngDecode { .. })));
    }

    #[test]
    fn test_debug_block_paints_only_in_bounds() {
        // Arrange: 4x4 image, block at pixel 0 would normally be 8x8
        let mut image = synthetic_raw(4, 4);

        // Act
        image.paint_debug_block(0, [255, 0, 0]);

        // Assert: every pixel in the (clamped) image is now red
        for px in image.rgba.chunks(4) {
            assert_eq!(px[0], 255);
            assert_eq!(px[1], 0);
            assert_eq!(px[2], 0);
        }
    }

    #[test]
    fn test_rgbaimage_shape_sanity() {
        let image = RgbaImage::new(2, 2);
        assert_eq!(image.as_raw().len(), 16);
    }
}
