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

//! Tone classification and per-carrier capacity analysis (§3, §4.4).

use crate::image_adapter::RawImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Coarse luminance class of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tone {
    Low,
    Mid,
    High,
}

/// `Y = round(0.299R + 0.587G + 0.114B)`; low < 85, mid < 170, else high.
pub fn classify(r: u8, g: u8, b: u8) -> Tone {
    let y = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round();
    if y < 85.0 {
        Tone::Low
    } else if y < 170.0 {
        Tone::Mid
    } else {
        Tone::High
    }
}

/// Per-image channel counts by tone (each pixel contributes 3 RGB channels).
#[derive(Debug, Clone, Copy, Default)]
pub struct ToneCounts {
    pub low: usize,
    pub mid: usize,
    pub high: usize,
}

impl ToneCounts {
    pub fn total_channels(&self) -> usize {
        self.low + self.mid + self.high
    }

    /// The tone with the most channels; §4.6 sorts carriers by ascending
    /// tone priority (low < mid < high) using this as the representative tone.
    pub fn dominant_tone(&self) -> Tone {
        if self.low >= self.mid && self.low >= self.high {
            Tone::Low
        } else if self.mid >= self.high {
            Tone::Mid
        } else {
            Tone::High
        }
    }
}

/// Analyzes a raw RGBA buffer, classifying every pixel's tone (alpha
/// excluded) and counting the RGB channels that fall into each bucket.
pub fn analyze(image: &RawImage) -> ToneCounts {
    let mut counts = ToneCounts::default();
    for px in image.rgba.chunks(4) {
        match classify(px[0], px[1], px[2]) {
            Tone::Low => counts.low += 3,
            Tone::Mid => counts.mid += 3,
            Tone::High => counts.high += 3,
        }
    }
    counts
}

/// Per-pixel tone, raster order, used by the placement engine to prefer
/// `low`-tone regions when probing for a free channel range (§4.6).
pub fn pixel_tones(image: &RawImage) -> Vec<Tone> {
    image
        .rgba
        .chunks(4)
        .map(|px| classify(px[0], px[1], px[2]))
        .collect()
}

/// Byte capacity of an image at a given `bits_per_channel`, per §3:
/// `floor(rgb_channel_count * bitsPerChannel / 8)`.
pub fn capacity_bytes(rgb_channel_count: usize, bits_per_channel: u8) -> usize {
    (rgb_channel_count * bits_per_channel as usize) / 8
}

/// Read-mostly cache of tone analysis results, keyed by absolute path.
/// Encode writes carriers to a different output directory, so a cached
/// result is never invalidated by the run that produced it (§4.4, §5).
#[derive(Default)]
pub struct ToneCache {
    entries: Mutex<HashMap<PathBuf, ToneCounts>>,
}

impl ToneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached tone counts for `path`, computing and storing
    /// them via `analyze_fn` on first access.
    pub fn get_or_analyze(
        &self,
        path: &PathBuf,
        analyze_fn: impl FnOnce() -> ToneCounts,
    ) -> ToneCounts {
        let mut entries = self.entries.lock().expect("tone cache mutex poisoned");
        *entries.entry(path.clone()).or_insert_with(analyze_fn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0, 0, 0), Tone::Low);
        assert_eq!(classify(84, 84, 84), Tone::Low);
        assert_eq!(classify(85, 85, 85), Tone::Mid);
        assert_eq!(classify(169, 169, 169), Tone::Mid);
        assert_eq!(classify(170, 170, 170), Tone::High);
        assert_eq!(classify(255, 255, 255), Tone::High);
    }

    #[test]
    fn test_analyze_counts_three_channels_per_pixel() {
        // Arrange: 2x1 image, one black pixel (low), one white pixel (high)
        let image = RawImage {
            width: 2,
            height: 1,
            rgba: vec![0, 0, 0, 255, 255, 255, 255, 255],
        };

        // Act
        let counts = analyze(&image);

        // Assert
        assert_eq!(counts.low, 3);
        assert_eq!(counts.high, 3);
        assert_eq!(counts.mid, 0);
        assert_eq!(counts.total_channels(), 6);
    }

    #[test]
    fn test_capacity_bytes_floor() {
        // 10 channels, 2 bits per channel => 20 bits => 2 bytes (floor)
        assert_eq!(capacity_bytes(10, 2), 2);
        // 3 channels, 8 bits per channel => 24 bits => 3 bytes exactly
        assert_eq!(capacity_bytes(3, 8), 3);
    }

    #[test]
    fn test_dominant_tone_prefers_low_on_tie() {
        let counts = ToneCounts {
            low: 10,
            mid: 10,
            high: 10,
        };
        assert_eq!(counts.dominant_tone(), Tone::Low);
    }

    #[test]
    fn test_cache_computes_once() {
        // Arrange
        let cache = ToneCache::new();
        let path = PathBuf::from("/fake/path.png");
        let mut calls = 0;

        // Act
        let first = cache.get_or_analyze(&path, || {
            calls += 1;
            ToneCounts {
                low: 5,
                ..Default::default()
            }
        });
        let second = cache.get_or_analyze(&path, || {
            calls += 1;
            ToneCounts::default()
        });

        // Assert
        assert_eq!(first.low, 5);
        assert_eq!(second.low, 5);
        assert_eq!(calls, 1);
    }
}
