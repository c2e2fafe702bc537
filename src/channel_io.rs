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

//! Per-byte channel embedding/extraction (§4.3), shared by the injection
//! engine, the extraction engine, and the distribution-map prefix codec.
//!
//! A byte is split into `ceil(8 / bitsPerChannel)` slices from the LSB end
//! and each slice is written into the low bits of a channel, cycling
//! through the entry's `channelSequence` to decide the R/G/B write order
//! *within* each pixel the entry owns. The abstract-position ->
//! physical-channel mapping itself never depends on `channelSequence`: it
//! is always `RawImage::get_channel`/`set_channel`'s fixed `pos % 3`
//! bijection (pixel `pos / 3`, channel `pos % 3`). `channelSequence` only
//! decides, for a given slot in the current pixel, which of that *same*
//! pixel's positions the next slice lands on. This is why the placement
//! engine (`placement.rs`) gives every chunk a pixel-aligned start and
//! reserves whole pixels: two chunks' disjoint position ranges are
//! physically disjoint only when neither straddles a pixel the other owns.
//!
//! When `bitsPerChannel` divides 8 evenly (1, 2, 4, 8 — the values this
//! crate's config boundaries exercise), this is exactly equivalent to
//! packing the channel stream continuously across byte boundaries, so §3
//! invariant 2's `ceil(length * 8 / bitsPerChannel)` channel-span formula
//! holds exactly. For the non-dividing widths (3, 5, 6, 7) this per-byte-
//! restart choice wastes up to `bitsPerChannel - 1` bits in the last channel
//! of every byte rather than carrying them into the next byte; see
//! DESIGN.md for why that tradeoff was taken.

use crate::bitio::{extract_bits, insert_bits};
use crate::distribution_map::Channel;
use crate::image_adapter::RawImage;

/// Channels one byte occupies at `bits_per_channel` bits per channel.
pub fn channels_per_byte(bits_per_channel: u8) -> usize {
    8usize.div_ceil(bits_per_channel as usize)
}

/// Total channels needed to carry `byte_len` bytes.
pub fn channels_needed(byte_len: usize, bits_per_channel: u8) -> usize {
    byte_len * channels_per_byte(bits_per_channel)
}

fn channel_offset(channel: Channel) -> usize {
    match channel {
        Channel::R => 0,
        Channel::G => 1,
        Channel::B => 2,
        Channel::A => 3,
    }
}

/// Resolves abstract position `pos` plus a `channelSequence` write-order
/// permutation down to the actual position to read/write, without ever
/// changing which *pixel* is touched. `pos`'s pixel and slot-within-pixel
/// (`pos / 3`, `pos % 3`) pick out the fixed group of three positions that
/// make up one pixel; `sequence[pos % 3]` then says which of that group's
/// three fixed channels this slot's data belongs on. Since the group itself
/// never moves, two callers with disjoint `pos` ranges can never resolve to
/// the same physical channel, regardless of the `sequence` each one uses.
fn permuted_position(pos: usize, sequence: &[Channel; 3]) -> usize {
    let slot = pos % 3;
    let group_base = pos - slot;
    group_base + channel_offset(sequence[slot])
}

/// Writes `byte`'s bits into `image` starting at channel `start_pos`,
/// cycling through `sequence` for the R/G/B write order within each pixel.
/// Returns the position just past the last channel written.
pub fn embed_byte(
    image: &mut RawImage,
    sequence: &[Channel; 3],
    bits_per_channel: u8,
    start_pos: usize,
    byte: u8,
) -> usize {
    let mut pos = start_pos;
    let mut start_bit = 0u8;
    while start_bit < 8 {
        let count = bits_per_channel.min(8 - start_bit);
        let bits = extract_bits(byte, start_bit, count);
        let target = permuted_position(pos, sequence);
        let current = image.get_channel(target);
        image.set_channel(target, insert_bits(current, bits, 0, count));
        pos += 1;
        start_bit += count;
    }
    pos
}

/// Reverses [`embed_byte`]. Returns the decoded byte and the position just
/// past the last channel read.
pub fn extract_byte(
    image: &RawImage,
    sequence: &[Channel; 3],
    bits_per_channel: u8,
    start_pos: usize,
) -> (u8, usize) {
    let mut pos = start_pos;
    let mut start_bit = 0u8;
    let mut byte = 0u8;
    while start_bit < 8 {
        let count = bits_per_channel.min(8 - start_bit);
        let target = permuted_position(pos, sequence);
        let channel_val = image.get_channel(target);
        let bits = extract_bits(channel_val, 0, count);
        byte = insert_bits(byte, bits, start_bit, count);
        pos += 1;
        start_bit += count;
    }
    (byte, pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_image(w: u32, h: u32) -> RawImage {
        RawImage {
            width: w,
            height: h,
            rgba: vec![0u8; (w * h * 4) as usize],
        }
    }

    #[test]
    fn test_embed_extract_byte_roundtrip_all_bpc() {
        let seq = [Channel::R, Channel::G, Channel::B];
        for k in 1..=8u8 {
            let mut image = blank_image(4, 4);
            for &byte in &[0u8, 0xFF, 0b1010_0101, 1, 128] {
                let end = embed_byte(&mut image, &seq, k, 0, byte);
                let (decoded, end2) = extract_byte(&image, &seq, k, 0);
                assert_eq!(decoded, byte, "k={k} byte={byte:#x}");
                assert_eq!(end, end2);
            }
        }
    }

    #[test]
    fn test_embed_advances_by_channels_per_byte() {
        let seq = [Channel::R, Channel::G, Channel::B];
        let mut image = blank_image(8, 8);
        let end = embed_byte(&mut image, &seq, 3, 0, 0xAB);
        assert_eq!(end, channels_per_byte(3));
    }

    #[test]
    fn test_channel_sequence_permutation_is_respected() {
        // Slot 0 of the sequence [G,B,R] must land on the G channel.
        let seq = [Channel::G, Channel::B, Channel::R];
        let mut image = blank_image(2, 2);
        embed_byte(&mut image, &seq, 8, 0, 0xAB);
        assert_eq!(image.rgba[1], 0xAB);
    }

    #[test]
    fn test_alpha_is_never_touched() {
        let seq = [Channel::R, Channel::G, Channel::B];
        let mut image = blank_image(2, 2);
        image.rgba[3] = 200;
        let mut pos = 0;
        for _ in 0..3 {
            pos = embed_byte(&mut image, &seq, 8, pos, 0xFF);
        }
        assert_eq!(image.rgba[3], 200);
    }

    #[test]
    fn test_sequential_bytes_do_not_overlap() {
        let seq = [Channel::R, Channel::G, Channel::B];
        let mut image = blank_image(4, 4);
        let mut pos = 0;
        let bytes = [0x12u8, 0x34, 0x56, 0x78];
        for &b in &bytes {
            pos = embed_byte(&mut image, &seq, 2, pos, b);
        }
        let mut pos = 0;
        for &expected in &bytes {
            let (decoded, next) = extract_byte(&image, &seq, 2, pos);
            assert_eq!(decoded, expected);
            pos = next;
        }
    }

    #[test]
    fn test_adjacent_pixel_aligned_spans_with_different_sequences_do_not_collide() {
        // Two "chunks" sharing a carrier, each using a distinct
        // channel_sequence, placed back to back at pixel-aligned starts (as
        // placement.rs now guarantees). Neither chunk's bytes should ever
        // perturb the other's, regardless of how their sequences permute
        // writes within their own pixels.
        let seq_a = [Channel::G, Channel::B, Channel::R];
        let seq_b = [Channel::B, Channel::R, Channel::G];
        let mut image = blank_image(8, 8);

        let bytes_a = [0xDEu8, 0xAD];
        let bytes_b = [0xBEu8, 0xEF];

        let mut pos_a = 0;
        for &b in &bytes_a {
            pos_a = embed_byte(&mut image, &seq_a, 8, pos_a, b);
        }
        // bytes_a occupies 2 full pixels (8 bpc => 1 channel/byte... actually
        // 1 slice covers the whole byte at bpc=8, channels_per_byte==1) so
        // pad its span up to a pixel boundary before starting chunk B.
        let start_b = pos_a.div_ceil(3) * 3;
        let mut pos_b = start_b;
        for &b in &bytes_b {
            pos_b = embed_byte(&mut image, &seq_b, 8, pos_b, b);
        }
        let _ = pos_b;

        let mut pos = 0;
        for &expected in &bytes_a {
            let (decoded, next) = extract_byte(&image, &seq_a, 8, pos);
            assert_eq!(decoded, expected);
            pos = next;
        }

        let mut pos = start_b;
        for &expected in &bytes_b {
            let (decoded, next) = extract_byte(&image, &seq_b, 8, pos);
            assert_eq!(decoded, expected);
            pos = next;
        }
    }
}
