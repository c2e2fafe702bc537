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

//! AES-256-CBC encryption and SHA-256 checksumming (§4.2).
//!
//! This is not a cryptographically-rigorous steganography system: there is
//! no authentication tag, only a checksum computed over the ciphertext.
//! A password-derived key provides confidentiality against casual
//! inspection, nothing more (see spec.md §1 Non-goals).

use crate::error::{PixVeilError, Result};
use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const IV_LEN: usize = 16;

/// Derives a 256-bit key from a password via a single SHA-256 pass.
fn derive_key(password: &str) -> [u8; 32] {
    let digest = Sha256::digest(password.as_bytes());
    digest.into()
}

/// Encrypts `plaintext` with AES-256-CBC/PKCS#7 and a password-derived key.
/// Output layout is `IV || CIPHERTEXT` (§4.2). The IV is drawn from system
/// entropy when `rng_seed` is `None`; when `Some`, it's drawn from a
/// `ChaCha8Rng` seeded with it instead, so a pinned seed makes the output
/// blob byte-identical across runs (§8 scenario 6).
pub fn encrypt(plaintext: &[u8], password: &str, rng_seed: Option<u64>) -> Vec<u8> {
    let key = derive_key(password);
    let mut iv = [0u8; IV_LEN];
    match rng_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed).fill_bytes(&mut iv),
        None => rand::thread_rng().fill_bytes(&mut iv),
    }

    let encryptor = Aes256CbcEnc::new(&key.into(), &iv.into());
    let ciphertext = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    out
}

/// Decrypts an `IV || CIPHERTEXT` blob produced by [`encrypt`]. A wrong
/// password or a tampered ciphertext typically surfaces as a PKCS#7
/// padding failure, reported as `DecryptFailed`.
pub fn decrypt(blob: &[u8], password: &str) -> Result<Vec<u8>> {
    if blob.len() < IV_LEN {
        return Err(PixVeilError::DecryptFailed {
            reason: format!("blob too short to contain an IV: {} bytes", blob.len()),
        });
    }
    let (iv, ciphertext) = blob.split_at(IV_LEN);
    let key = derive_key(password);

    let decryptor = Aes256CbcDec::new(&key.into(), iv.into());
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| PixVeilError::DecryptFailed {
            reason: e.to_string(),
        })
}

/// Lowercase-hex SHA-256 digest over `data`, used as §3's payload checksum.
pub fn checksum_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Raw 32-byte SHA-256 digest, used for the map's `checksumBytes` field (§6.1).
pub fn checksum_bytes(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        // Arrange
        let plaintext = b"hello world, this is a secret payload";
        let password = "correct horse battery staple";

        // Act
        let encrypted = encrypt(plaintext, password, None);
        let decrypted = decrypt(&encrypted, password).unwrap();

        // Assert
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_iv_is_random_each_call() {
        // Arrange
        let plaintext = b"same plaintext every time";
        let password = "pw";

        // Act
        let first = encrypt(plaintext, password, None);
        let second = encrypt(plaintext, password, None);

        // Assert: same plaintext, different ciphertext because IV differs
        assert_ne!(first, second);
        assert_eq!(&first[..16].len(), &second[..16].len());
    }

    #[test]
    fn test_wrong_password_fails_to_decrypt() {
        // Arrange
        let plaintext = b"a secret message of reasonable length";
        let encrypted = encrypt(plaintext, "right password", None);

        // Act
        let result = decrypt(&encrypted, "wrong password");

        // Assert
        assert!(matches!(result, Err(PixVeilError::DecryptFailed { .. })));
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let encrypted = encrypt(b"", "pw", None);
        let decrypted = decrypt(&encrypted, "pw").unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_encrypt_with_same_seed_is_deterministic() {
        // Arrange
        let plaintext = b"reproducible output please";
        let password = "pw";

        // Act
        let first = encrypt(plaintext, password, Some(99));
        let second = encrypt(plaintext, password, Some(99));

        // Assert: pinned seed makes the whole IV||CIPHERTEXT blob identical
        assert_eq!(first, second);
    }

    #[test]
    fn test_encrypt_with_different_seeds_differs() {
        let plaintext = b"reproducible output please";
        let password = "pw";

        let first = encrypt(plaintext, password, Some(1));
        let second = encrypt(plaintext, password, Some(2));

        assert_ne!(first, second);
    }

    #[test]
    fn test_checksum_is_deterministic_and_lowercase_hex() {
        // Arrange
        let data = b"checksum me";

        // Act
        let a = checksum_hex(data);
        let b = checksum_hex(data);

        // Assert
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }

    #[test]
    fn test_checksum_bytes_matches_hex() {
        let data = b"same data";
        assert_eq!(hex::encode(checksum_bytes(data)), checksum_hex(data));
    }
}
