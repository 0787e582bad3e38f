//
// Copyright (c) 2025 Housler Team
// This source code is subject to the terms of the MIT license.
//
// Project: housler-crypto — PII-at-rest protection for the Housler ecosystem.
//

//! Field-scoped AEAD codec and blind index.
//!
//! # Quick start
//!
//! ```rust
//! use housler_crypto::Codec;
//!
//! let codec = Codec::with_defaults(&Codec::generate_key()).unwrap();
//! let ciphertext = codec.encrypt("+79991234567", "phone");
//! assert!(ciphertext.starts_with("hc1:"));
//! assert_eq!(codec.decrypt(&ciphertext, "phone").unwrap(), "+79991234567");
//! ```

use std::fmt;

use aead::{Aead, KeyInit, Payload};
use aes_gcm::Aes256Gcm;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sha2::Sha256;

use crate::error::{ConfigurationError, DecryptionError};
use crate::subkey::{Purpose, SubkeyCache};

type HmacSha256 = Hmac<Sha256>;

/// Envelope prefix identifying housler-crypto ciphertext.
pub const ENVELOPE_PREFIX: &str = "hc1:";

/// Default PBKDF2 iteration count used by [`Codec::with_defaults`].
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Default derivation salt used by [`Codec::with_defaults`].
pub const DEFAULT_SALT: &str = "housler_crypto_v1";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Field-scoped authenticated encryption and deterministic blind indexing.
///
/// A `Codec` holds a master key and derives one AEAD subkey and one
/// blind-index subkey per field, both via PBKDF2-HMAC-SHA256, memoized in
/// an internal cache. Every operation is infallible to construct but the
/// subkey cache's master key and derived subkeys are zeroized on drop.
pub struct Codec {
    subkeys: SubkeyCache,
}

impl Codec {
    /// Build a codec from an explicit master key, salt, and PBKDF2
    /// iteration count.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if `master_key` is empty, is not
    /// valid hex, or does not decode to exactly 32 bytes, or if `salt` is
    /// empty.
    pub fn new(master_key: &str, salt: &str, iterations: u32) -> Result<Self, ConfigurationError> {
        if master_key.is_empty() {
            return Err(ConfigurationError::MissingMasterKey);
        }
        if salt.is_empty() {
            return Err(ConfigurationError::MissingSalt);
        }

        let key_bytes =
            hex::decode(master_key).map_err(|_| ConfigurationError::InvalidMasterKeyEncoding)?;
        if key_bytes.len() != KEY_LEN {
            return Err(ConfigurationError::InvalidMasterKeyLength);
        }

        Ok(Self {
            subkeys: SubkeyCache::new(key_bytes, salt.to_string(), iterations),
        })
    }

    /// Build a codec using [`DEFAULT_SALT`] and [`DEFAULT_ITERATIONS`].
    pub fn with_defaults(master_key: &str) -> Result<Self, ConfigurationError> {
        Self::new(master_key, DEFAULT_SALT, DEFAULT_ITERATIONS)
    }

    /// Generate a fresh random master key: 32 bytes, lowercase hex.
    pub fn generate_key() -> String {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        hex::encode(key)
    }

    /// Encrypt `plaintext` under the subkey derived for `field`.
    ///
    /// Empty input and input already in envelope form (`hc1:...`) pass
    /// through unchanged — the latter makes `encrypt` idempotent against
    /// accidental double-encryption.
    pub fn encrypt(&self, plaintext: &str, field: &str) -> String {
        if plaintext.is_empty() || Self::is_encrypted(plaintext) {
            return plaintext.to_string();
        }

        let key = self.subkeys.derive(Purpose::Enc, field);
        let cipher = Aes256Gcm::new_from_slice(&key).expect("key is exactly 32 bytes");

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(
                (&nonce).into(),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: field.as_bytes(),
                },
            )
            .expect("AES-256-GCM encryption cannot fail with a valid key and nonce");

        let mut envelope = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);

        format!("{ENVELOPE_PREFIX}{}", URL_SAFE_NO_PAD.encode(envelope))
    }

    /// Decrypt a value produced by [`Codec::encrypt`] for the same
    /// `field`.
    ///
    /// Empty input passes through as empty. Input without the `hc1:`
    /// prefix is treated as already-plaintext and passed through
    /// unchanged (legacy-unaware callers may hand this function values
    /// that were never encrypted). Any other failure — truncated
    /// payload, malformed base64, authentication failure, wrong field —
    /// reports uniformly as [`DecryptionError`].
    pub fn decrypt(&self, value: &str, field: &str) -> Result<String, DecryptionError> {
        if value.is_empty() {
            return Ok(String::new());
        }
        let Some(encoded) = value.strip_prefix(ENVELOPE_PREFIX) else {
            return Ok(value.to_string());
        };

        let raw = URL_SAFE_NO_PAD.decode(encoded).map_err(|_| DecryptionError)?;
        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(DecryptionError);
        }
        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce_array: &[u8; NONCE_LEN] = nonce.try_into().map_err(|_| DecryptionError)?;

        let key = self.subkeys.derive(Purpose::Enc, field);
        let cipher = Aes256Gcm::new_from_slice(&key).expect("key is exactly 32 bytes");

        let plaintext = cipher
            .decrypt(
                nonce_array.into(),
                Payload {
                    msg: ciphertext,
                    aad: field.as_bytes(),
                },
            )
            .map_err(|_| DecryptionError)?;

        String::from_utf8(plaintext).map_err(|_| DecryptionError)
    }

    /// Report whether `value` is in envelope form.
    pub fn is_encrypted(value: &str) -> bool {
        value.starts_with(ENVELOPE_PREFIX)
    }

    /// Deterministic keyed hash of `value` for equality search on an
    /// encrypted column.
    ///
    /// `value` is canonicalized (trimmed, ASCII-lowercased) before
    /// hashing so that `blind_index("Test@Example.com", "email")` and
    /// `blind_index(" test@example.com ", "email")` agree. This is a
    /// narrower canonicalization than [`crate::canon::normalize_email`]'s
    /// full Unicode case folding — the index only folds ASCII case, by
    /// design, since it must stay a pure function of its bytes with no
    /// locale-sensitive behavior. Empty input maps to an empty string,
    /// never a hash of the empty string — an indexed empty column should
    /// search as "no value", not as one specific value among many.
    pub fn blind_index(&self, value: &str, field: &str) -> String {
        let trimmed = value.trim();
        let canonical: String = trimmed.chars().map(|c| c.to_ascii_lowercase()).collect();
        if canonical.is_empty() {
            return String::new();
        }

        let key = self.subkeys.derive(Purpose::Idx, field);
        let mut mac = HmacSha256::new_from_slice(&key).expect("key is exactly 32 bytes");
        mac.update(canonical.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec").field("subkeys", &"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    fn codec() -> Codec {
        Codec::with_defaults(TEST_KEY).unwrap()
    }

    #[test]
    fn new_rejects_missing_master_key() {
        assert_eq!(
            Codec::new("", DEFAULT_SALT, DEFAULT_ITERATIONS).unwrap_err(),
            ConfigurationError::MissingMasterKey
        );
    }

    #[test]
    fn new_rejects_non_hex_master_key() {
        assert_eq!(
            Codec::new("not-hex-at-all!!", DEFAULT_SALT, DEFAULT_ITERATIONS).unwrap_err(),
            ConfigurationError::InvalidMasterKeyEncoding
        );
    }

    #[test]
    fn new_rejects_wrong_length_master_key() {
        assert_eq!(
            Codec::new("aabb", DEFAULT_SALT, DEFAULT_ITERATIONS).unwrap_err(),
            ConfigurationError::InvalidMasterKeyLength
        );
    }

    #[test]
    fn generate_key_produces_valid_hex_32_bytes() {
        let key = Codec::generate_key();
        assert_eq!(key.len(), 64);
        assert!(Codec::new(&key, DEFAULT_SALT, DEFAULT_ITERATIONS).is_ok());
    }

    #[test]
    fn encrypt_decrypt_round_trip_ascii() {
        let c = codec();
        let ciphertext = c.encrypt("hello world", "name");
        assert!(ciphertext.starts_with(ENVELOPE_PREFIX));
        assert_eq!(c.decrypt(&ciphertext, "name").unwrap(), "hello world");
    }

    #[test]
    fn encrypt_decrypt_round_trip_cyrillic() {
        let c = codec();
        let ciphertext = c.encrypt("Иван Иванов", "name");
        assert_eq!(c.decrypt(&ciphertext, "name").unwrap(), "Иван Иванов");
    }

    #[test]
    fn empty_string_passes_through_both_directions() {
        let c = codec();
        assert_eq!(c.encrypt("", "email"), "");
        assert_eq!(c.decrypt("", "email").unwrap(), "");
    }

    #[test]
    fn encrypt_is_idempotent() {
        let c = codec();
        let once = c.encrypt("value", "field");
        let twice = c.encrypt(&once, "field");
        assert_eq!(once, twice);
    }

    #[test]
    fn decrypt_passes_through_plaintext() {
        let c = codec();
        assert_eq!(c.decrypt("plain text", "field").unwrap(), "plain text");
    }

    #[test]
    fn field_isolation_different_fields_different_ciphertext() {
        let c = codec();
        let a = c.encrypt("shared-value", "email");
        let b = c.encrypt("shared-value", "phone");
        assert_ne!(a, b);
        assert_eq!(c.decrypt(&a, "email").unwrap(), "shared-value");
        assert_eq!(c.decrypt(&b, "phone").unwrap(), "shared-value");
    }

    #[test]
    fn field_isolation_wrong_field_fails_to_decrypt() {
        let c = codec();
        let ciphertext = c.encrypt("value", "email");
        assert!(c.decrypt(&ciphertext, "phone").is_err());
    }

    #[test]
    fn nonce_randomness_same_plaintext_differs_each_time() {
        let c = codec();
        let a = c.encrypt("value", "field");
        let b = c.encrypt("value", "field");
        assert_ne!(a, b);
        assert_eq!(c.decrypt(&a, "field").unwrap(), "value");
        assert_eq!(c.decrypt(&b, "field").unwrap(), "value");
    }

    #[test]
    fn blind_index_is_deterministic() {
        let c = codec();
        assert_eq!(c.blind_index("value", "email"), c.blind_index("value", "email"));
    }

    #[test]
    fn blind_index_is_hex_64_chars() {
        let c = codec();
        let idx = c.blind_index("value", "email");
        assert_eq!(idx.len(), 64);
        assert!(idx.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn blind_index_is_case_and_whitespace_insensitive() {
        let c = codec();
        assert_eq!(
            c.blind_index("Test@Example.com", "email"),
            c.blind_index("  test@example.com  ", "email")
        );
    }

    #[test]
    fn blind_index_differs_by_field() {
        let c = codec();
        assert_ne!(c.blind_index("value", "email"), c.blind_index("value", "phone"));
    }

    #[test]
    fn blind_index_of_empty_is_empty() {
        let c = codec();
        assert_eq!(c.blind_index("", "email"), "");
    }

    #[test]
    fn cross_instance_same_config_interop() {
        let a = codec();
        let b = codec();
        let ciphertext = a.encrypt("value", "email");
        assert_eq!(b.decrypt(&ciphertext, "email").unwrap(), "value");
        assert_eq!(a.blind_index("value", "email"), b.blind_index("value", "email"));
    }

    #[test]
    fn cross_instance_different_salt_fails_to_decrypt() {
        let a = Codec::with_defaults(TEST_KEY).unwrap();
        let b = Codec::new(TEST_KEY, "a-different-salt", DEFAULT_ITERATIONS).unwrap();
        let ciphertext = a.encrypt("value", "email");
        assert!(b.decrypt(&ciphertext, "email").is_err());
    }

    #[test]
    fn cross_instance_different_iterations_fails_to_decrypt() {
        let a = Codec::new(TEST_KEY, DEFAULT_SALT, 1_000).unwrap();
        let b = Codec::new(TEST_KEY, DEFAULT_SALT, 2_000).unwrap();
        let ciphertext = a.encrypt("value", "email");
        assert!(b.decrypt(&ciphertext, "email").is_err());
    }

    #[test]
    fn is_encrypted_detects_envelope_prefix() {
        let c = codec();
        let ciphertext = c.encrypt("value", "email");
        assert!(Codec::is_encrypted(&ciphertext));
        assert!(!Codec::is_encrypted("plain"));
        assert!(!Codec::is_encrypted(""));
    }

    #[test]
    fn debug_never_leaks_key_material() {
        let c = codec();
        assert!(!format!("{c:?}").contains(TEST_KEY));
    }
}
