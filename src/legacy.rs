//
// Copyright (c) 2025 Housler Team
// This source code is subject to the terms of the MIT license.
//
// Project: housler-crypto — PII-at-rest protection for the Housler ecosystem.
//

//! Reading and migrating the two legacy Fernet-token formats this
//! ecosystem's earlier services used before [`crate::codec::Codec`]:
//! `lk`, a single global key shared by every field, and `club`, a
//! per-field key derived from a master key and a field-qualified salt.
//!
//! This module only ever *reads* Fernet tokens — there is no encoder,
//! since nothing should ever produce new legacy-format ciphertext.

use std::fmt;

use aes::Aes128;
use base64::engine::general_purpose::URL_SAFE as B64_URL_SAFE;
use base64::Engine as _;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::codec::Codec;
use crate::error::ConfigurationError;

type HmacSha256 = Hmac<Sha256>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

const FERNET_VERSION: u8 = 0x80;
const FERNET_HEADER_LEN: usize = 1 + 8 + 16; // version + timestamp + iv
const FERNET_TAG_LEN: usize = 32;
const CLUB_PREFIX: &str = "enc:";
const LEGACY_KDF_ITERATIONS: u32 = 100_000;

/// Split a 32-byte Fernet key into its signing half and encryption half.
fn split_fernet_key(key: &[u8; 32]) -> (&[u8], &[u8; 16]) {
    let encryption_key: &[u8; 16] = key[16..32].try_into().expect("slice is 16 bytes");
    (&key[0..16], encryption_key)
}

/// Verify and decrypt a single Fernet token, returning the UTF-8
/// plaintext on success.
fn fernet_decrypt(key: &[u8; 32], token: &str) -> Option<String> {
    let (signing_key, encryption_key) = split_fernet_key(key);

    let raw = B64_URL_SAFE.decode(token).ok()?;
    if raw.len() < FERNET_HEADER_LEN + FERNET_TAG_LEN {
        return None;
    }
    if raw[0] != FERNET_VERSION {
        return None;
    }

    let (signed_part, tag) = raw.split_at(raw.len() - FERNET_TAG_LEN);

    let mut mac = HmacSha256::new_from_slice(signing_key).ok()?;
    mac.update(signed_part);
    mac.verify_slice(tag).ok()?;

    let iv: &[u8; 16] = signed_part[9..FERNET_HEADER_LEN].try_into().ok()?;
    let ciphertext = &signed_part[FERNET_HEADER_LEN..];
    if ciphertext.is_empty() || ciphertext.len() % 16 != 0 {
        return None;
    }

    let plaintext = Aes128CbcDec::new(encryption_key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .ok()?;

    String::from_utf8(plaintext).ok()
}

/// Derive the per-field Fernet key used by the `club` legacy scheme.
fn derive_club_key(master_key: &[u8], salt: &str, field: &str) -> [u8; 32] {
    let mut key = [0u8; 32];
    let info = format!("{salt}{field}");
    pbkdf2_hmac::<Sha256>(master_key, info.as_bytes(), LEGACY_KDF_ITERATIONS, &mut key);
    key
}

enum LegacyScheme {
    /// A single Fernet key shared across every field.
    Lk { key: [u8; 32] },
    /// A master key and salt from which a per-field Fernet key is
    /// derived on each call.
    Club { master_key: Vec<u8>, salt: String },
}

/// Reads legacy Fernet-encrypted values and migrates them into
/// [`Codec`]'s envelope format.
///
/// A default-constructed `Migrator` is deliberately unconfigured — it
/// exists so callers can hold a `Migrator` before they know which legacy
/// scheme (if any) a given deployment used, and get a clear
/// [`ConfigurationError::NotConfigured`] if they forget to configure it.
#[derive(Default)]
pub struct Migrator {
    scheme: Option<LegacyScheme>,
}

impl Migrator {
    /// Configure for the `lk` legacy scheme: one global Fernet key for
    /// every field, derived from `encryption_key` (hex-encoded) and
    /// `encryption_salt` via PBKDF2-HMAC-SHA256.
    pub fn from_lk_config(
        encryption_key: &str,
        encryption_salt: &str,
    ) -> Result<Self, ConfigurationError> {
        let key_material =
            hex::decode(encryption_key).map_err(|_| ConfigurationError::InvalidMasterKeyEncoding)?;

        let mut key = [0u8; 32];
        pbkdf2_hmac::<Sha256>(
            &key_material,
            encryption_salt.as_bytes(),
            LEGACY_KDF_ITERATIONS,
            &mut key,
        );

        Ok(Self {
            scheme: Some(LegacyScheme::Lk { key }),
        })
    }

    /// Configure for the `club` legacy scheme: a master key (hex-encoded)
    /// and salt from which a distinct Fernet key is derived per field.
    pub fn from_club_config(master_key: &str, salt: &str) -> Result<Self, ConfigurationError> {
        let master_key = hex::decode(master_key).map_err(|_| ConfigurationError::InvalidMasterKeyEncoding)?;

        Ok(Self {
            scheme: Some(LegacyScheme::Club {
                master_key,
                salt: salt.to_string(),
            }),
        })
    }

    /// Decrypt a legacy-format value for `field`.
    ///
    /// This never fails on malformed or non-legacy input: it is meant to
    /// sit in front of a mixed column where some rows are already
    /// plaintext, some are old Fernet tokens, and (during a rollout)
    /// some may already be new-format `hc1:` values. Anything that does
    /// not decode as this migrator's legacy scheme is returned exactly
    /// as given, `club`'s optional `enc:` prefix included. The only
    /// error this can return is [`ConfigurationError::NotConfigured`],
    /// when the migrator was built with [`Migrator::default`].
    pub fn decrypt(&self, value: &str, field: &str) -> Result<String, ConfigurationError> {
        let scheme = self.scheme.as_ref().ok_or(ConfigurationError::NotConfigured)?;

        let token = match scheme {
            LegacyScheme::Lk { .. } => value,
            LegacyScheme::Club { .. } => value.strip_prefix(CLUB_PREFIX).unwrap_or(value),
        };

        let key = match scheme {
            LegacyScheme::Lk { key } => *key,
            LegacyScheme::Club { master_key, salt } => derive_club_key(master_key, salt, field),
        };

        Ok(fernet_decrypt(&key, token).unwrap_or_else(|| value.to_string()))
    }

    /// Decrypt a legacy-format value and re-encrypt it under `new_codec`,
    /// producing a value in `hc1:` envelope form.
    ///
    /// Empty input and values already in `hc1:` form pass through
    /// unchanged (already migrated, or nothing to migrate).
    pub fn migrate(&self, value: &str, field: &str, new_codec: &Codec) -> Result<String, ConfigurationError> {
        if value.is_empty() || Codec::is_encrypted(value) {
            return Ok(value.to_string());
        }

        let plaintext = self.decrypt(value, field)?;
        Ok(new_codec.encrypt(&plaintext, field))
    }
}

impl fmt::Debug for Migrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match &self.scheme {
            None => "Unconfigured",
            Some(LegacyScheme::Lk { .. }) => "Lk([REDACTED])",
            Some(LegacyScheme::Club { .. }) => "Club([REDACTED])",
        };
        f.debug_struct("Migrator").field("scheme", &scheme).finish()
    }
}
