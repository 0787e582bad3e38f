//
// Copyright (c) 2025 Housler Team
// This source code is subject to the terms of the MIT license.
//
// Project: housler-crypto — PII-at-rest protection for the Housler ecosystem.
//

//! Per-field subkey derivation and memoization.
//!
//! Every field gets its own encryption subkey `k_enc(field)` and its own
//! index subkey `k_idx(field)`, both derived from the master key with
//! PBKDF2-HMAC-SHA256. A field's two subkeys are independent of each
//! other's purpose tag, so leaking a blind-index key never exposes the
//! matching encryption key, and vice versa. PBKDF2 is CPU-bound, so
//! derived subkeys are cached for the lifetime of the owning
//! [`crate::codec::Codec`].

use std::collections::HashMap;
use std::sync::Mutex;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

/// Which subkey a field needs: the reversible AEAD key, or the
/// deterministic blind-index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Purpose {
    Enc,
    Idx,
}

impl Purpose {
    fn tag(self) -> &'static str {
        match self {
            Purpose::Enc => "enc",
            Purpose::Idx => "idx",
        }
    }
}

/// Memoized PBKDF2 subkey derivation, keyed by `(purpose, field)`.
pub(crate) struct SubkeyCache {
    master_key: Vec<u8>,
    salt: String,
    iterations: u32,
    cache: Mutex<HashMap<(Purpose, String), [u8; 32]>>,
}

impl SubkeyCache {
    pub(crate) fn new(master_key: Vec<u8>, salt: String, iterations: u32) -> Self {
        Self {
            master_key,
            salt,
            iterations,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Return the 32-byte subkey for `(purpose, field)`, deriving and
    /// caching it on first use.
    pub(crate) fn derive(&self, purpose: Purpose, field: &str) -> [u8; 32] {
        let cache_key = (purpose, field.to_string());

        let mut guard = self.cache.lock().expect("subkey cache mutex poisoned");
        if let Some(existing) = guard.get(&cache_key) {
            return *existing;
        }

        let derived_salt = format!("{}{}{}", self.salt, purpose.tag(), field);
        let mut subkey = [0u8; 32];
        pbkdf2_hmac::<Sha256>(&self.master_key, derived_salt.as_bytes(), self.iterations, &mut subkey);

        guard.insert(cache_key, subkey);
        subkey
    }
}

impl Drop for SubkeyCache {
    fn drop(&mut self) {
        self.master_key.zeroize();
        if let Ok(mut guard) = self.cache.lock() {
            for subkey in guard.values_mut() {
                subkey.zeroize();
            }
            guard.clear();
        }
    }
}
