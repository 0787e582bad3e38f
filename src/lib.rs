//
// Copyright (c) 2025 Housler Team
// This source code is subject to the terms of the MIT license.
//
// Project: housler-crypto — PII-at-rest protection for the Housler ecosystem.
//

//! # housler-crypto
//!
//! Field-scoped encryption at rest for personal data, built for a
//! multi-service ecosystem subject to Russian Federal Law 152-FZ.
//!
//! ## Quick start
//!
//! ```rust
//! use housler_crypto::Codec;
//!
//! let codec = Codec::with_defaults(&Codec::generate_key()).unwrap();
//!
//! let ciphertext = codec.encrypt("user@example.com", "email");
//! assert!(Codec::is_encrypted(&ciphertext));
//! assert_eq!(codec.decrypt(&ciphertext, "email").unwrap(), "user@example.com");
//!
//! // Equality search without decrypting: store blind_index alongside
//! // the ciphertext and query on it.
//! let idx = codec.blind_index("user@example.com", "email");
//! assert_eq!(idx, codec.blind_index("User@Example.com", "email"));
//! ```
//!
//! ## Architecture
//!
//! - [`canon`] — normalize and validate phone numbers, emails, and INNs
//!   before they reach encryption or indexing.
//! - [`mask`] — one-way, non-invertible display masking for logs and
//!   support tooling.
//! - [`codec`] — the reversible, keyed core: AES-256-GCM encryption with
//!   per-field subkeys, plus the deterministic blind index used for
//!   equality search on encrypted columns.
//! - [`legacy`] — reads the two legacy Fernet-token formats this
//!   ecosystem's earlier services produced, and migrates them into
//!   [`codec::Codec`]'s envelope format.
//! - [`error`] — the two public error kinds: configuration failures and
//!   (uniform, non-oracle-leaking) decryption failures.
//!
//! ## Ciphertext format
//!
//! Encrypted values are ASCII strings of the form `hc1:<payload>`, where
//! `payload` is `nonce ‖ ciphertext ‖ tag` under AES-256-GCM, encoded as
//! unpadded URL-safe base64. The field name is bound into the ciphertext
//! as AEAD associated data, so a value encrypted for one field cannot be
//! decrypted as another.

pub mod canon;
pub mod codec;
pub mod error;
pub mod legacy;
pub mod mask;
mod subkey;

pub use codec::{Codec, DEFAULT_ITERATIONS, DEFAULT_SALT, ENVELOPE_PREFIX};
pub use error::{ConfigurationError, DecryptionError};
pub use legacy::Migrator;

pub use canon::{normalize_email, normalize_phone, validate_email, validate_inn, validate_phone};
