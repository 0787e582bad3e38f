//
// Copyright (c) 2025 Housler Team
// This source code is subject to the terms of the MIT license.
//
// Project: housler-crypto — PII-at-rest protection for the Housler ecosystem.
//

//! Unified error hierarchy for housler-crypto.
//!
//! Two error kinds only, matching the two places this crate can fail:
//! building a component (`ConfigurationError`) and authenticating a
//! ciphertext (`DecryptionError`). `DecryptionError` never varies its
//! message with the underlying cause — doing so would hand an attacker
//! a padding-oracle-style signal.

use thiserror::Error;

/// Errors raised while constructing a [`crate::codec::Codec`] or
/// [`crate::legacy::Migrator`], or while a [`crate::legacy::Migrator`]
/// is asked to act without having been configured.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("master_key is required")]
    MissingMasterKey,

    #[error("master_key must be 32 bytes (64 hex characters)")]
    InvalidMasterKeyLength,

    #[error("Invalid master_key: must be a hex-encoded string")]
    InvalidMasterKeyEncoding,

    #[error("salt is required")]
    MissingSalt,

    #[error("migrator is not configured")]
    NotConfigured,
}

/// Raised when an encrypted value fails to authenticate. The message is
/// intentionally uniform regardless of cause (truncated payload, bad
/// base64, tag mismatch, wrong field) so that callers cannot distinguish
/// failure modes from the error alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Decryption failed")]
pub struct DecryptionError;
