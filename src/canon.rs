//
// Copyright (c) 2025 Housler Team
// This source code is subject to the terms of the MIT license.
//
// Project: housler-crypto — PII-at-rest protection for the Housler ecosystem.
//

//! Canonicalization and validation for Russian PII fields (phone, email, INN).
//!
//! These functions normalize free-form user input into a single canonical
//! representation before it reaches [`crate::codec::Codec`] or
//! [`crate::codec::Codec::blind_index`] — two different spellings of the
//! same phone number must encrypt to different ciphertext but always
//! produce the same blind index.

/// Normalize a Russian phone number to `7XXXXXXXXXX` (11 digits, no
/// separators, no leading `+`).
///
/// - Strips everything but ASCII digits.
/// - A leading `8` on an 11-digit number is rewritten to `7` (the domestic
///   trunk prefix convention).
/// - A bare 10-digit subscriber number is assumed to be missing the
///   country code and gets `7` prepended.
/// - Empty input passes through unchanged.
pub fn normalize_phone(phone: &str) -> String {
    if phone.is_empty() {
        return String::new();
    }

    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return String::new();
    }

    if digits.len() == 11 && digits.starts_with('8') {
        format!("7{}", &digits[1..])
    } else if digits.len() == 10 {
        format!("7{digits}")
    } else {
        digits
    }
}

/// Normalize an email address: trim surrounding whitespace, lowercase.
///
/// Case folding is a simple ASCII-compatible lowercase, matching the
/// reference behavior for the address forms this crate handles — full
/// Unicode case folding of local-parts is outside the scope of RFC 5321
/// mailbox comparison anyway.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A minimal structural email check: non-empty local part, a single `@`,
/// and a domain containing at least one `.` followed by a label of two
/// or more characters (rejects single-letter TLDs like `user@example.c`).
pub fn validate_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if domain.contains('@') {
        return false;
    }

    let Some((head, tail)) = domain.rsplit_once('.') else {
        return false;
    };
    !head.is_empty() && tail.chars().count() >= 2
}

/// Validate that [`normalize_phone`] yields 10 to 14 digits — a
/// Russia-agnostic length check, not a check that the number is a valid
/// 11-digit `7`-prefixed Russian number. `normalize_phone` already
/// handles the domestic rewrite; validation only guards against
/// obviously wrong lengths. The upper bound is exclusive of 15 digits
/// to match the reference implementation's boundary.
pub fn validate_phone(phone: &str) -> bool {
    let len = normalize_phone(phone).len();
    (10..15).contains(&len)
}

/// Validate a Russian taxpayer identification number (INN): purely
/// numeric, 10 digits (legal entities) or 12 digits (individuals/sole
/// proprietors).
pub fn validate_inn(inn: &str) -> bool {
    let inn = inn.trim();
    if inn.is_empty() || !inn.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    inn.len() == 10 || inn.len() == 12
}
