//
// Copyright (c) 2025 Housler Team
// This source code is subject to the terms of the MIT license.
//
// Project: housler-crypto — PII-at-rest protection for the Housler ecosystem.
//

//! Display-side PII masking — partial redaction for logs, support tooling,
//! and admin UIs. Masking is a one-way, non-invertible transform; it is not
//! an encoding and carries no key material. Contrast with
//! [`crate::codec::Codec`], which is reversible and keyed.
//!
//! Every function takes `Option<&str>`, the idiomatic Rust spelling of
//! "nullable input" — absent, empty, or ill-shaped values all fully
//! redact to `"***"`.

const REDACTED: &str = "***";

fn head_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// `te***@example.com` — keep the first two local-part characters and the
/// full domain. A local part of two characters or fewer is fully redacted.
pub fn email(value: Option<&str>) -> String {
    let Some(value) = value else {
        return REDACTED.to_string();
    };
    let Some((local, domain)) = value.split_once('@') else {
        return REDACTED.to_string();
    };
    if domain.is_empty() {
        return REDACTED.to_string();
    }
    if char_len(local) <= 2 {
        format!("{REDACTED}@{domain}")
    } else {
        format!("{}{REDACTED}@{domain}", head_chars(local, 2))
    }
}

/// `+7***4567` — keep a leading `+` if present, the country-code digit,
/// and the last four digits. Numbers with fewer than seven digits are
/// fully redacted.
pub fn phone(value: Option<&str>) -> String {
    let Some(value) = value else {
        return REDACTED.to_string();
    };
    let has_plus = value.starts_with('+');
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.chars().count() < 7 {
        return REDACTED.to_string();
    }

    let first = head_chars(&digits, 1);
    let last4: String = digits.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();

    if has_plus {
        format!("+{first}{REDACTED}{last4}")
    } else {
        format!("{first}{REDACTED}{last4}")
    }
}

/// `Ив*** Ив***` — each whitespace-separated word keeps its first two
/// characters; a word of two characters or fewer is fully redacted.
pub fn name(value: Option<&str>) -> String {
    let Some(value) = value else {
        return REDACTED.to_string();
    };
    let words: Vec<&str> = value.split_whitespace().collect();
    if words.is_empty() {
        return REDACTED.to_string();
    }

    words
        .into_iter()
        .map(|word| {
            if char_len(word) <= 2 {
                REDACTED.to_string()
            } else {
                format!("{}{REDACTED}", head_chars(word, 2))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `77***3893` — keep the first two and last four digits of a 10- or
/// 12-digit INN. Any other digit count is fully redacted.
pub fn inn(value: Option<&str>) -> String {
    let Some(value) = value else {
        return REDACTED.to_string();
    };
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    let len = digits.chars().count();
    if len != 10 && len != 12 {
        return REDACTED.to_string();
    }
    let first2 = head_chars(&digits, 2);
    let last4: String = digits.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("{first2}{REDACTED}{last4}")
}

/// `**** **** **** 1111` — standard card masking, last four digits only.
pub fn card(value: Option<&str>) -> String {
    let Some(value) = value else {
        return REDACTED.to_string();
    };
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.chars().count() < 4 {
        return REDACTED.to_string();
    }
    let last4: String = digits.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("**** **** **** {last4}")
}

/// `** ** ******` — passport numbers carry no partial-disclosure rule
/// under 152-FZ guidance; the mask is constant regardless of input.
pub fn passport(_value: Option<&str>) -> String {
    "** ** ******".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_masks_local_part() {
        assert_eq!(email(Some("test@example.com")), "te***@example.com");
    }

    #[test]
    fn email_fully_redacts_short_local_part() {
        assert_eq!(email(Some("a@example.com")), "***@example.com");
        assert_eq!(email(Some("ab@example.com")), "***@example.com");
    }

    #[test]
    fn email_fully_redacts_malformed_input() {
        assert_eq!(email(Some("")), "***");
        assert_eq!(email(Some("not-an-email")), "***");
    }

    #[test]
    fn email_fully_redacts_none() {
        assert_eq!(email(None), "***");
    }

    #[test]
    fn phone_masks_with_plus() {
        assert_eq!(phone(Some("+79991234567")), "+7***4567");
    }

    #[test]
    fn phone_masks_without_plus() {
        assert_eq!(phone(Some("79991234567")), "7***4567");
    }

    #[test]
    fn phone_fully_redacts_short_number() {
        assert_eq!(phone(Some("12345")), "***");
        assert_eq!(phone(Some("")), "***");
    }

    #[test]
    fn phone_fully_redacts_none() {
        assert_eq!(phone(None), "***");
    }

    #[test]
    fn name_masks_each_word() {
        assert_eq!(name(Some("Иван Иванов")), "Ив*** Ив***");
    }

    #[test]
    fn name_masks_single_word() {
        assert_eq!(name(Some("Иван")), "Ив***");
    }

    #[test]
    fn name_fully_redacts_short_word() {
        assert_eq!(name(Some("Ян")), "***");
    }

    #[test]
    fn name_fully_redacts_empty() {
        assert_eq!(name(Some("")), "***");
    }

    #[test]
    fn name_fully_redacts_none() {
        assert_eq!(name(None), "***");
    }

    #[test]
    fn inn_masks_ten_and_twelve_digit() {
        assert_eq!(inn(Some("7707083893")), "77***3893");
        assert_eq!(inn(Some("772012345678")), "77***5678");
    }

    #[test]
    fn inn_fully_redacts_short_or_empty() {
        assert_eq!(inn(Some("123")), "***");
        assert_eq!(inn(Some("")), "***");
    }

    #[test]
    fn inn_fully_redacts_lengths_other_than_ten_or_twelve() {
        assert_eq!(inn(Some("12345678901")), "***");
        assert_eq!(inn(Some("1234567890123")), "***");
    }

    #[test]
    fn inn_fully_redacts_none() {
        assert_eq!(inn(None), "***");
    }

    #[test]
    fn card_masks_last_four() {
        assert_eq!(card(Some("4111111111111111")), "**** **** **** 1111");
        assert_eq!(card(Some("4111 1111 1111 1111")), "**** **** **** 1111");
    }

    #[test]
    fn card_fully_redacts_short_or_empty() {
        assert_eq!(card(Some("123")), "***");
        assert_eq!(card(Some("")), "***");
    }

    #[test]
    fn card_fully_redacts_none() {
        assert_eq!(card(None), "***");
    }

    #[test]
    fn passport_is_always_constant() {
        assert_eq!(passport(Some("1234567890")), "** ** ******");
        assert_eq!(passport(Some("")), "** ** ******");
        assert_eq!(passport(None), "** ** ******");
    }
}
