//! Patient identifier format.
//!
//! The grammar is part of the contract with both the resolver (it is spelled
//! out in the system policy) and users: one fixed letter followed by exactly
//! five decimal digits, e.g. `P12345`.

use regex::Regex;
use std::sync::LazyLock;

/// The fixed leading letter.
pub const PATIENT_ID_PREFIX: char = 'P';

/// Human-readable description used in corrective messages.
pub const PATIENT_ID_FORMAT: &str =
    "the letter 'P' followed by exactly 5 digits (e.g. P12345)";

static PATIENT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\AP[0-9]{5}\z").expect("static pattern compiles"));

/// Check a patient identifier against the fixed format.
///
/// Absence is the caller's concern; an empty string simply does not match.
pub fn validate_patient_id(identifier: &str) -> bool {
    PATIENT_ID_PATTERN.is_match(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_ids() {
        for id in ["P12345", "P00000", "P99999", "P10203"] {
            assert!(validate_patient_id(id), "{id} should be valid");
        }
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!validate_patient_id("P1234"));
        assert!(!validate_patient_id("P123456"));
        assert!(!validate_patient_id("P"));
    }

    #[test]
    fn rejects_wrong_letter_or_position() {
        assert!(!validate_patient_id("p12345"));
        assert!(!validate_patient_id("Q12345"));
        assert!(!validate_patient_id("12345P"));
        assert!(!validate_patient_id("1P2345"));
        assert!(!validate_patient_id("PP12345"));
    }

    #[test]
    fn rejects_non_digits_and_padding() {
        assert!(!validate_patient_id("P12a45"));
        assert!(!validate_patient_id("P-12345"));
        assert!(!validate_patient_id(" P12345"));
        assert!(!validate_patient_id("P12345 "));
        assert!(!validate_patient_id("P12345\n"));
        assert!(!validate_patient_id("P１２３４５"));
    }

    #[test]
    fn rejects_empty() {
        assert!(!validate_patient_id(""));
    }

    #[test]
    fn every_five_digit_suffix_is_valid() {
        for n in (0..100_000).step_by(7919) {
            let id = format!("{PATIENT_ID_PREFIX}{n:05}");
            assert!(validate_patient_id(&id), "{id} should be valid");
        }
    }
}
