// File: siftlock-core/src/validators.rs
//! Programmatic validation beyond regex matching for PII classes where
//! structure alone produces false positives (SSNs, card numbers).
//!
//! License: MIT OR Apache-2.0

/// Validates a US SSN in "XXX-XX-XXXX" form against SSA structural rules.
///
/// Rejects the never-issued area numbers (000, 666, 900+) and all-zero
/// group/serial components.
pub fn is_valid_ssn(ssn: &str) -> bool {
    let mut parts = ssn.split('-');
    let (Some(area), Some(group), Some(serial), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    if area.len() != 3 || group.len() != 2 || serial.len() != 4 {
        return false;
    }

    let Ok(area_num) = area.parse::<u16>() else {
        return false;
    };
    let Ok(group_num) = group.parse::<u8>() else {
        return false;
    };
    let Ok(serial_num) = serial.parse::<u16>() else {
        return false;
    };

    let invalid_area = area_num == 0 || area_num == 666 || area_num >= 900;
    !(invalid_area || group_num == 0 || serial_num == 0)
}

/// Luhn (mod 10) checksum over a digit string.
pub fn is_valid_luhn(digits: &str) -> bool {
    let mut sum = 0u32;
    let mut alternate = false;

    for c in digits.chars().rev() {
        let Some(mut digit) = c.to_digit(10) else {
            return false;
        };
        if alternate {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        alternate = !alternate;
    }

    sum % 10 == 0
}

/// Validates a candidate card number: strips separators, then Luhn.
pub fn is_valid_credit_card(candidate: &str) -> bool {
    let digits: String = candidate.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return false;
    }
    is_valid_luhn(&digits)
}
