//! PAN helpers: Luhn check digit and masking for traces.
//!
//! The mask keeps the first six digits (issuer identification number) and
//! the last four, which is what PCI DSS permits in logs. Everything here is
//! display- and validation-side only; packing never touches the PAN.

use crate::{Error, Result};

/// Computes the Luhn check digit for a PAN that does not yet include one.
pub fn luhn_digit(pan: &str) -> Result<char> {
    if pan.is_empty() || !pan.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidValue(format!(
            "PAN must be non-empty digits, got {pan:?}"
        )));
    }

    let mut sum = 0u32;
    let mut double = true;
    for c in pan.chars().rev() {
        let mut d = c.to_digit(10).unwrap_or(0);
        if double {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
        double = !double;
    }
    let check = (10 - sum % 10) % 10;
    Ok(char::from_digit(check, 10).unwrap_or('0'))
}

/// Whether the last digit of `pan` is the correct Luhn check digit for the
/// rest.
pub fn is_valid_pan(pan: &str) -> bool {
    if pan.len() < 2 || !pan.is_ascii() {
        return false;
    }
    let (body, check) = pan.split_at(pan.len() - 1);
    match luhn_digit(body) {
        Ok(digit) => check == digit.to_string(),
        Err(_) => false,
    }
}

/// Masks a PAN for display: first six and last four digits stay, the rest
/// becomes 'x'. PANs of ten characters or fewer are returned unchanged
/// (there is nothing left to hide once six plus four are visible).
pub fn mask_pan(pan: &str) -> String {
    let len = pan.chars().count();
    if len <= 10 {
        return pan.to_string();
    }
    let mut out = String::with_capacity(len);
    for (i, c) in pan.chars().enumerate() {
        if i < 6 || i >= len - 4 {
            out.push(c);
        } else {
            out.push('x');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The check digit for 411111111111111 is 1 (the classic Visa test PAN).
    #[test]
    fn luhn_digit_known_pans() {
        assert_eq!(luhn_digit("411111111111111").unwrap(), '1');
        assert_eq!(luhn_digit("424242424242424").unwrap(), '2');
        assert_eq!(luhn_digit("555555555555444").unwrap(), '4');
    }

    #[test]
    fn luhn_digit_rejects_non_digits() {
        assert!(luhn_digit("4111x").is_err());
        assert!(luhn_digit("").is_err());
    }

    #[test]
    fn valid_pan_round_trip() {
        assert!(is_valid_pan("4111111111111111"));
        assert!(is_valid_pan("4242424242424242"));
        assert!(!is_valid_pan("4111111111111112"));
        assert!(!is_valid_pan("4"));
        assert!(!is_valid_pan("41x1"));
    }

    /// Multibyte input is simply invalid; the check-digit split must not
    /// land inside a character.
    #[test]
    fn non_ascii_pan_is_invalid() {
        assert!(!is_valid_pan("é"));
        assert!(!is_valid_pan("424242424242424é"));
    }

    /// Sixteen digits mask to first six + xxxxxx + last four.
    #[test]
    fn mask_keeps_first_six_last_four() {
        assert_eq!(mask_pan("1234567890123456"), "123456xxxxxx3456");
        assert_eq!(mask_pan("123456789012345678"), "123456xxxxxxxx5678");
    }

    /// Ten digits or fewer pass through unmasked.
    #[test]
    fn short_pans_pass_through() {
        assert_eq!(mask_pan("1234567890"), "1234567890");
        assert_eq!(mask_pan(""), "");
    }

    #[test]
    fn eleven_digits_mask_one() {
        assert_eq!(mask_pan("12345678901"), "123456x8901");
    }
}
