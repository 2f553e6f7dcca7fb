//! Field validators: pure character-set predicates over a field value.
//!
//! Each variant answers one question — does every character of the value
//! belong to the field's character class. Length is the length formatter's
//! business, position-independent content checks happen here, and both run
//! on every pack and every unpack.

/// Character-class validation for a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValidator {
    /// Decimal digits 0-9 ("n").
    Numeric,
    /// Letters A-Z and a-z ("a").
    Alpha,
    /// Letters and digits ("an").
    AlphaNumeric,
    /// Letters, digits and printable characters ("anp").
    AlphaNumericPrintable,
    /// Letters, digits and special characters: anything from space up ("ans").
    AlphaNumericSpecial,
    /// Hex digits ("hex").
    Hex,
    /// Accepts anything ("none").
    None,
    /// Track 2 magnetic stripe data: digits plus the separators '=' and 'D'
    /// ("z").
    Track2,
    /// ISO 8583:1987 amount, x+n format: a 'C' or 'D' sign followed by
    /// digits ("xn").
    Rev87Amount,
}

impl FieldValidator {
    /// Whether `value` satisfies this validator's character class.
    pub fn is_valid(self, value: &str) -> bool {
        match self {
            Self::Numeric => value.chars().all(|c| c.is_ascii_digit()),
            Self::Alpha => value.chars().all(|c| c.is_ascii_alphabetic()),
            Self::AlphaNumeric => value.chars().all(|c| c.is_ascii_alphanumeric()),
            Self::AlphaNumericPrintable => value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c.is_ascii_punctuation()),
            Self::AlphaNumericSpecial => value.chars().all(|c| c as u32 >= 32),
            Self::Hex => value.chars().all(|c| c.is_ascii_hexdigit()),
            Self::None => true,
            Self::Track2 => value
                .chars()
                .all(|c| c.is_ascii_digit() || c == '=' || c == 'D'),
            Self::Rev87Amount => {
                let mut chars = value.chars();
                matches!(chars.next(), Some('C' | 'D')) && chars.all(|c| c.is_ascii_digit())
            }
        }
    }

    /// Short description used in packing traces.
    pub fn description(self) -> &'static str {
        match self {
            Self::Numeric => "n",
            Self::Alpha => "a",
            Self::AlphaNumeric => "an",
            Self::AlphaNumericPrintable => "anp",
            Self::AlphaNumericSpecial => "ans",
            Self::Hex => "hex",
            Self::None => "none",
            Self::Track2 => "z",
            Self::Rev87Amount => "xn",
        }
    }
}
