//! Length formatters: how a field's length is signalled on the wire.
//!
//! A fixed-length field has no indicator at all; a variable-length field
//! (LLVAR, LLLVAR, ...) is preceded by a zero-padded decimal indicator of a
//! configured digit count. The indicator digits themselves are encoded
//! through a [`Formatter`] — ASCII in most interchanges, BCD in packed ones.
//!
//! Lengths are always expressed in the *logical* unit of the field's value
//! formatter (characters, digits or bytes, see [`Formatter::logical_length`]);
//! the separation keeps any value encoding free to pair with any length
//! style.

use crate::formatter::Formatter;
use crate::{Error, Result};

/// How a field's length is encoded and constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthFormatter {
    /// The field is always exactly this long; no indicator on the wire.
    Fixed(usize),
    /// The field is preceded by a decimal length indicator.
    Variable {
        /// Number of decimal digits in the indicator (2 for LL, 3 for LLL).
        digits: usize,
        /// Largest admissible logical length.
        max: usize,
        /// Encoding of the indicator digits themselves.
        indicator: Formatter,
    },
}

impl LengthFormatter {
    /// A fixed length of exactly `length` logical units.
    pub fn fixed(length: usize) -> Self {
        Self::Fixed(length)
    }

    /// A variable length with an ASCII decimal indicator.
    pub fn variable(digits: usize, max: usize) -> Self {
        Self::Variable {
            digits,
            max,
            indicator: Formatter::Ascii,
        }
    }

    /// A variable length with a BCD packed indicator.
    pub fn variable_bcd(digits: usize, max: usize) -> Self {
        Self::Variable {
            digits,
            max,
            indicator: Formatter::Bcd,
        }
    }

    /// Wire bytes occupied by the length indicator (0 for fixed fields).
    pub fn indicator_length(&self) -> usize {
        match *self {
            Self::Fixed(_) => 0,
            Self::Variable {
                digits, indicator, ..
            } => indicator.packed_length(digits),
        }
    }

    /// Appends the indicator for a value of logical length `length`.
    /// No-op for fixed fields.
    pub fn pack_indicator(&self, out: &mut Vec<u8>, length: usize) {
        if let Self::Variable {
            digits, indicator, ..
        } = *self
        {
            let rendered = format!("{length:0digits$}");
            out.extend_from_slice(&indicator.encode(&rendered));
        }
    }

    /// Reads the logical field length at `offset`. For fixed fields this is
    /// the declared length without consuming any bytes.
    pub fn read_length(&self, data: &[u8], offset: usize, field: u32) -> Result<usize> {
        match *self {
            Self::Fixed(length) => Ok(length),
            Self::Variable {
                digits, indicator, ..
            } => {
                let width = indicator.packed_length(digits);
                let end = offset + width;
                if end > data.len() {
                    return Err(Error::truncated(field));
                }
                let rendered = indicator.decode(&data[offset..end], digits);
                // str::parse würde auch "+5" akzeptieren; erlaubt sind nur Ziffern.
                if !rendered.chars().all(|c| c.is_ascii_digit()) {
                    return Err(Error::format(field));
                }
                rendered.parse().map_err(|_| Error::format(field))
            }
        }
    }

    /// Whether a logical length is admissible for this field.
    pub fn is_valid(&self, length: usize) -> bool {
        match *self {
            Self::Fixed(expected) => length == expected,
            Self::Variable { max, .. } => length <= max,
        }
    }

    /// Largest admissible logical length.
    pub fn max_length(&self) -> usize {
        match *self {
            Self::Fixed(length) => length,
            Self::Variable { max, .. } => max,
        }
    }

    /// Short description used in packing traces: "Fixed", "LLVAR", "LLLVAR".
    pub fn description(&self) -> String {
        match *self {
            Self::Fixed(_) => "Fixed".to_string(),
            Self::Variable { digits, .. } => {
                let mut s = "L".repeat(digits);
                s.push_str("VAR");
                s
            }
        }
    }
}
