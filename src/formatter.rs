//! Value formatters: ASCII, BCD and Binary wire encodings.
//!
//! A field value is always a string on the API side; the formatter decides
//! how it travels on the wire. ASCII is one byte per character, BCD packs
//! two decimal digits per byte (odd digit counts get a zero pad in the high
//! nibble of the first byte), Binary treats the value as hex digit pairs.
//!
//! Every length-related question is answered by a per-variant capability
//! method instead of inspecting the formatter type at the call sites:
//!
//! * [`Formatter::packed_length`] — wire bytes for a value string.
//! * [`Formatter::logical_length`] — the length unit carried in length
//!   indicators (characters for ASCII, digits for BCD, bytes for Binary).
//! * [`Formatter::byte_count`] — wire bytes for a declared logical length.

/// Wire encoding of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// One byte per character, pass-through.
    Ascii,
    /// Binary coded decimal, two decimal digits per byte.
    Bcd,
    /// Raw bytes, represented as hex digit pairs on the value side.
    Binary,
}

impl Formatter {
    /// Number of wire bytes used by a value string of `char_len` characters.
    pub fn packed_length(self, char_len: usize) -> usize {
        match self {
            Self::Ascii => char_len,
            // Zwei Ziffern bzw. Hex-Zeichen pro Byte, aufgerundet.
            Self::Bcd | Self::Binary => char_len.div_ceil(2),
        }
    }

    /// The logical length of a value string, in the unit that length
    /// indicators and declared fixed lengths use for this encoding.
    pub fn logical_length(self, char_len: usize) -> usize {
        match self {
            Self::Ascii | Self::Bcd => char_len,
            Self::Binary => char_len.div_ceil(2),
        }
    }

    /// Number of wire bytes occupied by a field whose declared logical
    /// length is `logical_len`.
    pub fn byte_count(self, logical_len: usize) -> usize {
        match self {
            Self::Ascii | Self::Binary => logical_len,
            Self::Bcd => logical_len.div_ceil(2),
        }
    }

    /// Encodes a value string into wire bytes.
    ///
    /// BCD and Binary expect decimal/hex characters; the paired validator
    /// enforces that before any pack reaches this point. Stray characters
    /// encode as a zero nibble (guarded by a debug assertion).
    pub fn encode(self, value: &str) -> Vec<u8> {
        match self {
            Self::Ascii => value
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            Self::Bcd | Self::Binary => {
                let mut out = Vec::with_capacity(value.len().div_ceil(2));
                let mut nibbles = value.chars().map(|c| {
                    debug_assert!(c.is_ascii_hexdigit(), "non-hex char {c:?} in value");
                    c.to_digit(16).unwrap_or(0) as u8
                });
                // Ungerade Länge: führendes Zero-Nibble im ersten Byte.
                if value.len() % 2 == 1 {
                    out.push(nibbles.next().unwrap_or(0));
                }
                while let Some(hi) = nibbles.next() {
                    let lo = nibbles.next().unwrap_or(0);
                    out.push(hi << 4 | lo);
                }
                out
            }
        }
    }

    /// Decodes wire bytes back into a value string.
    ///
    /// `logical_len` is the field's declared logical length. Only BCD needs
    /// it: a byte count alone cannot tell a 3-digit value from a 4-digit one,
    /// so the declared digit count decides whether the high nibble of the
    /// first byte is a pad to drop.
    pub fn decode(self, data: &[u8], logical_len: usize) -> String {
        match self {
            Self::Ascii => data.iter().map(|&b| b as char).collect(),
            Self::Bcd => {
                let mut digits = String::with_capacity(logical_len);
                let skip_pad = logical_len % 2 == 1;
                for (i, &byte) in data.iter().enumerate() {
                    if !(i == 0 && skip_pad) {
                        digits.push(nibble_char(byte >> 4));
                    }
                    digits.push(nibble_char(byte & 0x0F));
                }
                digits
            }
            Self::Binary => {
                let mut hex = String::with_capacity(data.len() * 2);
                for &byte in data {
                    hex.push(nibble_char(byte >> 4).to_ascii_uppercase());
                    hex.push(nibble_char(byte & 0x0F).to_ascii_uppercase());
                }
                hex
            }
        }
    }
}

/// Maps a nibble to its hex character. Nibbles above 9 come out as 'a'..'f'
/// so that a corrupt BCD byte fails the numeric validator instead of being
/// silently coerced.
fn nibble_char(nibble: u8) -> char {
    char::from_digit(u32::from(nibble), 16).unwrap_or('?')
}
