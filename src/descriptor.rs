//! Field descriptors: the composition of length formatter, validator, value
//! formatter and optional adjuster that defines one ISO 8583 field.
//!
//! Descriptors are immutable and stateless. One descriptor instance is
//! shared by every message built from a template, across threads; all
//! per-message state lives in [`crate::message::Message`].

use std::sync::Arc;

use crate::adjuster::{Adjuster, PadLeft, PadRight};
use crate::formatter::Formatter;
use crate::length::LengthFormatter;
use crate::pan;
use crate::validator::FieldValidator;
use crate::{Error, Result};

/// Masking policy applied when a field value appears in traces. Packing is
/// never masked; this is a display concern only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMask {
    /// Show the value as is.
    #[default]
    None,
    /// PCI DSS PAN mask: first six and last four digits visible.
    Pan,
}

/// Describes how one field is packed, unpacked, validated and displayed.
#[derive(Clone)]
pub struct FieldDescriptor {
    length: LengthFormatter,
    validator: FieldValidator,
    formatter: Formatter,
    adjuster: Option<Arc<dyn Adjuster>>,
    mask: DisplayMask,
}

impl FieldDescriptor {
    /// Composes a descriptor, rejecting inconsistent pairings: a Binary
    /// field must validate as hex, a BCD field must validate as numeric.
    /// Any other combination is accepted.
    pub fn new(
        length: LengthFormatter,
        validator: FieldValidator,
        formatter: Formatter,
        adjuster: Option<Arc<dyn Adjuster>>,
    ) -> Result<Self> {
        if formatter == Formatter::Binary && validator != FieldValidator::Hex {
            return Err(Error::config("a Binary field requires a hex validator"));
        }
        if formatter == Formatter::Bcd && validator != FieldValidator::Numeric {
            return Err(Error::config("a BCD field requires a numeric validator"));
        }
        Ok(Self::compose(length, validator, formatter, adjuster))
    }

    /// Interner Konstruktor für die statischen Builder, deren Paarungen per
    /// Konstruktion gültig sind.
    fn compose(
        length: LengthFormatter,
        validator: FieldValidator,
        formatter: Formatter,
        adjuster: Option<Arc<dyn Adjuster>>,
    ) -> Self {
        Self {
            length,
            validator,
            formatter,
            adjuster,
            mask: DisplayMask::None,
        }
    }

    /// The length formatter of this field.
    pub fn length_formatter(&self) -> &LengthFormatter {
        &self.length
    }

    /// The validator of this field.
    pub fn validator(&self) -> FieldValidator {
        self.validator
    }

    /// The value formatter of this field.
    pub fn formatter(&self) -> Formatter {
        self.formatter
    }

    /// Runs the set-adjuster, if any.
    pub fn adjust_set(&self, value: &str) -> String {
        match &self.adjuster {
            Some(a) => a.on_set(value),
            None => value.to_string(),
        }
    }

    /// Runs the get-adjuster, if any.
    pub fn adjust_get(&self, value: &str) -> String {
        match &self.adjuster {
            Some(a) => a.on_get(value),
            None => value.to_string(),
        }
    }

    /// Packed length of the field for `value`, indicator included.
    pub fn packed_length(&self, value: &str) -> usize {
        self.length.indicator_length() + self.formatter.packed_length(char_len(value))
    }

    /// Packs `value` into its wire form: indicator bytes (if any) followed
    /// by the encoded value. Both length and content are validated; a
    /// violation aborts with the offending `field` number.
    pub fn pack(&self, field: u32, value: &str) -> Result<Vec<u8>> {
        let logical = self.formatter.logical_length(char_len(value));
        if !self.length.is_valid(logical) {
            return Err(Error::length(field, logical));
        }
        if !self.validator.is_valid(value) {
            return Err(Error::format(field));
        }

        let mut out = Vec::with_capacity(self.packed_length(value));
        self.length.pack_indicator(&mut out, logical);
        out.extend_from_slice(&self.formatter.encode(value));
        Ok(out)
    }

    /// Unpacks the field starting at `offset`, returning the decoded value
    /// and the offset of the next field.
    ///
    /// The declared logical length drives the decode (for BCD it decides
    /// how many digits to keep across the half-byte pad); content and
    /// length are re-validated so malformed wire data fails exactly like a
    /// bad pack would.
    pub fn unpack(&self, field: u32, data: &[u8], offset: usize) -> Result<(String, usize)> {
        let declared = self.length.read_length(data, offset, field)?;
        if !self.length.is_valid(declared) {
            return Err(Error::length(field, declared));
        }

        let start = offset + self.length.indicator_length();
        let end = start + self.formatter.byte_count(declared);
        if end > data.len() {
            return Err(Error::truncated(field));
        }

        let value = self.formatter.decode(&data[start..end], declared);
        if !self.validator.is_valid(&value) {
            return Err(Error::format(field));
        }
        let logical = self.formatter.logical_length(char_len(&value));
        if !self.length.is_valid(logical) {
            return Err(Error::length(field, logical));
        }
        Ok((value, end))
    }

    /// Renders one fixed-column trace line for the field:
    /// `prefix[length   val  maxlen packed] nnn [value]`, with the display
    /// mask applied to the value.
    pub fn display(&self, prefix: &str, field: u32, value: Option<&str>) -> String {
        let packed = self.formatter.packed_length(value.map_or(0, char_len));
        let shown = match value {
            Some(v) => match self.mask {
                DisplayMask::None => format!("[{v}]"),
                DisplayMask::Pan => format!("[{}]", pan::mask_pan(v)),
            },
            None => String::new(),
        };
        format!(
            "{prefix}[{:<8} {:<4} {:>6} {packed:04}] {field:03} {shown}",
            self.length.description(),
            self.validator.description(),
            self.length.max_length(),
        )
    }

    /// Applies the PAN display mask to this descriptor. Packing and
    /// unpacking are untouched.
    pub fn pan_mask(mut self) -> Self {
        self.mask = DisplayMask::Pan;
        self
    }

    // --- static builders ---------------------------------------------------

    /// ASCII fixed-length field with the given validator.
    pub fn ascii_fixed(length: usize, validator: FieldValidator) -> Self {
        Self::compose(
            LengthFormatter::fixed(length),
            validator,
            Formatter::Ascii,
            None,
        )
    }

    /// ASCII variable-length field with the given indicator digit count.
    pub fn ascii_var(digits: usize, max: usize, validator: FieldValidator) -> Self {
        Self::compose(
            LengthFormatter::variable(digits, max),
            validator,
            Formatter::Ascii,
            None,
        )
    }

    /// ASCII fixed-length numeric field, zero-padded on the left when set.
    pub fn ascii_numeric(length: usize) -> Self {
        Self::compose(
            LengthFormatter::fixed(length),
            FieldValidator::Numeric,
            Formatter::Ascii,
            Some(Arc::new(PadLeft {
                width: length,
                fill: '0',
            })),
        )
    }

    /// ASCII fixed-length alphanumeric field, space-padded on the right
    /// when set.
    pub fn ascii_alpha_numeric(length: usize) -> Self {
        Self::compose(
            LengthFormatter::fixed(length),
            FieldValidator::AlphaNumericSpecial,
            Formatter::Ascii,
            Some(Arc::new(PadRight {
                width: length,
                fill: ' ',
            })),
        )
    }

    /// ASCII fixed-length rev-87 amount field (x+n), zero-padded on the
    /// left when set.
    pub fn ascii_amount(length: usize) -> Self {
        Self::compose(
            LengthFormatter::fixed(length),
            FieldValidator::Rev87Amount,
            Formatter::Ascii,
            Some(Arc::new(PadLeft {
                width: length,
                fill: '0',
            })),
        )
    }

    /// ASCII LL numeric field (two-digit indicator).
    pub fn ascii_ll_numeric(max: usize) -> Self {
        Self::ascii_var(2, max, FieldValidator::Numeric)
    }

    /// ASCII LLL numeric field (three-digit indicator).
    pub fn ascii_lll_numeric(max: usize) -> Self {
        Self::ascii_var(3, max, FieldValidator::Numeric)
    }

    /// ASCII LL character field.
    pub fn ascii_ll_character(max: usize) -> Self {
        Self::ascii_var(2, max, FieldValidator::AlphaNumericSpecial)
    }

    /// ASCII LLL character field.
    pub fn ascii_lll_character(max: usize) -> Self {
        Self::ascii_var(3, max, FieldValidator::AlphaNumericSpecial)
    }

    /// Binary fixed-length field of `length` bytes.
    pub fn binary_fixed(length: usize) -> Self {
        Self::compose(
            LengthFormatter::fixed(length),
            FieldValidator::Hex,
            Formatter::Binary,
            None,
        )
    }

    /// Binary LLL field with an ASCII indicator counting bytes.
    pub fn ascii_lll_binary(max: usize) -> Self {
        Self::compose(
            LengthFormatter::variable(3, max),
            FieldValidator::Hex,
            Formatter::Binary,
            None,
        )
    }

    /// BCD fixed-length numeric field of `length` digits.
    pub fn bcd_fixed(length: usize) -> Self {
        Self::compose(
            LengthFormatter::fixed(length),
            FieldValidator::Numeric,
            Formatter::Bcd,
            None,
        )
    }

    /// BCD variable-length numeric field with a BCD packed indicator
    /// counting digits.
    pub fn bcd_var(digits: usize, max: usize) -> Self {
        Self::compose(
            LengthFormatter::variable_bcd(digits, max),
            FieldValidator::Numeric,
            Formatter::Bcd,
            None,
        )
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("length", &self.length)
            .field("validator", &self.validator)
            .field("formatter", &self.formatter)
            .field("adjuster", &self.adjuster.is_some())
            .field("mask", &self.mask)
            .finish()
    }
}

/// Character count of a value. Values are ASCII in conformant messages but
/// counting chars keeps display widths honest for anything else.
fn char_len(value: &str) -> usize {
    value.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Binary + non-hex and BCD + non-numeric must fail construction.
    #[test]
    fn construction_rejects_binary_without_hex() {
        let err = FieldDescriptor::new(
            LengthFormatter::fixed(8),
            FieldValidator::Numeric,
            Formatter::Binary,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DescriptorConfig(_)), "{err:?}");
    }

    #[test]
    fn construction_rejects_bcd_without_numeric() {
        let err = FieldDescriptor::new(
            LengthFormatter::fixed(6),
            FieldValidator::AlphaNumeric,
            Formatter::Bcd,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DescriptorConfig(_)), "{err:?}");
    }

    /// Validator and formatter are independently pluggable otherwise.
    #[test]
    fn construction_accepts_other_pairings() {
        assert!(FieldDescriptor::new(
            LengthFormatter::fixed(6),
            FieldValidator::Hex,
            Formatter::Ascii,
            None,
        )
        .is_ok());
        assert!(FieldDescriptor::new(
            LengthFormatter::variable(2, 19),
            FieldValidator::Track2,
            Formatter::Ascii,
            None,
        )
        .is_ok());
    }

    #[test]
    fn ascii_fixed_round_trip() {
        let fd = FieldDescriptor::ascii_fixed(6, FieldValidator::Numeric);
        let packed = fd.pack(3, "270010").unwrap();
        assert_eq!(packed, b"270010");
        let (value, next) = fd.unpack(3, &packed, 0).unwrap();
        assert_eq!(value, "270010");
        assert_eq!(next, 6);
    }

    #[test]
    fn ascii_var_round_trip_with_indicator() {
        let fd = FieldDescriptor::ascii_var(2, 19, FieldValidator::Numeric);
        let packed = fd.pack(2, "58889212354567816").unwrap();
        assert_eq!(&packed[..2], b"17");
        assert_eq!(&packed[2..], b"58889212354567816");
        let (value, next) = fd.unpack(2, &packed, 0).unwrap();
        assert_eq!(value, "58889212354567816");
        assert_eq!(next, packed.len());
        assert_eq!(fd.packed_length("58889212354567816"), next);
    }

    /// Fixed(3) BCD over 01 23: the declared digit count keeps "123", the
    /// pad nibble is dropped, offset lands after two bytes.
    #[test]
    fn bcd_fixed_odd_unpack() {
        let fd = FieldDescriptor::bcd_fixed(3);
        let (value, next) = fd.unpack(2, &[0x01, 0x23], 0).unwrap();
        assert_eq!(value, "123");
        assert_eq!(next, 2);
    }

    #[test]
    fn bcd_fixed_odd_pack() {
        let fd = FieldDescriptor::bcd_fixed(3);
        assert_eq!(fd.pack(2, "123").unwrap(), vec![0x01, 0x23]);
    }

    /// LL-BCD with a BCD indicator: "77" packs to 02 77 and round-trips.
    #[test]
    fn bcd_var_round_trip() {
        let fd = FieldDescriptor::bcd_var(2, 15);
        let packed = fd.pack(2, "77").unwrap();
        assert_eq!(packed, vec![0x02, 0x77]);
        let (value, next) = fd.unpack(2, &packed, 0).unwrap();
        assert_eq!(value, "77");
        assert_eq!(next, 2);
    }

    #[test]
    fn binary_fixed_round_trip() {
        let fd = FieldDescriptor::binary_fixed(4);
        let packed = fd.pack(52, "DEADBEEF").unwrap();
        assert_eq!(packed, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let (value, next) = fd.unpack(52, &packed, 0).unwrap();
        assert_eq!(value, "DEADBEEF");
        assert_eq!(next, 4);
    }

    /// The LLL-binary indicator counts bytes, so the wire round-trips:
    /// three bytes of value carry an indicator of 003.
    #[test]
    fn lll_binary_indicator_counts_bytes() {
        let fd = FieldDescriptor::ascii_lll_binary(10);
        let packed = fd.pack(55, "A1B2C3").unwrap();
        assert_eq!(&packed[..3], b"003");
        assert_eq!(&packed[3..], &[0xA1, 0xB2, 0xC3]);
        let (value, next) = fd.unpack(55, &packed, 0).unwrap();
        assert_eq!(value, "A1B2C3");
        assert_eq!(next, 6);
    }

    #[test]
    fn pack_rejects_invalid_content() {
        let fd = FieldDescriptor::ascii_fixed(6, FieldValidator::Numeric);
        assert_eq!(fd.pack(3, "12345a").unwrap_err(), Error::format(3));
    }

    #[test]
    fn pack_rejects_invalid_length() {
        let fd = FieldDescriptor::ascii_var(2, 4, FieldValidator::Numeric);
        assert_eq!(fd.pack(2, "12345").unwrap_err(), Error::length(2, 5));
    }

    /// An indicator announcing a length beyond max fails before any slice.
    #[test]
    fn unpack_rejects_overlong_indicator() {
        let fd = FieldDescriptor::ascii_var(2, 4, FieldValidator::Numeric);
        assert_eq!(
            fd.unpack(2, b"0512345", 0).unwrap_err(),
            Error::length(2, 5)
        );
    }

    #[test]
    fn unpack_rejects_truncated_value() {
        let fd = FieldDescriptor::ascii_var(2, 10, FieldValidator::Numeric);
        assert_eq!(fd.unpack(2, b"0812", 0).unwrap_err(), Error::truncated(2));
    }

    #[test]
    fn unpack_rejects_invalid_content() {
        let fd = FieldDescriptor::ascii_fixed(4, FieldValidator::Numeric);
        assert_eq!(fd.unpack(4, b"12a4", 0).unwrap_err(), Error::format(4));
    }

    #[test]
    fn unpack_respects_offset() {
        let fd = FieldDescriptor::ascii_fixed(4, FieldValidator::Numeric);
        let (value, next) = fd.unpack(4, b"xx1234yy", 2).unwrap();
        assert_eq!(value, "1234");
        assert_eq!(next, 6);
    }

    #[test]
    fn packed_length_includes_indicator() {
        let fd = FieldDescriptor::ascii_var(3, 999, FieldValidator::AlphaNumericSpecial);
        assert_eq!(fd.packed_length("hello"), 3 + 5);
        let fixed = FieldDescriptor::bcd_fixed(6);
        assert_eq!(fixed.packed_length("123456"), 3);
    }

    #[test]
    fn ascii_numeric_pads_on_set() {
        let fd = FieldDescriptor::ascii_numeric(6);
        assert_eq!(fd.adjust_set("42"), "000042");
        assert_eq!(fd.adjust_get("000042"), "000042");
    }

    #[test]
    fn ascii_alpha_numeric_pads_right() {
        let fd = FieldDescriptor::ascii_alpha_numeric(5);
        assert_eq!(fd.adjust_set("AB"), "AB   ");
    }

    #[test]
    fn amount_field_accepts_signed_values() {
        let fd = FieldDescriptor::ascii_amount(9);
        let adjusted = fd.adjust_set("C1200");
        // PadLeft füllt links mit Nullen auf, das Vorzeichen wandert nicht.
        assert_eq!(adjusted, "0000C1200");
        assert!(fd.pack(4, "C00001200").is_ok());
        assert_eq!(fd.pack(4, "X00001200").unwrap_err(), Error::format(4));
    }

    #[test]
    fn display_column_format() {
        let fd = FieldDescriptor::ascii_var(2, 19, FieldValidator::Numeric);
        let line = fd.display("  ", 2, Some("4242424242424242"));
        assert_eq!(line, "  [LLVAR    n        19 0016] 002 [4242424242424242]");
    }

    #[test]
    fn display_without_value() {
        let fd = FieldDescriptor::ascii_fixed(6, FieldValidator::Numeric);
        let line = fd.display("", 3, None);
        assert_eq!(line, "[Fixed    n         6 0000] 003 ");
    }

    /// The PAN mask changes only what display shows, never the wire bytes.
    #[test]
    fn pan_mask_affects_display_only() {
        let fd = FieldDescriptor::ascii_var(2, 19, FieldValidator::Numeric).pan_mask();
        let line = fd.display("", 2, Some("4242424242424242"));
        assert!(line.contains("[424242xxxxxx4242]"), "{line}");
        assert_eq!(fd.pack(2, "4242424242424242").unwrap()[2..].to_vec(), b"4242424242424242".to_vec());
    }
}
