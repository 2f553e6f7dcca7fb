//! Central error types for the ISO 8583 codec.
//!
//! Field-level errors carry the offending field number so a failed pack or
//! unpack can be traced straight to the template entry that caused it.

use core::fmt;
use std::borrow::Cow;

/// All error conditions raised while building descriptors or packing and
/// unpacking messages.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A field descriptor was built from an inconsistent formatter/validator
    /// pairing (Binary without hex validation, BCD without numeric
    /// validation). Caught once at template build time.
    DescriptorConfig(Cow<'static, str>),
    /// A field value (or its decoded form) fails the field's validator.
    FieldFormat {
        /// Number of the offending field (2..=128).
        field: u32,
    },
    /// A field's logical length violates the bounds of its length formatter.
    FieldLength {
        /// Number of the offending field (2..=128).
        field: u32,
        /// Die Länge die abgelehnt wurde (in logischen Einheiten).
        length: usize,
    },
    /// The message buffer ended inside a field's length indicator or value.
    FieldTruncated {
        /// Number of the field being unpacked when the data ran out.
        field: u32,
    },
    /// The bitmap bytes are truncated or a hex-rendered bitmap contains
    /// non-hex characters.
    MalformedBitmap,
    /// A field number has no descriptor in the message template.
    UnknownField {
        /// The field number that was looked up.
        field: u32,
    },
    /// A sub-field structure (processing code, additional amount) or PAN
    /// helper rejected malformed input.
    InvalidValue(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DescriptorConfig(msg) => write!(f, "invalid field descriptor: {msg}"),
            Self::FieldFormat { field } => write!(f, "invalid format in field {field}"),
            Self::FieldLength { field, length } => {
                write!(f, "invalid length {length} for field {field}")
            }
            Self::FieldTruncated { field } => {
                write!(f, "message data ends inside field {field}")
            }
            Self::MalformedBitmap => write!(f, "malformed or truncated bitmap"),
            Self::UnknownField { field } => {
                write!(f, "no descriptor for field {field} in template")
            }
            Self::InvalidValue(msg) => write!(f, "invalid value: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Creates a `DescriptorConfig` error with a message.
    pub fn config(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::DescriptorConfig(msg.into())
    }

    /// Creates a `FieldFormat` error for the given field number.
    pub fn format(field: u32) -> Self {
        Self::FieldFormat { field }
    }

    /// Creates a `FieldLength` error for the given field number.
    pub fn length(field: u32, length: usize) -> Self {
        Self::FieldLength { field, length }
    }

    /// Creates a `FieldTruncated` error for the given field number.
    pub fn truncated(field: u32) -> Self {
        Self::FieldTruncated { field }
    }

    /// The field number this error applies to, if any.
    pub fn field(&self) -> Option<u32> {
        match self {
            Self::FieldFormat { field }
            | Self::FieldLength { field, .. }
            | Self::FieldTruncated { field }
            | Self::UnknownField { field } => Some(*field),
            _ => None,
        }
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
