//! The presence bitmap: 128 one-indexed slots marking which fields a
//! message carries.
//!
//! Bit 1 is metadata, not a field: it is true exactly when any of bits
//! 65..=128 is set, announcing that a second (extended) bitmap follows the
//! first eight bytes on the wire. It is recomputed on every mutation, never
//! cached.
//!
//! Wire convention, used by pack and unpack alike: bit `i` (0-indexed
//! internally, so field `i + 1`) lives in byte `i / 8` at position
//! `7 - (i % 8)`, MSB first. Internally the 128 slots are two `u64` words
//! holding bit `i` at position `63 - (i % 64)`, so a word serializes with
//! `to_be_bytes` directly.

use crate::formatter::Formatter;
use crate::validator::FieldValidator;
use crate::{Error, Result};

/// 128-slot presence vector with extended-bitmap auto-promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    bits: [u64; 2],
    formatter: Formatter,
}

impl Default for Bitmap {
    fn default() -> Self {
        Self {
            bits: [0; 2],
            formatter: Formatter::Binary,
        }
    }
}

impl Bitmap {
    /// Creates an empty bitmap encoded through `formatter`.
    ///
    /// Binary packs the raw 8 or 16 bytes; ASCII renders them as 16 or 32
    /// hex characters. BCD is rejected: a hex rendering contains letters a
    /// BCD field cannot carry.
    pub fn new(formatter: Formatter) -> Result<Self> {
        if formatter == Formatter::Bcd {
            return Err(Error::config("a bitmap cannot be BCD encoded"));
        }
        Ok(Self {
            bits: [0; 2],
            formatter,
        })
    }

    fn mask(field: u32) -> Option<(usize, u64)> {
        if !(1..=128).contains(&field) {
            return None;
        }
        let i = (field - 1) as usize;
        Some((i / 64, 1u64 << (63 - (i % 64))))
    }

    /// Whether `field` is present. Field numbers outside 1..=128 are never
    /// present.
    pub fn is_set(&self, field: u32) -> bool {
        let Some((word, mask)) = Self::mask(field) else {
            return false;
        };
        self.bits[word] & mask != 0
    }

    /// Marks `field` present or absent, then recomputes the extension bit.
    /// A no-op for field numbers outside 1..=128.
    pub fn set(&mut self, field: u32, on: bool) {
        let Some((word, mask)) = Self::mask(field) else {
            return;
        };
        if on {
            self.bits[word] |= mask;
        } else {
            self.bits[word] &= !mask;
        }
        // Bit 1 spiegelt die Belegung der oberen Hälfte, immer neu berechnet.
        let ext_mask = 1u64 << 63;
        if self.bits[1] != 0 {
            self.bits[0] |= ext_mask;
        } else {
            self.bits[0] &= !ext_mask;
        }
    }

    /// Whether the extended bitmap (fields 65..=128) is in play.
    pub fn is_extended(&self) -> bool {
        self.is_set(1)
    }

    /// Packed length on the wire under the configured formatter.
    pub fn packed_length(&self) -> usize {
        self.formatter
            .packed_length(if self.is_extended() { 32 } else { 16 })
    }

    /// Packs the bitmap: 8 raw bytes, or 16 when extended, then rendered
    /// through the configured formatter. A non-binary formatter gets the hex
    /// rendering of the raw bytes re-encoded, so any formatter can carry a
    /// bitmap.
    pub fn pack(&self) -> Vec<u8> {
        let mut raw = self.bits[0].to_be_bytes().to_vec();
        if self.is_extended() {
            raw.extend_from_slice(&self.bits[1].to_be_bytes());
        }
        if self.formatter == Formatter::Binary {
            return raw;
        }
        let hex = Formatter::Binary.decode(&raw, raw.len() * 2);
        self.formatter.encode(&hex)
    }

    /// Unpacks the bitmap at `offset`, returning the offset of the first
    /// field. The first formatted unit decides basic vs extended: a raw
    /// byte of 0x80 or more, or a leading hex digit of '8' or more, means
    /// the MSB — bit 1 — is set and a second bitmap follows.
    pub fn unpack(&mut self, data: &[u8], offset: usize) -> Result<usize> {
        if offset >= data.len() {
            return Err(Error::MalformedBitmap);
        }
        let extended = match self.formatter {
            Formatter::Binary => data[offset] >= 0x80,
            _ => data[offset] >= 0x38,
        };
        let length = self
            .formatter
            .packed_length(if extended { 32 } else { 16 });
        let end = offset + length;
        if end > data.len() {
            return Err(Error::MalformedBitmap);
        }

        let raw = if self.formatter == Formatter::Binary {
            data[offset..end].to_vec()
        } else {
            let hex = self.formatter.decode(&data[offset..end], length);
            if !FieldValidator::Hex.is_valid(&hex) {
                return Err(Error::MalformedBitmap);
            }
            Formatter::Binary.encode(&hex)
        };

        let mut words = [0u64; 2];
        words[0] = u64::from_be_bytes(raw[0..8].try_into().map_err(|_| Error::MalformedBitmap)?);
        if raw.len() >= 16 {
            words[1] =
                u64::from_be_bytes(raw[8..16].try_into().map_err(|_| Error::MalformedBitmap)?);
        }
        self.bits = words;
        // Den Invariant von Bit 1 wiederherstellen, falls das Wire lügt.
        self.set(1, false);
        Ok(end)
    }
}
