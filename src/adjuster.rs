//! Value adjusters: pure transforms applied at the field value boundary.
//!
//! An adjuster is consulted when a value is stored into a message (`on_set`)
//! and when it is read back out (`on_get`). Both default to pass-through.
//! The set transform runs once, before validation and storage, so a value
//! read back and stored again is not adjusted twice.
//!
//! Adjusters live inside shared field descriptors and must therefore be
//! stateless and thread-safe.

/// Pure transform pair consulted when getting and setting a field value.
pub trait Adjuster: Send + Sync {
    /// Transforms a caller-supplied value before it is validated and stored.
    fn on_set(&self, value: &str) -> String {
        value.to_string()
    }

    /// Transforms a stored value before it is returned to a caller.
    fn on_get(&self, value: &str) -> String {
        value.to_string()
    }
}

/// Left-pads values to a fixed width on set. Used for auto-padded numeric
/// and amount fields.
#[derive(Debug, Clone, Copy)]
pub struct PadLeft {
    /// Target width in characters.
    pub width: usize,
    /// Fill character, '0' for numeric fields.
    pub fill: char,
}

impl Adjuster for PadLeft {
    fn on_set(&self, value: &str) -> String {
        let missing = self.width.saturating_sub(value.chars().count());
        let mut out = String::with_capacity(self.width);
        out.extend(std::iter::repeat(self.fill).take(missing));
        out.push_str(value);
        out
    }
}

/// Right-pads values to a fixed width on set. Used for auto-padded
/// alphanumeric fields.
#[derive(Debug, Clone, Copy)]
pub struct PadRight {
    /// Target width in characters.
    pub width: usize,
    /// Fill character, ' ' for character fields.
    pub fill: char,
}

impl Adjuster for PadRight {
    fn on_set(&self, value: &str) -> String {
        let missing = self.width.saturating_sub(value.chars().count());
        let mut out = String::with_capacity(self.width);
        out.push_str(value);
        out.extend(std::iter::repeat(self.fill).take(missing));
        out
    }
}
