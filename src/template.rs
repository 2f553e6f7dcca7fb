//! Message templates: the map from field number to field descriptor.
//!
//! A template is built once at startup, then shared immutably by every
//! message of that type (typically behind an `Arc`). It carries no
//! per-message state.

use crate::descriptor::FieldDescriptor;
use crate::FastHashMap;

/// Field number range of an ISO 8583 message body. Field 1 is the
/// extension bit of the bitmap and never has a descriptor.
pub const FIELD_RANGE: std::ops::RangeInclusive<u32> = 2..=128;

/// Immutable description of a message type: which fields exist and how
/// each is packed.
#[derive(Debug, Clone)]
pub struct Template {
    fields: FastHashMap<u32, FieldDescriptor>,
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

impl Template {
    /// Creates an empty template.
    pub fn new() -> Self {
        Self {
            fields: FastHashMap::default(),
        }
    }

    /// Registers the descriptor for `field`, replacing any previous one.
    pub fn set(&mut self, field: u32, descriptor: FieldDescriptor) -> &mut Self {
        debug_assert!(
            FIELD_RANGE.contains(&field),
            "field {field} outside 2..=128"
        );
        self.fields.insert(field, descriptor);
        self
    }

    /// The descriptor for `field`, if the template defines it.
    pub fn get(&self, field: u32) -> Option<&FieldDescriptor> {
        self.fields.get(&field)
    }

    /// Whether the template defines `field`.
    pub fn defines(&self, field: u32) -> bool {
        self.fields.contains_key(&field)
    }

    /// Number of defined fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are defined.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// One trace line per defined field, ascending, showing how each field
    /// packs.
    pub fn describe_packing(&self) -> String {
        let mut out = String::new();
        for field in FIELD_RANGE {
            if let Some(descriptor) = self.fields.get(&field) {
                out.push_str(&descriptor.display("", field, None));
                out.push('\n');
            }
        }
        out
    }
}
