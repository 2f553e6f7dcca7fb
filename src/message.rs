//! The message orchestrator: bitmap + template + live field values.
//!
//! A message owns its bitmap and value map; the template is shared and
//! immutable. Field presence and map membership are kept consistent at all
//! times: a field has a value exactly when its bitmap bit is set. Packing
//! and unpacking always walk fields 2..=128 in ascending numeric order —
//! the wire order any conformant counterpart expects, independent of the
//! order values were assigned.

use std::fmt;
use std::sync::Arc;

use crate::bitmap::Bitmap;
use crate::formatter::Formatter;
use crate::template::{Template, FIELD_RANGE};
use crate::{Error, FastHashMap, Result};

/// A single ISO 8583 message body under construction or decoded from the
/// wire. Not thread-safe; confine each instance to one thread.
#[derive(Debug, Clone)]
pub struct Message {
    bitmap: Bitmap,
    template: Arc<Template>,
    fields: FastHashMap<u32, String>,
}

impl Message {
    /// Creates an empty message over a shared template, with a raw binary
    /// bitmap.
    pub fn new(template: Arc<Template>) -> Self {
        Self {
            bitmap: Bitmap::default(),
            template,
            fields: FastHashMap::default(),
        }
    }

    /// Creates an empty message whose bitmap is encoded through `formatter`
    /// (ASCII for hex-rendered interchanges).
    pub fn with_bitmap_formatter(template: Arc<Template>, formatter: Formatter) -> Result<Self> {
        Ok(Self {
            bitmap: Bitmap::new(formatter)?,
            template,
            fields: FastHashMap::default(),
        })
    }

    /// The template this message packs against.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Sets `field` to `value`, running the descriptor's set-adjuster first.
    /// The field's bitmap bit comes on; validation happens at pack time.
    pub fn set_field(&mut self, field: u32, value: &str) -> Result<()> {
        let descriptor = self
            .template
            .get(field)
            .ok_or(Error::UnknownField { field })?;
        let adjusted = descriptor.adjust_set(value);
        self.fields.insert(field, adjusted);
        self.bitmap.set(field, true);
        Ok(())
    }

    /// Sets or clears `field`: `None` clears, mirroring assignment of a
    /// missing value.
    pub fn assign(&mut self, field: u32, value: Option<&str>) -> Result<()> {
        match value {
            Some(v) => self.set_field(field, v),
            None => {
                self.clear_field(field);
                Ok(())
            }
        }
    }

    /// Removes `field` from the message and clears its bitmap bit.
    pub fn clear_field(&mut self, field: u32) {
        self.bitmap.set(field, false);
        self.fields.remove(&field);
    }

    /// The value of `field` after the get-adjuster, or `None` if absent.
    pub fn field_value(&self, field: u32) -> Option<String> {
        let stored = self.fields.get(&field)?;
        let descriptor = self.template.get(field)?;
        Some(descriptor.adjust_get(stored))
    }

    /// Whether `field` is present.
    pub fn is_field_set(&self, field: u32) -> bool {
        self.bitmap.is_set(field)
    }

    /// Total packed length: bitmap plus every present field, ascending.
    pub fn packed_length(&self) -> usize {
        let mut length = self.bitmap.packed_length();
        for field in FIELD_RANGE {
            if self.bitmap.is_set(field) {
                let (Some(value), Some(descriptor)) =
                    (self.fields.get(&field), self.template.get(field))
                else {
                    // set_field/clear_field/unpack halten Bitmap und Map synchron.
                    continue;
                };
                length += descriptor.packed_length(value);
            }
        }
        length
    }

    /// Packs the message body: bitmap bytes, then every present field in
    /// strictly ascending field-number order. The first field that fails
    /// validation aborts the whole pack.
    pub fn to_msg(&self) -> Result<Vec<u8>> {
        let mut out = self.bitmap.pack();
        for field in FIELD_RANGE {
            if self.bitmap.is_set(field) {
                let value = self
                    .fields
                    .get(&field)
                    .ok_or(Error::UnknownField { field })?;
                let descriptor = self
                    .template
                    .get(field)
                    .ok_or(Error::UnknownField { field })?;
                out.extend_from_slice(&descriptor.pack(field, value)?);
            }
        }
        Ok(out)
    }

    /// Unpacks a message body at `offset`: bitmap first, then every field
    /// the bitmap announces, ascending. Any field error aborts the whole
    /// operation and leaves this message unchanged — no partial decode.
    pub fn unpack(&mut self, data: &[u8], offset: usize) -> Result<usize> {
        let mut bitmap = self.bitmap.clone();
        let mut cursor = bitmap.unpack(data, offset)?;

        let mut fields = FastHashMap::default();
        for field in FIELD_RANGE {
            if bitmap.is_set(field) {
                let descriptor = self
                    .template
                    .get(field)
                    .ok_or(Error::UnknownField { field })?;
                let (value, next) = descriptor.unpack(field, data, cursor)?;
                fields.insert(field, value);
                cursor = next;
            }
        }

        log::trace!(
            "unpacked {} fields, {} bytes",
            fields.len(),
            cursor - offset
        );
        self.bitmap = bitmap;
        self.fields = fields;
        Ok(cursor)
    }

    /// One trace line per defined template field; see
    /// [`Template::describe_packing`].
    pub fn describe_packing(&self) -> String {
        self.template.describe_packing()
    }
}

impl fmt::Display for Message {
    /// Pretty-prints every present field ascending, one trace line each,
    /// with display masks applied.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in FIELD_RANGE {
            if self.bitmap.is_set(field) {
                let (Some(value), Some(descriptor)) =
                    (self.fields.get(&field), self.template.get(field))
                else {
                    continue;
                };
                writeln!(f, "{}", descriptor.display("   ", field, Some(value)))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;
    use crate::validator::FieldValidator;

    fn template() -> Arc<Template> {
        let mut t = Template::new();
        t.set(2, FieldDescriptor::ascii_var(2, 19, FieldValidator::Numeric))
            .set(3, FieldDescriptor::ascii_fixed(6, FieldValidator::Numeric))
            .set(90, FieldDescriptor::ascii_numeric(4));
        Arc::new(t)
    }

    #[test]
    fn set_get_clear_field() {
        let mut m = Message::new(template());
        assert!(!m.is_field_set(2));
        m.set_field(2, "4242424242424242").unwrap();
        assert!(m.is_field_set(2));
        assert_eq!(m.field_value(2).unwrap(), "4242424242424242");
        m.clear_field(2);
        assert!(!m.is_field_set(2));
        assert_eq!(m.field_value(2), None);
    }

    #[test]
    fn set_rejects_unknown_field() {
        let mut m = Message::new(template());
        assert_eq!(
            m.set_field(4, "123").unwrap_err(),
            Error::UnknownField { field: 4 }
        );
    }

    /// Queries and clears for field numbers outside 1..=128 have no slot to
    /// hit and must be harmless.
    #[test]
    fn out_of_range_field_queries_are_harmless() {
        let mut m = Message::new(template());
        assert!(!m.is_field_set(0));
        assert!(!m.is_field_set(200));
        m.clear_field(0);
        m.clear_field(200);
        assert_eq!(m.packed_length(), 8);
    }

    #[test]
    fn assign_none_clears() {
        let mut m = Message::new(template());
        m.set_field(3, "270010").unwrap();
        m.assign(3, None).unwrap();
        assert!(!m.is_field_set(3));
    }

    /// A field above 64 promotes the bitmap; clearing it demotes again, and
    /// the packed length follows.
    #[test]
    fn field_above_64_extends_bitmap() {
        let mut m = Message::new(template());
        m.set_field(3, "270010").unwrap();
        assert_eq!(m.packed_length(), 8 + 6);
        m.set_field(90, "1234").unwrap();
        assert_eq!(m.packed_length(), 16 + 6 + 4);
        m.clear_field(90);
        assert_eq!(m.packed_length(), 8 + 6);
    }

    #[test]
    fn adjuster_applies_on_set() {
        let mut m = Message::new(template());
        m.set_field(90, "7").unwrap();
        assert_eq!(m.field_value(90).unwrap(), "0007");
    }

    #[test]
    fn to_msg_orders_fields_ascending() {
        let mut m = Message::new(template());
        // Absichtlich in absteigender Reihenfolge gesetzt.
        m.set_field(3, "270010").unwrap();
        m.set_field(2, "4242424242424242").unwrap();
        let packed = m.to_msg().unwrap();
        let body = &packed[8..];
        assert_eq!(&body[..2], b"16");
        assert_eq!(&body[2..18], b"4242424242424242");
        assert_eq!(&body[18..], b"270010");
    }

    #[test]
    fn pack_validates_fields() {
        let mut m = Message::new(template());
        m.set_field(3, "27001x").unwrap();
        assert_eq!(m.to_msg().unwrap_err(), Error::format(3));
    }

    #[test]
    fn round_trip() {
        let mut m = Message::new(template());
        m.set_field(2, "4242424242424242").unwrap();
        m.set_field(3, "270010").unwrap();
        m.set_field(90, "42").unwrap();
        let packed = m.to_msg().unwrap();
        assert_eq!(packed.len(), m.packed_length());

        let mut decoded = Message::new(template());
        let offset = decoded.unpack(&packed, 0).unwrap();
        assert_eq!(offset, packed.len());
        assert_eq!(decoded.field_value(2).unwrap(), "4242424242424242");
        assert_eq!(decoded.field_value(3).unwrap(), "270010");
        assert_eq!(decoded.field_value(90).unwrap(), "0042");
        assert!(!decoded.is_field_set(4));
    }

    /// A failing field leaves the message untouched: no partial decode.
    #[test]
    fn unpack_failure_leaves_message_unchanged() {
        let mut m = Message::new(template());
        m.set_field(3, "111111").unwrap();

        let mut bad = Message::new(template());
        bad.set_field(2, "4242424242424242").unwrap();
        bad.set_field(3, "270010").unwrap();
        let mut packed = bad.to_msg().unwrap();
        let last = packed.len() - 1;
        packed[last] = b'x'; // Feld 3 bekommt ein ungültiges Zeichen.

        assert_eq!(m.unpack(&packed, 0).unwrap_err(), Error::format(3));
        assert!(m.is_field_set(3));
        assert_eq!(m.field_value(3).unwrap(), "111111");
        assert!(!m.is_field_set(2));
    }

    #[test]
    fn unpack_rejects_field_without_descriptor() {
        let mut t = Template::new();
        t.set(2, FieldDescriptor::ascii_fixed(4, FieldValidator::Numeric));
        let mut m = Message::new(Arc::new(t));

        // Bitmap kündigt Feld 3 an, das Template kennt es nicht.
        let mut sender_template = Template::new();
        sender_template
            .set(2, FieldDescriptor::ascii_fixed(4, FieldValidator::Numeric))
            .set(3, FieldDescriptor::ascii_fixed(2, FieldValidator::Numeric));
        let mut sender = Message::new(Arc::new(sender_template));
        sender.set_field(2, "1234").unwrap();
        sender.set_field(3, "42").unwrap();
        let packed = sender.to_msg().unwrap();

        assert_eq!(
            m.unpack(&packed, 0).unwrap_err(),
            Error::UnknownField { field: 3 }
        );
    }

    #[test]
    fn unpack_respects_starting_offset() {
        let mut m = Message::new(template());
        m.set_field(3, "270010").unwrap();
        let packed = m.to_msg().unwrap();

        let mut data = b"0200".to_vec(); // vom Aufrufer vorangestellter MTI
        data.extend_from_slice(&packed);

        let mut decoded = Message::new(template());
        let offset = decoded.unpack(&data, 4).unwrap();
        assert_eq!(offset, data.len());
        assert_eq!(decoded.field_value(3).unwrap(), "270010");
    }

    #[test]
    fn display_lists_present_fields() {
        let mut m = Message::new(template());
        m.set_field(3, "270010").unwrap();
        m.set_field(2, "4242424242424242").unwrap();
        let text = m.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" 002 "), "{}", lines[0]);
        assert!(lines[1].contains(" 003 "), "{}", lines[1]);
    }
}
