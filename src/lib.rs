//! oktet – ISO 8583 message codec
//!
//! Packs and unpacks the bitmap-driven message bodies of the ISO 8583
//! card-payment interchange standard: composable field descriptors
//! (length formatter + validator + value formatter + optional adjuster),
//! a 128-bit presence bitmap with extended-bitmap auto-promotion, and a
//! message orchestrator walking fields 2..=128 in wire order.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use oktet::{FieldDescriptor, Message, Template};
//!
//! let mut template = Template::new();
//! template
//!     .set(2, FieldDescriptor::ascii_ll_numeric(19).pan_mask())
//!     .set(3, FieldDescriptor::ascii_numeric(6))
//!     .set(4, FieldDescriptor::ascii_numeric(12));
//! let template = Arc::new(template);
//!
//! // Pack
//! let mut msg = Message::new(Arc::clone(&template));
//! msg.set_field(2, "4242424242424242").unwrap();
//! msg.set_field(3, "000000").unwrap();
//! msg.set_field(4, "1500").unwrap();
//! let wire = msg.to_msg().unwrap();
//!
//! // Unpack
//! let mut decoded = Message::new(template);
//! let offset = decoded.unpack(&wire, 0).unwrap();
//! assert_eq!(offset, wire.len());
//! assert_eq!(decoded.field_value(4).unwrap(), "000000001500");
//! ```
//!
//! Message type indicator, transport framing and concrete field catalogs
//! are the caller's business; this crate is the codec underneath them.

pub mod additional_amount;
pub mod adjuster;
pub mod bitmap;
pub mod descriptor;
pub mod error;
pub mod formatter;
pub mod length;
pub mod message;
pub mod pan;
pub mod processing_code;
pub mod template;
pub mod validator;

pub use error::{Error, Result};

/// HashMap with ahash (fast, not DoS resistant — internal data structures
/// keyed by small field numbers).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

// Public API: the codec building blocks
pub use adjuster::{Adjuster, PadLeft, PadRight};
pub use bitmap::Bitmap;
pub use descriptor::{DisplayMask, FieldDescriptor};
pub use formatter::Formatter;
pub use length::LengthFormatter;
pub use message::Message;
pub use template::{Template, FIELD_RANGE};
pub use validator::FieldValidator;

// Public API: sub-field views and PAN helpers
pub use additional_amount::AdditionalAmount;
pub use processing_code::ProcessingCode;
