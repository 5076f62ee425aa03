//! `serde` support for messages.
//!
//! A message serializes as a map of its present fields, keyed by field name.
//! Extensions use their bracketed full name, e.g. `"[pkg.my_extension]"`, and
//! enum values serialize as their name. Unset fields are skipped, so defaults
//! never appear in the output.
//!
//! # Examples
//!
//! ```
//! use vc_descriptor::{DescriptorPool, EnumProto, FieldKind, FieldProto, FileProto, MessageProto};
//! use vc_message::{DynamicMessageBuilder, MessageBuilder};
//!
//! let pool = DescriptorPool::from_files([FileProto::new("s.proto")
//!     .with_enum(EnumProto::new("Mode").with_value("OFF", 0).with_value("ON", 1))
//!     .with_message(
//!         MessageProto::new("Switch")
//!             .with_field(FieldProto::optional("mode", 1, FieldKind::Enum).with_type_name("Mode"))
//!             .with_field(FieldProto::repeated("levels", 2, FieldKind::UInt32))
//!             .with_field(FieldProto::optional("label", 3, FieldKind::String)),
//!     )])
//! .unwrap();
//! let on = pool.find_enum("Mode").unwrap().find_value("ON").unwrap();
//!
//! let mut builder = DynamicMessageBuilder::new(pool.find_message("Switch").unwrap());
//! builder.set_field_by_name("mode", on).unwrap();
//! builder.add_field_by_name("levels", 3_u32).unwrap();
//! builder.add_field_by_name("levels", 7_u32).unwrap();
//!
//! let json = serde_json::to_string(&builder.build()).unwrap();
//! assert_eq!(json, r#"{"mode":"ON","levels":[3,7]}"#);
//! ```

use serde_core::ser::SerializeMap;
use serde_core::{Serialize, Serializer};
use vc_descriptor::FieldDescriptor;

use crate::{DynamicMessage, FieldSet, FieldValue, Message, Value};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Bytes(v) => serializer.serialize_bytes(v),
            Value::EnumValue(v) => serializer.serialize_str(v.name()),
            Value::Message(v) => v.serialize(serializer),
        }
    }
}

impl Serialize for FieldValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Singular(value) => value.serialize(serializer),
            FieldValue::Repeated(values) => values.serialize(serializer),
        }
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(None)?;
        for (field, value) in self.iter() {
            state.serialize_entry(&FieldKey(&field), &value)?;
        }
        state.end()
    }
}

impl Serialize for DynamicMessage {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.field_set().serialize(serializer)
    }
}

struct FieldKey<'a>(&'a FieldDescriptor);

impl Serialize for FieldKey<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_extension() {
            serializer.collect_str(&format_args!("[{}]", self.0.full_name()))
        } else {
            serializer.serialize_str(self.0.name())
        }
    }
}
