use alloc::string::ToString;

use vc_descriptor::{FieldDescriptor, FieldType, ValueKind};

use crate::Value;

// -----------------------------------------------------------------------------
// Pass

/// Which write a sample is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// The value of a singular field.
    Singular,
    /// The first element of a repeated field.
    First,
    /// The second element of a repeated field.
    Second,
    /// The replacement written by [`Reflector::modify_repeated_fields`].
    ///
    /// [`Reflector::modify_repeated_fields`]: crate::driver::Reflector::modify_repeated_fields
    Modified,
}

impl Pass {
    /// The offset [`NumberedValues`] adds to field numbers.
    #[inline]
    pub const fn base(self) -> u32 {
        match self {
            Self::Singular => 100,
            Self::First => 200,
            Self::Second => 300,
            Self::Modified => 500,
        }
    }
}

// -----------------------------------------------------------------------------
// ValueSource

/// Supplies the values a [`Reflector`](crate::driver::Reflector) writes.
///
/// `key` is the number of the field being filled, or of the parent field
/// when filling a sub-message. Returning `None` skips the field. Message
/// fields are never asked for; the reflector builds them from their fields.
pub trait ValueSource {
    fn sample(&self, field: &FieldDescriptor, key: u32, pass: Pass) -> Option<Value>;
}

impl<T: ValueSource + ?Sized> ValueSource for &T {
    #[inline]
    fn sample(&self, field: &FieldDescriptor, key: u32, pass: Pass) -> Option<Value> {
        (**self).sample(field, key, pass)
    }
}

// -----------------------------------------------------------------------------
// NumberedValues

/// Samples derived from `pass.base() + key`.
///
/// Numbers are written in the field's kind, strings and bytes as the decimal
/// text of the number. Bools are `true` except for [`Pass::Second`]. Enums
/// take the last value for singular fields and second elements, the second
/// value for first elements, and the first value as the replacement.
///
/// ```
/// use vc_descriptor::{DescriptorPool, FieldKind, FieldProto, FileProto, MessageProto};
/// use vc_message::Value;
/// use vc_message::driver::{NumberedValues, Pass, ValueSource};
///
/// let pool = DescriptorPool::from_files([FileProto::new("n.proto").with_message(
///     MessageProto::new("N").with_field(FieldProto::optional("name", 7, FieldKind::String)),
/// )])
/// .unwrap();
/// let field = pool.find_message("N").unwrap().find_field("name").unwrap();
///
/// assert_eq!(NumberedValues.sample(&field, 7, Pass::First), Some(Value::String("207".into())));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberedValues;

impl ValueSource for NumberedValues {
    fn sample(&self, field: &FieldDescriptor, key: u32, pass: Pass) -> Option<Value> {
        let n = pass.base() + key;
        let value = match field.field_type() {
            FieldType::Scalar(kind) => match kind {
                ValueKind::I32 => Value::I32(n as i32),
                ValueKind::I64 => Value::I64(n.into()),
                ValueKind::U32 => Value::U32(n),
                ValueKind::U64 => Value::U64(n.into()),
                ValueKind::F32 => Value::F32(n as f32),
                ValueKind::F64 => Value::F64(n.into()),
                ValueKind::Bool => Value::Bool(pass != Pass::Second),
                ValueKind::String => Value::String(n.to_string()),
                ValueKind::Bytes => Value::Bytes(n.to_string().into_bytes()),
                ValueKind::Enum | ValueKind::Message => return None,
            },
            FieldType::Enum(enum_type) => {
                let last = enum_type.values().len().saturating_sub(1);
                let index = match pass {
                    Pass::Singular | Pass::Second => last,
                    Pass::First => last.min(1),
                    Pass::Modified => 0,
                };
                Value::EnumValue(enum_type.values().nth(index)?)
            }
            FieldType::Message(_) => return None,
        };
        Some(value)
    }
}
