use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use vc_descriptor::{DefaultValue, EnumValueDescriptor, FieldDescriptor, FieldType, ValueKind};

use crate::{DynamicMessage, DynamicMessageBuilder, Message, MessageBuilder, ReflectError};

// -----------------------------------------------------------------------------
// Value

/// The runtime value of a singular field, or one element of a repeated field.
///
/// Every [`FieldKind`](vc_descriptor::FieldKind) maps to exactly one variant,
/// see [`ValueKind`]. Values are never converted between variants: an `I64`
/// is rejected by an `int32` field.
///
/// Equality treats every NaN as equal to every other NaN, so a float field
/// reads back equal to what was written and a message equals its copies.
#[derive(Clone)]
pub enum Value {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    EnumValue(EnumValueDescriptor),
    Message(DynamicMessage),
}

impl Value {
    /// Returns the value a field reads as while it is unset.
    ///
    /// That is the declared default, else the zero value of the field's kind,
    /// else the first value of its enum, else an empty instance of its
    /// message type.
    pub fn default_for(field: &FieldDescriptor) -> Value {
        if let Some(default) = field.default_value() {
            return match default {
                DefaultValue::I32(v) => Value::I32(v),
                DefaultValue::I64(v) => Value::I64(v),
                DefaultValue::U32(v) => Value::U32(v),
                DefaultValue::U64(v) => Value::U64(v),
                DefaultValue::F32(v) => Value::F32(v),
                DefaultValue::F64(v) => Value::F64(v),
                DefaultValue::Bool(v) => Value::Bool(v),
                DefaultValue::String(v) => Value::String(v.into()),
                DefaultValue::Bytes(v) => Value::Bytes(v.into()),
                DefaultValue::Enum(v) => Value::EnumValue(v),
            };
        }
        match field.field_type() {
            FieldType::Enum(enum_type) => Value::EnumValue(enum_type.default_value()),
            FieldType::Message(message_type) => {
                Value::Message(DynamicMessage::default_instance(message_type))
            }
            FieldType::Scalar(kind) => Value::zero(kind),
        }
    }

    fn zero(kind: ValueKind) -> Value {
        match kind {
            ValueKind::I32 => Value::I32(0),
            ValueKind::I64 => Value::I64(0),
            ValueKind::U32 => Value::U32(0),
            ValueKind::U64 => Value::U64(0),
            ValueKind::F32 => Value::F32(0.0),
            ValueKind::F64 => Value::F64(0.0),
            ValueKind::Bool => Value::Bool(false),
            ValueKind::String => Value::String(String::new()),
            // Enum and message fields are resolved by `default_for`.
            ValueKind::Bytes | ValueKind::Enum | ValueKind::Message => Value::Bytes(Vec::new()),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::I32(_) => ValueKind::I32,
            Value::I64(_) => ValueKind::I64,
            Value::U32(_) => ValueKind::U32,
            Value::U64(_) => ValueKind::U64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::Bool(_) => ValueKind::Bool,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::EnumValue(_) => ValueKind::Enum,
            Value::Message(_) => ValueKind::Message,
        }
    }

    /// Returns `true` if `field` accepts this value.
    pub fn is_valid_for(&self, field: &FieldDescriptor) -> bool {
        match (field.field_type(), self) {
            (FieldType::Enum(expected), Value::EnumValue(value)) => value.parent_enum() == expected,
            (FieldType::Message(expected), Value::Message(message)) => {
                *message.descriptor() == expected
            }
            (FieldType::Scalar(kind), value) => value.kind() == kind,
            _ => false,
        }
    }

    /// Fails with [`ReflectError::TypeMismatch`] if `field` rejects this value.
    pub(crate) fn check(&self, field: &FieldDescriptor) -> Result<(), ReflectError> {
        if self.is_valid_for(field) {
            return Ok(());
        }
        let expected = match field.field_type() {
            FieldType::Enum(expected) => format!("a value of enum `{}`", expected.full_name()),
            FieldType::Message(expected) => format!("a message of type `{}`", expected.full_name()),
            FieldType::Scalar(kind) => format!("a {kind} value"),
        };
        let found = match self {
            Value::EnumValue(value) => format!("`{}`", value.full_name()),
            Value::Message(message) => format!("a message of type `{}`", message.descriptor()),
            value => format!("a {} value", value.kind()),
        };
        Err(ReflectError::TypeMismatch {
            field: field.full_name().into(),
            expected,
            found,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors

    #[inline]
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::I32(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::U32(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::F32(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_enum(&self) -> Option<&EnumValueDescriptor> {
        match self {
            Value::EnumValue(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::F64(a), Value::F64(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::EnumValue(a), Value::EnumValue(b)) => a == b,
            (Value::Message(a), Value::Message(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I32(v) => fmt::Debug::fmt(v, f),
            Value::I64(v) => fmt::Debug::fmt(v, f),
            Value::U32(v) => fmt::Debug::fmt(v, f),
            Value::U64(v) => fmt::Debug::fmt(v, f),
            Value::F32(v) => fmt::Debug::fmt(v, f),
            Value::F64(v) => fmt::Debug::fmt(v, f),
            Value::Bool(v) => fmt::Debug::fmt(v, f),
            Value::String(v) => fmt::Debug::fmt(v, f),
            Value::Bytes(v) => write!(f, "b\"{}\"", v.escape_ascii()),
            Value::EnumValue(v) => f.write_str(v.name()),
            Value::Message(v) => fmt::Debug::fmt(v, f),
        }
    }
}

// -----------------------------------------------------------------------------
// IntoValue

/// Conversion into a field value for setters.
///
/// `None` stands for a missing payload: every setter rejects it with
/// [`ReflectError::InvalidArgument`] and leaves the message unchanged.
///
/// # Examples
///
/// ```
/// use vc_message::{IntoValue, Value};
///
/// assert_eq!(7_i32.into_value(), Some(Value::I32(7)));
/// assert_eq!("abc".into_value(), Some(Value::String("abc".into())));
/// assert_eq!(None::<String>.into_value(), None);
/// ```
pub trait IntoValue {
    fn into_value(self) -> Option<Value>;
}

impl IntoValue for Value {
    #[inline]
    fn into_value(self) -> Option<Value> {
        Some(self)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    #[inline]
    fn into_value(self) -> Option<Value> {
        self.and_then(IntoValue::into_value)
    }
}

impl IntoValue for &Value {
    #[inline]
    fn into_value(self) -> Option<Value> {
        Some(self.clone())
    }
}

impl IntoValue for DynamicMessageBuilder {
    #[inline]
    fn into_value(self) -> Option<Value> {
        Some(Value::Message(self.build()))
    }
}

macro_rules! impl_into_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                #[inline]
                fn into_value(self) -> Option<Value> {
                    Some(Value::$variant(self.into()))
                }
            }

            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

impl_into_value! {
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    EnumValueDescriptor => EnumValue,
    DynamicMessage => Message,
}
