use core::fmt;

use super::impl_handle;
use crate::default::RawDefault;
use crate::pool::FieldInner;
use crate::{Cardinality, DefaultValue, DescriptorPool, FieldKind, ValueKind};
use crate::{EnumDescriptor, EnumValueDescriptor, FileDescriptor, MessageDescriptor};

// -----------------------------------------------------------------------------
// FieldType

/// What a field holds, with the referenced type already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ValueKind),
    Enum(EnumDescriptor),
    Message(MessageDescriptor),
}

// -----------------------------------------------------------------------------
// FieldDescriptor

/// A field of a message, or an extension.
///
/// For an extension, [`containing_message`](Self::containing_message) is the
/// extended message and [`extension_scope`](Self::extension_scope) is the
/// message it was declared in, if any.
#[derive(Clone)]
pub struct FieldDescriptor {
    pool: DescriptorPool,
    index: u32,
}

impl_handle!(FieldDescriptor, fields, FieldInner);

impl FieldDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Returns the fully qualified name, e.g. `"unittest.TestAllTypes.optional_int32"`.
    #[inline]
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    #[inline]
    pub fn number(&self) -> u32 {
        self.inner().number
    }

    /// Returns the declaration position.
    ///
    /// For plain fields this is the slot index inside the containing message;
    /// for extensions, the position in the declaring scope.
    #[inline]
    pub fn index(&self) -> usize {
        self.inner().position as usize
    }

    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.inner().kind
    }

    #[inline]
    pub fn cardinality(&self) -> Cardinality {
        self.inner().cardinality
    }

    #[inline]
    pub fn is_repeated(&self) -> bool {
        self.cardinality() == Cardinality::Repeated
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.cardinality() == Cardinality::Required
    }

    #[inline]
    pub fn is_packed(&self) -> bool {
        self.inner().packed
    }

    #[inline]
    pub fn is_extension(&self) -> bool {
        self.inner().is_extension
    }

    /// Returns the message this field belongs to, the extendee for extensions.
    #[inline]
    pub fn containing_message(&self) -> MessageDescriptor {
        MessageDescriptor::new(self.pool.clone(), self.inner().containing)
    }

    /// Returns the message an extension was declared in.
    ///
    /// `None` for plain fields and for file-level extensions.
    pub fn extension_scope(&self) -> Option<MessageDescriptor> {
        let scope = self.inner().extension_scope?;
        Some(MessageDescriptor::new(self.pool.clone(), scope))
    }

    /// Returns the message type of message and group fields.
    pub fn message_type(&self) -> Option<MessageDescriptor> {
        let inner = self.inner();
        match inner.type_index {
            Some(index) if inner.kind.is_message() => {
                Some(MessageDescriptor::new(self.pool.clone(), index))
            }
            _ => None,
        }
    }

    /// Returns the enum type of enum fields.
    pub fn enum_type(&self) -> Option<EnumDescriptor> {
        let inner = self.inner();
        match inner.type_index {
            Some(index) if inner.kind == FieldKind::Enum => {
                Some(EnumDescriptor::new(self.pool.clone(), index))
            }
            _ => None,
        }
    }

    /// Returns the resolved type of this field.
    pub fn field_type(&self) -> FieldType {
        let inner = self.inner();
        match (inner.kind, inner.type_index) {
            (FieldKind::Enum, Some(index)) => FieldType::Enum(EnumDescriptor::new(self.pool.clone(), index)),
            (FieldKind::Message | FieldKind::Group, Some(index)) => {
                FieldType::Message(MessageDescriptor::new(self.pool.clone(), index))
            }
            (kind, _) => FieldType::Scalar(kind.value_kind()),
        }
    }

    #[inline]
    pub fn has_default_value(&self) -> bool {
        self.inner().default.is_some()
    }

    /// Returns the explicitly declared default, if any.
    ///
    /// Fields without one default to their kind's zero value, or to the
    /// first value of their enum.
    pub fn default_value(&self) -> Option<DefaultValue> {
        Some(match self.inner().default.as_ref()? {
            RawDefault::I32(v) => DefaultValue::I32(*v),
            RawDefault::I64(v) => DefaultValue::I64(*v),
            RawDefault::U32(v) => DefaultValue::U32(*v),
            RawDefault::U64(v) => DefaultValue::U64(*v),
            RawDefault::F32(v) => DefaultValue::F32(*v),
            RawDefault::F64(v) => DefaultValue::F64(*v),
            RawDefault::Bool(v) => DefaultValue::Bool(*v),
            RawDefault::String(v) => DefaultValue::String(v.clone()),
            RawDefault::Bytes(v) => DefaultValue::Bytes(v.clone()),
            RawDefault::Enum(v) => DefaultValue::Enum(EnumValueDescriptor::new(self.pool.clone(), *v)),
        })
    }

    #[inline]
    pub fn file(&self) -> FileDescriptor {
        FileDescriptor::new(self.pool.clone(), self.inner().file)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

impl fmt::Display for FieldDescriptor {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.full_name())
    }
}
