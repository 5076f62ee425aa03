use core::fmt;

// -----------------------------------------------------------------------------
// FieldKind

/// The declared wire kind of a field.
///
/// Several kinds share one runtime representation (see [`ValueKind`]);
/// the distinction between e.g. `Int32`, `SInt32` and `SFixed32`
/// only matters to a wire codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Double,
    Float,
    Int64,
    UInt64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    UInt32,
    Enum,
    SFixed32,
    SFixed64,
    SInt32,
    SInt64,
}

impl FieldKind {
    /// Returns the runtime value kind a field of this kind holds.
    pub const fn value_kind(self) -> ValueKind {
        match self {
            Self::Int32 | Self::SInt32 | Self::SFixed32 => ValueKind::I32,
            Self::Int64 | Self::SInt64 | Self::SFixed64 => ValueKind::I64,
            Self::UInt32 | Self::Fixed32 => ValueKind::U32,
            Self::UInt64 | Self::Fixed64 => ValueKind::U64,
            Self::Float => ValueKind::F32,
            Self::Double => ValueKind::F64,
            Self::Bool => ValueKind::Bool,
            Self::String => ValueKind::String,
            Self::Bytes => ValueKind::Bytes,
            Self::Enum => ValueKind::Enum,
            Self::Message | Self::Group => ValueKind::Message,
        }
    }

    /// Returns `true` for message and group fields.
    #[inline]
    pub const fn is_message(self) -> bool {
        matches!(self, Self::Message | Self::Group)
    }

    /// Returns `true` if the field refers to a named type (message, group or enum).
    #[inline]
    pub const fn is_named_type(self) -> bool {
        matches!(self, Self::Message | Self::Group | Self::Enum)
    }

    /// Returns `true` if repeated fields of this kind may use packed encoding.
    #[inline]
    pub const fn is_packable(self) -> bool {
        !matches!(
            self,
            Self::String | Self::Bytes | Self::Message | Self::Group
        )
    }

    /// Returns the schema keyword of this kind, e.g. `"sfixed64"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Int32 => "int32",
            Self::Fixed64 => "fixed64",
            Self::Fixed32 => "fixed32",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Group => "group",
            Self::Message => "message",
            Self::Bytes => "bytes",
            Self::UInt32 => "uint32",
            Self::Enum => "enum",
            Self::SFixed32 => "sfixed32",
            Self::SFixed64 => "sfixed64",
            Self::SInt32 => "sint32",
            Self::SInt64 => "sint64",
        }
    }
}

impl fmt::Display for FieldKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

// -----------------------------------------------------------------------------
// ValueKind

/// The runtime representation of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    Bool,
    String,
    Bytes,
    Enum,
    Message,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32 => f.pad("i32"),
            Self::I64 => f.pad("i64"),
            Self::U32 => f.pad("u32"),
            Self::U64 => f.pad("u64"),
            Self::F32 => f.pad("f32"),
            Self::F64 => f.pad("f64"),
            Self::Bool => f.pad("bool"),
            Self::String => f.pad("string"),
            Self::Bytes => f.pad("bytes"),
            Self::Enum => f.pad("enum"),
            Self::Message => f.pad("message"),
        }
    }
}

// -----------------------------------------------------------------------------
// Cardinality

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Optional,
    Required,
    Repeated,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optional => f.pad("optional"),
            Self::Required => f.pad("required"),
            Self::Repeated => f.pad("repeated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldKind, ValueKind};

    #[test]
    fn wire_variants_share_value_kind() {
        assert_eq!(FieldKind::SInt32.value_kind(), ValueKind::I32);
        assert_eq!(FieldKind::SFixed64.value_kind(), ValueKind::I64);
        assert_eq!(FieldKind::Fixed32.value_kind(), ValueKind::U32);
        assert_eq!(FieldKind::Group.value_kind(), ValueKind::Message);
    }

    #[test]
    fn packable_kinds() {
        assert!(FieldKind::Enum.is_packable());
        assert!(FieldKind::Double.is_packable());
        assert!(!FieldKind::Bytes.is_packable());
        assert!(!FieldKind::Group.is_packable());
    }
}
