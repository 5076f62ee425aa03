//! Already-parsed schema declarations, the input of the linker.
//!
//! These are plain data: nothing is validated until the file is added to a
//! [`DescriptorPoolBuilder`](crate::DescriptorPoolBuilder).

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::{Cardinality, FieldKind};

// -----------------------------------------------------------------------------
// FileProto

/// One schema file: a package, its imports and its top-level definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileProto {
    pub name: String,
    pub package: String,
    pub dependencies: Vec<String>,
    pub messages: Vec<MessageProto>,
    pub enums: Vec<EnumProto>,
    pub extensions: Vec<FieldProto>,
}

impl FileProto {
    /// Creates an empty file without package.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Adds an import. The imported file must be linked first.
    pub fn with_dependency(mut self, file_name: impl Into<String>) -> Self {
        self.dependencies.push(file_name.into());
        self
    }

    pub fn with_message(mut self, message: MessageProto) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_enum(mut self, enum_proto: EnumProto) -> Self {
        self.enums.push(enum_proto);
        self
    }

    /// Adds a file-level extension; `field.extendee` must be set.
    pub fn with_extension(mut self, field: FieldProto) -> Self {
        self.extensions.push(field);
        self
    }
}

// -----------------------------------------------------------------------------
// MessageProto

/// A message type declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageProto {
    pub name: String,
    pub fields: Vec<FieldProto>,
    pub nested_messages: Vec<MessageProto>,
    pub nested_enums: Vec<EnumProto>,
    pub extensions: Vec<FieldProto>,
    pub extension_ranges: Vec<Range<u32>>,
}

impl MessageProto {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, field: FieldProto) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_nested_message(mut self, message: MessageProto) -> Self {
        self.nested_messages.push(message);
        self
    }

    pub fn with_nested_enum(mut self, enum_proto: EnumProto) -> Self {
        self.nested_enums.push(enum_proto);
        self
    }

    /// Adds an extension declared inside this message's scope.
    pub fn with_extension(mut self, field: FieldProto) -> Self {
        self.extensions.push(field);
        self
    }

    /// Opens `range` (end exclusive) for extensions.
    pub fn with_extension_range(mut self, range: Range<u32>) -> Self {
        self.extension_ranges.push(range);
        self
    }

    /// Declares a group: a nested message named `group.name` plus a field
    /// named after it in lower case, with kind [`FieldKind::Group`].
    ///
    /// ```
    /// use vc_descriptor::{Cardinality, FieldKind, FieldProto, MessageProto};
    ///
    /// let message = MessageProto::new("Outer").with_group(
    ///     Cardinality::Optional,
    ///     16,
    ///     MessageProto::new("OptionalGroup").with_field(FieldProto::optional("a", 17, FieldKind::Int32)),
    /// );
    ///
    /// assert_eq!(message.fields[0].name, "optionalgroup");
    /// assert_eq!(message.fields[0].type_name.as_deref(), Some("OptionalGroup"));
    /// assert_eq!(message.nested_messages[0].name, "OptionalGroup");
    /// ```
    pub fn with_group(mut self, cardinality: Cardinality, number: u32, group: MessageProto) -> Self {
        let field = FieldProto::new(group.name.to_lowercase(), number, cardinality, FieldKind::Group)
            .with_type_name(group.name.clone());
        self.fields.push(field);
        self.nested_messages.push(group);
        self
    }
}

// -----------------------------------------------------------------------------
// FieldProto

/// A field or extension declaration.
///
/// `type_name` is required for message, group and enum kinds and is resolved
/// relative to the declaring scope; a leading `.` makes it fully qualified.
/// `default_value` uses the schema's textual form (`"-45"`, `"inf"`,
/// `"BAR"`, C-escaped bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldProto {
    pub name: String,
    pub number: u32,
    pub cardinality: Cardinality,
    pub kind: FieldKind,
    pub type_name: Option<String>,
    pub default_value: Option<String>,
    pub extendee: Option<String>,
    pub packed: bool,
}

impl FieldProto {
    pub fn new(name: impl Into<String>, number: u32, cardinality: Cardinality, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            number,
            cardinality,
            kind,
            type_name: None,
            default_value: None,
            extendee: None,
            packed: false,
        }
    }

    #[inline]
    pub fn optional(name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        Self::new(name, number, Cardinality::Optional, kind)
    }

    #[inline]
    pub fn required(name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        Self::new(name, number, Cardinality::Required, kind)
    }

    #[inline]
    pub fn repeated(name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        Self::new(name, number, Cardinality::Repeated, kind)
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_extendee(mut self, extendee: impl Into<String>) -> Self {
        self.extendee = Some(extendee.into());
        self
    }

    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }
}

// -----------------------------------------------------------------------------
// EnumProto

/// An enum declaration; values keep their declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumProto {
    pub name: String,
    pub values: Vec<(String, i32)>,
}

impl EnumProto {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push((name.into(), number));
        self
    }
}
