//! The `protobuf_unittest` schema, built from tables.

use alloc::format;
use alloc::vec::Vec;

use vc_descriptor::{
    Cardinality, DescriptorPool, EnumProto, FieldKind, FieldProto, FileProto, MessageDescriptor, MessageProto,
};

use crate::ExtensionRegistry;

pub const PACKAGE: &str = "protobuf_unittest";

/// Scalar fields: suffix, number, kind, default text.
const SCALARS: [(&str, u32, FieldKind, &str); 15] = [
    ("int32", 1, FieldKind::Int32, "41"),
    ("int64", 2, FieldKind::Int64, "42"),
    ("uint32", 3, FieldKind::UInt32, "43"),
    ("uint64", 4, FieldKind::UInt64, "44"),
    ("sint32", 5, FieldKind::SInt32, "-45"),
    ("sint64", 6, FieldKind::SInt64, "46"),
    ("fixed32", 7, FieldKind::Fixed32, "47"),
    ("fixed64", 8, FieldKind::Fixed64, "48"),
    ("sfixed32", 9, FieldKind::SFixed32, "49"),
    ("sfixed64", 10, FieldKind::SFixed64, "-50"),
    ("float", 11, FieldKind::Float, "51.5"),
    ("double", 12, FieldKind::Double, "52e3"),
    ("bool", 13, FieldKind::Bool, "true"),
    ("string", 14, FieldKind::String, "hello"),
    ("bytes", 15, FieldKind::Bytes, "world"),
];

/// Fields of named types: suffix, number, kind, fully qualified type name.
const TYPED: [(&str, u32, FieldKind, &str); 6] = [
    ("nested_message", 18, FieldKind::Message, ".protobuf_unittest.TestAllTypes.NestedMessage"),
    ("foreign_message", 19, FieldKind::Message, ".protobuf_unittest.ForeignMessage"),
    ("import_message", 20, FieldKind::Message, ".protobuf_unittest_import.ImportMessage"),
    ("nested_enum", 21, FieldKind::Enum, ".protobuf_unittest.TestAllTypes.NestedEnum"),
    ("foreign_enum", 22, FieldKind::Enum, ".protobuf_unittest.ForeignEnum"),
    ("import_enum", 23, FieldKind::Enum, ".protobuf_unittest_import.ImportEnum"),
];

/// Default enum fields: suffix, number, type name, default value.
const ENUM_DEFAULTS: [(&str, u32, &str, &str); 3] = [
    ("nested_enum", 81, ".protobuf_unittest.TestAllTypes.NestedEnum", "BAR"),
    ("foreign_enum", 82, ".protobuf_unittest.ForeignEnum", "FOREIGN_BAR"),
    ("import_enum", 83, ".protobuf_unittest_import.ImportEnum", "IMPORT_BAR"),
];

/// String fields with a ctype in the schema language: suffix, number, default.
const CTYPES: [(&str, u32, &str); 2] = [("string_piece", 24, "abc"), ("cord", 25, "123")];

const REPEATED_OFFSET: u32 = 30;

/// The fields of `TestAllTypes`, named with `prefix` and numbered from
/// `offset`, as plain fields or as extensions of `TestAllExtensions`.
fn field_family(cardinality: Cardinality, prefix: &str, offset: u32, suffix: &str) -> Vec<FieldProto> {
    let mut fields = Vec::new();
    for (name, number, kind, _) in SCALARS {
        fields.push(FieldProto::new(format!("{prefix}_{name}{suffix}"), number + offset, cardinality, kind));
    }
    for (name, number, kind, type_name) in TYPED {
        fields.push(
            FieldProto::new(format!("{prefix}_{name}{suffix}"), number + offset, cardinality, kind)
                .with_type_name(type_name),
        );
    }
    for (name, number, _) in CTYPES {
        fields.push(FieldProto::new(
            format!("{prefix}_{name}{suffix}"),
            number + offset,
            cardinality,
            FieldKind::String,
        ));
    }
    fields
}

fn defaults(suffix: &str) -> Vec<FieldProto> {
    let mut fields = Vec::new();
    for (name, number, kind, default) in SCALARS {
        fields.push(FieldProto::optional(format!("default_{name}{suffix}"), number + 60, kind).with_default(default));
    }
    for (name, number, type_name, default) in ENUM_DEFAULTS {
        fields.push(
            FieldProto::optional(format!("default_{name}{suffix}"), number, FieldKind::Enum)
                .with_type_name(type_name)
                .with_default(default),
        );
    }
    for (name, number, default) in CTYPES {
        fields.push(
            FieldProto::optional(format!("default_{name}{suffix}"), number + 60, FieldKind::String)
                .with_default(default),
        );
    }
    fields
}

fn group(name: &str, number: u32) -> MessageProto {
    MessageProto::new(name).with_field(FieldProto::optional("a", number, FieldKind::Int32))
}

// -----------------------------------------------------------------------------
// Files

fn import_file() -> FileProto {
    FileProto::new("unittest_import.proto")
        .with_package("protobuf_unittest_import")
        .with_message(MessageProto::new("ImportMessage").with_field(FieldProto::optional("d", 1, FieldKind::Int32)))
        .with_enum(
            EnumProto::new("ImportEnum")
                .with_value("IMPORT_FOO", 7)
                .with_value("IMPORT_BAR", 8)
                .with_value("IMPORT_BAZ", 9),
        )
}

fn test_all_types() -> MessageProto {
    let mut message = MessageProto::new("TestAllTypes")
        .with_nested_message(MessageProto::new("NestedMessage").with_field(FieldProto::optional("bb", 1, FieldKind::Int32)))
        .with_nested_enum(
            EnumProto::new("NestedEnum")
                .with_value("FOO", 1)
                .with_value("BAR", 2)
                .with_value("BAZ", 3),
        );
    for field in field_family(Cardinality::Optional, "optional", 0, "") {
        message = message.with_field(field);
    }
    message = message.with_group(Cardinality::Optional, 16, group("OptionalGroup", 17));
    for field in field_family(Cardinality::Repeated, "repeated", REPEATED_OFFSET, "") {
        message = message.with_field(field);
    }
    message = message.with_group(Cardinality::Repeated, 46, group("RepeatedGroup", 47));
    for field in defaults("") {
        message = message.with_field(field);
    }
    message
}

fn test_required() -> MessageProto {
    MessageProto::new("TestRequired")
        .with_field(FieldProto::required("a", 1, FieldKind::Int32))
        .with_field(FieldProto::optional("dummy2", 2, FieldKind::Int32))
        .with_field(FieldProto::required("b", 3, FieldKind::Int32))
        .with_extension(
            FieldProto::optional("single", 1000, FieldKind::Message)
                .with_type_name("TestRequired")
                .with_extendee("TestAllExtensions"),
        )
        .with_extension(
            FieldProto::repeated("multi", 1001, FieldKind::Message)
                .with_type_name("TestRequired")
                .with_extendee("TestAllExtensions"),
        )
}

fn test_packed_types() -> MessageProto {
    let mut message = MessageProto::new("TestPackedTypes");
    for (name, number, kind, _) in SCALARS.iter().take(13) {
        message = message.with_field(FieldProto::repeated(format!("packed_{name}"), number + 89, *kind).packed());
    }
    message.with_field(
        FieldProto::repeated("packed_enum", 103, FieldKind::Enum)
            .with_type_name("ForeignEnum")
            .packed(),
    )
}

fn unittest_file() -> FileProto {
    let mut file = FileProto::new("unittest.proto")
        .with_package(PACKAGE)
        .with_dependency("unittest_import.proto")
        .with_message(test_all_types())
        .with_message(MessageProto::new("ForeignMessage").with_field(FieldProto::optional("c", 1, FieldKind::Int32)))
        .with_enum(
            EnumProto::new("ForeignEnum")
                .with_value("FOREIGN_FOO", 4)
                .with_value("FOREIGN_BAR", 5)
                .with_value("FOREIGN_BAZ", 6),
        )
        .with_message(MessageProto::new("TestAllExtensions").with_extension_range(1..536_870_912))
        .with_message(group("OptionalGroup_extension", 17))
        .with_message(group("RepeatedGroup_extension", 47))
        .with_message(test_required())
        .with_message(
            MessageProto::new("TestRequiredForeign")
                .with_field(FieldProto::optional("optional_message", 1, FieldKind::Message).with_type_name("TestRequired"))
                .with_field(FieldProto::repeated("repeated_message", 2, FieldKind::Message).with_type_name("TestRequired"))
                .with_field(FieldProto::optional("dummy", 3, FieldKind::Int32)),
        )
        .with_message(test_packed_types());

    let mut extensions = field_family(Cardinality::Optional, "optional", 0, "_extension");
    extensions.push(
        FieldProto::new("optionalgroup_extension", 16, Cardinality::Optional, FieldKind::Group)
            .with_type_name("OptionalGroup_extension"),
    );
    extensions.extend(field_family(Cardinality::Repeated, "repeated", REPEATED_OFFSET, "_extension"));
    extensions.push(
        FieldProto::new("repeatedgroup_extension", 46, Cardinality::Repeated, FieldKind::Group)
            .with_type_name("RepeatedGroup_extension"),
    );
    extensions.extend(defaults("_extension"));
    for extension in extensions {
        file = file.with_extension(extension.with_extendee("TestAllExtensions"));
    }
    file
}

// -----------------------------------------------------------------------------
// Accessors

pub fn pool() -> DescriptorPool {
    DescriptorPool::from_files([import_file(), unittest_file()]).unwrap()
}

/// Every extension of `unittest.proto`.
pub fn registry(pool: &DescriptorPool) -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    registry.add_file(&pool.file_by_name("unittest.proto").unwrap()).unwrap();
    registry
}

pub fn message(pool: &DescriptorPool, name: &str) -> MessageDescriptor {
    pool.find_message(&format!("{PACKAGE}.{name}")).unwrap()
}

/// Number of repeated fields in `TestAllTypes`, and of repeated extensions
/// of `TestAllExtensions`, excluding the scoped `multi`.
pub const REPEATED_COUNT: usize = SCALARS.len() + TYPED.len() + CTYPES.len() + 1;

#[test]
fn schema_links() {
    let pool = pool();
    let all_types = message(&pool, "TestAllTypes");
    assert_eq!(all_types.field_count(), 2 * REPEATED_COUNT + SCALARS.len() + ENUM_DEFAULTS.len() + CTYPES.len());
    assert_eq!(all_types.fields().filter(|f| f.is_repeated()).count(), REPEATED_COUNT);

    let registry = registry(&pool);
    let extendee = message(&pool, "TestAllExtensions");
    assert_eq!(registry.extensions_of(&extendee).count(), all_types.field_count() + 2);
}
