use alloc::string::ToString;
use alloc::vec::Vec;

use vc_descriptor::{DescriptorPool, FieldDescriptor, MessageDescriptor};

use super::unittest::{self, REPEATED_COUNT};
use crate::driver::{Pass, Reflector};
use crate::{DynamicMessage, DynamicMessageBuilder, Message, MessageBuilder, ReflectError, Value};

struct Fixture {
    pool: DescriptorPool,
    all_types: MessageDescriptor,
}

impl Fixture {
    fn new() -> Self {
        let pool = unittest::pool();
        let all_types = unittest::message(&pool, "TestAllTypes");
        Self { pool, all_types }
    }

    fn field(&self, name: &str) -> FieldDescriptor {
        self.all_types.find_field(name).unwrap()
    }

    fn enum_value(&self, enum_name: &str, value: &str) -> Value {
        let value = self.pool.find_enum(enum_name).unwrap().find_value(value).unwrap();
        Value::EnumValue(value)
    }

    fn filled(&self) -> DynamicMessageBuilder {
        let mut builder = DynamicMessageBuilder::new(self.all_types.clone());
        Reflector::plain().set_all_fields(&mut builder).unwrap();
        builder
    }
}

#[test]
fn set_all_fields_round_trips() {
    let fx = Fixture::new();
    let reflector = Reflector::plain();
    let message = fx.filled().build();

    assert!(reflector.verify_all_fields_set(&message).unwrap().is_empty());

    let fields = message.fields();
    assert_eq!(*fields.get(&fx.field("optional_int32")).unwrap(), Value::I32(101));
    assert_eq!(*fields.get(&fx.field("optional_uint64")).unwrap(), Value::U64(104));
    assert_eq!(*fields.get(&fx.field("optional_double")).unwrap(), Value::F64(112.0));
    assert_eq!(*fields.get(&fx.field("optional_bytes")).unwrap(), Value::Bytes(b"115".to_vec()));
    assert_eq!(*fields.get(&fx.field("default_sint32")).unwrap(), Value::I32(165));
    assert_eq!(
        *fields.get(&fx.field("optional_nested_enum")).unwrap(),
        fx.enum_value("protobuf_unittest.TestAllTypes.NestedEnum", "BAZ")
    );

    let repeated = fx.field("repeated_string");
    assert_eq!(fields.count(&repeated).unwrap(), 2);
    assert_eq!(*fields.get_at(&repeated, 0).unwrap(), Value::String("244".into()));
    assert_eq!(*fields.get_at(&repeated, 1).unwrap(), Value::String("344".into()));

    let enums = fx.field("repeated_import_enum");
    assert_eq!(
        *fields.get_at(&enums, 0).unwrap(),
        fx.enum_value("protobuf_unittest_import.ImportEnum", "IMPORT_BAR")
    );

    // Sub-messages are keyed by the parent field's number.
    let nested = fields.get(&fx.field("optional_nested_message")).unwrap();
    let nested = nested.as_message().unwrap();
    assert_eq!(*nested.get_field_by_name("bb").unwrap(), Value::I32(118));
    let group = fields.get(&fx.field("optionalgroup")).unwrap();
    assert_eq!(*group.as_message().unwrap().get_field_by_name("a").unwrap(), Value::I32(116));
    let element = fields.get_at(&fx.field("repeated_foreign_message"), 1).unwrap();
    assert_eq!(*element.as_message().unwrap().get_field_by_name("c").unwrap(), Value::I32(349));
}

#[test]
fn clear_all_fields_restores_defaults() {
    let fx = Fixture::new();
    let reflector = Reflector::plain();
    let mut builder = fx.filled();
    reflector.clear_all_fields(&mut builder).unwrap();
    let message = builder.build();

    assert!(reflector.verify_cleared(&message).unwrap().is_empty());
    assert_eq!(message.all_fields().count(), 0);

    let fields = message.fields();
    assert_eq!(*fields.get(&fx.field("default_int32")).unwrap(), Value::I32(41));
    assert_eq!(*fields.get(&fx.field("default_sfixed64")).unwrap(), Value::I64(-50));
    assert_eq!(*fields.get(&fx.field("default_double")).unwrap(), Value::F64(52e3));
    assert_eq!(*fields.get(&fx.field("default_cord")).unwrap(), Value::String("123".into()));
    assert_eq!(*fields.get(&fx.field("optional_string")).unwrap(), Value::String("".into()));
    assert_eq!(
        *fields.get(&fx.field("default_foreign_enum")).unwrap(),
        fx.enum_value("protobuf_unittest.ForeignEnum", "FOREIGN_BAR")
    );
    assert_eq!(
        *fields.get(&fx.field("optional_nested_enum")).unwrap(),
        fx.enum_value("protobuf_unittest.TestAllTypes.NestedEnum", "FOO")
    );

    // An unset sub-message reads as an empty instance.
    let nested = fields.get(&fx.field("optional_nested_message")).unwrap();
    let nested = nested.as_message().unwrap();
    assert_eq!(nested.descriptor().name(), "NestedMessage");
    assert!(!nested.has_field_by_name("bb").unwrap());
    assert_eq!(*nested.get_field_by_name("bb").unwrap(), Value::I32(0));
}

#[test]
fn fresh_messages_read_as_cleared() {
    let fx = Fixture::new();
    let message = DynamicMessage::default_instance(fx.all_types.clone());
    assert!(Reflector::plain().verify_cleared(&message).unwrap().is_empty());
}

#[test]
fn modify_repeated_fields() {
    let fx = Fixture::new();
    let reflector = Reflector::plain();
    let mut builder = fx.filled();
    reflector.modify_repeated_fields(&mut builder, 1).unwrap();
    let message = builder.build();

    assert!(reflector.verify_repeated_modified(&message, 1).unwrap().is_empty());
    assert_eq!(
        *message.fields().get_at(&fx.field("repeated_int64"), 1).unwrap(),
        Value::I64(532)
    );

    // Exactly the second element of every repeated field changed.
    let mismatches = reflector.verify_all_fields_set(&message).unwrap();
    assert_eq!(mismatches.len(), REPEATED_COUNT);
    assert!(mismatches.iter().all(|m| m.index == Some(1)));

    // Both elements differ, except the first bool which stays `true`.
    let mismatches = reflector.verify_repeated_modified(&message, 0).unwrap();
    assert_eq!(mismatches.len(), 2 * REPEATED_COUNT - 1);
}

#[test]
fn setters_reject_none() {
    let fx = Fixture::new();
    let reflector = Reflector::plain();

    let mut empty = DynamicMessageBuilder::new(fx.all_types.clone());
    assert!(reflector.verify_setters_reject_none(&mut empty).unwrap().is_empty());
    assert!(reflector.verify_repeated_setters_reject_none(&mut empty).unwrap().is_empty());
    assert_eq!(empty.build().all_fields().count(), 0);

    let mut filled = fx.filled();
    assert!(reflector.verify_setters_reject_none(&mut filled).unwrap().is_empty());
    assert!(reflector.verify_repeated_setters_reject_none(&mut filled).unwrap().is_empty());
    assert!(reflector.verify_all_fields_set(&filled.build()).unwrap().is_empty());
}

#[test]
fn none_is_an_invalid_argument() {
    let fx = Fixture::new();
    let mut builder = fx.filled();
    let field = fx.field("optional_nested_message");
    let before = builder.clone();

    let error = builder.fields_mut().set(&field, None::<DynamicMessage>).unwrap_err();
    assert_eq!(
        error,
        ReflectError::InvalidArgument {
            field: "protobuf_unittest.TestAllTypes.optional_nested_message".into(),
        }
    );
    assert_eq!(builder, before);
}

#[test]
fn cardinality_misuse() {
    let fx = Fixture::new();
    let mut builder = fx.filled();
    let repeated = fx.field("repeated_int32");
    let singular = fx.field("optional_int32");

    let is_invalid = |r: Result<(), ReflectError>| matches!(r, Err(ReflectError::InvalidOperation { .. }));
    let fields = builder.fields();
    assert!(is_invalid(fields.get(&repeated).map(drop)));
    assert!(is_invalid(fields.has(&repeated).map(drop)));
    assert!(is_invalid(fields.get_at(&singular, 0).map(drop)));
    assert!(is_invalid(fields.count(&singular).map(drop)));

    let mut fields = builder.fields_mut();
    assert!(is_invalid(fields.set(&repeated, 1)));
    assert!(is_invalid(fields.set_at(&singular, 0, 1)));
    assert!(is_invalid(fields.add(&singular, 1)));
    assert_eq!(
        fields.set(&repeated, 1).unwrap_err().to_string(),
        "cannot set without index on repeated field `protobuf_unittest.TestAllTypes.repeated_int32`"
    );
}

#[test]
fn indices_are_checked() {
    let fx = Fixture::new();
    let mut builder = fx.filled();
    let field = fx.field("repeated_nested_enum");
    let foo = fx.enum_value("protobuf_unittest.TestAllTypes.NestedEnum", "FOO");

    assert_eq!(
        builder.fields_mut().set_at(&field, 2, foo.clone()).unwrap_err(),
        ReflectError::IndexOutOfRange {
            field: field.full_name().into(),
            index: 2,
            len: 2,
        }
    );
    assert!(matches!(
        builder.fields().get_at(&field, 7),
        Err(ReflectError::IndexOutOfRange { index: 7, len: 2, .. })
    ));

    builder.fields_mut().set_at(&field, 0, foo.clone()).unwrap();
    assert_eq!(*builder.fields().get_at(&field, 0).unwrap(), foo);
}

#[test]
fn values_are_strictly_typed() {
    let fx = Fixture::new();
    let mut builder = DynamicMessageBuilder::new(fx.all_types.clone());
    let mut fields = builder.fields_mut();

    let nested_enum = fx.field("optional_nested_enum");
    let foreign = fx.enum_value("protobuf_unittest.ForeignEnum", "FOREIGN_FOO");
    assert_eq!(
        fields.set(&nested_enum, foreign).unwrap_err().to_string(),
        "field `protobuf_unittest.TestAllTypes.optional_nested_enum` expects a value of enum \
         `protobuf_unittest.TestAllTypes.NestedEnum`, found `protobuf_unittest.ForeignEnum.FOREIGN_FOO`"
    );

    let nested_message = fx.field("optional_nested_message");
    let foreign = DynamicMessage::default_instance(unittest::message(&fx.pool, "ForeignMessage"));
    assert!(matches!(
        fields.set(&nested_message, foreign),
        Err(ReflectError::TypeMismatch { .. })
    ));

    for (name, value) in [
        ("optional_int32", Value::U32(1)),
        ("optional_uint32", Value::I32(1)),
        ("optional_sint64", Value::I32(1)),
        ("optional_float", Value::F64(1.0)),
        ("optional_bytes", Value::String("x".into())),
        ("repeated_bool", Value::I32(1)),
    ] {
        let field = fx.field(name);
        let result = if field.is_repeated() {
            fields.add(&field, value)
        } else {
            fields.set(&field, value)
        };
        assert!(matches!(result, Err(ReflectError::TypeMismatch { .. })), "{name}");
    }

    // Non-finite floats are ordinary values.
    fields.set(&fx.field("optional_float"), f32::INFINITY).unwrap();
    fields.set(&fx.field("optional_double"), f64::NEG_INFINITY).unwrap();
    drop(fields);
    assert_eq!(builder.build().all_fields().count(), 2);
}

#[test]
fn foreign_fields_are_not_found() {
    let fx = Fixture::new();
    let foreign = unittest::message(&fx.pool, "ForeignMessage").find_field("c").unwrap();
    let mut builder = DynamicMessageBuilder::new(fx.all_types.clone());

    assert_eq!(
        builder.fields_mut().set(&foreign, 1).unwrap_err(),
        ReflectError::NotFound {
            message: "protobuf_unittest.TestAllTypes".into(),
            name: "protobuf_unittest.ForeignMessage.c".into(),
        }
    );
    assert!(matches!(builder.fields().has(&foreign), Err(ReflectError::NotFound { .. })));

    // A different pool holding the same schema is a different schema.
    let other = unittest::pool();
    let twin = unittest::message(&other, "TestAllTypes").find_field("optional_int32").unwrap();
    assert!(matches!(builder.fields().get(&twin), Err(ReflectError::NotFound { .. })));
}

#[test]
fn presence_follows_writes() {
    let fx = Fixture::new();
    let mut builder = DynamicMessageBuilder::new(fx.all_types.clone());
    let field = fx.field("default_string");

    assert!(!builder.fields().has(&field).unwrap());
    builder.fields_mut().set(&field, "hello").unwrap();
    assert!(builder.fields().has(&field).unwrap());
    builder.fields_mut().clear(&field).unwrap();
    assert!(!builder.fields().has(&field).unwrap());

    // An empty byte string is a value, not the unset state.
    for name in ["optional_bytes", "default_bytes"] {
        let field = fx.field(name);
        let unset = builder.fields().get(&field).unwrap().into_owned();
        builder.fields_mut().set(&field, Vec::<u8>::new()).unwrap();
        assert!(builder.fields().has(&field).unwrap());
        assert_eq!(*builder.fields().get(&field).unwrap(), Value::Bytes(Vec::new()));
        let built = builder.clone().build();
        assert!(built.fields().has(&field).unwrap());
        assert_eq!(*built.fields().get(&field).unwrap(), Value::Bytes(Vec::new()));
        builder.fields_mut().clear(&field).unwrap();
        assert!(!builder.fields().has(&field).unwrap());
        assert_eq!(*builder.fields().get(&field).unwrap(), unset);
    }
    assert_eq!(
        *builder.fields().get(&fx.field("default_bytes")).unwrap(),
        Value::Bytes(b"world".to_vec())
    );

    let repeated = fx.field("repeatedgroup");
    let element = builder.fields().new_builder_for(&repeated).unwrap();
    assert_eq!(element.descriptor().full_name(), "protobuf_unittest.TestAllTypes.RepeatedGroup");
    builder.fields_mut().add(&repeated, element).unwrap();
    assert_eq!(builder.fields().count(&repeated).unwrap(), 1);
    builder.fields_mut().clear(&repeated).unwrap();
    assert_eq!(builder.fields().count(&repeated).unwrap(), 0);
}

#[test]
fn sub_builders_need_message_fields() {
    let fx = Fixture::new();
    let builder = DynamicMessageBuilder::new(fx.all_types.clone());
    let reflector = Reflector::plain();

    let sub = reflector.new_builder_for(&builder, &fx.field("optional_import_message")).unwrap();
    assert_eq!(sub.descriptor().full_name(), "protobuf_unittest_import.ImportMessage");
    assert!(matches!(
        reflector.new_builder_for(&builder, &fx.field("optional_int32")),
        Err(ReflectError::InvalidOperation { .. })
    ));
}

#[test]
fn required_fields() {
    let fx = Fixture::new();
    let required = unittest::message(&fx.pool, "TestRequired");
    let foreign = unittest::message(&fx.pool, "TestRequiredForeign");

    let mut inner = DynamicMessageBuilder::new(required.clone());
    inner.set_field_by_name("a", 1).unwrap();
    assert!(!inner.clone().build().is_initialized());
    assert!(required.find_field("a").unwrap().is_required());

    let mut outer = DynamicMessageBuilder::new(foreign);
    assert!(outer.clone().build().is_initialized());
    outer.set_field_by_name("optional_message", inner.clone()).unwrap();
    assert!(!outer.clone().build().is_initialized());

    inner.set_field_by_name("b", 2).unwrap();
    outer.set_field_by_name("optional_message", inner.clone()).unwrap();
    outer.add_field_by_name("repeated_message", inner).unwrap();
    assert!(outer.clone().build().is_initialized());

    outer.add_field_by_name("repeated_message", DynamicMessageBuilder::new(required)).unwrap();
    assert!(!outer.build().is_initialized());
}

#[test]
fn packed_fields() {
    let fx = Fixture::new();
    let packed = unittest::message(&fx.pool, "TestPackedTypes");
    assert!(packed.fields().all(|f| f.is_packed()));

    let reflector = Reflector::plain();
    let mut builder = DynamicMessageBuilder::new(packed.clone());
    reflector.set_all_fields(&mut builder).unwrap();
    let message = builder.build();
    assert!(reflector.verify_all_fields_set(&message).unwrap().is_empty());

    let field = packed.find_field("packed_float").unwrap();
    assert_eq!(*message.fields().get_at(&field, 1).unwrap(), Value::F32(400.0));
}

#[test]
fn fields_by_name() {
    let fx = Fixture::new();
    let reflector = Reflector::plain();

    assert_eq!(reflector.field(&fx.all_types, "optional_cord").unwrap().number(), 25);
    assert_eq!(
        reflector.field(&fx.all_types, "optional_int32_extension").unwrap_err(),
        ReflectError::NotFound {
            message: "protobuf_unittest.TestAllTypes".into(),
            name: "optional_int32_extension".into(),
        }
    );

    let names: Vec<_> = reflector
        .fields_of(&fx.all_types)
        .iter()
        .take(3)
        .map(|f| f.name().to_string())
        .collect();
    assert_eq!(names, ["optional_int32", "optional_int64", "optional_uint32"]);
}

#[test]
fn copies_and_merges() {
    let fx = Fixture::new();
    let reflector = Reflector::plain();
    let message = fx.filled().build();

    let copy = message.to_builder().build();
    assert_eq!(copy, message);

    let mut merged = DynamicMessageBuilder::new(fx.all_types.clone());
    merged.set_field_by_name("optional_int32", 7).unwrap();
    merged.merge_from(&message).unwrap();
    merged.merge_from(&message).unwrap();
    let merged = merged.build();

    // Singular fields are overwritten, repeated fields appended.
    assert_eq!(*merged.get_field_by_name("optional_int32").unwrap(), Value::I32(101));
    assert_eq!(merged.fields().count(&fx.field("repeated_cord")).unwrap(), 4);
    let mismatches = reflector.verify_all_fields_set(&merged).unwrap();
    assert_eq!(mismatches.len(), REPEATED_COUNT);

    let other = DynamicMessage::default_instance(unittest::message(&fx.pool, "ForeignMessage"));
    let mut builder = message.to_builder();
    assert!(matches!(builder.merge_from(&other), Err(ReflectError::TypeMismatch { .. })));
    assert_eq!(builder.build(), message);
}

#[test]
fn custom_value_sources() {
    struct OnlyStrings;

    impl crate::driver::ValueSource for OnlyStrings {
        fn sample(&self, field: &FieldDescriptor, key: u32, pass: Pass) -> Option<Value> {
            let text = alloc::format!("{}:{key}:{pass:?}", field.name());
            (field.kind() == vc_descriptor::FieldKind::String).then(|| Value::String(text))
        }
    }

    let fx = Fixture::new();
    let reflector = Reflector::plain().with_source(OnlyStrings);
    let mut builder = DynamicMessageBuilder::new(fx.all_types.clone());
    reflector.set_all_fields(&mut builder).unwrap();
    let message = builder.build();

    assert!(reflector.verify_all_fields_set(&message).unwrap().is_empty());
    assert_eq!(
        *message.get_field_by_name("optional_string").unwrap(),
        Value::String("optional_string:14:Singular".into())
    );
    // Sub-messages are still built, even with nothing to fill.
    assert!(message.has_field_by_name("optional_foreign_message").unwrap());
    assert!(!message.has_field_by_name("optional_int32").unwrap());
    // Skipped repeated fields stay empty and are verified as such.
    assert_eq!(message.fields().count(&fx.field("repeated_int32")).unwrap(), 0);
    assert_eq!(message.fields().count(&fx.field("repeated_string")).unwrap(), 2);

    let mut builder = message.to_builder();
    reflector.modify_repeated_fields(&mut builder, 1).unwrap();
    let modified = builder.build();
    assert!(reflector.verify_repeated_modified(&modified, 1).unwrap().is_empty());
    assert_eq!(
        *modified.fields().get_at(&fx.field("repeated_string"), 1).unwrap(),
        Value::String("repeated_string:44:Modified".into())
    );
}
