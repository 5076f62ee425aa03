//! Bulk reflective operations over every field of a message.
//!
//! A [`Reflector`] addresses one field space, either a message's own fields
//! ([`Reflector::plain`]) or the extensions a registry knows for it
//! ([`Reflector::with_extensions`]). It fills, clears and modifies all of
//! them through the generic [`MessageBuilder`] protocol, and verifies the
//! results, so the same routine exercises any message type, hand-written or
//! dynamic.
//!
//! Sample values come from a [`ValueSource`]; the default [`NumberedValues`]
//! derives them from the field number and the [`Pass`].
//!
//! # Examples
//!
//! ```
//! use vc_descriptor::{DescriptorPool, FieldKind, FieldProto, FileProto, MessageProto};
//! use vc_message::driver::Reflector;
//! use vc_message::{DynamicMessageBuilder, MessageBuilder};
//!
//! let pool = DescriptorPool::from_files([FileProto::new("r.proto").with_message(
//!     MessageProto::new("Row")
//!         .with_field(FieldProto::optional("id", 1, FieldKind::Int64))
//!         .with_field(FieldProto::repeated("cells", 2, FieldKind::String)),
//! )])
//! .unwrap();
//! let reflector = Reflector::plain();
//!
//! let mut builder = DynamicMessageBuilder::new(pool.find_message("Row").unwrap());
//! reflector.set_all_fields(&mut builder).unwrap();
//! assert_eq!(format!("{builder:?}"), r#"Row { id: 101, cells: ["202", "302"] }"#);
//!
//! let message = builder.build();
//! assert!(reflector.verify_all_fields_set(&message).unwrap().is_empty());
//! ```

use alloc::vec::Vec;

use vc_descriptor::{FieldDescriptor, MessageDescriptor};

use crate::{
    Access, DynamicMessageBuilder, ExtensionRegistry, Fields, FieldsMut, MessageBuilder, ReflectError, Value,
};

mod values;
mod verify;

pub use values::{NumberedValues, Pass, ValueSource};
pub use verify::Mismatch;

// -----------------------------------------------------------------------------
// Reflector

/// Drives reflective operations over one field space.
#[derive(Debug, Clone)]
pub struct Reflector<'r, S = NumberedValues> {
    access: Access<'r>,
    source: S,
}

impl Reflector<'static> {
    /// Addresses a message's own fields.
    #[inline]
    pub const fn plain() -> Self {
        Self {
            access: Access::Plain,
            source: NumberedValues,
        }
    }
}

impl<'r> Reflector<'r> {
    /// Addresses the extensions `registry` knows for a message.
    #[inline]
    pub const fn with_extensions(registry: &'r ExtensionRegistry) -> Self {
        Self {
            access: Access::Extensions(registry),
            source: NumberedValues,
        }
    }
}

impl<'r, S: ValueSource> Reflector<'r, S> {
    /// Replaces the sample values.
    #[inline]
    pub fn with_source<T: ValueSource>(self, source: T) -> Reflector<'r, T> {
        Reflector {
            access: self.access,
            source,
        }
    }

    #[inline]
    pub fn access(&self) -> Access<'r> {
        self.access
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolves `name` to a field of `message`.
    ///
    /// With extensions, `name` is the extension's short or full name.
    pub fn field(&self, message: &MessageDescriptor, name: &str) -> Result<FieldDescriptor, ReflectError> {
        let found = match self.access {
            Access::Plain => message.field_by_name(name),
            Access::Extensions(registry) => registry
                .find_by_name(message, name)
                .map(|info| info.descriptor().clone()),
        };
        found.ok_or_else(|| ReflectError::not_found(message.full_name(), name))
    }

    /// Lists the fields of `message` in this field space.
    ///
    /// Plain fields come in declaration order, extensions by number.
    pub fn fields_of(&self, message: &MessageDescriptor) -> Vec<FieldDescriptor> {
        match self.access {
            Access::Plain => message.fields().collect(),
            Access::Extensions(registry) => registry
                .extensions_of(message)
                .map(|info| info.descriptor().clone())
                .collect(),
        }
    }

    /// Returns an empty builder for the message field `field` of `builder`.
    pub fn new_builder_for<B: MessageBuilder + ?Sized>(
        &self,
        builder: &B,
        field: &FieldDescriptor,
    ) -> Result<DynamicMessageBuilder, ReflectError> {
        builder.field_set().view(self.access).new_builder_for(field)
    }

    // -------------------------------------------------------------------------
    // Bulk mutation

    /// Sets every field: singular fields to their [`Pass::Singular`] sample,
    /// repeated fields to two elements, [`Pass::First`] then [`Pass::Second`].
    pub fn set_all_fields<B: MessageBuilder + ?Sized>(&self, builder: &mut B) -> Result<(), ReflectError> {
        let mut fields = builder.field_set_mut().view_mut(self.access);
        for field in self.fields_of(fields.descriptor()) {
            if field.is_repeated() {
                for pass in [Pass::First, Pass::Second] {
                    if let Some(value) = self.sample(fields.as_fields(), &field, pass)? {
                        fields.add(&field, value)?;
                    }
                }
            } else if let Some(value) = self.sample(fields.as_fields(), &field, Pass::Singular)? {
                fields.set(&field, value)?;
            }
        }
        Ok(())
    }

    /// Clears every field that is present.
    pub fn clear_all_fields<B: MessageBuilder + ?Sized>(&self, builder: &mut B) -> Result<(), ReflectError> {
        let mut fields = builder.field_set_mut().view_mut(self.access);
        for field in self.fields_of(fields.descriptor()) {
            if is_present(&fields, &field)? {
                fields.clear(&field)?;
            }
        }
        Ok(())
    }

    /// Replaces element `index` of every repeated field with its
    /// [`Pass::Modified`] sample.
    pub fn modify_repeated_fields<B: MessageBuilder + ?Sized>(
        &self,
        builder: &mut B,
        index: usize,
    ) -> Result<(), ReflectError> {
        let mut fields = builder.field_set_mut().view_mut(self.access);
        for field in self.fields_of(fields.descriptor()) {
            if !field.is_repeated() {
                continue;
            }
            if let Some(value) = self.sample(fields.as_fields(), &field, Pass::Modified)? {
                fields.set_at(&field, index, value)?;
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Samples

    /// Returns the value `field` receives in `pass`, if the source has one.
    ///
    /// A message field gets a sub-message whose singular fields hold the
    /// samples keyed by the parent field's number.
    fn sample(&self, fields: Fields<'_, '_>, field: &FieldDescriptor, pass: Pass) -> Result<Option<Value>, ReflectError> {
        if !field.kind().is_message() {
            return Ok(self.source.sample(field, field.number(), pass));
        }
        let mut builder = fields.new_builder_for(field)?;
        let message = builder.descriptor().clone();
        let mut inner = builder.fields_mut();
        for sub_field in message.fields() {
            if sub_field.is_repeated() || sub_field.kind().is_message() {
                continue;
            }
            if let Some(value) = self.source.sample(&sub_field, field.number(), pass) {
                inner.set(&sub_field, value)?;
            }
        }
        Ok(Some(Value::Message(builder.build())))
    }
}

fn is_present(fields: &FieldsMut<'_, '_>, field: &FieldDescriptor) -> Result<bool, ReflectError> {
    if field.is_repeated() {
        Ok(fields.count(field)? > 0)
    } else {
        fields.has(field)
    }
}
