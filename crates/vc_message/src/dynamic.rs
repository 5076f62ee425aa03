use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use vc_descriptor::{FieldDescriptor, MessageDescriptor};

use crate::{FieldSet, FieldValue, IntoValue, Message, MessageBuilder, ReflectError, Value};

// -----------------------------------------------------------------------------
// DynamicMessage

/// A message of any type, described entirely by its descriptor.
///
/// Cloning is cheap, clones share the same immutable fields.
///
/// # Examples
///
/// ```
/// use vc_descriptor::{DescriptorPool, FieldKind, FieldProto, FileProto, MessageProto};
/// use vc_message::{DynamicMessage, Message, MessageBuilder, Value};
///
/// let pool = DescriptorPool::from_files([FileProto::new("p.proto").with_message(
///     MessageProto::new("Point")
///         .with_field(FieldProto::optional("x", 1, FieldKind::Double))
///         .with_field(FieldProto::optional("y", 2, FieldKind::Double)),
/// )])
/// .unwrap();
/// let point = pool.find_message("Point").unwrap();
///
/// let mut builder = DynamicMessage::default_instance(point.clone()).new_builder();
/// builder.set_field_by_name("x", 1.5).unwrap();
/// let message = builder.build();
///
/// assert_eq!(*message.get_field_by_name("x").unwrap(), Value::F64(1.5));
/// assert!(!message.has_field_by_name("y").unwrap());
/// assert_eq!(format!("{message:?}"), "Point { x: 1.5 }");
/// ```
#[derive(Clone)]
pub struct DynamicMessage {
    fields: Arc<FieldSet>,
}

impl DynamicMessage {
    /// Returns a message of type `descriptor` with every field unset.
    ///
    /// Each call allocates a fresh, empty instance.
    #[inline]
    pub fn default_instance(descriptor: MessageDescriptor) -> Self {
        Self::from_field_set(FieldSet::new(descriptor))
    }

    #[inline]
    pub(crate) fn from_field_set(fields: FieldSet) -> Self {
        Self {
            fields: Arc::new(fields),
        }
    }

    /// Returns an empty builder of the same type.
    #[inline]
    pub fn new_builder(&self) -> DynamicMessageBuilder {
        DynamicMessageBuilder::new(self.fields.descriptor().clone())
    }

    /// Returns a builder holding a copy of this message's fields.
    #[inline]
    pub fn to_builder(&self) -> DynamicMessageBuilder {
        DynamicMessageBuilder {
            fields: FieldSet::clone(&self.fields),
        }
    }

    /// See [`FieldSet::is_initialized`].
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.fields.is_initialized()
    }

    /// Iterates the present fields, plain fields first.
    #[inline]
    pub fn all_fields(&self) -> impl Iterator<Item = (FieldDescriptor, FieldValue<'_>)> + '_ {
        self.fields.iter()
    }

    pub fn get_field_by_name(&self, name: &str) -> Result<Cow<'_, Value>, ReflectError> {
        let field = field_by_name(self.descriptor(), name)?;
        self.fields().get(&field)
    }

    pub fn has_field_by_name(&self, name: &str) -> Result<bool, ReflectError> {
        let field = field_by_name(self.descriptor(), name)?;
        self.fields().has(&field)
    }
}

impl Message for DynamicMessage {
    #[inline]
    fn field_set(&self) -> &FieldSet {
        &self.fields
    }

    #[inline]
    fn to_dynamic(&self) -> DynamicMessage {
        self.clone()
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields) || self.fields == other.fields
    }
}

impl fmt::Debug for DynamicMessage {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.fields, f)
    }
}

fn field_by_name(message: &MessageDescriptor, name: &str) -> Result<FieldDescriptor, ReflectError> {
    message
        .field_by_name(name)
        .ok_or_else(|| ReflectError::not_found(message.full_name(), name))
}

// -----------------------------------------------------------------------------
// DynamicMessageBuilder

/// Builder of a [`DynamicMessage`].
#[derive(Clone, PartialEq)]
pub struct DynamicMessageBuilder {
    fields: FieldSet,
}

impl DynamicMessageBuilder {
    /// Creates a builder of type `descriptor` with every field unset.
    #[inline]
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self {
            fields: FieldSet::new(descriptor),
        }
    }

    pub fn get_field_by_name(&self, name: &str) -> Result<Cow<'_, Value>, ReflectError> {
        let field = field_by_name(self.descriptor(), name)?;
        self.fields.fields().get(&field)
    }

    pub fn set_field_by_name(&mut self, name: &str, value: impl IntoValue) -> Result<(), ReflectError> {
        let field = field_by_name(self.descriptor(), name)?;
        self.fields_mut().set(&field, value)
    }

    pub fn add_field_by_name(&mut self, name: &str, value: impl IntoValue) -> Result<(), ReflectError> {
        let field = field_by_name(self.descriptor(), name)?;
        self.fields_mut().add(&field, value)
    }

    pub fn clear_field_by_name(&mut self, name: &str) -> Result<(), ReflectError> {
        let field = field_by_name(self.descriptor(), name)?;
        self.fields_mut().clear(&field)
    }
}

impl MessageBuilder for DynamicMessageBuilder {
    type Message = DynamicMessage;

    #[inline]
    fn field_set(&self) -> &FieldSet {
        &self.fields
    }

    #[inline]
    fn field_set_mut(&mut self) -> &mut FieldSet {
        &mut self.fields
    }

    #[inline]
    fn build(self) -> DynamicMessage {
        DynamicMessage::from_field_set(self.fields)
    }
}

impl fmt::Debug for DynamicMessageBuilder {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.fields, f)
    }
}
