use vc_descriptor::MessageDescriptor;

use crate::{DynamicMessage, ExtensionRegistry, FieldSet, Fields, FieldsMut, ReflectError};

// -----------------------------------------------------------------------------
// Message

/// An immutable message.
///
/// Implementors only provide [`field_set`](Message::field_set); every
/// reflective operation is derived from it. Hand-written message types and
/// [`DynamicMessage`] therefore behave identically under reflection.
pub trait Message {
    fn field_set(&self) -> &FieldSet;

    #[inline]
    fn descriptor(&self) -> &MessageDescriptor {
        self.field_set().descriptor()
    }

    /// Reads the message's own fields.
    #[inline]
    fn fields(&self) -> Fields<'_, 'static> {
        self.field_set().fields()
    }

    /// Reads extension fields known to `registry`.
    #[inline]
    fn extensions<'r>(&self, registry: &'r ExtensionRegistry) -> Fields<'_, 'r> {
        self.field_set().extensions(registry)
    }

    /// Copies the content into a [`DynamicMessage`].
    fn to_dynamic(&self) -> DynamicMessage {
        DynamicMessage::from_field_set(self.field_set().clone())
    }
}

// -----------------------------------------------------------------------------
// MessageBuilder

/// The mutable counterpart of a [`Message`].
///
/// A builder owns its fields until [`build`](MessageBuilder::build) moves
/// them into the message, which consumes the builder.
pub trait MessageBuilder {
    type Message: Message;

    fn field_set(&self) -> &FieldSet;

    fn field_set_mut(&mut self) -> &mut FieldSet;

    #[inline]
    fn descriptor(&self) -> &MessageDescriptor {
        self.field_set().descriptor()
    }

    #[inline]
    fn fields(&self) -> Fields<'_, 'static> {
        self.field_set().fields()
    }

    #[inline]
    fn fields_mut(&mut self) -> FieldsMut<'_, 'static> {
        self.field_set_mut().fields_mut()
    }

    #[inline]
    fn extensions<'r>(&self, registry: &'r ExtensionRegistry) -> Fields<'_, 'r> {
        self.field_set().extensions(registry)
    }

    #[inline]
    fn extensions_mut<'r>(&mut self, registry: &'r ExtensionRegistry) -> FieldsMut<'_, 'r> {
        self.field_set_mut().extensions_mut(registry)
    }

    /// Unsets every field, extensions included.
    fn clear(&mut self) {
        self.field_set_mut().clear();
    }

    /// Merges a message of the same type into this builder.
    ///
    /// See [`FieldSet::merge_from`].
    fn merge_from<M: Message + ?Sized>(&mut self, other: &M) -> Result<(), ReflectError>
    where
        Self: Sized,
    {
        self.field_set_mut().merge_from(other.field_set())
    }

    /// Freezes the accumulated fields.
    fn build(self) -> Self::Message
    where
        Self: Sized;
}
