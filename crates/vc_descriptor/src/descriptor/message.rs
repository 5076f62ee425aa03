use core::fmt;
use core::ops::Range;

use super::impl_handle;
use crate::pool::MessageInner;
use crate::{DescriptorError, DescriptorPool, EnumDescriptor, FieldDescriptor, FileDescriptor};

/// A message type.
///
/// # Examples
///
/// ```
/// use vc_descriptor::{DescriptorPool, FieldKind, FieldProto, FileProto, MessageProto};
///
/// let pool = DescriptorPool::from_files([FileProto::new("a.proto").with_message(
///     MessageProto::new("Pair")
///         .with_field(FieldProto::optional("left", 1, FieldKind::String))
///         .with_field(FieldProto::optional("right", 7, FieldKind::String)),
/// )])
/// .unwrap();
///
/// let pair = pool.find_message("Pair").unwrap();
/// assert_eq!(pair.field_count(), 2);
/// assert_eq!(pair.field_by_number(7).unwrap().name(), "right");
/// assert_eq!(pair.field(1).unwrap().number(), 7);
/// ```
#[derive(Clone)]
pub struct MessageDescriptor {
    pool: DescriptorPool,
    pub(crate) index: u32,
}

impl_handle!(MessageDescriptor, messages, MessageInner);

impl MessageDescriptor {
    /// Returns the short name, e.g. `"NestedMessage"`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Returns the fully qualified name, e.g. `"unittest.TestAllTypes.NestedMessage"`.
    #[inline]
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    #[inline]
    pub fn file(&self) -> FileDescriptor {
        FileDescriptor::new(self.pool.clone(), self.inner().file)
    }

    /// Returns the enclosing message for nested types.
    pub fn containing_type(&self) -> Option<MessageDescriptor> {
        let parent = self.inner().parent?;
        Some(MessageDescriptor::new(self.pool.clone(), parent))
    }

    /// Returns the number of plain (non-extension) fields.
    #[inline]
    pub fn field_count(&self) -> usize {
        self.inner().fields.len()
    }

    /// Returns the plain fields in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner()
            .fields
            .iter()
            .map(|index| FieldDescriptor::new(self.pool.clone(), *index))
    }

    /// Returns the field at `index` in declaration order.
    pub fn field(&self, index: usize) -> Option<FieldDescriptor> {
        let field = *self.inner().fields.get(index)?;
        Some(FieldDescriptor::new(self.pool.clone(), field))
    }

    pub fn field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        let field = *self.inner().field_names.get(name)?;
        Some(FieldDescriptor::new(self.pool.clone(), field))
    }

    pub fn field_by_number(&self, number: u32) -> Option<FieldDescriptor> {
        let field = *self.inner().field_numbers.get(&number)?;
        Some(FieldDescriptor::new(self.pool.clone(), field))
    }

    /// Like [`field_by_name`](Self::field_by_name), failing with [`DescriptorError::NotFound`].
    pub fn find_field(&self, name: &str) -> Result<FieldDescriptor, DescriptorError> {
        self.field_by_name(name).ok_or_else(|| {
            DescriptorError::not_found("field", alloc::format!("{}.{name}", self.full_name()))
        })
    }

    pub fn nested_messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        self.inner()
            .nested_messages
            .iter()
            .map(|index| MessageDescriptor::new(self.pool.clone(), *index))
    }

    pub fn nested_enums(&self) -> impl ExactSizeIterator<Item = EnumDescriptor> + '_ {
        self.inner()
            .nested_enums
            .iter()
            .map(|index| EnumDescriptor::new(self.pool.clone(), *index))
    }

    /// Returns a nested message by short name.
    pub fn nested_message(&self, name: &str) -> Option<MessageDescriptor> {
        self.nested_messages().find(|m| m.name() == name)
    }

    /// Returns a nested enum by short name.
    pub fn nested_enum(&self, name: &str) -> Option<EnumDescriptor> {
        self.nested_enums().find(|e| e.name() == name)
    }

    /// Returns the extensions declared inside this message's scope.
    ///
    /// These usually extend some other message; see
    /// [`DescriptorPool::extensions_of`] for the extensions *of* this message.
    pub fn scoped_extensions(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner()
            .extensions
            .iter()
            .map(|index| FieldDescriptor::new(self.pool.clone(), *index))
    }

    /// Returns the declared extension ranges (end exclusive).
    #[inline]
    pub fn extension_ranges(&self) -> &[Range<u32>] {
        &self.inner().extension_ranges
    }

    /// Returns `true` if `number` falls into an extension range.
    pub fn is_extension_number(&self, number: u32) -> bool {
        self.extension_ranges().iter().any(|r| r.contains(&number))
    }

    /// Returns `true` if this message accepts any extension.
    #[inline]
    pub fn is_extendable(&self) -> bool {
        !self.extension_ranges().is_empty()
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

impl fmt::Display for MessageDescriptor {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.full_name())
    }
}
