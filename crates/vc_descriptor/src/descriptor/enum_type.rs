use core::fmt;

use super::impl_handle;
use crate::pool::{EnumInner, EnumValueInner};
use crate::{DescriptorError, DescriptorPool, FileDescriptor, MessageDescriptor};

// -----------------------------------------------------------------------------
// EnumDescriptor

/// An enum type. Enums always declare at least one value.
#[derive(Clone)]
pub struct EnumDescriptor {
    pool: DescriptorPool,
    index: u32,
}

impl_handle!(EnumDescriptor, enums, EnumInner);

impl EnumDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    #[inline]
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    #[inline]
    pub fn file(&self) -> FileDescriptor {
        FileDescriptor::new(self.pool.clone(), self.inner().file)
    }

    pub fn containing_type(&self) -> Option<MessageDescriptor> {
        let parent = self.inner().parent?;
        Some(MessageDescriptor::new(self.pool.clone(), parent))
    }

    /// Returns the values in declaration order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = EnumValueDescriptor> + '_ {
        self.inner()
            .values
            .iter()
            .map(|index| EnumValueDescriptor::new(self.pool.clone(), *index))
    }

    /// Returns the first declared value, the default of fields without one.
    pub fn default_value(&self) -> EnumValueDescriptor {
        // The linker rejects empty enums.
        EnumValueDescriptor::new(self.pool.clone(), self.inner().values[0])
    }

    pub fn value_by_name(&self, name: &str) -> Option<EnumValueDescriptor> {
        let index = *self.inner().value_names.get(name)?;
        Some(EnumValueDescriptor::new(self.pool.clone(), index))
    }

    /// Returns the first value with this number; aliases share numbers.
    pub fn value_by_number(&self, number: i32) -> Option<EnumValueDescriptor> {
        self.values().find(|value| value.number() == number)
    }

    /// Like [`value_by_name`](Self::value_by_name), failing with [`DescriptorError::NotFound`].
    pub fn find_value(&self, name: &str) -> Result<EnumValueDescriptor, DescriptorError> {
        self.value_by_name(name).ok_or_else(|| {
            DescriptorError::not_found("enum value", alloc::format!("{}.{name}", self.full_name()))
        })
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

// -----------------------------------------------------------------------------
// EnumValueDescriptor

/// One value of an enum type.
#[derive(Clone)]
pub struct EnumValueDescriptor {
    pool: DescriptorPool,
    index: u32,
}

impl_handle!(EnumValueDescriptor, enum_values, EnumValueInner);

impl EnumValueDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Returns the qualified name; values are scoped by their enum, e.g. `"pkg.Color.RED"`.
    #[inline]
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    #[inline]
    pub fn number(&self) -> i32 {
        self.inner().number
    }

    /// Returns the declaration position inside the enum.
    #[inline]
    pub fn index(&self) -> usize {
        self.inner().position as usize
    }

    #[inline]
    pub fn parent_enum(&self) -> EnumDescriptor {
        EnumDescriptor::new(self.pool.clone(), self.inner().parent)
    }
}

impl fmt::Debug for EnumValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

impl fmt::Display for EnumValueDescriptor {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
