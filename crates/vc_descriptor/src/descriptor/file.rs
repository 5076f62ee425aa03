use core::fmt;

use super::impl_handle;
use crate::pool::FileInner;
use crate::{DescriptorPool, EnumDescriptor, FieldDescriptor, MessageDescriptor};

/// A linked schema file.
#[derive(Clone)]
pub struct FileDescriptor {
    pool: DescriptorPool,
    index: u32,
}

impl_handle!(FileDescriptor, files, FileInner);

impl FileDescriptor {
    /// Returns the file name, e.g. `"google/protobuf/unittest.proto"`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Returns the package, or `""` if none was declared.
    #[inline]
    pub fn package(&self) -> &str {
        &self.inner().package
    }

    /// Returns the direct imports of this file.
    pub fn dependencies(&self) -> impl ExactSizeIterator<Item = FileDescriptor> + '_ {
        self.inner()
            .dependencies
            .iter()
            .map(|index| FileDescriptor::new(self.pool.clone(), *index))
    }

    /// Returns the top-level messages in declaration order.
    pub fn messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        self.inner()
            .messages
            .iter()
            .map(|index| MessageDescriptor::new(self.pool.clone(), *index))
    }

    /// Returns the top-level enums in declaration order.
    pub fn enums(&self) -> impl ExactSizeIterator<Item = EnumDescriptor> + '_ {
        self.inner()
            .enums
            .iter()
            .map(|index| EnumDescriptor::new(self.pool.clone(), *index))
    }

    /// Returns the top-level extensions in declaration order.
    pub fn extensions(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner()
            .extensions
            .iter()
            .map(|index| FieldDescriptor::new(self.pool.clone(), *index))
    }

    /// Looks up a message by its name relative to this file's package.
    ///
    /// Nested messages are reached with dotted paths, e.g. `"Outer.Inner"`.
    pub fn message_by_name(&self, name: &str) -> Option<MessageDescriptor> {
        let message = self.pool.message_by_name(&self.qualify(name))?;
        (message.file() == *self).then_some(message)
    }

    pub fn enum_by_name(&self, name: &str) -> Option<EnumDescriptor> {
        let enum_type = self.pool.enum_by_name(&self.qualify(name))?;
        (enum_type.file() == *self).then_some(enum_type)
    }

    pub fn extension_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        let extension = self.pool.extension_by_name(&self.qualify(name))?;
        (extension.file() == *self).then_some(extension)
    }

    fn qualify(&self, name: &str) -> alloc::string::String {
        let package = self.package();
        if package.is_empty() {
            name.into()
        } else {
            alloc::format!("{package}.{name}")
        }
    }
}

impl fmt::Debug for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileDescriptor").field(&self.name()).finish()
    }
}
