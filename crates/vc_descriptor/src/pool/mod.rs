//! The shared, immutable storage behind every descriptor handle.

mod link;

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::hash::BuildHasher;
use core::ops::Range;

use foldhash::fast::{FixedState, FoldHasher};

use crate::default::RawDefault;
use crate::{Cardinality, DescriptorError, FieldKind, FileProto};
use crate::{EnumDescriptor, FieldDescriptor, FileDescriptor, MessageDescriptor};

// -----------------------------------------------------------------------------
// Hashing

const NAME_HASH_STATE: FixedState = FixedState::with_seed(0x5851_F42D_4C95_7F2D);

/// Seeded, deterministic hash state for name and number tables.
///
/// Shared with the crates built on top of the pool so every table hashes
/// alike.
#[derive(Copy, Clone, Default, Debug)]
pub struct NameHashState;

impl BuildHasher for NameHashState {
    type Hasher = FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NAME_HASH_STATE.build_hasher()
    }
}

pub(crate) type HashMap<K, V> = hashbrown::HashMap<K, V, NameHashState>;

// -----------------------------------------------------------------------------
// Inner tables

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Definition {
    Message(u32),
    Enum(u32),
    Extension(u32),
}

#[derive(Debug, Clone)]
pub(crate) struct FileInner {
    pub name: Box<str>,
    pub package: Box<str>,
    pub dependencies: Vec<u32>,
    pub messages: Vec<u32>,
    pub enums: Vec<u32>,
    pub extensions: Vec<u32>,
}

#[derive(Debug, Clone)]
pub(crate) struct MessageInner {
    pub name: Box<str>,
    pub full_name: Box<str>,
    pub file: u32,
    pub parent: Option<u32>,
    pub fields: Vec<u32>,
    pub field_names: HashMap<Box<str>, u32>,
    pub field_numbers: HashMap<u32, u32>,
    pub nested_messages: Vec<u32>,
    pub nested_enums: Vec<u32>,
    pub extensions: Vec<u32>,
    pub extension_ranges: Vec<Range<u32>>,
}

#[derive(Debug, Clone)]
pub(crate) struct FieldInner {
    pub name: Box<str>,
    pub full_name: Box<str>,
    pub number: u32,
    // Position among the plain fields of `containing`, or among the
    // extensions of the declaring scope.
    pub position: u32,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
    pub packed: bool,
    // Message index for message/group kinds, enum index for enum kinds.
    pub type_index: Option<u32>,
    pub default: Option<RawDefault>,
    // For extensions this is the extendee.
    pub containing: u32,
    pub extension_scope: Option<u32>,
    pub is_extension: bool,
    pub file: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct EnumInner {
    pub name: Box<str>,
    pub full_name: Box<str>,
    pub file: u32,
    pub parent: Option<u32>,
    pub values: Vec<u32>,
    pub value_names: HashMap<Box<str>, u32>,
}

#[derive(Debug, Clone)]
pub(crate) struct EnumValueInner {
    pub name: Box<str>,
    pub full_name: Box<str>,
    pub number: i32,
    pub parent: u32,
    pub position: u32,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PoolInner {
    pub files: Vec<FileInner>,
    pub messages: Vec<MessageInner>,
    pub fields: Vec<FieldInner>,
    pub enums: Vec<EnumInner>,
    pub enum_values: Vec<EnumValueInner>,
    pub names: HashMap<Box<str>, Definition>,
    pub file_names: HashMap<Box<str>, u32>,
    // (extendee, number) -> field
    pub extensions: HashMap<(u32, u32), u32>,
}

// -----------------------------------------------------------------------------
// DescriptorPool

/// A linked, immutable set of schema files.
///
/// Cloning is cheap: all clones share the same tables, and every descriptor
/// handle keeps its pool alive.
#[derive(Clone)]
pub struct DescriptorPool {
    pub(crate) inner: Arc<PoolInner>,
}

impl DescriptorPool {
    /// Starts an empty [`DescriptorPoolBuilder`].
    #[inline]
    pub fn builder() -> DescriptorPoolBuilder {
        DescriptorPoolBuilder::new()
    }

    /// Links `files` in the given order; each file's imports must precede it.
    pub fn from_files(files: impl IntoIterator<Item = FileProto>) -> Result<Self, DescriptorError> {
        let mut builder = DescriptorPoolBuilder::new();
        for file in files {
            builder.add_file(file)?;
        }
        Ok(builder.build())
    }

    /// Returns `true` if both handles share the same tables.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the linked files in link order.
    pub fn files(&self) -> impl ExactSizeIterator<Item = FileDescriptor> + '_ {
        (0..self.inner.files.len()).map(|index| FileDescriptor::new(self.clone(), index as u32))
    }

    pub fn file_by_name(&self, name: &str) -> Option<FileDescriptor> {
        let index = *self.inner.file_names.get(name)?;
        Some(FileDescriptor::new(self.clone(), index))
    }

    /// Returns the message with the given fully qualified name.
    pub fn message_by_name(&self, full_name: &str) -> Option<MessageDescriptor> {
        match self.inner.names.get(full_name)? {
            Definition::Message(index) => Some(MessageDescriptor::new(self.clone(), *index)),
            _ => None,
        }
    }

    /// Returns the enum with the given fully qualified name.
    pub fn enum_by_name(&self, full_name: &str) -> Option<EnumDescriptor> {
        match self.inner.names.get(full_name)? {
            Definition::Enum(index) => Some(EnumDescriptor::new(self.clone(), *index)),
            _ => None,
        }
    }

    /// Returns the extension with the given fully qualified name.
    pub fn extension_by_name(&self, full_name: &str) -> Option<FieldDescriptor> {
        match self.inner.names.get(full_name)? {
            Definition::Extension(index) => Some(FieldDescriptor::new(self.clone(), *index)),
            _ => None,
        }
    }

    /// Like [`message_by_name`](Self::message_by_name), failing with [`DescriptorError::NotFound`].
    pub fn find_message(&self, full_name: &str) -> Result<MessageDescriptor, DescriptorError> {
        self.message_by_name(full_name)
            .ok_or_else(|| DescriptorError::not_found("message", full_name))
    }

    /// Like [`enum_by_name`](Self::enum_by_name), failing with [`DescriptorError::NotFound`].
    pub fn find_enum(&self, full_name: &str) -> Result<EnumDescriptor, DescriptorError> {
        self.enum_by_name(full_name)
            .ok_or_else(|| DescriptorError::not_found("enum", full_name))
    }

    /// Like [`extension_by_name`](Self::extension_by_name), failing with [`DescriptorError::NotFound`].
    pub fn find_extension(&self, full_name: &str) -> Result<FieldDescriptor, DescriptorError> {
        self.extension_by_name(full_name)
            .ok_or_else(|| DescriptorError::not_found("extension", full_name))
    }

    /// Returns every extension declared for `extendee`, in any linked file.
    pub fn extensions_of(&self, extendee: &MessageDescriptor) -> Vec<FieldDescriptor> {
        if !self.ptr_eq(extendee.pool()) {
            return Vec::new();
        }
        let mut found: Vec<_> = self
            .inner
            .extensions
            .iter()
            .filter(|((target, _), _)| *target == extendee.index)
            .map(|((_, number), field)| (*number, *field))
            .collect();
        found.sort_unstable();
        found
            .into_iter()
            .map(|(_, field)| FieldDescriptor::new(self.clone(), field))
            .collect()
    }
}

impl fmt::Debug for DescriptorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.inner.files.iter().map(|file| &file.name))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// DescriptorPoolBuilder

/// Links files one by one, then freezes them into a [`DescriptorPool`].
///
/// # Examples
///
/// ```
/// use vc_descriptor::{DescriptorError, DescriptorPool, FieldKind, FieldProto, FileProto, MessageProto};
///
/// let import = FileProto::new("import.proto")
///     .with_package("imp")
///     .with_message(MessageProto::new("Shared").with_field(FieldProto::optional("d", 1, FieldKind::Int32)));
/// let main = FileProto::new("main.proto")
///     .with_package("app")
///     .with_dependency("import.proto")
///     .with_message(
///         MessageProto::new("Root")
///             .with_field(FieldProto::optional("shared", 1, FieldKind::Message).with_type_name("imp.Shared")),
///     );
///
/// // Imports must be linked first.
/// let mut builder = DescriptorPool::builder();
/// let err = builder.add_file(main.clone()).unwrap_err();
/// assert!(matches!(err, DescriptorError::UnresolvedImport { .. }));
///
/// builder.add_file(import).unwrap().add_file(main).unwrap();
/// let pool = builder.build();
///
/// let shared = pool.find_message("app.Root").unwrap().find_field("shared").unwrap();
/// assert_eq!(shared.message_type().unwrap().full_name(), "imp.Shared");
/// ```
#[derive(Debug, Default)]
pub struct DescriptorPoolBuilder {
    inner: PoolInner,
}

impl DescriptorPoolBuilder {
    /// Creates an empty builder.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and links `file`.
    ///
    /// On error nothing of `file` is kept, so the builder can keep going.
    pub fn add_file(&mut self, file: FileProto) -> Result<&mut Self, DescriptorError> {
        let mut staged = self.inner.clone();
        let index = staged.link_file(&file)?;
        self.inner = staged;

        let linked = &self.inner.files[index as usize];
        log::debug!(
            "linked schema file `{}` ({} messages, {} enums, {} extensions)",
            linked.name,
            linked.messages.len(),
            linked.enums.len(),
            linked.extensions.len(),
        );
        Ok(self)
    }

    /// Returns `true` if a file with this name was already linked.
    pub fn contains_file(&self, name: &str) -> bool {
        self.inner.file_names.contains_key(name)
    }

    /// Freezes the linked files.
    pub fn build(self) -> DescriptorPool {
        DescriptorPool {
            inner: Arc::new(self.inner),
        }
    }
}
