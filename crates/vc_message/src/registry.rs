//! Extension lookup by extendee and field number.
//!
//! Extensions widen a message's field space without changing its descriptor.
//! A message only sees the extensions of the [`ExtensionRegistry`] handed to
//! it, so the same bytes of storage can be read with different registries.
//!
//! With the `auto_register` feature, extension sets can be submitted
//! statically through [`submit_extensions!`](crate::submit_extensions) and
//! collected with [`ExtensionRegistry::auto_register`].

use alloc::collections::BTreeMap;
use core::fmt;

use vc_descriptor::{FieldDescriptor, FieldType, FileDescriptor, MessageDescriptor, NameHashState};

use crate::{DynamicMessage, ReflectError};

type HashMap<K, V> = hashbrown::HashMap<K, V, NameHashState>;

// -----------------------------------------------------------------------------
// ExtensionInfo

/// A registered extension.
#[derive(Clone)]
pub struct ExtensionInfo {
    descriptor: FieldDescriptor,
    default_instance: Option<DynamicMessage>,
}

impl ExtensionInfo {
    fn new(descriptor: FieldDescriptor) -> Self {
        let default_instance = match descriptor.field_type() {
            FieldType::Message(message_type) => Some(DynamicMessage::default_instance(message_type)),
            _ => None,
        };
        Self {
            descriptor,
            default_instance,
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// Returns the extended message type.
    #[inline]
    pub fn extendee(&self) -> MessageDescriptor {
        self.descriptor.containing_message()
    }

    /// Returns the prototype of message and group extensions.
    ///
    /// Sub-builders for the extension are created from it.
    #[inline]
    pub fn default_instance(&self) -> Option<&DynamicMessage> {
        self.default_instance.as_ref()
    }
}

impl fmt::Debug for ExtensionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionInfo")
            .field("descriptor", &self.descriptor)
            .field("number", &self.descriptor.number())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ExtensionRegistry

/// Maps `(extendee, number)` to the registered extension.
///
/// Registration happens up front; afterwards the registry is only read and
/// can be shared freely.
///
/// # Examples
///
/// ```
/// use vc_descriptor::{DescriptorPool, FieldKind, FieldProto, FileProto, MessageProto};
/// use vc_message::{DynamicMessage, ExtensionRegistry, Message, MessageBuilder, ReflectError, Value};
///
/// let pool = DescriptorPool::from_files([FileProto::new("e.proto")
///     .with_message(MessageProto::new("Base").with_extension_range(100..200))
///     .with_extension(FieldProto::optional("note", 100, FieldKind::String).with_extendee("Base"))])
/// .unwrap();
/// let base = pool.find_message("Base").unwrap();
/// let note = pool.find_extension("note").unwrap();
///
/// let mut registry = ExtensionRegistry::new();
/// registry.add(note.clone()).unwrap();
/// assert_eq!(registry.find(&base, 100).unwrap().descriptor(), &note);
///
/// let mut builder = DynamicMessage::default_instance(base).new_builder();
/// builder.extensions_mut(&registry).set(&note, "hi").unwrap();
/// // Without the registry the extension does not exist.
/// assert!(matches!(builder.fields_mut().set(&note, "hi"), Err(ReflectError::NotFound { .. })));
///
/// let message = builder.build();
/// assert_eq!(*message.extensions(&registry).get(&note).unwrap(), Value::String("hi".into()));
/// ```
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    extendees: HashMap<MessageDescriptor, BTreeMap<u32, ExtensionInfo>>,
    len: usize,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an extension, replacing any extension of the same
    /// extendee and number.
    pub fn add(&mut self, field: FieldDescriptor) -> Result<(), ReflectError> {
        if !field.is_extension() {
            return Err(ReflectError::invalid_operation(
                field.full_name(),
                "register non-extension",
            ));
        }
        let extendee = field.containing_message();
        let number = field.number();
        let info = ExtensionInfo::new(field);

        match self.extendees.entry(extendee).or_default().insert(number, info) {
            Some(replaced) => log::warn!(
                "replaced extension `{}`, number {number} of `{}`",
                replaced.descriptor.full_name(),
                replaced.extendee().full_name(),
            ),
            None => self.len += 1,
        }
        Ok(())
    }

    /// Registers every extension declared in `file`, at top level or inside
    /// any of its messages.
    pub fn add_file(&mut self, file: &FileDescriptor) -> Result<(), ReflectError> {
        fn add_scoped(registry: &mut ExtensionRegistry, message: &MessageDescriptor) -> Result<(), ReflectError> {
            for extension in message.scoped_extensions() {
                registry.add(extension)?;
            }
            for nested in message.nested_messages() {
                add_scoped(registry, &nested)?;
            }
            Ok(())
        }

        let before = self.len;
        for extension in file.extensions() {
            self.add(extension)?;
        }
        for message in file.messages() {
            add_scoped(self, &message)?;
        }
        log::debug!(
            "registered {} extensions from `{}`",
            self.len - before,
            file.name()
        );
        Ok(())
    }

    /// Returns the extension of `extendee` with this number.
    pub fn find(&self, extendee: &MessageDescriptor, number: u32) -> Option<&ExtensionInfo> {
        self.extendees.get(extendee)?.get(&number)
    }

    /// Like [`find`](Self::find), failing with [`ReflectError::NotFound`].
    pub fn lookup(&self, extendee: &MessageDescriptor, number: u32) -> Result<&ExtensionInfo, ReflectError> {
        self.find(extendee, number).ok_or_else(|| ReflectError::NotFound {
            message: extendee.full_name().into(),
            name: alloc::format!("extension {number}"),
        })
    }

    /// Finds an extension of `extendee` by short or fully qualified name.
    pub fn find_by_name(&self, extendee: &MessageDescriptor, name: &str) -> Option<&ExtensionInfo> {
        self.extensions_of(extendee).find(|info| {
            info.descriptor.name() == name || info.descriptor.full_name() == name
        })
    }

    /// Iterates the extensions of `extendee` by ascending number.
    pub fn extensions_of(&self, extendee: &MessageDescriptor) -> impl Iterator<Item = &ExtensionInfo> + '_ {
        self.extendees
            .get(extendee)
            .into_iter()
            .flat_map(|extensions| extensions.values())
    }

    /// Iterates every registered extension, grouped by extendee.
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionInfo> + '_ {
        self.extendees.values().flat_map(|extensions| extensions.values())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(|info| info.descriptor.full_name()))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Static registration

/// A statically submitted registration function.
///
/// Use [`submit_extensions!`](crate::submit_extensions) instead of building this directly.
#[cfg(feature = "auto_register")]
pub struct ExtensionSubmission(pub fn(&mut ExtensionRegistry));

#[cfg(feature = "auto_register")]
inventory::collect!(ExtensionSubmission);

/// Submits a `fn(&mut ExtensionRegistry)` to be run by
/// [`ExtensionRegistry::auto_register`].
///
/// ```ignore
/// fn register_geo(registry: &mut ExtensionRegistry) {
///     registry.add_file(&geo_file()).ok();
/// }
///
/// vc_message::submit_extensions!(register_geo);
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! submit_extensions {
    ($register:path) => {
        $crate::registry::__inventory::submit! {
            $crate::registry::ExtensionSubmission($register)
        }
    };
}

#[cfg(feature = "auto_register")]
#[doc(hidden)]
pub use inventory as __inventory;

impl ExtensionRegistry {
    /// Runs every function submitted with [`submit_extensions!`](crate::submit_extensions).
    ///
    /// Returns `false` if the `auto_register` feature is disabled.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            let before = self.len;
            for submission in inventory::iter::<ExtensionSubmission> {
                (submission.0)(self);
            }
            log::debug!("auto-registered {} extensions", self.len - before);
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use vc_descriptor::{DescriptorPool, FieldKind, FieldProto, FileProto, MessageProto};

    use super::ExtensionRegistry;
    use crate::{Message, ReflectError};

    fn pool() -> DescriptorPool {
        DescriptorPool::from_files([FileProto::new("r.proto")
            .with_package("r")
            .with_message(
                MessageProto::new("Base")
                    .with_field(FieldProto::optional("plain", 1, FieldKind::Int32))
                    .with_extension_range(10..100),
            )
            .with_message(
                MessageProto::new("Payload").with_extension(
                    FieldProto::optional("payload", 11, FieldKind::Message)
                        .with_extendee("Base")
                        .with_type_name("Payload"),
                ),
            )
            .with_extension(FieldProto::repeated("tags", 20, FieldKind::String).with_extendee("Base"))
            .with_extension(FieldProto::optional("flag", 10, FieldKind::Bool).with_extendee("Base"))])
        .unwrap()
    }

    #[test]
    fn add_file_collects_scoped_extensions() {
        let pool = pool();
        let base = pool.find_message("r.Base").unwrap();
        let mut registry = ExtensionRegistry::new();
        registry.add_file(&pool.file_by_name("r.proto").unwrap()).unwrap();

        assert_eq!(registry.len(), 3);
        let numbers: Vec<_> = registry.extensions_of(&base).map(|i| i.descriptor().number()).collect();
        assert_eq!(numbers, [10, 11, 20]);

        let payload = registry.find_by_name(&base, "r.Payload.payload").unwrap();
        assert_eq!(payload.descriptor().number(), 11);
        let prototype = payload.default_instance().unwrap();
        assert_eq!(prototype.field_set().descriptor().full_name(), "r.Payload");
        assert!(registry.find_by_name(&base, "flag").unwrap().default_instance().is_none());
    }

    #[test]
    fn lookups() {
        let pool = pool();
        let base = pool.find_message("r.Base").unwrap();
        let mut registry = ExtensionRegistry::new();
        registry.add(pool.find_extension("r.flag").unwrap()).unwrap();

        assert!(registry.lookup(&base, 10).is_ok());
        assert!(matches!(registry.lookup(&base, 11), Err(ReflectError::NotFound { .. })));

        let plain = base.find_field("plain").unwrap();
        assert!(matches!(registry.add(plain), Err(ReflectError::InvalidOperation { .. })));

        // Registering the same extension twice keeps one entry.
        registry.add(pool.find_extension("r.flag").unwrap()).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registries_are_shareable() {
        fn check<T: Send + Sync>() {}
        check::<ExtensionRegistry>();
    }

    #[cfg(feature = "auto_register")]
    mod auto {
        use super::{ExtensionRegistry, pool};

        fn register(registry: &mut ExtensionRegistry) {
            let pool = pool();
            registry.add(pool.find_extension("r.tags").unwrap()).unwrap();
        }

        crate::submit_extensions!(register);

        #[test]
        fn submitted_functions_run() {
            let mut registry = ExtensionRegistry::new();
            assert!(registry.auto_register());
            assert!(
                registry
                    .iter()
                    .any(|info| info.descriptor().full_name() == "r.tags")
            );
        }
    }
}
