//! Slot storage shared by every message representation.

use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use vc_descriptor::{FieldDescriptor, FieldType, MessageDescriptor};

use crate::{DynamicMessageBuilder, ExtensionRegistry, IntoValue};
use crate::{MessageBuilder, ReflectError, Value};

// -----------------------------------------------------------------------------
// Access

/// The field space an operation addresses.
///
/// A message's own fields and its extensions are separate: extension fields
/// are only reachable through a registry, and a registry never resolves a
/// plain field.
#[derive(Debug, Clone, Copy)]
pub enum Access<'r> {
    Plain,
    Extensions(&'r ExtensionRegistry),
}

// -----------------------------------------------------------------------------
// Slot

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Empty,
    Value(Value),
    // Never empty, clearing resets the slot to `Empty`.
    List(Vec<Value>),
}

impl Slot {
    #[inline]
    fn as_field_value(&self) -> Option<FieldValue<'_>> {
        match self {
            Slot::Empty => None,
            Slot::Value(value) => Some(FieldValue::Singular(value)),
            Slot::List(values) => Some(FieldValue::Repeated(values)),
        }
    }
}

#[derive(Clone)]
struct ExtensionSlot {
    field: FieldDescriptor,
    slot: Slot,
}

#[derive(Clone, Copy)]
enum Location {
    Plain(usize),
    Extension(u32),
}

/// The content of a present field.
#[derive(Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Singular(&'a Value),
    Repeated(&'a [Value]),
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Singular(value) => fmt::Debug::fmt(value, f),
            FieldValue::Repeated(values) => f.debug_list().entries(values.iter()).finish(),
        }
    }
}

// -----------------------------------------------------------------------------
// FieldSet

/// The fields of one message instance, keyed by descriptor.
///
/// `FieldSet` is what both the reflective API and hand-written accessors
/// read and write: a struct with typed getters only needs to hold a
/// `FieldSet` and forward to [`fields`](Self::fields) /
/// [`fields_mut`](Self::fields_mut).
///
/// # Examples
///
/// ```
/// use vc_descriptor::{DescriptorPool, FieldKind, FieldProto, FileProto, MessageProto};
/// use vc_message::{FieldSet, ReflectError, Value};
///
/// let pool = DescriptorPool::from_files([FileProto::new("a.proto").with_message(
///     MessageProto::new("A")
///         .with_field(FieldProto::optional("id", 1, FieldKind::Int32).with_default("7"))
///         .with_field(FieldProto::repeated("tags", 2, FieldKind::String)),
/// )])
/// .unwrap();
/// let a = pool.find_message("A").unwrap();
/// let id = a.find_field("id").unwrap();
/// let tags = a.find_field("tags").unwrap();
///
/// let mut set = FieldSet::new(a);
/// assert!(!set.fields().has(&id).unwrap());
/// assert_eq!(*set.fields().get(&id).unwrap(), Value::I32(7));
///
/// let mut fields = set.fields_mut();
/// fields.set(&id, 1).unwrap();
/// fields.add(&tags, "x").unwrap();
/// assert!(matches!(fields.set(&id, 1_i64), Err(ReflectError::TypeMismatch { .. })));
/// assert!(matches!(fields.has(&tags), Err(ReflectError::InvalidOperation { .. })));
///
/// assert_eq!(set.fields().count(&tags).unwrap(), 1);
/// assert_eq!(*set.fields().get(&id).unwrap(), Value::I32(1));
/// ```
#[derive(Clone)]
pub struct FieldSet {
    descriptor: MessageDescriptor,
    // Indexed by field position; stays empty until a plain field is written.
    fields: Vec<Slot>,
    extensions: BTreeMap<u32, ExtensionSlot>,
}

impl FieldSet {
    /// Creates a set with every field unset.
    #[inline]
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self {
            descriptor,
            fields: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// Reads the message's own fields.
    #[inline]
    pub fn fields(&self) -> Fields<'_, 'static> {
        self.view(Access::Plain)
    }

    /// Writes the message's own fields.
    #[inline]
    pub fn fields_mut(&mut self) -> FieldsMut<'_, 'static> {
        self.view_mut(Access::Plain)
    }

    /// Reads extensions registered in `registry`.
    #[inline]
    pub fn extensions<'r>(&self, registry: &'r ExtensionRegistry) -> Fields<'_, 'r> {
        self.view(Access::Extensions(registry))
    }

    /// Writes extensions registered in `registry`.
    #[inline]
    pub fn extensions_mut<'r>(&mut self, registry: &'r ExtensionRegistry) -> FieldsMut<'_, 'r> {
        self.view_mut(Access::Extensions(registry))
    }

    #[inline]
    pub fn view<'r>(&self, access: Access<'r>) -> Fields<'_, 'r> {
        Fields { inner: self, access }
    }

    #[inline]
    pub fn view_mut<'r>(&mut self, access: Access<'r>) -> FieldsMut<'_, 'r> {
        FieldsMut { inner: self, access }
    }

    /// Iterates the present fields: plain fields in declaration order, then
    /// extensions by number.
    pub fn iter(&self) -> impl Iterator<Item = (FieldDescriptor, FieldValue<'_>)> + '_ {
        let plain = self
            .descriptor
            .fields()
            .zip(&self.fields)
            .filter_map(|(field, slot)| Some((field, slot.as_field_value()?)));
        let extensions = self
            .extensions
            .values()
            .filter_map(|ext| Some((ext.field.clone(), ext.slot.as_field_value()?)));
        plain.chain(extensions)
    }

    /// Returns `true` if no field is present.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Unsets every field, extensions included.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.extensions.clear();
    }

    /// Returns `true` if every required field is set, in this message and in
    /// every present embedded message.
    pub fn is_initialized(&self) -> bool {
        let required_set = self
            .descriptor
            .fields()
            .filter(|field| field.is_required())
            .all(|field| matches!(self.fields.get(field.index()), Some(Slot::Value(_))));

        fn initialized(value: &Value) -> bool {
            match value {
                Value::Message(message) => message.is_initialized(),
                _ => true,
            }
        }

        required_set
            && self.iter().all(|(_, value)| match value {
                FieldValue::Singular(value) => initialized(value),
                FieldValue::Repeated(values) => values.iter().all(initialized),
            })
    }

    /// Merges `other` into `self`.
    ///
    /// Singular fields set in `other` overwrite, embedded messages present on
    /// both sides are merged recursively and repeated fields are appended.
    pub fn merge_from(&mut self, other: &FieldSet) -> Result<(), ReflectError> {
        if other.descriptor != self.descriptor {
            return Err(ReflectError::TypeMismatch {
                field: self.descriptor.full_name().into(),
                expected: format!("a message of type `{}`", self.descriptor),
                found: format!("a message of type `{}`", other.descriptor),
            });
        }
        for (position, slot) in other.fields.iter().enumerate() {
            if !matches!(slot, Slot::Empty) {
                merge_slot(self.plain_slot_mut(position), slot)?;
            }
        }
        for (number, ext) in &other.extensions {
            let target = &mut self
                .extensions
                .entry(*number)
                .or_insert_with(|| ExtensionSlot {
                    field: ext.field.clone(),
                    slot: Slot::Empty,
                })
                .slot;
            merge_slot(target, &ext.slot)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Slot lookup

    fn locate(&self, access: Access<'_>, field: &FieldDescriptor) -> Result<Location, ReflectError> {
        match access {
            Access::Plain if !field.is_extension() && field.containing_message() == self.descriptor => {
                Ok(Location::Plain(field.index()))
            }
            Access::Plain => Err(ReflectError::not_found(self.descriptor.full_name(), field.full_name())),
            Access::Extensions(_) if !field.is_extension() => Err(ReflectError::invalid_operation(
                field.full_name(),
                "use extension access on plain",
            )),
            Access::Extensions(registry) => match registry.find(&self.descriptor, field.number()) {
                Some(info) if info.descriptor() == field => Ok(Location::Extension(field.number())),
                _ => Err(ReflectError::not_found(self.descriptor.full_name(), field.full_name())),
            },
        }
    }

    fn slot(&self, location: Location) -> Option<&Slot> {
        match location {
            Location::Plain(position) => self.fields.get(position),
            Location::Extension(number) => self.extensions.get(&number).map(|ext| &ext.slot),
        }
    }

    fn plain_slot_mut(&mut self, position: usize) -> &mut Slot {
        if self.fields.is_empty() {
            self.fields.resize(self.descriptor.field_count(), Slot::Empty);
        }
        &mut self.fields[position]
    }

    fn slot_mut(&mut self, location: Location, field: &FieldDescriptor) -> &mut Slot {
        match location {
            Location::Plain(position) => self.plain_slot_mut(position),
            Location::Extension(number) => {
                &mut self
                    .extensions
                    .entry(number)
                    .or_insert_with(|| ExtensionSlot {
                        field: field.clone(),
                        slot: Slot::Empty,
                    })
                    .slot
            }
        }
    }

    fn len_of(&self, location: Location) -> usize {
        match self.slot(location) {
            Some(Slot::List(values)) => values.len(),
            _ => 0,
        }
    }

    // -------------------------------------------------------------------------
    // Operations

    fn get(&self, access: Access<'_>, field: &FieldDescriptor) -> Result<Cow<'_, Value>, ReflectError> {
        let location = self.locate(access, field)?;
        expect_singular(field, "read without index from repeated")?;
        Ok(match self.slot(location) {
            Some(Slot::Value(value)) => Cow::Borrowed(value),
            _ => Cow::Owned(Value::default_for(field)),
        })
    }

    fn get_at(&self, access: Access<'_>, field: &FieldDescriptor, index: usize) -> Result<&Value, ReflectError> {
        let location = self.locate(access, field)?;
        expect_repeated(field, "index singular")?;
        let values = match self.slot(location) {
            Some(Slot::List(values)) => values.as_slice(),
            _ => &[],
        };
        values
            .get(index)
            .ok_or_else(|| out_of_range(field, index, values.len()))
    }

    fn has(&self, access: Access<'_>, field: &FieldDescriptor) -> Result<bool, ReflectError> {
        let location = self.locate(access, field)?;
        expect_singular(field, "check presence of repeated")?;
        Ok(matches!(self.slot(location), Some(Slot::Value(_))))
    }

    fn count(&self, access: Access<'_>, field: &FieldDescriptor) -> Result<usize, ReflectError> {
        let location = self.locate(access, field)?;
        expect_repeated(field, "count elements of singular")?;
        Ok(self.len_of(location))
    }

    fn set(&mut self, access: Access<'_>, field: &FieldDescriptor, value: Option<Value>) -> Result<(), ReflectError> {
        let location = self.locate(access, field)?;
        expect_singular(field, "set without index on repeated")?;
        let value = validate(field, value)?;
        *self.slot_mut(location, field) = Slot::Value(value);
        Ok(())
    }

    fn set_at(
        &mut self,
        access: Access<'_>,
        field: &FieldDescriptor,
        index: usize,
        value: Option<Value>,
    ) -> Result<(), ReflectError> {
        let location = self.locate(access, field)?;
        expect_repeated(field, "replace an element of singular")?;
        let value = validate(field, value)?;
        let len = self.len_of(location);
        if index >= len {
            return Err(out_of_range(field, index, len));
        }
        if let Slot::List(values) = self.slot_mut(location, field) {
            values[index] = value;
        }
        Ok(())
    }

    fn add(&mut self, access: Access<'_>, field: &FieldDescriptor, value: Option<Value>) -> Result<(), ReflectError> {
        let location = self.locate(access, field)?;
        expect_repeated(field, "append to singular")?;
        let value = validate(field, value)?;
        match self.slot_mut(location, field) {
            Slot::List(values) => values.push(value),
            slot => *slot = Slot::List(vec![value]),
        }
        Ok(())
    }

    fn clear_field(&mut self, access: Access<'_>, field: &FieldDescriptor) -> Result<(), ReflectError> {
        match self.locate(access, field)? {
            Location::Plain(position) => {
                if let Some(slot) = self.fields.get_mut(position) {
                    *slot = Slot::Empty;
                }
            }
            Location::Extension(number) => {
                self.extensions.remove(&number);
            }
        }
        Ok(())
    }

    fn new_builder_for(
        &self,
        access: Access<'_>,
        field: &FieldDescriptor,
    ) -> Result<DynamicMessageBuilder, ReflectError> {
        self.locate(access, field)?;
        let FieldType::Message(message_type) = field.field_type() else {
            return Err(ReflectError::invalid_operation(
                field.full_name(),
                "create a sub-builder for non-message",
            ));
        };
        let prototype = match access {
            Access::Plain => None,
            Access::Extensions(registry) => registry
                .find(&self.descriptor, field.number())
                .and_then(|info| info.default_instance()),
        };
        let builder = match prototype {
            Some(prototype) => prototype.new_builder(),
            None => DynamicMessageBuilder::new(message_type),
        };
        log::trace!(
            "created sub-builder of `{}` for `{}`",
            builder.descriptor(),
            field.full_name()
        );
        Ok(builder)
    }
}

fn expect_singular(field: &FieldDescriptor, operation: &'static str) -> Result<(), ReflectError> {
    if field.is_repeated() {
        return Err(ReflectError::invalid_operation(field.full_name(), operation));
    }
    Ok(())
}

fn expect_repeated(field: &FieldDescriptor, operation: &'static str) -> Result<(), ReflectError> {
    if !field.is_repeated() {
        return Err(ReflectError::invalid_operation(field.full_name(), operation));
    }
    Ok(())
}

fn validate(field: &FieldDescriptor, value: Option<Value>) -> Result<Value, ReflectError> {
    let value = value.ok_or_else(|| ReflectError::InvalidArgument {
        field: field.full_name().into(),
    })?;
    value.check(field)?;
    Ok(value)
}

#[inline]
fn out_of_range(field: &FieldDescriptor, index: usize, len: usize) -> ReflectError {
    ReflectError::IndexOutOfRange {
        field: field.full_name().into(),
        index,
        len,
    }
}

fn merge_slot(target: &mut Slot, source: &Slot) -> Result<(), ReflectError> {
    match (target, source) {
        (_, Slot::Empty) => {}
        (Slot::List(values), Slot::List(more)) => values.extend(more.iter().cloned()),
        (Slot::Value(Value::Message(mine)), Slot::Value(Value::Message(theirs))) => {
            let mut merged = mine.to_builder();
            merged.merge_from(theirs)?;
            *mine = merged.build();
        }
        (target, source) => *target = source.clone(),
    }
    Ok(())
}

impl PartialEq for FieldSet {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct(self.descriptor.full_name());
        for (field, value) in self.iter() {
            if field.is_extension() {
                debug.field(&format!("[{}]", field.full_name()), &value);
            } else {
                debug.field(field.name(), &value);
            }
        }
        debug.finish()
    }
}

// -----------------------------------------------------------------------------
// Fields

/// Read access to one field space of a message.
#[derive(Clone, Copy)]
pub struct Fields<'a, 'r> {
    inner: &'a FieldSet,
    access: Access<'r>,
}

impl<'a> Fields<'a, '_> {
    #[inline]
    pub fn descriptor(&self) -> &'a MessageDescriptor {
        &self.inner.descriptor
    }

    /// Returns the value of a singular field, or its default while unset.
    pub fn get(&self, field: &FieldDescriptor) -> Result<Cow<'a, Value>, ReflectError> {
        self.inner.get(self.access, field)
    }

    /// Returns element `index` of a repeated field.
    pub fn get_at(&self, field: &FieldDescriptor, index: usize) -> Result<&'a Value, ReflectError> {
        self.inner.get_at(self.access, field, index)
    }

    /// Returns `true` if a singular field was explicitly set.
    pub fn has(&self, field: &FieldDescriptor) -> Result<bool, ReflectError> {
        self.inner.has(self.access, field)
    }

    /// Returns the length of a repeated field.
    pub fn count(&self, field: &FieldDescriptor) -> Result<usize, ReflectError> {
        self.inner.count(self.access, field)
    }

    /// Returns an empty builder of the message type of `field`.
    pub fn new_builder_for(&self, field: &FieldDescriptor) -> Result<DynamicMessageBuilder, ReflectError> {
        self.inner.new_builder_for(self.access, field)
    }
}

// -----------------------------------------------------------------------------
// FieldsMut

/// Write access to one field space of a message.
///
/// Every setter validates completely before writing, so a failed call
/// leaves the message untouched.
pub struct FieldsMut<'a, 'r> {
    inner: &'a mut FieldSet,
    access: Access<'r>,
}

impl<'r> FieldsMut<'_, 'r> {
    #[inline]
    pub fn as_fields(&self) -> Fields<'_, 'r> {
        Fields {
            inner: &*self.inner,
            access: self.access,
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.inner.descriptor
    }

    pub fn get(&self, field: &FieldDescriptor) -> Result<Cow<'_, Value>, ReflectError> {
        self.inner.get(self.access, field)
    }

    pub fn get_at(&self, field: &FieldDescriptor, index: usize) -> Result<&Value, ReflectError> {
        self.inner.get_at(self.access, field, index)
    }

    pub fn has(&self, field: &FieldDescriptor) -> Result<bool, ReflectError> {
        self.inner.has(self.access, field)
    }

    pub fn count(&self, field: &FieldDescriptor) -> Result<usize, ReflectError> {
        self.inner.count(self.access, field)
    }

    pub fn new_builder_for(&self, field: &FieldDescriptor) -> Result<DynamicMessageBuilder, ReflectError> {
        self.inner.new_builder_for(self.access, field)
    }

    /// Sets a singular field, marking it present.
    pub fn set(&mut self, field: &FieldDescriptor, value: impl IntoValue) -> Result<(), ReflectError> {
        self.inner.set(self.access, field, value.into_value())
    }

    /// Replaces element `index` of a repeated field; never grows it.
    pub fn set_at(
        &mut self,
        field: &FieldDescriptor,
        index: usize,
        value: impl IntoValue,
    ) -> Result<(), ReflectError> {
        self.inner.set_at(self.access, field, index, value.into_value())
    }

    /// Appends to a repeated field.
    pub fn add(&mut self, field: &FieldDescriptor, value: impl IntoValue) -> Result<(), ReflectError> {
        self.inner.add(self.access, field, value.into_value())
    }

    /// Unsets a singular field or empties a repeated one.
    pub fn clear(&mut self, field: &FieldDescriptor) -> Result<(), ReflectError> {
        self.inner.clear_field(self.access, field)
    }
}
