use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use super::{Definition, EnumInner, EnumValueInner, FieldInner, FileInner};
use super::{HashMap, MessageInner, PoolInner};
use crate::default::{RawDefault, parse_scalar};
use crate::{Cardinality, DescriptorError, FieldKind, MAX_FIELD_NUMBER, RESERVED_FIELD_NUMBERS};
use crate::{EnumProto, FieldProto, FileProto, MessageProto};

fn join(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_owned()
    } else {
        format!("{scope}.{name}")
    }
}

#[inline]
fn is_valid_number(number: u32) -> bool {
    (1..=MAX_FIELD_NUMBER).contains(&number) && !RESERVED_FIELD_NUMBERS.contains(&number)
}

// Where a field is declared and what it attaches to.
struct FieldSite<'s> {
    scope: &'s str,
    containing: u32,
    extension_scope: Option<u32>,
    is_extension: bool,
}

impl PoolInner {
    /// Links one file into `self`, returning its index.
    ///
    /// `self` may be left half-written on error; callers link into a copy.
    pub(super) fn link_file(&mut self, proto: &FileProto) -> Result<u32, DescriptorError> {
        if self.file_names.contains_key(proto.name.as_str()) {
            return Err(DescriptorError::DuplicateFile(proto.name.clone()));
        }

        let mut dependencies = Vec::with_capacity(proto.dependencies.len());
        for import in &proto.dependencies {
            match self.file_names.get(import.as_str()) {
                Some(index) => dependencies.push(*index),
                None => {
                    return Err(DescriptorError::UnresolvedImport {
                        file: proto.name.clone(),
                        import: import.clone(),
                    });
                }
            }
        }

        let file = self.files.len() as u32;
        let visible = self.visible_files(&dependencies);
        self.files.push(FileInner {
            name: proto.name.as_str().into(),
            package: proto.package.as_str().into(),
            dependencies,
            messages: Vec::new(),
            enums: Vec::new(),
            extensions: Vec::new(),
        });
        self.file_names.insert(proto.name.as_str().into(), file);

        let mut linker = Linker {
            pool: self,
            file,
            visible,
            messages: Vec::new(),
            extensions: Vec::new(),
        };

        // Pass 1: every type name of the file, so fields may refer forward.
        for message in &proto.messages {
            let index = linker.declare_message(message, &proto.package, None)?;
            linker.pool.files[file as usize].messages.push(index);
        }
        for enum_proto in &proto.enums {
            let index = linker.declare_enum(enum_proto, &proto.package, None)?;
            linker.pool.files[file as usize].enums.push(index);
        }
        for field in &proto.extensions {
            linker.extensions.push((field, None));
        }

        // Pass 2: fields, then extensions (which need complete extendees).
        let messages = core::mem::take(&mut linker.messages);
        for (message, index) in messages {
            linker.link_fields(message, index)?;
        }
        let extensions = core::mem::take(&mut linker.extensions);
        for (field, scope) in extensions {
            linker.link_extension(field, scope, &proto.package)?;
        }

        Ok(file)
    }

    // The file itself plus the transitive closure of its imports.
    fn visible_files(&self, dependencies: &[u32]) -> Vec<bool> {
        let mut visible = vec![false; self.files.len() + 1];
        visible[self.files.len()] = true;
        let mut stack: Vec<u32> = dependencies.to_vec();
        while let Some(file) = stack.pop() {
            if !visible[file as usize] {
                visible[file as usize] = true;
                stack.extend_from_slice(&self.files[file as usize].dependencies);
            }
        }
        visible
    }

    fn definition_file(&self, definition: Definition) -> u32 {
        match definition {
            Definition::Message(index) => self.messages[index as usize].file,
            Definition::Enum(index) => self.enums[index as usize].file,
            Definition::Extension(index) => self.fields[index as usize].file,
        }
    }
}

// -----------------------------------------------------------------------------
// Linker

struct Linker<'a, 'p> {
    pool: &'a mut PoolInner,
    file: u32,
    visible: Vec<bool>,
    messages: Vec<(&'p MessageProto, u32)>,
    // Declared extensions with their scope message, if any.
    extensions: Vec<(&'p FieldProto, Option<u32>)>,
}

impl<'a, 'p> Linker<'a, 'p> {
    fn define(&mut self, full_name: &str, definition: Definition) -> Result<(), DescriptorError> {
        if self.pool.names.contains_key(full_name) {
            return Err(DescriptorError::DuplicateName {
                name: full_name.to_owned(),
            });
        }
        self.pool.names.insert(full_name.into(), definition);
        Ok(())
    }

    fn declare_message(
        &mut self,
        proto: &'p MessageProto,
        scope: &str,
        parent: Option<u32>,
    ) -> Result<u32, DescriptorError> {
        let full_name = join(scope, &proto.name);
        let index = self.pool.messages.len() as u32;
        self.define(&full_name, Definition::Message(index))?;

        for range in &proto.extension_ranges {
            if range.is_empty() || !is_valid_number(range.start) || range.end - 1 > MAX_FIELD_NUMBER {
                return Err(DescriptorError::InvalidFieldNumber {
                    name: full_name,
                    number: range.start,
                });
            }
        }

        self.pool.messages.push(MessageInner {
            name: proto.name.as_str().into(),
            full_name: full_name.as_str().into(),
            file: self.file,
            parent,
            fields: Vec::with_capacity(proto.fields.len()),
            field_names: HashMap::default(),
            field_numbers: HashMap::default(),
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            extensions: Vec::new(),
            extension_ranges: proto.extension_ranges.clone(),
        });
        self.messages.push((proto, index));

        for nested in &proto.nested_messages {
            let child = self.declare_message(nested, &full_name, Some(index))?;
            self.pool.messages[index as usize].nested_messages.push(child);
        }
        for nested in &proto.nested_enums {
            let child = self.declare_enum(nested, &full_name, Some(index))?;
            self.pool.messages[index as usize].nested_enums.push(child);
        }
        for field in &proto.extensions {
            self.extensions.push((field, Some(index)));
        }
        Ok(index)
    }

    fn declare_enum(
        &mut self,
        proto: &EnumProto,
        scope: &str,
        parent: Option<u32>,
    ) -> Result<u32, DescriptorError> {
        let full_name = join(scope, &proto.name);
        if proto.values.is_empty() {
            return Err(DescriptorError::EmptyEnum(full_name));
        }
        let index = self.pool.enums.len() as u32;
        self.define(&full_name, Definition::Enum(index))?;

        let mut values = Vec::with_capacity(proto.values.len());
        let mut value_names = HashMap::default();
        for (position, (name, number)) in proto.values.iter().enumerate() {
            let value_index = self.pool.enum_values.len() as u32;
            let value_full_name = join(&full_name, name);
            if value_names.insert(Box::<str>::from(name.as_str()), value_index).is_some() {
                return Err(DescriptorError::DuplicateName {
                    name: value_full_name,
                });
            }
            self.pool.enum_values.push(EnumValueInner {
                name: name.as_str().into(),
                full_name: value_full_name.into(),
                number: *number,
                parent: index,
                position: position as u32,
            });
            values.push(value_index);
        }

        self.pool.enums.push(EnumInner {
            name: proto.name.as_str().into(),
            full_name: full_name.into(),
            file: self.file,
            parent,
            values,
            value_names,
        });
        Ok(index)
    }

    fn link_fields(&mut self, proto: &MessageProto, message: u32) -> Result<(), DescriptorError> {
        let scope: Box<str> = self.pool.messages[message as usize].full_name.clone();
        for field in &proto.fields {
            let full_name = join(&scope, &field.name);
            if field.extendee.is_some() {
                return Err(DescriptorError::InvalidField {
                    name: full_name,
                    reason: "plain fields cannot name an extendee",
                });
            }
            if !is_valid_number(field.number) {
                return Err(DescriptorError::InvalidFieldNumber {
                    name: full_name,
                    number: field.number,
                });
            }

            let target = &self.pool.messages[message as usize];
            if target.field_names.contains_key(field.name.as_str()) {
                return Err(DescriptorError::DuplicateName { name: full_name });
            }
            if let Some(existing) = target.field_numbers.get(&field.number) {
                return Err(DescriptorError::DuplicateNumber {
                    name: full_name,
                    number: field.number,
                    existing: self.pool.fields[*existing as usize].full_name.to_owned().into(),
                });
            }

            let position = target.fields.len() as u32;
            let site = FieldSite {
                scope: &scope,
                containing: message,
                extension_scope: None,
                is_extension: false,
            };
            let index = self.push_field(field, full_name, position, &site)?;

            let target = &mut self.pool.messages[message as usize];
            target.fields.push(index);
            target.field_names.insert(field.name.as_str().into(), index);
            target.field_numbers.insert(field.number, index);
        }
        Ok(())
    }

    fn link_extension(
        &mut self,
        field: &FieldProto,
        scope_message: Option<u32>,
        package: &str,
    ) -> Result<(), DescriptorError> {
        let scope: Box<str> = match scope_message {
            Some(index) => self.pool.messages[index as usize].full_name.clone(),
            None => package.into(),
        };
        let full_name = join(&scope, &field.name);

        let Some(extendee_name) = field.extendee.as_deref() else {
            return Err(DescriptorError::InvalidField {
                name: full_name,
                reason: "extension without extendee",
            });
        };
        let extendee = match self.resolve(&scope, extendee_name) {
            Some(Definition::Message(index)) => index,
            _ => {
                return Err(DescriptorError::UnresolvedType {
                    name: full_name,
                    type_name: extendee_name.to_owned(),
                });
            }
        };
        if !is_valid_number(field.number) {
            return Err(DescriptorError::InvalidFieldNumber {
                name: full_name,
                number: field.number,
            });
        }

        let target = &self.pool.messages[extendee as usize];
        if !target.extension_ranges.iter().any(|r| r.contains(&field.number)) {
            return Err(DescriptorError::NotExtendable {
                name: full_name,
                extendee: target.full_name.to_owned().into(),
                number: field.number,
            });
        }
        if let Some(existing) = self.pool.extensions.get(&(extendee, field.number)) {
            return Err(DescriptorError::DuplicateNumber {
                name: full_name,
                number: field.number,
                existing: self.pool.fields[*existing as usize].full_name.to_owned().into(),
            });
        }

        let position = match scope_message {
            Some(index) => self.pool.messages[index as usize].extensions.len(),
            None => self.pool.files[self.file as usize].extensions.len(),
        } as u32;
        let site = FieldSite {
            scope: &scope,
            containing: extendee,
            extension_scope: scope_message,
            is_extension: true,
        };
        let index = self.push_field(field, full_name.clone(), position, &site)?;

        self.define(&full_name, Definition::Extension(index))?;
        self.pool.extensions.insert((extendee, field.number), index);
        match scope_message {
            Some(message) => self.pool.messages[message as usize].extensions.push(index),
            None => self.pool.files[self.file as usize].extensions.push(index),
        }
        Ok(())
    }

    fn push_field(
        &mut self,
        field: &FieldProto,
        full_name: String,
        position: u32,
        site: &FieldSite<'_>,
    ) -> Result<u32, DescriptorError> {
        let type_index = self.resolve_field_type(field, &full_name, site.scope)?;

        if field.packed && (field.cardinality != Cardinality::Repeated || !field.kind.is_packable()) {
            return Err(DescriptorError::InvalidField {
                name: full_name,
                reason: "only repeated scalar fields can be packed",
            });
        }

        let default = match field.default_value.as_deref() {
            None => None,
            Some(text) => Some(self.parse_default(field, &full_name, text, type_index)?),
        };

        let index = self.pool.fields.len() as u32;
        self.pool.fields.push(FieldInner {
            name: field.name.as_str().into(),
            full_name: full_name.into(),
            number: field.number,
            position,
            kind: field.kind,
            cardinality: field.cardinality,
            packed: field.packed,
            type_index,
            default,
            containing: site.containing,
            extension_scope: site.extension_scope,
            is_extension: site.is_extension,
            file: self.file,
        });
        Ok(index)
    }

    fn resolve_field_type(
        &self,
        field: &FieldProto,
        full_name: &str,
        scope: &str,
    ) -> Result<Option<u32>, DescriptorError> {
        let type_name = match (field.kind.is_named_type(), field.type_name.as_deref()) {
            (false, None) => return Ok(None),
            (false, Some(_)) => {
                return Err(DescriptorError::InvalidField {
                    name: full_name.to_owned(),
                    reason: "scalar fields cannot name a type",
                });
            }
            (true, None) => {
                return Err(DescriptorError::InvalidField {
                    name: full_name.to_owned(),
                    reason: "missing type name",
                });
            }
            (true, Some(type_name)) => type_name,
        };

        match (field.kind, self.resolve(scope, type_name)) {
            (FieldKind::Enum, Some(Definition::Enum(index))) => Ok(Some(index)),
            (FieldKind::Message | FieldKind::Group, Some(Definition::Message(index))) => {
                Ok(Some(index))
            }
            (_, None) => Err(DescriptorError::UnresolvedType {
                name: full_name.to_owned(),
                type_name: type_name.to_owned(),
            }),
            (FieldKind::Enum, Some(_)) => Err(DescriptorError::InvalidField {
                name: full_name.to_owned(),
                reason: "enum field refers to a non-enum type",
            }),
            (_, Some(_)) => Err(DescriptorError::InvalidField {
                name: full_name.to_owned(),
                reason: "message field refers to a non-message type",
            }),
        }
    }

    fn parse_default(
        &self,
        field: &FieldProto,
        full_name: &str,
        text: &str,
        type_index: Option<u32>,
    ) -> Result<RawDefault, DescriptorError> {
        let invalid = || DescriptorError::InvalidDefault {
            name: full_name.to_owned(),
            value: text.to_owned(),
        };
        if field.cardinality == Cardinality::Repeated || field.kind.is_message() {
            return Err(invalid());
        }
        match (field.kind, type_index) {
            (FieldKind::Enum, Some(enum_index)) => self.pool.enums[enum_index as usize]
                .value_names
                .get(text)
                .map(|value| RawDefault::Enum(*value))
                .ok_or_else(invalid),
            (kind, _) => parse_scalar(kind, text).ok_or_else(invalid),
        }
    }

    /// Resolves `name` from `scope` outward; a leading `.` means fully qualified.
    fn resolve(&self, scope: &str, name: &str) -> Option<Definition> {
        if let Some(full_name) = name.strip_prefix('.') {
            return self.visible_definition(full_name);
        }
        let mut scope = scope;
        loop {
            if let Some(definition) = self.visible_definition(&join(scope, name)) {
                return Some(definition);
            }
            if scope.is_empty() {
                return None;
            }
            scope = scope.rsplit_once('.').map_or("", |(parent, _)| parent);
        }
    }

    fn visible_definition(&self, full_name: &str) -> Option<Definition> {
        let definition = *self.pool.names.get(full_name)?;
        let file = self.pool.definition_file(definition);
        self.visible[file as usize].then_some(definition)
    }
}
