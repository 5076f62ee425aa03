use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use vc_descriptor::FieldDescriptor;

use super::{Pass, Reflector, ValueSource};
use crate::{Fields, Message, MessageBuilder, ReflectError, Value};

// -----------------------------------------------------------------------------
// Mismatch

/// A field that does not hold what a verification expected.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub field: FieldDescriptor,
    /// The element, for repeated fields.
    pub index: Option<usize>,
    pub expected: String,
    pub actual: String,
}

impl Mismatch {
    fn new(field: &FieldDescriptor, index: Option<usize>, expected: impl fmt::Debug, actual: impl fmt::Debug) -> Self {
        Self {
            field: field.clone(),
            index,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "`{}`[{index}]", self.field.full_name())?,
            None => write!(f, "`{}`", self.field.full_name())?,
        }
        write!(f, ": expected {}, found {}", self.expected, self.actual)
    }
}

/// Shows a presence state rather than a value.
struct Presence(&'static str);

impl fmt::Debug for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// -----------------------------------------------------------------------------
// Verification

impl<S: ValueSource> Reflector<'_, S> {
    /// Checks that `message` holds exactly what
    /// [`set_all_fields`](Reflector::set_all_fields) writes.
    pub fn verify_all_fields_set<M: Message + ?Sized>(&self, message: &M) -> Result<Vec<Mismatch>, ReflectError> {
        let fields = message.field_set().view(self.access);
        let mut mismatches = Vec::new();
        for field in self.fields_of(fields.descriptor()) {
            if field.is_repeated() {
                let expected = self.expected_elements(fields, &field, None)?;
                check_elements(fields, &field, &expected, &mut mismatches)?;
            } else if let Some(expected) = self.sample(fields, &field, Pass::Singular)? {
                if !fields.has(&field)? {
                    mismatches.push(Mismatch::new(&field, None, Presence("set"), Presence("unset")));
                }
                let actual = fields.get(&field)?;
                if *actual != expected {
                    mismatches.push(Mismatch::new(&field, None, &expected, &*actual));
                }
            }
        }
        Ok(mismatches)
    }

    /// Checks that every field of `message` is unset and reads its default.
    pub fn verify_cleared<M: Message + ?Sized>(&self, message: &M) -> Result<Vec<Mismatch>, ReflectError> {
        let fields = message.field_set().view(self.access);
        let mut mismatches = Vec::new();
        for field in self.fields_of(fields.descriptor()) {
            if field.is_repeated() {
                let count = fields.count(&field)?;
                if count != 0 {
                    mismatches.push(Mismatch::new(&field, None, 0_usize, count));
                }
                continue;
            }
            if fields.has(&field)? {
                mismatches.push(Mismatch::new(&field, None, Presence("unset"), Presence("set")));
            }
            let expected = Value::default_for(&field);
            let actual = fields.get(&field)?;
            if *actual != expected {
                mismatches.push(Mismatch::new(&field, None, &expected, &*actual));
            }
        }
        Ok(mismatches)
    }

    /// Checks that element `index` of every repeated field holds its
    /// [`Pass::Modified`] sample and the other element is untouched.
    ///
    /// `index` counts the elements [`set_all_fields`](Reflector::set_all_fields)
    /// wrote, so fields the source skipped in a pass are not counted.
    pub fn verify_repeated_modified<M: Message + ?Sized>(
        &self,
        message: &M,
        index: usize,
    ) -> Result<Vec<Mismatch>, ReflectError> {
        let fields = message.field_set().view(self.access);
        let mut mismatches = Vec::new();
        for field in self.fields_of(fields.descriptor()) {
            if field.is_repeated() {
                let expected = self.expected_elements(fields, &field, Some(index))?;
                check_elements(fields, &field, &expected, &mut mismatches)?;
            }
        }
        Ok(mismatches)
    }

    /// Checks that setting a missing value on any singular field fails with
    /// [`ReflectError::InvalidArgument`] and changes nothing.
    pub fn verify_setters_reject_none<B: MessageBuilder + ?Sized>(
        &self,
        builder: &mut B,
    ) -> Result<Vec<Mismatch>, ReflectError> {
        let mut fields = builder.field_set_mut().view_mut(self.access);
        let mut mismatches = Vec::new();
        for field in self.fields_of(fields.descriptor()) {
            if field.is_repeated() {
                continue;
            }
            let before = (fields.has(&field)?, fields.get(&field)?.into_owned());
            let result = fields.set(&field, None::<Value>);
            check_rejected(&field, None, result, &mut mismatches);
            let after = (fields.has(&field)?, fields.get(&field)?.into_owned());
            if after != before {
                mismatches.push(Mismatch::new(&field, None, &before.1, &after.1));
            }
        }
        Ok(mismatches)
    }

    /// Checks that appending or writing a missing element to any repeated
    /// field fails with [`ReflectError::InvalidArgument`] and changes nothing.
    ///
    /// Element 0 is only written when the field has one.
    pub fn verify_repeated_setters_reject_none<B: MessageBuilder + ?Sized>(
        &self,
        builder: &mut B,
    ) -> Result<Vec<Mismatch>, ReflectError> {
        let mut fields = builder.field_set_mut().view_mut(self.access);
        let mut mismatches = Vec::new();
        for field in self.fields_of(fields.descriptor()) {
            if !field.is_repeated() {
                continue;
            }
            let count = fields.count(&field)?;
            let result = fields.add(&field, None::<Value>);
            check_rejected(&field, None, result, &mut mismatches);
            if count > 0 {
                let before = fields.get_at(&field, 0)?.clone();
                let result = fields.set_at(&field, 0, None::<Value>);
                check_rejected(&field, Some(0), result, &mut mismatches);
                let after = fields.get_at(&field, 0)?;
                if *after != before {
                    mismatches.push(Mismatch::new(&field, Some(0), &before, after));
                }
            }
            let after = fields.count(&field)?;
            if after != count {
                mismatches.push(Mismatch::new(&field, None, count, after));
            }
        }
        Ok(mismatches)
    }

    /// The elements of a repeated field after `set_all_fields`, with element
    /// `modified` replaced by its [`Pass::Modified`] sample when there is one.
    fn expected_elements(
        &self,
        fields: Fields<'_, '_>,
        field: &FieldDescriptor,
        modified: Option<usize>,
    ) -> Result<Vec<Value>, ReflectError> {
        let mut expected = Vec::new();
        for pass in [Pass::First, Pass::Second] {
            if let Some(value) = self.sample(fields, field, pass)? {
                expected.push(value);
            }
        }
        if let Some(slot) = modified.and_then(|index| expected.get_mut(index))
            && let Some(value) = self.sample(fields, field, Pass::Modified)?
        {
            *slot = value;
        }
        Ok(expected)
    }
}

fn check_elements(
    fields: Fields<'_, '_>,
    field: &FieldDescriptor,
    expected: &[Value],
    mismatches: &mut Vec<Mismatch>,
) -> Result<(), ReflectError> {
    let count = fields.count(field)?;
    if count != expected.len() {
        mismatches.push(Mismatch::new(field, None, expected.len(), count));
        return Ok(());
    }
    for (index, expected) in expected.iter().enumerate() {
        let actual = fields.get_at(field, index)?;
        if actual != expected {
            mismatches.push(Mismatch::new(field, Some(index), expected, actual));
        }
    }
    Ok(())
}

fn check_rejected(
    field: &FieldDescriptor,
    index: Option<usize>,
    result: Result<(), ReflectError>,
    mismatches: &mut Vec<Mismatch>,
) {
    match result {
        Err(ReflectError::InvalidArgument { .. }) => {}
        Ok(()) => mismatches.push(Mismatch::new(field, index, Presence("InvalidArgument"), Presence("Ok"))),
        Err(error) => mismatches.push(Mismatch {
            field: field.clone(),
            index,
            expected: "InvalidArgument".into(),
            actual: error.to_string(),
        }),
    }
}
