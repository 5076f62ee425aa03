use alloc::string::String;

use thiserror::Error;

/// Failures of reflective field access.
///
/// A failed operation never modifies the message it was called on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReflectError {
    /// The field is unknown to the message, or the extension is not registered.
    #[error("`{name}` is not a field of `{message}`")]
    NotFound { message: String, name: String },

    /// The value does not have the field's type.
    #[error("field `{field}` expects {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// A missing value was passed to a setter.
    #[error("field `{field}` does not accept a missing value")]
    InvalidArgument { field: String },

    #[error("index {index} is out of range for field `{field}` of length {len}")]
    IndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },

    /// The operation does not apply to this field or access mode.
    #[error("cannot {operation} field `{field}`")]
    InvalidOperation {
        field: String,
        operation: &'static str,
    },
}

impl ReflectError {
    #[inline]
    pub(crate) fn not_found(message: &str, name: &str) -> Self {
        Self::NotFound {
            message: message.into(),
            name: name.into(),
        }
    }

    #[inline]
    pub(crate) fn invalid_operation(field: &str, operation: &'static str) -> Self {
        Self::InvalidOperation {
            field: field.into(),
            operation,
        }
    }
}
