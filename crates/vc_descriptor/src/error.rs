use alloc::string::String;

use thiserror::Error;

/// Failures while linking schema files or looking up descriptors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DescriptorError {
    #[error("{kind} `{name}` was not found")]
    NotFound { kind: &'static str, name: String },

    #[error("file `{0}` is already part of the pool")]
    DuplicateFile(String),

    #[error("file `{file}` imports `{import}`, which is not part of the pool")]
    UnresolvedImport { file: String, import: String },

    #[error("`{name}` is already defined")]
    DuplicateName { name: String },

    #[error("field number {number} of `{name}` is already used by `{existing}`")]
    DuplicateNumber {
        name: String,
        number: u32,
        existing: String,
    },

    #[error("field number {number} of `{name}` is out of range or reserved")]
    InvalidFieldNumber { name: String, number: u32 },

    #[error("type `{type_name}` referenced by `{name}` could not be resolved")]
    UnresolvedType { name: String, type_name: String },

    #[error("invalid field `{name}`: {reason}")]
    InvalidField { name: String, reason: &'static str },

    #[error("invalid default `{value}` for field `{name}`")]
    InvalidDefault { name: String, value: String },

    #[error("enum `{0}` declares no values")]
    EmptyEnum(String),

    #[error("extension `{name}` uses number {number}, outside the extension ranges of `{extendee}`")]
    NotExtendable {
        name: String,
        extendee: String,
        number: u32,
    },
}

impl DescriptorError {
    #[inline]
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}
