#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(any(test, feature = "std"))]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod default;
mod descriptor;
mod error;
mod kind;
mod pool;
mod proto;

// -----------------------------------------------------------------------------
// Exports

pub use default::DefaultValue;
pub use descriptor::{EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldType};
pub use descriptor::{FileDescriptor, MessageDescriptor};
pub use error::DescriptorError;
pub use kind::{Cardinality, FieldKind, ValueKind};
pub use pool::{DescriptorPool, DescriptorPoolBuilder, NameHashState};
pub use proto::{EnumProto, FieldProto, FileProto, MessageProto};

/// The largest field number a message may declare.
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Field numbers reserved for the implementation, never valid in a schema.
pub const RESERVED_FIELD_NUMBERS: core::ops::RangeInclusive<u32> = 19_000..=19_999;
