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

mod dynamic;
mod error;
mod field_set;
mod message;
mod value;

pub mod driver;
pub mod registry;
pub mod serde;

#[cfg(test)]
mod tests;

// -----------------------------------------------------------------------------
// Exports

pub use dynamic::{DynamicMessage, DynamicMessageBuilder};
pub use error::ReflectError;
pub use field_set::{Access, FieldSet, FieldValue, Fields, FieldsMut};
pub use message::{Message, MessageBuilder};
pub use registry::{ExtensionInfo, ExtensionRegistry};
pub use value::{IntoValue, Value};

pub use vc_descriptor as descriptor;
