//! Handles into a [`DescriptorPool`](crate::DescriptorPool).
//!
//! Every handle is a pool reference plus a table index. Two handles are equal
//! only if they come from the same pool and name the same definition, so a
//! message type from one pool never matches its look-alike in another.

mod enum_type;
mod field;
mod file;
mod message;

pub use enum_type::{EnumDescriptor, EnumValueDescriptor};
pub use field::{FieldDescriptor, FieldType};
pub use file::FileDescriptor;
pub use message::MessageDescriptor;

/// Implements identity, `pool()` and the inner-table accessor for a handle.
macro_rules! impl_handle {
    ($ty:ident, $table:ident, $inner:ty) => {
        impl $ty {
            #[inline]
            pub(crate) fn new(pool: $crate::DescriptorPool, index: u32) -> Self {
                Self { pool, index }
            }

            #[inline(always)]
            fn inner(&self) -> &$inner {
                &self.pool.inner.$table[self.index as usize]
            }

            /// Returns the pool this descriptor belongs to.
            #[inline]
            pub fn pool(&self) -> &$crate::DescriptorPool {
                &self.pool
            }
        }

        impl PartialEq for $ty {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index && self.pool.ptr_eq(&other.pool)
            }
        }

        impl Eq for $ty {}

        impl core::hash::Hash for $ty {
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                alloc::sync::Arc::as_ptr(&self.pool.inner).hash(state);
                self.index.hash(state);
            }
        }
    };
}

pub(crate) use impl_handle;
