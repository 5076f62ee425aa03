//! Schema-wide tests over the `protobuf_unittest` fixture.

mod unittest;

mod reflection;
