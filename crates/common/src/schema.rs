//! Message types for the formats that are driven by an IDL schema rather
//! than by serde.

pub mod protobuf;
pub mod thrift;
