#![forbid(unsafe_code)]

pub mod adapter;
pub mod codec;
pub mod error;
pub mod record;
pub mod schema;
