#![forbid(unsafe_code)]

use snafu::{Location, Snafu};

pub mod config;
pub mod descriptor;
pub mod harness;
pub mod report;

pub use config::Config;
pub use descriptor::{CodecDescriptor, Registry};
pub use harness::{
    run_comparison, CodecFailure, CodecReport, Comparison, EncodeResult, Harness, RoundTrip,
};
pub use report::Report;

/// Errors that stop a comparison before any codec runs.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("no codecs registered"))]
    NoCodecs {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("record is incomplete: {record}"))]
    IncompleteRecord {
        record: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("codec {name} is already registered"))]
    DuplicateCodec {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("unknown codec: {name}"))]
    UnknownCodec {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
}
