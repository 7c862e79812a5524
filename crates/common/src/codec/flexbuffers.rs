use snafu::{Location, ResultExt, Snafu};

use super::Codec;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("flexbuffers serialize error"))]
    Serialize {
        #[snafu(source)]
        error: flexbuffers::SerializationError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("flexbuffers deserialize error"))]
    Deserialize {
        #[snafu(source)]
        error: flexbuffers::DeserializationError,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Self-describing binary encoding; fields are keyed by name and integers
/// carry their own width, so payloads can be read into a narrower type.
#[derive(Debug)]
pub struct Flexbuffers;

impl Codec for Flexbuffers {
    const NAME: &'static str = "flexbuffers";

    // no streaming writer: sizing means serializing
    const CHEAP_SIZE: bool = false;

    type Error = Error;

    #[tracing::instrument(skip_all)]
    fn encode<T>(item: &T, buf: &mut bytes::BytesMut) -> Result<(), Self::Error>
    where
        T: serde::Serialize,
    {
        let bytes = flexbuffers::to_vec(item).context(SerializeSnafu)?;
        buf.extend_from_slice(&bytes);
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    fn decode<T>(buf: bytes::Bytes) -> Result<T, Self::Error>
    where
        T: for<'a> serde::Deserialize<'a>,
    {
        flexbuffers::from_slice(&buf).context(DeserializeSnafu)
    }

    #[tracing::instrument(skip_all)]
    fn size<T>(item: &T) -> Result<u64, Self::Error>
    where
        T: serde::Serialize,
    {
        let bytes = flexbuffers::to_vec(item).context(SerializeSnafu)?;
        Ok(bytes.len() as u64)
    }
}
