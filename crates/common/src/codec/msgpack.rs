use bytes::BufMut;
use snafu::{Location, ResultExt, Snafu};

use super::{ByteCount, Codec};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("msgpack encode error"))]
    Encode {
        #[snafu(source)]
        error: rmp_serde::encode::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("msgpack decode error"))]
    Decode {
        #[snafu(source)]
        error: rmp_serde::decode::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

/// MessagePack with structs written as maps keyed by field name.
#[derive(Debug)]
pub struct MsgPack;

impl Codec for MsgPack {
    const NAME: &'static str = "msgpack";

    type Error = Error;

    #[tracing::instrument(skip_all)]
    fn encode<T>(item: &T, buf: &mut bytes::BytesMut) -> Result<(), Self::Error>
    where
        T: serde::Serialize,
    {
        rmp_serde::encode::write_named(&mut buf.writer(), item).context(EncodeSnafu)
    }

    #[tracing::instrument(skip_all)]
    fn decode<T>(buf: bytes::Bytes) -> Result<T, Self::Error>
    where
        T: for<'a> serde::Deserialize<'a>,
    {
        rmp_serde::from_slice(&buf).context(DecodeSnafu)
    }

    #[tracing::instrument(skip_all)]
    fn size<T>(item: &T) -> Result<u64, Self::Error>
    where
        T: serde::Serialize,
    {
        let mut count = ByteCount(0);
        rmp_serde::encode::write_named(&mut count, item).context(EncodeSnafu)?;
        Ok(count.0)
    }
}
