use bytes::{Buf, BufMut};

use super::{ByteCount, Codec};

#[derive(Debug)]
pub struct Json;

impl Codec for Json {
    const NAME: &'static str = "json";

    type Error = serde_json::Error;

    #[tracing::instrument(skip_all)]
    fn encode<T>(item: &T, buf: &mut bytes::BytesMut) -> Result<(), Self::Error>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer(buf.writer(), item)
    }

    #[tracing::instrument(skip_all)]
    fn decode<T>(buf: bytes::Bytes) -> Result<T, Self::Error>
    where
        T: for<'a> serde::Deserialize<'a>,
    {
        serde_json::from_reader(buf.reader())
    }

    #[tracing::instrument(skip_all)]
    fn size<T>(item: &T) -> Result<u64, Self::Error>
    where
        T: serde::Serialize,
    {
        let mut ser = serde_json::Serializer::new(ByteCount(0));
        item.serialize(&mut ser)?;
        Ok(ser.into_inner().0)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use crate::record::Person;

    use super::*;

    #[test]
    fn field_names() {
        let mut buf = BytesMut::new();
        Json::encode(&Person::sample(), &mut buf).unwrap();
        assert_eq!(
            std::str::from_utf8(&buf).unwrap(),
            r#"{"userName":"Martin","favouriteNumber":1337,"interests":["daydreaming","hacking"]}"#
        );
        assert_eq!(Json::size(&Person::sample()).unwrap(), buf.len() as u64);
    }

    #[test]
    fn rejects_binary() {
        let res: Result<Person, _> = Json::decode(bytes::Bytes::from_static(&[0x83, 0xa8]));
        assert!(res.is_err());
    }
}
