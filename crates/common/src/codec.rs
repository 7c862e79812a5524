pub mod bincode;
pub mod flexbuffers;
pub mod json;
pub mod msgpack;

pub trait Codec: Send + 'static {
    /// Short format name used in logs and errors.
    const NAME: &'static str;

    /// Whether [`size`](Codec::size) is cheaper than encoding.
    const CHEAP_SIZE: bool = true;

    type Error: std::error::Error + Send + Sync + 'static;

    fn encode<T>(item: &T, buf: &mut bytes::BytesMut) -> Result<(), Self::Error>
    where
        T: serde::Serialize;

    fn decode<T>(buf: bytes::Bytes) -> Result<T, Self::Error>
    where
        T: for<'a> serde::Deserialize<'a>;

    fn size<T>(item: &T) -> Result<u64, Self::Error>
    where
        T: serde::Serialize;
}

/// Writer that only counts what passes through it.
pub(crate) struct ByteCount(pub(crate) u64);

impl std::io::Write for ByteCount {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0 += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
